//! Three-day forecast rollup
//!
//! Buckets a time-ordered list of 3-hour forecast samples into today /
//! tomorrow / day-after slots using the provider's UTC offset, tracking
//! per-day temperature extremes, averaged humidity, and a representative
//! midday condition. Bucket 0 is additionally corrected against the live
//! current temperature.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::calendar::{day_name, display_date, local_date, local_seconds_of_day};
use crate::types::{DayBucket, ForecastSample, UtcOffset};

/// Number of daily slots on the panel
pub const DAY_SLOTS: usize = 3;

// Local time-of-day window for picking a representative condition, inclusive
const MIDDAY_START_SECS: i64 = 12 * 3600;
const MIDDAY_END_SECS: i64 = 15 * 3600;

/// Result of one aggregation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub days: [DayBucket; DAY_SLOTS],

    /// Current temperature for the panel's today tile
    pub current_temp: i32,
}

/// Running per-day state while walking the sample list
#[derive(Debug, Default)]
struct SlotAccumulator {
    date: Option<NaiveDate>,
    high: Option<f64>,
    low: Option<f64>,
    humidity_sum: u32,
    humidity_count: u32,
    description: String,
}

impl SlotAccumulator {
    fn add(&mut self, sample: &ForecastSample, seconds_of_day: i64) {
        self.high = Some(match self.high {
            Some(h) => h.max(sample.temperature),
            None => sample.temperature,
        });
        self.low = Some(match self.low {
            Some(l) => l.min(sample.temperature),
            None => sample.temperature,
        });

        self.humidity_sum += u32::from(sample.humidity);
        self.humidity_count += 1;

        // First non-empty condition is provisional; a midday sample
        // overrides it, last one in the window winning
        let midday = (MIDDAY_START_SECS..=MIDDAY_END_SECS).contains(&seconds_of_day);
        if midday || (self.description.is_empty() && !sample.condition.is_empty()) {
            self.description = sample.condition.clone();
        }
    }

    fn humidity(&self) -> u8 {
        if self.humidity_count == 0 {
            return 0;
        }
        // Round half up
        (f64::from(self.humidity_sum) / f64::from(self.humidity_count)).round() as u8
    }
}

/// Aggregate raw forecast samples into the 3 day buckets.
///
/// Bucket 0's date comes from `now_utc` shifted by `utc_offset` whether or
/// not any sample lands in it; buckets 1 and 2 take the first two other
/// distinct local dates in sample order. Samples past the horizon are
/// dropped. Never fails: empty input and absurd offsets produce
/// sentinel-filled buckets rather than errors.
pub fn aggregate(
    samples: &[ForecastSample],
    utc_offset: UtcOffset,
    current_temp: i32,
    now_utc: DateTime<Utc>,
) -> ForecastSummary {
    let today = local_date(now_utc.timestamp(), utc_offset);

    let mut slots: [SlotAccumulator; DAY_SLOTS] = Default::default();
    slots[0].date = Some(today);

    for sample in samples {
        let date = local_date(sample.timestamp, utc_offset);
        let Some(index) = select_slot(&mut slots, today, date) else {
            continue; // beyond the 3-day horizon
        };
        let seconds = local_seconds_of_day(sample.timestamp, utc_offset);
        slots[index].add(sample, seconds);
    }

    let days = std::array::from_fn(|i| finalize(&slots[i], i, today, current_temp));

    ForecastSummary {
        days,
        current_temp,
    }
}

/// Pick the bucket for a sample's local date, assigning the dates of
/// buckets 1 and 2 on first use
fn select_slot(
    slots: &mut [SlotAccumulator; DAY_SLOTS],
    today: NaiveDate,
    date: NaiveDate,
) -> Option<usize> {
    if date == today {
        return Some(0);
    }
    for index in 1..DAY_SLOTS {
        match slots[index].date {
            None => {
                slots[index].date = Some(date);
                return Some(index);
            }
            Some(assigned) if assigned == date => return Some(index),
            Some(_) => {}
        }
    }
    None
}

fn finalize(slot: &SlotAccumulator, index: usize, today: NaiveDate, current_temp: i32) -> DayBucket {
    // Buckets that never saw a sample still need a date for the tile header
    let date = slot.date.unwrap_or_else(|| {
        today
            .checked_add_days(Days::new(index as u64))
            .unwrap_or(today)
    });

    let (temp_high, temp_low) = match (slot.high, slot.low) {
        (Some(high), Some(low)) => {
            let mut high = high.round() as i32;
            let mut low = low.round() as i32;
            if index == 0 {
                // The live reading can sit outside the remaining
                // forecast extremes
                high = high.max(current_temp);
                low = low.min(current_temp);
            }
            (high, low)
        }
        // Late in the day no remaining slot lands on today, so the live
        // reading stands in. Future days show 0/0 to signal missing data.
        _ if index == 0 => (current_temp, current_temp),
        _ => (0, 0),
    };

    DayBucket {
        date: date.format("%Y-%m-%d").to_string(),
        day_name: day_name(date).to_string(),
        display_date: display_date(date),
        temp_high,
        temp_low,
        humidity: slot.humidity(),
        description: slot.description.clone(),
    }
}
