//! Console tile renderer
//!
//! Lays the three day buckets out as fixed-width text columns: tile 0
//! carries the live reading, tiles 1 and 2 the forecast days. Stale
//! temperatures get a leading marker instead of a color change.

use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};

use skytile_core::{Presenter, Units, WeatherSnapshot};

use crate::{capitalize, is_stale};

const TILE_WIDTH: usize = 16;
const STALE_MARKER: &str = "*";

pub struct ConsolePresenter<W: Write + Send + Sync> {
    out: W,
    units: Units,
    last: Option<WeatherSnapshot>,
    stale_shown: bool,
}

impl ConsolePresenter<io::Stdout> {
    pub fn stdout(units: Units) -> Self {
        Self::new(io::stdout(), units)
    }
}

impl<W: Write + Send + Sync> ConsolePresenter<W> {
    pub fn new(out: W, units: Units) -> Self {
        Self {
            out,
            units,
            last: None,
            stale_shown: false,
        }
    }

    fn write_frame(&mut self, frame: &str) -> Result<()> {
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Render the three tiles as rows of centered cells
pub fn render(snapshot: &WeatherSnapshot, units: Units, now: DateTime<Utc>) -> String {
    let stale = is_stale(snapshot.fetched_at, now);
    let suffix = units.suffix();
    let marker = if stale { STALE_MARKER } else { "" };

    let mut headers = Vec::with_capacity(3);
    let mut temps = Vec::with_capacity(3);
    let mut conditions = Vec::with_capacity(3);

    for (i, day) in snapshot.days.iter().enumerate() {
        if i == 0 {
            // Tile 0 shows the live reading where the date would go
            headers.push(format!("{}{}", snapshot.current.temperature, suffix));
            conditions.push(capitalize(&snapshot.current.condition));
        } else {
            headers.push(format!("{} {}", day.day_name, day.display_date));
            conditions.push(capitalize(&day.description));
        }
        temps.push(format!(
            "{}{}/{}{}",
            marker, day.temp_high, day.temp_low, suffix
        ));
    }

    let mut frame = String::new();
    for row in [&headers, &temps, &conditions] {
        for cell in row {
            frame.push_str(&format!("{:^width$}", cell, width = TILE_WIDTH));
        }
        frame.push('\n');
    }
    frame
}

#[async_trait::async_trait]
impl<W: Write + Send + Sync> Presenter for ConsolePresenter<W> {
    async fn status(&mut self, message: &str) -> Result<()> {
        let line = format!("== {} ==\n", message);
        self.write_frame(&line)
    }

    async fn publish(&mut self, snapshot: &WeatherSnapshot) -> Result<()> {
        let now = Utc::now();
        self.stale_shown = is_stale(snapshot.fetched_at, now);
        let frame = render(snapshot, self.units, now);
        self.last = Some(snapshot.clone());
        self.write_frame(&frame)
    }

    async fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        // Redraw only when the staleness flag flips
        let Some(snapshot) = self.last.clone() else {
            return Ok(());
        };
        let stale = is_stale(snapshot.fetched_at, now);
        if stale != self.stale_shown {
            self.stale_shown = stale;
            let frame = render(&snapshot, self.units, now);
            self.write_frame(&frame)?;
        }
        Ok(())
    }
}
