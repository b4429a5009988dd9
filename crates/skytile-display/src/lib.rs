//! Presenters for the three-tile weather panel
//!
//! Rendering targets implement the core `Presenter` trait: a console tile
//! layout for interactive use and an append-only JSONL log for headless
//! capture. Staleness is decided here, not in the aggregation.

pub mod console;
pub mod jsonl;

pub use console::*;
pub use jsonl::*;

use chrono::{DateTime, Duration, Utc};

/// Published data older than this is flagged on the panel
pub const STALE_AFTER_HOURS: i64 = 2;

pub fn is_stale(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - fetched_at > Duration::hours(STALE_AFTER_HOURS)
}

/// Uppercase the first character of a condition string for the tiles
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness_boundary() {
        let fetched = Utc::now();
        assert!(!is_stale(fetched, fetched + Duration::hours(2)));
        assert!(is_stale(fetched, fetched + Duration::hours(2) + Duration::seconds(1)));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize("Clear"), "Clear");
        assert_eq!(capitalize(""), "");
    }
}
