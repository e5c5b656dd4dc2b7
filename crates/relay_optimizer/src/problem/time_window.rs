use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minutes since midnight.
pub type Minutes = i64;

pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// Latest start applied to stops that leave their end time blank (23:59).
pub const DEFAULT_STOP_END: Minutes = MINUTES_PER_DAY - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeWindow {
    start: Minutes,
    end: Minutes,
}

impl TimeWindow {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        TimeWindow { start, end }
    }

    pub fn full_day() -> Self {
        TimeWindow {
            start: 0,
            end: MINUTES_PER_DAY,
        }
    }

    pub fn start(&self) -> Minutes {
        self.start
    }

    pub fn end(&self) -> Minutes {
        self.end
    }

    pub fn is_satisfied(&self, arrival: Minutes) -> bool {
        arrival <= self.end
    }

    /// Service can't begin before the window opens, the vehicle waits instead.
    pub fn service_start(&self, arrival: Minutes) -> Minutes {
        arrival.max(self.start)
    }

    pub fn waiting_duration(&self, arrival: Minutes) -> Minutes {
        (self.start - arrival).max(0)
    }
}

/// Parses a time-of-day cell into minutes since midnight.
///
/// Accepts ISO times (`08:30`, `08:30:00`), loose `H:MM` forms including `24:00`,
/// and plain minute counts (`480`, `480.0`). Fractional minutes are truncated.
pub fn parse_time_of_day(value: &str) -> Option<Minutes> {
    let value = value.trim();

    if let Ok(time) = value.parse::<jiff::civil::Time>() {
        return Some(Minutes::from(time.hour()) * 60 + Minutes::from(time.minute()));
    }

    if let Some((hours, rest)) = value.split_once(':') {
        let minutes = rest.split(':').next().unwrap_or(rest);
        let hours: Minutes = hours.trim().parse().ok()?;
        let minutes: Minutes = minutes.trim().parse().ok()?;

        if !(0..60).contains(&minutes) || !(0..=24).contains(&hours) {
            return None;
        }

        let total = hours * 60 + minutes;
        return (total <= MINUTES_PER_DAY).then_some(total);
    }

    parse_minutes(value.parse::<f64>().ok()?)
}

pub fn parse_minutes(value: f64) -> Option<Minutes> {
    if value.is_finite() && value >= 0.0 {
        Some(value.trunc() as Minutes)
    } else {
        None
    }
}
