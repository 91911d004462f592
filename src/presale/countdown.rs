use chrono::{DateTime, Utc};
use std::fmt;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    target: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Ended,
}

impl Countdown {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self { target }
    }

    /// Time left until the sale closes. Whole seconds are truncated, so the
    /// final second still reads as running until the target has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> CountdownState {
        let distance = self.target.signed_duration_since(now);
        if distance.num_milliseconds() < 0 {
            return CountdownState::Ended;
        }
        let total = distance.num_seconds();
        CountdownState::Running {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
        }
    }
}

impl CountdownState {
    pub fn is_ended(&self) -> bool {
        matches!(self, CountdownState::Ended)
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownState::Running {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days:02}d {hours:02}h {minutes:02}m {seconds:02}s"),
            CountdownState::Ended => f.write_str("Presale has ended"),
        }
    }
}
