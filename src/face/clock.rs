use chrono::{NaiveDateTime, Timelike};

/// Larger time units that rolled over with a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickUnits {
    pub hour: bool,
    pub minute: bool,
}

impl TickUnits {
    pub const NONE: Self = Self {
        hour: false,
        minute: false,
    };
    pub const MINUTE: Self = Self {
        hour: false,
        minute: true,
    };
    pub const HOUR: Self = Self {
        hour: true,
        minute: true,
    };

    /// Compare two wall-clock readings. An hour change always implies a
    /// minute change; the very first reading counts as a minute change only.
    pub fn between(previous: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        let Some(previous) = previous else {
            return Self::MINUTE;
        };

        let same_hour = previous.date() == now.date() && previous.hour() == now.hour();
        if !same_hour {
            return Self::HOUR;
        }
        if previous.minute() != now.minute() {
            return Self::MINUTE;
        }
        Self::NONE
    }

    pub fn any(&self) -> bool {
        self.hour || self.minute
    }
}

/// Clock label: `14:05` on a 24-hour clock, `2:05PM` otherwise.
pub fn clock_text(now: NaiveDateTime, clock_is_24h: bool) -> String {
    if clock_is_24h {
        now.format("%H:%M").to_string()
    } else {
        now.format("%l:%M%p").to_string().trim_start().to_string()
    }
}
