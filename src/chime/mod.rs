//! Hour and quarter-hour vibration chimes.
//!
//! Selection is pure: the chime for a boundary depends only on the settings
//! snapshot and the wall-clock time passed in. Nothing is remembered between
//! calls.

mod haptics;
mod pattern;

use crate::settings::{Settings, VibrationStyle};

pub use haptics::{Haptics, LogHaptics};
pub use pattern::{
    build_hourly_pattern, ChimePattern, LONG_PULSE_MS, MAX_SEGMENTS, PAUSE_MS, PULSE_MS,
};

/// Built-in single vibrations of the motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseStyle {
    /// 200ms pulse
    Short,
    /// 400ms pulse
    Long,
    /// Two short pulses separated by a short pause
    Double,
}

impl PulseStyle {
    pub fn duration_ms(&self) -> u32 {
        match self {
            PulseStyle::Short => 200,
            PulseStyle::Long => 400,
            PulseStyle::Double => 600,
        }
    }
}

/// What the actuator should do at a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chime {
    Silent,
    Pulse(PulseStyle),
    /// The same pulse requested several times in a row.
    Pulses(PulseStyle, u8),
    Pattern(ChimePattern),
}

impl Chime {
    /// Hand the chime to the actuator. Empty patterns are dropped.
    pub fn dispatch(&self, haptics: &mut dyn Haptics) {
        match self {
            Chime::Silent => {}
            Chime::Pulse(style) => haptics.pulse(*style),
            Chime::Pulses(style, count) => {
                for _ in 0..*count {
                    haptics.pulse(*style);
                }
            }
            Chime::Pattern(pattern) => {
                if !pattern.is_empty() {
                    haptics.play_pattern(pattern);
                }
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        match self {
            Chime::Silent => true,
            Chime::Pulses(_, count) => *count == 0,
            Chime::Pattern(pattern) => pattern.is_empty(),
            Chime::Pulse(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChimeEngine {
    /// Collapse runs of five hourly pulses into one long pulse.
    pub abbreviate: bool,
}

impl Default for ChimeEngine {
    fn default() -> Self {
        Self { abbreviate: true }
    }
}

impl ChimeEngine {
    pub fn new(abbreviate: bool) -> Self {
        Self { abbreviate }
    }

    /// Chime for the top of the hour.
    pub fn select_hourly_style(
        &self,
        settings: &Settings,
        hour24: u32,
        clock_is_24h: bool,
    ) -> Chime {
        if !settings.hourly_vibrate {
            return Chime::Silent;
        }

        match settings.hour_vibration_style {
            VibrationStyle::None => Chime::Silent,
            VibrationStyle::Short => Chime::Pulse(PulseStyle::Short),
            VibrationStyle::Long => Chime::Pulse(PulseStyle::Long),
            VibrationStyle::Double => Chime::Pulse(PulseStyle::Double),
            VibrationStyle::Pattern => Chime::Pattern(build_hourly_pattern(
                hour24,
                clock_is_24h,
                self.abbreviate,
            )),
        }
    }

    /// Chime for :15, :30 and :45. The top of the hour belongs to
    /// [`ChimeEngine::select_hourly_style`].
    pub fn select_quarterly_style(&self, settings: &Settings, minute_of_hour: u32) -> Chime {
        if !settings.quarter_hourly_vibrate {
            return Chime::Silent;
        }
        if minute_of_hour == 0 || minute_of_hour % 15 != 0 {
            return Chime::Silent;
        }

        match settings.quarter_vibration_style {
            VibrationStyle::None => Chime::Silent,
            VibrationStyle::Short => Chime::Pulse(PulseStyle::Short),
            VibrationStyle::Long => Chime::Pulse(PulseStyle::Long),
            VibrationStyle::Double => Chime::Pulse(PulseStyle::Double),
            VibrationStyle::Pattern => {
                Chime::Pulses(PulseStyle::Short, quarter_count(minute_of_hour))
            }
        }
    }
}

/// Each quarter divisor is checked on its own, so :45 matches 15 and 45 but
/// not 30.
fn quarter_count(minute_of_hour: u32) -> u8 {
    [15, 30, 45]
        .iter()
        .filter(|&&quarter| minute_of_hour % quarter == 0)
        .count() as u8
}
