//! Vibration actuator seam.

use log::info;

use super::{ChimePattern, PulseStyle};

/// Fire-and-forget vibration driver.
pub trait Haptics {
    fn pulse(&mut self, style: PulseStyle);

    fn play_pattern(&mut self, pattern: &ChimePattern);
}

/// Host stand-in for the vibration motor; reports requests through the log.
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&mut self, style: PulseStyle) {
        info!("Vibrate: {:?} pulse ({}ms)", style, style.duration_ms());
    }

    fn play_pattern(&mut self, pattern: &ChimePattern) {
        info!(
            "Vibrate: {} segment pattern ({}ms) {:?}",
            pattern.len(),
            pattern.total_ms(),
            pattern.durations()
        );
    }
}
