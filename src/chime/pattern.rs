//! Hour-counting vibration pattern.
//!
//! One pulse per hour, each followed by a pause. With abbreviation enabled,
//! every five hours collapse into a single long pulse so that late hours stay
//! countable by feel.

/// Capacity of the actuator's segment buffer.
pub const MAX_SEGMENTS: usize = 48;
pub const PULSE_MS: u32 = 110;
pub const LONG_PULSE_MS: u32 = 330;
pub const PAUSE_MS: u32 = 240;

/// Alternating pulse/pause durations in milliseconds, starting with a pulse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChimePattern {
    segments: [u32; MAX_SEGMENTS],
    len: usize,
}

impl ChimePattern {
    /// The segments handed to the actuator.
    pub fn durations(&self) -> &[u32] {
        &self.segments[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_ms(&self) -> u32 {
        self.durations().iter().sum()
    }
}

/// Build the pattern announcing `hour24`.
///
/// `hour24` must be in `0..=23`. On a 12-hour clock afternoon hours are
/// folded down by twelve; midnight stays 0 and produces an empty pattern.
pub fn build_hourly_pattern(hour24: u32, clock_is_24h: bool, abbreviate: bool) -> ChimePattern {
    let mut hours = hour24 as i32;
    if !clock_is_24h && hours > 12 {
        hours -= 12;
    }

    let mut remaining = hours * 2;
    let mut long_pulses = 0;

    if abbreviate && hours > 5 {
        long_pulses = hours / 5;
        // Each long pulse stands in for five pulse/pause pairs.
        remaining = remaining - (long_pulses * 2 * 5) + 1;
    }
    // The trailing pause is never emitted.
    remaining -= 1;

    let len = remaining.clamp(0, MAX_SEGMENTS as i32) as usize;

    let mut segments = [0; MAX_SEGMENTS];
    for pair in segments.chunks_exact_mut(2) {
        if remaining <= 0 {
            break;
        }
        pair[0] = if long_pulses > 0 {
            long_pulses -= 1;
            LONG_PULSE_MS
        } else {
            PULSE_MS
        };
        pair[1] = PAUSE_MS;
        remaining -= 2;
    }

    ChimePattern { segments, len }
}
