//! Persisted watchface settings.
//!
//! One [`Settings`] record exists for the lifetime of the process. It is built
//! from defaults, overlaid with whatever was persisted, then patched field by
//! field by configuration messages from the companion app.

mod update;

use serde::{Deserialize, Serialize};

use crate::persist::{PersistStore, SETTINGS_KEY};

pub use update::{ConfigMessage, ConfigValue, SettingsUpdate};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Number of selectable watchface modes in the configuration page.
pub const MODE_COUNT: usize = 7;

const DEFAULT_INTERVAL_MINUTES: u16 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VibrationStyle {
    None,
    Short,
    Long,
    Double,
    Pattern,
}

impl VibrationStyle {
    /// Decode the single-digit wire form used by the configuration page.
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(VibrationStyle::None),
            1 => Some(VibrationStyle::Short),
            2 => Some(VibrationStyle::Long),
            3 => Some(VibrationStyle::Double),
            4 => Some(VibrationStyle::Pattern),
            _ => None,
        }
    }

    pub fn as_digit(&self) -> u32 {
        match self {
            VibrationStyle::None => 0,
            VibrationStyle::Short => 1,
            VibrationStyle::Long => 2,
            VibrationStyle::Double => 3,
            VibrationStyle::Pattern => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub mode_change_interval_minutes: u16,
    pub mode_change_on_shake: bool,
    /// Parsed and persisted, but rotation cycles the whole catalog.
    pub enabled_modes: [bool; MODE_COUNT],
    pub hourly_vibrate: bool,
    pub hour_vibration_style: VibrationStyle,
    pub quarter_hourly_vibrate: bool,
    pub quarter_vibration_style: VibrationStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode_change_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            mode_change_on_shake: false,
            enabled_modes: [true; MODE_COUNT],
            hourly_vibrate: true,
            hour_vibration_style: VibrationStyle::Long,
            quarter_hourly_vibrate: false,
            quarter_vibration_style: VibrationStyle::Short,
        }
    }
}

impl Settings {
    /// Overwrite only the fields present in `update`.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(enabled) = update.hourly_vibrate {
            self.hourly_vibrate = enabled;
            log_debug!("Hourly vibrate: {}", enabled);
        }
        if let Some(style) = update.hour_vibration_style {
            self.hour_vibration_style = style;
            log_debug!("Hourly vibrate style: {:?}", style);
        }
        if let Some(enabled) = update.quarter_hourly_vibrate {
            self.quarter_hourly_vibrate = enabled;
            log_debug!("Quarterly vibrate: {}", enabled);
        }
        if let Some(style) = update.quarter_vibration_style {
            self.quarter_vibration_style = style;
            log_debug!("Quarterly vibrate style: {:?}", style);
        }
        if let Some(minutes) = update.mode_change_interval_minutes {
            self.mode_change_interval_minutes = clamp_interval(minutes);
            log_debug!("Mode change interval: {}", self.mode_change_interval_minutes);
        }
        for (offset, value) in update.enabled_modes.iter().enumerate() {
            if let Some(enabled) = value {
                self.enabled_modes[offset] = *enabled;
                log_debug!("Mode [{}] enabled: {}", offset, enabled);
            }
        }
        if let Some(enabled) = update.mode_change_on_shake {
            self.mode_change_on_shake = enabled;
            log_debug!("Mode change on shake: {}", enabled);
        }
    }

    /// Repair values a corrupted or hand-edited record could carry.
    fn normalized(mut self) -> Self {
        if self.mode_change_interval_minutes == 0 {
            log_warn!("Persisted mode change interval was 0; using 1 minute");
            self.mode_change_interval_minutes = 1;
        }
        self
    }
}

/// Intervals below one minute would divide by zero in the rotation schedule.
fn clamp_interval(minutes: i64) -> u16 {
    minutes.clamp(1, i64::from(u16::MAX)) as u16
}

/// Follow-up work requested after settings change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconfigure {
    /// Whether tap gestures should advance the background.
    pub tap_subscribed: bool,
}

/// Owner of the process-wide [`Settings`] record.
#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: Option<Settings>,
    listening: bool,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the record and start accepting configuration updates.
    pub fn init<P: PersistStore + ?Sized>(&mut self, store: &P) -> &Settings {
        self.listening = true;
        self.load(store)
    }

    /// Return the settings record, reading storage only on the first call.
    /// After [`SettingsStore::destroy`] the next call rebuilds the record from
    /// storage; updates stay refused until [`SettingsStore::init`].
    pub fn load<P: PersistStore + ?Sized>(&mut self, store: &P) -> &Settings {
        self.settings
            .get_or_insert_with(|| read_persisted(store).normalized())
    }

    /// Whether the update channel is registered.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Merge `update` into the record, persist the result and report how the
    /// face should reconfigure. Returns `None` once the store is destroyed.
    pub fn apply_update<P: PersistStore + ?Sized>(
        &mut self,
        store: &mut P,
        update: &SettingsUpdate,
    ) -> Option<Reconfigure> {
        if !self.listening {
            log_warn!("Settings update received after the channel was closed; ignoring");
            return None;
        }

        log_debug!("Applying settings update...");
        self.load(&*store);
        let settings = self.settings.as_mut()?;
        settings.apply(update);

        save(store, settings);
        Some(reconfigure(settings))
    }

    /// Release the record and deregister the update channel. The last
    /// persisted state is what a later read sees.
    pub fn destroy(&mut self) {
        self.listening = false;
        if self.settings.take().is_some() {
            log_info!("Settings released");
        }
    }
}

fn read_persisted<P: PersistStore + ?Sized>(store: &P) -> Settings {
    let defaults = Settings::default();
    let blob = match store.read_data(SETTINGS_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            log_info!("No persisted settings; using defaults");
            return defaults;
        }
        Err(err) => {
            log_error!("Failed to read persisted settings: {err:?}");
            return defaults;
        }
    };

    match serde_json::from_slice::<Settings>(&blob) {
        Ok(settings) => settings,
        Err(err) => {
            log_warn!("Persisted settings are unreadable ({err}); using defaults");
            defaults
        }
    }
}

fn save<P: PersistStore + ?Sized>(store: &mut P, settings: &Settings) {
    let blob = match serde_json::to_vec(settings) {
        Ok(blob) => blob,
        Err(err) => {
            log_error!("Failed to serialize settings: {err}");
            return;
        }
    };

    if let Err(err) = store.write_data(SETTINGS_KEY, &blob) {
        log_error!("Failed to persist settings: {err:?}");
    }
}

fn reconfigure(settings: &Settings) -> Reconfigure {
    Reconfigure {
        tap_subscribed: settings.mode_change_on_shake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::SqlitePersist;

    #[test]
    fn defaults_match_first_run() {
        let settings = Settings::default();
        assert_eq!(settings.mode_change_interval_minutes, 10);
        assert!(settings.hourly_vibrate);
        assert_eq!(settings.hour_vibration_style, VibrationStyle::Long);
        assert!(!settings.quarter_hourly_vibrate);
        assert_eq!(settings.quarter_vibration_style, VibrationStyle::Short);
        assert_eq!(settings.enabled_modes, [true; MODE_COUNT]);
        assert!(!settings.mode_change_on_shake);
    }

    #[test]
    fn load_uses_defaults_without_persisted_record() {
        let store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        assert_eq!(settings.load(&store), &Settings::default());
    }

    #[test]
    fn load_reads_storage_only_once() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        let first = settings.load(&store).clone();

        let mut changed = Settings::default();
        changed.mode_change_interval_minutes = 42;
        store
            .write_data(SETTINGS_KEY, &serde_json::to_vec(&changed).unwrap())
            .unwrap();

        assert_eq!(settings.load(&store), &first);
    }

    #[test]
    fn load_overlays_partial_record() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        store
            .write_data(SETTINGS_KEY, br#"{"quarterHourlyVibrate":true}"#)
            .unwrap();

        let mut settings = SettingsStore::new();
        let loaded = settings.load(&store);
        assert!(loaded.quarter_hourly_vibrate);
        assert_eq!(loaded.mode_change_interval_minutes, 10);
        assert_eq!(loaded.hour_vibration_style, VibrationStyle::Long);
    }

    #[test]
    fn load_repairs_zero_interval() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        store
            .write_data(SETTINGS_KEY, br#"{"modeChangeIntervalMinutes":0}"#)
            .unwrap();

        let mut settings = SettingsStore::new();
        assert_eq!(settings.load(&store).mode_change_interval_minutes, 1);
    }

    #[test]
    fn load_falls_back_on_garbage() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        store.write_data(SETTINGS_KEY, b"\x00\x01not json").unwrap();

        let mut settings = SettingsStore::new();
        assert_eq!(settings.load(&store), &Settings::default());
    }

    #[test]
    fn update_merges_single_field_and_persists() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        settings.init(&store);

        let update = SettingsUpdate {
            mode_change_interval_minutes: Some(5),
            ..SettingsUpdate::default()
        };
        settings.apply_update(&mut store, &update).unwrap();

        let expected = Settings {
            mode_change_interval_minutes: 5,
            ..Settings::default()
        };
        assert_eq!(settings.load(&store), &expected);

        let persisted: Settings =
            serde_json::from_slice(&store.read_data(SETTINGS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, expected);
    }

    #[test]
    fn update_clamps_non_positive_interval() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        settings.init(&store);

        for minutes in [0, -15] {
            let update = SettingsUpdate {
                mode_change_interval_minutes: Some(minutes),
                ..SettingsUpdate::default()
            };
            settings.apply_update(&mut store, &update).unwrap();
            assert_eq!(settings.load(&store).mode_change_interval_minutes, 1);
        }
    }

    #[test]
    fn update_reports_tap_subscription() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        settings.init(&store);

        let update = SettingsUpdate {
            mode_change_on_shake: Some(true),
            ..SettingsUpdate::default()
        };
        let reconfigure = settings.apply_update(&mut store, &update).unwrap();
        assert!(reconfigure.tap_subscribed);
    }

    #[test]
    fn updates_are_ignored_after_destroy() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        settings.init(&store);
        settings.destroy();

        let update = SettingsUpdate {
            hourly_vibrate: Some(false),
            ..SettingsUpdate::default()
        };
        assert!(settings.apply_update(&mut store, &update).is_none());
        assert!(!settings.is_listening());
        assert!(!store.exists(SETTINGS_KEY).unwrap());
    }

    #[test]
    fn load_after_destroy_rebuilds_from_storage() {
        let mut store = SqlitePersist::open_in_memory().unwrap();
        let mut settings = SettingsStore::new();
        settings.init(&store);

        let update = SettingsUpdate {
            quarter_hourly_vibrate: Some(true),
            ..SettingsUpdate::default()
        };
        settings.apply_update(&mut store, &update).unwrap();
        settings.destroy();

        store
            .write_data(SETTINGS_KEY, br#"{"modeChangeIntervalMinutes":3}"#)
            .unwrap();

        let reloaded = settings.load(&store).clone();
        assert_eq!(reloaded.mode_change_interval_minutes, 3);
        assert!(!reloaded.quarter_hourly_vibrate);
        assert!(!settings.is_listening());
        assert!(settings.apply_update(&mut store, &update).is_none());

        settings.init(&store);
        assert!(settings.apply_update(&mut store, &update).is_some());
    }

    #[test]
    fn record_round_trips_through_fresh_store() {
        let path = std::env::temp_dir().join(format!(
            "watchface-settings-{}-roundtrip.sqlite3",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let written = {
            let mut store = SqlitePersist::open(path.clone()).unwrap();
            let mut settings = SettingsStore::new();
            settings.init(&store);

            let mut modes = [None; MODE_COUNT];
            modes[2] = Some(false);
            let update = SettingsUpdate {
                hour_vibration_style: Some(VibrationStyle::Pattern),
                quarter_hourly_vibrate: Some(true),
                quarter_vibration_style: Some(VibrationStyle::Double),
                mode_change_interval_minutes: Some(30),
                enabled_modes: modes,
                mode_change_on_shake: Some(true),
                ..SettingsUpdate::default()
            };
            settings.apply_update(&mut store, &update).unwrap();
            settings.load(&store).clone()
        };

        let store = SqlitePersist::open(path.clone()).unwrap();
        let mut settings = SettingsStore::new();
        assert_eq!(settings.load(&store), &written);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn style_digits_round_trip() {
        for digit in 0..=4 {
            let style = VibrationStyle::from_digit(digit).unwrap();
            assert_eq!(style.as_digit(), digit);
        }
        assert_eq!(VibrationStyle::from_digit(5), None);
    }
}
