use std::path::PathBuf;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory holding the persistence database.
    pub data_dir: PathBuf,
    /// Directory of `<image-id>.png` backgrounds.
    pub resource_dir: PathBuf,
    /// Host stand-in for the system 12/24-hour clock preference.
    pub clock_is_24h: bool,
    /// Collapse every five hourly pulses into one long pulse.
    pub abbreviate: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("watchface-data"),
            resource_dir: PathBuf::from("resources"),
            clock_is_24h: false,
            abbreviate: true,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("WATCHFACE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            resource_dir: lookup("WATCHFACE_RESOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.resource_dir),
            clock_is_24h: lookup("WATCHFACE_CLOCK_24H")
                .map(|value| is_truthy(&value))
                .unwrap_or(defaults.clock_is_24h),
            abbreviate: lookup("WATCHFACE_ABBREVIATE")
                .map(|value| is_truthy(&value))
                .unwrap_or(defaults.abbreviate),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("watchface.sqlite3")
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
