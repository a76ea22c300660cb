//! Inbound configuration messages from the companion app.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{VibrationStyle, MODE_COUNT};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const HOUR_VIBRATION: &str = "HourVibration";
const HOUR_VIBRATION_TYPE: &str = "HourVibrationType";
const QUARTER_HOUR_VIBRATION: &str = "QuarterHourVibration";
const QUARTER_HOUR_VIBRATION_TYPE: &str = "QuarterHourVibrationType";
const MODE_CHANGE_INTERVAL: &str = "ModeChangeInterval";
const WATCHFACE_ROTATION: &str = "WatchfaceRotation";
const MODE_CHANGE_SHAKE: &str = "ModeChangeShake";

/// A single value in a configuration message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<ConfigValue>),
    /// Anything else (null, floats, objects, out-of-range integers). Kept so
    /// one odd value does not reject the rest of the message.
    Other(serde_json::Value),
}

impl ConfigValue {
    /// Toggles are "on" when their numeric value is positive.
    fn as_flag(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value > 0),
            ConfigValue::Text(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                other => other.parse::<i64>().ok().map(|value| value > 0),
            },
            ConfigValue::List(_) | ConfigValue::Other(_) => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            ConfigValue::Text(text) => text.trim().parse().ok(),
            ConfigValue::Bool(_) | ConfigValue::List(_) | ConfigValue::Other(_) => None,
        }
    }

    /// Styles travel as a string whose first character is the style digit.
    fn as_style(&self) -> Option<VibrationStyle> {
        let digit = match self {
            ConfigValue::Text(text) => text.chars().next()?.to_digit(10)?,
            ConfigValue::Int(value) => u32::try_from(*value).ok()?,
            ConfigValue::Bool(_) | ConfigValue::List(_) | ConfigValue::Other(_) => return None,
        };
        VibrationStyle::from_digit(digit)
    }
}

/// Key/value dictionary as delivered by the configuration channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ConfigMessage {
    values: HashMap<String, ConfigValue>,
}

impl ConfigMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("configuration message is not a JSON object")
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Enabled flag for mode `offset`, either as an indexed key or as one
    /// element of a list-valued key.
    fn mode_flag(&self, offset: usize) -> Option<&ConfigValue> {
        self.get(&format!("{WATCHFACE_ROTATION}[{offset}]"))
            .or_else(|| match self.get(WATCHFACE_ROTATION) {
                Some(ConfigValue::List(values)) => values.get(offset),
                _ => None,
            })
    }
}

/// Partial settings record: `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub hourly_vibrate: Option<bool>,
    pub hour_vibration_style: Option<VibrationStyle>,
    pub quarter_hourly_vibrate: Option<bool>,
    pub quarter_vibration_style: Option<VibrationStyle>,
    /// Raw value; clamped to at least one minute when applied.
    pub mode_change_interval_minutes: Option<i64>,
    pub enabled_modes: [Option<bool>; MODE_COUNT],
    pub mode_change_on_shake: Option<bool>,
}

impl SettingsUpdate {
    /// Pick out every recognized key. Malformed values are skipped one key
    /// at a time; the rest of the message still applies.
    pub fn from_message(message: &ConfigMessage) -> Self {
        log_debug!("Parsing {} configuration values", message.len());

        let mut enabled_modes = [None; MODE_COUNT];
        for (offset, slot) in enabled_modes.iter_mut().enumerate() {
            let key = format!("{WATCHFACE_ROTATION}[{offset}]");
            *slot = message
                .mode_flag(offset)
                .and_then(|value| parsed(&key, value, ConfigValue::as_flag));
        }

        Self {
            hourly_vibrate: field(message, HOUR_VIBRATION, ConfigValue::as_flag),
            hour_vibration_style: field(message, HOUR_VIBRATION_TYPE, ConfigValue::as_style),
            quarter_hourly_vibrate: field(message, QUARTER_HOUR_VIBRATION, ConfigValue::as_flag),
            quarter_vibration_style: field(
                message,
                QUARTER_HOUR_VIBRATION_TYPE,
                ConfigValue::as_style,
            ),
            mode_change_interval_minutes: field(message, MODE_CHANGE_INTERVAL, ConfigValue::as_int),
            enabled_modes,
            mode_change_on_shake: field(message, MODE_CHANGE_SHAKE, ConfigValue::as_flag),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn field<T>(
    message: &ConfigMessage,
    key: &str,
    convert: impl Fn(&ConfigValue) -> Option<T>,
) -> Option<T> {
    message
        .get(key)
        .and_then(|value| parsed(key, value, convert))
}

fn parsed<T>(
    key: &str,
    value: &ConfigValue,
    convert: impl Fn(&ConfigValue) -> Option<T>,
) -> Option<T> {
    let result = convert(value);
    if result.is_none() {
        log_warn!("Ignoring malformed value for '{}': {:?}", key, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_companion_payload() {
        let message = ConfigMessage::from_json(
            r#"{
                "HourVibration": 1,
                "HourVibrationType": "4",
                "QuarterHourVibration": 0,
                "QuarterHourVibrationType": "3",
                "ModeChangeInterval": 15,
                "WatchfaceRotation[1]": 0,
                "ModeChangeShake": true,
                "ClassYear": 2005
            }"#,
        )
        .unwrap();

        let update = SettingsUpdate::from_message(&message);
        assert_eq!(update.hourly_vibrate, Some(true));
        assert_eq!(update.hour_vibration_style, Some(VibrationStyle::Pattern));
        assert_eq!(update.quarter_hourly_vibrate, Some(false));
        assert_eq!(update.quarter_vibration_style, Some(VibrationStyle::Double));
        assert_eq!(update.mode_change_interval_minutes, Some(15));
        assert_eq!(
            update.enabled_modes,
            [None, Some(false), None, None, None, None, None]
        );
        assert_eq!(update.mode_change_on_shake, Some(true));
    }

    #[test]
    fn absent_keys_leave_fields_unset() {
        let message = ConfigMessage::new().with(MODE_CHANGE_INTERVAL, ConfigValue::Int(5));
        let update = SettingsUpdate::from_message(&message);

        assert_eq!(
            update,
            SettingsUpdate {
                mode_change_interval_minutes: Some(5),
                ..SettingsUpdate::default()
            }
        );
    }

    #[test]
    fn malformed_values_are_skipped_individually() {
        let message = ConfigMessage::new()
            .with(HOUR_VIBRATION_TYPE, ConfigValue::Text(String::new()))
            .with(QUARTER_HOUR_VIBRATION_TYPE, ConfigValue::Text("9".into()))
            .with(MODE_CHANGE_INTERVAL, ConfigValue::Text("soon".into()))
            .with(HOUR_VIBRATION, ConfigValue::Int(0));

        let update = SettingsUpdate::from_message(&message);
        assert_eq!(update.hour_vibration_style, None);
        assert_eq!(update.quarter_vibration_style, None);
        assert_eq!(update.mode_change_interval_minutes, None);
        assert_eq!(update.hourly_vibrate, Some(false));
    }

    #[test]
    fn style_uses_first_character() {
        let message =
            ConfigMessage::new().with(HOUR_VIBRATION_TYPE, ConfigValue::Text("2x".into()));
        let update = SettingsUpdate::from_message(&message);
        assert_eq!(update.hour_vibration_style, Some(VibrationStyle::Long));
    }

    #[test]
    fn rotation_accepts_list_form() {
        let message = ConfigMessage::from_json(
            r#"{"WatchfaceRotation": [true, false, true, true, false, true, true]}"#,
        )
        .unwrap();
        let update = SettingsUpdate::from_message(&message);
        assert_eq!(
            update.enabled_modes,
            [
                Some(true),
                Some(false),
                Some(true),
                Some(true),
                Some(false),
                Some(true),
                Some(true)
            ]
        );
    }

    #[test]
    fn empty_message_changes_nothing() {
        let update = SettingsUpdate::from_message(&ConfigMessage::new());
        assert!(update.is_empty());
    }

    #[test]
    fn odd_values_do_not_drop_sibling_keys() {
        let message = ConfigMessage::from_json(
            r#"{
                "ModeChangeInterval": 5,
                "HourVibration": null,
                "QuarterHourVibration": 1.5,
                "HourVibrationType": {"digit": 4},
                "ModeChangeShake": 18446744073709551615
            }"#,
        )
        .unwrap();

        let update = SettingsUpdate::from_message(&message);
        assert_eq!(
            update,
            SettingsUpdate {
                mode_change_interval_minutes: Some(5),
                ..SettingsUpdate::default()
            }
        );
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(ConfigMessage::from_json("[1, 2]").is_err());
    }
}
