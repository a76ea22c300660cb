//! The watchface application state.
//!
//! [`Watchface`] owns the settings, the background rotator and the chime
//! engine for the lifetime of the process and exposes one entry point per
//! host callback: minute tick, tap gesture and configuration message.

mod clock;

use anyhow::Result;
use chrono::{NaiveDateTime, Timelike};

use crate::{
    chime::{ChimeEngine, Haptics},
    persist::PersistStore,
    rotation::{on_interval_elapsed, BackgroundImage, ImageId, ImageLoader, ImageRotator},
    settings::{ConfigMessage, Settings, SettingsStore, SettingsUpdate},
};

pub use clock::{clock_text, TickUnits};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Screen collaborator: clock label and background layer.
pub trait FaceDisplay<I> {
    fn show_time(&mut self, text: &str);

    fn show_background(&mut self, image: &I);
}

/// Host display that reports what would be drawn.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl FaceDisplay<BackgroundImage> for LogDisplay {
    fn show_time(&mut self, text: &str) {
        log::info!("Clock: {}", text);
    }

    fn show_background(&mut self, image: &BackgroundImage) {
        log::info!(
            "Background: {} ({}x{})",
            image.id(),
            image.width(),
            image.height()
        );
    }
}

#[derive(Debug, Clone)]
pub struct FaceOptions {
    pub clock_is_24h: bool,
    pub abbreviate: bool,
    pub catalog: Vec<ImageId>,
}

pub struct Watchface<P, L, D>
where
    P: PersistStore,
    L: ImageLoader,
    D: FaceDisplay<L::Image>,
{
    store: P,
    settings: SettingsStore,
    rotator: ImageRotator<L>,
    chimes: ChimeEngine,
    display: D,
    haptics: Box<dyn Haptics>,
    clock_is_24h: bool,
    tap_subscribed: bool,
}

impl<P, L, D> Watchface<P, L, D>
where
    P: PersistStore,
    L: ImageLoader,
    D: FaceDisplay<L::Image>,
{
    /// Load settings, restore the rotation and draw the first frame.
    pub fn start(
        mut store: P,
        loader: L,
        display: D,
        haptics: Box<dyn Haptics>,
        options: FaceOptions,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let mut settings = SettingsStore::new();
        let tap_subscribed = settings.init(&store).mode_change_on_shake;
        let rotator = ImageRotator::restore(loader, options.catalog, &mut store)?;

        let mut face = Self {
            store,
            settings,
            rotator,
            chimes: ChimeEngine::new(options.abbreviate),
            display,
            haptics,
            clock_is_24h: options.clock_is_24h,
            tap_subscribed,
        };

        face.advance_background();
        face.display.show_time(&clock_text(now, face.clock_is_24h));
        log_info!("Watchface started (tap to change: {})", tap_subscribed);
        Ok(face)
    }

    /// Minute-tick callback. The clock is redrawn first, then the hourly
    /// chime, then the rotation schedule and the quarter-hour chime, all
    /// against one settings snapshot.
    pub fn on_minute_tick(&mut self, now: NaiveDateTime, units: TickUnits) {
        self.display.show_time(&clock_text(now, self.clock_is_24h));

        let settings: Settings = self.settings.load(&self.store).clone();

        if units.hour {
            let chime = self
                .chimes
                .select_hourly_style(&settings, now.hour(), self.clock_is_24h);
            log_debug!("Hourly chime at {}: {:?}", now.hour(), chime);
            chime.dispatch(self.haptics.as_mut());
        }

        if units.minute {
            if on_interval_elapsed(now.minute(), settings.mode_change_interval_minutes) {
                self.advance_background();
            }

            let chime = self.chimes.select_quarterly_style(&settings, now.minute());
            if !chime.is_silent() {
                log_debug!("Quarter chime at :{:02}: {:?}", now.minute(), chime);
            }
            chime.dispatch(self.haptics.as_mut());
        }
    }

    /// Tap-gesture callback. Returns whether the background changed.
    pub fn on_tap(&mut self) -> bool {
        if !self.tap_subscribed {
            log_debug!("Tap ignored; change on shake is off");
            return false;
        }

        match self.rotator.on_user_advance(&mut self.store) {
            Ok(image) => {
                self.display.show_background(image);
                true
            }
            Err(err) => {
                log_error!("Background change on tap failed: {err:?}");
                false
            }
        }
    }

    /// Configuration-message callback.
    pub fn on_config(&mut self, message: &ConfigMessage) {
        if message.is_empty() {
            log_debug!("Empty configuration message; nothing to apply");
            return;
        }

        let update = SettingsUpdate::from_message(message);
        if let Some(reconfigure) = self.settings.apply_update(&mut self.store, &update) {
            if reconfigure.tap_subscribed != self.tap_subscribed {
                log_info!("Tap to change: {}", reconfigure.tap_subscribed);
            }
            self.tap_subscribed = reconfigure.tap_subscribed;
        }
    }

    /// Release settings and stop reacting to taps and configuration.
    pub fn shutdown(&mut self) {
        self.settings.destroy();
        self.tap_subscribed = false;
        log_info!("Watchface stopped");
    }

    pub fn settings(&mut self) -> &Settings {
        self.settings.load(&self.store)
    }

    pub fn rotator(&self) -> &ImageRotator<L> {
        &self.rotator
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn tap_subscribed(&self) -> bool {
        self.tap_subscribed
    }

    fn advance_background(&mut self) {
        match self.rotator.advance(&mut self.store) {
            Ok(image) => self.display.show_background(image),
            Err(err) => log_error!("Background change skipped: {err:?}"),
        }
    }
}
