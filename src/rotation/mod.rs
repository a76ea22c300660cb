//! Background rotation with one-ahead pre-loading.
//!
//! The rotator holds at most two decoded images: the one on screen and the
//! one that will replace it. Every change of background goes through
//! [`ImageRotator::advance`].

mod loader;

use std::fmt;

use anyhow::{bail, Result};

use crate::persist::{PersistStore, CURRENT_IMAGE_KEY};

pub use loader::{BackgroundImage, FsImageLoader, ImageLoader};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Catalog index used when nothing has been persisted yet.
const START_IMAGE: usize = 0;

/// Name of a background resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(&'static str);

impl ImageId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Backgrounds in rotation order.
pub const CATALOG: [ImageId; 6] = [
    ImageId::new("ring_whole_screen"),
    ImageId::new("citadel_barracks_logo"),
    ImageId::new("bigred"),
    ImageId::new("spike"),
    ImageId::new("caa_decal"),
    ImageId::new("citadel_seal"),
];

/// True on the minute that opens a new rotation window.
///
/// `interval_minutes` is validated by the settings layer and is never zero.
pub fn on_interval_elapsed(minute_of_hour: u32, interval_minutes: u16) -> bool {
    debug_assert!(interval_minutes > 0, "interval must be at least one minute");
    minute_of_hour % u32::from(interval_minutes) < 1
}

pub struct ImageRotator<L: ImageLoader> {
    loader: L,
    catalog: Vec<ImageId>,
    /// Index of the pre-loaded image.
    cursor: usize,
    current: Option<L::Image>,
    pending: Option<L::Image>,
}

impl<L: ImageLoader> ImageRotator<L> {
    /// Start at `initial_index`, falling back to the first entry when the
    /// index is outside the catalog, and pre-load that image.
    pub fn init(loader: L, catalog: Vec<ImageId>, initial_index: i64) -> Result<Self> {
        if catalog.is_empty() {
            bail!("background catalog is empty");
        }

        let cursor = match usize::try_from(initial_index) {
            Ok(index) if index < catalog.len() => index,
            _ => {
                log_warn!(
                    "Background index {} outside catalog of {}; starting over",
                    initial_index,
                    catalog.len()
                );
                START_IMAGE
            }
        };

        let mut rotator = Self {
            loader,
            catalog,
            cursor,
            current: None,
            pending: None,
        };
        rotator.pending = rotator.load_at_cursor();
        Ok(rotator)
    }

    /// Start from the persisted cursor. A corrupted value is reset and the
    /// repaired cursor written back.
    pub fn restore<P: PersistStore + ?Sized>(
        loader: L,
        catalog: Vec<ImageId>,
        store: &mut P,
    ) -> Result<Self> {
        let persisted = match store.read_int(CURRENT_IMAGE_KEY) {
            Ok(value) => value,
            Err(err) => {
                log_error!("Failed to read background index: {err:?}");
                None
            }
        };

        let initial = persisted.map_or(START_IMAGE as i64, i64::from);
        let rotator = Self::init(loader, catalog, initial)?;

        if persisted.is_some_and(|value| i64::from(value) != rotator.cursor as i64) {
            rotator.persist_cursor(store);
        }
        Ok(rotator)
    }

    /// Promote the pre-loaded image to the screen, release the previous one
    /// and pre-load the next catalog entry.
    pub fn advance<P: PersistStore + ?Sized>(&mut self, store: &mut P) -> Result<&L::Image> {
        let promoted = match self.pending.take() {
            Some(image) => image,
            None => self.loader.load(self.catalog[self.cursor])?,
        };

        if self.current.take().is_some() {
            log_debug!("Released previous background");
        }

        self.cursor = (self.cursor + 1) % self.catalog.len();
        self.persist_cursor(store);
        self.pending = self.load_at_cursor();

        log_info!("Background advanced; next is {}", self.catalog[self.cursor]);
        Ok(&*self.current.insert(promoted))
    }

    /// Tap-gesture shortcut, independent of the interval schedule.
    pub fn on_user_advance<P: PersistStore + ?Sized>(
        &mut self,
        store: &mut P,
    ) -> Result<&L::Image> {
        self.advance(store)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&L::Image> {
        self.current.as_ref()
    }

    fn load_at_cursor(&mut self) -> Option<L::Image> {
        let id = self.catalog[self.cursor];
        match self.loader.load(id) {
            Ok(image) => Some(image),
            Err(err) => {
                log_error!("Failed to pre-load background {}: {err:?}", id);
                None
            }
        }
    }

    fn persist_cursor<P: PersistStore + ?Sized>(&self, store: &mut P) {
        let Ok(value) = i32::try_from(self.cursor) else {
            return;
        };
        if let Err(err) = store.write_int(CURRENT_IMAGE_KEY, value) {
            log_error!("Failed to persist background index: {err:?}");
        }
    }
}
