//! Key/value persistence for the settings record and the rotation cursor.
//!
//! Records are addressed by small integer keys, the same shape as the watch
//! persistence API: one opaque blob for the settings and one integer for the
//! last-used background.

mod schema;
mod sqlite;

use anyhow::Result;

pub use sqlite::SqlitePersist;

/// Last pre-loaded background index.
pub const CURRENT_IMAGE_KEY: u32 = 0;
/// Serialized [`crate::settings::Settings`] record.
pub const SETTINGS_KEY: u32 = 1;

pub trait PersistStore {
    fn exists(&self, key: u32) -> Result<bool>;

    fn read_data(&self, key: u32) -> Result<Option<Vec<u8>>>;

    fn write_data(&mut self, key: u32, data: &[u8]) -> Result<()>;

    fn read_int(&self, key: u32) -> Result<Option<i32>>;

    fn write_int(&mut self, key: u32, value: i32) -> Result<()>;
}
