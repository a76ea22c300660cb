use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;

use super::ImageId;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Source of decoded background images. Dropping an image releases it.
pub trait ImageLoader {
    type Image;

    fn load(&mut self, id: ImageId) -> Result<Self::Image>;
}

/// A decoded background, ready for display.
#[derive(Debug)]
pub struct BackgroundImage {
    id: ImageId,
    pixels: RgbaImage,
}

impl BackgroundImage {
    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl Drop for BackgroundImage {
    fn drop(&mut self) {
        log_debug!("Released background {}", self.id);
    }
}

/// Loads `<resource_dir>/<id>.png`.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    resource_dir: PathBuf,
}

impl FsImageLoader {
    pub fn new(resource_dir: PathBuf) -> Self {
        Self { resource_dir }
    }

    pub fn path_for(&self, id: ImageId) -> PathBuf {
        self.resource_dir.join(format!("{}.png", id.name()))
    }
}

impl ImageLoader for FsImageLoader {
    type Image = BackgroundImage;

    fn load(&mut self, id: ImageId) -> Result<BackgroundImage> {
        let path = self.path_for(id);
        let pixels = image::open(&path)
            .with_context(|| format!("failed to load background {}", path.display()))?
            .to_rgba8();

        log_debug!(
            "Loaded background {} ({}x{})",
            id,
            pixels.width(),
            pixels.height()
        );
        Ok(BackgroundImage { id, pixels })
    }
}
