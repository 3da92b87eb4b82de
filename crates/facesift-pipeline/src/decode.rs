use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A candidate file could not be decoded as an image. Per-candidate and
/// non-fatal: the pipeline records it and moves on.
#[derive(Error, Debug)]
#[error("failed to decode {}: {source}", path.display())]
pub struct DecodeError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Decode an image file into an RGB pixel buffer.
pub fn load_rgb(path: &Path) -> Result<RgbImage, DecodeError> {
    let img = image::open(path).map_err(|source| DecodeError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}
