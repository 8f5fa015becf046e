//! Utility functions used in all other roislice modules.

use std::path::Path;

use image::ImageFormat;

use crate::error::{Result, RoisliceError};

/// Determine the raster format to write from the extension of `path`, e.g. PNG for "brain.png".
pub fn output_format<P>(path: P) -> Result<ImageFormat>
where
    P: AsRef<Path>,
{
    ImageFormat::from_path(path.as_ref()).map_err(RoisliceError::Save)
}
