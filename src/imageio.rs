// this_file: src/imageio.rs
//! PNG/JPEG loading and saving for the CLI layer.
//!
//! The core pipeline only ever sees decoded `RgbaImage` buffers; this
//! module is the boundary where file formats exist.

use crate::error::{Error, Result};
use crate::logging::Timer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JPEG output quality, matching common screenshot-diff usage.
const JPEG_QUALITY: u8 = 90;

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a PNG or JPEG file as an RGBA pixel grid.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let format = match extension_of(path).as_str() {
        "png" => ImageFormat::Png,
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        other => {
            return Err(Error::Image(format!(
                "unsupported image format '.{}' for {}",
                other,
                path.display()
            )))
        }
    };

    let file = File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let decoded = image::load(reader, format)
        .map_err(|e| Error::Image(format!("failed to decode {}: {}", path.display(), e)))?;

    Ok(decoded.to_rgba8())
}

/// Save the composite image; the output format follows the file extension.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let timer = Timer::new(format!("saving {}", path.display()));
    info!("Saving diff image to {}", path.display());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match extension_of(path).as_str() {
        "png" => {
            DynamicImage::ImageRgba8(img.clone())
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(|e| Error::Image(format!("failed to encode PNG: {}", e)))?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel; flatten before encoding.
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| Error::Image(format!("failed to encode JPEG: {}", e)))?;
        }
        other => {
            return Err(Error::Image(format!(
                "unsupported output format '.{}' for {}",
                other,
                path.display()
            )))
        }
    }

    timer.log_elapsed(log::Level::Info);
    Ok(())
}
