//! Image optimization
//!
//! PNGs go through oxipng losslessly, JPEGs are re-encoded at a fixed
//! quality. Optimized bytes replace the original only when smaller.
use super::{Transform, has_extension};
use crate::error::{TransformError, TransformResult};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use tracing::{debug, info};

pub const JPEG_QUALITY: u8 = 85;
const PNG_PRESET: u8 = 2;

#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    jpeg_quality: u8,
    png_preset: u8,
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self {
            jpeg_quality: JPEG_QUALITY,
            png_preset: PNG_PRESET,
        }
    }
}

impl ImageOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn optimize_png(&self, data: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let options = oxipng::Options::from_preset(self.png_preset);
        oxipng::optimize_from_memory(data, &options)
            .map_err(|e| TransformError::failed(self.name(), path, e))
    }

    fn optimize_jpeg(&self, data: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let decoded = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| TransformError::failed(self.name(), path, e))?;
        Ok(out)
    }
}

impl Transform for ImageOptimizer {
    fn name(&self) -> &str {
        "ImageOptimizer"
    }

    fn can_process(&self, path: &Path) -> bool {
        has_extension(path, &["png", "jpg", "jpeg"])
    }

    fn apply(&self, input: &[u8], path: &Path) -> TransformResult<Vec<u8>> {
        let optimized = if has_extension(path, &["png"]) {
            self.optimize_png(input, path)?
        } else {
            self.optimize_jpeg(input, path)?
        };
        Ok(smaller_of(input, optimized, path))
    }
}

/// Keep the optimized bytes only when they actually save space
fn smaller_of(original: &[u8], optimized: Vec<u8>, path: &Path) -> Vec<u8> {
    let original_size = original.len() as u64;
    let optimized_size = optimized.len() as u64;

    if optimized_size < original_size {
        let reduction = (original_size - optimized_size) as f64 / original_size as f64 * 100.0;
        info!(
            "✓ Optimized {} ({} -> {}, {:.1}% smaller)",
            path.display(),
            format_bytes(original_size),
            format_bytes(optimized_size),
            reduction
        );
        optimized
    } else {
        debug!("Optimized {} is not smaller, using original", path.display());
        original.to_vec()
    }
}

/// Format bytes in human readable format
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
