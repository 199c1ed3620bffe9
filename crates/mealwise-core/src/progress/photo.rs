//! Photo downscaling before persistence.
//!
//! Progress photos are stored inline in the progress log, so every photo
//! is shrunk to a bounded longest edge and re-encoded as lossy JPEG.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Target size and quality for stored photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Maximum length of the longest edge, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            quality: 70,
        }
    }
}

/// A compressed photo ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPhoto {
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("failed to read photo {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to decode photo: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode photo: {0}")]
    Encode(#[source] image::ImageError),
}

/// Dimensions after constraining the longest edge to `max`, preserving the
/// aspect ratio. Images already within bounds keep their size.
pub fn target_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (f64::from(short) * f64::from(max) / f64::from(long)).round() as u32;
        scaled.max(1)
    };

    if width > height {
        if width > max {
            return (max, scale(height, width));
        }
    } else if height > max {
        return (scale(width, height), max);
    }
    (width, height)
}

/// Decode, downscale and re-encode an image.
pub fn compress_image(
    bytes: &[u8],
    settings: &CompressionSettings,
) -> Result<CompressedPhoto, PhotoError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = target_dimensions(img.width(), img.height(), settings.max_dimension);

    let resized = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };
    let rgb = resized.to_rgb8();

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, settings.quality);
    encoder.encode_image(&rgb).map_err(PhotoError::Encode)?;

    tracing::debug!(width, height, bytes = buf.len(), "photo compressed");

    Ok(CompressedPhoto {
        data_url: format!("{DATA_URL_PREFIX}{}", STANDARD.encode(&buf)),
        width,
        height,
    })
}

/// Read an image file and compress it.
pub fn compress_file(
    path: &Path,
    settings: &CompressionSettings,
) -> Result<CompressedPhoto, PhotoError> {
    let bytes = std::fs::read(path).map_err(|source| PhotoError::Read {
        path: path.display().to_string(),
        source,
    })?;
    compress_image(&bytes, settings)
}

/// Decode the JPEG bytes back out of a stored data URL.
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let payload = data_url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(payload).ok()
}

/// Dimensions of a stored photo, if it decodes.
pub fn data_url_dimensions(data_url: &str) -> Option<(u32, u32)> {
    let bytes = decode_data_url(data_url)?;
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    reader.into_dimensions().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(target_dimensions(1600, 900, 800), (800, 450));
    }

    #[test]
    fn portrait_is_bounded_by_height() {
        assert_eq!(target_dimensions(1000, 3000, 800), (267, 800));
    }

    #[test]
    fn square_and_small_images() {
        assert_eq!(target_dimensions(1200, 1200, 800), (800, 800));
        assert_eq!(target_dimensions(640, 480, 800), (640, 480));
        assert_eq!(target_dimensions(5000, 2, 800), (800, 1));
    }

    #[test]
    fn compressed_photo_has_max_longest_edge() {
        let settings = CompressionSettings::default();
        let photo = compress_image(&png_bytes(1600, 1200), &settings).unwrap();
        assert_eq!((photo.width, photo.height), (800, 600));
        assert!(photo.data_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(data_url_dimensions(&photo.data_url), Some((800, 600)));
    }

    #[test]
    fn compressed_portrait_preserves_aspect_ratio() {
        let settings = CompressionSettings {
            max_dimension: 100,
            quality: 50,
        };
        let photo = compress_image(&png_bytes(300, 450), &settings).unwrap();
        assert_eq!(photo.height, 100);
        let ratio = f64::from(photo.width) / f64::from(photo.height);
        assert!((ratio - 300.0 / 450.0).abs() < 0.01, "ratio {ratio}");
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = compress_image(b"not an image", &CompressionSettings::default()).unwrap_err();
        assert!(matches!(err, PhotoError::Decode(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = compress_file(
            Path::new("/nonexistent/photo.png"),
            &CompressionSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PhotoError::Read { .. }));
    }

    #[test]
    fn foreign_data_url_does_not_decode() {
        assert!(decode_data_url("data:image/png;base64,AAAA").is_none());
    }
}
