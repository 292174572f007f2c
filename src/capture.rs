/// Still-frame capture
///
/// The operator picks an image file (a snapshot from any camera app);
/// it is decoded, downscaled and re-encoded as the JPEG data URL the
/// backend expects. The JPEG bytes double as the on-screen preview.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;

/// Longest side of a captured frame, in pixels
const MAX_FRAME_SIDE: u32 = 640;

/// JPEG quality for frames sent to the backend
const JPEG_QUALITY: u8 = 90;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),

    #[error("capture task failed: {0}")]
    Join(String),
}

/// A captured still, ready to upload
#[derive(Clone, PartialEq)]
pub struct CapturedFrame {
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
    /// Encoded JPEG (for the preview widget)
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

// Keep the multi-kilobyte payload out of logs
impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("jpeg_bytes", &self.jpeg.len())
            .finish()
    }
}

/// Load a frame from disk without blocking the UI thread
pub async fn load_frame(path: PathBuf) -> Result<CapturedFrame, CaptureError> {
    // Decoding and resizing are CPU-bound
    task::spawn_blocking(move || load_frame_blocking(&path))
        .await
        .map_err(|e| CaptureError::Join(e.to_string()))?
}

fn load_frame_blocking(path: &Path) -> Result<CapturedFrame, CaptureError> {
    let bytes = std::fs::read(path).map_err(|source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = frame_from_bytes(&bytes)?;
    log::info!(
        "📸 Captured frame from {} ({}x{}, {} bytes)",
        path.display(),
        frame.width,
        frame.height,
        frame.jpeg.len()
    );
    Ok(frame)
}

/// Decode any supported image and normalize it into a frame
pub fn frame_from_bytes(bytes: &[u8]) -> Result<CapturedFrame, CaptureError> {
    let img = image::load_from_memory(bytes)?;

    let img = if img.width() > MAX_FRAME_SIDE || img.height() > MAX_FRAME_SIDE {
        img.resize(MAX_FRAME_SIDE, MAX_FRAME_SIDE, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    let data_url = format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&jpeg));

    Ok(CapturedFrame {
        data_url,
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 120, 40, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_large_frame_is_downscaled() {
        let frame = frame_from_bytes(&png_bytes(1280, 720)).unwrap();
        assert_eq!((frame.width, frame.height), (640, 360));
    }

    #[test]
    fn test_small_frame_keeps_size() {
        let frame = frame_from_bytes(&png_bytes(320, 240)).unwrap();
        assert_eq!((frame.width, frame.height), (320, 240));
    }

    #[test]
    fn test_data_url_wraps_jpeg() {
        let frame = frame_from_bytes(&png_bytes(64, 64)).unwrap();

        let payload = frame.data_url.strip_prefix(DATA_URL_PREFIX).unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        assert_eq!(decoded, frame.jpeg);
        assert_eq!(&frame.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = frame_from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(CaptureError::Image(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = load_frame(PathBuf::from("/nonexistent/snapshot.jpg")).await;
        assert!(matches!(result, Err(CaptureError::Io { .. })));
    }
}
