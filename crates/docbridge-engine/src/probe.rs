//! Image dimension probing for uploaded files.
//!
//! A failed probe never fails an upload; the orchestrator logs the error and
//! stores the descriptor without dimensions.

use async_trait::async_trait;
use docbridge_types::RawFile;
use thiserror::Error;

/// Pixel dimensions of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("unsupported image format: {0}")]
    Unsupported(String),

    #[error("image data truncated")]
    Truncated,

    #[error("malformed image: {0}")]
    Malformed(&'static str),

    #[error("probe failed: {0}")]
    Backend(String),
}

/// Determines the dimensions of an uploaded image.
///
/// `src` is the public URL the file was stored under, for probes that fetch
/// the stored copy instead of reading the submitted bytes.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, file: &RawFile, src: &str) -> Result<ImageSize, ProbeError>;
}

/// Reads dimensions from PNG, GIF, and JPEG headers in the submitted bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderProbe;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[async_trait]
impl ImageProbe for HeaderProbe {
    async fn probe(&self, file: &RawFile, _src: &str) -> Result<ImageSize, ProbeError> {
        header_size(&file.data).ok_or_else(|| ProbeError::Unsupported(file.mime_type.clone()))?
    }
}

/// `None` when the bytes match no known format.
fn header_size(data: &[u8]) -> Option<Result<ImageSize, ProbeError>> {
    if data.starts_with(&PNG_SIGNATURE) {
        Some(png_size(data))
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(gif_size(data))
    } else if data.starts_with(&[0xFF, 0xD8]) {
        Some(jpeg_size(data))
    } else {
        None
    }
}

fn png_size(data: &[u8]) -> Result<ImageSize, ProbeError> {
    let ihdr = data.get(12..16).ok_or(ProbeError::Truncated)?;
    if ihdr != b"IHDR" {
        return Err(ProbeError::Malformed("first PNG chunk is not IHDR"));
    }
    Ok(ImageSize {
        width: be_u32(data, 16)?,
        height: be_u32(data, 20)?,
    })
}

fn gif_size(data: &[u8]) -> Result<ImageSize, ProbeError> {
    let bytes = data.get(6..10).ok_or(ProbeError::Truncated)?;
    Ok(ImageSize {
        width: u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        height: u16::from_le_bytes([bytes[2], bytes[3]]) as u32,
    })
}

/// Walk JPEG segments until a start-of-frame marker.
fn jpeg_size(data: &[u8]) -> Result<ImageSize, ProbeError> {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            return Err(ProbeError::Malformed("expected JPEG marker"));
        }
        let marker = data[i + 1];
        if marker == 0xFF {
            // fill byte
            i += 1;
            continue;
        }
        i += 2;
        match marker {
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return Err(ProbeError::Malformed("no frame header before scan")),
            _ => {}
        }
        let segment_len = be_u16(data, i)? as usize;
        if segment_len < 2 {
            return Err(ProbeError::Malformed("JPEG segment length"));
        }
        if is_start_of_frame(marker) {
            let height = be_u16(data, i + 3)? as u32;
            let width = be_u16(data, i + 5)? as u32;
            return Ok(ImageSize { width, height });
        }
        i += segment_len;
    }
    Err(ProbeError::Truncated)
}

fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn be_u16(data: &[u8], at: usize) -> Result<u16, ProbeError> {
    data.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or(ProbeError::Truncated)
}

fn be_u32(data: &[u8], at: usize) -> Result<u32, ProbeError> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(ProbeError::Truncated)
}


#[cfg(test)]
mod tests {
    use super::fixtures::png_header;
    use super::*;

    fn file(mime: &str, data: Vec<u8>) -> RawFile {
        RawFile::new("f", mime, data)
    }

    #[tokio::test]
    async fn png_dimensions() {
        let size = HeaderProbe
            .probe(&file("image/png", png_header(640, 480)), "")
            .await
            .unwrap();
        assert_eq!(size, ImageSize { width: 640, height: 480 });
    }

    #[tokio::test]
    async fn gif_dimensions() {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&[0x20, 0x01, 0x10, 0x00]);
        let size = HeaderProbe.probe(&file("image/gif", data), "").await.unwrap();
        assert_eq!(size, ImageSize { width: 288, height: 16 });
    }

    #[tokio::test]
    async fn jpeg_dimensions_after_app_segment() {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment, length 4 (2 length bytes + 2 payload bytes)
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB]);
        // SOF0: length 11, precision 8, height 200, width 300
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0xC8, 0x01, 0x2C]);
        data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00]);
        let size = HeaderProbe.probe(&file("image/jpeg", data), "").await.unwrap();
        assert_eq!(size, ImageSize { width: 300, height: 200 });
    }

    #[tokio::test]
    async fn jpeg_scan_without_frame_is_malformed() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02];
        let err = HeaderProbe.probe(&file("image/jpeg", data), "").await.unwrap_err();
        assert!(matches!(err, ProbeError::Malformed(_)));
    }

    #[tokio::test]
    async fn truncated_png() {
        let mut data = png_header(1, 1);
        data.truncate(18);
        let err = HeaderProbe.probe(&file("image/png", data), "").await.unwrap_err();
        assert_eq!(err, ProbeError::Truncated);
    }

    #[tokio::test]
    async fn unknown_format_is_unsupported() {
        let err = HeaderProbe
            .probe(&file("image/svg+xml", b"<svg/>".to_vec()), "")
            .await
            .unwrap_err();
        assert_eq!(err, ProbeError::Unsupported("image/svg+xml".into()));
    }
}
