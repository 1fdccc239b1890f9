//! Data-URL codec for source and result images.
//!
//! Selected files are held in two forms at once: a self-describing
//! `data:<mime>;base64,<payload>` string for display, and the bare payload
//! for transmission. The payload is always the suffix of the data URL after
//! the first comma.

use crate::error::{Result, StudioError};
use crate::types::ImageFormat;
use base64::Engine;
use std::path::Path;

/// A user-selected source image, encoded and ready for an edit request.
///
/// Never persisted; lives only for the duration of one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Display form: `data:<mime>;base64,<payload>`.
    pub data_url: String,
    /// Transmission form: the base64 payload with framing removed.
    pub payload: String,
    /// MIME type of the underlying bytes, e.g. `image/png`.
    pub mime_type: String,
}

impl SourceImage {
    /// Encodes raw image bytes with a known MIME type.
    ///
    /// Rejects any MIME type not prefixed `image/`.
    pub fn from_bytes(data: &[u8], mime_type: &str) -> Result<Self> {
        if !mime_type.starts_with("image/") {
            return Err(StudioError::InvalidInput(
                "Please upload a valid image file.".into(),
            ));
        }

        let payload = base64::engine::general_purpose::STANDARD.encode(data);
        let data_url = format!("data:{mime_type};base64,{payload}");

        Ok(Self {
            data_url,
            payload,
            mime_type: mime_type.to_string(),
        })
    }

    /// Reads an image file and encodes it, sniffing the MIME type from magic
    /// bytes with a file-extension fallback.
    ///
    /// Read failures and unrecognized formats both surface as invalid input.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StudioError::InvalidInput(format!("could not read {}: {e}", path.display())))?;

        let format = ImageFormat::from_magic_bytes(&data).or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        });

        let format = format.ok_or_else(|| {
            StudioError::InvalidInput("Please upload a valid image file.".into())
        })?;

        Self::from_bytes(&data, format.mime_type())
    }
}

/// Builds a `data:<mime>;base64,<payload>` URL from an already-encoded
/// payload, as returned by the provider.
pub fn to_data_url(mime_type: &str, payload: &str) -> String {
    format!("data:{mime_type};base64,{payload}")
}

/// Decodes a data URL (or bare base64 string) back into raw bytes and its
/// MIME type, defaulting to `image/png` when no framing is present.
///
/// Base64 handling is lenient: embedded whitespace and missing padding are
/// accepted.
pub fn decode_data_url(url: &str) -> Result<(Vec<u8>, String)> {
    let (mime_type, b64) = match url.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| StudioError::Decode("data URL has no payload".into()))?;
            let mime = header
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .unwrap_or("image/png");
            (mime.to_string(), payload)
        }
        None => ("image/png".to_string(), url),
    };

    let cleaned: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned))
        .map_err(|e| StudioError::Decode(e.to_string()))?;

    Ok((bytes, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_suffix_of_data_url() {
        let image = SourceImage::from_bytes(b"fake image bytes", "image/png").unwrap();

        let (_, suffix) = image.data_url.split_once(',').unwrap();
        assert_eq!(image.payload, suffix);
        assert!(image.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_non_image_mime_rejected() {
        let err = SourceImage::from_bytes(b"%PDF-1.7", "application/pdf").unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput(_)));

        let err = SourceImage::from_bytes(b"x", "text/html").unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_from_path_missing_file_is_invalid_input() {
        let err = SourceImage::from_path("/no/such/file.png").await.unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_from_path_sniffs_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.bin");
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0; 16]);
        std::fs::write(&path, &bytes).unwrap();

        let image = SourceImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_from_path_unrecognized_bytes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"just some text, long enough to sniff").unwrap();

        let err = SourceImage::from_path(&path).await.unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_data_url_round_trip() {
        let image = SourceImage::from_bytes(b"round trip", "image/jpeg").unwrap();
        let (bytes, mime) = decode_data_url(&image.data_url).unwrap();
        assert_eq!(bytes, b"round trip");
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn test_decode_bare_base64_defaults_to_png() {
        let (bytes, mime) = decode_data_url("Zm9v").unwrap();
        assert_eq!(bytes, b"foo");
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn test_decode_tolerates_missing_padding_and_whitespace() {
        // "foob" encodes to "Zm9vYg==" - drop the padding and add a newline
        let (bytes, _) = decode_data_url("Zm9v\nYg").unwrap();
        assert_eq!(bytes, b"foob");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("!!not base64!!").is_err());
    }
}
