//! Core types for the generation workflow.

use serde::{Deserialize, Serialize};

/// Image formats the studio recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Attempts to match a MIME type string.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Aspect ratios accepted by the generation request.
///
/// Honored in generation mode; in editing mode the model tends to preserve
/// the input image's own ratio, so the hint is best-effort there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 3:4 portrait.
    #[serde(rename = "3:4")]
    Portrait,
    /// 4:3 landscape.
    #[serde(rename = "4:3")]
    Landscape,
    /// 9:16 tall (stories/reels).
    #[serde(rename = "9:16")]
    Tall,
    /// 16:9 widescreen.
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    /// All selectable ratios, in display order.
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Portrait,
        Self::Landscape,
        Self::Tall,
        Self::Wide,
    ];

    /// Returns the ratio as a `"W:H"` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Tall => "9:16",
            Self::Wide => "16:9",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(Self::Square),
            "3:4" => Ok(Self::Portrait),
            "4:3" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Tall),
            "16:9" => Ok(Self::Wide),
            _ => Err(format!("unknown aspect ratio: {s}")),
        }
    }
}

/// Base64 image payload plus its MIME type, as sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePayload {
    /// Base64-encoded image bytes, without any data-URL framing.
    pub data: String,
    /// MIME type of the encoded bytes, e.g. `image/png`.
    pub mime_type: String,
}

/// A request to generate or edit an image.
///
/// Presence of a source payload selects editing mode; without one the
/// provider generates from the prompt alone.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image or edit.
    pub prompt: String,
    /// Source image for editing, if any.
    pub source: Option<SourcePayload>,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            source: None,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Attaches a source image payload for editing.
    pub fn with_source(mut self, data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.source = Some(SourcePayload {
            data: data.into(),
            mime_type: mime_type.into(),
        });
        self
    }

    /// Sets the requested aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Returns true if this is an editing request (has a source image).
    pub fn is_edit(&self) -> bool {
        self.source.is_some()
    }
}

/// A completed generation, as kept in the history log.
///
/// Immutable once created; entries leave the log only by eviction or an
/// explicit clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The result image as a `data:<mime>;base64,<payload>` URL.
    pub url: String,
    /// The exact trimmed prompt that produced it.
    pub prompt: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl GenerationResult {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
