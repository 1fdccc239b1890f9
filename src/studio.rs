//! Workflow controller: owns the UI-facing state and sequences the
//! generation flow.

use crate::codec::{self, SourceImage};
use crate::error::{Result, StudioError};
use crate::generator::ImageGenerator;
use crate::history::{HistoryLog, HistoryStore, Storage};
use crate::types::{AspectRatio, GenerationRequest, GenerationResult, ImageFormat};
use std::path::{Path, PathBuf};

/// Fallback message when a provider error carries no text of its own.
const GENERIC_FAILURE: &str = "Failed to generate image. Please try again.";

/// Validation message for an empty prompt.
const EMPTY_PROMPT: &str = "Please enter a text prompt.";

/// Operating mode, determined solely by source-image presence at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Text-to-image: no source image attached.
    Generate,
    /// Instruction-based editing of the attached source image.
    Edit,
}

/// The generation workflow controller.
///
/// Sequences requests through the generator, keeps the bounded history in
/// sync with its store, and funnels every user-facing failure into a single
/// `last_error` slot. At most one generation is in flight; a trigger while
/// one is running is a no-op.
pub struct Studio<G: ImageGenerator, S: Storage> {
    generator: G,
    store: HistoryStore<S>,
    prompt: String,
    source_image: Option<SourceImage>,
    current_result: Option<String>,
    is_generating: bool,
    last_error: Option<String>,
    aspect_ratio: AspectRatio,
    history: HistoryLog,
}

impl<G: ImageGenerator, S: Storage> Studio<G, S> {
    /// Creates a controller, loading whatever history the store has.
    pub fn new(generator: G, store: HistoryStore<S>) -> Self {
        let history = store.load();
        Self {
            generator,
            store,
            prompt: String::new(),
            source_image: None,
            current_result: None,
            is_generating: false,
            last_error: None,
            aspect_ratio: AspectRatio::default(),
            history,
        }
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Currently selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Selects an aspect ratio for subsequent requests.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// The attached source image, if any.
    pub fn source_image(&self) -> Option<&SourceImage> {
        self.source_image.as_ref()
    }

    /// The most recent result image as a data URL, if any.
    pub fn current_result(&self) -> Option<&str> {
        self.current_result.as_deref()
    }

    /// True while a generation call is in flight.
    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    /// The most recent user-facing error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The history log, newest first.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Generate or edit mode, from source-image presence.
    pub fn mode(&self) -> Mode {
        if self.source_image.is_some() {
            Mode::Edit
        } else {
            Mode::Generate
        }
    }

    /// Attaches a source image from raw bytes and a MIME type.
    ///
    /// Ignored while a generation is in flight. Clears the current result and
    /// error; on codec failure the error slot is set and no image is attached.
    pub fn select_source_image(&mut self, data: &[u8], mime_type: &str) {
        if self.is_generating {
            return;
        }
        self.current_result = None;
        self.last_error = None;

        match SourceImage::from_bytes(data, mime_type) {
            Ok(image) => self.source_image = Some(image),
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    /// Attaches a source image read from a file, sniffing its type.
    ///
    /// Same contract as [`Studio::select_source_image`].
    pub async fn select_source_file(&mut self, path: impl AsRef<Path>) {
        if self.is_generating {
            return;
        }
        self.current_result = None;
        self.last_error = None;

        match SourceImage::from_path(path).await {
            Ok(image) => self.source_image = Some(image),
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    /// Detaches the source image and drops the current result.
    pub fn remove_source_image(&mut self) {
        self.source_image = None;
        self.current_result = None;
    }

    /// Runs one generation with the current prompt, source image, and aspect
    /// ratio.
    ///
    /// A no-op while a call is already in flight. An empty trimmed prompt
    /// never reaches the generator; it sets a validation message instead. On
    /// success the result is stored, appended to the history, and the
    /// snapshot persisted; on failure the error message lands in the error
    /// slot. Either way the controller returns to idle.
    pub async fn generate(&mut self) {
        if self.is_generating {
            return;
        }

        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            self.last_error = Some(EMPTY_PROMPT.into());
            return;
        }

        self.is_generating = true;
        self.last_error = None;
        self.current_result = None;

        let mut request = GenerationRequest::new(&prompt).with_aspect_ratio(self.aspect_ratio);
        if let Some(ref source) = self.source_image {
            request = request.with_source(source.payload.clone(), source.mime_type.clone());
        }

        match self.generator.generate(&request).await {
            Ok(url) => {
                self.current_result = Some(url.clone());
                self.history = self.history.append(GenerationResult::new(url, prompt));
                self.store.persist(&self.history);
            }
            Err(e) => {
                let message = e.to_string();
                self.last_error = Some(if message.is_empty() {
                    GENERIC_FAILURE.into()
                } else {
                    message
                });
            }
        }

        self.is_generating = false;
    }

    /// Recalls a history entry into the current result and prompt.
    ///
    /// Leaves the source image and the log untouched. Ignored while
    /// generating or when `index` is out of range.
    pub fn select_history_entry(&mut self, index: usize) {
        if self.is_generating {
            return;
        }
        if let Some(entry) = self.history.get(index) {
            self.current_result = Some(entry.url.clone());
            self.prompt = entry.prompt.clone();
        }
    }

    /// Empties the history and removes the persisted snapshot.
    ///
    /// Destructive; callers are expected to gate this behind their own
    /// confirmation step.
    pub fn clear_history(&mut self) {
        self.history = HistoryLog::new();
        self.store.clear();
    }

    /// Writes the current result image into `dir` under a timestamp-derived
    /// filename, returning the path.
    pub fn export_result(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let url = self
            .current_result
            .as_deref()
            .ok_or_else(|| StudioError::Validation("no result image to export".into()))?;

        let (bytes, mime) = codec::decode_data_url(url)?;
        let ext = ImageFormat::from_mime(&mime).unwrap_or_default().extension();
        let filename = format!(
            "nano-banana-{}.{ext}",
            chrono::Utc::now().timestamp_millis()
        );

        let path = dir.as_ref().join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
