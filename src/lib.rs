#![warn(missing_docs)]
//! nanostudio - image generation and editing studio core.
//!
//! This crate provides the client-side workflow behind a prompt-driven image
//! studio: a Gemini generation client, a data-URL image codec, a bounded
//! persisted history of results, and the controller that ties them together.
//! Attach a source image to edit it with natural-language instructions; leave
//! it off to generate from the prompt alone.
//!
//! # Quick Start
//!
//! ```no_run
//! use nanostudio::{FileStorage, GeminiClient, HistoryStore, Studio};
//!
//! #[tokio::main]
//! async fn main() -> nanostudio::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let store = HistoryStore::new(FileStorage::in_data_dir()?);
//!
//!     let mut studio = Studio::new(client, store);
//!     studio.set_prompt("A golden retriever puppy in a field of sunflowers");
//!     studio.generate().await;
//!
//!     if let Some(error) = studio.last_error() {
//!         eprintln!("generation failed: {error}");
//!     } else {
//!         let path = studio.export_result(".")?;
//!         println!("saved {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod codec;
mod error;
mod gemini;
mod generator;
mod history;
mod prompts;
mod studio;
mod types;

pub use codec::{decode_data_url, to_data_url, SourceImage};
pub use error::{Result, StudioError};
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel};
pub use generator::ImageGenerator;
pub use history::{
    FileStorage, HistoryLog, HistoryStore, MemoryStorage, Storage, HISTORY_CAPACITY, HISTORY_KEY,
};
pub use prompts::{DETAILED_EXAMPLE_PROMPT, EXAMPLE_PROMPTS};
pub use studio::{Mode, Studio};
pub use types::{
    AspectRatio, GenerationRequest, GenerationResult, ImageFormat, SourcePayload,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::SourceImage;
    pub use crate::error::{Result, StudioError};
    pub use crate::gemini::GeminiClient;
    pub use crate::generator::ImageGenerator;
    pub use crate::history::{FileStorage, HistoryStore, MemoryStorage};
    pub use crate::studio::Studio;
    pub use crate::types::{AspectRatio, GenerationRequest, GenerationResult};
}
