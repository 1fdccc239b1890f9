//! Generator trait behind which the remote provider sits.

use crate::error::Result;
use crate::types::GenerationRequest;
use async_trait::async_trait;

/// A remote image generator.
///
/// Implementations make exactly one provider call per `generate` invocation
/// and resolve to the result image as a `data:<mime>;base64,<payload>` URL.
/// Exactly one of the resolved URL or an error occurs per call.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates (or edits, when the request carries a source image) a single
    /// image.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
