//! Gemini image generation client.

use crate::codec::to_data_url;
use crate::error::{Result, StudioError};
use crate::generator::ImageGenerator;
use crate::types::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                StudioError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        Ok(GeminiClient {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
        })
    }
}

/// Client for the Gemini `generateContent` image endpoint.
///
/// Stateless besides its HTTP connection pool; construct once at application
/// start and share.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
}

impl GeminiClient {
    /// Creates a new [`GeminiClientBuilder`].
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Returns the model this client targets.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::Validation("Please enter a text prompt.".into()));
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model.as_str(),
        );

        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(
            model = self.model.as_str(),
            edit = request.is_edit(),
            aspect_ratio = %request.aspect_ratio,
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => StudioError::Auth(text),
                s => StudioError::Api {
                    status: s,
                    message: text,
                },
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        extract_image(gemini_response)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.generate_impl(request).await
    }
}

/// Scans candidates in order and returns the first inline image part as a
/// data URL. A response MIME type may be absent; `image/png` is assumed then.
fn extract_image(response: GeminiResponse) -> Result<String> {
    for candidate in response.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(inline) = part.inline_data {
                let mime = inline.mime_type.unwrap_or_else(|| "image/png".to_string());
                return Ok(to_data_url(&mime, &inline.data));
            }
        }
    }

    Err(StudioError::NoImageReturned)
}

// Request/Response wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData { inline_data: GeminiInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        let mut parts = Vec::new();

        // Source image first if present: its presence selects editing mode
        if let Some(ref source) = req.source {
            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: source.mime_type.clone(),
                    data: source.data.clone(),
                },
            });
        }

        parts.push(GeminiRequestPart::Text {
            text: req.prompt.trim().to_string(),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                // Best-effort hint: editing tends to keep the source ratio
                image_config: ImageConfig {
                    aspect_ratio: req.aspect_ratio.as_str().to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AspectRatio;

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let client = GeminiClientBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBanana)
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_construction_generation_mode() {
        let req = GenerationRequest::new("A puppy");
        let wire = GeminiRequest::from_generation_request(&req);

        assert_eq!(wire.contents.len(), 1);
        assert_eq!(wire.contents[0].parts.len(), 1);
        assert!(matches!(
            wire.contents[0].parts[0],
            GeminiRequestPart::Text { .. }
        ));
        assert_eq!(wire.generation_config.response_modalities, vec!["IMAGE"]);
        assert_eq!(wire.generation_config.image_config.aspect_ratio, "1:1");
    }

    #[test]
    fn test_request_construction_edit_mode_orders_image_first() {
        let req = GenerationRequest::new("Add a hat")
            .with_source("Zm9v", "image/jpeg")
            .with_aspect_ratio(AspectRatio::Wide);
        let wire = GeminiRequest::from_generation_request(&req);

        assert_eq!(wire.contents[0].parts.len(), 2);
        match &wire.contents[0].parts[0] {
            GeminiRequestPart::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, "Zm9v");
            }
            other => panic!("expected inline data first, got {other:?}"),
        }
        assert_eq!(wire.generation_config.image_config.aspect_ratio, "16:9");
    }

    #[test]
    fn test_request_trims_prompt() {
        let req = GenerationRequest::new("  Add a retro filter  ");
        let wire = GeminiRequest::from_generation_request(&req);
        match &wire.contents[0].parts[0] {
            GeminiRequestPart::Text { text } => assert_eq!(text, "Add a retro filter"),
            other => panic!("expected text part, got {other:?}"),
        }
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let req = GenerationRequest::new("A puppy").with_source("Zm9v", "image/png");
        let wire = GeminiRequest::from_generation_request(&req);
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json.get("generationConfig").is_some());
        assert!(json["generationConfig"].get("imageConfig").is_some());
        assert_eq!(
            json["generationConfig"]["imageConfig"]["aspectRatio"],
            "1:1"
        );
        assert!(json["contents"][0]["parts"][0].get("inline_data").is_some());
        assert_eq!(
            json["contents"][0]["parts"][0]["inline_data"]["mimeType"],
            "image/png"
        );
    }

    #[test]
    fn test_extract_image_first_inline_part_wins() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "Zm9v"}},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "YmFy"}}
                    ]
                }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let url = extract_image(resp).unwrap();
        assert_eq!(url, "data:image/png;base64,Zm9v");
    }

    #[test]
    fn test_extract_image_missing_mime_defaults_to_png() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"inlineData": {"data": "Zm9v"}}]
                }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let url = extract_image(resp).unwrap();
        assert_eq!(url, "data:image/png;base64,Zm9v");
    }

    #[test]
    fn test_extract_image_scans_later_candidates() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "no image here"}]}},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/webp", "data": "YmF6"}}]}}
            ]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let url = extract_image(resp).unwrap();
        assert_eq!(url, "data:image/webp;base64,YmF6");
    }

    #[test]
    fn test_extract_image_zero_parts_is_no_image() {
        let json = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            extract_image(resp),
            Err(StudioError::NoImageReturned)
        ));
    }

    #[test]
    fn test_extract_image_empty_response_is_no_image() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            extract_image(resp),
            Err(StudioError::NoImageReturned)
        ));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_network() {
        let client = GeminiClient::builder().api_key("test-key").build().unwrap();
        let req = GenerationRequest::new("   ");
        let err = client.generate(&req).await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }
}
