//! REST client for the `generateContent` endpoints.
//!
//! One client serves both calls the system makes: slide-image generation
//! (with reference images and an aspect-ratio config) and the single-shot
//! outline text call.  Image generation can run for minutes; the
//! per-request timeouts below reflect that.

use std::time::Duration;

use deckgen_core::image::ImageData;

use crate::messages::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};

/// Timeout for image-generation requests.
const IMAGE_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for text (outline) requests.
const TEXT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for one provider endpoint.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub api_key: String,
    /// Model used for slide-image generation.
    pub image_model: String,
    /// Model used for outline synthesis.
    pub text_model: String,
}

/// Options forwarded into the image generation config.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub aspect_ratio: String,
    pub image_size: Option<String>,
}

/// Errors from the generation API layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The endpoint returned 200 with an error object in the body.
    #[error("{0}")]
    Remote(String),

    /// The endpoint answered without any usable content.
    #[error("The generation service returned no content")]
    EmptyResponse,
}

/// HTTP client for a Gemini-compatible provider.
pub struct GeminiApi {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiApi {
    /// Create a new API client.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Generate one slide image from an instruction and reference images.
    ///
    /// Sends the composed instruction as the leading text part followed by
    /// every reference image inline, requesting an image-only response.
    pub async fn generate_image(
        &self,
        instruction: &str,
        references: &[ImageData],
        options: &ImageOptions,
    ) -> Result<ImageData, GeminiApiError> {
        let mut parts: Vec<Part> = vec![Part::Text {
            text: instruction.to_string(),
        }];
        parts.extend(references.iter().map(Part::from));

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: Some(options.aspect_ratio.clone()),
                    image_size: options.image_size.clone(),
                }),
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .post(&self.config.image_model, &request, IMAGE_TIMEOUT)
            .await?;
        response.first_image().ok_or(GeminiApiError::EmptyResponse)
    }

    /// Single-shot text generation, used for outline synthesis.
    ///
    /// When `response_schema` is given the call requests structured JSON
    /// output conforming to it.
    pub async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String, GeminiApiError> {
        let text = match system_prompt.filter(|s| !s.is_empty()) {
            Some(system) => format!("System instructions: {system}\n\nUser request: {prompt}"),
            None => prompt.to_string(),
        };

        let wants_json = response_schema.is_some();
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: wants_json.then(|| "application/json".to_string()),
                response_schema,
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .post(&self.config.text_model, &request, TEXT_TIMEOUT)
            .await?;
        response.joined_text().ok_or(GeminiApiError::EmptyResponse)
    }

    // ---- private helpers ----

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            model,
            self.config.api_key,
        )
    }

    /// POST a request and parse the response, surfacing HTTP-level and
    /// body-embedded errors.
    async fn post(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        tracing::debug!(model, "Sending generateContent request");
        let response = self
            .client
            .post(self.endpoint(model))
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(error) = parsed.error {
            return Err(GeminiApiError::Remote(error.message));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> GeminiApi {
        GeminiApi::new(GeminiConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            api_key: "k".to_string(),
            image_model: "image-model".to_string(),
            text_model: "text-model".to_string(),
        })
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            api().endpoint("image-model"),
            "https://example.test/v1beta/models/image-model:generateContent?key=k",
        );
    }
}
