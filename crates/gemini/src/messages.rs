//! Typed wire messages for the `generateContent` endpoint.
//!
//! Field naming follows the remote API: top-level request/response
//! structs are camelCase, part variants keep their snake_case tags.

use serde::{Deserialize, Serialize};

use deckgen_core::image::ImageData;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// One multimodal request part: instruction text or an inline image.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

impl From<&ImageData> for Part {
    fn from(image: &ImageData) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.base64.clone(),
            },
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// `["IMAGE"]` for image generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    /// `application/json` for structured text output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

/// Error object embedded in an otherwise-200 response body.
#[derive(Debug, Deserialize)]
pub struct RemoteError {
    pub message: String,
    pub code: Option<i32>,
}

impl GenerateContentResponse {
    /// Extract the first inline image from the first candidate.
    pub fn first_image(&self) -> Option<ImageData> {
        self.parts()?.iter().find_map(|part| {
            part.inline_data.as_ref().map(|inline| ImageData {
                base64: inline.data.clone(),
                mime_type: inline.mime_type.clone(),
            })
        })
    }

    /// Concatenate the text parts of the first candidate.
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts()?
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    fn parts(&self) -> Option<&Vec<ResponsePart>> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_config() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "a slide".to_string(),
                    },
                    Part::from(&ImageData::png("cmVm")),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: Some("16:9".to_string()),
                    image_size: None,
                }),
                ..GenerationConfig::default()
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "a slide");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mimeType"],
            "image/png",
        );
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn response_image_extraction_takes_first_inline_part() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "here is your slide"},
                        {"inlineData": {"mimeType": "image/png", "data": "aW1n"}}
                    ]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let image = response.first_image().unwrap();
        assert_eq!(image.base64, "aW1n");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(response.joined_text().as_deref(), Some("here is your slide"));
    }

    #[test]
    fn response_without_candidates_yields_nothing() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_image().is_none());
        assert!(response.joined_text().is_none());
    }

    #[test]
    fn embedded_error_is_parsed() {
        let body = r#"{"error": {"message": "quota exceeded", "code": 429}}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.message, "quota exceeded");
        assert_eq!(error.code, Some(429));
    }
}
