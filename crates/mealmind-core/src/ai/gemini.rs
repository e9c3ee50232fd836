use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::service::{ContentPart, ReasoningService};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GeminiResponse {
    fn first_parts(&self) -> &[PartResponse] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate, `None` when there is none.
    fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn content_parts(&self) -> Result<Vec<ContentPart>, ServiceError> {
        let mut parts = Vec::new();
        for part in self.first_parts() {
            if let Some(inline) = &part.inline_data {
                let data = general_purpose::STANDARD
                    .decode(&inline.data)
                    .map_err(|e| ServiceError::Decode(format!("inline image: {}", e)))?;
                parts.push(ContentPart::InlineImage {
                    mime_type: inline.mime_type.clone(),
                    data,
                });
            } else if let Some(text) = &part.text {
                parts.push(ContentPart::Text(text.clone()));
            }
        }
        Ok(parts)
    }
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, text_model: &str, image_model: &str) -> Self {
        self.text_model = text_model.to_string();
        self.image_model = image_model.to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn user_content(prompt: &str) -> Content {
    Content {
        role: Some("user".to_string()),
        parts: vec![TextPart {
            text: prompt.to_string(),
        }],
    }
}

#[async_trait]
impl ReasoningService for GeminiClient {
    async fn generate_screen(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<Option<String>, ServiceError> {
        let request = GeminiRequest {
            contents: vec![user_content(prompt)],
            system_instruction: Some(Content {
                role: None,
                parts: vec![TextPart {
                    text: system_instruction.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        let response = self.generate(&self.text_model, &request).await?;
        Ok(response.text())
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<ContentPart>, ServiceError> {
        let request = GeminiRequest {
            contents: vec![user_content(prompt)],
            system_instruction: None,
            generation_config: None,
        };

        let response = self.generate(&self.image_model, &request).await?;
        response.content_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn screen_request_uses_camel_case_wire_names() {
        let request = GeminiRequest {
            contents: vec![user_content("eggs")],
            system_instruction: Some(Content {
                role: None,
                parts: vec![TextPart {
                    text: "be helpful".into(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".into(),
            }),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "eggs"}]}],
                "systemInstruction": {"parts": [{"text": "be helpful"}]},
                "generationConfig": {"responseMimeType": "application/json"}
            })
        );
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"screen\":"}, {"text": "\"HOME\"}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"screen\":\"HOME\"}"));
    }

    #[test]
    fn blocked_reply_has_no_text() {
        let response: GeminiResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(response.text(), None);

        let response: GeminiResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn inline_images_are_decoded() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here is your dish"},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw=="}}
            ]}}]
        }))
        .unwrap();

        assert_eq!(
            response.content_parts().unwrap(),
            vec![
                ContentPart::Text("Here is your dish".into()),
                ContentPart::InlineImage {
                    mime_type: "image/png".into(),
                    data: b"\x89PNG".to_vec(),
                },
            ]
        );
    }

    #[test]
    fn corrupt_inline_data_is_a_decode_error() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "not base64!"}}
            ]}}]
        }))
        .unwrap();
        assert!(matches!(response.content_parts(), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new("key").with_base_url("http://localhost:8080/");
        assert_eq!(
            client.endpoint("gemini-test"),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }
}
