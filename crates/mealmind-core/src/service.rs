//! Capability interface for the external reasoning and image services.

use async_trait::async_trait;

use crate::error::ServiceError;

/// One part of a structured service reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Decoded image bytes.
    InlineImage { mime_type: String, data: Vec<u8> },
}

/// What the gateway and the image helper need from a generative backend.
///
/// [`GeminiClient`](crate::ai::GeminiClient) is the production implementation;
/// tests plug in a deterministic fake.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Run a screen request. `Ok(None)` means the service answered without text.
    async fn generate_screen(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<Option<String>, ServiceError>;

    /// Run an image request and return every part of the reply.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<ContentPart>, ServiceError>;
}
