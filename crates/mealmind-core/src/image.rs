use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::ImageGenerationError;
use crate::prompt::build_image_prompt;
use crate::service::{ContentPart, ReasoningService};

pub const IMAGE_MIME_TYPE: &str = "image/png";

/// A displayable `data:` URL for a generated picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    url: String,
    byte_len: usize,
}

impl ImageRef {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            url: format!(
                "data:{};base64,{}",
                IMAGE_MIME_TYPE,
                general_purpose::STANDARD.encode(bytes)
            ),
            byte_len: bytes.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Size of the decoded picture, known without decoding it again.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Raw image bytes, e.g. for writing the picture to disk.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self
            .url
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or_default();
        general_purpose::STANDARD.decode(payload)
    }
}

/// Best-effort dish pictures for the recipe detail screen.
#[derive(Clone)]
pub struct ImageRequester {
    service: Arc<dyn ReasoningService>,
}

impl ImageRequester {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    pub async fn request_image(&self, prompt: &str) -> Result<ImageRef, ImageGenerationError> {
        if prompt.trim().is_empty() {
            return Err(ImageGenerationError::EmptyPrompt);
        }

        let parts = self
            .service
            .generate_image(&build_image_prompt(prompt))
            .await?;

        parts
            .iter()
            .find_map(|part| match part {
                ContentPart::InlineImage { data, .. } => Some(ImageRef::from_bytes(data)),
                ContentPart::Text(_) => None,
            })
            .ok_or(ImageGenerationError::NoImagePart)
    }
}
