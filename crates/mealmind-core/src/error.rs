//! Error taxonomy for screen and image requests.
//!
//! Every service-side failure of a screen request collapses to the same
//! user-facing apology; the variants only exist so logs can tell them apart.

use thiserror::Error;

/// The one message the view layer ever shows for a failed screen request.
pub const RECALIBRATING_MESSAGE: &str = "MealMind is recalibrating. Please try again.";

/// Failure reported by a [`ReasoningService`](crate::service::ReasoningService)
/// implementation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode service reply: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Empty or whitespace-only inventory text. Blocked before any call.
    #[error("inventory text is empty")]
    Validation,

    #[error("reasoning service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("reasoning service returned no text")]
    EmptyResponse,

    #[error("malformed screen data: {0}")]
    DataFormat(String),
}

impl GatewayError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::Validation => "Please list a few pantry items first.",
            GatewayError::ServiceUnavailable(_)
            | GatewayError::EmptyResponse
            | GatewayError::DataFormat(_) => RECALIBRATING_MESSAGE,
        }
    }
}

impl From<ServiceError> for GatewayError {
    fn from(err: ServiceError) -> Self {
        GatewayError::ServiceUnavailable(err.to_string())
    }
}

/// Image generation never reaches the user as an error banner; callers log it
/// and keep the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageGenerationError {
    #[error("image prompt is empty")]
    EmptyPrompt,

    #[error("reply contained no inline image")]
    NoImagePart,

    #[error("image service failed: {0}")]
    Service(String),
}

impl From<ServiceError> for ImageGenerationError {
    fn from(err: ServiceError) -> Self {
        ImageGenerationError::Service(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_failures_share_one_message() {
        let errors = [
            GatewayError::ServiceUnavailable("connection refused".into()),
            GatewayError::EmptyResponse,
            GatewayError::DataFormat("expected value at line 1".into()),
        ];
        for err in errors {
            assert_eq!(err.user_message(), RECALIBRATING_MESSAGE);
        }
    }

    #[test]
    fn service_error_maps_to_unavailable() {
        let err: GatewayError = ServiceError::Status {
            status: 503,
            body: "overloaded".into(),
        }
        .into();
        assert_eq!(
            err,
            GatewayError::ServiceUnavailable("service returned 503: overloaded".into())
        );
    }
}
