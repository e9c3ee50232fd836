pub mod ai;
pub mod config;
pub mod error;
pub mod gateway;
pub mod image;
pub mod preferences;
pub mod prompt;
pub mod screen;
pub mod service;
pub mod session;

// Re-export main types for convenience
pub use ai::GeminiClient;
pub use config::Config;
pub use error::{GatewayError, ImageGenerationError, ServiceError, RECALIBRATING_MESSAGE};
pub use gateway::{RequestGateway, ScreenRequest};
pub use image::{ImageRef, ImageRequester};
pub use preferences::{FoodType, PreferenceStore, Preferences, SpiceLevel};
pub use screen::{ScreenData, ScreenId, ScreenResponse};
pub use service::{ContentPart, ReasoningService};
pub use session::{PendingImage, PendingScreen, Session, Status, Ticket, ViewState};
