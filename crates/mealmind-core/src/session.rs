//! The view-state machine behind every screen.
//!
//! Transitions are split into a *begin* half (`submit`, `navigate`,
//! `request_image`) that hands back a pending request, and a *resolve* half
//! that applies the outcome once the caller's async call finishes. Every
//! begin and every reset bumps a generation counter; results stamped with an
//! older generation are dropped, so the last request issued wins.

use crate::error::{GatewayError, ImageGenerationError};
use crate::gateway::ScreenRequest;
use crate::image::ImageRef;
use crate::preferences::PreferenceStore;
use crate::screen::{RecipeRef, ScreenId, ScreenResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    status: Status,
    current_data: Option<ScreenResponse>,
    error_message: Option<String>,
    generated_image: Option<ImageRef>,
    image_in_progress: bool,
}

impl ViewState {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn current_data(&self) -> Option<&ScreenResponse> {
        self.current_data.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn generated_image(&self) -> Option<&ImageRef> {
        self.generated_image.as_ref()
    }

    pub fn image_in_progress(&self) -> bool {
        self.image_in_progress
    }
}

/// Generation stamp on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct PendingScreen {
    pub ticket: Ticket,
    pub request: ScreenRequest,
}

#[derive(Debug, Clone)]
pub struct PendingImage {
    pub ticket: Ticket,
    pub prompt: String,
}

#[derive(Debug, Default)]
pub struct Session {
    preferences: PreferenceStore,
    input: String,
    submitted: Option<String>,
    view: ViewState,
    generation: u64,
    auto_image: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut PreferenceStore {
        &mut self.preferences
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Inventory text of the last accepted submit; reused by every navigation.
    pub fn submitted_text(&self) -> Option<&str> {
        self.submitted.as_deref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> Status {
        self.view.status
    }

    /// Whether a result stamped with `ticket` would still be applied.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn current_screen(&self) -> Option<ScreenId> {
        self.view.current_data.as_ref().map(ScreenResponse::screen)
    }

    /// Start the HOME request for the typed inventory.
    ///
    /// Blank input is a silent no-op, as is submitting while the dashboard is
    /// already showing or loading.
    pub fn submit(&mut self) -> Option<PendingScreen> {
        if !matches!(self.view.status, Status::Idle | Status::Error) {
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        self.submitted = Some(self.input.clone());
        self.begin(ScreenId::Home, None, false)
    }

    /// Re-issue a full request for `screen` with the submitted inventory and
    /// the current preferences.
    pub fn navigate(
        &mut self,
        screen: ScreenId,
        recipe: Option<RecipeRef>,
        auto_generate_image: bool,
    ) -> Option<PendingScreen> {
        if self.view.status == Status::Idle {
            return None;
        }
        self.begin(screen, recipe, auto_generate_image)
    }

    fn begin(
        &mut self,
        screen: ScreenId,
        recipe: Option<RecipeRef>,
        auto_generate_image: bool,
    ) -> Option<PendingScreen> {
        let text = self.submitted.clone()?;

        self.generation += 1;
        self.auto_image = auto_generate_image && screen == ScreenId::RecipeDetail;
        self.view.status = Status::Loading;
        self.view.error_message = None;
        self.view.generated_image = None;
        self.view.image_in_progress = false;

        let mut request = ScreenRequest::new(&text, self.preferences.snapshot(), screen);
        if let Some(recipe) = recipe {
            request = request.with_recipe(recipe);
        }

        Some(PendingScreen {
            ticket: Ticket(self.generation),
            request,
        })
    }

    /// Apply a finished screen request. Returns the image request to fire
    /// when the recipe detail asked for one automatically.
    pub fn resolve_screen(
        &mut self,
        ticket: Ticket,
        result: Result<ScreenResponse, GatewayError>,
    ) -> Option<PendingImage> {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "dropping stale screen result");
            return None;
        }

        match result {
            Ok(response) => {
                self.view.status = Status::Success;
                self.view.error_message = None;
                self.view.generated_image = None;
                self.view.current_data = Some(response);

                if std::mem::take(&mut self.auto_image) {
                    return self.begin_image();
                }
                None
            }
            Err(GatewayError::Validation) => {
                self.view.status = if self.view.current_data.is_some() {
                    Status::Success
                } else {
                    Status::Idle
                };
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "screen request failed");
                self.view.status = Status::Error;
                self.view.error_message = Some(e.user_message().to_string());
                None
            }
        }
    }

    /// Manual "view dish" trigger on the recipe detail screen.
    pub fn request_image(&mut self) -> Option<PendingImage> {
        if self.view.status != Status::Success || self.view.image_in_progress {
            return None;
        }
        self.begin_image()
    }

    fn begin_image(&mut self) -> Option<PendingImage> {
        let prompt = self
            .view
            .current_data
            .as_ref()
            .and_then(ScreenResponse::recipe_detail)
            .map(|detail| detail.image_prompt.trim().to_string())
            .filter(|prompt| !prompt.is_empty())?;

        self.view.image_in_progress = true;
        Some(PendingImage {
            ticket: Ticket(self.generation),
            prompt,
        })
    }

    /// Apply a finished image request. Failures are logged and otherwise
    /// ignored; the placeholder stays.
    pub fn resolve_image(
        &mut self,
        ticket: Ticket,
        result: Result<ImageRef, ImageGenerationError>,
    ) {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "dropping stale image");
            return;
        }

        self.view.image_in_progress = false;
        match result {
            Ok(image) => self.view.generated_image = Some(image),
            Err(e) => tracing::warn!(error = %e, "image generation failed"),
        }
    }

    /// Back to the empty input form. Preferences survive; anything still in
    /// flight is ignored when it lands.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.auto_image = false;
        self.input.clear();
        self.submitted = None;
        self.view = ViewState::default();
    }
}
