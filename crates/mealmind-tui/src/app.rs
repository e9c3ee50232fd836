use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use mealmind_core::preferences::{ALLERGEN_OPTIONS, CUISINE_OPTIONS, DIET_OPTIONS};
use mealmind_core::screen::{RecipeRef, ScreenData};
use mealmind_core::{
    Config, GatewayError, GeminiClient, ImageGenerationError, ImageRef, ImageRequester,
    PendingImage, PendingScreen, Preferences, ReasoningService, RequestGateway, ScreenId,
    ScreenResponse, Session, Status, Ticket,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Rows of the preference form shown before the first submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Inventory,
    FoodType,
    SpiceLevel,
    BabyMode,
    BabyAge,
    PetMode,
    PetDetails,
    DietGoals,
    Cuisines,
    Allergens,
    Submit,
}

impl FormField {
    /// Fields in display order. The detail inputs only appear while their
    /// mode is on.
    pub fn visible(prefs: &Preferences) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Inventory,
            FormField::FoodType,
            FormField::SpiceLevel,
            FormField::BabyMode,
        ];
        if prefs.baby_mode() {
            fields.push(FormField::BabyAge);
        }
        fields.push(FormField::PetMode);
        if prefs.pet_mode() {
            fields.push(FormField::PetDetails);
        }
        fields.extend([
            FormField::DietGoals,
            FormField::Cuisines,
            FormField::Allergens,
            FormField::Submit,
        ]);
        fields
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Inventory => "Inventory",
            FormField::FoodType => "Food type",
            FormField::SpiceLevel => "Spice",
            FormField::BabyMode => "Baby mode",
            FormField::BabyAge => "Baby age",
            FormField::PetMode => "Pet mode",
            FormField::PetDetails => "Pet details",
            FormField::DietGoals => "Diet goals",
            FormField::Cuisines => "Cuisines",
            FormField::Allergens => "Avoid",
            FormField::Submit => "Analyze",
        }
    }

    /// Chip options for multi-select rows.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FormField::DietGoals => DIET_OPTIONS,
            FormField::Cuisines => CUISINE_OPTIONS,
            FormField::Allergens => ALLERGEN_OPTIONS,
            _ => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Inventory | FormField::BabyAge | FormField::PetDetails
        )
    }
}

/// Request handles shared with spawned tasks.
#[derive(Clone)]
pub struct Services {
    pub gateway: RequestGateway,
    pub images: ImageRequester,
}

impl Services {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self {
            gateway: RequestGateway::new(service.clone()),
            images: ImageRequester::new(service),
        }
    }

    fn gemini(config: &Config, api_key: &str) -> Self {
        let client = GeminiClient::new(api_key)
            .with_base_url(&config.base_url)
            .with_models(&config.text_model, &config.image_model);
        Self::new(Arc::new(client))
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Preference form
    pub form_field: FormField,
    pub input_cursor: usize, // cursor position in the inventory text
    pub chip_cursor: usize,

    // Screen state
    pub list_state: ListState,
    pub content_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // One-line feedback in the footer (saved image path, save errors)
    pub notice: Option<String>,

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    pub config: Config,
    pub services: Option<Services>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<AppEvent>) -> Self {
        // Environment first, then the config file
        let services = config
            .resolve_api_key()
            .map(|key| Services::gemini(&config, &key));
        Self::with_services(config, events, services)
    }

    pub fn with_services(
        config: Config,
        events: UnboundedSender<AppEvent>,
        services: Option<Services>,
    ) -> Self {
        let show_api_key_input = services.is_none();

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: Session::new(),

            form_field: FormField::Inventory,
            input_cursor: 0,
            chip_cursor: 0,

            list_state: ListState::default(),
            content_scroll: 0,

            animation_frame: 0,

            notice: None,

            show_api_key_input,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            config,
            services,
            events,
        }
    }

    /// Services for a new request, or the key prompt when none are configured.
    fn services_or_prompt(&mut self) -> Option<Services> {
        if self.services.is_none() {
            self.open_api_key_input();
        }
        self.services.clone()
    }

    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    pub fn close_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    /// Connect with the typed key and remember it for the next launch.
    pub fn save_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            return;
        }

        self.config.api_key = Some(key.clone());
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "could not save config");
            self.notice = Some(format!("Key not saved: {}", e));
        }
        self.services = Some(Services::gemini(&self.config, &key));
        self.close_api_key_input();
    }

    // Form helpers
    pub fn visible_fields(&self) -> Vec<FormField> {
        FormField::visible(self.session.preferences().current())
    }

    pub fn next_field(&mut self) {
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.form_field).unwrap_or(0);
        self.focus_field(fields[(i + 1) % fields.len()]);
    }

    pub fn prev_field(&mut self) {
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.form_field).unwrap_or(0);
        self.focus_field(fields[(i + fields.len() - 1) % fields.len()]);
    }

    fn focus_field(&mut self, field: FormField) {
        self.form_field = field;
        self.chip_cursor = 0;
        if field == FormField::Inventory {
            self.input_cursor = self.session.input().chars().count();
        }
    }

    /// Text of a detail field as currently stored.
    pub fn detail_text(&self, field: FormField) -> String {
        let prefs = self.session.preferences().current();
        match field {
            FormField::BabyAge => prefs.baby_age().unwrap_or_default().to_string(),
            FormField::PetDetails => prefs.pet_details().unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    pub fn set_detail_text(&mut self, field: FormField, text: &str) {
        let store = self.session.preferences_mut();
        match field {
            FormField::BabyAge => store.set_baby_age(text),
            FormField::PetDetails => store.set_pet_details(text),
            _ => {}
        }
    }

    /// Space/Enter on a non-text row.
    pub fn activate_field(&mut self) {
        if self.form_field == FormField::Submit {
            self.submit();
            return;
        }

        let store = self.session.preferences_mut();
        match self.form_field {
            FormField::FoodType => store.cycle_food_type(),
            FormField::SpiceLevel => store.cycle_spice_level(),
            FormField::BabyMode => {
                let enabled = store.current().baby_mode();
                store.set_baby_mode(!enabled);
            }
            FormField::PetMode => {
                let enabled = store.current().pet_mode();
                store.set_pet_mode(!enabled);
            }
            FormField::DietGoals => {
                if let Some(goal) = DIET_OPTIONS.get(self.chip_cursor) {
                    store.toggle_diet_goal(goal);
                }
            }
            FormField::Cuisines => {
                if let Some(cuisine) = CUISINE_OPTIONS.get(self.chip_cursor) {
                    store.toggle_cuisine(cuisine);
                }
            }
            FormField::Allergens => {
                if let Some(allergen) = ALLERGEN_OPTIONS.get(self.chip_cursor) {
                    store.toggle_allergen(allergen);
                }
            }
            FormField::Inventory
            | FormField::BabyAge
            | FormField::PetDetails
            | FormField::Submit => {}
        }
    }

    pub fn chip_right(&mut self) {
        let len = self.form_field.options().len();
        if len > 0 {
            self.chip_cursor = (self.chip_cursor + 1).min(len - 1);
        }
    }

    pub fn chip_left(&mut self) {
        self.chip_cursor = self.chip_cursor.saturating_sub(1);
    }

    // Session transitions
    pub fn submit(&mut self) {
        if self.session.input().trim().is_empty() {
            return;
        }
        let Some(services) = self.services_or_prompt() else {
            return;
        };
        if let Some(pending) = self.session.submit() {
            self.input_mode = InputMode::Normal;
            self.dispatch_screen(services, pending);
        }
    }

    pub fn navigate(&mut self, screen: ScreenId) {
        self.navigate_with(screen, None, false);
    }

    fn navigate_with(
        &mut self,
        screen: ScreenId,
        recipe: Option<RecipeRef>,
        auto_generate_image: bool,
    ) {
        if self.session.status() == Status::Idle {
            return;
        }
        let Some(services) = self.services_or_prompt() else {
            return;
        };
        if let Some(pending) = self.session.navigate(screen, recipe, auto_generate_image) {
            self.notice = None;
            self.dispatch_screen(services, pending);
        }
    }

    /// Enter on a meal card.
    pub fn open_selected_recipe(&mut self) {
        let recipe = self
            .session
            .view()
            .current_data()
            .and_then(ScreenResponse::meal_list)
            .zip(self.list_state.selected())
            .and_then(|(list, i)| list.recipes.get(i))
            .map(|card| card.to_ref());

        if let Some(recipe) = recipe {
            let auto = self.config.auto_generate_images;
            self.navigate_with(ScreenId::RecipeDetail, Some(recipe), auto);
        }
    }

    /// "View dish" on the recipe screen.
    pub fn generate_image(&mut self) {
        if self.session.current_screen() != Some(ScreenId::RecipeDetail) {
            return;
        }
        let Some(services) = self.services_or_prompt() else {
            return;
        };
        if let Some(pending) = self.session.request_image() {
            self.dispatch_image(services, pending);
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.input_mode = InputMode::Editing;
        self.form_field = FormField::Inventory;
        self.input_cursor = 0;
        self.chip_cursor = 0;
        self.list_state = ListState::default();
        self.content_scroll = 0;
        self.notice = None;
    }

    fn dispatch_screen(&mut self, services: Services, pending: PendingScreen) {
        tracing::info!(screen = %pending.request.target_screen, "requesting screen");
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = services.gateway.send(&pending.request).await;
            let _ = events.send(AppEvent::ScreenLoaded {
                ticket: pending.ticket,
                result,
            });
        });
    }

    fn dispatch_image(&mut self, services: Services, pending: PendingImage) {
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = services.images.request_image(&pending.prompt).await;
            let _ = events.send(AppEvent::ImageLoaded {
                ticket: pending.ticket,
                result,
            });
        });
    }

    pub fn on_screen_loaded(&mut self, ticket: Ticket, result: Result<ScreenResponse, GatewayError>) {
        let current = self.session.is_current(ticket);
        let image = self.session.resolve_screen(ticket, result);
        if current && self.session.status() == Status::Success {
            self.content_scroll = 0;
            let selected = if self.list_len() > 0 { Some(0) } else { None };
            self.list_state.select(selected);
        }

        if let Some(pending) = image {
            if let Some(services) = self.services.clone() {
                self.dispatch_image(services, pending);
            }
        }
    }

    pub fn on_image_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<ImageRef, ImageGenerationError>,
    ) {
        let current = self.session.is_current(ticket);
        self.session.resolve_image(ticket, result);
        if current && self.session.view().generated_image().is_some() {
            self.notice = Some("Dish image ready. Press w to save it.".to_string());
        }
    }

    // List navigation (inventory rows, meal cards)
    pub fn list_len(&self) -> usize {
        match self.session.view().current_data().map(ScreenResponse::data) {
            Some(ScreenData::Inventory(inventory)) => inventory.items.len(),
            Some(ScreenData::MealList(list)) => list.recipes.len(),
            _ => 0,
        }
    }

    pub fn list_down(&mut self) {
        let len = self.list_len();
        if len > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((i + 1).min(len - 1)));
        } else {
            self.scroll_down();
        }
    }

    pub fn list_up(&mut self) {
        if self.list_len() > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(i.saturating_sub(1)));
        } else {
            self.scroll_up();
        }
    }

    pub fn scroll_down(&mut self) {
        self.content_scroll = self.content_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.status() == Status::Loading || self.session.view().image_in_progress() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Write the generated dish picture next to the user's pictures.
    pub fn save_image(&mut self) {
        match self.write_image() {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved dish image");
                self.notice = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save dish image");
                self.notice = Some(format!("Could not save image: {}", e));
            }
        }
    }

    fn write_image(&self) -> Result<PathBuf> {
        let view = self.session.view();
        let image = view
            .generated_image()
            .ok_or_else(|| anyhow!("no image generated yet"))?;
        let name = view
            .current_data()
            .and_then(ScreenResponse::recipe_detail)
            .map(|detail| detail.recipe_name.as_str())
            .unwrap_or("dish");

        let dir = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.png", slugify(name)));
        std::fs::write(&path, image.to_bytes()?)?;
        Ok(path)
    }
}

/// Lowercase ASCII file stem; everything else collapses to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "dish".to_string()
    } else {
        slug.to_string()
    }
}
