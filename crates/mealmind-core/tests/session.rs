mod common;

use common::{png_part, FakeService, HOME_REPLY, MEAL_LIST_REPLY, RECIPE_REPLY};
use mealmind_core::screen::ScreenData;
use mealmind_core::{
    ImageRequester, PendingScreen, RequestGateway, ScreenId, ServiceError, Session, Status,
    RECALIBRATING_MESSAGE,
};
use std::sync::Arc;

struct Harness {
    service: Arc<FakeService>,
    gateway: RequestGateway,
    images: ImageRequester,
    session: Session,
}

impl Harness {
    fn new(service: FakeService) -> Self {
        let service = Arc::new(service);
        Self {
            gateway: RequestGateway::new(service.clone()),
            images: ImageRequester::new(service.clone()),
            service,
            session: Session::new(),
        }
    }

    /// Run a pending screen request to completion, then any image it fires.
    async fn run(&mut self, pending: Option<PendingScreen>) {
        let pending = pending.expect("transition should start a request");
        let result = self.gateway.send(&pending.request).await;
        if let Some(image) = self.session.resolve_screen(pending.ticket, result) {
            let result = self.images.request_image(&image.prompt).await;
            self.session.resolve_image(image.ticket, result);
        }
    }

    async fn submit(&mut self, text: &str) {
        self.session.set_input(text);
        let pending = self.session.submit();
        self.run(pending).await;
    }
}

#[tokio::test]
async fn submit_renders_home_dashboard() {
    let mut h = Harness::new(FakeService::new().with_screen(HOME_REPLY));
    h.submit("eggs, spinach, milk").await;

    assert_eq!(h.session.status(), Status::Success);
    let data = h.session.view().current_data().unwrap();
    let ScreenData::Home(home) = data.data() else {
        panic!("expected HOME payload");
    };
    assert_eq!(home.summary_counts.total_items, 3);
    assert_eq!(h.session.submitted_text(), Some("eggs, spinach, milk"));
}

#[tokio::test]
async fn navigation_reuses_inventory_with_current_preferences() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen(r#"{"screen":"INVENTORY","data":{"items":[]}}"#),
    );
    h.submit("eggs, spinach, milk").await;

    h.session.set_input("something else entirely");
    h.session.preferences_mut().set_pet_mode(true);
    h.session.preferences_mut().set_pet_details("Cat");

    let pending = h.session.navigate(ScreenId::Inventory, None, false);
    assert_eq!(h.session.status(), Status::Loading);
    h.run(pending).await;

    assert_eq!(h.session.status(), Status::Success);
    assert_eq!(h.session.current_screen(), Some(ScreenId::Inventory));

    let prompt = h.service.last_screen_prompt();
    assert!(prompt.contains("User Inventory Input: \"eggs, spinach, milk\""));
    assert!(prompt.contains("- Pet Mode: true (Details: Cat)"));
}

#[tokio::test]
async fn failure_shows_apology_and_keeps_previous_data() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen("{\"screen\": \"MEAL_LIST\", \"data\": {"),
    );
    h.submit("eggs").await;

    let pending = h.session.navigate(ScreenId::MealList, None, false);
    h.run(pending).await;

    assert_eq!(h.session.status(), Status::Error);
    assert_eq!(h.session.view().error_message(), Some(RECALIBRATING_MESSAGE));
    assert_eq!(h.session.current_screen(), Some(ScreenId::Home));
    // No automatic retry.
    assert_eq!(h.service.screen_calls(), 2);
}

#[tokio::test]
async fn error_recovers_through_navigation() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen_reply(Err(ServiceError::Transport("offline".into())))
            .with_screen(HOME_REPLY),
    );
    h.submit("eggs").await;
    assert_eq!(h.session.status(), Status::Error);

    let pending = h.session.navigate(ScreenId::Home, None, false);
    h.run(pending).await;
    assert_eq!(h.session.status(), Status::Success);
    assert_eq!(h.session.view().error_message(), None);
}

#[tokio::test]
async fn recipe_detail_auto_generates_image() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen(MEAL_LIST_REPLY)
            .with_screen(RECIPE_REPLY)
            .with_image_reply(Ok(vec![png_part()])),
    );
    h.submit("eggs, spinach, milk").await;
    let pending = h.session.navigate(ScreenId::MealList, None, false);
    h.run(pending).await;

    let recipe = h.session.view().current_data().unwrap().meal_list().unwrap().recipes[0].to_ref();
    let pending = h.session.navigate(ScreenId::RecipeDetail, Some(recipe), true);
    h.run(pending).await;

    assert_eq!(h.session.current_screen(), Some(ScreenId::RecipeDetail));
    assert!(h.session.view().generated_image().is_some());
    assert!(!h.session.view().image_in_progress());

    assert!(h.service.last_screen_prompt().contains("Selected Recipe: Spinach Omelette (id: r1)"));
    let image_prompts = h.service.image_prompts.lock().unwrap();
    assert_eq!(image_prompts.len(), 1);
    assert!(image_prompts[0].contains("a fluffy spinach omelette on a white plate"));
}

#[tokio::test]
async fn image_failure_is_silent() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen(RECIPE_REPLY)
            .with_image_reply(Err(ServiceError::Transport("quota".into()))),
    );
    h.submit("eggs").await;

    let pending = h.session.navigate(ScreenId::RecipeDetail, None, false);
    h.run(pending).await;
    assert!(h.service.image_prompts.lock().unwrap().is_empty());

    let image = h.session.request_image().unwrap();
    assert!(h.session.view().image_in_progress());
    assert!(h.session.request_image().is_none());

    let result = h.images.request_image(&image.prompt).await;
    h.session.resolve_image(image.ticket, result);

    assert_eq!(h.session.status(), Status::Success);
    assert_eq!(h.session.view().error_message(), None);
    assert!(h.session.view().generated_image().is_none());
    assert!(!h.session.view().image_in_progress());
}

#[tokio::test]
async fn navigation_clears_previous_image() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen(RECIPE_REPLY)
            .with_image_reply(Ok(vec![png_part()]))
            .with_screen(MEAL_LIST_REPLY),
    );
    h.submit("eggs").await;
    let pending = h.session.navigate(ScreenId::RecipeDetail, None, true);
    h.run(pending).await;
    assert!(h.session.view().generated_image().is_some());

    let pending = h.session.navigate(ScreenId::MealList, None, false);
    assert!(h.session.view().generated_image().is_none());
    h.run(pending).await;
    assert!(h.session.view().generated_image().is_none());
}

#[tokio::test]
async fn reset_returns_to_idle_from_any_state() {
    // Success
    let mut h = Harness::new(FakeService::new().with_screen(HOME_REPLY));
    h.submit("eggs").await;
    h.session.reset();
    assert_idle(&h.session);

    // Error
    let mut h = Harness::new(FakeService::new().with_screen("not json"));
    h.submit("eggs").await;
    assert_eq!(h.session.status(), Status::Error);
    h.session.reset();
    assert_idle(&h.session);

    // Loading, resolved after the reset
    let mut h = Harness::new(FakeService::new().with_screen(HOME_REPLY));
    h.session.set_input("eggs");
    let pending = h.session.submit().unwrap();
    h.session.reset();
    let result = h.gateway.send(&pending.request).await;
    h.session.resolve_screen(pending.ticket, result);
    assert_idle(&h.session);
}

#[tokio::test]
async fn reset_discards_image_in_flight() {
    let mut h = Harness::new(
        FakeService::new()
            .with_screen(HOME_REPLY)
            .with_screen(RECIPE_REPLY)
            .with_image_reply(Ok(vec![png_part()])),
    );
    h.submit("eggs").await;
    let pending = h.session.navigate(ScreenId::RecipeDetail, None, false);
    h.run(pending).await;

    let image = h.session.request_image().unwrap();
    h.session.reset();
    let result = h.images.request_image(&image.prompt).await;
    h.session.resolve_image(image.ticket, result);

    assert_idle(&h.session);
}

fn assert_idle(session: &Session) {
    assert_eq!(session.status(), Status::Idle);
    assert_eq!(session.input(), "");
    assert!(session.view().current_data().is_none());
    assert!(session.view().generated_image().is_none());
    assert!(session.view().error_message().is_none());
    assert_eq!(session.submitted_text(), None);
}
