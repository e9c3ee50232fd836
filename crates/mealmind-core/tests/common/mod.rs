#![allow(dead_code)]

use async_trait::async_trait;
use mealmind_core::{ContentPart, ReasoningService, ServiceError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub type ScreenReply = Result<Option<String>, ServiceError>;
pub type ImageReply = Result<Vec<ContentPart>, ServiceError>;

/// Replays canned replies in order and records every prompt it was sent.
#[derive(Default)]
pub struct FakeService {
    screen_replies: Mutex<VecDeque<ScreenReply>>,
    image_replies: Mutex<VecDeque<ImageReply>>,
    pub screen_prompts: Mutex<Vec<(String, String)>>,
    pub image_prompts: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_screen(self, text: &str) -> Self {
        self.screen_replies
            .lock()
            .unwrap()
            .push_back(Ok(Some(text.to_string())));
        self
    }

    pub fn with_screen_reply(self, reply: ScreenReply) -> Self {
        self.screen_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_image_reply(self, reply: ImageReply) -> Self {
        self.image_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn last_screen_prompt(&self) -> String {
        self.screen_prompts
            .lock()
            .unwrap()
            .last()
            .map(|(_, prompt)| prompt.clone())
            .unwrap_or_default()
    }

    pub fn screen_calls(&self) -> usize {
        self.screen_prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningService for FakeService {
    async fn generate_screen(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<Option<String>, ServiceError> {
        self.screen_prompts
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), prompt.to_string()));
        self.screen_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::Transport("no reply queued".into())))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<ContentPart>, ServiceError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        self.image_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::Transport("no reply queued".into())))
    }
}

pub const HOME_REPLY: &str = r#"{
  "screen": "HOME",
  "data": {
    "greeting": "Hi",
    "welcome_overview": "You have a small but useful pantry.",
    "daily_tip": "Wrap spinach in a paper towel to keep it crisp.",
    "summary_counts": {"items_expiring": 1, "total_items": 3, "possible_meals": 2}
  }
}"#;

pub const MEAL_LIST_REPLY: &str = r#"{
  "screen": "MEAL_LIST",
  "data": {
    "recipes": [
      {
        "recipe_id": "r1",
        "recipe_name": "Spinach Omelette",
        "food_type": "Eggetarian",
        "diet_category": "High Protein",
        "estimated_calories": "320 kcal",
        "ingredients_used": ["eggs", "spinach", "milk"],
        "allergen_warning": "Contains eggs and dairy"
      }
    ]
  }
}"#;

pub const RECIPE_REPLY: &str = r#"{
  "screen": "RECIPE_DETAIL",
  "data": {
    "recipe_name": "Spinach Omelette",
    "servings": 2,
    "preparation_time": "15 mins",
    "ingredients": [{"item": "eggs", "measurement": "3"}, {"item": "spinach", "measurement": "1 cup"}],
    "steps": ["Whisk the eggs with milk.", "Wilt the spinach.", "Cook until set."],
    "calorie_estimate": "320 kcal",
    "diet_suitability": ["High Protein"],
    "allergen_warning": null,
    "is_baby_safe": false,
    "is_pet_safe": false,
    "image_prompt": "a fluffy spinach omelette on a white plate"
  }
}"#;

pub fn png_part() -> ContentPart {
    ContentPart::InlineImage {
        mime_type: "image/png".into(),
        data: b"\x89PNG".to_vec(),
    }
}
