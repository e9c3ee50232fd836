//! Screen requests: one call to the reasoning service per navigation, with the
//! reply validated and normalized before the view sees it.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::preferences::Preferences;
use crate::prompt::{build_screen_prompt, SYSTEM_INSTRUCTION};
use crate::screen::{RecipeRef, ScreenData, ScreenId, ScreenResponse};
use crate::service::ReasoningService;

lazy_static! {
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)(?:```)?\s*\z").unwrap();
}

/// Everything one screen request needs. Built fresh for every navigation and
/// never modified after it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenRequest {
    pub raw_inventory_text: String,
    pub preferences: Preferences,
    pub target_screen: ScreenId,
    pub selected_recipe: Option<RecipeRef>,
}

impl ScreenRequest {
    pub fn new(raw_inventory_text: &str, preferences: Preferences, target_screen: ScreenId) -> Self {
        Self {
            raw_inventory_text: raw_inventory_text.to_string(),
            preferences,
            target_screen,
            selected_recipe: None,
        }
    }

    pub fn with_recipe(mut self, recipe: RecipeRef) -> Self {
        self.selected_recipe = Some(recipe);
        self
    }
}

#[derive(Clone)]
pub struct RequestGateway {
    service: Arc<dyn ReasoningService>,
}

impl RequestGateway {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    pub async fn fetch_screen(
        &self,
        raw_inventory_text: &str,
        preferences: &Preferences,
        target_screen: ScreenId,
    ) -> Result<ScreenResponse, GatewayError> {
        let request = ScreenRequest::new(raw_inventory_text, preferences.clone(), target_screen);
        self.send(&request).await
    }

    pub async fn send(&self, request: &ScreenRequest) -> Result<ScreenResponse, GatewayError> {
        if request.raw_inventory_text.trim().is_empty() {
            return Err(GatewayError::Validation);
        }

        let prompt = build_screen_prompt(request);
        tracing::debug!(screen = %request.target_screen, "requesting screen");

        let text = match self.service.generate_screen(SYSTEM_INSTRUCTION, &prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::error!(screen = %request.target_screen, "reasoning service returned no text");
                return Err(GatewayError::EmptyResponse);
            }
            Err(e) => {
                tracing::error!(screen = %request.target_screen, error = %e, "reasoning service call failed");
                return Err(e.into());
            }
        };

        parse_screen_response(&text, request.target_screen).map_err(|e| {
            tracing::error!(screen = %request.target_screen, error = %e, raw = %text, "could not parse screen data");
            e
        })
    }
}

/// Drops a fence wrapping the whole reply. The closing fence may be missing.
/// Backticks anywhere else, such as inside JSON strings, are left alone.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }
    match CODE_FENCE.captures(text).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text,
    }
}

/// Validate a raw reply and decode it as `target`'s payload.
///
/// A `screen` tag that disagrees with `target` (or is missing) is overwritten
/// with `target`; the `data` object is left as sent.
pub fn parse_screen_response(text: &str, target: ScreenId) -> Result<ScreenResponse, GatewayError> {
    let body = strip_code_fence(text);

    let value: Value =
        serde_json::from_str(body).map_err(|e| GatewayError::DataFormat(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(GatewayError::DataFormat(
            "reply is not a JSON object".to_string(),
        ));
    };

    let tag = object.get("screen").and_then(Value::as_str);
    if tag != Some(target.as_str()) {
        tracing::debug!(
            requested = %target,
            received = tag.unwrap_or("<missing>"),
            "coercing screen tag to the requested screen"
        );
    }

    let data = match object.remove("data") {
        Some(data @ Value::Object(_)) => data,
        Some(_) => {
            return Err(GatewayError::DataFormat(
                "`data` is not a JSON object".to_string(),
            ))
        }
        None => return Err(GatewayError::DataFormat("missing `data` object".to_string())),
    };

    let data = ScreenData::decode(target, data)
        .map_err(|e| GatewayError::DataFormat(format!("{} payload: {}", target, e)))?;

    Ok(ScreenResponse::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_REPLY: &str = r#"{"screen":"HOME","data":{"greeting":"Hi","welcome_overview":"Three items on hand.","daily_tip":"Store spinach dry.","summary_counts":{"items_expiring":1,"total_items":3,"possible_meals":2}}}"#;

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{}\n```", HOME_REPLY);
        assert_eq!(strip_code_fence(&fenced), HOME_REPLY);
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("\n```\n{}\n```\n", HOME_REPLY);
        assert_eq!(strip_code_fence(&fenced), HOME_REPLY);
    }

    #[test]
    fn unterminated_fence_is_still_stripped() {
        let reply = "```json\n{\"screen\":\"INVENTORY\",\"data\":{\"items\":[]}}";
        assert_eq!(
            strip_code_fence(reply),
            r#"{"screen":"INVENTORY","data":{"items":[]}}"#
        );
        let response = parse_screen_response(reply, ScreenId::Inventory).unwrap();
        assert_eq!(response.screen(), ScreenId::Inventory);
    }

    #[test]
    fn backticks_inside_bare_json_are_kept() {
        let reply = r#"{"screen":"ZERO_WASTE","data":{"transformations":[{"item":"Bread","tip":"Blitz into crumbs and label the jar ```crumbs``` so you find it"}],"storage_tips":[]}}"#;
        assert_eq!(strip_code_fence(reply), reply);

        let response = parse_screen_response(reply, ScreenId::ZeroWaste).unwrap();
        let ScreenData::ZeroWaste(zero_waste) = response.data() else {
            panic!("expected ZERO_WASTE payload");
        };
        assert!(zero_waste.transformations[0].tip.contains("```crumbs```"));
    }

    #[test]
    fn backticks_inside_fenced_json_are_kept() {
        let body = r#"{"screen":"ZERO_WASTE","data":{"transformations":[{"item":"Rice","tip":"Fry it ```hot```"}],"storage_tips":[]}}"#;
        let fenced = format!("```json\n{}\n```", body);
        assert_eq!(strip_code_fence(&fenced), body);
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        let padded = format!("  \n{}\n ", HOME_REPLY);
        assert_eq!(strip_code_fence(&padded), HOME_REPLY);
    }

    #[test]
    fn fenced_and_bare_parse_identically() {
        let bare = parse_screen_response(HOME_REPLY, ScreenId::Home).unwrap();
        let fenced =
            parse_screen_response(&format!("```json\n{}\n```", HOME_REPLY), ScreenId::Home)
                .unwrap();
        assert_eq!(bare, fenced);
    }

    #[test]
    fn drifting_tag_is_coerced() {
        let reply = r#"{"screen":"INVENTORY","data":{"transformations":[{"item":"Bread","tip":"Croutons"}],"storage_tips":[]}}"#;
        let response = parse_screen_response(reply, ScreenId::ZeroWaste).unwrap();
        assert_eq!(response.screen(), ScreenId::ZeroWaste);
    }

    #[test]
    fn missing_tag_is_coerced() {
        let reply = r#"{"data":{"items":[]}}"#;
        let response = parse_screen_response(reply, ScreenId::Inventory).unwrap();
        assert_eq!(response.screen(), ScreenId::Inventory);
    }

    #[test]
    fn truncated_json_is_a_format_error() {
        let truncated = &HOME_REPLY[..HOME_REPLY.len() - 10];
        assert!(matches!(
            parse_screen_response(truncated, ScreenId::Home),
            Err(GatewayError::DataFormat(_))
        ));
    }

    #[test]
    fn non_object_replies_are_format_errors() {
        for reply in ["[1, 2, 3]", "\"HOME\"", "42", r#"{"screen":"HOME","data":[]}"#, r#"{"screen":"HOME"}"#] {
            assert!(
                matches!(
                    parse_screen_response(reply, ScreenId::Home),
                    Err(GatewayError::DataFormat(_))
                ),
                "accepted {reply}"
            );
        }
    }

    #[test]
    fn payload_that_does_not_fit_the_screen_is_a_format_error() {
        let reply = r#"{"screen":"MEAL_LIST","data":{"recipes":[{"recipe_id":"r1"}]}}"#;
        assert!(matches!(
            parse_screen_response(reply, ScreenId::MealList),
            Err(GatewayError::DataFormat(_))
        ));
    }
}
