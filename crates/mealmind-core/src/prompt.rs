//! Prompt text sent to the reasoning and image services.

use crate::gateway::ScreenRequest;

/// Behavioural contract the reasoning service must honour. The client never
/// enforces these rules itself.
pub const SYSTEM_INSTRUCTION: &str = r#"You are "MealMind", a culinary assistant that plans meals from a household pantry.

INVENTORY RULES
1. The user's inventory text is the only food available.
2. Recipes may use only listed ingredients plus basic staples: salt, pepper, oil, water, plain sugar.
3. Never require a main ingredient (protein, vegetable, grain, dairy) that is not listed.

SAFETY RULES
1. Baby mode (uses "baby_age"):
   - under 6 months: single-ingredient smooth purees only, nothing added;
   - 6 to 9 months: mashed or lumpy textures, soft finger foods;
   - 9 to 12 months: small chopped pieces;
   - over 12 months: toddler meals.
   Never include honey, added salt, added sugar, whole nuts, chili or choking hazards.
2. Pet mode (uses "pet_details", e.g. "Cat" or "Senior Dog"):
   - dogs: no onion, garlic, grapes, chocolate, xylitol, macadamia nuts or avocado;
   - cats: protein and taurine rich meals, no onion or garlic;
   - prefer plain cooked proteins and pet-safe vegetables.
3. Remove every listed allergen completely.

PREFERENCES
Honour the selected diet goals, adapt dishes to the preferred cuisines and match the spice level.

SCREENS
HOME: { "greeting": string, "welcome_overview": string, "daily_tip": string,
        "summary_counts": { "items_expiring": int, "total_items": int, "possible_meals": int } }
INVENTORY: { "items": [ { "name": string,
        "category": "Produce" | "Protein" | "Dairy" | "Pantry" | "Frozen" | "Leftover" | "Bakery",
        "days_remaining": int, "quantity_estimate": string, "storage_advice": string } ] }
MEAL_LIST: { "recipes": [ { "recipe_id": string, "recipe_name": string, "food_type": string,
        "diet_category": string, "estimated_calories": string, "ingredients_used": [string],
        "allergen_warning": string | null } ] }
RECIPE_DETAIL: { "recipe_name": string, "servings": string, "preparation_time": string,
        "ingredients": [ { "item": string, "measurement": string } ], "steps": [string],
        "calorie_estimate": string, "diet_suitability": [string], "allergen_warning": string | null,
        "is_baby_safe": bool, "is_pet_safe": bool, "image_prompt": string }
ZERO_WASTE: { "transformations": [ { "item": string, "tip": string } ],
        "storage_tips": [ { "item": string, "tip": string } ] }

OUTPUT
Reply with exactly one JSON object: { "screen": "<SCREEN>", "data": { ... } }"#;

const IMAGE_STYLE_PREFIX: &str = "Professional food photography of";
const IMAGE_STYLE_SUFFIX: &str =
    "Warm lighting, appetizing, rustic kitchen setting, 4k, high detail.";

/// Per-call context block: inventory, preferences, target screen and a
/// restatement of the safety flags.
pub fn build_screen_prompt(request: &ScreenRequest) -> String {
    let prefs = &request.preferences;
    let prefs_json = serde_json::to_string(prefs).unwrap_or_else(|_| "{}".to_string());

    let mut prompt = String::new();
    prompt.push_str(&format!(
        "User Inventory Input: \"{}\"\n",
        request.raw_inventory_text
    ));
    prompt.push_str(&format!("Preferences: {}\n", prefs_json));
    prompt.push_str(&format!("Requested Screen: {}\n", request.target_screen));

    if let Some(recipe) = &request.selected_recipe {
        prompt.push_str(&format!(
            "Selected Recipe: {} (id: {})\n",
            recipe.recipe_name, recipe.recipe_id
        ));
    }

    prompt.push_str("\nINSTRUCTIONS:\n");
    prompt.push_str("1. Parse the user inventory input carefully.\n");
    prompt.push_str(&format!(
        "2. Generate content for screen: {}.\n",
        request.target_screen
    ));

    prompt.push_str("\nSAFETY CHECK:\n");
    prompt.push_str(&format!(
        "- Baby Mode: {} (Age: {})\n",
        prefs.baby_mode(),
        prefs.baby_age().unwrap_or("N/A")
    ));
    prompt.push_str(&format!(
        "- Pet Mode: {} (Details: {})\n",
        prefs.pet_mode(),
        prefs.pet_details().unwrap_or("N/A")
    ));

    prompt
}

pub fn build_image_prompt(description: &str) -> String {
    format!(
        "{} {}. {}",
        IMAGE_STYLE_PREFIX,
        description.trim(),
        IMAGE_STYLE_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;
    use crate::screen::{RecipeRef, ScreenId};

    fn request(store: &PreferenceStore, target: ScreenId) -> ScreenRequest {
        ScreenRequest::new("eggs, spinach, milk", store.snapshot(), target)
    }

    #[test]
    fn context_carries_inventory_and_target() {
        let store = PreferenceStore::new();
        let prompt = build_screen_prompt(&request(&store, ScreenId::MealList));

        assert!(prompt.contains("User Inventory Input: \"eggs, spinach, milk\""));
        assert!(prompt.contains("Requested Screen: MEAL_LIST"));
        assert!(prompt.contains("\"food_type\":\"Vegetarian\""));
        assert!(prompt.contains("- Baby Mode: false (Age: N/A)"));
        assert!(prompt.contains("- Pet Mode: false (Details: N/A)"));
        assert!(!prompt.contains("Selected Recipe"));
    }

    #[test]
    fn context_restates_safety_flags() {
        let mut store = PreferenceStore::new();
        store.set_baby_mode(true);
        store.set_baby_age("8 months");

        let prompt = build_screen_prompt(&request(&store, ScreenId::Home));
        assert!(prompt.contains("- Baby Mode: true (Age: 8 months)"));
        assert!(prompt.contains("\"baby_age\":\"8 months\""));
    }

    #[test]
    fn recipe_detail_names_the_selected_recipe() {
        let store = PreferenceStore::new();
        let req = request(&store, ScreenId::RecipeDetail).with_recipe(RecipeRef {
            recipe_id: "r2".into(),
            recipe_name: "Spinach omelette".into(),
        });

        let prompt = build_screen_prompt(&req);
        assert!(prompt.contains("Selected Recipe: Spinach omelette (id: r2)"));
        assert!(prompt.contains("User Inventory Input: \"eggs, spinach, milk\""));
    }

    #[test]
    fn image_prompt_wraps_description() {
        assert_eq!(
            build_image_prompt(" golden spinach omelette "),
            "Professional food photography of golden spinach omelette. \
             Warm lighting, appetizing, rustic kitchen setting, 4k, high detail."
        );
    }
}
