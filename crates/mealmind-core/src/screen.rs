//! Screen identifiers and the typed payload each screen renders.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenId {
    Home,
    Inventory,
    MealList,
    RecipeDetail,
    ZeroWaste,
}

impl ScreenId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenId::Home => "HOME",
            ScreenId::Inventory => "INVENTORY",
            ScreenId::MealList => "MEAL_LIST",
            ScreenId::RecipeDetail => "RECIPE_DETAIL",
            ScreenId::ZeroWaste => "ZERO_WASTE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScreenId::Home => "Home",
            ScreenId::Inventory => "Freshness Tracker",
            ScreenId::MealList => "Suggested Meals",
            ScreenId::RecipeDetail => "Recipe",
            ScreenId::ZeroWaste => "Zero Waste",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model is loose about numbers: calories and servings arrive as either
/// `"350 kcal"` or `350`. Both are kept as display text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Integers sometimes come back as `3.0`. Integral floats are accepted,
/// anything with a fraction is not.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(de::Error::custom(format!("expected a whole number, got {}", n))),
    }
}

fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = whole_number(deserializer)?;
    u32::try_from(n).map_err(|_| de::Error::custom(format!("expected a count, got {}", n)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryCounts {
    #[serde(default, deserialize_with = "count")]
    pub items_expiring: u32,
    #[serde(default, deserialize_with = "count")]
    pub total_items: u32,
    #[serde(default, deserialize_with = "count")]
    pub possible_meals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeData {
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub welcome_overview: String,
    #[serde(default)]
    pub daily_tip: String,
    pub summary_counts: SummaryCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Protein,
    Dairy,
    Pantry,
    Frozen,
    Leftover,
    Bakery,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Protein => "Protein",
            Category::Dairy => "Dairy",
            Category::Pantry => "Pantry",
            Category::Frozen => "Frozen",
            Category::Leftover => "Leftover",
            Category::Bakery => "Bakery",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Urgent,
    Soon,
    Safe,
}

impl Urgency {
    pub fn from_days(days_remaining: i64) -> Self {
        if days_remaining <= 2 {
            Urgency::Urgent
        } else if days_remaining <= 4 {
            Urgency::Soon
        } else {
            Urgency::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Urgent => "URGENT",
            Urgency::Soon => "SOON",
            Urgency::Safe => "SAFE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub category: Category,
    /// Zero or negative means the item has already expired.
    #[serde(deserialize_with = "whole_number")]
    pub days_remaining: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity_estimate: String,
    #[serde(default)]
    pub storage_advice: String,
}

impl InventoryItem {
    pub fn urgency(&self) -> Urgency {
        Urgency::from_days(self.days_remaining)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryData {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

impl InventoryData {
    /// Items ordered most urgent first. Ties keep the order the model sent.
    pub fn sorted_by_freshness(&self) -> Vec<&InventoryItem> {
        let mut items: Vec<&InventoryItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.days_remaining);
        items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCard {
    #[serde(deserialize_with = "string_or_number")]
    pub recipe_id: String,
    pub recipe_name: String,
    #[serde(default)]
    pub food_type: String,
    #[serde(default)]
    pub diet_category: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub estimated_calories: String,
    #[serde(default)]
    pub ingredients_used: Vec<String>,
    #[serde(default)]
    pub allergen_warning: Option<String>,
}

impl RecipeCard {
    pub fn is_vegetarian(&self) -> bool {
        self.food_type == "Vegetarian" || self.food_type == "Vegan"
    }

    pub fn to_ref(&self) -> RecipeRef {
        RecipeRef {
            recipe_id: self.recipe_id.clone(),
            recipe_name: self.recipe_name.clone(),
        }
    }
}

/// Identifies which meal-list card a recipe-detail request is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRef {
    pub recipe_id: String,
    pub recipe_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MealListData {
    #[serde(default)]
    pub recipes: Vec<RecipeCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub measurement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub recipe_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub servings: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub preparation_time: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub calorie_estimate: String,
    #[serde(default)]
    pub diet_suitability: Vec<String>,
    #[serde(default)]
    pub allergen_warning: Option<String>,
    #[serde(default)]
    pub is_baby_safe: bool,
    #[serde(default)]
    pub is_pet_safe: bool,
    #[serde(default)]
    pub image_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroWasteTip {
    pub item: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZeroWasteData {
    #[serde(default)]
    pub transformations: Vec<ZeroWasteTip>,
    #[serde(default)]
    pub storage_tips: Vec<ZeroWasteTip>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenData {
    Home(HomeData),
    Inventory(InventoryData),
    MealList(MealListData),
    RecipeDetail(RecipeDetail),
    ZeroWaste(ZeroWasteData),
}

impl ScreenData {
    pub fn screen(&self) -> ScreenId {
        match self {
            ScreenData::Home(_) => ScreenId::Home,
            ScreenData::Inventory(_) => ScreenId::Inventory,
            ScreenData::MealList(_) => ScreenId::MealList,
            ScreenData::RecipeDetail(_) => ScreenId::RecipeDetail,
            ScreenData::ZeroWaste(_) => ScreenId::ZeroWaste,
        }
    }

    /// Decode a `data` object as the payload of `screen`.
    pub fn decode(screen: ScreenId, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match screen {
            ScreenId::Home => ScreenData::Home(serde_json::from_value(value)?),
            ScreenId::Inventory => ScreenData::Inventory(serde_json::from_value(value)?),
            ScreenId::MealList => ScreenData::MealList(serde_json::from_value(value)?),
            ScreenId::RecipeDetail => ScreenData::RecipeDetail(serde_json::from_value(value)?),
            ScreenId::ZeroWaste => ScreenData::ZeroWaste(serde_json::from_value(value)?),
        })
    }
}

/// A validated reply: the tag always matches the payload variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenResponse {
    data: ScreenData,
}

impl ScreenResponse {
    pub fn new(data: ScreenData) -> Self {
        Self { data }
    }

    pub fn screen(&self) -> ScreenId {
        self.data.screen()
    }

    pub fn data(&self) -> &ScreenData {
        &self.data
    }

    pub fn recipe_detail(&self) -> Option<&RecipeDetail> {
        match &self.data {
            ScreenData::RecipeDetail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn meal_list(&self) -> Option<&MealListData> {
        match &self.data {
            ScreenData::MealList(list) => Some(list),
            _ => None,
        }
    }
}
