use serde::Serialize;
use std::collections::BTreeSet;

pub const DIET_OPTIONS: &[&str] = &[
    "Balanced",
    "Keto",
    "Mediterranean",
    "High Protein",
    "Low Carb",
    "Diabetic Friendly",
    "Paleo",
];

pub const CUISINE_OPTIONS: &[&str] = &[
    "Indian",
    "Italian",
    "Mexican",
    "Asian",
    "Mediterranean",
    "American",
    "Middle Eastern",
    "French",
    "Thai",
];

pub const ALLERGEN_OPTIONS: &[&str] = &[
    "Peanuts",
    "Tree Nuts",
    "Dairy",
    "Eggs",
    "Gluten",
    "Soy",
    "Shellfish",
    "Fish",
    "Sesame",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FoodType {
    #[default]
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
    Vegan,
    Eggetarian,
}

impl FoodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodType::Vegetarian => "Vegetarian",
            FoodType::NonVegetarian => "Non-Vegetarian",
            FoodType::Vegan => "Vegan",
            FoodType::Eggetarian => "Eggetarian",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FoodType::Vegetarian => FoodType::NonVegetarian,
            FoodType::NonVegetarian => FoodType::Vegan,
            FoodType::Vegan => FoodType::Eggetarian,
            FoodType::Eggetarian => FoodType::Vegetarian,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SpiceLevel {
    Mild,
    #[default]
    Medium,
    Spicy,
    Fiery,
}

impl SpiceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpiceLevel::Mild => "Mild",
            SpiceLevel::Medium => "Medium",
            SpiceLevel::Spicy => "Spicy",
            SpiceLevel::Fiery => "Fiery",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SpiceLevel::Mild => SpiceLevel::Medium,
            SpiceLevel::Medium => SpiceLevel::Spicy,
            SpiceLevel::Spicy => SpiceLevel::Fiery,
            SpiceLevel::Fiery => SpiceLevel::Mild,
        }
    }
}

/// User dietary configuration, serialized verbatim into every screen request.
///
/// Only [`PreferenceStore`] can change it, which keeps baby and pet mode
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Preferences {
    food_type: FoodType,
    diet_goals: BTreeSet<String>,
    spice_level: SpiceLevel,
    allergens: BTreeSet<String>,
    baby_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    baby_age: Option<String>,
    pet_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pet_details: Option<String>,
    preferred_cuisines: BTreeSet<String>,
}

impl Preferences {
    pub fn food_type(&self) -> FoodType {
        self.food_type
    }

    pub fn diet_goals(&self) -> &BTreeSet<String> {
        &self.diet_goals
    }

    pub fn spice_level(&self) -> SpiceLevel {
        self.spice_level
    }

    pub fn allergens(&self) -> &BTreeSet<String> {
        &self.allergens
    }

    pub fn baby_mode(&self) -> bool {
        self.baby_mode
    }

    pub fn baby_age(&self) -> Option<&str> {
        self.baby_age.as_deref()
    }

    pub fn pet_mode(&self) -> bool {
        self.pet_mode
    }

    pub fn pet_details(&self) -> Option<&str> {
        self.pet_details.as_deref()
    }

    pub fn preferred_cuisines(&self) -> &BTreeSet<String> {
        &self.preferred_cuisines
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Session-scoped holder of the current [`Preferences`].
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    current: Preferences,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Preferences {
        &self.current
    }

    /// Copy handed to a request; later edits do not affect it.
    pub fn snapshot(&self) -> Preferences {
        self.current.clone()
    }

    pub fn set_food_type(&mut self, food_type: FoodType) {
        self.current.food_type = food_type;
    }

    pub fn cycle_food_type(&mut self) {
        self.current.food_type = self.current.food_type.next();
    }

    pub fn set_spice_level(&mut self, level: SpiceLevel) {
        self.current.spice_level = level;
    }

    pub fn cycle_spice_level(&mut self) {
        self.current.spice_level = self.current.spice_level.next();
    }

    pub fn toggle_diet_goal(&mut self, goal: &str) {
        toggle(&mut self.current.diet_goals, goal);
    }

    pub fn toggle_cuisine(&mut self, cuisine: &str) {
        toggle(&mut self.current.preferred_cuisines, cuisine);
    }

    pub fn toggle_allergen(&mut self, allergen: &str) {
        toggle(&mut self.current.allergens, allergen);
    }

    pub fn set_baby_mode(&mut self, enabled: bool) {
        self.current.baby_mode = enabled;
        if enabled {
            self.current.pet_mode = false;
        }
    }

    pub fn set_pet_mode(&mut self, enabled: bool) {
        self.current.pet_mode = enabled;
        if enabled {
            self.current.baby_mode = false;
        }
    }

    pub fn set_baby_age(&mut self, age: &str) {
        self.current.baby_age = non_empty(age);
    }

    pub fn set_pet_details(&mut self, details: &str) {
        self.current.pet_details = non_empty(details);
    }
}
