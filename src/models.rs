use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Store aisle an ingredient is shopped from.
///
/// Declaration order is the display order of the grocery list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "Fruits & Légumes")]
    Produce,
    #[serde(alias = "Protéines")]
    Protein,
    #[serde(alias = "Crèmerie")]
    Dairy,
    #[serde(alias = "Épicerie")]
    Pantry,
    #[serde(alias = "Surgelés")]
    Frozen,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Produce,
        Category::Protein,
        Category::Dairy,
        Category::Pantry,
        Category::Frozen,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Protein => "Protein",
            Category::Dairy => "Dairy",
            Category::Pantry => "Pantry",
            Category::Frozen => "Frozen",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn category_or_other<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Category>::deserialize(deserializer)?.unwrap_or_default())
}

// Models occasionally emit `"quantity": 200` despite the string schema.
fn quantity_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawQuantity {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawQuantity>::deserialize(deserializer)? {
        Some(RawQuantity::Text(text)) => text,
        Some(RawQuantity::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, deserialize_with = "quantity_as_text")]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "category_or_other")]
    pub category: Category,
}

impl Ingredient {
    pub fn new(name: &str, quantity: &str, unit: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            category,
        }
    }
}

/// Per-person nutrition estimate for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub day_number: u8,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_time_minutes: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    Balanced,
    Quick,
    Cheap,
    Sport,
    Vegetarian,
}

impl Goal {
    pub fn label(&self) -> &'static str {
        match self {
            Goal::Balanced => "Balanced",
            Goal::Quick => "Quick",
            Goal::Cheap => "Budget",
            Goal::Sport => "Sport",
            Goal::Vegetarian => "Vegetarian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CookingLevel {
    Beginner,
    #[default]
    Intermediate,
}

impl CookingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookingLevel::Beginner => "beginner",
            CookingLevel::Intermediate => "intermediate",
        }
    }
}

pub const MIN_MEALS: u8 = 1;
pub const MAX_MEALS: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub goal: Goal,
    #[serde(default)]
    pub restrictions: String,
    pub cooking_level: CookingLevel,
    #[serde(default)]
    pub pantry_items: String,
    pub number_of_meals: u8,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            goal: Goal::default(),
            restrictions: String::new(),
            cooking_level: CookingLevel::default(),
            pantry_items: String::new(),
            number_of_meals: MAX_MEALS,
        }
    }
}

impl UserPreferences {
    /// Checks the meal count lies in the supported 1..=7 range.
    pub fn validate(&self) -> Result<(), String> {
        if (MIN_MEALS..=MAX_MEALS).contains(&self.number_of_meals) {
            Ok(())
        } else {
            Err(format!(
                "number of meals must be between {} and {}, got {}",
                MIN_MEALS, MAX_MEALS, self.number_of_meals
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMealPlan {
    pub id: String,
    pub created_at: String,
    pub preferences: UserPreferences,
    pub recipes: Vec<Recipe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_french_labels_and_unknowns() {
        let parsed: Vec<Category> =
            serde_json::from_str(r#"["Fruits & Légumes", "Protein", "Crèmerie", "Snacks", "Divers"]"#)
                .expect("categories should parse");
        assert_eq!(
            parsed,
            vec![
                Category::Produce,
                Category::Protein,
                Category::Dairy,
                Category::Other,
                Category::Other
            ]
        );
    }

    #[test]
    fn test_ingredient_defaults_missing_category_to_other() {
        let ingredient: Ingredient =
            serde_json::from_str(r#"{"name": "sel", "quantity": "1 pincée", "unit": ""}"#)
                .expect("ingredient should parse");
        assert_eq!(ingredient.category, Category::Other);

        let ingredient: Ingredient = serde_json::from_str(
            r#"{"name": "sel", "quantity": "1", "unit": "", "category": null}"#,
        )
        .expect("ingredient with null category should parse");
        assert_eq!(ingredient.category, Category::Other);
    }

    #[test]
    fn test_ingredient_numeric_quantity_is_kept_as_text() {
        let ingredient: Ingredient = serde_json::from_str(
            r#"{"name": "riz", "quantity": 150, "unit": "g", "category": "Pantry"}"#,
        )
        .expect("numeric quantity should parse");
        assert_eq!(ingredient.quantity, "150");
        assert_eq!(ingredient.category, Category::Pantry);
    }

    #[test]
    fn test_recipe_uses_camel_case_fields() {
        let recipe = Recipe {
            id: "recipe-1-0".to_string(),
            day_number: 1,
            name: "Omelette".to_string(),
            description: String::new(),
            total_time_minutes: 15,
            ingredients: vec![Ingredient::new("oeufs", "4", "", Category::Protein)],
            steps: vec!["Battre les oeufs".to_string()],
            tips: None,
            macros: None,
        };
        let json = serde_json::to_value(&recipe).expect("recipe should serialize");
        assert_eq!(json["dayNumber"], 1);
        assert_eq!(json["totalTimeMinutes"], 15);
        assert!(json.get("tips").is_none());
    }

    #[test]
    fn test_preferences_validate_meal_range() {
        let mut prefs = UserPreferences::default();
        assert!(prefs.validate().is_ok());
        prefs.number_of_meals = 0;
        assert!(prefs.validate().is_err());
        prefs.number_of_meals = 8;
        assert!(prefs.validate().is_err());
    }
}
