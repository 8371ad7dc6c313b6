use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, Provider,
    ResponseFormat,
};
use crate::models::{Category, Goal, Ingredient, Macros, Recipe, UserPreferences, MAX_MEALS};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Api(#[from] ApiConnectionError),

    #[error("invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("day {0} is outside the supported 1..=7 range")]
    InvalidDay(u8),

    #[error("model returned no content")]
    EmptyResponse,

    #[error("model returned malformed JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("expected {expected} recipes, model returned {actual}")]
    WrongRecipeCount { expected: usize, actual: usize },

    #[error("recipe #{index} is incomplete: {reason}")]
    InvalidRecipe { index: usize, reason: String },
}

/// Source of generated recipes.
///
/// Any error is a total failure: callers never receive a partial plan.
#[async_trait]
pub trait RecipeGenerationService: Send + Sync {
    /// Exactly `preferences.number_of_meals` recipes, days numbered from 1.
    async fn generate_plan(
        &self,
        preferences: &UserPreferences,
    ) -> Result<Vec<Recipe>, GenerationError>;

    /// One replacement recipe for `day_number`.
    async fn regenerate_day(
        &self,
        preferences: &UserPreferences,
        day_number: u8,
    ) -> Result<Recipe, GenerationError>;
}

/// Recipe as the model returns it, before identity is assigned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_time_minutes: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub macros: Option<Macros>,
}

impl GeneratedRecipe {
    fn validate(&self, index: usize) -> Result<(), GenerationError> {
        let reason = if self.name.trim().is_empty() {
            "empty name"
        } else if self.ingredients.is_empty() {
            "no ingredients"
        } else if self.steps.is_empty() {
            "no preparation steps"
        } else if self.macros.is_none() {
            "missing macros"
        } else {
            return Ok(());
        };
        Err(GenerationError::InvalidRecipe {
            index,
            reason: reason.to_string(),
        })
    }

    pub fn into_recipe(self, id: String, day_number: u8) -> Recipe {
        Recipe {
            id,
            day_number,
            name: self.name,
            description: self.description,
            total_time_minutes: self.total_time_minutes,
            ingredients: self.ingredients,
            steps: self.steps,
            tips: self.tips.filter(|tip| !tip.trim().is_empty()),
            macros: self.macros,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanPayload {
    Wrapped { recipes: Vec<GeneratedRecipe> },
    Bare(Vec<GeneratedRecipe>),
}

fn recipe_schema() -> JsonSchema {
    let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    let ingredient = JsonSchema::object(
        vec![
            ("name", JsonSchema::string()),
            ("quantity", JsonSchema::string().describe("Amount, e.g. \"200\" or \"2\"")),
            ("unit", JsonSchema::string().describe("e.g. \"g\", \"ml\", \"pcs\" or \"\"")),
            ("category", JsonSchema::string_enum(&categories)),
        ],
        &["name", "quantity", "unit", "category"],
    );
    let macros = JsonSchema::object(
        vec![
            ("calories", JsonSchema::integer().describe("Kcal per person")),
            ("protein", JsonSchema::integer().describe("Grams of protein per person")),
            ("carbs", JsonSchema::integer().describe("Grams of carbs per person")),
            ("fat", JsonSchema::integer().describe("Grams of fat per person")),
        ],
        &["calories", "protein", "carbs", "fat"],
    );

    JsonSchema::object(
        vec![
            ("name", JsonSchema::string()),
            ("description", JsonSchema::string()),
            ("totalTimeMinutes", JsonSchema::integer()),
            ("ingredients", JsonSchema::array(ingredient)),
            ("steps", JsonSchema::array(JsonSchema::string())),
            ("tips", JsonSchema::string()),
            ("macros", macros),
        ],
        &[
            "name",
            "description",
            "totalTimeMinutes",
            "ingredients",
            "steps",
            "tips",
            "macros",
        ],
    )
}

pub fn get_plan_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "meal_plan_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema::object(
            vec![("recipes", JsonSchema::array(recipe_schema()))],
            &["recipes"],
        ),
    }
}

pub fn get_recipe_json_schema() -> JsonSchemaDefinition {
    JsonSchemaDefinition {
        name: "recipe_schema".to_string(),
        strict: Some(true),
        schema: recipe_schema(),
    }
}

const SYSTEM_PROMPT: &str = "You are an expert sports nutritionist and chef. \
You design dinners optimized for performance (running) and recovery. \
Answer with JSON only, matching the requested schema.";

fn goal_context(goal: Goal, detailed: bool) -> String {
    match goal {
        Goal::Sport if detailed => "Sport / running (endurance). Focus: complex carbohydrates \
            (pasta, rice, quinoa) for glycogen, quality protein for muscle recovery. \
            Easily digestible evening meals (not too fatty)."
            .to_string(),
        Goal::Sport => "Sport / running (endurance). Focus: complex carbohydrates, protein, \
            not too fatty."
            .to_string(),
        other => other.label().to_lowercase(),
    }
}

fn or_default_text<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value.trim()
    }
}

pub fn build_plan_prompt(preferences: &UserPreferences) -> String {
    format!(
        "Generate a plan of {meals} dinners for 2 people.

User profile:
- Goal: {goal}
- Cooking level: {level}
- Restrictions: {restrictions}
- Already in my cupboards: {pantry}

Strict constraints:
1. Preparation time: 20-30 min maximum per recipe.
2. Ingredients easy to find in a standard supermarket.
3. ANTI-WASTE: reuse fresh ingredients (e.g. if we buy a bunch of parsley, use it in 2-3 recipes during the week).
4. Evening meals: not too heavy.
5. Include the MACROS (calories, protein, carbs, fat) per person.
6. Strict JSON format.

Return exactly {meals} recipes.",
        meals = preferences.number_of_meals,
        goal = goal_context(preferences.goal, true),
        level = preferences.cooking_level.as_str(),
        restrictions = or_default_text(&preferences.restrictions, "None"),
        pantry = or_default_text(&preferences.pantry_items, "Nothing specific"),
    )
}

pub fn build_day_prompt(preferences: &UserPreferences, day_number: u8) -> String {
    format!(
        "Generate ONE SINGLE dinner recipe for 2 people (Day {day}).

Profile: {goal}, Level: {level}, Restrictions: {restrictions}.
Constraints: 20-30 min, simple ingredients, light for the evening. Include the macros.",
        day = day_number,
        goal = goal_context(preferences.goal, false),
        level = preferences.cooking_level.as_str(),
        restrictions = or_default_text(&preferences.restrictions, "None"),
    )
}

/// Removes a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parses and checks a full-plan answer; the recipe count must equal `expected`.
pub fn parse_plan_content(
    content: &str,
    expected: usize,
) -> Result<Vec<GeneratedRecipe>, GenerationError> {
    let json = strip_code_fences(content);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let recipes = match serde_json::from_str::<PlanPayload>(json)? {
        PlanPayload::Wrapped { recipes } | PlanPayload::Bare(recipes) => recipes,
    };
    if recipes.len() != expected {
        return Err(GenerationError::WrongRecipeCount {
            expected,
            actual: recipes.len(),
        });
    }
    for (index, recipe) in recipes.iter().enumerate() {
        recipe.validate(index)?;
    }
    Ok(recipes)
}

pub fn parse_recipe_content(content: &str) -> Result<GeneratedRecipe, GenerationError> {
    let json = strip_code_fences(content);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let recipe: GeneratedRecipe = serde_json::from_str(json)?;
    recipe.validate(0)?;
    Ok(recipe)
}

/// Stamps plan recipes with `recipe-{millis}-{index}` ids and consecutive day numbers.
pub fn number_plan(recipes: Vec<GeneratedRecipe>, timestamp_millis: i64) -> Vec<Recipe> {
    recipes
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| {
            recipe.into_recipe(
                format!("recipe-{}-{}", timestamp_millis, index),
                (index + 1) as u8,
            )
        })
        .collect()
}

pub struct OpenRouterRecipeGenerator {
    provider: Provider,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenRouterRecipeGenerator {
    pub fn new(provider: Provider, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
            temperature: Some(0.7),
            max_tokens: Some(8192),
        }
    }

    async fn complete(
        &self,
        prompt: String,
        schema: JsonSchemaDefinition,
    ) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            response_format: Some(ResponseFormat::json_schema(schema)),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.call_chat_completion(request).await?;
        match response.first_content() {
            Some(content) if !content.trim().is_empty() => {
                debug!(chars = content.len(), "raw model content received");
                Ok(content.to_string())
            }
            _ => {
                warn!(id = %response.id, "model answer had no content");
                Err(GenerationError::EmptyResponse)
            }
        }
    }
}

#[async_trait]
impl RecipeGenerationService for OpenRouterRecipeGenerator {
    async fn generate_plan(
        &self,
        preferences: &UserPreferences,
    ) -> Result<Vec<Recipe>, GenerationError> {
        preferences
            .validate()
            .map_err(GenerationError::InvalidPreferences)?;
        info!(meals = preferences.number_of_meals, goal = ?preferences.goal, "generating meal plan");

        let content = self
            .complete(build_plan_prompt(preferences), get_plan_json_schema())
            .await?;
        let recipes = parse_plan_content(&content, preferences.number_of_meals as usize)?;
        Ok(number_plan(recipes, Utc::now().timestamp_millis()))
    }

    async fn regenerate_day(
        &self,
        preferences: &UserPreferences,
        day_number: u8,
    ) -> Result<Recipe, GenerationError> {
        if !(1..=MAX_MEALS).contains(&day_number) {
            return Err(GenerationError::InvalidDay(day_number));
        }
        info!(day = day_number, "regenerating recipe");

        let content = self
            .complete(build_day_prompt(preferences, day_number), get_recipe_json_schema())
            .await?;
        let recipe = parse_recipe_content(&content)?;
        Ok(recipe.into_recipe(
            format!("recipe-regen-{}", Utc::now().timestamp_millis()),
            day_number,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CookingLevel;

    const RECIPE_JSON: &str = r#"{
        "name": "Pâtes au saumon",
        "description": "Rapide et riche en protéines",
        "totalTimeMinutes": 25,
        "ingredients": [
            {"name": "Pâtes", "quantity": "200", "unit": "g", "category": "Épicerie"},
            {"name": "Saumon", "quantity": "2", "unit": "pavés", "category": "Protein"}
        ],
        "steps": ["Cuire les pâtes", "Poêler le saumon"],
        "tips": "",
        "macros": {"calories": 650, "protein": 40, "carbs": 70, "fat": 20}
    }"#;

    #[test]
    fn test_plan_prompt_fills_defaults_for_blank_fields() {
        let prefs = UserPreferences {
            goal: Goal::Sport,
            restrictions: "  ".to_string(),
            cooking_level: CookingLevel::Beginner,
            pantry_items: "riz, pâtes".to_string(),
            number_of_meals: 5,
        };

        let prompt = build_plan_prompt(&prefs);

        assert!(prompt.contains("plan of 5 dinners"));
        assert!(prompt.contains("Return exactly 5 recipes."));
        assert!(prompt.contains("glycogen"));
        assert!(prompt.contains("Restrictions: None"));
        assert!(prompt.contains("cupboards: riz, pâtes"));
        assert!(prompt.contains("Cooking level: beginner"));
    }

    #[test]
    fn test_day_prompt_names_day() {
        let prompt = build_day_prompt(&UserPreferences::default(), 3);
        assert!(prompt.contains("(Day 3)"));
        assert!(prompt.contains("Profile: balanced"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  {} "), "{}");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn test_parse_plan_accepts_wrapped_and_bare() {
        let wrapped = format!("{{\"recipes\": [{}]}}", RECIPE_JSON);
        let bare = format!("```json\n[{}]\n```", RECIPE_JSON);

        assert_eq!(parse_plan_content(&wrapped, 1).unwrap().len(), 1);
        assert_eq!(parse_plan_content(&bare, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_plan_rejects_wrong_count() {
        let content = format!("[{}, {}]", RECIPE_JSON, RECIPE_JSON);
        let err = parse_plan_content(&content, 3).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::WrongRecipeCount {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_parse_plan_rejects_incomplete_recipe() {
        let content = r#"[{"name": "Vide", "totalTimeMinutes": 10, "ingredients": [], "steps": ["x"],
            "macros": {"calories": 1, "protein": 1, "carbs": 1, "fat": 1}}]"#;
        let err = parse_plan_content(content, 1).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRecipe { index: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_plan_content("``````", 1),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_recipe_content("{not json"),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_number_plan_assigns_ids_and_days() {
        let recipes = parse_plan_content(&format!("[{}, {}]", RECIPE_JSON, RECIPE_JSON), 2).unwrap();
        let plan = number_plan(recipes, 1700000000000);

        assert_eq!(plan[0].id, "recipe-1700000000000-0");
        assert_eq!(plan[1].id, "recipe-1700000000000-1");
        assert_eq!(plan[1].day_number, 2);
        assert_eq!(plan[0].ingredients[0].category, Category::Pantry);
        assert_eq!(plan[0].tips, None);
    }

    #[test]
    fn test_plan_schema_enumerates_categories() {
        let value = serde_json::to_value(get_plan_json_schema()).unwrap();
        let category = &value["schema"]["properties"]["recipes"]["items"]["properties"]
            ["ingredients"]["items"]["properties"]["category"];
        assert_eq!(category["enum"].as_array().map(Vec::len), Some(6));
    }
}
