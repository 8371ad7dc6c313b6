//! Text rendering for the terminal front end.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::grocery::ConsolidatedList;
use crate::history::PlanHistory;
use crate::models::Recipe;
use crate::nutrition_summary::PlanNutritionSummary;

const HISTORY_PREVIEW: usize = 3;

pub fn plan_overview(recipes: &[Recipe], summary: &PlanNutritionSummary) -> String {
    let mut output = format!("Your week: {} dinners\n\n", recipes.len());

    for recipe in recipes {
        output.push_str(&format!(
            "Day {}  {}  ({} min)\n",
            recipe.day_number, recipe.name, recipe.total_time_minutes
        ));
        if let Some(macros) = &recipe.macros {
            output.push_str(&format!(
                "       {}g protein, {} kcal\n",
                macros.protein, macros.calories
            ));
        }
    }

    output.push_str(&format!("\nTotal cooking time: {} min\n", summary.total_time_minutes));
    if let Some(average) = &summary.per_meal_average {
        output.push_str(&format!(
            "Average per person: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fat\n",
            average.calories, average.protein, average.carbs, average.fat
        ));
    }
    output
}

pub fn recipe_details(recipe: &Recipe) -> String {
    let mut output = format!("Day {}: {}\n", recipe.day_number, recipe.name);
    if !recipe.description.is_empty() {
        output.push_str(&format!("{}\n", recipe.description));
    }
    output.push_str(&format!("Time: {} min\n", recipe.total_time_minutes));

    if let Some(macros) = &recipe.macros {
        output.push_str(&format!(
            "Per person: {} kcal | protein {}g | carbs {}g | fat {}g\n",
            macros.calories, macros.protein, macros.carbs, macros.fat
        ));
    }

    output.push_str("\nIngredients:\n");
    for ingredient in &recipe.ingredients {
        output.push_str(&format!(
            "  - {} {} {}\n",
            ingredient.quantity, ingredient.unit, ingredient.name
        ));
    }

    output.push_str("\nSteps:\n");
    for (idx, step) in recipe.steps.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", idx + 1, step));
    }

    if let Some(tips) = &recipe.tips {
        output.push_str(&format!("\nTip: {}\n", tips));
    }
    output
}

/// Shopping list with checkboxes and the id to pass to `groceries check`.
pub fn grocery_checklist(list: &ConsolidatedList, checked: &BTreeSet<String>) -> String {
    let mut output = String::new();
    for (category, items) in list.iter().filter(|(_, items)| !items.is_empty()) {
        output.push_str(&format!("{}\n", category));
        for item in items {
            let id = item.check_id();
            let mark = if checked.contains(&id) { "x" } else { " " };
            output.push_str(&format!(
                "  [{}] {}  {} {}    ({})\n",
                mark, item.name, item.quantity, item.unit, id
            ));
        }
        output.push('\n');
    }
    output
}

pub fn history_listing(history: &PlanHistory, active_id: Option<&str>) -> String {
    if history.is_empty() {
        return "No saved plans yet. Generated plans will show up here.\n".to_string();
    }

    let mut output = format!("{} saved plan(s)\n\n", history.len());
    for saved in history.iter() {
        let marker = if active_id == Some(saved.id.as_str()) { "*" } else { " " };
        output.push_str(&format!(
            "{} {}  {}  {}  {} meals\n",
            marker,
            saved.id,
            saved.created_at.get(..10).unwrap_or(&saved.created_at),
            saved.preferences.goal.label(),
            saved.recipes.len()
        ));
        for recipe in saved.recipes.iter().take(HISTORY_PREVIEW) {
            output.push_str(&format!("      {} ({} min)\n", recipe.name, recipe.total_time_minutes));
        }
        if saved.recipes.len() > HISTORY_PREVIEW {
            output.push_str(&format!(
                "      +{} more recipes\n",
                saved.recipes.len() - HISTORY_PREVIEW
            ));
        }
    }
    output
}

/// Acknowledgement of a state-changing command, printed under `--json`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommandOutcome {
    pub action: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals: Option<usize>,
}

impl CommandOutcome {
    pub fn new(action: &'static str, id: impl Into<String>) -> Self {
        Self {
            action,
            id: id.into(),
            checked: None,
            meals: None,
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_meals(mut self, meals: usize) -> Self {
        self.meals = Some(meals);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grocery::aggregate;
    use crate::models::{Category, Ingredient, Macros, SavedMealPlan, UserPreferences};

    fn recipe(day: u8, name: &str) -> Recipe {
        Recipe {
            id: format!("recipe-{}", day),
            day_number: day,
            name: name.to_string(),
            description: String::new(),
            total_time_minutes: 25,
            ingredients: vec![Ingredient::new("Riz", "150", "g", Category::Pantry)],
            steps: vec!["Cuire le riz".to_string()],
            tips: Some("Rincer le riz".to_string()),
            macros: Some(Macros { calories: 550, protein: 30, carbs: 70, fat: 12 }),
        }
    }

    #[test]
    fn test_recipe_details_lists_everything() {
        let text = recipe_details(&recipe(2, "Riz sauté"));
        assert!(text.starts_with("Day 2: Riz sauté\n"));
        assert!(text.contains("  - 150 g Riz\n"));
        assert!(text.contains("  1. Cuire le riz\n"));
        assert!(text.contains("Tip: Rincer le riz"));
        assert!(text.contains("550 kcal"));
    }

    #[test]
    fn test_checklist_marks_checked_items() {
        let list = aggregate(&[recipe(1, "Riz")]);
        let checked: BTreeSet<String> = ["Pantry-riz-g".to_string()].into_iter().collect();

        let text = grocery_checklist(&list, &checked);

        assert!(text.starts_with("Pantry\n"));
        assert!(text.contains("[x] riz  150 g    (Pantry-riz-g)"));
    }

    #[test]
    fn test_history_listing_previews_three_recipes() {
        let mut history = PlanHistory::default();
        history.record(SavedMealPlan {
            id: "plan-1".to_string(),
            created_at: "2026-10-18T08:00:00+00:00".to_string(),
            preferences: UserPreferences::default(),
            recipes: (1..=5).map(|day| recipe(day, "Plat")).collect(),
        });

        let text = history_listing(&history, Some("plan-1"));

        assert!(text.contains("* plan-1  2026-10-18  Balanced  5 meals"));
        assert!(text.contains("+2 more recipes"));
        assert!(history_listing(&PlanHistory::default(), None).starts_with("No saved plans"));
    }

    #[test]
    fn test_command_outcome_omits_unset_fields() {
        let checked = serde_json::to_value(
            CommandOutcome::new("toggled", "Dairy-lait-ml").with_checked(true),
        )
        .unwrap();
        assert_eq!(
            checked,
            serde_json::json!({ "action": "toggled", "id": "Dairy-lait-ml", "checked": true })
        );

        let loaded = serde_json::to_value(CommandOutcome::new("loaded", "plan-1").with_meals(5)).unwrap();
        assert_eq!(loaded["meals"], 5);
        assert!(loaded.get("checked").is_none());
    }
}
