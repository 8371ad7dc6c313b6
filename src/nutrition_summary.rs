use serde::{Deserialize, Serialize};

use crate::models::Recipe;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct MacroTotals {
    pub calories: f32,
    pub protein: f32,
    pub carbs: f32,
    pub fat: f32,
}

// Per-person figures for the whole plan, as shown on the plan overview.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PlanNutritionSummary {
    pub meals: usize,
    pub meals_with_macros: usize,
    pub total_time_minutes: u32,
    pub totals: MacroTotals,
    pub per_meal_average: Option<MacroTotals>,
}

pub fn summarize_plan(recipes: &[Recipe]) -> PlanNutritionSummary {
    let mut totals = MacroTotals::default();
    let mut meals_with_macros = 0;
    let mut total_time_minutes: u32 = 0;

    for recipe in recipes {
        total_time_minutes = total_time_minutes.saturating_add(recipe.total_time_minutes);
        if let Some(macros) = &recipe.macros {
            meals_with_macros += 1;
            macro_rules! add_macro {
                ($field:ident) => {
                    totals.$field += macros.$field as f32;
                };
            }
            add_macro!(calories);
            add_macro!(protein);
            add_macro!(carbs);
            add_macro!(fat);
        }
    }

    let per_meal_average = if meals_with_macros > 0 {
        let scale_factor = 1.0 / meals_with_macros as f32;
        let mut average = MacroTotals::default();
        macro_rules! scale_macro {
            ($field:ident) => {
                average.$field = totals.$field * scale_factor;
            };
        }
        scale_macro!(calories);
        scale_macro!(protein);
        scale_macro!(carbs);
        scale_macro!(fat);
        Some(average)
    } else {
        None
    };

    PlanNutritionSummary {
        meals: recipes.len(),
        meals_with_macros,
        total_time_minutes,
        totals,
        per_meal_average,
    }
}
