use tracing::info;

use crate::models::{Recipe, SavedMealPlan};
use crate::storage::LocalStore;

pub const HISTORY_KEY: &str = "meal-plan-history";

/// Saved plans, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanHistory {
    plans: Vec<SavedMealPlan>,
}

impl PlanHistory {
    /// Unavailable or corrupt storage yields an empty history.
    pub fn load(store: &LocalStore) -> Self {
        let plans: Vec<SavedMealPlan> = store.read(HISTORY_KEY).unwrap_or_default();
        info!(plans = plans.len(), "history loaded");
        Self { plans }
    }

    pub fn save(&self, store: &LocalStore) -> bool {
        store.write(HISTORY_KEY, &self.plans)
    }

    pub fn record(&mut self, plan: SavedMealPlan) {
        self.plans.insert(0, plan);
    }

    pub fn get(&self, id: &str) -> Option<&SavedMealPlan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.plans.len();
        self.plans.retain(|plan| plan.id != id);
        self.plans.len() != before
    }

    pub fn replace_recipes(&mut self, id: &str, recipes: &[Recipe]) -> bool {
        match self.plans.iter_mut().find(|plan| plan.id == id) {
            Some(plan) => {
                plan.recipes = recipes.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedMealPlan> {
        self.plans.iter()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
