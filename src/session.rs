use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::grocery::{aggregate, filter_checked, format_for_export, ConsolidatedList};
use crate::history::PlanHistory;
use crate::models::{Recipe, SavedMealPlan, UserPreferences};
use crate::recipe_generator::{GenerationError, RecipeGenerationService};
use crate::storage::LocalStore;

pub const SESSION_KEY: &str = "current-session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("recipe generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("no active meal plan")]
    NoActivePlan,

    #[error("day {0} is not part of the current plan")]
    DayNotInPlan(u8),

    #[error("saved plan not found with id: {0}")]
    PlanNotFound(String),
}

/// What the user is currently looking at, persisted across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
    #[serde(default)]
    pub plan: Vec<Recipe>,
    #[serde(default)]
    pub checked: BTreeSet<String>,
    #[serde(default)]
    pub active_plan_id: Option<String>,
}

/// Application state around an injected [`RecipeGenerationService`].
///
/// Failed generation leaves every piece of state untouched. Successful
/// changes are written to the store straight away.
pub struct MealPlanner<G> {
    generator: G,
    store: LocalStore,
    history: PlanHistory,
    state: SessionState,
}

impl<G: RecipeGenerationService> MealPlanner<G> {
    pub fn open(generator: G, store: LocalStore) -> Self {
        let history = PlanHistory::load(&store);
        let state: SessionState = store.read(SESSION_KEY).unwrap_or_default();
        Self {
            generator,
            store,
            history,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn plan(&self) -> &[Recipe] {
        &self.state.plan
    }

    pub fn preferences(&self) -> Option<&UserPreferences> {
        self.state.preferences.as_ref()
    }

    pub fn history(&self) -> &PlanHistory {
        &self.history
    }

    pub fn recipe_for_day(&self, day_number: u8) -> Option<&Recipe> {
        self.state
            .plan
            .iter()
            .find(|recipe| recipe.day_number == day_number)
    }

    pub async fn generate_plan(
        &mut self,
        preferences: UserPreferences,
    ) -> Result<&[Recipe], SessionError> {
        preferences
            .validate()
            .map_err(SessionError::InvalidPreferences)?;

        let recipes = self
            .generator
            .generate_plan(&preferences)
            .await
            .inspect_err(|err| warn!(error = %err, "plan generation failed, keeping previous state"))?;

        let saved = SavedMealPlan {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
            preferences: preferences.clone(),
            recipes: recipes.clone(),
        };
        info!(id = %saved.id, recipes = recipes.len(), "new plan recorded");

        self.state = SessionState {
            preferences: Some(preferences),
            plan: recipes,
            checked: BTreeSet::new(),
            active_plan_id: Some(saved.id.clone()),
        };
        self.history.record(saved);
        self.persist();

        Ok(&self.state.plan)
    }

    pub async fn regenerate_day(&mut self, day_number: u8) -> Result<&Recipe, SessionError> {
        let preferences = self
            .state
            .preferences
            .as_ref()
            .filter(|_| !self.state.plan.is_empty())
            .ok_or(SessionError::NoActivePlan)?;
        let position = self
            .state
            .plan
            .iter()
            .position(|recipe| recipe.day_number == day_number)
            .ok_or(SessionError::DayNotInPlan(day_number))?;

        let recipe = self
            .generator
            .regenerate_day(preferences, day_number)
            .await
            .inspect_err(|err| warn!(day = day_number, error = %err, "regeneration failed, keeping day"))?;

        info!(day = day_number, name = %recipe.name, "day replaced");
        self.state.plan[position] = recipe;
        self.prune_checked();
        if let Some(id) = &self.state.active_plan_id {
            self.history.replace_recipes(id, &self.state.plan);
        }
        self.persist();

        Ok(&self.state.plan[position])
    }

    pub fn load_saved(&mut self, id: &str) -> Result<&[Recipe], SessionError> {
        let saved = self
            .history
            .get(id)
            .ok_or_else(|| SessionError::PlanNotFound(id.to_string()))?;

        self.state = SessionState {
            preferences: Some(saved.preferences.clone()),
            plan: saved.recipes.clone(),
            checked: BTreeSet::new(),
            active_plan_id: Some(saved.id.clone()),
        };
        self.persist();

        Ok(&self.state.plan)
    }

    /// Removes a saved plan. The plan on screen, if it was that one, stays loaded.
    pub fn delete_saved(&mut self, id: &str) -> Result<(), SessionError> {
        if !self.history.remove(id) {
            return Err(SessionError::PlanNotFound(id.to_string()));
        }
        if self.state.active_plan_id.as_deref() == Some(id) {
            self.state.active_plan_id = None;
        }
        self.persist();
        Ok(())
    }

    /// Flips the checked state of a grocery item and returns the new state.
    pub fn toggle_checked(&mut self, check_id: &str) -> bool {
        let now_checked = if self.state.checked.remove(check_id) {
            false
        } else {
            self.state.checked.insert(check_id.to_string());
            true
        };
        self.persist();
        now_checked
    }

    pub fn is_checked(&self, check_id: &str) -> bool {
        self.state.checked.contains(check_id)
    }

    pub fn grocery_list(&self) -> ConsolidatedList {
        aggregate(&self.state.plan)
    }

    pub fn store_view(&self) -> ConsolidatedList {
        let checked: HashSet<String> = self.state.checked.iter().cloned().collect();
        filter_checked(&self.grocery_list(), &checked)
    }

    pub fn export_groceries(&self) -> String {
        format_for_export(&self.grocery_list())
    }

    // Check ids of items no longer on the list could never be unchecked again.
    fn prune_checked(&mut self) {
        let list = self.grocery_list();
        let before = self.state.checked.len();
        self.state
            .checked
            .retain(|check_id| list.find_by_check_id(check_id).is_some());
        let dropped = before - self.state.checked.len();
        if dropped > 0 {
            debug!(dropped, "cleared checks of items gone from the list");
        }
    }

    fn persist(&self) {
        self.history.save(&self.store);
        self.store.write(SESSION_KEY, &self.state);
    }
}
