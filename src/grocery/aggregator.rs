use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Category, Ingredient, Recipe};

/// One line of the shopping list: every ingredient sharing a merge key,
/// with quantities summed where they are numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedIngredient {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub category: Category,
}

impl ConsolidatedIngredient {
    fn seed(ingredient: &Ingredient, normalized_name: String) -> Self {
        Self {
            name: normalized_name,
            quantity: ingredient.quantity.clone(),
            unit: ingredient.unit.clone(),
            category: ingredient.category,
        }
    }

    /// Identifier the presentation layer keys checkbox state on.
    pub fn check_id(&self) -> String {
        format!("{}-{}-{}", self.category, self.name, self.unit)
    }
}

/// Shopping list partitioned by category.
///
/// Always holds every category of [`Category::ALL`] in enumeration order,
/// empty ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedList {
    sections: IndexMap<Category, Vec<ConsolidatedIngredient>>,
}

impl Default for ConsolidatedList {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConsolidatedList {
    pub fn empty() -> Self {
        Self {
            sections: Category::ALL
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        }
    }

    pub(crate) fn push(&mut self, item: ConsolidatedIngredient) {
        self.sections.entry(item.category).or_default().push(item);
    }

    pub fn get(&self, category: Category) -> &[ConsolidatedIngredient] {
        self.sections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[ConsolidatedIngredient])> {
        self.sections
            .iter()
            .map(|(category, items)| (*category, items.as_slice()))
    }

    pub fn items(&self) -> impl Iterator<Item = &ConsolidatedIngredient> {
        self.sections.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn find_by_check_id(&self, check_id: &str) -> Option<&ConsolidatedIngredient> {
        self.items().find(|item| item.check_id() == check_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MergeKey {
    name: String,
    unit: String,
}

impl MergeKey {
    fn of(ingredient: &Ingredient) -> Self {
        Self {
            name: normalize_name(&ingredient.name),
            unit: ingredient.unit.clone(),
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn parse_quantity(quantity: &str) -> Option<f64> {
    quantity
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Sum of two quantities when both are plain decimal numbers and the total stays finite.
fn sum_quantities(accumulated: &str, incoming: &str) -> Option<String> {
    let total = parse_quantity(accumulated)? + parse_quantity(incoming)?;
    Some(total)
        .filter(|total| total.is_finite())
        .map(|total| total.to_string())
}

/// Consolidates the ingredients of `recipes` into a categorized shopping list.
///
/// Ingredients merge when their trimmed, lowercased names and their verbatim
/// units are equal. Numeric quantities are summed. When either side of a
/// merge is not a number the accumulated quantity is kept as is and the
/// incoming amount is dropped. The category is fixed by the first ingredient
/// seen for a key. Items keep first-encounter order within their category.
pub fn aggregate(recipes: &[Recipe]) -> ConsolidatedList {
    let mut merged: IndexMap<MergeKey, ConsolidatedIngredient> = IndexMap::new();

    for ingredient in recipes.iter().flat_map(|recipe| recipe.ingredients.iter()) {
        match merged.entry(MergeKey::of(ingredient)) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                match sum_quantities(&existing.quantity, &ingredient.quantity) {
                    Some(total) => existing.quantity = total,
                    None => debug!(
                        name = %existing.name,
                        unit = %existing.unit,
                        kept = %existing.quantity,
                        dropped = %ingredient.quantity,
                        "non-numeric quantity, keeping first amount"
                    ),
                }
            }
            Entry::Vacant(entry) => {
                let normalized_name = entry.key().name.clone();
                entry.insert(ConsolidatedIngredient::seed(ingredient, normalized_name));
            }
        }
    }

    let mut list = ConsolidatedList::empty();
    for item in merged.into_values() {
        list.push(item);
    }
    list
}
