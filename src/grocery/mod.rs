//! Grocery list consolidation and the views derived from it.
//!
//! [`aggregate`] merges the ingredients of every recipe in a plan into one
//! categorized list. [`filter_checked`] and [`format_for_export`] are the
//! pure projections the presentation layer renders.

pub mod aggregator;
pub mod views;

pub use aggregator::{aggregate, ConsolidatedIngredient, ConsolidatedList};
pub use views::{filter_checked, format_for_export};
