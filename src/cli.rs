use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::{CookingLevel, Goal, UserPreferences, MAX_MEALS, MIN_MEALS};

#[derive(Parser, Debug)]
#[command(name = "meal-planner", author, version, about = "Weekly dinner planner and grocery list", long_about = None)]
pub struct Cli {
    /// Directory holding saved plans and the current session
    #[arg(global = true, long)]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(global = true, long, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, inspect and tweak the current meal plan
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Consolidated shopping list of the current plan
    #[command(subcommand)]
    Groceries(GroceriesCommand),

    /// Previously generated plans
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Ask the model for a new plan
    Generate(PreferencesArgs),
    /// Show the current plan day by day
    Show,
    /// Show the full recipe for one day
    Recipe { day: u8 },
    /// Replace one day of the current plan with a new recipe
    Regenerate { day: u8 },
}

#[derive(Subcommand, Debug)]
pub enum GroceriesCommand {
    /// Print the shopping list
    List {
        /// Hide items already checked off
        #[arg(long)]
        store_mode: bool,
    },
    /// Check or uncheck an item by its id (as shown by `groceries list`)
    Check { id: String },
    /// Plain-text export for sharing
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    List,
    /// Make a saved plan the current one
    Load { id: String },
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct PreferencesArgs {
    #[arg(long, value_enum, default_value_t = Goal::Balanced)]
    pub goal: Goal,

    #[arg(long, value_enum, default_value_t = CookingLevel::Intermediate)]
    pub level: CookingLevel,

    /// Number of dinners to plan
    #[arg(long, default_value_t = MAX_MEALS, value_parser = clap::value_parser!(u8).range(MIN_MEALS as i64..=MAX_MEALS as i64))]
    pub meals: u8,

    /// Allergies, dislikes, diets
    #[arg(long, default_value = "")]
    pub restrictions: String,

    /// What is already in the cupboards
    #[arg(long, default_value = "")]
    pub pantry: String,
}

impl From<PreferencesArgs> for UserPreferences {
    fn from(args: PreferencesArgs) -> Self {
        Self {
            goal: args.goal,
            restrictions: args.restrictions,
            cooking_level: args.level,
            pantry_items: args.pantry,
            number_of_meals: args.meals,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
