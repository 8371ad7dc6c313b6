use anyhow::{anyhow, Context, Result};
use meal_planner::api_connection::Provider;
use meal_planner::cli::{parse_args, Commands, GroceriesCommand, HistoryCommand, PlanCommand};
use meal_planner::config::AppConfig;
use meal_planner::models::UserPreferences;
use meal_planner::nutrition_summary::summarize_plan;
use meal_planner::recipe_generator::{OpenRouterRecipeGenerator, RecipeGenerationService};
use meal_planner::render;
use meal_planner::session::{MealPlanner, SessionError};
use meal_planner::storage::LocalStore;
use meal_planner::telemetry::init_tracing;
use serde::Serialize;
use tokio::fs;

const GENERATION_FAILED_NOTICE: &str =
    "Something went wrong while generating your recipes. Please try again.";
const EXPORT_TITLE: &str = "My shopping list:\n\n";

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_plan<G: RecipeGenerationService>(planner: &MealPlanner<G>) -> Result<()> {
    if planner.plan().is_empty() {
        Err(anyhow!("No current plan. Run `meal-planner plan generate` first."))
    } else {
        Ok(())
    }
}

async fn run_plan<G: RecipeGenerationService>(
    planner: &mut MealPlanner<G>,
    command: PlanCommand,
    json: bool,
) -> Result<()> {
    match command {
        PlanCommand::Generate(args) => {
            let preferences = UserPreferences::from(args);
            eprintln!("Generating {} recipes...", preferences.number_of_meals);
            match planner.generate_plan(preferences).await {
                Ok(_) => {}
                Err(SessionError::Generation(err)) => {
                    eprintln!("{}", GENERATION_FAILED_NOTICE);
                    return Err(anyhow!(err).context("plan generation failed"));
                }
                Err(err) => return Err(err.into()),
            }
            let summary = summarize_plan(planner.plan());
            if json {
                print_json(&planner.plan())?;
            } else {
                print!("{}", render::plan_overview(planner.plan(), &summary));
            }
        }
        PlanCommand::Show => {
            require_plan(planner)?;
            let summary = summarize_plan(planner.plan());
            if json {
                print_json(&serde_json::json!({ "recipes": planner.plan(), "summary": summary }))?;
            } else {
                print!("{}", render::plan_overview(planner.plan(), &summary));
            }
        }
        PlanCommand::Recipe { day } => {
            let recipe = planner
                .recipe_for_day(day)
                .with_context(|| format!("Day {} is not part of the current plan", day))?;
            if json {
                print_json(recipe)?;
            } else {
                print!("{}", render::recipe_details(recipe));
            }
        }
        PlanCommand::Regenerate { day } => {
            eprintln!("Regenerating day {}...", day);
            let recipe = match planner.regenerate_day(day).await {
                Ok(recipe) => recipe,
                Err(SessionError::Generation(err)) => {
                    eprintln!("Could not regenerate this day. The plan is unchanged.");
                    return Err(anyhow!(err).context("day regeneration failed"));
                }
                Err(err) => return Err(err.into()),
            };
            if json {
                print_json(recipe)?;
            } else {
                print!("{}", render::recipe_details(recipe));
            }
        }
    }
    Ok(())
}

async fn run_groceries<G: RecipeGenerationService>(
    planner: &mut MealPlanner<G>,
    command: GroceriesCommand,
    json: bool,
) -> Result<()> {
    require_plan(planner)?;
    match command {
        GroceriesCommand::List { store_mode } => {
            let list = if store_mode {
                planner.store_view()
            } else {
                planner.grocery_list()
            };
            if json {
                print_json(&list)?;
            } else if store_mode && list.is_empty() {
                println!("Everything is checked off.");
            } else {
                print!("{}", render::grocery_checklist(&list, &planner.state().checked));
                if store_mode {
                    println!("Checked items are hidden.");
                }
            }
        }
        GroceriesCommand::Check { id } => {
            if planner.grocery_list().find_by_check_id(&id).is_none() {
                return Err(anyhow!("No grocery item with id '{}'", id));
            }
            let checked = planner.toggle_checked(&id);
            if json {
                print_json(&render::CommandOutcome::new("toggled", id).with_checked(checked))?;
            } else {
                println!("{} {}", if checked { "Checked" } else { "Unchecked" }, id);
            }
        }
        GroceriesCommand::Export { output } => {
            let text = format!("{}{}", EXPORT_TITLE, planner.export_groceries());
            match output {
                Some(path) => {
                    fs::write(&path, &text)
                        .await
                        .with_context(|| format!("Failed to write export to '{}'", path.display()))?;
                    if json {
                        print_json(&render::CommandOutcome::new("exported", path.display().to_string()))?;
                    } else {
                        println!("Shopping list written to {}", path.display());
                    }
                }
                None if json => print_json(&serde_json::json!({ "text": text }))?,
                None => print!("{}", text),
            }
        }
    }
    Ok(())
}

fn run_history<G: RecipeGenerationService>(
    planner: &mut MealPlanner<G>,
    command: HistoryCommand,
    json: bool,
) -> Result<()> {
    match command {
        HistoryCommand::List => {
            if json {
                let plans: Vec<_> = planner.history().iter().collect();
                print_json(&plans)?;
            } else {
                let active = planner.state().active_plan_id.as_deref();
                print!("{}", render::history_listing(planner.history(), active));
            }
        }
        HistoryCommand::Load { id } => {
            let meals = planner.load_saved(&id)?.len();
            if json {
                print_json(&render::CommandOutcome::new("loaded", id).with_meals(meals))?;
            } else {
                println!("Loaded plan {} ({} meals)", id, meals);
            }
        }
        HistoryCommand::Delete { id } => {
            planner.delete_saved(&id)?;
            if json {
                print_json(&render::CommandOutcome::new("deleted", id))?;
            } else {
                println!("Deleted plan {}", id);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli_args = parse_args();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli_args.data_dir {
        config.data_dir = dir;
    }

    let provider = Provider::openrouter(&config.api_key_env_var)
        .with_base_url(&config.base_url)
        .with_timeout(config.timeout)
        .context("Failed to build HTTP client")?;
    let generator = OpenRouterRecipeGenerator::new(provider, &config.model);
    let mut planner = MealPlanner::open(generator, LocalStore::new(&config.data_dir));

    match cli_args.command {
        Commands::Plan(command) => run_plan(&mut planner, command, cli_args.json).await?,
        Commands::Groceries(command) => run_groceries(&mut planner, command, cli_args.json).await?,
        Commands::History(command) => run_history(&mut planner, command, cli_args.json)?,
    }

    Ok(())
}
