use meal_planner::api_connection::{
    connection::ApiConnectionError,
    endpoints::{ChatCompletionRequest, ChatMessage, Provider, OPENROUTER_MODELS},
};
use meal_planner::models::UserPreferences;
use meal_planner::recipe_generator::{
    GenerationError, OpenRouterRecipeGenerator, RecipeGenerationService,
};
use dotenv::dotenv;
use std::env;

const TEST_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

fn default_test_model() -> String {
    OPENROUTER_MODELS
        .first()
        .map(|m| m.model_name.to_string())
        .expect("No model configured in OPENROUTER_MODELS")
}

fn setup_test_environment() {
    dotenv().ok();
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::openrouter("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_MEALPLAN");
    let request = ChatCompletionRequest {
        model: default_test_model(),
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_MEALPLAN");
    }
}

#[tokio::test]
async fn test_generator_surfaces_missing_key_as_total_failure() {
    setup_test_environment();
    let provider = Provider::openrouter("ANOTHER_KEY_THAT_DOES_NOT_EXIST_MEALPLAN");
    let generator = OpenRouterRecipeGenerator::new(provider, &default_test_model());

    let result = generator.generate_plan(&UserPreferences::default()).await;

    assert!(matches!(
        result,
        Err(GenerationError::Api(ApiConnectionError::MissingApiKey(_)))
    ));
}

#[tokio::test]
async fn test_generator_rejects_out_of_range_requests_before_calling() {
    let provider = Provider::openrouter("UNUSED_KEY_MEALPLAN");
    let generator = OpenRouterRecipeGenerator::new(provider, &default_test_model());

    let prefs = UserPreferences {
        number_of_meals: 9,
        ..UserPreferences::default()
    };
    assert!(matches!(
        generator.generate_plan(&prefs).await,
        Err(GenerationError::InvalidPreferences(_))
    ));
    assert!(matches!(
        generator.regenerate_day(&UserPreferences::default(), 0).await,
        Err(GenerationError::InvalidDay(0))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let key_var = "MEAL_PLANNER_TEST_DUMMY_KEY";
    unsafe {
        env::set_var(key_var, "dummy");
    }
    // Port 9 (discard) on localhost is not expected to speak HTTP.
    let provider = Provider::openrouter(key_var).with_base_url("http://127.0.0.1:9/api/v1");
    let request = ChatCompletionRequest {
        model: default_test_model(),
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };

    let result = provider.call_chat_completion(request).await;

    assert!(matches!(result, Err(ApiConnectionError::NetworkError(_))), "got {:?}", result);
    unsafe {
        env::remove_var(key_var);
    }
}

#[tokio::test]
#[ignore]
async fn test_live_plan_generation() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_live_plan_generation: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let generator = OpenRouterRecipeGenerator::new(
        Provider::openrouter(TEST_API_KEY_ENV_VAR),
        &default_test_model(),
    );
    let prefs = UserPreferences {
        number_of_meals: 2,
        ..UserPreferences::default()
    };

    let result = generator.generate_plan(&prefs).await;
    assert!(result.is_ok(), "API call failed: {:?}", result.err());
    let plan = result.unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].day_number, 1);
    assert_eq!(plan[1].day_number, 2);
    assert!(plan.iter().all(|r| !r.ingredients.is_empty() && r.macros.is_some()));
}

#[tokio::test]
#[ignore]
async fn test_live_day_regeneration() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_live_day_regeneration: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let generator = OpenRouterRecipeGenerator::new(
        Provider::openrouter(TEST_API_KEY_ENV_VAR),
        &default_test_model(),
    );

    let result = generator.regenerate_day(&UserPreferences::default(), 4).await;
    assert!(result.is_ok(), "API call failed: {:?}", result.err());
    let recipe = result.unwrap();
    assert_eq!(recipe.day_number, 4);
    assert!(recipe.id.starts_with("recipe-regen-"));
}
