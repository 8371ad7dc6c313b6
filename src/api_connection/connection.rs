use std::env;
use std::time::Duration;

use dotenv::dotenv;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, Provider, OPENROUTER_BASE_URL,
};

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_APP_NAME: &str = "MealPlanner";

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl Provider {
    /// OpenRouter provider reading its key from `api_key_env_var_name` at call time.
    pub fn openrouter(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::OpenRouter {
            api_key: api_key_env_var_name.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            site_url: env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
            client: Client::new(),
        }
    }

    pub fn with_base_url(self, url: &str) -> Self {
        match self {
            Provider::OpenRouter {
                api_key,
                site_url,
                app_name,
                client,
                ..
            } => Provider::OpenRouter {
                api_key,
                base_url: url.trim_end_matches('/').to_string(),
                site_url,
                app_name,
                client,
            },
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ApiConnectionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(match self {
            Provider::OpenRouter {
                api_key,
                base_url,
                site_url,
                app_name,
                ..
            } => Provider::OpenRouter {
                api_key,
                base_url,
                site_url,
                app_name,
                client,
            },
        })
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key: api_key_env_var_name,
                base_url,
                site_url,
                app_name,
                client,
                ..
            } => {
                dotenv().ok();
                let actual_api_key = env::var(api_key_env_var_name)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

                let url = format!("{}/chat/completions", base_url);
                debug!(%url, model = %request.model, messages = request.messages.len(), "sending chat completion");

                let response = client
                    .post(&url)
                    .bearer_auth(actual_api_key)
                    .header("HTTP-Referer", site_url)
                    .header("X-Title", app_name)
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let chat_response = response.json::<ChatCompletionResponse>().await?;
                    debug!(id = %chat_response.id, choices = chat_response.choices.len(), "chat completion received");
                    Ok(chat_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    warn!(%status, "chat completion rejected");
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}
