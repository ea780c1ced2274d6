//! OpenAI-compatible chat-completions client used as the text-understanding provider

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::TextUnderstandingProvider;
use crate::config::{ENV_OPENAI_API_KEY, InterpreterConfig};
use crate::{FoodMapError, Result, http};

/// Provider implementation for OpenAI-style `/chat/completions` APIs
pub struct OpenAiProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider from the interpreter configuration.
    ///
    /// # Errors
    /// Returns a configuration error if no API key is configured.
    pub fn new(config: &InterpreterConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            FoodMapError::config(format!(
                "Interpreter API key missing. Set {ENV_OPENAI_API_KEY} or interpreter.api_key"
            ))
        })?;

        let client = http::build_client(config.timeout(), config.max_retries)
            .map_err(|e| FoodMapError::config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Response payload returned by the chat-completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    /// Null when the model refuses or calls a tool
    content: Option<String>,
}

#[async_trait]
impl TextUnderstandingProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip(self, text, instruction), fields(model = %self.model))]
    async fn complete(&self, text: &str, instruction: &str) -> Result<String> {
        let start = Instant::now();

        let request_body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": instruction},
                {"role": "user", "content": text},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0,
        });
        let body = serde_json::to_vec(&request_body)
            .map_err(|e| FoodMapError::interpretation(format!("Failed to encode request: {e}")))?;

        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Interpreter request failed: {}", e);
                FoodMapError::interpretation(format!("Request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Interpreter API returned {}: {}", status, error_text);
            return Err(FoodMapError::interpretation(format!(
                "Interpreter API request failed with status {status}"
            )));
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            FoodMapError::interpretation(format!("Failed to parse response: {e}"))
        })?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FoodMapError::interpretation("Interpreter API returned no content"))?;

        info!(
            "Interpreter replied in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        debug!("Interpreter content length: {}", content.len());
        Ok(content)
    }
}
