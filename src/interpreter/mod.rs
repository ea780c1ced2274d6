//! Query interpretation
//!
//! Turns free-text search queries into a [`StructuredFilter`] by asking an external
//! text-understanding provider and strictly parsing its reply. A reply that does not
//! have the expected shape is an error; values are never guessed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::models::{Query, StructuredFilter};
use crate::{FoodMapError, Result};

pub mod openai;

pub use openai::OpenAiProvider;

/// Instruction sent alongside every query
pub const FILTER_INSTRUCTION: &str = "Extract search filters from the user's request for \
food assistance. Respond with a single JSON object with exactly these keys: \"category\" \
(kind of food, e.g. \"produce\" or \"non-perishable\"), \"location\" (place name), \
\"targetAudience\" (who the food is for, e.g. \"families\" or \"seniors\"). Use null for \
any attribute the request does not mention. Do not add other keys or any prose.";

/// External service that answers a text under an instruction
#[async_trait]
pub trait TextUnderstandingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the provider's raw reply for `text` under `instruction`.
    ///
    /// Unreachable providers and non-success responses are reported as
    /// [`FoodMapError::Interpretation`].
    async fn complete(&self, text: &str, instruction: &str) -> Result<String>;
}

/// Converts query text into a structured filter
#[derive(Clone)]
pub struct QueryInterpreter {
    provider: Arc<dyn TextUnderstandingProvider>,
}

impl QueryInterpreter {
    pub fn new(provider: Arc<dyn TextUnderstandingProvider>) -> Self {
        Self { provider }
    }

    /// Ask the provider for the filter attributes of `query`. One outbound call, no retry.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn interpret(&self, query: &Query) -> Result<StructuredFilter> {
        let reply = self
            .provider
            .complete(query.as_str(), FILTER_INSTRUCTION)
            .await?;
        debug!("Interpreter reply: {}", reply);

        let filter = parse_filter(&reply).inspect_err(|e| {
            warn!("Rejecting interpreter reply: {}", e);
        })?;
        debug!("Interpreted filter: {:?}", filter);
        Ok(filter)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterReply {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "targetAudience", alias = "target_audience")]
    target_audience: Option<String>,
}

/// Parse a provider reply into a filter.
///
/// Accepts one JSON object, optionally wrapped in a Markdown code fence, whose keys
/// are a subset of `category`, `location` and `targetAudience` with string or null values.
pub fn parse_filter(reply: &str) -> Result<StructuredFilter> {
    let body = strip_code_fence(reply);

    let value: Value = serde_json::from_str(body).map_err(|e| {
        FoodMapError::interpretation(format!("Provider reply is not valid JSON: {e}"))
    })?;

    if !value.is_object() {
        return Err(FoodMapError::interpretation(
            "Provider reply is not a JSON object",
        ));
    }

    let reply: FilterReply = serde_json::from_value(value).map_err(|e| {
        FoodMapError::interpretation(format!("Provider reply has an unexpected shape: {e}"))
    })?;

    Ok(StructuredFilter::new(
        reply.category,
        reply.location,
        reply.target_audience,
    ))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Drop a language tag such as ```json
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') => body.trim(),
        _ => inner.trim(),
    }
}
