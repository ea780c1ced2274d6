//! Shared HTTP transport for provider clients
//!
//! Retries are a transport policy applied per provider, never by the search
//! pipeline itself. A provider configured with `max_retries = 0` gets a plain client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::debug;

const USER_AGENT: &str = concat!("FoodMap/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the given request timeout and optional transient-failure retries
pub fn build_client(timeout: Duration, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let mut builder = ClientBuilder::new(client);
    if max_retries > 0 {
        debug!("Installing retry middleware with {} retries", max_retries);
        let policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_and_without_retries() {
        assert!(build_client(Duration::from_secs(5), 0).is_ok());
        assert!(build_client(Duration::from_secs(5), 3).is_ok());
    }
}
