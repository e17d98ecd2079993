//! API Client
//!
//! HTTP client for probing a running meal API server.

use meal_api::HealthResponse;
use reqwest::Client;
use std::time::Duration;

use crate::error::{CliError, CliResult};

/// Meal API client
pub struct MealClient {
    client: Client,
    base_url: String,
}

impl MealClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get health status
    pub async fn health(&self) -> CliResult<HealthResponse> {
        self.check("health").await
    }

    /// Get readiness, including database connectivity
    pub async fn ready(&self) -> CliResult<HealthResponse> {
        self.check("ready").await
    }

    async fn check(&self, path: &str) -> CliResult<HealthResponse> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CliError::unreachable(format!("{}: {}", url, e)))?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(CliError::rejected(
                response.status().as_u16(),
                response.text().await.unwrap_or_default(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = MealClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
