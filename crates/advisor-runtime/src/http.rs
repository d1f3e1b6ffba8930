//! HTTP Recommendation Generator
//!
//! Implementation of `RecommendationGenerator` against a remote JSON
//! service. The service receives the full `GeneratorRequest` and must
//! answer with a `Generation` body (draft plan plus usage stats).

use std::time::Duration;

use advisor_core::{
    error::{GeneratorError, Result},
    generator::{Generation, GeneratorInfo, RecommendationGenerator},
    request::GeneratorRequest,
};
use async_trait::async_trait;

/// HTTP generator configuration
#[derive(Clone, Debug)]
pub struct HttpGeneratorConfig {
    /// Service endpoint receiving generation requests
    pub endpoint: String,

    /// Model identifier forwarded for backend routing
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpGeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8087/v1/rebalance".into(),
            model: "advisor-v1".into(),
            timeout_secs: 30,
        }
    }
}

impl HttpGeneratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let endpoint =
            std::env::var("GENERATOR_ENDPOINT").unwrap_or(defaults.endpoint);
        let model = std::env::var("GENERATOR_MODEL").unwrap_or(defaults.model);
        let timeout_secs = std::env::var("GENERATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            endpoint,
            model,
            timeout_secs,
        }
    }
}

/// HTTP recommendation generator
pub struct HttpGenerator {
    client: reqwest::Client,
    config: HttpGeneratorConfig,
}

impl HttpGenerator {
    /// Create a new generator against a custom endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::from_config(HttpGeneratorConfig {
            endpoint: endpoint.into(),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: HttpGeneratorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(HttpGeneratorConfig::from_env())
    }

    fn transport_error(&self, err: reqwest::Error) -> GeneratorError {
        if err.is_timeout() {
            GeneratorError::Timeout(self.config.timeout_secs)
        } else {
            GeneratorError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl RecommendationGenerator for HttpGenerator {
    async fn info(&self) -> Result<GeneratorInfo> {
        Ok(GeneratorInfo {
            name: "HttpGenerator".into(),
            model: Some(self.config.model.clone()),
            version: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.get(&self.config.endpoint).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(e) => {
                tracing::warn!("generator health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn generate(&self, request: &GeneratorRequest) -> Result<Generation> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Unavailable(format!(
                "generator answered {status}"
            )));
        }

        response
            .json::<Generation>()
            .await
            .map_err(|e| GeneratorError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpGeneratorConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8087/v1/rebalance");
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_info_reports_model() {
        let generator = HttpGenerator::new("http://localhost:9999/none");
        let info = generator.info().await.unwrap();
        assert_eq!(info.name, "HttpGenerator");
        assert_eq!(info.model.as_deref(), Some("advisor-v1"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unhealthy() {
        let generator = HttpGenerator::new("http://127.0.0.1:1/none");
        assert!(!generator.health_check().await.unwrap());
    }
}
