#[cfg(test)]
#[path = "rag_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::Backend;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResponse;
use crate::domain::services::Endpoint;

/// HTTP client for the agentic RAG generation service.
pub struct RagService {
    endpoint: Endpoint,
    timeout: Duration,
}

impl RagService {
    pub fn new(endpoint: Endpoint, health_check_timeout_ms: u64) -> RagService {
        return RagService {
            endpoint,
            timeout: Duration::from_millis(health_check_timeout_ms),
        };
    }
}

#[async_trait]
impl Backend for RagService {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let url = self.endpoint.health_url();
        let res = reqwest::Client::new()
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, url = url.as_str(), "Generation backend is not running");
                bail!("Generation backend is not running at {}", self.endpoint.base_url());
            }
        };

        if res.status() != 200 {
            tracing::error!(
                status = res.status().as_u16(),
                "Generation backend health check failed"
            );
            bail!("Generation backend health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let res = reqwest::Client::new()
            .post(self.endpoint.generate_url())
            .json(request)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make generation request"
            );
            bail!("Request failed with status {}", res.status().as_u16());
        }

        let body = res.json::<Value>().await?;
        let response = GenerationResponse::from_value(&body);
        tracing::debug!(
            success = ?response.success,
            has_script = response.lua_script.is_some(),
            has_error = response.error.is_some(),
            "Generation response"
        );

        return Ok(response);
    }
}
