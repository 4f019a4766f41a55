use anyhow::Result;
use async_trait::async_trait;

use super::GenerationRequest;
use super::GenerationResponse;

#[async_trait]
pub trait Backend {
    /// Verifies the generation service is reachable. Used at startup and by
    /// the `health` subcommand.
    async fn health_check(&self) -> Result<()>;

    /// Issues a single generation request. Non-success statuses, transport
    /// errors and undecodable bodies are all returned as errors so the caller
    /// can fall back.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
