use anyhow::Result;
use async_trait::async_trait;

use super::RoutineError;
use super::Turn;

pub type RequestId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub id: RequestId,
    pub turns: Vec<Turn>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResponse {
    pub id: RequestId,
    pub result: Result<String, RoutineError>,
}

#[async_trait]
pub trait CompletionService {
    /// Used at startup to surface a misconfigured endpoint before the first
    /// routine is requested.
    async fn health_check(&self) -> Result<()>;

    /// Sends the full transcript and returns the assistant's reply text.
    async fn get_completion(&self, turns: &[Turn]) -> Result<String>;
}

pub type CompletionBox = Box<dyn CompletionService + Send + Sync>;
