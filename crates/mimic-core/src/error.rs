//! Error types for the posting core.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MimicError {
    /// Store unreachable or connection lost.
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// Agent or style profile missing.
    #[error("{0} not found")]
    NotFound(String),

    /// Analysis output failed structural validation.
    #[error("malformed analysis: {0}")]
    MalformedAnalysis(String),

    /// Text-analysis capability call failed.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Content-generation capability failed or produced nothing.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Store reachable but the operation failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl MimicError {
    pub fn agent_not_found(agent_id: Uuid) -> Self {
        MimicError::NotFound(format!("agent {}", agent_id))
    }

    pub fn profile_not_found(agent_id: Uuid) -> Self {
        MimicError::NotFound(format!("style profile for agent {}", agent_id))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, MimicError::Connectivity(_))
    }
}

pub type Result<T> = std::result::Result<T, MimicError>;
