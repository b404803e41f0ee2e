//! Error types for Tycho.

use thiserror::Error;

use crate::services::Capability;

/// Primary error type for all Tycho operations.
#[derive(Error, Debug)]
pub enum TychoError {
    /// A required setting is missing or still carries its placeholder value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A managed backend service could not be constructed.
    #[error("Backend initialization failed ({capability}): {message}")]
    BackendInit {
        capability: Capability,
        message: String,
    },

    /// A failure raised while the orchestrator agent was producing events.
    #[error("Agent processing error: {0}")]
    AgentProcessing(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TychoError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a backend-initialization error for one capability.
    pub fn backend_init(capability: Capability, message: impl Into<String>) -> Self {
        Self::BackendInit {
            capability,
            message: message.into(),
        }
    }

    /// Create an agent-processing error.
    pub fn agent(message: impl Into<String>) -> Self {
        Self::AgentProcessing(message.into())
    }

    /// Whether this error came from the initialization path rather than a
    /// single interaction, so a caller can decide whether to retry setup or
    /// only the one message.
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::BackendInit { .. })
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TychoError>;
