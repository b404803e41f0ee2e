//! Convenience re-exports for common use.

pub use crate::agent::{
    AgentEvent, AgentEventPayload, EventStream, InvocationContext, OrchestratorAgent, RootAgent,
};
pub use crate::config::{BackendKind, Settings};
pub use crate::error::{Result, TychoError};
pub use crate::runner::{BackendServices, Runner};
pub use crate::services::{
    ArtifactService, Capability, MemoryService, ServiceHandle, SessionService, SessionTurn,
};
pub use crate::system::{create_app, AiSystem};
