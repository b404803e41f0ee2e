//! Orchestrator agent capability and event types.

pub mod events;
pub mod root;

pub use events::{AgentEvent, AgentEventPayload, EventStream};
pub use root::RootAgent;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::{ArtifactService, MemoryService, SessionService};

/// Ambient context supplied to the agent for one interaction. The agent may
/// read and write the three backend services while processing.
#[derive(Clone)]
pub struct InvocationContext {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub session: Arc<dyn SessionService>,
    pub artifacts: Arc<dyn ArtifactService>,
    pub memory: Arc<dyn MemoryService>,
}

/// The orchestrator capability consumed by the runner.
///
/// Exactly one implementation is active per runner; the core never inspects
/// its internals.
#[async_trait]
pub trait OrchestratorAgent: Send + Sync {
    /// Stable name, used as the author of emitted events.
    fn name(&self) -> &str;

    /// Process one user message, producing a lazy sequence of events.
    async fn process(&self, ctx: InvocationContext, message: String) -> Result<EventStream>;
}
