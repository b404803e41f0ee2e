//! Couples one orchestrator agent with the three backend services.

use std::sync::Arc;

use tracing::debug;

use crate::agent::{EventStream, InvocationContext, OrchestratorAgent};
use crate::error::Result;
use crate::services::{ArtifactService, MemoryService, SessionService};

/// The three constructed backend service instances a runner binds.
///
/// Shared by reference across all interactions the runner processes; any
/// mutual exclusion over their state is each service's own responsibility.
#[derive(Clone)]
pub struct BackendServices {
    pub session: Arc<dyn SessionService>,
    pub artifacts: Arc<dyn ArtifactService>,
    pub memory: Arc<dyn MemoryService>,
}

/// Binds one application name, one orchestrator agent, and exactly one
/// instance of each backend service. Immutable after construction; owned
/// exclusively by the facade.
pub struct Runner {
    app_name: String,
    agent: Arc<dyn OrchestratorAgent>,
    services: BackendServices,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<dyn OrchestratorAgent>,
        services: BackendServices,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            services,
        }
    }

    /// Application identity this runner operates under.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Run one interaction.
    ///
    /// Events are relayed in emission order with no reordering or buffering.
    /// Failures raised during agent processing propagate unchanged, mid-stream
    /// if events were already yielded.
    pub async fn run(&self, user_id: &str, session_id: &str, message: &str) -> Result<EventStream> {
        debug!(
            app = %self.app_name,
            agent = self.agent.name(),
            user = user_id,
            session = session_id,
            "dispatching interaction"
        );
        let ctx = InvocationContext {
            app_name: self.app_name.clone(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            session: Arc::clone(&self.services.session),
            artifacts: Arc::clone(&self.services.artifacts),
            memory: Arc::clone(&self.services.memory),
        };
        self.agent.process(ctx, message.to_string()).await
    }
}
