//! Top-level AI system facade: initialize-once lifecycle and interactions.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::agent::{EventStream, OrchestratorAgent, RootAgent};
use crate::config::Settings;
use crate::error::Result;
use crate::runner::{BackendServices, Runner};
use crate::services;

type AgentFactory = Box<dyn Fn(&Settings) -> Arc<dyn OrchestratorAgent> + Send + Sync>;

/// Everything constructed by a successful `initialize()`. The agent and the
/// runner are set together or not at all.
struct Ready {
    agent: Arc<dyn OrchestratorAgent>,
    runner: Arc<Runner>,
}

/// Process-wide orchestration handle.
///
/// Two states: Uninitialized (initial) and Ready (terminal for the process's
/// lifetime; there is no teardown path). The transition runs inside a
/// [`OnceCell`] so concurrent callers share one in-flight initialization, and
/// a failed transition leaves the facade Uninitialized and retryable.
pub struct AiSystem {
    settings: Settings,
    agent_factory: AgentFactory,
    ready: OnceCell<Ready>,
}

impl AiSystem {
    /// Create an uninitialized facade around resolved settings, using the
    /// bundled [`RootAgent`] as the orchestrator.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            agent_factory: Box::new(|settings| {
                let agent: Arc<dyn OrchestratorAgent> = Arc::new(RootAgent::new(settings));
                agent
            }),
            ready: OnceCell::new(),
        }
    }

    /// Replace the orchestrator constructed at initialization. Any
    /// [`OrchestratorAgent`] implementation will do, including test doubles.
    pub fn with_agent_factory(
        mut self,
        factory: impl Fn(&Settings) -> Arc<dyn OrchestratorAgent> + Send + Sync + 'static,
    ) -> Self {
        self.agent_factory = Box::new(factory);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether the facade has reached the Ready state.
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// The runner, once initialized. Stable across the process lifetime.
    pub fn runner(&self) -> Option<&Arc<Runner>> {
        self.ready.get().map(|ready| &ready.runner)
    }

    /// The orchestrator agent, once initialized.
    pub fn agent(&self) -> Option<&Arc<dyn OrchestratorAgent>> {
        self.ready.get().map(|ready| &ready.agent)
    }

    /// Transition Uninitialized → Ready.
    ///
    /// Idempotent: once Ready, later calls return without reconstructing
    /// anything. On failure no partial state is retained and the call may be
    /// retried after correcting configuration.
    pub async fn initialize(&self) -> Result<()> {
        self.ready.get_or_try_init(|| self.build_ready()).await?;
        Ok(())
    }

    async fn build_ready(&self) -> Result<Ready> {
        // Placeholder settings are rejected before any backend is touched.
        self.settings.validate()?;

        let app_name = self.settings.app_name();
        info!(app = %app_name, "initializing AI system");

        let agent = (self.agent_factory)(&self.settings);
        let backends = BackendServices {
            session: services::select_session(&self.settings).await?,
            artifacts: services::select_artifact(&self.settings).await?,
            memory: services::select_memory(&self.settings).await?,
        };
        let runner = Arc::new(Runner::new(app_name, Arc::clone(&agent), backends));

        debug!(agent = agent.name(), "AI system ready");
        Ok(Ready { agent, runner })
    }

    /// The sole interaction entry point.
    ///
    /// Safe to call before explicit initialization: the first call performs
    /// the Ready transition lazily, and repeated calls reuse it. Returns the
    /// runner's event sequence unmodified, in emission order; dropping the
    /// stream mid-sequence is a supported outcome.
    pub async fn run_agent_interaction(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> Result<EventStream> {
        let ready = self.ready.get_or_try_init(|| self.build_ready()).await?;
        ready.runner.run(user_id, session_id, message).await
    }
}

/// Application factory: resolve settings from the environment and return an
/// eagerly initialized facade, ready for an external server front end.
pub async fn create_app() -> Result<AiSystem> {
    let settings = Settings::from_env()?;
    let system = AiSystem::new(settings);
    system.initialize().await?;
    Ok(system)
}
