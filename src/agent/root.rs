//! Default orchestrator bundled with the scaffold.

use async_stream::try_stream;
use async_trait::async_trait;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::services::SessionTurn;

use super::{AgentEvent, AgentEventPayload, EventStream, InvocationContext, OrchestratorAgent};

/// Minimal orchestrator: persists the turn, consults memory, answers once.
///
/// Model name and iteration/timeout limits come from [`Settings`] as advisory
/// values; this agent carries them but does not enforce them.
pub struct RootAgent {
    model: String,
    instruction: String,
    max_iterations: u32,
    timeout_seconds: u64,
}

impl RootAgent {
    pub fn new(settings: &Settings) -> Self {
        Self {
            model: settings.default_model.clone(),
            instruction: format!(
                "You are the orchestrator for {}, a {} company in the {} industry.",
                settings.company_name, settings.business_type, settings.industry
            ),
            max_iterations: settings.max_iterations,
            timeout_seconds: settings.timeout_seconds,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

#[async_trait]
impl OrchestratorAgent for RootAgent {
    fn name(&self) -> &str {
        "root_agent"
    }

    async fn process(&self, ctx: InvocationContext, message: String) -> Result<EventStream> {
        debug!(
            app = %ctx.app_name,
            user = %ctx.user_id,
            session = %ctx.session_id,
            model = %self.model,
            "processing message"
        );
        let author = self.name().to_string();
        let model = self.model.clone();

        // Work happens as the stream is polled, not when `process` returns.
        let stream = try_stream! {
            yield AgentEvent::new(&author, AgentEventPayload::Started);

            ctx.session
                .append_turn(&ctx.user_id, &ctx.session_id, SessionTurn::user(&message))
                .await?;

            let hits = ctx.memory.search(&message).await?;
            if !hits.is_empty() {
                yield AgentEvent::new(&author, AgentEventPayload::MemoryRecall { hits });
            }

            let reply = format!("[{model}] Acknowledged: {message}");
            ctx.session
                .append_turn(&ctx.user_id, &ctx.session_id, SessionTurn::new(&author, &reply))
                .await?;
            ctx.memory
                .record(&ctx.user_id, &ctx.session_id, &message)
                .await?;

            yield AgentEvent::new(&author, AgentEventPayload::Message { text: reply });
            yield AgentEvent::new(&author, AgentEventPayload::Completed);
        };
        Ok(Box::pin(stream))
    }
}
