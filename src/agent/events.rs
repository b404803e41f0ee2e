//! Interaction event stream types.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::TychoError;
use crate::services::MemoryHit;

/// Concrete payloads emitted during one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEventPayload {
    /// Processing of the message has begun.
    Started,
    /// Long-term memories consulted for this message.
    MemoryRecall { hits: Vec<MemoryHit> },
    /// Agent-authored response text.
    Message { text: String },
    /// Processing finished normally.
    Completed,
}

/// Envelope for one event produced during an interaction.
///
/// Events are handed from producer to consumer exactly once; no component
/// retains them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    pub id: String,
    /// Name of the agent that emitted the event.
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub payload: AgentEventPayload,
}

impl AgentEvent {
    pub fn new(author: impl Into<String>, payload: AgentEventPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author: author.into(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Lazily produced sequence of events for one interaction. Each event becomes
/// available only as the agent produces it; consumers may stop polling at any
/// point.
pub type EventStream = BoxStream<'static, Result<AgentEvent, TychoError>>;
