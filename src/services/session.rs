//! Session-state service: conversation turns keyed by user and session.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;

use super::http::{auth_headers, probe_endpoint, require_field, shared_client};
use super::Capability;

/// One persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTurn {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionTurn {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// A turn authored by the end user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", text)
    }
}

/// Capability contract for session state.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn append_turn(&self, user_id: &str, session_id: &str, turn: SessionTurn) -> Result<()>;

    /// Turns recorded for one session, oldest first. Unknown sessions are
    /// empty, not errors.
    async fn history(&self, user_id: &str, session_id: &str) -> Result<Vec<SessionTurn>>;
}

/// Local variant: turns held in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: Mutex<HashMap<(String, String), Vec<SessionTurn>>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn append_turn(&self, user_id: &str, session_id: &str, turn: SessionTurn) -> Result<()> {
        self.sessions
            .lock()
            .await
            .entry((user_id.to_string(), session_id.to_string()))
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn history(&self, user_id: &str, session_id: &str) -> Result<Vec<SessionTurn>> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(&(user_id.to_string(), session_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct SessionEventsPage {
    #[serde(default)]
    events: Vec<SessionTurn>,
}

/// Managed variant: Vertex-style sessions API under a reasoning-engine
/// resource derived from `project_id`, `location`, and `database_name`.
#[derive(Debug)]
pub struct ManagedSessionService {
    base_url: String,
    resource: String,
}

impl ManagedSessionService {
    /// Connect against the regional API endpoint.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let base = format!("https://{}-aiplatform.googleapis.com/v1", settings.location);
        Self::connect_with_base_url(settings, &base).await
    }

    /// Connect against an explicit API root (tests point this at a mock
    /// server).
    pub async fn connect_with_base_url(settings: &Settings, base_url: &str) -> Result<Self> {
        require_field(Capability::Session, "project_id", &settings.project_id)?;
        require_field(Capability::Session, "location", &settings.location)?;
        require_field(Capability::Session, "database_name", &settings.database_name)?;

        let service = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: format!(
                "projects/{}/locations/{}/reasoningEngines/{}",
                settings.project_id, settings.location, settings.database_name
            ),
        };
        probe_endpoint(Capability::Session, &service.url("")).await?;
        debug!(resource = %service.resource, "connected managed session service");
        Ok(service)
    }

    /// Fully qualified resource name of the backing engine.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.resource, suffix)
    }
}

#[async_trait]
impl SessionService for ManagedSessionService {
    async fn append_turn(&self, user_id: &str, session_id: &str, turn: SessionTurn) -> Result<()> {
        let url = self.url(&format!("/sessions/{session_id}:appendEvent"));
        shared_client()
            .post(&url)
            .headers(auth_headers())
            .json(&serde_json::json!({ "userId": user_id, "event": turn }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn history(&self, user_id: &str, session_id: &str) -> Result<Vec<SessionTurn>> {
        let url = self.url(&format!("/sessions/{session_id}/events"));
        let page: SessionEventsPage = shared_client()
            .get(&url)
            .headers(auth_headers())
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(page.events)
    }
}
