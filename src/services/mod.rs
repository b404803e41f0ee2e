//! Pluggable backend services: session state, artifact storage, long-term
//! memory. Each capability has a managed cloud variant and an in-memory
//! variant; the selector picks one from [`Settings`].

pub mod artifact;
pub(crate) mod http;
pub mod memory;
pub mod session;

pub use artifact::{ArtifactService, InMemoryArtifactService, ManagedArtifactService};
pub use memory::{InMemoryMemoryService, ManagedMemoryService, MemoryHit, MemoryService};
pub use session::{InMemorySessionService, ManagedSessionService, SessionService, SessionTurn};

use std::sync::Arc;

use strum::Display;
use tracing::debug;

use crate::config::{BackendKind, Settings};
use crate::error::Result;

/// The three backend capabilities the runtime wires together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Session,
    Artifact,
    Memory,
}

/// A constructed backend service instance.
#[derive(Clone)]
pub enum ServiceHandle {
    Session(Arc<dyn SessionService>),
    Artifact(Arc<dyn ArtifactService>),
    Memory(Arc<dyn MemoryService>),
}

impl ServiceHandle {
    pub fn into_session(self) -> Option<Arc<dyn SessionService>> {
        match self {
            Self::Session(service) => Some(service),
            _ => None,
        }
    }

    pub fn into_artifact(self) -> Option<Arc<dyn ArtifactService>> {
        match self {
            Self::Artifact(service) => Some(service),
            _ => None,
        }
    }

    pub fn into_memory(self) -> Option<Arc<dyn MemoryService>> {
        match self {
            Self::Memory(service) => Some(service),
            _ => None,
        }
    }
}

/// Construct the backend service for one capability.
///
/// Reads the capability's backend-selection flag: managed variants open
/// network resources and may fail with
/// [`TychoError::BackendInit`](crate::TychoError::BackendInit); in-memory
/// variants allocate local state only and never touch the network. Failures
/// are fatal here, never retried.
pub async fn select(capability: Capability, settings: &Settings) -> Result<ServiceHandle> {
    Ok(match capability {
        Capability::Session => ServiceHandle::Session(select_session(settings).await?),
        Capability::Artifact => ServiceHandle::Artifact(select_artifact(settings).await?),
        Capability::Memory => ServiceHandle::Memory(select_memory(settings).await?),
    })
}

pub async fn select_session(settings: &Settings) -> Result<Arc<dyn SessionService>> {
    debug!(kind = %settings.session_backend, "selecting session backend");
    Ok(match settings.session_backend {
        BackendKind::Managed => Arc::new(ManagedSessionService::connect(settings).await?),
        BackendKind::InMemory => Arc::new(InMemorySessionService::new()),
    })
}

pub async fn select_artifact(settings: &Settings) -> Result<Arc<dyn ArtifactService>> {
    debug!(kind = %settings.artifact_backend, "selecting artifact backend");
    Ok(match settings.artifact_backend {
        BackendKind::Managed => Arc::new(ManagedArtifactService::connect(settings).await?),
        BackendKind::InMemory => Arc::new(InMemoryArtifactService::new()),
    })
}

pub async fn select_memory(settings: &Settings) -> Result<Arc<dyn MemoryService>> {
    debug!(kind = %settings.memory_backend, "selecting memory backend");
    Ok(match settings.memory_backend {
        BackendKind::Managed => Arc::new(ManagedMemoryService::connect(settings).await?),
        BackendKind::InMemory => Arc::new(InMemoryMemoryService::new()),
    })
}
