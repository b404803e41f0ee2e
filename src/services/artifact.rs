//! Artifact-storage service: versioned blobs keyed by user, session, name.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;

use super::http::{auth_headers, probe_endpoint, require_field, shared_client};
use super::Capability;

/// Capability contract for artifact storage.
#[async_trait]
pub trait ArtifactService: Send + Sync {
    /// Store one artifact version, returning the version written.
    async fn save(&self, user_id: &str, session_id: &str, name: &str, data: Vec<u8>)
        -> Result<u64>;

    /// Load the latest version of an artifact, or `None` if absent.
    async fn load(&self, user_id: &str, session_id: &str, name: &str) -> Result<Option<Vec<u8>>>;
}

/// Local variant: version lists held in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryArtifactService {
    artifacts: Mutex<HashMap<(String, String, String), Vec<Vec<u8>>>>,
}

impl InMemoryArtifactService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(user_id: &str, session_id: &str, name: &str) -> (String, String, String) {
    (user_id.to_string(), session_id.to_string(), name.to_string())
}

#[async_trait]
impl ArtifactService for InMemoryArtifactService {
    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<u64> {
        let mut artifacts = self.artifacts.lock().await;
        let versions = artifacts.entry(key(user_id, session_id, name)).or_default();
        versions.push(data);
        Ok(versions.len() as u64 - 1)
    }

    async fn load(&self, user_id: &str, session_id: &str, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .artifacts
            .lock()
            .await
            .get(&key(user_id, session_id, name))
            .and_then(|versions| versions.last().cloned()))
    }
}

#[derive(Debug, Deserialize)]
struct UploadedObject {
    #[serde(default)]
    generation: String,
}

/// Managed variant: Cloud Storage JSON API against `storage_bucket`.
pub struct ManagedArtifactService {
    base_url: String,
    bucket: String,
}

impl ManagedArtifactService {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        Self::connect_with_base_url(settings, "https://storage.googleapis.com").await
    }

    /// Connect against an explicit API root (tests point this at a mock
    /// server).
    pub async fn connect_with_base_url(settings: &Settings, base_url: &str) -> Result<Self> {
        require_field(Capability::Artifact, "storage_bucket", &settings.storage_bucket)?;

        let service = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: settings.storage_bucket.clone(),
        };
        let probe = format!("{}/storage/v1/b/{}", service.base_url, service.bucket);
        probe_endpoint(Capability::Artifact, &probe).await?;
        debug!(bucket = %service.bucket, "connected managed artifact service");
        Ok(service)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    // Object names contain slashes, which must ride in the URL encoded.
    fn object_name(user_id: &str, session_id: &str, name: &str) -> String {
        format!("{user_id}%2F{session_id}%2F{name}")
    }
}

#[async_trait]
impl ArtifactService for ManagedArtifactService {
    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<u64> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.base_url,
            self.bucket,
            Self::object_name(user_id, session_id, name)
        );
        let object: UploadedObject = shared_client()
            .post(&url)
            .headers(auth_headers())
            .body(data)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(object.generation.parse().unwrap_or(0))
    }

    async fn load(&self, user_id: &str, session_id: &str, name: &str) -> Result<Option<Vec<u8>>> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            Self::object_name(user_id, session_id, name)
        );
        let response = shared_client()
            .get(&url)
            .headers(auth_headers())
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response.error_for_status()?.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_save_returns_increasing_versions() {
        let service = InMemoryArtifactService::new();
        let v0 = service.save("u1", "s1", "report", b"one".to_vec()).await.unwrap();
        let v1 = service.save("u1", "s1", "report", b"two".to_vec()).await.unwrap();
        assert_eq!((v0, v1), (0, 1));

        let latest = service.load("u1", "s1", "report").await.unwrap();
        assert_eq!(latest, Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn in_memory_load_missing_is_none() {
        let service = InMemoryArtifactService::new();
        assert_eq!(service.load("u1", "s1", "absent").await.unwrap(), None);
    }
}
