//! Long-term-memory service: recorded exchanges, queried by relevance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;

use super::http::{auth_headers, probe_endpoint, require_field, shared_client};
use super::Capability;

/// One scored memory retrieval result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub text: String,
    pub score: f64,
}

/// Capability contract for long-term memory.
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// Record one exchange for later retrieval.
    async fn record(&self, user_id: &str, session_id: &str, text: &str) -> Result<()>;

    /// Retrieve memories relevant to a query, best first.
    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>>;
}

/// RAG corpus resource path for a company's knowledge base.
pub fn corpus_path(settings: &Settings) -> String {
    let slug = settings
        .company_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!(
        "projects/{}/locations/{}/ragCorpora/{}-knowledge",
        settings.project_id, settings.location, slug
    )
}

/// Local variant: recorded texts scored by naive word overlap.
#[derive(Debug, Default)]
pub struct InMemoryMemoryService {
    entries: Mutex<Vec<String>>,
}

impl InMemoryMemoryService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overlap_score(query: &str, entry: &str) -> f64 {
    let entry_lower = entry.to_lowercase();
    let words: Vec<_> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let matched = words.iter().filter(|w| entry_lower.contains(w.as_str())).count();
    matched as f64 / words.len() as f64
}

#[async_trait]
impl MemoryService for InMemoryMemoryService {
    async fn record(&self, _user_id: &str, _session_id: &str, text: &str) -> Result<()> {
        self.entries.lock().await.push(text.to_string());
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>> {
        let entries = self.entries.lock().await;
        let mut hits: Vec<MemoryHit> = entries
            .iter()
            .map(|entry| MemoryHit {
                text: entry.clone(),
                score: overlap_score(query, entry),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }
}

#[derive(Debug, Deserialize)]
struct RetrievedContext {
    text: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct RetrieveContextsResponse {
    #[serde(default)]
    contexts: Vec<RetrievedContext>,
}

/// Managed variant: Vertex RAG corpus under
/// `projects/<project>/locations/<location>/ragCorpora/<company>-knowledge`.
#[derive(Debug)]
pub struct ManagedMemoryService {
    base_url: String,
    corpus: String,
}

impl ManagedMemoryService {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let base = format!("https://{}-aiplatform.googleapis.com/v1", settings.location);
        Self::connect_with_base_url(settings, &base).await
    }

    /// Connect against an explicit API root (tests point this at a mock
    /// server).
    pub async fn connect_with_base_url(settings: &Settings, base_url: &str) -> Result<Self> {
        require_field(Capability::Memory, "project_id", &settings.project_id)?;
        require_field(Capability::Memory, "location", &settings.location)?;
        require_field(Capability::Memory, "company_name", &settings.company_name)?;

        let service = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            corpus: corpus_path(settings),
        };
        let probe = format!("{}/{}", service.base_url, service.corpus);
        probe_endpoint(Capability::Memory, &probe).await?;
        debug!(corpus = %service.corpus, "connected managed memory service");
        Ok(service)
    }

    /// Fully qualified corpus resource name.
    pub fn corpus(&self) -> &str {
        &self.corpus
    }
}

#[async_trait]
impl MemoryService for ManagedMemoryService {
    async fn record(&self, user_id: &str, session_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/{}:import", self.base_url, self.corpus);
        shared_client()
            .post(&url)
            .headers(auth_headers())
            .json(&serde_json::json!({
                "userId": user_id,
                "sessionId": session_id,
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>> {
        let url = format!("{}/{}:retrieveContexts", self.base_url, self.corpus);
        let response: RetrieveContextsResponse = shared_client()
            .post(&url)
            .headers(auth_headers())
            .json(&serde_json::json!({ "query": { "text": query } }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .contexts
            .into_iter()
            .map(|c| MemoryHit {
                text: c.text,
                score: c.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn corpus_path_slugs_the_company_name() {
        let settings = Settings::builder()
            .project_id("demo-project")
            .location("us-central1")
            .company_name("Acme Rockets")
            .build();
        assert_eq!(
            corpus_path(&settings),
            "projects/demo-project/locations/us-central1/ragCorpora/acme-rockets-knowledge"
        );
    }

    #[tokio::test]
    async fn in_memory_search_ranks_by_overlap() {
        let service = InMemoryMemoryService::new();
        service.record("u1", "s1", "shipping rates to mars").await.unwrap();
        service.record("u1", "s1", "lunch menu").await.unwrap();

        let hits = service.search("mars shipping").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "shipping rates to mars");
        assert!((hits[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn in_memory_search_with_no_match_is_empty() {
        let service = InMemoryMemoryService::new();
        service.record("u1", "s1", "quarterly report").await.unwrap();
        assert!(service.search("weather").await.unwrap().is_empty());
    }
}
