//! Shared HTTP plumbing for managed backend variants.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{Result, TychoError};

use super::Capability;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub(crate) fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Default headers for cloud API calls. Adds a bearer token when
/// `GOOGLE_CLOUD_ACCESS_TOKEN` is present in the environment.
pub(crate) fn auth_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(token) = std::env::var("GOOGLE_CLOUD_ACCESS_TOKEN") {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Probe a managed endpoint once at construction time.
///
/// Unreachable or unauthenticated backends fail with
/// [`TychoError::BackendInit`]; the probe is never retried here.
pub(crate) async fn probe_endpoint(capability: Capability, url: &str) -> Result<()> {
    let response = shared_client()
        .get(url)
        .headers(auth_headers())
        .send()
        .await
        .map_err(|e| TychoError::backend_init(capability, format!("endpoint unreachable: {e}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => {
            TychoError::backend_init(capability, format!("authentication failed ({status}): {body}"))
        }
        _ => TychoError::backend_init(capability, format!("probe failed ({status}): {body}")),
    })
}

/// Reject empty managed-variant settings before any network is touched.
pub(crate) fn require_field(capability: Capability, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(TychoError::backend_init(
            capability,
            format!("{field} is not set"),
        ))
    } else {
        Ok(())
    }
}
