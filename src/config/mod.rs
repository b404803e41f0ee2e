//! Layered configuration (default literal < env file < process environment).

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, TychoError};

/// Which variant backs a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    /// Cloud-backed variant constructed from project/region settings.
    Managed,
    /// Zero-configuration local variant for development and tests.
    InMemory,
}

/// Resolved, immutable settings for one process lifetime.
///
/// Constructed once at process start; safe to share without synchronization.
/// String defaults that start with `your-` are placeholders and fail
/// [`Settings::validate`] when the field is required for the selected
/// backends.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct Settings {
    /// Cloud project identifier.
    #[builder(into, default = "your-gcp-project-id".to_owned())]
    pub project_id: String,
    /// Cloud region/location.
    #[builder(into, default = "us-central1".to_owned())]
    pub location: String,
    /// Company name; also qualifies the application identity.
    #[builder(into, default = "your-company".to_owned())]
    pub company_name: String,
    #[builder(into, default = "your-industry".to_owned())]
    pub industry: String,
    #[builder(into, default = "your-business-type".to_owned())]
    pub business_type: String,
    /// Default model identifier handed to the orchestrator agent.
    #[builder(into, default = "gemini-2.0-flash".to_owned())]
    pub default_model: String,
    /// Advisory iteration limit passed through to the agent, not enforced here.
    #[builder(default = 10)]
    pub max_iterations: u32,
    /// Advisory timeout passed through to the agent, not enforced here.
    #[builder(default = 120)]
    pub timeout_seconds: u64,
    /// Bucket backing the managed artifact service.
    #[builder(into, default = "your-artifact-bucket".to_owned())]
    pub storage_bucket: String,
    /// Database resource backing the managed session service.
    #[builder(into, default = "your-session-database".to_owned())]
    pub database_name: String,
    #[builder(default = BackendKind::InMemory)]
    pub session_backend: BackendKind,
    #[builder(default = BackendKind::InMemory)]
    pub artifact_backend: BackendKind,
    #[builder(default = BackendKind::InMemory)]
    pub memory_backend: BackendKind,
    /// Path to a service-account credential file, if any.
    pub credentials_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value.starts_with("your-")
}

impl Settings {
    /// Resolve settings from a `.env` file (if present) and the process
    /// environment. Environment wins over file, file wins over defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::resolve()
    }

    /// Resolve settings with an explicit environment file. Variables already
    /// present in the process environment are not overridden by the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::from_path(path.as_ref())
            .map_err(|e| TychoError::configuration(format!("cannot read env file: {e}")))?;
        Self::resolve()
    }

    fn resolve() -> Result<Self> {
        let mut settings = Self::default();

        let string_fields: [(&str, &mut String); 8] = [
            ("GOOGLE_CLOUD_PROJECT", &mut settings.project_id),
            ("GOOGLE_CLOUD_LOCATION", &mut settings.location),
            ("COMPANY_NAME", &mut settings.company_name),
            ("INDUSTRY", &mut settings.industry),
            ("BUSINESS_TYPE", &mut settings.business_type),
            ("DEFAULT_MODEL", &mut settings.default_model),
            ("STORAGE_BUCKET", &mut settings.storage_bucket),
            ("DATABASE_NAME", &mut settings.database_name),
        ];
        for (var, field) in string_fields {
            if let Ok(value) = std::env::var(var) {
                *field = value;
            }
        }

        if let Ok(value) = std::env::var("MAX_ITERATIONS") {
            settings.max_iterations = value.parse().map_err(|_| {
                TychoError::configuration(format!("MAX_ITERATIONS must be an integer, got {value:?}"))
            })?;
        }
        if let Ok(value) = std::env::var("TIMEOUT_SECONDS") {
            settings.timeout_seconds = value.parse().map_err(|_| {
                TychoError::configuration(format!("TIMEOUT_SECONDS must be an integer, got {value:?}"))
            })?;
        }

        settings.session_backend = parse_backend("SESSION_BACKEND", settings.session_backend)?;
        settings.artifact_backend = parse_backend("ARTIFACT_BACKEND", settings.artifact_backend)?;
        settings.memory_backend = parse_backend("MEMORY_BACKEND", settings.memory_backend)?;

        if let Ok(value) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            settings.credentials_path = Some(PathBuf::from(value));
        }

        Ok(settings)
    }

    /// Eagerly check that every field the selected backends rely on resolved
    /// to a non-placeholder value.
    ///
    /// Cloud fields are only required when at least one backend is managed,
    /// so an all-in-memory development deployment validates out of the box.
    pub fn validate(&self) -> Result<()> {
        let mut unresolved = Vec::new();

        if is_placeholder(&self.company_name) {
            unresolved.push("company_name");
        }
        if is_placeholder(&self.default_model) {
            unresolved.push("default_model");
        }

        let any_managed = [
            self.session_backend,
            self.artifact_backend,
            self.memory_backend,
        ]
        .contains(&BackendKind::Managed);
        if any_managed {
            if is_placeholder(&self.project_id) {
                unresolved.push("project_id");
            }
            if is_placeholder(&self.location) {
                unresolved.push("location");
            }
        }
        if self.session_backend == BackendKind::Managed && is_placeholder(&self.database_name) {
            unresolved.push("database_name");
        }
        if self.artifact_backend == BackendKind::Managed && is_placeholder(&self.storage_bucket) {
            unresolved.push("storage_bucket");
        }

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(TychoError::configuration(format!(
                "unresolved settings: {}",
                unresolved.join(", ")
            )))
        }
    }

    /// Company-qualified application identity used by the runner.
    pub fn app_name(&self) -> String {
        format!("{}-AI-System", self.company_name)
    }
}

fn parse_backend(var: &str, current: BackendKind) -> Result<BackendKind> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| {
            TychoError::configuration(format!(
                "{var} must be \"managed\" or \"in-memory\", got {value:?}"
            ))
        }),
        Err(_) => Ok(current),
    }
}
