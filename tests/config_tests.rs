//! Tests for the layered configuration system.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, OnceLock};

use pretty_assertions::assert_eq;
use tycho::config::{BackendKind, Settings};
use tycho::error::TychoError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 14] = [
    "GOOGLE_CLOUD_PROJECT",
    "GOOGLE_CLOUD_LOCATION",
    "COMPANY_NAME",
    "INDUSTRY",
    "BUSINESS_TYPE",
    "DEFAULT_MODEL",
    "MAX_ITERATIONS",
    "TIMEOUT_SECONDS",
    "STORAGE_BUCKET",
    "DATABASE_NAME",
    "SESSION_BACKEND",
    "ARTIFACT_BACKEND",
    "MEMORY_BACKEND",
    "GOOGLE_APPLICATION_CREDENTIALS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture_and_clear() -> Self {
        let saved = CONFIG_ENV_VARS
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in CONFIG_ENV_VARS {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn defaults_apply_without_environment() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();

    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.location, "us-central1");
    assert_eq!(settings.default_model, "gemini-2.0-flash");
    assert_eq!(settings.max_iterations, 10);
    assert_eq!(settings.timeout_seconds, 120);
    assert_eq!(settings.session_backend, BackendKind::InMemory);
}

#[test]
fn process_environment_overrides_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();
    std::env::set_var("COMPANY_NAME", "acme");
    std::env::set_var("GOOGLE_CLOUD_PROJECT", "acme-prod");
    std::env::set_var("MAX_ITERATIONS", "25");
    std::env::set_var("SESSION_BACKEND", "managed");

    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.company_name, "acme");
    assert_eq!(settings.project_id, "acme-prod");
    assert_eq!(settings.max_iterations, 25);
    assert_eq!(settings.session_backend, BackendKind::Managed);
}

#[test]
fn env_file_overrides_defaults_but_loses_to_process_env() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "COMPANY_NAME=filecorp").unwrap();
    writeln!(file, "GOOGLE_CLOUD_PROJECT=file-project").unwrap();
    std::env::set_var("GOOGLE_CLOUD_PROJECT", "env-project");

    let settings = Settings::from_env_file(file.path()).unwrap();
    assert_eq!(settings.company_name, "filecorp");
    assert_eq!(settings.project_id, "env-project");
}

#[test]
fn missing_env_file_is_a_configuration_error() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();

    let err = Settings::from_env_file("/nonexistent/tycho.env").unwrap_err();
    assert!(matches!(err, TychoError::Configuration(_)));
}

#[test]
fn unparsable_numeric_override_is_a_configuration_error() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();
    std::env::set_var("MAX_ITERATIONS", "ten");

    let err = Settings::from_env().unwrap_err();
    assert!(matches!(err, TychoError::Configuration(_)));
    assert!(err.to_string().contains("MAX_ITERATIONS"));
}

#[test]
fn unknown_backend_flag_is_a_configuration_error() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();
    std::env::set_var("MEMORY_BACKEND", "cloud");

    let err = Settings::from_env().unwrap_err();
    assert!(matches!(err, TychoError::Configuration(_)));
    assert!(err.to_string().contains("MEMORY_BACKEND"));
}

#[test]
fn credentials_path_resolves_from_environment() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture_and_clear();
    std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/key.json");

    let settings = Settings::from_env().unwrap();
    assert_eq!(
        settings.credentials_path.as_deref(),
        Some(std::path::Path::new("/tmp/key.json"))
    );
}
