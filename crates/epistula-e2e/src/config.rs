use std::path::PathBuf;

use epistula_core::config;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_WORKERS: usize = 4;
const STATE_FILE_NAME: &str = "e2e-state.json";

/// Settings of one harness invocation.
#[derive(Clone, Debug)]
pub struct E2eConfig {
    /// Where the UI under test is served.
    pub base_url: String,
    pub backend_url: String,
    pub root_email: String,
    pub root_password: Option<String>,
    /// Concurrent UI checks.
    pub workers: usize,
    /// UI checks need a running UI; without them only the backend is checked.
    pub ui_enabled: bool,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            backend_url: config::DEFAULT_BACKEND_URL.to_owned(),
            root_email: config::DEFAULT_ROOT_EMAIL.to_owned(),
            root_password: None,
            workers: DEFAULT_WORKERS,
            ui_enabled: false,
        }
    }
}

/// State file location when none is configured.
pub fn default_state_file() -> PathBuf {
    directories::ProjectDirs::from("org", "Epistula", "epistula")
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_owned()
        })
        .unwrap_or_else(std::env::temp_dir)
        .join(STATE_FILE_NAME)
}
