//! State shared between setup, the check runs and teardown.
//!
//! Setup logs in once and seeds a fixture; both survive in a json file so
//! the separate processes of a test run reuse the same session and clean up
//! exactly what was created.

use std::io;
use std::path::{Path, PathBuf};

use epistula_core::entity::EntityId;
use epistula_core::session::MemoryStorage;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt as _, Snafu};
use tracing::debug;

use crate::LOG_TARGET;

#[derive(Debug, Snafu)]
pub enum StateError {
    #[snafu(display("Failed to read state file {}", path.display()))]
    Read { source: io::Error, path: PathBuf },
    #[snafu(display("Failed to write state file {}", path.display()))]
    Write { source: io::Error, path: PathBuf },
    #[snafu(display("State file {} is corrupted", path.display()))]
    Parse {
        source: serde_json::Error,
        path: PathBuf,
    },
}

pub type StateResult<T> = std::result::Result<T, StateError>;

/// Throwaway university created for the checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub university_id: EntityId,
    pub name: String,
    pub code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct E2eState {
    /// Browser storage of the logged-in root user, as the UI would keep it.
    #[serde(default)]
    pub session: MemoryStorage,
    #[serde(default)]
    pub fixture: Option<Fixture>,
}

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state; a missing file is an empty state.
    pub async fn load(&self) -> StateResult<E2eState> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target: LOG_TARGET, path = %self.path.display(), "No state file");
                return Ok(E2eState::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    source,
                    path: self.path.clone(),
                });
            }
        };
        serde_json::from_slice(&bytes).context(ParseSnafu { path: &self.path })
    }

    pub async fn save(&self, state: &E2eState) -> StateResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(WriteSnafu { path: &self.path })?;
        }
        let json = serde_json::to_vec_pretty(state).context(ParseSnafu { path: &self.path })?;

        // Readers never see a partially written file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .context(WriteSnafu { path: &tmp })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context(WriteSnafu { path: &self.path })?;
        Ok(())
    }

    /// Delete the file. Removing a missing file is fine.
    pub async fn remove(&self) -> StateResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Write {
                source,
                path: self.path.clone(),
            }),
        }
    }
}
