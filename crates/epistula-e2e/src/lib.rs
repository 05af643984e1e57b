//! End-to-end harness of the Epistula web frontend.
//!
//! Runs against a live backend and a running UI: `setup` logs in as root and
//! seeds a fixture, `run` exercises the rendered pages, `teardown` removes
//! what setup created.

pub mod checks;
pub mod config;
pub mod state;

use epistula_client::{ApiError, BackendClient};
use epistula_core::entity::NewUniversity;
use epistula_core::session::MemoryStorage;
use epistula_core::{SessionStore, UserProfile};
use epistula_util_error::FmtCompact as _;
use snafu::{OptionExt as _, ResultExt as _, Snafu};
use tracing::{debug, info, warn};

use crate::checks::CheckReport;
use crate::config::E2eConfig;
use crate::state::{E2eState, Fixture, StateError, StateFile};

pub const LOG_TARGET: &str = "epistula::e2e";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum E2eError {
    #[snafu(display("Backend error: {source}"))]
    Backend { source: ApiError },
    #[snafu(transparent)]
    State { source: StateError },
    #[snafu(display("Root password is required (EPISTULA_ROOT_PASSWORD)"))]
    MissingPassword,
    #[snafu(display("No session in the state file, run setup first"))]
    NoSession,
    #[snafu(display("No fixture in the state file, run setup first"))]
    NoFixture,
    #[snafu(display("Fixture university {id} is not listed by the backend"))]
    FixtureMissing { id: i64 },
    #[snafu(display("{failed} of {total} checks failed"))]
    ChecksFailed { failed: usize, total: usize },
}

pub type E2eResult<T> = std::result::Result<T, E2eError>;

fn backend(config: &E2eConfig) -> E2eResult<BackendClient> {
    BackendClient::builder()
        .base_url(config.backend_url.clone())
        .build()
        .context(BackendSnafu)
}

/// Log in as root and keep the session the way the UI would.
async fn login(config: &E2eConfig, store: &mut SessionStore<MemoryStorage>) -> E2eResult<String> {
    let password = config.root_password.as_deref().context(MissingPasswordSnafu)?;
    let client = backend(config)?;

    let token = client
        .login(&config.root_email, password)
        .await
        .context(BackendSnafu)?;
    let user = match client.with_token(&token).me().await {
        Ok(user) => user,
        Err(err) => {
            debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Could not fetch profile");
            UserProfile {
                name: None,
                email: Some(config.root_email.clone()),
            }
        }
    };
    store.save(&token, Some(&user));
    info!(target: LOG_TARGET, email = %config.root_email, "Logged in");

    Ok(token)
}

/// Remove the fixture. One that is already gone counts as removed.
async fn delete_fixture(client: &BackendClient, fixture: &Fixture) -> E2eResult<()> {
    match client.delete_university(fixture.university_id).await {
        Ok(()) => {
            info!(target: LOG_TARGET, id = fixture.university_id, "Fixture removed");
            Ok(())
        }
        Err(err) if err.status().is_some_and(|s| s.as_u16() == 404) => {
            warn!(target: LOG_TARGET, id = fixture.university_id, "Fixture already gone");
            Ok(())
        }
        Err(source) => Err(E2eError::Backend { source }),
    }
}

/// Global setup: log in, seed a fresh fixture, persist both.
pub async fn setup(config: &E2eConfig, state_file: &StateFile) -> E2eResult<E2eState> {
    let previous = state_file.load().await?;
    let mut store = SessionStore::new(MemoryStorage::new());
    let token = login(config, &mut store).await?;
    let client = backend(config)?.with_token(&token);

    if let Some(stale) = previous.fixture.as_ref() {
        warn!(target: LOG_TARGET, id = stale.university_id, "Removing fixture of an earlier run");
        if let Err(err) = delete_fixture(&client, stale).await {
            warn!(target: LOG_TARGET, err = %err.fmt_compact(), "Could not remove stale fixture");
        }
    }

    let suffix: u32 = rand::random();
    let new = NewUniversity {
        name: format!("E2E Fixture {suffix:08x}"),
        code: format!("E2E{suffix:08X}"),
        description: Some("Created by the end-to-end harness. Safe to delete.".into()),
    };
    let created = client.create_university(&new).await.context(BackendSnafu)?;
    info!(target: LOG_TARGET, id = created.id, code = %created.code, "Fixture seeded");

    let state = E2eState {
        session: store.into_storage().unwrap_or_default(),
        fixture: Some(Fixture {
            university_id: created.id,
            name: created.name,
            code: created.code,
        }),
    };
    state_file.save(&state).await?;
    info!(target: LOG_TARGET, path = %state_file.path().display(), "State saved");

    Ok(state)
}

/// Global teardown: remove the fixture and forget the session.
pub async fn teardown(config: &E2eConfig, state_file: &StateFile) -> E2eResult<()> {
    let state = state_file.load().await?;
    let mut store = SessionStore::new(state.session);

    if let Some(fixture) = state.fixture.as_ref() {
        let token = match store.load() {
            Some(token) => token,
            None => login(config, &mut store).await?,
        };
        let client = backend(config)?.with_token(&token);

        match delete_fixture(&client, fixture).await {
            Err(E2eError::Backend { source }) if source.is_unauthorized() => {
                debug!(target: LOG_TARGET, "Stored session expired, logging in again");
                let token = login(config, &mut store).await?;
                delete_fixture(&client.with_token(token), fixture).await?;
            }
            res => res?,
        }
    }

    store.clear();
    state_file.remove().await?;
    Ok(())
}

/// Check the fixture through the backend, then (when enabled) through the
/// UI.
pub async fn run(config: &E2eConfig, state_file: &StateFile) -> E2eResult<Vec<CheckReport>> {
    let state = state_file.load().await?;
    let fixture = state.fixture.context(NoFixtureSnafu)?;
    let store = SessionStore::new(state.session);
    let token = store.load().context(NoSessionSnafu)?;

    let universities = backend(config)?
        .with_token(&token)
        .list_universities()
        .await
        .context(BackendSnafu)?;
    if !universities.iter().any(|u| u.id == fixture.university_id) {
        return FixtureMissingSnafu {
            id: fixture.university_id,
        }
        .fail();
    }

    if !config.ui_enabled {
        info!(target: LOG_TARGET, "UI checks disabled, set EPISTULA_E2E_UI to enable");
        return Ok(vec![]);
    }

    let reports = checks::run_checks(
        &config.base_url,
        &token,
        checks::default_checks(&fixture),
        config.workers,
    )
    .await;

    let failed = reports.iter().filter(|r| !r.passed()).count();
    for report in &reports {
        match &report.error {
            None => info!(target: LOG_TARGET, check = report.name, "Passed"),
            Some(err) => warn!(target: LOG_TARGET, check = report.name, %err, "Failed"),
        }
    }
    if 0 < failed {
        return ChecksFailedSnafu {
            failed,
            total: reports.len(),
        }
        .fail();
    }

    Ok(reports)
}
