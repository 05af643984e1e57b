//! Per-request view of the browser session.
//!
//! The session lives in the browser (cookies). Every request re-reads it
//! once, through these extractors, and hands the result to the handler as a
//! plain value.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use epistula_core::{AuthContext, SessionStore};
use tower_cookies::Cookies;
use tracing::debug;

use crate::LOG_TARGET;
use crate::cookies::CookieStorage;
use crate::error::{LoginRequiredSnafu, RequestError};

/// Session store backed by the request's cookie jar.
///
/// Without the cookie layer there is no storage, and the store is always
/// empty.
pub(crate) struct CookieSession(pub SessionStore<CookieStorage>);

impl<S> FromRequestParts<S> for CookieSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(match Cookies::from_request_parts(parts, state).await {
            Ok(cookies) => SessionStore::new(CookieStorage::new(cookies)),
            Err((_, msg)) => {
                debug!(target: LOG_TARGET, %msg, "No cookie jar, session storage unavailable");
                SessionStore::unavailable()
            }
        }))
    }
}

/// Auth context of the current visitor, possibly anonymous.
pub(crate) struct CurrentAuth(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CookieSession(store) = CookieSession::from_request_parts(parts, state).await?;
        Ok(Self(AuthContext::load(&store)))
    }
}

/// Auth context of a logged-in visitor; anyone else is sent to the login
/// page, with a way back to where they wanted to go.
pub(crate) struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(CurrentAuth(auth)) = CurrentAuth::from_request_parts(parts, state).await;

        if !auth.is_authenticated() {
            let redirect = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_owned());
            return LoginRequiredSnafu { redirect }.fail();
        }

        Ok(Self(auth))
    }
}
