use axum::Form;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use epistula_core::{AuthContext, UserProfile};
use epistula_util_error::FmtCompact as _;
use maud::{Markup, html};
use serde::Deserialize;
use tracing::{debug, info};

use super::Maud;
use crate::auth::{CookieSession, CurrentAuth};
use crate::error::RequestResult;
use crate::serde_util::{empty_string_as_none, trim_string};
use crate::{LOG_TARGET, SharedState, UiState};

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
    #[serde(default)]
    expired: Option<String>,
}

#[derive(Deserialize)]
pub struct Input {
    #[serde(deserialize_with = "trim_string")]
    email: String,
    password: String,
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
}

/// Only same-site paths are followed after login.
fn redirect_target(redirect: Option<String>) -> String {
    redirect
        .filter(|p| is_local_path(p))
        .unwrap_or_else(|| "/dashboard".to_string())
}

/// Browsers read `\` as `/` and drop tabs and newlines, so any of them can
/// turn a path into a scheme-relative url.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}

pub async fn get_login(
    state: State<SharedState>,
    CurrentAuth(auth): CurrentAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    if auth.is_authenticated() && query.expired.is_none() {
        return Redirect::to(&redirect_target(query.redirect)).into_response();
    }

    let notice = query.expired.is_some().then(|| {
        html! {
            p ."m-loginForm__notice" data-testid="expired-notice" {
                "Your session has expired. Please log in again."
            }
        }
    });

    Maud(state.login_page(None, notice, query.redirect.as_deref())).into_response()
}

pub async fn post_login(
    state: State<SharedState>,
    CookieSession(mut store): CookieSession,
    Form(form): Form<Input>,
) -> RequestResult<Response> {
    let backend = state.backend(&AuthContext::anonymous());

    let token = match backend.login(&form.email, &form.password).await {
        Ok(token) => token,
        Err(err) if err.is_client_error() => {
            debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Login rejected");
            let notice = html! {
                p ."m-loginForm__error" role="alert" { "Invalid email or password" }
            };
            return Ok(Maud(state.login_page(
                Some(&form.email),
                Some(notice),
                form.redirect.as_deref(),
            ))
            .into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let user = match backend.with_token(&token).me().await {
        Ok(user) => user,
        Err(err) => {
            debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Could not fetch profile");
            UserProfile {
                name: None,
                email: Some(form.email.clone()),
            }
        }
    };

    store.save(&token, Some(&user));
    info!(target: LOG_TARGET, email = %form.email, "User logged in");

    Ok(Redirect::to(&redirect_target(form.redirect)).into_response())
}

pub async fn logout(CookieSession(mut store): CookieSession) -> impl IntoResponse {
    store.clear();
    Redirect::to("/login")
}

impl UiState {
    fn login_page(
        &self,
        email: Option<&str>,
        notice: Option<Markup>,
        redirect: Option<&str>,
    ) -> Markup {
        let content = html! {
            form ."m-loginForm" action="/login" method="post" {
                @if let Some(notice) = notice {
                    (notice)
                }
                label ."m-loginForm__label" for="email" { "Email" }
                input ."m-loginForm__input"
                    type="email"
                    id="email"
                    name="email"
                    required
                    autocomplete="username"
                    placeholder=(self.root_email())
                    value=[email];
                label ."m-loginForm__label" for="password" { "Password" }
                input ."m-loginForm__input"
                    type="password"
                    id="password"
                    name="password"
                    required
                    autocomplete="current-password";
                @if let Some(redirect) = redirect {
                    input type="hidden" name="redirect" value=(redirect);
                }
                button ."u-button m-loginForm__submit" type="submit" { "Log in" }
            }
        };
        self.render_html_page("Log in", &AuthContext::anonymous(), content)
    }
}
