use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use epistula_client::ApiError;
use epistula_core::session::{TOKEN_KEY, USER_KEY};
use epistula_util_error::{FmtCompact as _, find_in_chain};
use snafu::Snafu;
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::layout::render_error_page;
use crate::routes::Maud;

/// Error by the user
#[derive(Debug, Snafu)]
pub enum UserRequestError {
    #[snafu(visibility(pub(crate)))]
    #[snafu(display("Not found"))]
    SomethingNotFound,
    #[snafu(visibility(pub(crate)))]
    #[snafu(display("Only the root account can do that"))]
    RootRequired,
    #[snafu(visibility(pub(crate)))]
    #[snafu(display("{message}"))]
    BadRequest { message: String },
}

impl IntoResponse for &UserRequestError {
    fn into_response(self) -> Response {
        let status_code = match self {
            UserRequestError::SomethingNotFound => StatusCode::NOT_FOUND,
            UserRequestError::RootRequired => StatusCode::FORBIDDEN,
            UserRequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        };
        (status_code, Maud(render_error_page(status_code, &self.to_string()))).into_response()
    }
}

#[derive(Debug, Snafu)]
pub enum RequestError {
    #[snafu(visibility(pub(crate)))]
    LoginRequired { redirect: Option<String> },
    #[snafu(transparent)]
    Backend { source: ApiError },
    User { source: UserRequestError },
}
pub type RequestResult<T> = std::result::Result<T, RequestError>;

impl From<UserRequestError> for RequestError {
    fn from(source: UserRequestError) -> Self {
        RequestError::User { source }
    }
}

pub(crate) fn login_url(redirect: Option<&str>) -> String {
    match redirect {
        Some(path) => format!("/login?redirect={}", urlencoding::encode(path)),
        None => "/login".to_string(),
    }
}

/// Expire both session cookies, for responses built without a cookie jar.
fn clear_session_cookies(resp: &mut Response) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Ok(value) = HeaderValue::from_str(&format!("{key}=; Path=/; Max-Age=0")) {
            resp.headers_mut().append(SET_COOKIE, value);
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        debug!(
            target: LOG_TARGET,
            err = %self.fmt_compact(),
            "Request Error"
        );

        if let Some(user_err) = find_in_chain::<UserRequestError>(&self) {
            return user_err.into_response();
        }

        match self {
            RequestError::LoginRequired { redirect } => {
                Redirect::to(&login_url(redirect.as_deref())).into_response()
            }
            RequestError::Backend { source } if source.is_unauthorized() => {
                // Token rejected by the backend: the stored session is stale
                let mut resp = Redirect::to("/login?expired=true").into_response();
                clear_session_cookies(&mut resp);
                resp
            }
            RequestError::Backend { source } if source.is_client_error() => {
                let status = source.status().unwrap_or(StatusCode::BAD_REQUEST);
                let message = source
                    .detail()
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| status.to_string());
                (status, Maud(render_error_page(status, &message))).into_response()
            }
            err => {
                warn!(
                    target: LOG_TARGET,
                    err = %err.fmt_compact(),
                    "Unexpected Request Error"
                );
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (
                    status,
                    Maud(render_error_page(status, "Internal Service Error")),
                )
                    .into_response()
            }
        }
    }
}
