use reqwest::StatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("Invalid backend url: {url}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[snafu(display("HTTP client initialization failed"))]
    Init { source: reqwest::Error },
    #[snafu(display("HTTP request failed"))]
    Http { source: reqwest::Error },
    #[snafu(display("Backend responded with {status}: {detail}"))]
    Status { status: StatusCode, detail: String },
    #[snafu(display("Could not decode backend response"))]
    Decode { source: reqwest::Error },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Status code of a non-success backend response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend rejected our credentials (missing, expired or revoked token).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    /// The request itself was wrong (validation, conflict, not found...).
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    /// Message suitable to show to the user, if the backend gave one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }
}
