//! HTTP client of the Epistula backend API.
//!
//! The backend is the authority on who the user is and what they may do:
//! every call carries the bearer token as is, and permission failures come
//! back as typed errors.

pub mod error;

use std::time::Duration;

use epistula_core::UserProfile;
use epistula_core::entity::{
    EntityId, Faculty, NewFaculty, NewSubject, NewUniversity, Person, Subject, University,
};
use error::{ApiResult, DecodeSnafu, HttpSnafu, InitSnafu, InvalidUrlSnafu, StatusSnafu};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snafu::ResultExt as _;
use tracing::{debug, trace};
use url::Url;

pub use crate::error::ApiError;

pub const LOG_TARGET: &str = "epistula::client";

const API_PREFIX: &str = "api/v1/";
const MAX_DETAIL_LEN: usize = 200;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Client of the backend, optionally acting on behalf of a user.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

#[bon::bon]
impl BackendClient {
    #[builder(finish_fn(name = "build"))]
    pub fn new(
        #[builder(into)] base_url: String,
        #[builder(default = Duration::from_secs(30))] timeout: Duration,
        #[builder(into)] token: Option<String>,
    ) -> ApiResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        // `Url::join` needs the trailing slash to keep the base path
        let base_url = Url::parse(&format!("{trimmed}/")).context(InvalidUrlSnafu {
            url: base_url.clone(),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("epistula/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context(InitSnafu)?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }
}

impl BackendClient {
    /// Backend base URL without the trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// A client sending `token` with every request.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Exchange credentials for an access token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        debug!(target: LOG_TARGET, %email, "Logging in");
        let resp: LoginResponse = self
            .send_json(
                self.request(Method::POST, "auth/login")?
                    .json(&LoginRequest { email, password }),
            )
            .await?;
        Ok(resp.access_token)
    }

    /// Profile of the user the token belongs to.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.send_json(self.request(Method::GET, "auth/me")?).await
    }

    pub async fn list_universities(&self) -> ApiResult<Vec<University>> {
        self.send_json(self.request(Method::GET, "universities/")?)
            .await
    }

    pub async fn get_university(&self, id: EntityId) -> ApiResult<University> {
        self.send_json(self.request(Method::GET, &format!("universities/{id}"))?)
            .await
    }

    pub async fn create_university(&self, new: &NewUniversity) -> ApiResult<University> {
        self.send_json(self.request(Method::POST, "universities/")?.json(new))
            .await
    }

    pub async fn delete_university(&self, id: EntityId) -> ApiResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("universities/{id}"))?)
            .await
    }

    pub async fn list_faculties(&self, university_id: EntityId) -> ApiResult<Vec<Faculty>> {
        self.send_json(self.request(
            Method::GET,
            &format!("universities/{university_id}/faculties/"),
        )?)
        .await
    }

    pub async fn create_faculty(
        &self,
        university_id: EntityId,
        new: &NewFaculty,
    ) -> ApiResult<Faculty> {
        self.send_json(
            self.request(
                Method::POST,
                &format!("universities/{university_id}/faculties/"),
            )?
            .json(new),
        )
        .await
    }

    pub async fn delete_faculty(
        &self,
        university_id: EntityId,
        faculty_id: EntityId,
    ) -> ApiResult<()> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("universities/{university_id}/faculties/{faculty_id}"),
        )?)
        .await
    }

    pub async fn list_subjects(
        &self,
        university_id: EntityId,
        faculty_id: EntityId,
    ) -> ApiResult<Vec<Subject>> {
        self.send_json(self.request(
            Method::GET,
            &format!("universities/{university_id}/faculties/{faculty_id}/subjects/"),
        )?)
        .await
    }

    pub async fn create_subject(
        &self,
        university_id: EntityId,
        faculty_id: EntityId,
        new: &NewSubject,
    ) -> ApiResult<Subject> {
        self.send_json(
            self.request(
                Method::POST,
                &format!("universities/{university_id}/faculties/{faculty_id}/subjects/"),
            )?
            .json(new),
        )
        .await
    }

    pub async fn delete_subject(
        &self,
        university_id: EntityId,
        faculty_id: EntityId,
        subject_id: EntityId,
    ) -> ApiResult<()> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("universities/{university_id}/faculties/{faculty_id}/subjects/{subject_id}"),
        )?)
        .await
    }

    pub async fn list_professors(&self, university_id: EntityId) -> ApiResult<Vec<Person>> {
        self.send_json(self.request(
            Method::GET,
            &format!("universities/{university_id}/professors/"),
        )?)
        .await
    }

    pub async fn list_students(&self, university_id: EntityId) -> ApiResult<Vec<Person>> {
        self.send_json(self.request(
            Method::GET,
            &format!("universities/{university_id}/students/"),
        )?)
        .await
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let path = format!("{API_PREFIX}{path}");
        let url = self
            .base_url
            .join(&path)
            .context(InvalidUrlSnafu { url: path })?;
        trace!(target: LOG_TARGET, %method, %url, "Backend request");

        let req = self.http.request(method, url);
        Ok(match self.token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    async fn send_json<T>(&self, req: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        Self::check_status(req.send().await.context(HttpSnafu)?)
            .await?
            .json()
            .await
            .context(DecodeSnafu)
    }

    async fn send_empty(&self, req: RequestBuilder) -> ApiResult<()> {
        Self::check_status(req.send().await.context(HttpSnafu)?).await?;
        Ok(())
    }

    async fn check_status(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        debug!(target: LOG_TARGET, %status, "Backend returned an error");
        StatusSnafu {
            status,
            detail: extract_detail(&body),
        }
        .fail()
    }
}

/// Pull a human readable message out of an error response body.
///
/// Understands `{"detail": "..."}`, validation-style
/// `{"detail": [{"msg": "..."}]}` and `{"message": "..."}`; falls back to
/// the (truncated) raw body.
pub fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
        if let Some(msg) = value.get("message").and_then(serde_json::Value::as_str) {
            return msg.to_owned();
        }
    }

    body.trim().chars().take(MAX_DETAIL_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_string() {
        assert_eq!(extract_detail(r#"{"detail":"Not allowed"}"#), "Not allowed");
    }

    #[test]
    fn detail_from_validation_list() {
        assert_eq!(
            extract_detail(r#"{"detail":[{"msg":"field required"},{"msg":"too short"}]}"#),
            "field required; too short"
        );
    }

    #[test]
    fn detail_from_plain_body() {
        assert_eq!(extract_detail("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(extract_detail(&"x".repeat(500)).len(), MAX_DETAIL_LEN);
    }

    #[test]
    fn base_url_is_normalized() {
        let client = BackendClient::builder()
            .base_url("http://localhost:8000/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.token(), None);
        assert_eq!(client.with_token("t").token(), Some("t"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            BackendClient::builder().base_url("not a url").build(),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
