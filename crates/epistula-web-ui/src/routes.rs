mod dashboard;
mod faculties;
mod login;
mod people;
mod subjects;
mod universities;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{self, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use maud::Markup;
use serde::Deserialize;

use super::SharedState;
use crate::auth::CurrentAuth;
use crate::layout::render_error_page;

#[derive(Clone, Debug)]
#[must_use]
pub struct Maud(pub Markup);

impl IntoResponse for Maud {
    fn into_response(self) -> Response {
        (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            self.0.0,
        )
            .into_response()
    }
}

/// `?page=N` of list pages. Anything unparsable is the first page.
#[derive(Deserialize, Default)]
pub struct PageQuery {
    #[serde(default)]
    page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

pub async fn cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    let value = if path.starts_with("/api/") {
        Some("no-store".to_owned())
    } else if path == "/sw.js" {
        // A stale worker would keep serving stale pages
        Some("no-cache".to_owned())
    } else if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
        const NON_CACHEABLE_CONTENT_TYPES: &[&str] = &["text/html"];
        const SHORT_CACHE_CONTENT_TYPES: &[&str] = &["text/css"];

        if NON_CACHEABLE_CONTENT_TYPES
            .iter()
            .any(|&ct| content_type.as_bytes().starts_with(ct.as_bytes()))
        {
            Some("no-cache".to_owned())
        } else if SHORT_CACHE_CONTENT_TYPES
            .iter()
            .any(|&ct| content_type.as_bytes().starts_with(ct.as_bytes()))
        {
            Some(format!("public, max-age={}", 10 * 60))
        } else {
            Some(format!("public, max-age={}", 60 * 60))
        }
    } else {
        None
    };

    if let Some(value) = value.and_then(|v| HeaderValue::from_str(&v).ok()) {
        response.headers_mut().insert(CACHE_CONTROL, value);
    }

    response
}

pub async fn not_found(_req: Request<Body>) -> impl IntoResponse {
    let status = StatusCode::NOT_FOUND;
    (status, Maud(render_error_page(status, "Page not found")))
}

pub fn route_handler(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login::get_login).post(login::post_login))
        .route("/logout", post(login::logout))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route(
            "/universities",
            get(universities::get_universities).post(universities::post_university),
        )
        .route(
            "/universities/{id}/delete",
            post(universities::delete_university),
        )
        .route("/universities/{id}", get(faculties::get_university))
        .route(
            "/universities/{id}/faculties",
            post(faculties::post_faculty),
        )
        .route(
            "/universities/{id}/faculties/{faculty_id}",
            get(subjects::get_faculty),
        )
        .route(
            "/universities/{id}/faculties/{faculty_id}/delete",
            post(faculties::delete_faculty),
        )
        .route(
            "/universities/{id}/faculties/{faculty_id}/subjects",
            post(subjects::post_subject),
        )
        .route(
            "/universities/{id}/faculties/{faculty_id}/subjects/{subject_id}/delete",
            post(subjects::delete_subject),
        )
        .route("/universities/{id}/professors", get(people::get_professors))
        .route("/universities/{id}/students", get(people::get_students))
        .fallback(not_found)
        .with_state(state)
}

async fn root(CurrentAuth(auth): CurrentAuth) -> Redirect {
    if auth.is_authenticated() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}
