#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use data_encoding::BASE64URL_NOPAD;
use epistula_web_ui::{Opts, UiServer};
use reqwest::cookie::Jar;
use serde_json::{Value, json};

pub const ROOT_EMAIL: &str = "root@uni.edu";
pub const STUDENT_EMAIL: &str = "student@uni.edu";
pub const PASSWORD: &str = "secret";
pub const UNIVERSITY_COUNT: i64 = 15;

/// An unsigned token with the given claims, shaped like a JWT.
pub fn make_token(claims: Value) -> String {
    let header = BASE64URL_NOPAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = BASE64URL_NOPAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

pub fn root_token() -> String {
    make_token(json!({"sub": 1, "role": "root"}))
}

pub fn student_token() -> String {
    make_token(json!({"sub": "7", "role": "student"}))
}

/// Well-formed, but the backend no longer accepts it.
pub fn expired_token() -> String {
    make_token(json!({"sub": 7, "exp": 1}))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Caller {
    Root,
    Student,
}

fn caller(headers: &HeaderMap) -> Result<Caller, (StatusCode, Json<Value>)> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(t) if t == root_token() => Ok(Caller::Root),
        Some(t) if t == student_token() => Ok(Caller::Student),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )),
    }
}

fn require_root(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match caller(headers)? {
        Caller::Root => Ok(()),
        Caller::Student => Err((
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "Only root can manage universities"})),
        )),
    }
}

fn university(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("University {id}"),
        "code": format!("U{id:02}"),
        "description": (id == 1).then_some("The **oldest** one. <script>alert(1)</script>"),
        "logo_url": (id == 2).then_some("/storage/logo2.png"),
    })
}

/// Serves the slice of the backend API the UI talks to.
pub async fn start_mock_backend() -> String {
    let app = Router::new()
        .route(
            "/api/v1/auth/login",
            post(|Json(body): Json<Value>| async move {
                let token = match (body["email"].as_str(), body["password"].as_str()) {
                    (Some(ROOT_EMAIL), Some(PASSWORD)) => root_token(),
                    (Some(STUDENT_EMAIL), Some(PASSWORD)) => student_token(),
                    _ => {
                        return Err((
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Incorrect email or password"})),
                        ));
                    }
                };
                Ok(Json(json!({"access_token": token, "token_type": "bearer"})))
            }),
        )
        .route(
            "/api/v1/auth/me",
            get(|headers: HeaderMap| async move {
                Ok::<_, (StatusCode, Json<Value>)>(Json(match caller(&headers)? {
                    Caller::Root => json!({"id": 1, "name": "Root Admin", "email": ROOT_EMAIL}),
                    Caller::Student => json!({"id": 7, "name": "", "email": STUDENT_EMAIL}),
                }))
            }),
        )
        .route(
            "/api/v1/universities/",
            get(|headers: HeaderMap| async move {
                caller(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(Json(Value::Array(
                    (1..=UNIVERSITY_COUNT).map(university).collect(),
                )))
            })
            .post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                require_root(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>((
                    StatusCode::CREATED,
                    Json(json!({"id": 100, "name": body["name"], "code": body["code"]})),
                ))
            }),
        )
        .route(
            "/api/v1/universities/{id}",
            get(|headers: HeaderMap, Path(id): Path<i64>| async move {
                caller(&headers)?;
                if (1..=UNIVERSITY_COUNT).contains(&id) {
                    Ok::<_, (StatusCode, Json<Value>)>(Json(university(id)))
                } else {
                    Err((StatusCode::NOT_FOUND, Json(json!({"detail": "University not found"}))))
                }
            })
            .delete(|headers: HeaderMap| async move {
                require_root(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(StatusCode::NO_CONTENT)
            }),
        )
        .route(
            "/api/v1/universities/{id}/faculties/",
            get(|headers: HeaderMap, Path(id): Path<i64>| async move {
                caller(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(Json(json!([
                    {"id": 10, "university_id": id, "name": "Faculty of Science", "code": "SCI"},
                    {"id": 11, "university_id": id, "name": "Faculty of Arts", "code": "ART",
                     "logo_url": "/storage/missing.png"},
                ])))
            }),
        )
        .route(
            "/api/v1/universities/{id}/faculties/{faculty_id}",
            delete(|headers: HeaderMap| async move {
                require_root(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(StatusCode::NO_CONTENT)
            }),
        )
        .route(
            "/api/v1/universities/{id}/faculties/{faculty_id}/subjects/",
            get(
                |headers: HeaderMap, Path((_id, faculty_id)): Path<(i64, i64)>| async move {
                    caller(&headers)?;
                    Ok::<_, (StatusCode, Json<Value>)>(Json(json!([
                        {"id": 100, "faculty_id": faculty_id, "name": "Algebra", "code": "ALG"},
                    ])))
                },
            ),
        )
        .route(
            "/api/v1/universities/{id}/professors/",
            get(|headers: HeaderMap| async move {
                caller(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(Json(json!([
                    {"id": 3, "name": "Ada Lovelace", "email": "ada@uni.edu", "is_active": true},
                ])))
            }),
        )
        .route(
            "/api/v1/universities/{id}/students/",
            get(|headers: HeaderMap| async move {
                caller(&headers)?;
                Ok::<_, (StatusCode, Json<Value>)>(Json(json!([])))
            }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND.into_response() });

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has an address");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("Mock backend failed") });

    format!("http://{addr}")
}

/// A test web UI server on a random port, talking to a mock backend.
pub struct TestServer {
    server: UiServer,
    base_url: String,
    backend_url: String,
}

impl TestServer {
    pub async fn start() -> Self {
        let backend_url = start_mock_backend().await;

        let opts = Opts::new(
            "127.0.0.1:0".to_string(),
            None,  // cors_origin
            None,  // assets_dir (uses default)
            false, // reuseport
            backend_url.clone(),
            ROOT_EMAIL.to_string(),
        );

        let server = epistula_web_ui::start_ui(opts)
            .await
            .expect("Failed to start test server");

        let base_url = format!("http://{}", server.local_addr());

        Self {
            server,
            base_url,
            backend_url,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Create a new `UiDriver` with its own cookie jar (independent session).
    pub fn driver(&self) -> UiDriver {
        UiDriver::new(self.base_url.clone())
    }

    /// Shut down the server cleanly.
    pub async fn shutdown(self) {
        self.server
            .shutdown()
            .await
            .expect("Server shutdown failed");
    }
}

/// HTTP client driver for interacting with the web UI in tests.
///
/// Each `UiDriver` maintains its own cookie jar, so it represents
/// an independent browser.
pub struct UiDriver {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl UiDriver {
    fn new(base_url: String) -> Self {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            // Don't auto-follow redirects, tests assert on redirect targets
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            jar,
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Put a token into the browser storage, bypassing the login form.
    pub fn set_token(&self, token: &str) {
        let url = self.base_url.parse().expect("Valid base url");
        self.jar
            .add_cookie_str(&format!("token={token}; Path=/"), &url);
    }

    /// Submit the login form.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Log in and check that the UI accepted the credentials.
    pub async fn login_ok(&self, email: &str) {
        let resp = self.login(email, PASSWORD).await;
        assert_eq!(
            resp.status(),
            reqwest::StatusCode::SEE_OTHER,
            "Expected redirect after login, got {}",
            resp.status()
        );
        assert_eq!(location(&resp), "/dashboard");
    }

    /// Send a GET request to the given path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Send a form POST to the given path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .expect("Missing Location header")
        .to_str()
        .expect("Invalid Location header")
        .to_owned()
}

pub fn select_count(body: &str, selector: &str) -> usize {
    let html = scraper::Html::parse_document(body);
    let selector = scraper::Selector::parse(selector).expect("Valid selector");
    html.select(&selector).count()
}

pub fn select_attr(body: &str, selector: &str, attr: &str) -> Vec<String> {
    let html = scraper::Html::parse_document(body);
    let selector = scraper::Selector::parse(selector).expect("Valid selector");
    html.select(&selector)
        .filter_map(|el| el.value().attr(attr).map(ToOwned::to_owned))
        .collect()
}
