//! Checks of the rendered UI, each one a fresh browser: its own cookie jar,
//! optionally holding the session token.

use std::sync::Arc;

use epistula_core::session::TOKEN_KEY;
use epistula_util_error::FmtCompact as _;
use futures::StreamExt as _;
use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::LOCATION;
use snafu::{ResultExt as _, Snafu, ensure};
use tracing::debug;

use crate::LOG_TARGET;
use crate::state::Fixture;

#[derive(Debug, Snafu)]
pub enum CheckError {
    #[snafu(display("Invalid base url {url}"))]
    BaseUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Request failed"))]
    Request { source: reqwest::Error },
    #[snafu(display("Expected {expected}, got status {status}"))]
    UnexpectedStatus { status: StatusCode, expected: String },
    #[snafu(display("Expected a redirect to {prefix}, got {location:?}"))]
    WrongRedirect {
        prefix: String,
        location: Option<String>,
    },
    #[snafu(display("Invalid selector {selector}: {msg}"))]
    BadSelector { selector: String, msg: String },
    #[snafu(display("Nothing matches {selector}"))]
    MissingElement { selector: String },
    #[snafu(display("No {selector} contains {text:?}"))]
    MissingText { selector: String, text: String },
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;

/// What a page must look like.
#[derive(Clone, Debug)]
pub enum Expectation {
    /// Any 2xx.
    Ok,
    /// 200, with an element matching `selector`, optionally containing
    /// `text`.
    Element {
        selector: String,
        text: Option<String>,
    },
    /// A 3xx to a location starting with the prefix.
    RedirectTo(String),
}

impl Expectation {
    pub fn element(selector: &str) -> Self {
        Self::Element {
            selector: selector.to_owned(),
            text: None,
        }
    }

    pub fn element_with_text(selector: &str, text: &str) -> Self {
        Self::Element {
            selector: selector.to_owned(),
            text: Some(text.to_owned()),
        }
    }

    /// Judge a response, given as its parts.
    pub fn evaluate(&self, status: StatusCode, location: Option<&str>, body: &str) -> CheckResult<()> {
        match self {
            Expectation::Ok => {
                ensure!(
                    status.is_success(),
                    UnexpectedStatusSnafu {
                        status,
                        expected: "success",
                    }
                );
            }
            Expectation::RedirectTo(prefix) => {
                ensure!(
                    status.is_redirection(),
                    UnexpectedStatusSnafu {
                        status,
                        expected: "redirect",
                    }
                );
                ensure!(
                    location.is_some_and(|l| l.starts_with(prefix.as_str())),
                    WrongRedirectSnafu {
                        prefix: prefix.as_str(),
                        location: location.map(ToOwned::to_owned),
                    }
                );
            }
            Expectation::Element { selector, text } => {
                ensure!(
                    status == StatusCode::OK,
                    UnexpectedStatusSnafu {
                        status,
                        expected: "200 OK",
                    }
                );
                let parsed = scraper::Selector::parse(selector).map_err(|err| {
                    CheckError::BadSelector {
                        selector: selector.clone(),
                        msg: err.to_string(),
                    }
                })?;
                let html = scraper::Html::parse_document(body);
                let mut matches = html.select(&parsed).peekable();
                ensure!(
                    matches.peek().is_some(),
                    MissingElementSnafu {
                        selector: selector.as_str(),
                    }
                );
                if let Some(text) = text {
                    ensure!(
                        matches.any(|el| el.text().collect::<String>().contains(text.as_str())),
                        MissingTextSnafu {
                            selector: selector.as_str(),
                            text: text.as_str(),
                        }
                    );
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct UiCheck {
    pub name: &'static str,
    pub path: String,
    /// Send the session token along.
    pub authenticated: bool,
    pub expect: Expectation,
}

impl UiCheck {
    async fn run(&self, base_url: &str, token: &str) -> CheckResult<()> {
        let base = reqwest::Url::parse(base_url).context(BaseUrlSnafu { url: base_url })?;
        let url = base.join(&self.path).context(BaseUrlSnafu { url: &self.path })?;

        let jar = Arc::new(Jar::default());
        if self.authenticated {
            jar.add_cookie_str(
                &format!("{TOKEN_KEY}={}; Path=/", urlencoding::encode(token)),
                &base,
            );
        }
        let client = reqwest::Client::builder()
            .cookie_provider(jar)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context(RequestSnafu)?;

        debug!(target: LOG_TARGET, check = self.name, %url, "Running check");
        let resp = client.get(url).send().await.context(RequestSnafu)?;
        let status = resp.status();
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|l| l.to_str().ok())
            .map(ToOwned::to_owned);
        let body = resp.text().await.context(RequestSnafu)?;

        self.expect.evaluate(status, location.as_deref(), &body)
    }
}

#[derive(Debug)]
pub struct CheckReport {
    pub name: &'static str,
    pub error: Option<String>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// The checks a seeded deployment has to pass.
pub fn default_checks(fixture: &Fixture) -> Vec<UiCheck> {
    let fixture_path = format!("/universities/{}", fixture.university_id);
    vec![
        UiCheck {
            name: "anonymous visitor is sent to login",
            path: "/universities".into(),
            authenticated: false,
            expect: Expectation::RedirectTo("/login".into()),
        },
        UiCheck {
            name: "login form renders",
            path: "/login".into(),
            authenticated: false,
            expect: Expectation::element("form[action='/login'] input[name=email]"),
        },
        UiCheck {
            name: "dashboard greets the user",
            path: "/dashboard".into(),
            authenticated: true,
            expect: Expectation::element_with_text("[data-testid=greeting]", "Welcome"),
        },
        UiCheck {
            name: "root badge is shown",
            path: "/dashboard".into(),
            authenticated: true,
            expect: Expectation::element("[data-testid=root-badge]"),
        },
        UiCheck {
            name: "universities are listed",
            path: "/universities".into(),
            authenticated: true,
            expect: Expectation::element("[data-testid=entity-card]"),
        },
        UiCheck {
            name: "fixture university page",
            path: fixture_path.clone(),
            authenticated: true,
            expect: Expectation::element_with_text("h1", &fixture.name),
        },
        UiCheck {
            name: "fixture has no faculties",
            path: fixture_path,
            authenticated: true,
            expect: Expectation::element("[data-testid=empty-state]"),
        },
        UiCheck {
            name: "service worker is served",
            path: "/sw.js".into(),
            authenticated: false,
            expect: Expectation::Ok,
        },
    ]
}

/// Run `checks` with at most `workers` of them in flight.
pub async fn run_checks(
    base_url: &str,
    token: &str,
    checks: Vec<UiCheck>,
    workers: usize,
) -> Vec<CheckReport> {
    futures::stream::iter(checks)
        .map(move |check| async move {
            let error = check
                .run(base_url, token)
                .await
                .err()
                .map(|err| err.fmt_compact().to_string());
            CheckReport {
                name: check.name,
                error,
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}
