use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use epistula_core::AuthContext;

use crate::UiState;

const REGISTER_SERVICE_WORKER: &str = r#"
if ('serviceWorker' in navigator) {
    window.addEventListener('load', function () {
        navigator.serviceWorker.register('/sw.js').catch(function (err) {
            console.warn('Service worker registration failed', err);
        });
    });
}
"#;

/// Html page header
pub(crate) fn render_html_head(page_title: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en";
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            meta name="color-scheme" content="light dark";
            link rel="stylesheet" type="text/css" href="/assets/style.css";
            link rel="icon" type="image/svg+xml" href="/assets/favicon.svg";
            title { (page_title) " · Epistula" }
            script { (PreEscaped(REGISTER_SERVICE_WORKER)) }
        }
    }
}

impl UiState {
    pub(crate) fn render_html_page(
        &self,
        title: &str,
        auth: &AuthContext,
        content: Markup,
    ) -> Markup {
        html! {
            (render_html_head(title))
            body ."o-body" {
                (render_navbar(auth))
                main ."o-main" {
                    h1 ."o-main__title" { (title) }
                    (content)
                }
                (render_html_footer())
            }
        }
    }
}

/// Top navigation. Root-only entries are only hidden here; the backend
/// enforces the actual permissions.
pub(crate) fn render_navbar(auth: &AuthContext) -> Markup {
    html! {
        nav ."o-navBar" {
            a ."o-navBar__brand" href="/" { "Epistula" }
            @if auth.is_authenticated() {
                a ."o-navBar__item" href="/dashboard" { "Dashboard" }
                a ."o-navBar__item" href="/universities" { "Universities" }
                @if auth.is_root() {
                    span ."o-navBar__badge" data-testid="root-badge" { "root" }
                }
                form ."o-navBar__logout" action="/logout" method="post" {
                    button ."u-button" type="submit" { "Log out" }
                }
            } @else {
                a ."o-navBar__item" href="/login" { "Log in" }
            }
        }
    }
}

/// A static footer.
pub(crate) fn render_html_footer() -> Markup {
    html! {
        footer ."o-footer" {
            "Epistula"
        }
    }
}

/// Stand-alone page for error responses, which have no access to the state.
pub(crate) fn render_error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    html! {
        (render_html_head(title))
        body ."o-body" {
            main ."o-main" {
                div ."m-errorPage" data-testid="error-page" {
                    h1 ."m-errorPage__status" { (status.as_u16()) " " (title) }
                    p ."m-errorPage__message" { (message) }
                    a ."u-button" href="/" { "Back to start" }
                }
            }
        }
    }
}

/// Truncate a string at a word boundary, appending "..." if truncated.
///
/// `max_len` counts chars, the ellipsis included.
pub fn truncate_at_word_boundary(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    if let Some(last_space) = truncated.rfind(' ') {
        format!("{}...", &truncated[..last_space])
    } else {
        format!("{truncated}...")
    }
}
