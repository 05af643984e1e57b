use axum::extract::State;
use axum::response::IntoResponse;
use maud::html;

use super::Maud;
use crate::SharedState;
use crate::auth::{CookieSession, RequireAuth};
use crate::components::empty_state;
use crate::error::RequestResult;

pub async fn get_dashboard(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    CookieSession(store): CookieSession,
) -> RequestResult<impl IntoResponse> {
    let user = store.user().unwrap_or_default();

    let content = html! {
        section ."m-dashboard" {
            p ."m-dashboard__greeting" data-testid="greeting" {
                "Welcome, " (user.display_name().unwrap_or("there"))
            }
            @if auth.is_root() {
                p ."m-dashboard__role" {
                    span ."o-navBar__badge" { "root" }
                    " You can create and remove universities."
                }
            }
            (empty_state()
                .title("Where to next?")
                .icon("🎓")
                .description("Browse universities to see their faculties, subjects and people.")
                .action(("Universities", "/universities"))
                .call())
        }
    };

    Ok(Maud(state.render_html_page("Dashboard", &auth, content)))
}
