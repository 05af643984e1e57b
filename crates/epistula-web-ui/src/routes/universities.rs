use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use epistula_core::AuthContext;
use epistula_core::entity::{EntityId, NewUniversity, University};
use epistula_core::pagination::paginate;
use maud::{Markup, html};
use serde::Deserialize;
use snafu::ensure;
use tracing::info;

use super::{Maud, PageQuery};
use crate::auth::RequireAuth;
use crate::components::{empty_state, entity_card, pagination};
use crate::error::{BadRequestSnafu, RequestResult, RootRequiredSnafu, UserRequestError};
use crate::serde_util::{empty_string_as_none, trim_string};
use crate::{LOG_TARGET, PAGE_SIZE, SharedState, UiState};

/// Form of a new university, faculty or subject: they share the fields.
#[derive(Deserialize)]
pub struct EntityInput {
    #[serde(deserialize_with = "trim_string")]
    pub name: String,
    #[serde(deserialize_with = "trim_string")]
    pub code: String,
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
}

impl EntityInput {
    pub fn validate(&self) -> Result<(), UserRequestError> {
        ensure!(
            !self.name.is_empty() && !self.code.is_empty(),
            BadRequestSnafu {
                message: "Name and code are required",
            }
        );
        Ok(())
    }
}

pub(crate) fn ensure_root(auth: &AuthContext) -> Result<(), UserRequestError> {
    ensure!(auth.is_root(), RootRequiredSnafu);
    Ok(())
}

pub async fn get_universities(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<PageQuery>,
) -> RequestResult<impl IntoResponse> {
    let universities = state.backend(&auth).list_universities().await?;
    let (page, pages) = paginate(&universities, query.page(), PAGE_SIZE);

    let content = html! {
        @if auth.is_root() {
            (render_create_form("/universities", "Create university"))
        }
        @if page.is_empty() {
            (empty_state()
                .title("No universities yet")
                .icon("🏛")
                .maybe_description(auth.is_root().then_some("Create the first one above."))
                .call())
        } @else {
            div ."o-cardGrid" {
                @for university in page {
                    (state.render_university_card(&auth, university))
                }
            }
        }
        (pagination(pages, |n| format!("/universities?page={n}")))
    };

    Ok(Maud(state.render_html_page("Universities", &auth, content)))
}

pub async fn post_university(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<EntityInput>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;
    form.validate()?;

    let created = state
        .backend(&auth)
        .create_university(&NewUniversity {
            name: form.name,
            code: form.code,
            description: form.description,
        })
        .await?;
    info!(target: LOG_TARGET, id = created.id, code = %created.code, "University created");

    Ok(Redirect::to("/universities"))
}

pub async fn delete_university(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<EntityId>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;

    state.backend(&auth).delete_university(id).await?;
    info!(target: LOG_TARGET, %id, "University deleted");

    Ok(Redirect::to("/universities"))
}

pub(crate) fn render_delete_form(action: &str) -> Markup {
    html! {
        form ."o-cardGrid__delete" action=(action) method="post" {
            button ."u-button u-button--danger" type="submit" { "Delete" }
        }
    }
}

/// Create form shared by all entity kinds.
pub(crate) fn render_create_form(action: &str, title: &str) -> Markup {
    html! {
        details ."m-createForm" {
            summary ."m-createForm__summary" { (title) }
            form ."m-createForm__form" action=(action) method="post" {
                label for="name" { "Name" }
                input #name type="text" name="name" required;
                label for="code" { "Code" }
                input #code type="text" name="code" required;
                label for="description" { "Description (markdown)" }
                textarea #description name="description" rows="4" {}
                button ."u-button" type="submit" { "Create" }
            }
        }
    }
}

impl UiState {
    fn render_university_card(&self, auth: &AuthContext, university: &University) -> Markup {
        let href = format!("/universities/{}", university.id);
        html! {
            div ."o-cardGrid__item" {
                (entity_card()
                    .title(&university.name)
                    .backend_url(self.backend_url())
                    .subtitle(&university.code)
                    .maybe_description(university.description.as_deref())
                    .href(&href)
                    .maybe_logo_url(university.logo_url.as_deref())
                    .call())
                @if auth.is_root() {
                    (render_delete_form(&format!("{href}/delete")))
                }
            }
        }
    }
}
