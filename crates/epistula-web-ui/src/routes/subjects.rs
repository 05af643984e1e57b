use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use epistula_core::entity::{EntityId, NewSubject};
use epistula_core::pagination::paginate;
use maud::html;
use snafu::OptionExt as _;
use tracing::info;

use super::universities::{EntityInput, ensure_root, render_create_form, render_delete_form};
use super::{Maud, PageQuery};
use crate::auth::RequireAuth;
use crate::components::{empty_state, entity_card, pagination};
use crate::error::{RequestResult, SomethingNotFoundSnafu};
use crate::markdown::render_markdown;
use crate::{LOG_TARGET, PAGE_SIZE, SharedState};

pub async fn get_faculty(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path((id, faculty_id)): Path<(EntityId, EntityId)>,
    Query(query): Query<PageQuery>,
) -> RequestResult<impl IntoResponse> {
    let backend = state.backend(&auth);
    // The backend has no single-faculty lookup
    let faculty = backend
        .list_faculties(id)
        .await?
        .into_iter()
        .find(|f| f.id == faculty_id)
        .context(SomethingNotFoundSnafu)?;
    let subjects = backend.list_subjects(id, faculty_id).await?;
    let (page, pages) = paginate(&subjects, query.page(), PAGE_SIZE);

    let content = html! {
        section ."m-entityHeader" {
            p ."m-entityHeader__code" { (faculty.code) }
            @if let Some(description) = faculty.description.as_deref() {
                div ."m-entityHeader__description" { (render_markdown(description)) }
            }
            nav ."m-entityHeader__links" {
                a href={ "/universities/" (id) } { "Back to university" }
            }
        }
        h2 { "Subjects" }
        @if auth.is_root() {
            (render_create_form(
                &format!("/universities/{id}/faculties/{faculty_id}/subjects"),
                "Create subject",
            ))
        }
        @if page.is_empty() {
            (empty_state()
                .title("No subjects yet")
                .icon("📚")
                .call())
        } @else {
            div ."o-cardGrid" {
                @for subject in page {
                    div ."o-cardGrid__item" {
                        (entity_card()
                            .title(&subject.name)
                            .backend_url(state.backend_url())
                            .subtitle(&subject.code)
                            .maybe_description(subject.description.as_deref())
                            .fallback_icon("📚")
                            .call())
                        @if auth.is_root() {
                            (render_delete_form(&format!(
                                "/universities/{id}/faculties/{faculty_id}/subjects/{}/delete",
                                subject.id
                            )))
                        }
                    }
                }
            }
        }
        (pagination(pages, |n| format!("/universities/{id}/faculties/{faculty_id}?page={n}")))
    };

    Ok(Maud(state.render_html_page(&faculty.name, &auth, content)))
}

pub async fn post_subject(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path((id, faculty_id)): Path<(EntityId, EntityId)>,
    Form(form): Form<EntityInput>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;
    form.validate()?;

    let created = state
        .backend(&auth)
        .create_subject(
            id,
            faculty_id,
            &NewSubject {
                name: form.name,
                code: form.code,
                description: form.description,
            },
        )
        .await?;
    info!(target: LOG_TARGET, faculty = faculty_id, id = created.id, "Subject created");

    Ok(Redirect::to(&format!("/universities/{id}/faculties/{faculty_id}")))
}

pub async fn delete_subject(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path((id, faculty_id, subject_id)): Path<(EntityId, EntityId, EntityId)>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;

    state
        .backend(&auth)
        .delete_subject(id, faculty_id, subject_id)
        .await?;
    info!(target: LOG_TARGET, faculty = faculty_id, id = subject_id, "Subject deleted");

    Ok(Redirect::to(&format!("/universities/{id}/faculties/{faculty_id}")))
}
