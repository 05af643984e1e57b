use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use epistula_core::entity::{EntityId, NewFaculty};
use epistula_core::pagination::paginate;
use maud::html;
use tracing::info;

use super::universities::{EntityInput, ensure_root, render_create_form, render_delete_form};
use super::{Maud, PageQuery};
use crate::auth::RequireAuth;
use crate::components::{empty_state, entity_card, pagination};
use crate::error::RequestResult;
use crate::markdown::render_markdown;
use crate::{LOG_TARGET, PAGE_SIZE, SharedState};

pub async fn get_university(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<EntityId>,
    Query(query): Query<PageQuery>,
) -> RequestResult<impl IntoResponse> {
    let backend = state.backend(&auth);
    let university = backend.get_university(id).await?;
    let faculties = backend.list_faculties(id).await?;
    let (page, pages) = paginate(&faculties, query.page(), PAGE_SIZE);

    let content = html! {
        section ."m-entityHeader" {
            p ."m-entityHeader__code" { (university.code) }
            @if let Some(description) = university.description.as_deref() {
                div ."m-entityHeader__description" { (render_markdown(description)) }
            }
            nav ."m-entityHeader__links" {
                a href={ "/universities/" (id) "/professors" } { "Professors" }
                a href={ "/universities/" (id) "/students" } { "Students" }
            }
        }
        h2 { "Faculties" }
        @if auth.is_root() {
            (render_create_form(&format!("/universities/{id}/faculties"), "Create faculty"))
        }
        @if page.is_empty() {
            (empty_state()
                .title("No faculties yet")
                .icon("🏫")
                .call())
        } @else {
            div ."o-cardGrid" {
                @for faculty in page {
                    @let href = format!("/universities/{id}/faculties/{}", faculty.id);
                    div ."o-cardGrid__item" {
                        (entity_card()
                            .title(&faculty.name)
                            .backend_url(state.backend_url())
                            .subtitle(&faculty.code)
                            .maybe_description(faculty.description.as_deref())
                            .href(&href)
                            .maybe_logo_url(faculty.logo_url.as_deref())
                            .fallback_icon("🏫")
                            .call())
                        @if auth.is_root() {
                            (render_delete_form(&format!("{href}/delete")))
                        }
                    }
                }
            }
        }
        (pagination(pages, |n| format!("/universities/{id}?page={n}")))
    };

    Ok(Maud(state.render_html_page(&university.name, &auth, content)))
}

pub async fn post_faculty(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<EntityId>,
    Form(form): Form<EntityInput>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;
    form.validate()?;

    let created = state
        .backend(&auth)
        .create_faculty(
            id,
            &NewFaculty {
                name: form.name,
                code: form.code,
                description: form.description,
            },
        )
        .await?;
    info!(target: LOG_TARGET, university = id, id = created.id, "Faculty created");

    Ok(Redirect::to(&format!("/universities/{id}")))
}

pub async fn delete_faculty(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path((id, faculty_id)): Path<(EntityId, EntityId)>,
) -> RequestResult<impl IntoResponse> {
    ensure_root(&auth)?;

    state.backend(&auth).delete_faculty(id, faculty_id).await?;
    info!(target: LOG_TARGET, university = id, id = faculty_id, "Faculty deleted");

    Ok(Redirect::to(&format!("/universities/{id}")))
}
