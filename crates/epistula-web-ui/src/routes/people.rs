use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use epistula_core::AuthContext;
use epistula_core::entity::{EntityId, Person};
use epistula_core::pagination::paginate;
use maud::{Markup, html};

use super::{Maud, PageQuery};
use crate::auth::RequireAuth;
use crate::components::{empty_state, pagination};
use crate::error::RequestResult;
use crate::{PAGE_SIZE, SharedState, UiState};

#[derive(Clone, Copy)]
enum PeopleKind {
    Professors,
    Students,
}

impl PeopleKind {
    fn title(self) -> &'static str {
        match self {
            PeopleKind::Professors => "Professors",
            PeopleKind::Students => "Students",
        }
    }

    fn path(self) -> &'static str {
        match self {
            PeopleKind::Professors => "professors",
            PeopleKind::Students => "students",
        }
    }
}

pub async fn get_professors(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<EntityId>,
    Query(query): Query<PageQuery>,
) -> RequestResult<impl IntoResponse> {
    let people = state.backend(&auth).list_professors(id).await?;
    Ok(Maud(state.render_people_page(
        &auth,
        id,
        PeopleKind::Professors,
        &people,
        query.page(),
    )))
}

pub async fn get_students(
    state: State<SharedState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<EntityId>,
    Query(query): Query<PageQuery>,
) -> RequestResult<impl IntoResponse> {
    let people = state.backend(&auth).list_students(id).await?;
    Ok(Maud(state.render_people_page(
        &auth,
        id,
        PeopleKind::Students,
        &people,
        query.page(),
    )))
}

impl UiState {
    fn render_people_page(
        &self,
        auth: &AuthContext,
        university_id: EntityId,
        kind: PeopleKind,
        people: &[Person],
        requested_page: u32,
    ) -> Markup {
        let (page, pages) = paginate(people, requested_page, PAGE_SIZE);

        let content = html! {
            nav ."m-entityHeader__links" {
                a href={ "/universities/" (university_id) } { "Back to university" }
            }
            @if page.is_empty() {
                (empty_state()
                    .title(&format!("No {} yet", kind.path()))
                    .icon("👤")
                    .call())
            } @else {
                table ."m-peopleTable" data-testid="people-table" {
                    thead {
                        tr {
                            th { "Name" }
                            th { "Email" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        @for person in page {
                            tr {
                                td { (person.name) }
                                td { a href={ "mailto:" (person.email) } { (person.email) } }
                                td {
                                    @match person.is_active {
                                        Some(false) => { "Inactive" }
                                        _ => { "Active" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            (pagination(pages, |n| {
                format!("/universities/{university_id}/{}?page={n}", kind.path())
            }))
        };

        self.render_html_page(kind.title(), auth, content)
    }
}
