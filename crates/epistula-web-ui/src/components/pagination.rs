use epistula_core::Pagination;
use maud::{Markup, html};

/// Previous/next controls. `href` maps a page number to the URL that shows
/// it; the page change itself is up to whoever serves that URL.
///
/// Renders nothing when everything fits on one page.
pub(crate) fn pagination(p: Pagination, href: impl Fn(u32) -> String) -> Markup {
    if !p.is_visible() {
        return html! {};
    }

    html! {
        nav ."m-pagination" aria-label="Pagination" {
            @if p.has_previous() {
                a ."m-pagination__prev u-button" rel="prev" href=(href(p.previous_page())) { "Previous" }
            } @else {
                button ."m-pagination__prev u-button" type="button" disabled { "Previous" }
            }
            span ."m-pagination__status" {
                "Page " (p.current_page()) " of " (p.total_pages())
            }
            @if p.has_next() {
                a ."m-pagination__next u-button" rel="next" href=(href(p.next_page())) { "Next" }
            } @else {
                button ."m-pagination__next u-button" type="button" disabled { "Next" }
            }
        }
    }
}
