use maud::{Markup, html};

/// Placeholder for a list with nothing in it.
#[bon::builder]
pub(crate) fn empty_state(
    title: &str,
    #[builder(default = "📭")] icon: &str,
    description: Option<&str>,
    // `(label, href)` of a call to action
    action: Option<(&str, &str)>,
) -> Markup {
    html! {
        div ."m-emptyState" data-testid="empty-state" {
            div ."m-emptyState__icon" aria-hidden="true" { (icon) }
            h3 ."m-emptyState__title" { (title) }
            @if let Some(description) = description {
                p ."m-emptyState__description" { (description) }
            }
            @if let Some((label, href)) = action {
                a ."m-emptyState__action u-button" href=(href) { (label) }
            }
        }
    }
}
