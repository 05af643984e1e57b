use epistula_core::entity::resolve_asset_url;
use epistula_core::image::FallbackImage;
use maud::{Markup, html};

use super::safe_image;
use crate::layout::truncate_at_word_boundary;

const DESCRIPTION_PREVIEW_LEN: usize = 160;

/// Summary card of a university, faculty or subject.
///
/// `logo_url` is a backend path; without one the card shows
/// `fallback_icon`.
#[bon::builder]
pub(crate) fn entity_card(
    title: &str,
    backend_url: &str,
    subtitle: Option<&str>,
    description: Option<&str>,
    href: Option<&str>,
    logo_url: Option<&str>,
    #[builder(default = "🏛")] fallback_icon: &str,
) -> Markup {
    let icon = html! { span ."m-entityCard__icon" aria-hidden="true" { (fallback_icon) } };

    html! {
        article ."m-entityCard" data-testid="entity-card" {
            div ."m-entityCard__logo" {
                @if let Some(logo_url) = logo_url.filter(|u| !u.is_empty()) {
                    (safe_image()
                        .image(&FallbackImage::new(resolve_asset_url(backend_url, logo_url)))
                        .alt(&format!("{title} logo"))
                        .class("m-entityCard__logoImage")
                        .fallback(icon)
                        .call())
                } @else {
                    (icon)
                }
            }
            div ."m-entityCard__body" {
                h3 ."m-entityCard__title" {
                    @if let Some(href) = href {
                        a href=(href) { (title) }
                    } @else {
                        (title)
                    }
                }
                @if let Some(subtitle) = subtitle {
                    p ."m-entityCard__subtitle" { (subtitle) }
                }
                @if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
                    p ."m-entityCard__description" {
                        (truncate_at_word_boundary(description, DESCRIPTION_PREVIEW_LEN))
                    }
                }
            }
        }
    }
}
