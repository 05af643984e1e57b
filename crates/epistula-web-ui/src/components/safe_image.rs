use epistula_core::image::{FallbackImage, ImageLoadState};
use maud::{Markup, html};

/// Browser-side load error handling: swap the image for the fallback kept in
/// the `<template>` right after it. Runs at most once per element.
const SWAP_ON_ERROR: &str =
    "this.onerror=null;this.replaceWith(this.nextElementSibling.content.cloneNode(true))";

/// An image that turns into `fallback` when it cannot be loaded.
///
/// The fallback carries the image's accessible label and class, so it takes
/// the image's place in layout and for screen readers.
#[bon::builder]
pub(crate) fn safe_image(
    image: &FallbackImage,
    alt: &str,
    class: Option<&str>,
    fallback: Markup,
) -> Markup {
    let fallback = html! {
        span class=[class] role="img" aria-label=(alt) data-image-fallback {
            (fallback)
        }
    };

    match image.state() {
        ImageLoadState::Displaying => html! {
            img class=[class] src=(image.src()) alt=(alt) loading="lazy" onerror=(SWAP_ON_ERROR);
            template { (fallback) }
        },
        ImageLoadState::Failed => fallback,
    }
}
