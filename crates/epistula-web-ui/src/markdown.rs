//! Markdown rendering of backend-provided descriptions.
//!
//! Descriptions are written by users, so raw HTML is shown as text and
//! script-capable link targets are neutralized.

use maud::{Markup, PreEscaped};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

pub(crate) fn render_markdown(source: &str) -> Markup {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let events = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        event => event,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    PreEscaped(out)
}

fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if BLOCKED_URL_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
