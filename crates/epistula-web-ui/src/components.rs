//! Presentational building blocks. Pure functions from props to markup.

mod empty_state;
mod entity_card;
mod pagination;
mod safe_image;

pub(crate) use empty_state::empty_state;
pub(crate) use entity_card::entity_card;
pub(crate) use pagination::pagination;
pub(crate) use safe_image::safe_image;

#[cfg(test)]
pub(crate) fn parse_fragment(markup: maud::Markup) -> scraper::Html {
    scraper::Html::parse_fragment(&markup.into_string())
}

#[cfg(test)]
pub(crate) fn select_all<'a>(html: &'a scraper::Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    let selector = scraper::Selector::parse(selector).expect("valid selector");
    html.select(&selector).collect()
}
