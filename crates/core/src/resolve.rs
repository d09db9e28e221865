//! Heading, URL and date resolution for matched blocks.
//!
//! URL and date lookups never fail a request: anything that cannot be
//! resolved comes back as `None`.

use std::sync::LazyLock;

use regex::Regex;
use time::macros::format_description;
use time::{Date, Month};
use url::Url;

use crate::parse::{Document, Element};
use crate::text::{TextMode, element_text};
use crate::Result;

/// Default number of characters searched for a date.
pub const DEFAULT_DATE_WINDOW: usize = 300;

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

static MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .expect("valid regex")
});

static ISO_DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").expect("valid regex"));

/// First `h1`-`h6` descendant with non-empty text, and that text.
pub fn find_heading<'a>(block: &Element<'a>, mode: TextMode) -> Result<Option<(Element<'a>, String)>> {
    Ok(block.select(HEADING_SELECTOR)?.into_iter().find_map(|heading| {
        let text = element_text(&heading, mode);
        (!text.is_empty()).then_some((heading, text))
    }))
}

/// Document-wide fallback URL: `<base href>`, then `og:url`, then the
/// canonical link.
///
/// Computed once per document since it does not depend on the block.
pub fn document_url(doc: &Document, base: Option<&Url>) -> Option<String> {
    [doc.base_href(), doc.meta_content("og:url"), doc.canonical_url()]
        .into_iter()
        .flatten()
        .find_map(|href| resolve_href(&href, base))
}

/// URL of a block.
///
/// Tries the nearest enclosing `<a href>`, then the block's first own link,
/// then `fallback`.
pub fn resolve_url(block: &Element<'_>, base: Option<&Url>, fallback: Option<&str>) -> Result<Option<String>> {
    let enclosing = block
        .ancestors()
        .filter(|ancestor| ancestor.tag_name() == "a")
        .find_map(|anchor| anchor.attr("href").and_then(|href| resolve_href(href, base)));
    if enclosing.is_some() {
        return Ok(enclosing);
    }

    let own = block
        .select("a[href]")?
        .into_iter()
        .find_map(|anchor| anchor.attr("href").and_then(|href| resolve_href(href, base)));
    if own.is_some() {
        return Ok(own);
    }

    Ok(fallback.map(str::to_string))
}

/// Resolve a raw `href` against an optional base.
///
/// Absolute URLs are returned unchanged. Relative ones are joined onto
/// `base`, or returned as written when there is no base. Empty, `#` and
/// `javascript:` links yield `None`.
pub fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }

    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }

    match base {
        Some(base) => match base.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!(href, error = %e, "could not resolve relative link");
                None
            }
        },
        None => Some(href.to_string()),
    }
}

/// Publication date of a block as `YYYY-MM-DD`.
///
/// A `<time datetime>` inside the block wins; otherwise the first `window`
/// characters of `text` are searched for a "Month Day, Year" date.
pub fn resolve_date(block: &Element<'_>, text: &str, window: usize) -> Option<String> {
    if let Ok(times) = block.select("time[datetime]") {
        for element in times {
            if let Some(date) = element.attr("datetime").and_then(parse_iso_prefix) {
                return Some(date);
            }
        }
    }

    let window: String = text.chars().take(window).collect();
    find_month_date(&window)
}

/// First valid "Month Day, Year" date in `text`.
///
/// Accepts full or abbreviated month names, an optional period after the
/// abbreviation, an optional ordinal suffix and an optional comma. Matches
/// that are not real calendar dates are skipped.
pub fn find_month_date(text: &str) -> Option<String> {
    MONTH_DATE.captures_iter(text).find_map(|caps| {
        let month = month_from_name(caps.get(1)?.as_str())?;
        let day = caps.get(2)?.as_str().parse::<u8>().ok()?;
        let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
        format_iso(Date::from_calendar_date(year, month, day).ok()?)
    })
}

fn parse_iso_prefix(value: &str) -> Option<String> {
    let prefix = ISO_DATE_PREFIX.captures(value)?.get(1)?.as_str();
    let date = Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok()?;
    format_iso(date)
}

fn format_iso(date: Date) -> Option<String> {
    date.format(format_description!("[year]-[month]-[day]")).ok()
}

fn month_from_name(name: &str) -> Option<Month> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    Some(match prefix.as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    })
}
