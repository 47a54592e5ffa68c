//! Turns a [`RawItem`] into a [`Recording`].
//!
//! Two templates render the same entry: the standard one with named
//! sub-elements, and a compact one made of label slots. Compact items are
//! first read positionally; when the slot count or contents do not fit, a
//! content-based scan takes over.

use super::raw::{CompactLabel, CompactSlots, RawItem, StandardSlots};
use crate::error::ParseItemFailure;
use crate::recording::Recording;
use crate::site;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").unwrap());

pub fn is_date_label(text: &str) -> bool {
    DATE_RE.is_match(text.trim())
}

/// `Ok(None)` for items that are legitimately not recordings.
pub fn classify(raw: RawItem, base: &Url) -> Result<Option<Recording>, ParseItemFailure> {
    match raw {
        RawItem::Hidden | RawItem::Series => Ok(None),
        RawItem::Standard(slots) => parse_standard(slots, base).map(Some),
        RawItem::Compact(slots) => match parse_compact_positional(&slots, base) {
            Some(recording) => Ok(Some(recording)),
            None => parse_compact_heuristic(slots, base).map(Some),
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_link(href: Option<&str>, base: &Url) -> Option<Url> {
    let href = href?.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Ignoring unusable download link '{}': {}", href, e);
            None
        }
    }
}

pub fn parse_standard(slots: StandardSlots, base: &Url) -> Result<Recording, ParseItemFailure> {
    let title = non_empty(slots.title).ok_or(ParseItemFailure::MissingField("title"))?;
    let date = non_empty(slots.date).ok_or(ParseItemFailure::MissingField("date"))?;
    let delete_handle = slots
        .delete_handle
        .ok_or(ParseItemFailure::MissingField("delete button"))?;

    Ok(Recording {
        title,
        date,
        duration: non_empty(slots.duration),
        download_link: resolve_link(slots.download_href.as_deref(), base),
        delete_handle,
        is_compact_variant: false,
    })
}

/// Fixed slots: title, date, (status), actions. `None` on any mismatch.
pub fn parse_compact_positional(slots: &CompactSlots, base: &Url) -> Option<Recording> {
    if slots.labels.len() != site::COMPACT_SLOT_COUNT {
        return None;
    }
    let title = non_empty(Some(slots.labels[site::COMPACT_TITLE_SLOT].text.clone()))?;
    let date = non_empty(Some(slots.labels[site::COMPACT_DATE_SLOT].text.clone()))?;
    let actions = &slots.labels[site::COMPACT_ACTIONS_SLOT];
    let delete_handle = actions.delete_handle.or(slots.item_delete_handle)?;

    Some(Recording {
        title,
        date,
        duration: None,
        download_link: resolve_link(actions.href.as_deref(), base),
        delete_handle,
        is_compact_variant: true,
    })
}

/// Classifies each label by what it contains: a `DD.MM.YYYY` date, a link
/// (the actions), or text (the title; the last one wins).
pub fn parse_compact_heuristic(
    slots: CompactSlots,
    base: &Url,
) -> Result<Recording, ParseItemFailure> {
    let label_count = slots.labels.len();
    let mut title = None;
    let mut date = None;
    let mut actions: Option<CompactLabel> = None;

    for label in slots.labels {
        let text = label.text.trim();
        if is_date_label(text) {
            if date.is_none() {
                date = Some(text.to_string());
            }
        } else if label.has_link {
            actions = Some(label);
        } else if !text.is_empty() {
            title = Some(text.to_string());
        }
    }

    let unclassifiable = |missing: &'static str| ParseItemFailure::Unclassifiable {
        labels: label_count,
        missing,
    };
    let title = title.ok_or_else(|| unclassifiable("title"))?;
    let date = date.ok_or_else(|| unclassifiable("date"))?;
    let delete_handle = actions
        .as_ref()
        .and_then(|a| a.delete_handle)
        .or(slots.item_delete_handle)
        .ok_or_else(|| unclassifiable("delete button"))?;

    Ok(Recording {
        title,
        date,
        duration: None,
        download_link: resolve_link(actions.as_ref().and_then(|a| a.href.as_deref()), base),
        delete_handle,
        is_compact_variant: true,
    })
}
