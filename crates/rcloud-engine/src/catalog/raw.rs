//! Reads what the parser needs from one list item, without interpreting it.

use crate::driver::{DriverError, SessionDriver};
use crate::site;
use rcloud_common::protocol::{ElementHandle, Selector};

/// Everything read from one `li`, before deciding whether it is a recording.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// Zero width or height.
    Hidden,
    /// Contains a nested list: a series group, not a recording itself.
    Series,
    Standard(StandardSlots),
    Compact(CompactSlots),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardSlots {
    pub title: Option<String>,
    pub date: Option<String>,
    pub duration: Option<String>,
    pub download_href: Option<String>,
    pub delete_handle: Option<ElementHandle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompactSlots {
    pub labels: Vec<CompactLabel>,
    /// Delete button found anywhere in the item, used when no label holds one.
    pub item_delete_handle: Option<ElementHandle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompactLabel {
    pub text: String,
    pub has_link: bool,
    pub href: Option<String>,
    pub delete_handle: Option<ElementHandle>,
}

impl CompactLabel {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

async fn first_in<D: SessionDriver + ?Sized>(
    driver: &mut D,
    parent: &ElementHandle,
    selector: &Selector,
) -> Result<Option<ElementHandle>, DriverError> {
    Ok(driver
        .find_all_in(parent, selector)
        .await?
        .into_iter()
        .next())
}

async fn text_of<D: SessionDriver + ?Sized>(
    driver: &mut D,
    parent: &ElementHandle,
    selector: &Selector,
) -> Result<Option<String>, DriverError> {
    match first_in(driver, parent, selector).await? {
        Some(el) => Ok(Some(driver.text(&el).await?.trim().to_string())),
        None => Ok(None),
    }
}

async fn href_of<D: SessionDriver + ?Sized>(
    driver: &mut D,
    parent: &ElementHandle,
) -> Result<(bool, Option<String>), DriverError> {
    match first_in(driver, parent, &site::LINK).await? {
        Some(link) => Ok((true, driver.property(&link, "href").await?)),
        None => Ok((false, None)),
    }
}

/// Snapshot one list item. Missing sub-elements become `None`; only
/// browser failures are errors.
pub async fn collect<D: SessionDriver + ?Sized>(
    driver: &mut D,
    item: &ElementHandle,
) -> Result<RawItem, DriverError> {
    if driver.rect(item).await?.is_collapsed() {
        return Ok(RawItem::Hidden);
    }

    if !driver.find_all_in(item, &site::NESTED_LIST).await?.is_empty() {
        return Ok(RawItem::Series);
    }

    if !driver.find_all_in(item, &site::COMPACT_MARKER).await?.is_empty() {
        let mut labels = Vec::new();
        for label in driver.find_all_in(item, &site::COMPACT_LABEL).await? {
            let text = driver.text(&label).await?.trim().to_string();
            let (has_link, href) = href_of(driver, &label).await?;
            let delete_handle = first_in(driver, &label, &site::DELETE_BUTTON).await?;
            labels.push(CompactLabel {
                text,
                has_link,
                href,
                delete_handle,
            });
        }
        let item_delete_handle = first_in(driver, item, &site::DELETE_BUTTON).await?;
        return Ok(RawItem::Compact(CompactSlots {
            labels,
            item_delete_handle,
        }));
    }

    let download_href = match first_in(driver, item, &site::ITEM_ACTIONS).await? {
        Some(actions) => href_of(driver, &actions).await?.1,
        None => None,
    };

    Ok(RawItem::Standard(StandardSlots {
        title: text_of(driver, item, &site::ITEM_TITLE).await?,
        date: text_of(driver, item, &site::ITEM_DATE).await?,
        duration: text_of(driver, item, &site::ITEM_DURATION).await?,
        download_href,
        delete_handle: first_in(driver, item, &site::DELETE_BUTTON).await?,
    }))
}
