//! Recordings listing: page readiness, item enumeration and per-item parsing.

pub mod layout;
pub mod raw;

use crate::config::RunConfig;
use crate::driver::{DriverError, SessionDriver};
use crate::error::{ParseItemFailure, RunError};
use crate::overlay::dismiss_consent_overlay;
use crate::recording::Recording;
use crate::retry::{RetryPolicy, with_retry};
use crate::site;
use rcloud_common::protocol::ElementHandle;
use tracing::{debug, info, warn};
use url::Url;

pub const CATALOG_ATTEMPTS: u32 = 4;

/// One snapshot of the listing page, in display order.
#[derive(Debug, Default)]
pub struct Catalog {
    pub recordings: Vec<Recording>,
    /// Hidden rows and series groups.
    pub skipped: usize,
    /// Items that looked like recordings but could not be parsed.
    pub dropped: usize,
}

async fn parse_item<D: SessionDriver + ?Sized>(
    driver: &mut D,
    item: &ElementHandle,
    base: &Url,
) -> Result<Option<Recording>, ParseItemFailure> {
    let raw = raw::collect(driver, item).await?;
    layout::classify(raw, base)
}

/// Waits for the recordings container, re-navigating if the page never loaded.
async fn wait_for_container<D: SessionDriver + ?Sized>(
    driver: &mut D,
    config: &RunConfig,
) -> Result<ElementHandle, RunError> {
    let policy = RetryPolicy::new(CATALOG_ATTEMPTS, config.timing.catalog_retry_delay());
    let mut navigated = false;

    with_retry(
        &policy,
        "recordings page",
        driver,
        async |driver: &mut D, _attempt: u32| -> Result<ElementHandle, DriverError> {
            if !navigated {
                driver.navigate(config.site.recordings.as_str()).await?;
                navigated = true;
            }
            dismiss_consent_overlay(driver, config.timing.overlay_wait()).await;
            driver.find(&site::RECORDINGS_CONTAINER).await
        },
        async |_: &mut D| {},
    )
    .await
    .map_err(|e| RunError::CatalogUnavailable {
        attempts: e.attempts,
        last_error: e.last_error,
    })
}

/// Reads every recording on the listing page.
///
/// A broken item is dropped and logged; only an unreachable page is fatal.
pub async fn load_catalog<D: SessionDriver + ?Sized>(
    driver: &mut D,
    config: &RunConfig,
) -> Result<Catalog, RunError> {
    let container = wait_for_container(driver, config).await?;
    let items = driver.find_all_in(&container, &site::RECORDING_ITEM).await?;
    debug!("Recordings container holds {} list items", items.len());

    let mut catalog = Catalog::default();
    for (index, item) in items.iter().enumerate() {
        match parse_item(driver, item, &config.site.recordings).await {
            Ok(Some(recording)) => catalog.recordings.push(recording),
            Ok(None) => catalog.skipped += 1,
            Err(e) => {
                warn!("Dropping list item {}: {}", index, e);
                catalog.dropped += 1;
            }
        }
    }

    info!(
        "Catalog: {} recordings ({} skipped, {} dropped)",
        catalog.recordings.len(),
        catalog.skipped,
        catalog.dropped
    );
    Ok(catalog)
}
