//! Cookie-consent overlay that can cover the login form and dialogs.

use crate::driver::{DriverError, SessionDriver};
use crate::site;
use rcloud_common::protocol::WaitCondition;
use std::time::Duration;
use tracing::{debug, info};

/// Best-effort: accept the consent banner if one shows up within `wait`.
///
/// Returns whether a banner was dismissed. Never fails; a missing banner is
/// the normal case once consent was given.
pub async fn dismiss_consent_overlay<D: SessionDriver + ?Sized>(
    driver: &mut D,
    wait: Duration,
) -> bool {
    match try_dismiss(driver, wait).await {
        Ok(()) => {
            info!("Dismissed cookie consent overlay");
            true
        }
        Err(e) => {
            debug!("No consent overlay dismissed: {}", e);
            false
        }
    }
}

async fn try_dismiss<D: SessionDriver + ?Sized>(
    driver: &mut D,
    wait: Duration,
) -> Result<(), DriverError> {
    let frame = driver
        .wait_for(&WaitCondition::Present(site::CONSENT_FRAME), wait)
        .await?;
    driver.enter_frame(&frame).await?;

    let clicked = match driver.find(&site::CONSENT_BUTTON).await {
        Ok(button) => driver.click(&button).await,
        Err(e) => Err(e),
    };

    // Always return to the page, even when the click failed.
    let left = driver.leave_frame().await;
    clicked?;
    left
}
