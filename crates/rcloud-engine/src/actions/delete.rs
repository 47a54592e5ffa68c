use crate::driver::{DriverError, SessionDriver};
use crate::error::ItemError;
use crate::overlay::dismiss_consent_overlay;
use crate::recording::Recording;
use crate::retry::{RetryPolicy, with_retry};
use crate::site;
use rcloud_common::protocol::WaitCondition;
use std::time::Duration;
use tracing::info;

pub const DELETE_ATTEMPTS: u32 = 2;

/// Clicks the recording's delete button and confirms the dialog.
///
/// A consent overlay can sit on top of the dialog, so it is dismissed before
/// the second attempt.
pub async fn delete<D: SessionDriver + ?Sized>(
    driver: &mut D,
    recording: &Recording,
    dialog_wait: Duration,
    overlay_wait: Duration,
) -> Result<(), ItemError> {
    let dialog = WaitCondition::Visible(site::CONFIRM_DIALOG);

    with_retry(
        &RetryPolicy::immediate(DELETE_ATTEMPTS),
        "delete",
        driver,
        async |driver: &mut D, _attempt: u32| -> Result<(), DriverError> {
            driver.click(&recording.delete_handle).await?;
            driver.wait_for(&dialog, dialog_wait).await?;
            let confirm = driver.find(&site::CONFIRM_BUTTON).await?;
            driver.click(&confirm).await
        },
        async |driver: &mut D| {
            dismiss_consent_overlay(driver, overlay_wait).await;
        },
    )
    .await?;

    info!("Deleted '{}' ({})", recording.title, recording.date);
    Ok(())
}
