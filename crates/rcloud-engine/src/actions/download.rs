use crate::driver::SessionDriver;
use crate::error::ItemError;
use crate::recording::Recording;
use crate::retry::{RetryPolicy, with_retry};
use crate::transfer::Fetcher;
use futures::StreamExt;
use rcloud_common::protocol::SessionCookies;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub path: PathBuf,
    pub bytes: u64,
    pub attempts: u32,
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// One full fetch into `part`. The size check only applies when the server
/// announced a `Content-Length`.
async fn fetch_to_file<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &Url,
    cookies: &SessionCookies,
    part: &Path,
) -> Result<u64, ItemError> {
    let response = fetcher
        .fetch(url, cookies)
        .await
        .map_err(|e| ItemError::DownloadTransport(e.to_string()))?;

    let mut file = tokio::fs::File::create(part).await?;
    let mut body = response.body;
    let mut received: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| ItemError::DownloadTransport(e.to_string()))?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    debug!(
        "Received {} bytes (announced {:?}) from {}",
        received, response.content_length, url
    );

    match response.content_length {
        Some(expected) if expected != received => {
            Err(ItemError::DownloadIntegrityMismatch { expected, received })
        }
        _ => Ok(received),
    }
}

/// Streams the recording to `{dir}/{title}_{date}.mp3` with the browser's
/// cookies, trying `max_retries + 1` times in total.
///
/// Fails immediately, without touching the network, when the recording has
/// no download link.
pub async fn download<D, F>(
    driver: &mut D,
    fetcher: &mut F,
    recording: &Recording,
    dir: &Path,
    max_retries: u32,
) -> Result<DownloadReceipt, ItemError>
where
    D: SessionDriver + ?Sized,
    F: Fetcher + ?Sized,
{
    let link = recording
        .download_link
        .as_ref()
        .ok_or_else(|| ItemError::MissingDownloadLink {
            title: recording.title.clone(),
        })?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(recording.file_name());
    let part = part_path(&path);

    let cookies = driver
        .get_cookies()
        .await
        .map_err(|e| ItemError::DownloadTransport(format!("reading session cookies: {}", e)))?;
    debug!("Using {} session cookies for {}", cookies.len(), link);

    let mut attempts = 0;
    let result = with_retry(
        &RetryPolicy::immediate(max_retries.saturating_add(1)),
        "download",
        fetcher,
        async |fetcher: &mut F, attempt: u32| {
            attempts = attempt;
            fetch_to_file(&*fetcher, link, &cookies, &part).await
        },
        async |_: &mut F| {},
    )
    .await;

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(exhausted) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(exhausted.into());
        }
    };

    tokio::fs::rename(&part, &path).await?;
    info!("Saved '{}' to {} ({} bytes)", recording.title, path.display(), bytes);

    Ok(DownloadReceipt {
        path,
        bytes,
        attempts,
    })
}
