//! Top-level run: log in, read the catalog once, filter, then list, download
//! or delete each selected recording independently.

use crate::actions::{self, DownloadReceipt};
use crate::auth::authenticate;
use crate::catalog::load_catalog;
use crate::cli::{OutputHandlers, Prompt};
use crate::config::{Command, RunConfig};
use crate::driver::SessionDriver;
use crate::error::{ItemError, RunError};
use crate::recording::Recording;
use crate::transfer::Fetcher;
use regex::Regex;
use std::path::PathBuf;
use tracing::{info, warn};

/// Keeps recordings whose title contains a match for `pattern`, in order.
pub fn filter_by_title(recordings: Vec<Recording>, pattern: Option<&Regex>) -> Vec<Recording> {
    match pattern {
        Some(re) => recordings
            .into_iter()
            .filter(|r| re.is_match(&r.title))
            .collect(),
        None => recordings,
    }
}

#[derive(Debug)]
pub enum ItemStatus {
    Listed,
    Downloaded {
        path: PathBuf,
        bytes: u64,
        /// Present when delete-after-download was requested.
        follow_up_delete: Option<Result<(), ItemError>>,
    },
    Deleted,
}

#[derive(Debug)]
pub struct ItemOutcome {
    pub title: String,
    pub date: String,
    pub result: Result<ItemStatus, ItemError>,
}

#[derive(Debug)]
pub struct RunReport {
    pub command: Command,
    pub items: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.items
            .iter()
            .filter(|item| match &item.result {
                Err(_) => true,
                Ok(ItemStatus::Downloaded {
                    follow_up_delete: Some(Err(_)),
                    ..
                }) => true,
                Ok(_) => false,
            })
            .count()
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing matched; the run ended without touching any recording.
    NothingToDo,
    Completed(RunReport),
}

/// Everything a run needs besides its configuration.
pub struct RunContext<'a, D: ?Sized, F: ?Sized, P: ?Sized> {
    pub driver: &'a mut D,
    pub fetcher: &'a mut F,
    pub prompt: &'a mut P,
    pub output: OutputHandlers,
}

pub async fn run<D, F, P>(
    ctx: RunContext<'_, D, F, P>,
    config: &RunConfig,
) -> Result<RunOutcome, RunError>
where
    D: SessionDriver + ?Sized,
    F: Fetcher + ?Sized,
    P: Prompt + ?Sized,
{
    let RunContext {
        driver,
        fetcher,
        prompt,
        output,
    } = ctx;

    authenticate(driver, prompt, config, output).await?;
    let catalog = load_catalog(driver, config).await?;
    let selected = filter_by_title(catalog.recordings, config.regex.as_ref());

    if selected.is_empty() {
        (output.out)("No recordings found.");
        return Ok(RunOutcome::NothingToDo);
    }

    let items = match config.command {
        Command::List => list(&selected, output),
        Command::Download => download_all(driver, fetcher, &selected, config, output).await,
        Command::Delete => delete_all(driver, &selected, config, output).await,
    };

    let report = RunReport {
        command: config.command,
        items,
    };
    info!(
        "{} finished: {} item(s), {} failure(s)",
        config.command,
        report.items.len(),
        report.failures()
    );
    Ok(RunOutcome::Completed(report))
}

fn outcome(recording: &Recording, result: Result<ItemStatus, ItemError>) -> ItemOutcome {
    ItemOutcome {
        title: recording.title.clone(),
        date: recording.date.clone(),
        result,
    }
}

fn list(selected: &[Recording], output: OutputHandlers) -> Vec<ItemOutcome> {
    (output.out)(&format!("Found {} recordings:", selected.len()));
    selected
        .iter()
        .map(|recording| {
            (output.out)(&recording.to_string());
            outcome(recording, Ok(ItemStatus::Listed))
        })
        .collect()
}

async fn download_all<D, F>(
    driver: &mut D,
    fetcher: &mut F,
    selected: &[Recording],
    config: &RunConfig,
    output: OutputHandlers,
) -> Vec<ItemOutcome>
where
    D: SessionDriver + ?Sized,
    F: Fetcher + ?Sized,
{
    (output.out)(&format!("Downloading {} recordings:", selected.len()));
    let mut items = Vec::with_capacity(selected.len());

    for recording in selected {
        (output.out)(&format!("Downloading {}...", recording.title));
        let result = actions::download(
            driver,
            fetcher,
            recording,
            &config.download_dir,
            config.max_download_retries,
        )
        .await;

        let status = match result {
            Ok(DownloadReceipt { path, bytes, .. }) => {
                let follow_up_delete = if config.delete_after_download {
                    Some(delete_one(driver, recording, config, output).await)
                } else {
                    None
                };
                Ok(ItemStatus::Downloaded {
                    path,
                    bytes,
                    follow_up_delete,
                })
            }
            Err(e) => {
                warn!("Download of '{}' failed: {}", recording.title, e);
                (output.err)(&format!("Error downloading {}", recording.title));
                Err(e)
            }
        };
        items.push(outcome(recording, status));
    }
    items
}

async fn delete_one<D: SessionDriver + ?Sized>(
    driver: &mut D,
    recording: &Recording,
    config: &RunConfig,
    output: OutputHandlers,
) -> Result<(), ItemError> {
    let result = actions::delete(
        driver,
        recording,
        config.timing.dialog_wait(),
        config.timing.overlay_wait(),
    )
    .await;
    if let Err(e) = &result {
        warn!("Delete of '{}' failed: {}", recording.title, e);
        (output.err)(&format!("Error deleting {}", recording.title));
    }
    result
}

async fn delete_all<D: SessionDriver + ?Sized>(
    driver: &mut D,
    selected: &[Recording],
    config: &RunConfig,
    output: OutputHandlers,
) -> Vec<ItemOutcome> {
    (output.out)(&format!("Deleting {} recordings:", selected.len()));
    let mut items = Vec::with_capacity(selected.len());

    for recording in selected {
        (output.out)(&format!("- {} {}", recording.title, recording.date));
        let result = delete_one(driver, recording, config, output)
            .await
            .map(|()| ItemStatus::Deleted);
        items.push(outcome(recording, result));
    }
    items
}
