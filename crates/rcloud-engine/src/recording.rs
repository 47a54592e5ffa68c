use rcloud_common::protocol::ElementHandle;
use std::fmt;
use url::Url;

/// One entry of the recordings listing.
///
/// `delete_handle` points into the live page the catalog was read from and is
/// useless after that page is reloaded.
#[derive(Debug, Clone)]
pub struct Recording {
    pub title: String,
    pub date: String,
    pub duration: Option<String>,
    pub download_link: Option<Url>,
    pub delete_handle: ElementHandle,
    pub is_compact_variant: bool,
}

impl Recording {
    /// `{title}_{date}.mp3`, safe to use as a single path component.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.mp3",
            sanitize_component(&self.title),
            sanitize_component(&self.date)
        )
    }
}

/// Drops pipes, turns path separators into dashes and joins the remaining
/// words with underscores.
pub fn sanitize_component(raw: &str) -> String {
    raw.replace('|', "")
        .replace(['/', '\\'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl fmt::Display for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.title, self.date)?;
        if let Some(duration) = &self.duration {
            write!(f, " | {}", duration)?;
        }
        match &self.download_link {
            Some(link) => write!(f, " | {}", link),
            None => write!(f, " | no download link"),
        }
    }
}
