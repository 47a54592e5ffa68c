#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use rcloud_common::protocol::{ElementHandle, Rect, Selector, SessionCookies, WaitCondition};
use rcloud_engine::catalog::layout::is_date_label;
use rcloud_engine::config::{Command, ConfigLoader, Overrides, RunConfig};
use rcloud_engine::driver::{DriverError, SessionDriver};
use rcloud_engine::site;
use rcloud_engine::transfer::{FetchResponse, Fetcher, TransferError};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use url::Url;

pub const BASE: &str = "https://radio.test/aufnahmen";

#[derive(Debug, Default, Clone)]
struct Node {
    text: String,
    props: HashMap<String, String>,
    rect: Rect,
    children: HashMap<String, Vec<usize>>,
}

fn visible() -> Rect {
    Rect {
        x: 0.0,
        y: 0.0,
        width: 400.0,
        height: 40.0,
    }
}

/// In-memory stand-in for the radiocloud pages.
///
/// Elements are kept in a flat arena; lookups go through a per-node map keyed
/// by selector text. Handles carry the page epoch, which `navigate` bumps.
#[derive(Debug, Default)]
pub struct FakeSite {
    nodes: Vec<Node>,
    root: HashMap<String, Vec<usize>>,
    container: usize,
    epoch: u32,

    /// Popped on every login submit; `true` lets the user in. When empty,
    /// `accept_by_default` decides.
    pub login_script: VecDeque<bool>,
    pub accept_by_default: bool,
    logged_in: bool,
    /// Navigations that still fail before the browser loads pages again.
    pub navigation_failures: u32,
    /// Text reads of elements showing one of these strings lose the session.
    pub unreadable_texts: Vec<String>,

    /// Container lookups that still fail before the list shows up.
    pub container_misses: u32,
    pub container_missing: bool,

    /// Delete clicks that do not open the confirmation dialog.
    pub dialog_failures: u32,
    dialog_open: bool,
    pending_delete: Option<usize>,
    /// Consent overlays still to be shown, one per `wait_for`.
    pub consent_overlays: u32,
    consent_frame: usize,
    delete_buttons: HashMap<usize, usize>,

    pub cookies: SessionCookies,
    pub navigations: Vec<String>,
    pub filled: Vec<String>,
    pub login_submits: u32,
    pub delete_clicks: u32,
    pub overlays_dismissed: u32,
    /// Items whose deletion was confirmed, by title.
    pub deleted: Vec<String>,
    pub closed: bool,
    pub in_frame: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        let mut site = Self {
            accept_by_default: true,
            ..Default::default()
        };
        for selector in [
            &site::LOGIN_USER_FIELD,
            &site::LOGIN_PASSWORD_FIELD,
            &site::CONFIRM_BUTTON,
        ] {
            let id = site.node("");
            site.root.insert(selector.value().to_string(), vec![id]);
        }
        site.container = site.node("");
        site.consent_frame = site.node("");
        let consent_button = site.node("Accept");
        site.nodes[site.consent_frame]
            .children
            .insert(site::CONSENT_BUTTON.value().to_string(), vec![consent_button]);
        site.cookies.insert("_session", "abc123");
        site
    }

    fn node(&mut self, text: &str) -> usize {
        self.nodes.push(Node {
            text: text.to_string(),
            rect: visible(),
            ..Default::default()
        });
        self.nodes.len() - 1
    }

    fn child(&mut self, parent: usize, selector: &Selector, child: usize) {
        self.nodes[parent]
            .children
            .entry(selector.value().to_string())
            .or_default()
            .push(child);
    }

    fn text_child(&mut self, parent: usize, selector: &Selector, text: &str) -> usize {
        let id = self.node(text);
        self.child(parent, selector, id);
        id
    }

    fn link(&mut self, parent: usize, href: &str) {
        let a = self.node("Download");
        self.nodes[a].props.insert("href".into(), href.to_string());
        self.child(parent, &site::LINK, a);
    }

    fn delete_button(&mut self, parent: usize, title: &str) {
        let button = self.node("");
        self.child(parent, &site::DELETE_BUTTON, button);
        self.nodes[button].text = title.to_string();
        self.delete_buttons.insert(button, parent);
    }

    fn push_item(&mut self, li: usize) {
        let container = self.container;
        self.child(container, &site::RECORDING_ITEM, li);
    }

    pub fn add_standard(&mut self, title: &str, date: &str, href: Option<&str>) -> &mut Self {
        let li = self.node("");
        self.text_child(li, &site::ITEM_TITLE, title);
        self.text_child(li, &site::ITEM_DATE, date);
        self.text_child(li, &site::ITEM_DURATION, "60 min");
        let actions = self.text_child(li, &site::ITEM_ACTIONS, "");
        if let Some(href) = href {
            self.link(actions, href);
        }
        self.delete_button(li, title);
        self.push_item(li);
        self
    }

    /// A standard item whose date element is missing.
    pub fn add_broken(&mut self, title: &str) -> &mut Self {
        let li = self.node("");
        self.text_child(li, &site::ITEM_TITLE, title);
        self.delete_button(li, title);
        self.push_item(li);
        self
    }

    pub fn add_hidden(&mut self, title: &str) -> &mut Self {
        self.add_standard(title, "01.01.2024", None);
        let li = *self.nodes[self.container].children[site::RECORDING_ITEM.value()]
            .last()
            .unwrap();
        self.nodes[li].rect = Rect::default();
        self
    }

    /// A series group `li` followed by its members, the way a descendant
    /// `li` lookup returns them.
    pub fn add_series(&mut self, members: &[(&str, &str)]) -> &mut Self {
        let group = self.node("");
        let nested = self.node("");
        self.child(group, &site::NESTED_LIST, nested);
        self.push_item(group);
        for (title, date) in members {
            self.add_standard(title, date, Some("/download/series.mp3"));
        }
        self
    }

    /// Compact item: `(text, link)` per label, delete button at item level.
    pub fn add_compact(&mut self, labels: &[(&str, Option<&str>)]) -> &mut Self {
        let li = self.node("");
        let marker = self.node("");
        self.child(li, &site::COMPACT_MARKER, marker);
        let title = labels
            .iter()
            .find(|(text, link)| link.is_none() && !text.is_empty() && !is_date_label(text))
            .map(|(text, _)| text.to_string())
            .unwrap_or_default();
        for (text, link) in labels {
            let label = self.text_child(li, &site::COMPACT_LABEL, text);
            if let Some(href) = link {
                self.link(label, href);
            }
        }
        self.delete_button(li, &title);
        self.push_item(li);
        self
    }

    fn handle(&self, id: usize) -> ElementHandle {
        ElementHandle::new(id as u64, self.epoch)
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<usize, DriverError> {
        if handle.epoch() != self.epoch {
            return Err(DriverError::ElementStale { handle: *handle });
        }
        let id = handle.id() as usize;
        if id >= self.nodes.len() {
            return Err(DriverError::Other(format!("unknown handle {}", handle)));
        }
        Ok(id)
    }

    fn root_lookup(&self, selector: &Selector) -> Vec<usize> {
        if *selector == site::RECORDINGS_CONTAINER {
            return vec![self.container];
        }
        if *selector == site::DASHBOARD_MARKER {
            return if self.logged_in { vec![self.container] } else { vec![] };
        }
        if self.in_frame && *selector == site::CONSENT_BUTTON {
            return self.nodes[self.consent_frame].children[site::CONSENT_BUTTON.value()].clone();
        }
        self.root.get(selector.value()).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SessionDriver for FakeSite {
    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        !self.closed
    }

    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.navigations.push(url.to_string());
        if self.navigation_failures > 0 {
            self.navigation_failures -= 1;
            return Err(DriverError::Navigation(format!("net::ERR_CONNECTION_RESET at {}", url)));
        }
        self.epoch += 1;
        self.dialog_open = false;
        Ok(())
    }

    async fn find(&mut self, selector: &Selector) -> Result<ElementHandle, DriverError> {
        if *selector == site::RECORDINGS_CONTAINER {
            if self.container_missing {
                return Err(DriverError::NotFound {
                    selector: selector.clone(),
                });
            }
            if self.container_misses > 0 {
                self.container_misses -= 1;
                return Err(DriverError::NotFound {
                    selector: selector.clone(),
                });
            }
        }
        match self.root_lookup(selector).first() {
            Some(id) => Ok(self.handle(*id)),
            None => Err(DriverError::NotFound {
                selector: selector.clone(),
            }),
        }
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError> {
        Ok(self
            .root_lookup(selector)
            .into_iter()
            .map(|id| self.handle(id))
            .collect())
    }

    async fn find_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<ElementHandle, DriverError> {
        self.find_all_in(parent, selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound {
                selector: selector.clone(),
            })
    }

    async fn find_all_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let id = self.resolve(parent)?;
        Ok(self.nodes[id]
            .children
            .get(selector.value())
            .map(|ids| ids.iter().map(|c| self.handle(*c)).collect())
            .unwrap_or_default())
    }

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        let id = self.resolve(handle)?;
        if self.in_frame {
            self.overlays_dismissed += 1;
            return Ok(());
        }
        if self.delete_buttons.contains_key(&id) {
            self.delete_clicks += 1;
            if self.dialog_failures > 0 {
                self.dialog_failures -= 1;
            } else {
                self.dialog_open = true;
                self.pending_delete = Some(id);
            }
            return Ok(());
        }
        if self.root_lookup(&site::CONFIRM_BUTTON).contains(&id) && self.dialog_open {
            self.dialog_open = false;
            if let Some(button) = self.pending_delete.take() {
                self.deleted.push(self.nodes[button].text.clone());
            }
        }
        Ok(())
    }

    async fn text(&mut self, handle: &ElementHandle) -> Result<String, DriverError> {
        let id = self.resolve(handle)?;
        if self.unreadable_texts.contains(&self.nodes[id].text) {
            return Err(DriverError::ConnectionLost);
        }
        Ok(self.nodes[id].text.clone())
    }

    async fn property(
        &mut self,
        handle: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let id = self.resolve(handle)?;
        Ok(self.nodes[id]
            .props
            .get(name)
            .map(|href| match Url::parse(BASE).and_then(|base| base.join(href)) {
                Ok(url) => url.to_string(),
                Err(_) => href.clone(),
            }))
    }

    async fn rect(&mut self, handle: &ElementHandle) -> Result<Rect, DriverError> {
        let id = self.resolve(handle)?;
        Ok(self.nodes[id].rect)
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.resolve(handle)?;
        self.filled.push(text.to_string());
        Ok(())
    }

    async fn press_enter(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.resolve(handle)?;
        self.login_submits += 1;
        self.logged_in = self
            .login_script
            .pop_front()
            .unwrap_or(self.accept_by_default);
        Ok(())
    }

    async fn enter_frame(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.resolve(handle)?;
        self.in_frame = true;
        Ok(())
    }

    async fn leave_frame(&mut self) -> Result<(), DriverError> {
        self.in_frame = false;
        Ok(())
    }

    async fn wait_for(
        &mut self,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let timed_out = || DriverError::Timeout {
            condition: condition.to_string(),
            waited_ms: timeout.as_millis() as u64,
        };
        match condition {
            WaitCondition::Present(sel) if *sel == site::CONSENT_FRAME => {
                if self.consent_overlays > 0 {
                    self.consent_overlays -= 1;
                    Ok(self.handle(self.consent_frame))
                } else {
                    Err(timed_out())
                }
            }
            WaitCondition::Visible(sel) if *sel == site::CONFIRM_DIALOG => {
                if self.dialog_open {
                    Ok(self.handle(self.container))
                } else {
                    Err(timed_out())
                }
            }
            other => match self.root_lookup(other.selector()).first() {
                Some(id) => Ok(self.handle(*id)),
                None => Err(timed_out()),
            },
        }
    }

    async fn get_cookies(&mut self) -> Result<SessionCookies, DriverError> {
        Ok(self.cookies.clone())
    }
}

/// Serves a fixed body, failing the first `failures` requests.
pub struct ScriptedFetcher {
    pub body: Vec<u8>,
    /// `Content-Length` to announce; `None` omits the header.
    pub announced: Option<u64>,
    pub failures: u32,
    pub calls: AtomicU32,
    pub seen_cookies: Mutex<Vec<Option<String>>>,
}

impl ScriptedFetcher {
    pub fn serving(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            announced: Some(body.len() as u64),
            failures: 0,
            calls: AtomicU32::new(0),
            seen_cookies: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_first(mut self, failures: u32) -> Self {
        self.failures = failures;
        self
    }

    pub fn announcing(mut self, announced: Option<u64>) -> Self {
        self.announced = announced;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _url: &Url,
        cookies: &SessionCookies,
    ) -> Result<FetchResponse, TransferError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen_cookies
            .lock()
            .unwrap()
            .push(cookies.header_value());
        if call <= self.failures {
            return Err(TransferError::Status(503));
        }
        let chunks: Vec<Result<Vec<u8>, TransferError>> = self
            .body
            .chunks(4)
            .map(|c| Ok(c.to_vec()))
            .collect();
        Ok(FetchResponse {
            content_length: self.announced,
            body: futures::stream::iter(chunks).boxed(),
        })
    }
}

/// Answers prompts from a queue; an empty queue behaves like a closed stdin.
#[derive(Default)]
pub struct QueuedPrompt {
    pub answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl QueuedPrompt {
    pub fn with(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl rcloud_engine::cli::Prompt for QueuedPrompt {
    async fn ask(&mut self, label: &str) -> io::Result<String> {
        self.asked.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }
}

pub fn run_config(command: Command, dir: &Path, regex: Option<&str>) -> RunConfig {
    let file = ConfigLoader::parse(&format!(
        r#"
auth:
  user: listener@example.com
  password: secret
site:
  login_url: https://radio.test/login
  recordings_url: {BASE}
"#
    ))
    .unwrap();
    let overrides = Overrides {
        download_dir: Some(dir.to_path_buf()),
        regex: regex.map(str::to_string),
        ..Default::default()
    };
    RunConfig::resolve(command, overrides, &file).unwrap()
}

pub fn titles<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    items.into_iter().map(String::as_str).collect()
}
