use crate::geckodriver::{self, GeckodriverProcess};
use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, Locator};
use rcloud_common::protocol::{ElementHandle, Rect, Selector, SessionCookies, WaitCondition};
use rcloud_engine::config::schema::BrowserConfig;
use rcloud_engine::driver::{DriverError, SessionDriver};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How to get hold of a browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// External WebDriver server; when `None`, geckodriver is started locally.
    pub webdriver_url: Option<String>,
    pub geckodriver_path: Option<PathBuf>,
    pub firefox_path: Option<PathBuf>,
    pub port: u16,
    pub headless: bool,
    pub implicit_wait: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: None,
            geckodriver_path: None,
            firefox_path: None,
            port: geckodriver::DEFAULT_GECKODRIVER_PORT,
            headless: true,
            implicit_wait: Duration::ZERO,
        }
    }
}

impl BrowserOptions {
    /// `debug` shows the browser window instead of running headless.
    pub fn from_config(config: &BrowserConfig, debug: bool) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            geckodriver_path: config.geckodriver_path.clone(),
            firefox_path: config.firefox_path.clone(),
            port: config.port,
            headless: !debug,
            implicit_wait: Duration::from_millis(config.implicit_wait_ms),
        }
    }
}

/// Firefox driven over WebDriver.
///
/// Elements are handed out as [`ElementHandle`]s that index into a registry.
/// The registry is cleared on every navigation and the epoch bumped, so a
/// handle from an earlier page fails with `ElementStale` instead of acting on
/// whatever now sits at its place.
pub struct WebDriverSession {
    options: BrowserOptions,
    client: Option<WebDriverClient>,
    geckodriver: Option<GeckodriverProcess>,
    elements: HashMap<u64, Element>,
    next_id: u64,
    epoch: u32,
}

impl WebDriverSession {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            client: None,
            geckodriver: None,
            elements: HashMap::new(),
            next_id: 0,
            epoch: 0,
        }
    }

    fn client(&self) -> Result<&Client, DriverError> {
        self.client
            .as_ref()
            .map(|c| &c.client)
            .ok_or(DriverError::NotReady)
    }

    fn register(&mut self, element: Element) -> ElementHandle {
        self.next_id += 1;
        self.elements.insert(self.next_id, element);
        ElementHandle::new(self.next_id, self.epoch)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, DriverError> {
        if handle.epoch() != self.epoch {
            return Err(DriverError::ElementStale { handle: *handle });
        }
        self.elements
            .get(&handle.id())
            .ok_or(DriverError::ElementStale { handle: *handle })
    }

    fn reset_registry(&mut self) {
        self.elements.clear();
        self.epoch += 1;
    }
}

fn locator(selector: &Selector) -> Locator<'_> {
    match selector {
        Selector::Css(css) => Locator::Css(css),
        Selector::XPath(xpath) => Locator::XPath(xpath),
    }
}

fn map_lookup_error(selector: &Selector, e: CmdError) -> DriverError {
    if e.is_no_such_element() {
        DriverError::NotFound {
            selector: selector.clone(),
        }
    } else {
        map_error(e)
    }
}

fn map_error(e: CmdError) -> DriverError {
    match e {
        CmdError::Lost(_) => DriverError::ConnectionLost,
        other => DriverError::Other(other.to_string()),
    }
}

fn map_element_error(handle: &ElementHandle, e: CmdError) -> DriverError {
    let msg = e.to_string();
    if msg.contains("stale element") {
        DriverError::ElementStale { handle: *handle }
    } else if msg.contains("not interactable") || msg.contains("click intercepted") {
        DriverError::NotInteractable {
            handle: *handle,
            reason: msg,
        }
    } else {
        map_error(e)
    }
}

#[async_trait]
impl SessionDriver for WebDriverSession {
    async fn launch(&mut self) -> Result<(), DriverError> {
        let webdriver_url = if let Some(url) = &self.options.webdriver_url {
            info!("Connecting to external WebDriver at {}...", url);
            url.clone()
        } else {
            info!("Launching geckodriver on port {}...", self.options.port);
            let process = geckodriver::launch_geckodriver(
                self.options.geckodriver_path.as_deref(),
                self.options.port,
            )
            .await
            .map_err(DriverError::Other)?;
            let url = process.webdriver_url();
            self.geckodriver = Some(process);
            url
        };

        let caps = geckodriver::firefox_capabilities(
            self.options.firefox_path.as_deref(),
            self.options.headless,
        );
        let client = WebDriverClient::connect(&webdriver_url, caps).await?;

        if !self.options.implicit_wait.is_zero() {
            client
                .client
                .update_timeouts(TimeoutConfiguration::new(
                    None,
                    None,
                    Some(self.options.implicit_wait),
                ))
                .await
                .map_err(map_error)?;
        }

        info!(
            "Browser session ready (headless: {})",
            self.options.headless
        );
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.reset_registry();
        let result = match self.client.take() {
            Some(client) => client.close().await,
            None => Ok(()),
        };
        // Kill geckodriver even if closing the session failed.
        self.geckodriver = None;
        result
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        info!("Navigating to: {}", url);
        self.client()?
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.reset_registry();
        Ok(())
    }

    async fn find(&mut self, selector: &Selector) -> Result<ElementHandle, DriverError> {
        let element = self
            .client()?
            .find(locator(selector))
            .await
            .map_err(|e| map_lookup_error(selector, e))?;
        Ok(self.register(element))
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError> {
        let elements = self
            .client()?
            .find_all(locator(selector))
            .await
            .map_err(map_error)?;
        Ok(elements.into_iter().map(|e| self.register(e)).collect())
    }

    async fn find_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<ElementHandle, DriverError> {
        let element = self
            .element(parent)?
            .find(locator(selector))
            .await
            .map_err(|e| map_lookup_error(selector, e))?;
        Ok(self.register(element))
    }

    async fn find_all_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let elements = self
            .element(parent)?
            .find_all(locator(selector))
            .await
            .map_err(|e| map_element_error(parent, e))?;
        Ok(elements.into_iter().map(|e| self.register(e)).collect())
    }

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        debug!("click {}", handle);
        self.element(handle)?
            .click()
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn text(&mut self, handle: &ElementHandle) -> Result<String, DriverError> {
        self.element(handle)?
            .text()
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn property(
        &mut self,
        handle: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.element(handle)?
            .prop(name)
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn rect(&mut self, handle: &ElementHandle) -> Result<Rect, DriverError> {
        let (x, y, width, height) = self
            .element(handle)?
            .rectangle()
            .await
            .map_err(|e| map_element_error(handle, e))?;
        Ok(Rect {
            x,
            y,
            width,
            height,
        })
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        element
            .clear()
            .await
            .map_err(|e| map_element_error(handle, e))?;
        element
            .send_keys(text)
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn press_enter(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        let enter: char = Key::Enter.into();
        self.element(handle)?
            .send_keys(&enter.to_string())
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn enter_frame(&mut self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.element(handle)?
            .clone()
            .enter_frame()
            .await
            .map_err(|e| map_element_error(handle, e))
    }

    async fn leave_frame(&mut self) -> Result<(), DriverError> {
        self.client()?.enter_frame(None).await.map_err(map_error)
    }

    async fn wait_for(
        &mut self,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let deadline = Instant::now() + timeout;
        let started = Instant::now();

        loop {
            match self.find(condition.selector()).await {
                Ok(handle) => match condition {
                    WaitCondition::Present(_) => return Ok(handle),
                    WaitCondition::Visible(_) => {
                        let shown = self
                            .element(&handle)?
                            .is_displayed()
                            .await
                            .unwrap_or(false);
                        if shown {
                            return Ok(handle);
                        }
                    }
                },
                Err(DriverError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    condition: condition.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn get_cookies(&mut self) -> Result<SessionCookies, DriverError> {
        let cookies = self
            .client()?
            .get_all_cookies()
            .await
            .map_err(|e| DriverError::Other(format!("Get cookies failed: {}", e)))?;

        Ok(cookies
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect())
    }
}
