use async_trait::async_trait;
pub use rcloud_common::error::DriverError;
use rcloud_common::protocol::{ElementHandle, Rect, Selector, SessionCookies, WaitCondition};
use std::time::Duration;

/// The interactive session every browser backend implements.
///
/// All calls block the caller until the browser answers. Nothing in this layer
/// retries; retry policy belongs to the callers.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Launch the browser (start or connect to a WebDriver session).
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// Close the browser session and clean up resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    async fn is_ready(&self) -> bool;

    /// Navigate to a URL. Invalidates every handle issued for the previous page.
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Find the first element matching `selector` in the current document.
    async fn find(&mut self, selector: &Selector) -> Result<ElementHandle, DriverError>;

    /// Find every element matching `selector`, in document order. Empty is not an error.
    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError>;

    async fn find_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<ElementHandle, DriverError>;

    async fn find_all_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    /// Rendered text of the element.
    async fn text(&mut self, handle: &ElementHandle) -> Result<String, DriverError>;

    /// Resolved DOM property (e.g. an absolute `href`).
    async fn property(
        &mut self,
        handle: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn rect(&mut self, handle: &ElementHandle) -> Result<Rect, DriverError>;

    /// Clear an input and type `text` into it.
    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Send the Enter key to an element (submits login forms).
    async fn press_enter(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    /// Switch lookups into the given iframe.
    async fn enter_frame(&mut self, handle: &ElementHandle) -> Result<(), DriverError>;

    /// Switch lookups back to the top-level document.
    async fn leave_frame(&mut self) -> Result<(), DriverError>;

    /// Block until `condition` holds or `timeout` elapses.
    async fn wait_for(
        &mut self,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    /// Snapshot of all cookies of the current session.
    async fn get_cookies(&mut self) -> Result<SessionCookies, DriverError>;
}
