use crate::protocol::{ElementHandle, Selector};

/// Failures reported by a session driver.
///
/// Drivers never retry on their own; callers decide whether an error is worth
/// another attempt.
#[derive(thiserror::Error, Debug, Clone)]
pub enum DriverError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("No element matches {selector}")]
    NotFound { selector: Selector },

    #[error("Element {handle} is stale (page was reloaded)")]
    ElementStale { handle: ElementHandle },

    #[error("Element {handle} is not interactable: {reason}")]
    NotInteractable {
        handle: ElementHandle,
        reason: String,
    },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Timed out after {waited_ms}ms waiting for {condition}")]
    Timeout { condition: String, waited_ms: u64 },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("Other: {0}")]
    Other(String),
}
