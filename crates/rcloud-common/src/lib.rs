pub mod error;
pub mod protocol;

pub use error::DriverError;
pub use protocol::{ElementHandle, Rect, Selector, SessionCookies, WaitCondition};
