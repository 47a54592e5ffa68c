pub mod backend;
pub mod geckodriver;
pub mod webdriver;

pub use backend::{BrowserOptions, WebDriverSession};
