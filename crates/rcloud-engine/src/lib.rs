pub mod actions;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod overlay;
pub mod recording;
pub mod retry;
pub mod site;
pub mod transfer;

pub use rcloud_common::protocol;
