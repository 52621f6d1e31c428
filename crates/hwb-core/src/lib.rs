//! Core domain + application logic for the homework review notifier.
//!
//! This crate is intentionally framework-agnostic. The review API (reqwest) and
//! Telegram (teloxide) live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod homework;
pub mod logging;
pub mod poller;
pub mod ports;

pub use errors::{Error, ErrorKind, Result};
