//! Core logic for the homework status bot.
//!
//! This crate is framework-agnostic. Telegram lives behind `MessagingPort` in
//! the adapter crate; the Practicum API sits behind `HomeworkSource`.

pub mod alerts;
pub mod config;
pub mod domain;
pub mod errors;
pub mod homework;
pub mod logging;
pub mod messaging;
pub mod poller;
pub mod ports;
pub mod practicum;
pub mod utils;

pub use errors::{Error, Result};
