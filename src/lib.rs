#![deny(missing_docs)]
//! Paper poll bot library.
//!
//! A Telegram bot that collects paper links posted with a submission tag
//! and turns the collected list into a poll or a text digest.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Paper registry, link extraction, title resolution and projections
pub mod papers;
/// Utility functions.
pub mod utils;
