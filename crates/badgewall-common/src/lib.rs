//! # badgewall-common
//!
//! Shared models, configuration, error handling, and the badge catalogue used by
//! the Badge Wall crates. No I/O beyond loading configuration lives here.

pub mod badge;
pub mod config;
pub mod error;
pub mod models;
