//! # Colony Development Tools
//!
//! Command-line tools for development:
//! - Data loading with path-aware errors
//! - Rule and colony validators
//! - Production reports over a number of turns

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data_loader;
pub mod report;
pub mod validate;
