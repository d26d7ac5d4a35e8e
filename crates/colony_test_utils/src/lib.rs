//! # Colony Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Rule and colony fixtures built from the shipped data files
//! - Determinism test harness for multi-turn runs
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
