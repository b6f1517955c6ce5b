//! ui
//!
//! User interaction utilities.

pub mod output;

pub use output::Verbosity;
