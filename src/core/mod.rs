//! core
//!
//! Domain types, path routing, and configuration.
//!
//! Nothing in this module touches the network or the git object store; it
//! defines the vocabulary the rest of the crate speaks.

pub mod config;
pub mod paths;
pub mod types;
