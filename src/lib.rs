//! `catalog-mirror` library crate.
//!
//! The binary (`mirror`) is a thin wrapper around this library so that:
//!
//! - the fetch/resolve/render pipeline is testable without a server or network
//! - the HTTP handler and the CLI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod render;
pub mod server;

#[cfg(test)]
pub(crate) mod test_utils;
