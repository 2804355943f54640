//! modroute CLI library
//!
//! This library exposes the CLI commands for programmatic use and testing.

pub mod commands;
pub mod logging;
