//! aztier CLI library
//!
//! Commands, configuration and run state of the `aztier` binary, exposed for
//! integration testing.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
