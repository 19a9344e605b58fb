//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`], which also loads the configuration.

pub mod backup;
pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod update;

pub use dispatcher::{
    Command, CommandDispatcher, CommandResult, EXIT_CONFIG_ERROR, EXIT_FAILURE,
};
