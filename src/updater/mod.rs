//! Update orchestration.
//!
//! This module provides:
//! - [`UpdateOrchestrator`], which sequences probing, release lookup,
//!   backup, download and installation
//! - [`BackupDecision`] for injecting the backup yes/no answer
//! - [`UpdateState`], [`Stage`], [`UpdatePlan`] and [`UpdateOutcome`]
//!   describing a run

pub mod decision;
pub mod orchestrator;
pub mod state;

pub use decision::BackupDecision;
pub use orchestrator::UpdateOrchestrator;
pub use state::{Stage, UpdateOutcome, UpdatePlan, UpdateState};
