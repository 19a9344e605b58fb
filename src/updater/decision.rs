//! Backup decision providers.
//!
//! The orchestrator never asks the operator anything itself. Whether to
//! back up is answered by a [`BackupDecision`]: a fixed `bool`, a closure,
//! or the CLI's prompt adapter.

use super::state::UpdatePlan;
use crate::error::Result;

/// Decides whether to back up the installation before updating it.
pub trait BackupDecision {
    /// Called once per run, only when an update is needed and there is an
    /// installation to back up.
    fn should_backup(&mut self, plan: &UpdatePlan) -> Result<bool>;
}

impl BackupDecision for bool {
    fn should_backup(&mut self, _plan: &UpdatePlan) -> Result<bool> {
        Ok(*self)
    }
}

impl<F> BackupDecision for F
where
    F: FnMut(&UpdatePlan) -> bool,
{
    fn should_backup(&mut self, plan: &UpdatePlan) -> Result<bool> {
        Ok(self(plan))
    }
}
