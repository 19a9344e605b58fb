//! The update run.

use crate::backup::{BackupManager, BackupRecord};
use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::install::InstallationSwapper;
use crate::probe::VersionProbe;
use crate::release::{ProgressCallback, ReleaseClient};
use crate::version::InstalledVersion;

use super::decision::BackupDecision;
use super::state::{Stage, UpdateOutcome, UpdatePlan, UpdateState};

/// Runs probe → compare → backup → download → install, strictly in order.
///
/// Nothing is retried: the first failing stage ends the run and is
/// reported in the outcome. A failed backup stops the run before anything
/// is downloaded.
///
/// # Example
///
/// ```no_run
/// use factorio_updater::config::UpdaterConfig;
/// use factorio_updater::updater::UpdateOrchestrator;
///
/// let mut updater = UpdateOrchestrator::new(UpdaterConfig::for_root("/opt/factorio")).unwrap();
/// // Back up whenever an update is about to happen.
/// let outcome = updater.run(&mut true);
/// println!("{}", outcome);
/// ```
#[derive(Debug)]
pub struct UpdateOrchestrator {
    config: UpdaterConfig,
    probe: VersionProbe,
    releases: ReleaseClient,
    backups: BackupManager,
    swapper: InstallationSwapper,
    history: Vec<UpdateState>,
    plan: Option<UpdatePlan>,
}

impl UpdateOrchestrator {
    /// Build the components for the installation described by `config`.
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        let releases = ReleaseClient::new(&config)?;
        let probe = VersionProbe::new(config.binary_path());
        let backups = BackupManager::new(config.backup_dir());
        let swapper = InstallationSwapper::new(&config.install_root, &config.product)
            .with_preserve(config.preserve.clone());

        Ok(Self {
            config,
            probe,
            releases,
            backups,
            swapper,
            history: vec![UpdateState::Idle],
            plan: None,
        })
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// States visited by the most recent run, in order.
    pub fn history(&self) -> &[UpdateState] {
        &self.history
    }

    /// The current state.
    pub fn state(&self) -> UpdateState {
        self.history.last().copied().unwrap_or(UpdateState::Idle)
    }

    /// The plan computed by the most recent run or check.
    pub fn last_plan(&self) -> Option<&UpdatePlan> {
        self.plan.as_ref()
    }

    /// Find the installed and latest versions without changing anything.
    pub fn check(&mut self) -> Result<UpdatePlan> {
        self.begin();
        self.plan_update().map_err(|(_, e)| {
            self.advance(UpdateState::Failed);
            e
        })
    }

    /// Run a full update.
    pub fn run(&mut self, decision: &mut dyn BackupDecision) -> UpdateOutcome {
        self.run_with_progress(decision, None)
    }

    /// Run a full update, reporting download progress to `progress`.
    pub fn run_with_progress(
        &mut self,
        decision: &mut dyn BackupDecision,
        progress: Option<ProgressCallback<'_>>,
    ) -> UpdateOutcome {
        self.begin();

        let plan = match self.plan_update() {
            Ok(plan) => plan,
            Err((stage, error)) => return self.fail(stage, error),
        };

        let latest = plan.latest.version;
        if let InstalledVersion::Known(version) = plan.current {
            if !plan.update_needed() {
                tracing::info!("Installed version {} is up to date", version);
                return UpdateOutcome::UpToDate { version, latest };
            }
        }
        tracing::info!("Updating {} -> {}", plan.current, latest);

        let backup = match self.backup_stage(&plan, decision) {
            Ok(backup) => backup,
            Err(error) => return self.fail(Stage::Backup, error),
        };

        let artifact = match self.releases.download_artifact(
            &plan.latest,
            &self.config.download_dir(),
            progress,
        ) {
            Ok(artifact) => artifact,
            Err(error) => return self.fail(Stage::Download, error),
        };
        self.advance(UpdateState::Downloaded);

        if let Err(error) = self.swapper.install(&artifact.path) {
            if let Some(record) = &backup {
                tracing::warn!(
                    "Installation unchanged; backup kept at {}",
                    record.archive.display()
                );
            }
            return self.fail(Stage::Install, error);
        }
        self.advance(UpdateState::Installed);

        UpdateOutcome::Installed {
            previous: plan.current,
            version: latest,
            backup,
            artifact,
        }
    }

    fn begin(&mut self) {
        self.history.clear();
        self.plan = None;
        self.advance(UpdateState::Idle);
    }

    fn advance(&mut self, state: UpdateState) {
        tracing::debug!(?state, "Update state");
        self.history.push(state);
    }

    fn fail(&mut self, stage: Stage, error: UpdaterError) -> UpdateOutcome {
        tracing::error!("Update failed during {}: {}", stage, error);
        self.advance(UpdateState::Failed);
        UpdateOutcome::Failed { stage, error }
    }

    /// Probe local, fetch remote, compare.
    fn plan_update(&mut self) -> std::result::Result<UpdatePlan, (Stage, UpdaterError)> {
        let current = match self.probe.probe() {
            Ok(version) => version,
            Err(UpdaterError::ExecutableNotFound { path }) => {
                tracing::info!(
                    "No server executable at {}, treating as a fresh install",
                    path.display()
                );
                InstalledVersion::Unknown
            }
            Err(e) => return Err((Stage::ProbeLocal, e)),
        };
        self.advance(UpdateState::ProbedLocal);

        let latest = self
            .releases
            .fetch_latest_descriptor()
            .map_err(|e| (Stage::FetchMetadata, e))?;
        self.advance(UpdateState::ProbedRemote);

        let plan = UpdatePlan { current, latest };
        self.advance(UpdateState::Decided {
            update_needed: plan.update_needed(),
        });
        self.plan = Some(plan.clone());
        Ok(plan)
    }

    fn backup_stage(
        &mut self,
        plan: &UpdatePlan,
        decision: &mut dyn BackupDecision,
    ) -> Result<Option<BackupRecord>> {
        let product_dir = self.config.product_dir();
        if !product_dir.is_dir() {
            tracing::info!("Nothing to back up at {}", product_dir.display());
            self.advance(UpdateState::BackedUp { skipped: true });
            return Ok(None);
        }

        if !decision.should_backup(plan)? {
            tracing::info!("Backup declined, continuing without one");
            self.advance(UpdateState::BackedUp { skipped: true });
            return Ok(None);
        }

        let record = self.backups.backup(&product_dir)?;
        self.advance(UpdateState::BackedUp { skipped: false });
        Ok(Some(record))
    }
}
