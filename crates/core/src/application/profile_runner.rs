// Profile runner - evaluates a declarative profile against injected capabilities
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::{BackgroundChanger, ConnectivityWaiter, Launcher, LocationResolver};
use crate::domain::{LaunchStatus, Profile, ProgramRule};
use crate::error::Result;

/// Everything a profile may do, handed in by the composition root
///
/// Profiles never get more than this: no free-form code, only these
/// operations.
#[derive(Clone)]
pub struct Capabilities {
    pub launcher: Arc<Launcher>,
    pub location: Arc<LocationResolver>,
    pub connectivity: Arc<ConnectivityWaiter>,
    pub background: Arc<BackgroundChanger>,
}

/// What happened to one program rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramOutcome {
    pub command: String,
    /// `None` when the rule was skipped by its location gate
    pub status: Option<LaunchStatus>,
}

impl ProgramOutcome {
    pub fn skipped(&self) -> bool {
        self.status.is_none()
    }
}

/// Result of the background rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BackgroundOutcome {
    Applied { image: String },
    Failed { error: String },
}

/// Summary of one profile evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileReport {
    /// Resolved location; `None` if unknown, offline, or never resolved
    pub location: Option<String>,
    pub location_checked: bool,
    pub waited_for_network: bool,
    pub background: Option<BackgroundOutcome>,
    pub programs: Vec<ProgramOutcome>,
}

impl ProfileReport {
    pub fn count(&self, status: LaunchStatus) -> usize {
        self.programs
            .iter()
            .filter(|p| p.status == Some(status))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.programs.iter().filter(|p| p.skipped()).count()
    }

    /// True when no program ended in `not_installed` or `unspecified_error`
    pub fn all_ok(&self) -> bool {
        self.programs
            .iter()
            .all(|p| p.status.map_or(true, LaunchStatus::is_running))
    }
}

/// Evaluates profiles rule by rule, in document order
pub struct ProfileRunner {
    capabilities: Capabilities,
}

impl ProfileRunner {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// Evaluate `profile`
    ///
    /// 1. validate the profile (nothing runs if it's invalid; a malformed
    ///    command only fails its own rule)
    /// 2. resolve the location once, only if some rule is location-gated
    /// 3. apply the background rule; failures are reported, not fatal
    /// 4. launch each program whose gate allows the current location,
    ///    waiting for connectivity the first time a rule asks for it
    ///
    /// # Errors
    /// - AppError::Domain if the profile fails validation
    pub async fn run(&self, profile: &Profile) -> Result<ProfileReport> {
        profile.validate()?;
        let caps = &self.capabilities;
        let mut report = ProfileReport::default();

        if profile.needs_location() {
            report.location = caps.location.resolve_location(&profile.locations).await;
            report.location_checked = true;
        }

        if let Some(rule) = &profile.background {
            report.background = Some(match caps.background.apply(rule).await {
                Ok(image) => BackgroundOutcome::Applied {
                    image: image.display().to_string(),
                },
                Err(e) => {
                    warn!(error = %e, "Failed to set background");
                    BackgroundOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            });
        }

        for rule in &profile.programs {
            let outcome = self.run_program(rule, &mut report).await;
            report.programs.push(outcome);
        }

        info!(
            location = ?report.location,
            started = report.count(LaunchStatus::Started),
            already_running = report.count(LaunchStatus::AlreadyRunning),
            skipped = report.skipped(),
            "Profile evaluated"
        );

        Ok(report)
    }

    async fn run_program(&self, rule: &ProgramRule, report: &mut ProfileReport) -> ProgramOutcome {
        let caps = &self.capabilities;

        if !rule.allowed_at(report.location.as_deref()) {
            info!(
                command = %rule.command,
                gate = ?rule.locations,
                location = ?report.location,
                "Skipping program outside its locations"
            );
            return ProgramOutcome {
                command: rule.command.clone(),
                status: None,
            };
        }

        if rule.wait_for_network && !report.waited_for_network {
            caps.connectivity.wait_for_connection().await;
            report.waited_for_network = true;
        }

        let status = caps
            .launcher
            .launch(&rule.command, rule.is_running.as_deref())
            .await;

        if status == LaunchStatus::Started && rule.settle_secs > 0 {
            info!(command = %rule.command, settle_secs = rule.settle_secs, "Letting program settle");
            sleep(Duration::from_secs(rule.settle_secs)).await;
        }

        ProgramOutcome {
            command: rule.command.clone(),
            status: Some(status),
        }
    }
}
