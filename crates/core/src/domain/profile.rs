// Declarative profile model
// Replaces free-form profile scripts: the profile only names programs and rules,
// the ProfileRunner decides how to evaluate them.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use super::command::CommandParseError;
use super::error::{DomainError, Result};
use super::network::NetworkTable;

/// Marker substituted with the selected image path
pub const IMAGE_MARKER: &str = "{image}";

/// A user profile: known networks, programs to launch, optional wallpaper rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub locations: NetworkTable,
    pub network: NetworkSettings,
    pub background: Option<BackgroundRule>,
    #[serde(rename = "program")]
    pub programs: Vec<ProgramRule>,
}

/// One program the profile wants running
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramRule {
    pub command: String,
    pub is_running: Option<String>,
    /// Only launch while at one of these locations; empty means everywhere
    pub locations: Vec<String>,
    pub wait_for_network: bool,
    /// Pause after a fresh start so dependent programs find it up
    pub settle_secs: u64,
}

impl ProgramRule {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn is_gated(&self) -> bool {
        !self.locations.is_empty()
    }

    /// Whether the rule applies at `location` (`None` = unknown or offline)
    pub fn allowed_at(&self, location: Option<&str>) -> bool {
        if !self.is_gated() {
            return true;
        }
        location.is_some_and(|current| self.locations.iter().any(|l| l == current))
    }
}

/// Random wallpaper rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundRule {
    /// Shell command containing the `{image}` marker
    pub command: String,
    pub directory: String,
}

/// Connectivity probe settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSettings {
    pub probe_address: IpAddr,
    pub probe_timeout_secs: u64,
    pub poll_interval_secs: u64,
}

/// Address pinged to test connectivity (Google public DNS, anycast)
pub const DEFAULT_PROBE_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));

/// How long one ping waits for a reply (1s)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between connectivity probes while waiting (1s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            probe_address: DEFAULT_PROBE_ADDRESS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT.as_secs(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl Profile {
    pub fn needs_location(&self) -> bool {
        self.programs.iter().any(ProgramRule::is_gated)
    }

    /// Check the profile before anything is executed
    ///
    /// # Errors
    /// - `DomainError::InvalidCommand` if a program command is blank
    ///
    /// Commands are not tokenized here; a malformed one fails only its own launch.
    /// - `DomainError::UnknownLocation` if a gate names an undeclared location
    /// - `DomainError::ValidationError` for a bad background rule or zero intervals
    pub fn validate(&self) -> Result<()> {
        for rule in &self.programs {
            if rule.command.trim().is_empty() {
                return Err(CommandParseError::Empty.into());
            }
            if let Some(location) = rule
                .locations
                .iter()
                .find(|l| !self.locations.contains_location(l))
            {
                return Err(DomainError::UnknownLocation {
                    location: location.clone(),
                    command: rule.command.clone(),
                });
            }
        }

        if let Some(background) = &self.background {
            background.validate()?;
        }

        if self.network.probe_timeout_secs == 0 || self.network.poll_interval_secs == 0 {
            return Err(DomainError::ValidationError(
                "probe timeout and poll interval must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

impl BackgroundRule {
    pub fn validate(&self) -> Result<()> {
        if !self.command.contains(IMAGE_MARKER) {
            return Err(DomainError::ValidationError(format!(
                "background command must contain an {} marker",
                IMAGE_MARKER
            )));
        }
        if self.directory.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "background directory is empty".to_string(),
            ));
        }
        Ok(())
    }
}
