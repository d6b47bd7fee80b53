// Application constants (no magic values in the services)
use std::time::Duration;

pub use crate::domain::profile::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_ADDRESS, DEFAULT_PROBE_TIMEOUT,
};

/// Upper bound for routing/neighbor queries and liveness checks (5s)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shell used for liveness checks and detached launches
pub const SHELL: &str = "sh";

/// File extensions accepted as wallpapers (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
