// Connectivity waiter - block until the internet is reachable
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_ADDRESS, DEFAULT_PROBE_TIMEOUT};
use crate::domain::NetworkSettings;
use crate::port::ProcessRunner;

/// Pings a well-known address until a reply comes back
pub struct ConnectivityWaiter {
    runner: Arc<dyn ProcessRunner>,
    probe_address: IpAddr,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl ConnectivityWaiter {
    /// Waiter probing 8.8.8.8 once per second with a one second timeout
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            probe_address: DEFAULT_PROBE_ADDRESS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_settings(runner: Arc<dyn ProcessRunner>, settings: &NetworkSettings) -> Self {
        Self {
            runner,
            probe_address: settings.probe_address,
            probe_timeout: Duration::from_secs(settings.probe_timeout_secs.max(1)),
            poll_interval: Duration::from_secs(settings.poll_interval_secs.max(1)),
        }
    }

    /// Send one ping and report whether a reply arrived in time
    ///
    /// Every failure (no route, timeout, missing `ping`) reads as `false`.
    pub async fn is_connected(&self) -> bool {
        let args = [
            "-c1".to_string(),
            format!("-w{}", self.probe_timeout.as_secs()),
            self.probe_address.to_string(),
        ];
        match self.runner.run_silently("ping", &args).await {
            Ok(replied) => replied,
            Err(e) => {
                debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }

    /// Block until `is_connected` succeeds, probing once per interval
    ///
    /// No upper bound; wrap in `tokio::time::timeout` to give up early.
    pub async fn wait_for_connection(&self) {
        let started = Instant::now();
        info!(probe_address = %self.probe_address, "Checking internet connection");

        if self.is_connected().await {
            info!("Already connected");
            return;
        }

        info!("Not connected yet, waiting");
        let mut probes: u64 = 1;
        loop {
            sleep(self.poll_interval).await;
            probes += 1;
            if self.is_connected().await {
                break;
            }
            debug!(probes, elapsed_ms = started.elapsed().as_millis() as u64, "Still offline");
        }

        info!(
            probes,
            waited_ms = started.elapsed().as_millis() as u64,
            "Internet connection is now ready"
        );
    }
}
