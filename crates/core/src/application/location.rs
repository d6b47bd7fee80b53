// Location resolver - physical location from the gateway's MAC address
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::network::{parse_default_gateway, parse_neighbor_mac};
use crate::domain::{GatewayIdentity, NetworkTable};
use crate::port::ProcessRunner;

/// Determines which known network the machine is on
///
/// Works by matching the MAC address of the current gateway against known
/// addresses. Networks usually have a physical location, so the network
/// names the place. Nothing is cached: the network can change between calls.
pub struct LocationResolver {
    runner: Arc<dyn ProcessRunner>,
}

impl LocationResolver {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Name of the location whose gateway list contains the current gateway
    ///
    /// # Returns
    /// - `Some(name)` for the first matching location in table order
    /// - `None` when offline, when discovery fails, or when the gateway is unknown
    ///
    /// # Example
    /// ```text
    /// let table: NetworkTable = [
    ///     ("home", vec!["84:9C:A6:76:23:8E"]),
    ///     ("office", vec!["00:15:C5:5F:92:79", "B6:25:B2:19:28:61"]),
    /// ].into_iter().collect();
    /// let location = resolver.resolve_location(&table).await;
    /// ```
    pub async fn resolve_location(&self, table: &NetworkTable) -> Option<String> {
        let Some(gateway) = self.discover_gateway().await else {
            info!("Failed to determine gateway, assuming network connection is down");
            return None;
        };

        match table.match_mac(&gateway.mac) {
            Some(name) => {
                info!(location = %name, gateway_mac = %gateway.mac, "Connected to known network");
                Some(name.to_string())
            }
            None => {
                info!(
                    gateway_mac = %gateway.mac,
                    "Not connected to a known network (unknown gateway MAC address)"
                );
                None
            }
        }
    }

    /// Current gateway IP and MAC, if both can be found
    pub async fn discover_gateway(&self) -> Option<GatewayIdentity> {
        let ip = self.find_gateway_address().await?;
        let mac = self.find_gateway_mac(Some(ip)).await?;
        Some(GatewayIdentity { ip, mac })
    }

    /// IP address of the default route's next hop, from `ip route`
    pub async fn find_gateway_address(&self) -> Option<IpAddr> {
        debug!("Looking for IP address of current gateway");
        let routes = match self.runner.capture("ip", &["route".to_string()]).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Routing table query failed");
                return None;
            }
        };

        let ip = parse_default_gateway(&routes);
        match ip {
            Some(ip) => debug!(gateway_ip = %ip, "Found gateway IP address"),
            None => debug!("No default route present"),
        }
        ip
    }

    /// MAC address for `ip` from the neighbor table
    ///
    /// Queries `arp -n`, falling back to `ip neigh show` when `arp` is
    /// unavailable. Returns `None` immediately when `ip` is `None`.
    pub async fn find_gateway_mac(&self, ip: Option<IpAddr>) -> Option<String> {
        let ip = ip?;
        debug!(gateway_ip = %ip, "Looking for MAC address of current gateway");

        let neighbors = match self.runner.capture("arp", &["-n".to_string()]).await {
            Ok(output) => output,
            Err(arp_error) => {
                debug!(error = %arp_error, "arp unavailable, falling back to ip neigh");
                match self
                    .runner
                    .capture("ip", &["neigh".to_string(), "show".to_string()])
                    .await
                {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(error = %e, "Neighbor table query failed");
                        return None;
                    }
                }
            }
        };

        let mac = parse_neighbor_mac(&neighbors, ip);
        match &mac {
            Some(mac) => debug!(gateway_mac = %mac, "Found gateway MAC address"),
            None => debug!(gateway_ip = %ip, "Gateway missing from neighbor table"),
        }
        mac
    }
}
