// Network location model and OS table parsing
// Parsers are pure so the routing/neighbor formats can be tested without a network.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

/// A named network and the gateway MAC addresses that identify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub macs: Vec<String>,
}

/// Location name -> known gateway MACs, in caller-supplied order
///
/// Order matters: when a MAC is listed under more than one location the
/// first location in iteration order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkTable {
    locations: Vec<Location>,
}

impl NetworkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location; a repeated name extends the existing entry
    pub fn insert<N, I, M>(&mut self, name: N, macs: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let name = name.into();
        let macs = macs.into_iter().map(Into::into);
        match self.locations.iter_mut().find(|l| l.name == name) {
            Some(existing) => existing.macs.extend(macs),
            None => self.locations.push(Location {
                name,
                macs: macs.collect(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn contains_location(&self, name: &str) -> bool {
        self.locations.iter().any(|l| l.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// First location whose list contains `mac`, compared case-insensitively
    pub fn match_mac(&self, mac: &str) -> Option<&str> {
        self.locations
            .iter()
            .find(|l| l.macs.iter().any(|known| known.eq_ignore_ascii_case(mac)))
            .map(|l| l.name.as_str())
    }
}

impl<N, I, M> FromIterator<(N, I)> for NetworkTable
where
    N: Into<String>,
    I: IntoIterator<Item = M>,
    M: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut table = NetworkTable::new();
        for (name, macs) in iter {
            table.insert(name, macs);
        }
        table
    }
}

impl Serialize for NetworkTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.locations.len()))?;
        for location in &self.locations {
            map.serialize_entry(&location.name, &location.macs)?;
        }
        map.end()
    }
}

struct NetworkTableVisitor;

impl<'de> Visitor<'de> for NetworkTableVisitor {
    type Value = NetworkTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of location names to lists of MAC addresses")
    }

    // Entries arrive in document order; keep it.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = NetworkTable::new();
        while let Some((name, macs)) = access.next_entry::<String, Vec<String>>()? {
            table.insert(name, macs);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for NetworkTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NetworkTableVisitor)
    }
}

/// Gateway discovered for the current network; never cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayIdentity {
    pub ip: IpAddr,
    pub mac: String,
}

/// Find the next hop of the default route in `ip route` output
///
/// Only rows starting with `default via <ip>` count; rows whose third word
/// is not an IP address are skipped.
pub fn parse_default_gateway(route_table: &str) -> Option<IpAddr> {
    route_table.lines().find_map(|line| {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        tracing::debug!(tokens = ?tokens, "Parsing routing table row");
        match tokens.as_slice() {
            ["default", "via", ip, ..] => ip.parse().ok(),
            _ => None,
        }
    })
}

/// Find the hardware address for `ip` in a neighbor table
///
/// Accepts both `arp -n` rows (`ip hwtype mac flags iface`) and
/// `ip neigh` rows (`ip dev iface lladdr mac state`). Rows whose address
/// column is not MAC-shaped, such as `(incomplete)`, are skipped.
pub fn parse_neighbor_mac(neighbor_table: &str, ip: IpAddr) -> Option<String> {
    let wanted = ip.to_string();
    neighbor_table.lines().find_map(|line| {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        tracing::debug!(tokens = ?tokens, "Parsing neighbor table row");
        if tokens.first() != Some(&wanted.as_str()) {
            return None;
        }
        let candidate = match tokens.iter().position(|t| *t == "lladdr") {
            Some(idx) => tokens.get(idx + 1),
            None => tokens.get(2),
        }?;
        looks_like_mac(candidate).then(|| candidate.to_string())
    })
}

/// Six hex octets separated by `:` or `-`
pub fn looks_like_mac(value: &str) -> bool {
    let octets: Vec<&str> = value.split(|c| c == ':' || c == '-').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP_ROUTE: &str = "\
default via 192.168.1.1 dev eth0 proto dhcp metric 100
10.8.0.0/24 dev tun0 proto kernel scope link src 10.8.0.2
192.168.1.0/24 dev eth0 proto kernel scope link src 192.168.1.23 metric 100
";

    const ARP_N: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.7              ether   3c:22:fb:11:aa:01   C                     eth0
192.168.1.1              ether   84:9c:a6:76:23:8e   C                     eth0
";

    #[test]
    fn test_parse_default_gateway() {
        assert_eq!(
            parse_default_gateway(IP_ROUTE),
            Some("192.168.1.1".parse().unwrap())
        );
        assert_eq!(
            parse_default_gateway("default via 192.168.1.1 dev eth0"),
            Some("192.168.1.1".parse().unwrap())
        );
    }

    #[test]
    fn test_parse_default_gateway_ignores_other_rows() {
        assert_eq!(parse_default_gateway("10.0.0.0/8 via 10.0.0.1 dev eth1"), None);
        assert_eq!(parse_default_gateway("default dev wg0 scope link"), None);
        assert_eq!(parse_default_gateway(""), None);
        // Malformed row is skipped, later valid row still found
        assert_eq!(
            parse_default_gateway("default via garbage\ndefault via 10.0.0.1 dev eth1"),
            Some("10.0.0.1".parse().unwrap())
        );
    }

    #[test]
    fn test_parse_neighbor_mac_arp_format() {
        let ip = "192.168.1.1".parse().unwrap();
        assert_eq!(
            parse_neighbor_mac(ARP_N, ip),
            Some("84:9c:a6:76:23:8e".to_string())
        );
        assert_eq!(
            parse_neighbor_mac("192.168.1.1 ether 84:9c:a6:76:23:8e C", ip),
            Some("84:9c:a6:76:23:8e".to_string())
        );
    }

    #[test]
    fn test_parse_neighbor_mac_ip_neigh_format() {
        let table = "192.168.1.1 dev wlan0 lladdr 00:15:c5:5f:92:79 REACHABLE\n";
        assert_eq!(
            parse_neighbor_mac(table, "192.168.1.1".parse().unwrap()),
            Some("00:15:c5:5f:92:79".to_string())
        );
    }

    #[test]
    fn test_parse_neighbor_mac_skips_incomplete_and_missing() {
        let table = "192.168.1.1 (incomplete) eth0\n";
        assert_eq!(parse_neighbor_mac(table, "192.168.1.1".parse().unwrap()), None);
        assert_eq!(parse_neighbor_mac(ARP_N, "10.0.0.1".parse().unwrap()), None);
        // Prefix match is not enough: 192.168.1.10 must not match 192.168.1.1
        let table = "192.168.1.10 ether aa:bb:cc:dd:ee:ff C eth0\n";
        assert_eq!(parse_neighbor_mac(table, "192.168.1.1".parse().unwrap()), None);
    }

    #[test]
    fn test_looks_like_mac() {
        assert!(looks_like_mac("84:9c:a6:76:23:8e"));
        assert!(looks_like_mac("84-9C-A6-76-23-8E"));
        assert!(!looks_like_mac("eth0"));
        assert!(!looks_like_mac("84:9c:a6:76:23"));
        assert!(!looks_like_mac("84:9c:a6:76:23:8g"));
    }

    #[test]
    fn test_match_mac_is_case_insensitive() {
        let table: NetworkTable = [("home", vec!["AA:BB:CC:DD:EE:FF"])].into_iter().collect();
        assert_eq!(table.match_mac("aa:bb:cc:dd:ee:ff"), Some("home"));
        assert_eq!(table.match_mac("11:22:33:44:55:66"), None);
    }

    #[test]
    fn test_match_mac_first_location_wins_on_duplicates() {
        let table: NetworkTable = [
            ("office", vec!["00:15:C5:5F:92:79"]),
            ("home", vec!["84:9C:A6:76:23:8E", "00:15:c5:5f:92:79"]),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.match_mac("00:15:c5:5f:92:79"), Some("office"));
    }

    #[test]
    fn test_deserialize_preserves_document_order() {
        let table: NetworkTable = serde_json::from_str(
            r#"{"zeta": ["00:00:00:00:00:01"], "alpha": ["00:00:00:00:00:01"]}"#,
        )
        .unwrap();
        let names: Vec<&str> = table.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(table.match_mac("00:00:00:00:00:01"), Some("zeta"));
    }

    #[test]
    fn test_insert_merges_repeated_names() {
        let mut table = NetworkTable::new();
        table.insert("home", ["aa:aa:aa:aa:aa:aa"]);
        table.insert("home", ["bb:bb:bb:bb:bb:bb"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.match_mac("BB:BB:BB:BB:BB:BB"), Some("home"));
    }
}
