//! Proxy bypass rules.
//!
//! # Rules
//! - Entries are comma-separated, trimmed and lower-cased; empty entries are skipped
//! - `*` bypasses every destination
//! - CIDR entries (`10.0.0.0/8`, `fd00::/8`) match IP-literal hosts in the network
//! - IP entries, optionally with a port (`10.1.2.3:8080`, `[::1]:443`), match equal hosts
//! - `example.com` matches the domain and its subdomains
//! - `.example.com` and `*.example.com` match subdomains only
//! - Domains are compared in their IDNA ASCII form
//! - A port on a domain or IP entry must equal the destination's effective port
//!
//! `localhost` and loopback addresses always bypass the proxy.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// Parsed no-proxy list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoProxy {
    all: bool,
    rules: Vec<BypassRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BypassRule {
    Cidr {
        network: IpAddr,
        prefix_len: u8,
    },
    Ip {
        ip: IpAddr,
        port: Option<u16>,
    },
    Domain {
        /// Always starts with '.'.
        suffix: String,
        port: Option<u16>,
        /// Also match the bare domain, not only subdomains.
        match_host: bool,
    },
}

impl NoProxy {
    /// Parse a comma-separated no-proxy list.
    pub fn parse(list: &str) -> Self {
        let mut no_proxy = NoProxy::default();

        for entry in list.split(',') {
            let entry = entry.trim().to_ascii_lowercase();
            if entry.is_empty() {
                continue;
            }
            if entry == "*" {
                no_proxy.all = true;
                no_proxy.rules.clear();
                break;
            }
            if let Some(rule) = parse_entry(&entry) {
                no_proxy.rules.push(rule);
            }
        }

        no_proxy
    }

    /// True when the list has no entries.
    pub fn is_empty(&self) -> bool {
        !self.all && self.rules.is_empty()
    }

    /// Whether requests to `target` must go direct.
    pub fn bypasses(&self, target: &Url) -> bool {
        let Some(host) = target.host() else {
            return false;
        };
        let port = target.port_or_known_default();

        let (host, ip) = match host {
            Host::Domain(domain) => {
                if domain == "localhost" {
                    return true;
                }
                (domain.to_ascii_lowercase(), None)
            }
            Host::Ipv4(v4) => (v4.to_string(), Some(IpAddr::V4(v4))),
            Host::Ipv6(v6) => (v6.to_string(), Some(IpAddr::V6(v6))),
        };

        if ip.is_some_and(|ip| ip.to_canonical().is_loopback()) {
            return true;
        }
        if self.all {
            return true;
        }

        self.rules.iter().any(|rule| rule.matches(&host, ip, port))
    }
}

impl BypassRule {
    fn matches(&self, host: &str, ip: Option<IpAddr>, port: Option<u16>) -> bool {
        match self {
            BypassRule::Cidr {
                network,
                prefix_len,
            } => ip.is_some_and(|ip| ip_in_subnet(ip, *network, *prefix_len)),
            BypassRule::Ip { ip: rule_ip, port: rule_port } => {
                ip == Some(*rule_ip) && port_matches(*rule_port, port)
            }
            BypassRule::Domain {
                suffix,
                port: rule_port,
                match_host,
            } => {
                let hit = host.ends_with(suffix.as_str()) || (*match_host && host == &suffix[1..]);
                hit && port_matches(*rule_port, port)
            }
        }
    }
}

fn port_matches(rule_port: Option<u16>, port: Option<u16>) -> bool {
    rule_port.is_none() || rule_port == port
}

fn parse_entry(entry: &str) -> Option<BypassRule> {
    if let Some((network, prefix_len)) = parse_cidr_pattern(entry) {
        return Some(BypassRule::Cidr {
            network,
            prefix_len,
        });
    }

    let (host, port) = split_host_port(entry)?;

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(BypassRule::Ip { ip, port });
    }

    let (name, match_host) = match host.strip_prefix("*.").or_else(|| host.strip_prefix('.')) {
        Some(name) => (name, false),
        None => (host, true),
    };
    if name.is_empty() {
        return None;
    }

    Some(BypassRule::Domain {
        suffix: format!(".{}", ascii_domain(name)),
        port,
        match_host,
    })
}

/// IDNA-encode `name` the way request hosts are encoded; unencodable names are kept as-is.
fn ascii_domain(name: &str) -> String {
    match Host::parse(name) {
        Ok(Host::Domain(domain)) => domain,
        _ => name.to_string(),
    }
}

/// Split `host:port`, `[v6]:port`, `[v6]` or a bare host.
///
/// An empty port (`host:`) counts as no port. Returns `None` when a port is
/// present but not a valid number.
fn split_host_port(entry: &str) -> Option<(&str, Option<u16>)> {
    if let Some(rest) = entry.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return match tail.strip_prefix(':') {
            Some(port) => Some((host, parse_port(port)?)),
            None if tail.is_empty() => Some((host, None)),
            None => None,
        };
    }

    match entry.matches(':').count() {
        1 => {
            let (host, port) = entry.rsplit_once(':')?;
            Some((host, parse_port(port)?))
        }
        // Bare IPv6 literal or plain host.
        _ => Some((entry, None)),
    }
}

fn parse_port(port: &str) -> Option<Option<u16>> {
    if port.is_empty() {
        return Some(None);
    }
    port.parse().ok().map(Some)
}

/// Parse a CIDR pattern (e.g., "192.168.1.0/24" or "2001:db8::/32").
fn parse_cidr_pattern(pattern: &str) -> Option<(IpAddr, u8)> {
    let (network, prefix) = pattern.split_once('/')?;
    let network: IpAddr = network.parse().ok()?;
    let prefix_len: u8 = prefix.parse().ok()?;

    let max_prefix = match network {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    (prefix_len <= max_prefix).then_some((network, prefix_len))
}

fn ip_in_subnet(ip: IpAddr, network: IpAddr, prefix_len: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => ipv4_in_subnet(ip, net, prefix_len),
        (IpAddr::V6(ip), IpAddr::V6(net)) => ipv6_in_subnet(ip, net, prefix_len),
        _ => false,
    }
}

fn ipv4_in_subnet(ip: Ipv4Addr, network: Ipv4Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    let mask = u32::MAX << (32 - u32::from(prefix_len));
    (u32::from(ip) & mask) == (u32::from(network) & mask)
}

fn ipv6_in_subnet(ip: Ipv6Addr, network: Ipv6Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    let mask = u128::MAX << (128 - u32::from(prefix_len));
    (u128::from(ip) & mask) == (u128::from(network) & mask)
}
