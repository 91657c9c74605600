//! Hand-rolled IPv4 CIDR parsing and matching, used by `Allow`/`Deny`
//! (§4.7) and the brute-force whitelist (§4.8).
//!
//! Hand-rolled rather than pulled from a CIDR crate, in the same spirit as
//! the `daemon` module's own host/IP allow-deny matching behind a small
//! `permits(peer, hostname)` surface instead of `ipnetwork`/`ipnet`.

use std::net::Ipv4Addr;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Parses `"all"`, a bare address, or an `addr/prefix` pair. `"all"` is
    /// represented as `0.0.0.0/0`, matching every address.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("all") {
            return Some(Self {
                network: Ipv4Addr::new(0, 0, 0, 0),
                prefix_len: 0,
            });
        }
        let (addr_part, prefix_len) = match text.split_once('/') {
            Some((addr, prefix)) => (addr, prefix.parse::<u8>().ok()?),
            None => (text, 32),
        };
        if prefix_len > 32 {
            return None;
        }
        let network: Ipv4Addr = addr_part.parse().ok()?;
        Some(Self { network, prefix_len }.normalized())
    }

    fn normalized(self) -> Self {
        let mask = Self::mask(self.prefix_len);
        let network = Ipv4Addr::from(u32::from(self.network) & mask);
        Self {
            network,
            prefix_len: self.prefix_len,
        }
    }

    fn mask(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - prefix_len)
        }
    }

    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = Self::mask(self.prefix_len);
        (u32::from(addr) & mask) == (u32::from(self.network) & mask)
    }
}

/// Parses a whitespace/comma-separated list of CIDRs (as used by
/// `AllowFrom`/`DenyFrom` values and `BruteForceWhitelist`) and checks
/// whether `addr` matches any entry.
#[must_use]
pub fn list_contains(list: &str, addr: Ipv4Addr) -> bool {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
        .filter_map(Ipv4Cidr::parse)
        .any(|cidr| cidr.contains(addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_everything() {
        let cidr = Ipv4Cidr::parse("all").unwrap();
        assert!(cidr.contains(Ipv4Addr::new(203, 0, 113, 7)));
    }

    #[test]
    fn prefix_match() {
        let cidr = Ipv4Cidr::parse("10.0.0.0/8").unwrap();
        assert!(cidr.contains(Ipv4Addr::new(10, 1, 2, 3)));
        assert!(!cidr.contains(Ipv4Addr::new(11, 0, 0, 1)));
    }

    #[test]
    fn bare_address_is_prefix_32() {
        let cidr = Ipv4Cidr::parse("192.168.1.1").unwrap();
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 1, 1)));
        assert!(!cidr.contains(Ipv4Addr::new(192, 168, 1, 2)));
    }

    #[test]
    fn list_contains_comma_and_space_separated() {
        assert!(list_contains("10.0.0.1, 192.168.0.0/16", Ipv4Addr::new(192, 168, 5, 5)));
        assert!(!list_contains("10.0.0.1 192.168.0.0/16", Ipv4Addr::new(172, 16, 0, 1)));
    }
}
