//! Per-IP brute-force throttling (§4.8): a process-wide store keyed by
//! effective client IP, plus the state machine that decides whether a
//! request proceeds, gets throttled, or gets blocked.
//!
//! Like [`crate::cache::ParseCache`], this is built on `dashmap::DashMap`:
//! small, frequent, per-key critical sections are exactly the shape the
//! `daemon` module's own concurrent session state reaches for `dashmap` to
//! cover.

use crate::cidr;
use crate::directive::{BruteAction, Directive, Kind, Payload};
use std::net::Ipv4Addr;

use dashmap::DashMap;

#[derive(Clone, Copy, Debug)]
struct IpRecord {
    attempts: u32,
    first_attempt: i64,
}

/// Process-wide singleton, installed via [`IpStore::init`].
pub struct IpStore {
    records: DashMap<String, IpRecord>,
}

impl IpStore {
    #[must_use]
    pub fn init() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn destroy(&self) {
        self.records.clear();
    }
}

/// Brute-force configuration gathered from the merged directive list
/// (§4.8's defaults apply when a field's directive is absent).
#[derive(Clone, Debug)]
pub struct BruteForceConfig {
    pub enabled: bool,
    pub allowed_attempts: u32,
    pub window_sec: i64,
    pub action: BruteAction,
    pub throttle_ms: u64,
    pub xff_enabled: bool,
    pub whitelist: Option<String>,
    pub protect_paths: Vec<String>,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_attempts: 10,
            window_sec: 300,
            action: BruteAction::Block,
            throttle_ms: 1000,
            xff_enabled: false,
            whitelist: None,
            protect_paths: Vec::new(),
        }
    }
}

impl BruteForceConfig {
    #[must_use]
    pub fn from_directives(directives: &[Directive]) -> Self {
        let mut config = Self::default();
        for d in directives {
            match (d.kind, &d.payload) {
                (Kind::BruteForceProtection, Payload::Bool(b)) => config.enabled = *b,
                (Kind::BruteForceAllowedAttempts, Payload::Number(n)) => {
                    config.allowed_attempts = (*n).min(u32::MAX as u64) as u32;
                }
                (Kind::BruteForceWindow, Payload::Number(n)) => config.window_sec = *n as i64,
                (Kind::BruteForceAction, Payload::BruteAction(a)) => config.action = *a,
                (Kind::BruteForceThrottleDuration, Payload::Number(n)) => config.throttle_ms = *n,
                (Kind::BruteForceXForwardedFor, Payload::Bool(b)) => config.xff_enabled = *b,
                (Kind::BruteForceWhitelist, _) => config.whitelist = d.value.clone(),
                (Kind::BruteForceProtectPath, _) => {
                    if let Some(path) = &d.value {
                        config.protect_paths.push(path.clone());
                    }
                }
                _ => {}
            }
        }
        config
    }
}

/// Extracts the leftmost IP from an `X-Forwarded-For` value (§9 design
/// note: only the leftmost entry is trusted, no chain validation).
#[must_use]
pub fn extract_first_ip(xff: &str) -> &str {
    xff.trim()
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Outcome of a brute-force evaluation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// Request proceeds normally.
    Proceed,
    /// Request proceeds, but the host should apply `throttle_ms` of delay.
    Throttle(u64),
    /// Request is blocked; dispatcher must set status 403 and short-circuit.
    Block,
}

/// Evaluates one request against the store, given the resolved effective
/// IP (§4.8's XFF-or-direct resolution, already applied by the caller) and
/// the current time as an opaque monotonic-ish integer (Unix seconds is
/// the expected unit).
///
/// Returns `Verdict::Proceed` for every bypass condition (disabled,
/// out-of-scope path, whitelisted IP) as well as for genuine degradation
/// (§4.8's "never block on an infrastructure failure" rule) — this
/// function cannot fail; there is no fallible path through `DashMap`.
#[must_use]
pub fn evaluate(store: &IpStore, config: &BruteForceConfig, effective_ip: &str, uri: &str, now: i64) -> Verdict {
    if !config.enabled {
        return Verdict::Proceed;
    }

    if !config.protect_paths.is_empty() && !config.protect_paths.iter().any(|p| uri.starts_with(p.as_str())) {
        return Verdict::Proceed;
    }

    if let Some(whitelist) = &config.whitelist {
        if let Ok(addr) = effective_ip.parse::<Ipv4Addr>() {
            if cidr::list_contains(whitelist, addr) {
                return Verdict::Proceed;
            }
        }
    }

    let mut entry = store.records.entry(effective_ip.to_string()).or_insert(IpRecord {
        attempts: 0,
        first_attempt: now,
    });

    if entry.attempts == 0 {
        entry.attempts = 1;
        entry.first_attempt = now;
        return Verdict::Proceed;
    }

    if now - entry.first_attempt >= config.window_sec {
        entry.attempts = 1;
        entry.first_attempt = now;
        return Verdict::Proceed;
    }

    if entry.attempts < config.allowed_attempts {
        entry.attempts += 1;
        return Verdict::Proceed;
    }

    match config.action {
        BruteAction::Block => Verdict::Block,
        BruteAction::Throttle => Verdict::Throttle(config.throttle_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking_config() -> BruteForceConfig {
        BruteForceConfig {
            enabled: true,
            allowed_attempts: 2,
            window_sec: 300,
            action: BruteAction::Block,
            ..Default::default()
        }
    }

    #[test]
    fn threshold_blocks_on_the_nplus1th_attempt() {
        let store = IpStore::init();
        let config = blocking_config();
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 0), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 1), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 2), Verdict::Block);
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let store = IpStore::init();
        let config = blocking_config();
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 0), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 1), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 2), Verdict::Block);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 400), Verdict::Proceed);
    }

    #[test]
    fn whitelisted_ip_is_never_blocked() {
        let store = IpStore::init();
        let mut config = blocking_config();
        config.whitelist = Some("1.2.3.4/32".to_string());
        for t in 0..10 {
            assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", t), Verdict::Proceed);
        }
    }

    #[test]
    fn disabled_is_always_proceed() {
        let store = IpStore::init();
        let config = BruteForceConfig::default();
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 0), Verdict::Proceed);
    }

    #[test]
    fn protect_path_scoping_bypasses_unmatched_uris() {
        let store = IpStore::init();
        let mut config = blocking_config();
        config.protect_paths = vec!["/admin".to_string()];
        for t in 0..10 {
            assert_eq!(evaluate(&store, &config, "1.2.3.4", "/public", t), Verdict::Proceed);
        }
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/admin", 0), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/admin", 1), Verdict::Proceed);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/admin", 2), Verdict::Block);
    }

    #[test]
    fn throttle_action_returns_hint_and_proceeds() {
        let store = IpStore::init();
        let mut config = blocking_config();
        config.action = BruteAction::Throttle;
        config.throttle_ms = 750;
        evaluate(&store, &config, "1.2.3.4", "/", 0);
        evaluate(&store, &config, "1.2.3.4", "/", 1);
        assert_eq!(evaluate(&store, &config, "1.2.3.4", "/", 2), Verdict::Throttle(750));
    }

    #[test]
    fn extract_first_ip_takes_leftmost() {
        assert_eq!(extract_first_ip("203.0.113.9, 10.0.0.1"), "203.0.113.9");
        assert_eq!(extract_first_ip(""), "");
    }
}
