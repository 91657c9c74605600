//! Access control executor (§4.7 "Access control"): classic
//! `Order`/`Allow`/`Deny` plus the v2 `Require*` family.

use crate::cidr::{self, Ipv4Cidr};
use crate::directive::{Directive, Kind, OrderMode, Payload};
use std::net::Ipv4Addr;

/// Evaluates the merged list's access-control directives against
/// `client_ip`. Returns `true` (allowed) when no access-control directive
/// is present at all — access control is opt-in per directory.
#[must_use]
pub fn is_allowed(directives: &[Directive], client_ip: Ipv4Addr) -> bool {
    let require_nodes: Vec<&Directive> = directives
        .iter()
        .filter(|d| {
            matches!(
                d.kind,
                Kind::RequireAllGranted
                    | Kind::RequireAllDenied
                    | Kind::RequireIp
                    | Kind::RequireNotIp
                    | Kind::RequireAny
                    | Kind::RequireAll
            )
        })
        .collect();

    if !require_nodes.is_empty() {
        return require_nodes.iter().any(|d| eval_require(d, client_ip));
    }

    let order = directives.iter().find_map(|d| match (d.kind, &d.payload) {
        (Kind::Order, Payload::Order(mode)) => Some(*mode),
        _ => None,
    });

    let Some(order) = order else {
        return true;
    };

    let allow_matches = directives
        .iter()
        .filter(|d| d.kind == Kind::AllowFrom)
        .any(|d| matches_cidr_list(d, client_ip));
    let deny_matches = directives
        .iter()
        .filter(|d| d.kind == Kind::DenyFrom)
        .any(|d| matches_cidr_list(d, client_ip));

    match order {
        OrderMode::AllowDeny => allow_matches && !deny_matches,
        OrderMode::DenyAllow => !deny_matches || allow_matches,
    }
}

fn matches_cidr_list(directive: &Directive, client_ip: Ipv4Addr) -> bool {
    directive
        .value
        .as_deref()
        .is_some_and(|list| cidr::list_contains(list, client_ip))
}

fn eval_require(directive: &Directive, client_ip: Ipv4Addr) -> bool {
    match directive.kind {
        Kind::RequireAllGranted => true,
        Kind::RequireAllDenied => false,
        Kind::RequireIp => directive
            .value
            .as_deref()
            .and_then(Ipv4Cidr::parse)
            .is_some_and(|cidr| cidr.contains(client_ip)),
        Kind::RequireNotIp => !directive
            .value
            .as_deref()
            .and_then(Ipv4Cidr::parse)
            .is_some_and(|cidr| cidr.contains(client_ip)),
        Kind::RequireAny => directive.children().iter().any(|c| eval_require(c, client_ip)),
        Kind::RequireAll => directive.children().iter().all(|c| eval_require(c, client_ip)),
        _ => true,
    }
}
