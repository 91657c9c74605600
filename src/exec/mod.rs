//! Executor dispatcher (§4.6): orchestrates the merged directive list
//! against the two hook points the host server invokes, routing each node
//! to its family's executor in the documented fixed order.

pub mod access;
pub mod auth;
pub mod env;
pub mod error_document;
pub mod expires;
pub mod files;
pub mod headers;
pub mod limit;
pub mod options;
pub mod php;
pub mod redirect;

use crate::bruteforce::{self, BruteForceConfig, IpStore};
use crate::directive::{Directive, Kind, Payload};
use crate::session::Session;
use std::net::Ipv4Addr;

/// Whether the request-header phase should keep going or the dispatcher
/// has already produced a terminal response.
#[derive(Debug, Eq, PartialEq)]
pub enum RequestOutcome {
    Continue,
    ShortCircuit,
}

/// Expands `IfModule` and `Limit`/`LimitExcept` containers in place,
/// dropping branches whose condition the current request does not
/// satisfy. The host supplies `IfModule` truth via
/// [`Session::module_loaded`]; everything else passes through unchanged.
fn flatten_active<'a>(directives: &'a [Directive], session: &dyn Session, method: &str) -> Vec<&'a Directive> {
    let mut out = Vec::new();
    for d in directives {
        match d.kind {
            Kind::IfModule => {
                let Payload::IfModule { negated, children } = &d.payload else { continue };
                let name = d.name.as_deref().unwrap_or("").trim_start_matches('!');
                let loaded = session.module_loaded(name);
                if loaded != *negated {
                    out.extend(flatten_active(children, session, method));
                }
            }
            Kind::Limit | Kind::LimitExcept => {
                let Payload::Limit { methods, children } = &d.payload else { continue };
                let in_list = methods.iter().any(|m| m.eq_ignore_ascii_case(method));
                let should_run = if d.kind == Kind::Limit { in_list } else { !in_list };
                if should_run {
                    out.extend(flatten_active(children, session, method));
                }
            }
            _ => out.push(d),
        }
    }
    out
}

fn owned(directives: &[&Directive]) -> Vec<Directive> {
    directives.iter().map(|d| (*d).clone()).collect()
}

/// Runs the `receive-request-header` hook: access control (including
/// Basic auth), redirects, PHP config, environment variables, then
/// brute-force protection, in that fixed order. Returns
/// [`RequestOutcome::ShortCircuit`] once a directive has produced a
/// terminal response (access denied, auth failure, redirect, or
/// brute-force block) — the dispatcher never runs later groups after that
/// point, matching §4.6's "later groups see the effects of earlier ones,
/// up to the first short-circuit" contract.
pub fn on_receive_request_header<R: auth::PasswordFileReader>(
    merged: &[Directive],
    session: &mut dyn Session,
    store: &IpStore,
    password_reader: &R,
    now: i64,
) -> RequestOutcome {
    let method = session.method().to_string();
    let active = owned(&flatten_active(merged, session, &method));

    let client_ip: Ipv4Addr = session.client_ip().parse().unwrap_or(Ipv4Addr::UNSPECIFIED);
    if !access::is_allowed(&active, client_ip) {
        session.set_status(403);
        return RequestOutcome::ShortCircuit;
    }
    match auth::apply(&active, session, password_reader) {
        auth::AuthOutcome::Denied => return RequestOutcome::ShortCircuit,
        auth::AuthOutcome::Allowed | auth::AuthOutcome::NotRequired => {}
    }

    let uri = session.uri().to_string();
    if let Some(outcome) = redirect::apply(&active, session, &uri) {
        session.set_status(outcome.status);
        session.set_response_header("Location", &outcome.location);
        return RequestOutcome::ShortCircuit;
    }

    options::apply_directory_index(&active, session); // rewrites the URI before PHP/env see it.
    php::apply(&active, session);
    env::apply(&active, session);

    let bf_config = BruteForceConfig::from_directives(&active);
    let effective_ip = if bf_config.xff_enabled {
        session
            .request_header("X-Forwarded-For")
            .map(|xff| bruteforce::extract_first_ip(&xff).to_string())
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| session.client_ip().to_string())
    } else {
        session.client_ip().to_string()
    };
    let current_uri = session.uri().to_string();
    match bruteforce::evaluate(store, &bf_config, &effective_ip, &current_uri, now) {
        bruteforce::Verdict::Proceed => {}
        bruteforce::Verdict::Throttle(ms) => session.set_env("BF_THROTTLE_MS", &ms.to_string()),
        bruteforce::Verdict::Block => {
            session.set_status(403);
            return RequestOutcome::ShortCircuit;
        }
    }

    RequestOutcome::Continue
}

/// Runs the `send-response-header` hook: header mutation, `FilesMatch`/
/// `Files`, `Options`/handler/type/charset, expires, then `ErrorDocument`,
/// in that fixed order.
pub fn on_send_response_header(merged: &[Directive], session: &mut dyn Session) {
    let method = session.method().to_string();
    let active = owned(&flatten_active(merged, session, &method));

    headers::apply(&active, session);
    let uri = session.uri().to_string();
    files::apply(&active, session, &uri);
    options::apply(&active, session);
    expires::apply(&active, session);
    error_document::apply(&active, session);
}
