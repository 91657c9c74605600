//! `Redirect` / `RedirectMatch` executor (§4.7 "Redirect"). The first
//! matching entry short-circuits the rest of the merged list.

use crate::directive::{Directive, Kind, Payload};
use crate::session::{LogLevel, Session};
use regex::Regex;

const MAX_INTERPOLATED_LEN: usize = 4096;

pub struct RedirectOutcome {
    pub status: u16,
    pub location: String,
}

/// Tries every `Redirect`/`RedirectMatch` in order; returns the first hit.
pub fn apply(directives: &[Directive], session: &dyn Session, uri: &str) -> Option<RedirectOutcome> {
    for d in directives {
        match d.kind {
            Kind::Redirect => {
                let prefix = d.name.as_deref().unwrap_or("");
                if !prefix.is_empty() && uri.starts_with(prefix) {
                    let status_code = match d.payload {
                        Payload::Redirect { status_code, .. } => status_code,
                        _ => 302,
                    };
                    let location = d.value.clone().unwrap_or_default();
                    return Some(RedirectOutcome {
                        status: if status_code == 0 { 302 } else { status_code },
                        location,
                    });
                }
            }
            Kind::RedirectMatch => {
                let (status_code, pattern) = match &d.payload {
                    Payload::Redirect { status_code, pattern } => (*status_code, pattern.clone()),
                    _ => (302, None),
                };
                let Some(pattern) = pattern else { continue };
                let regex = match Regex::new(&pattern) {
                    Ok(r) => r,
                    Err(_) => {
                        session.log(LogLevel::Warn, &format!("invalid RedirectMatch pattern '{pattern}'"));
                        continue;
                    }
                };
                let Some(captures) = regex.captures(uri) else {
                    continue;
                };
                let template = d.value.as_deref().unwrap_or("");
                let Some(location) = substitute_groups(template, &captures) else {
                    session.log(LogLevel::Warn, "RedirectMatch substitution exceeded max URL length");
                    continue;
                };
                return Some(RedirectOutcome {
                    status: if status_code == 0 { 302 } else { status_code },
                    location,
                });
            }
            _ => {}
        }
    }
    None
}

fn substitute_groups(template: &str, captures: &regex::Captures<'_>) -> Option<String> {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_digit() {
                    chars.next();
                    let idx = next.to_digit(10).unwrap() as usize;
                    if let Some(m) = captures.get(idx) {
                        out.push_str(m.as_str());
                    }
                    if out.len() > MAX_INTERPOLATED_LEN {
                        return None;
                    }
                    continue;
                }
            }
        }
        out.push(c);
        if out.len() > MAX_INTERPOLATED_LEN {
            return None;
        }
    }
    Some(out)
}
