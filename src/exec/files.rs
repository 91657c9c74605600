//! `FilesMatch` / `Files` executor (§4.7): tests the request URI's
//! basename and, on match, runs only the header-kind children.

use crate::directive::{Directive, Kind, Payload};
use crate::exec::headers;
use crate::session::{LogLevel, Session};
use regex::Regex;

fn basename(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Runs every `FilesMatch`/`Files` container whose pattern matches the
/// request URI's basename, applying their header-kind children.
pub fn apply(directives: &[Directive], session: &mut dyn Session, uri: &str) {
    let base = basename(uri);
    for d in directives {
        match d.kind {
            Kind::FilesMatch => {
                let Payload::Container { pattern, children } = &d.payload else { continue };
                match Regex::new(pattern) {
                    Ok(regex) if regex.is_match(base) => run_header_children(children, session),
                    Ok(_) => {}
                    Err(_) => session.log(LogLevel::Warn, &format!("invalid FilesMatch pattern '{pattern}'")),
                }
            }
            Kind::Files => {
                let Payload::Container { pattern, children } = &d.payload else { continue };
                if pattern == base {
                    run_header_children(children, session);
                }
            }
            _ => {}
        }
    }
}

fn run_header_children(children: &[Directive], session: &mut dyn Session) {
    for child in children {
        if child.kind.is_header_kind() {
            headers::apply(std::slice::from_ref(child), session);
        } else {
            session.log(LogLevel::Warn, &format!("{:?} is not valid inside FilesMatch/Files, skipped", child.kind));
        }
    }
}
