//! `Options`, handler/type/charset, and `DirectoryIndex` executor (§4.6:
//! "`Options` and handler/type/charset directives are applied to the
//! session at the same response phase"; `DirectoryIndex`'s URI rewrite
//! stays in the request phase since later request-phase executors —
//! PHP config, env vars, brute-force scope filtering — must see the
//! rewritten URI).

use crate::directive::{Directive, Kind, Payload};
use crate::session::Session;

/// Applies `DirectoryIndex` resolution. Runs during
/// `receive-request-header`, before PHP/env/brute-force see the URI.
pub fn apply_directory_index(directives: &[Directive], session: &mut dyn Session) {
    for d in directives {
        if d.kind == Kind::DirectoryIndex {
            resolve_directory_index(d, session);
        }
    }
}

/// Applies `Options` flags (merging tri-state overrides on top of the
/// session's current flags) and every handler/type/charset/`ForceType`
/// directive. Runs during `send-response-header`.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    for d in directives {
        match (d.kind, &d.payload) {
            (Kind::Options, Payload::Options(flags)) => {
                let mut current = session.directory_options();
                if flags.indexes != 0 {
                    current.indexes = flags.indexes;
                }
                if flags.follow_symlinks != 0 {
                    current.follow_symlinks = flags.follow_symlinks;
                }
                if flags.multi_views != 0 {
                    current.multi_views = flags.multi_views;
                }
                if flags.exec_cgi != 0 {
                    current.exec_cgi = flags.exec_cgi;
                }
                session.set_directory_options(current);
            }
            (Kind::AddHandler, _) => {
                if let Some(name) = &d.name {
                    session.set_directory_hint("handler", &format!("{name} {}", d.value.as_deref().unwrap_or("")));
                }
            }
            (Kind::SetHandler, _) => {
                session.set_directory_hint("sethandler", d.value.as_deref().unwrap_or(""));
            }
            (Kind::AddType, _) => {
                if let Some(name) = &d.name {
                    session.set_directory_hint("type", &format!("{name} {}", d.value.as_deref().unwrap_or("")));
                }
            }
            (Kind::ForceType, _) => {
                session.set_directory_hint("forcetype", d.value.as_deref().unwrap_or(""));
            }
            (Kind::AddEncoding, _) => {
                if let Some(name) = &d.name {
                    session.set_directory_hint("encoding", &format!("{name} {}", d.value.as_deref().unwrap_or("")));
                }
            }
            (Kind::AddCharset, _) => {
                if let Some(name) = &d.name {
                    session.set_directory_hint("charset", &format!("{name} {}", d.value.as_deref().unwrap_or("")));
                }
            }
            _ => {}
        }
    }
}

fn resolve_directory_index(d: &Directive, session: &mut dyn Session) {
    let Some(list) = d.value.as_deref() else { return };
    let current_uri = session.uri().to_string();
    if !current_uri.ends_with('/') {
        return;
    }
    for candidate in list.split_whitespace() {
        let relative = format!("{current_uri}{candidate}");
        if session.file_exists(&relative) {
            session.rewrite_uri(&relative);
            return;
        }
    }
}
