//! `Header*` / `RequestHeader*` executor (§4.7 "Header family").

use crate::directive::{Directive, Kind};
use crate::session::Session;

/// Applies every `Header*` (including `always` variants) and
/// `RequestHeader*` directive in `directives`, in order, to `session`.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    for d in directives {
        apply_one(d, session);
    }
}

fn apply_one(d: &Directive, session: &mut dyn Session) {
    let Some(name) = d.name.as_deref() else { return };
    match d.kind {
        Kind::HeaderSet | Kind::HeaderAlwaysSet => {
            session.set_response_header(name, d.value.as_deref().unwrap_or(""));
        }
        Kind::HeaderUnset | Kind::HeaderAlwaysUnset => {
            session.remove_response_header(name);
        }
        Kind::HeaderAppend | Kind::HeaderAlwaysAppend => {
            session.append_response_header(name, d.value.as_deref().unwrap_or(""));
        }
        Kind::HeaderMerge | Kind::HeaderAlwaysMerge => {
            let value = d.value.as_deref().unwrap_or("");
            let already_present = session
                .response_header(name)
                .is_some_and(|existing| existing.split(", ").any(|tok| tok == value));
            if !already_present {
                session.append_response_header(name, value);
            }
        }
        Kind::HeaderAdd | Kind::HeaderAlwaysAdd => {
            session.add_response_header(name, d.value.as_deref().unwrap_or(""));
        }
        Kind::RequestHeaderSet => {
            session.set_request_header(name, d.value.as_deref().unwrap_or(""));
        }
        Kind::RequestHeaderUnset => {
            session.remove_request_header(name);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::session::mock::MockSession;

    #[test]
    fn header_set_is_idempotent() {
        let (directives, _) = parse("Header set X-H a\nHeader set X-H b\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert_eq!(session.response_header_count("X-H"), 1);
        assert_eq!(session.response_header("X-H"), Some("b".to_string()));
    }

    #[test]
    fn header_merge_is_idempotent_across_repeats() {
        let (directives, _) = parse("Header merge X-Vary Cookie\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        apply(&directives, &mut session);
        assert_eq!(session.response_header("X-Vary"), Some("Cookie".to_string()));
    }

    #[test]
    fn header_add_is_multivalued() {
        let (directives, _) = parse("Header add X-M a\nHeader add X-M b\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert_eq!(session.response_header_count("X-M"), 2);
    }

    #[test]
    fn header_append_joins_with_comma_space() {
        let (directives, _) = parse("Header set X-C a\nHeader append X-C b\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert_eq!(session.response_header("X-C"), Some("a, b".to_string()));
    }
}
