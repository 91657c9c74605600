//! `ErrorDocument` executor (§4.7): dispatches on the first character of
//! `value` to pick a mode, preserving the parser's leading-quote quirk.

use crate::directive::{Directive, Kind, Payload};
use crate::session::{LogLevel, Session};

/// Applies the first `ErrorDocument` whose `error_code` equals the
/// session's current status, if any.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    let status = session.status();
    let Some(d) = directives.iter().find(|d| matches!((d.kind, &d.payload), (Kind::ErrorDocument, Payload::ErrorCode(code)) if *code == status)) else {
        return;
    };
    let Some(value) = d.value.as_deref() else { return };

    if value.starts_with("http://") || value.starts_with("https://") {
        session.set_status(302);
        session.set_response_header("Location", value);
    } else if let Some(text) = value.strip_prefix('"') {
        let text = text.strip_suffix('"').unwrap_or(text);
        session.set_response_body(text.as_bytes().to_vec());
    } else if value.starts_with('/') {
        session.log(LogLevel::Info, &format!("ErrorDocument local path '{value}' falls back to host default error page"));
    } else {
        session.log(LogLevel::Warn, &format!("unrecognized ErrorDocument value '{value}'"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::session::mock::MockSession;

    #[test]
    fn url_mode_redirects() {
        let (directives, _) = parse("ErrorDocument 404 http://example.com/404\n", "t");
        let mut session = MockSession::default();
        session.set_status(404);
        apply(&directives, &mut session);
        assert_eq!(session.status(), 302);
        assert_eq!(session.response_header("Location"), Some("http://example.com/404".to_string()));
    }

    #[test]
    fn quoted_text_mode_sets_body() {
        let (directives, _) = parse("ErrorDocument 404 \"Not found\n", "t");
        let mut session = MockSession::default();
        session.set_status(404);
        apply(&directives, &mut session);
        assert_eq!(session.body, Some(b"Not found".to_vec()));
        assert_eq!(session.status(), 404);
    }

    #[test]
    fn nonmatching_status_is_noop() {
        let (directives, _) = parse("ErrorDocument 404 \"Not found\n", "t");
        let mut session = MockSession::default();
        session.set_status(200);
        apply(&directives, &mut session);
        assert_eq!(session.body, None);
    }
}
