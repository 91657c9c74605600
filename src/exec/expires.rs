//! `ExpiresActive` / `ExpiresByType` / `ExpiresDefault` executor (§4.6 step 4).

use crate::directive::{Directive, Kind, Payload};
use crate::session::Session;
use std::time::{Duration, SystemTime};

/// Writes `Cache-Control`/`Expires` response headers if `ExpiresActive` is
/// On and a matching duration (by-type or default) is configured.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    let active = directives.iter().any(|d| matches!((d.kind, &d.payload), (Kind::ExpiresActive, Payload::Bool(true))));
    if !active {
        return;
    }

    let content_type = session.response_content_type().unwrap_or_default();
    let mime = content_type.split(';').next().unwrap_or("").trim();

    let duration = directives
        .iter()
        .find_map(|d| match (d.kind, &d.payload) {
            (Kind::ExpiresByType, Payload::Expires { duration_sec }) if d.name.as_deref() == Some(mime) => {
                Some(*duration_sec)
            }
            _ => None,
        })
        .or_else(|| {
            directives.iter().find_map(|d| match (d.kind, &d.payload) {
                (Kind::ExpiresDefault, Payload::Expires { duration_sec }) => Some(*duration_sec),
                _ => None,
            })
        });

    let Some(duration_sec) = duration else { return };

    session.set_response_header("Cache-Control", &format!("max-age={duration_sec}"));
    let expires_at = SystemTime::now() + Duration::from_secs(duration_sec);
    session.set_response_header("Expires", &httpdate::fmt_http_date(expires_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::session::mock::MockSession;

    #[test]
    fn inactive_writes_nothing() {
        let (directives, _) = parse("ExpiresByType text/html \"access plus 1 day\"\n", "t");
        let mut session = MockSession::default();
        session.set_response_header("Content-Type", "text/html");
        apply(&directives, &mut session);
        assert_eq!(session.response_header("Cache-Control"), None);
    }

    #[test]
    fn by_type_match_wins_over_default() {
        let (directives, _) = parse(
            "ExpiresActive On\nExpiresByType text/html \"access plus 1 hour\"\nExpiresDefault \"access plus 1 day\"\n",
            "t",
        );
        let mut session = MockSession::default();
        session.set_response_header("Content-Type", "text/html; charset=utf-8");
        apply(&directives, &mut session);
        assert_eq!(session.response_header("Cache-Control"), Some("max-age=3600".to_string()));
    }

    #[test]
    fn falls_back_to_default_on_no_type_match() {
        let (directives, _) = parse(
            "ExpiresActive On\nExpiresByType text/html \"access plus 1 hour\"\nExpiresDefault \"access plus 1 day\"\n",
            "t",
        );
        let mut session = MockSession::default();
        session.set_response_header("Content-Type", "image/png");
        apply(&directives, &mut session);
        assert_eq!(session.response_header("Cache-Control"), Some("max-age=86400".to_string()));
    }
}
