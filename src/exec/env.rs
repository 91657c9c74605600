//! `SetEnv` / `SetEnvIf` / `BrowserMatch` executor (§4.7).

use crate::directive::{Directive, EnvAttribute, Kind, Payload};
use crate::session::{LogLevel, Session};
use regex::Regex;

/// Applies every environment-variable directive in order.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    for d in directives {
        match d.kind {
            Kind::SetEnv => {
                if let (Some(name), Some(value)) = (&d.name, &d.value) {
                    session.set_env(name, value);
                }
            }
            Kind::SetEnvIf | Kind::BrowserMatch => apply_conditional(d, session),
            _ => {}
        }
    }
}

fn apply_conditional(d: &Directive, session: &mut dyn Session) {
    let Payload::EnvIf { attribute, pattern } = &d.payload else { return };
    let Some(subject) = attribute_value(attribute, session) else { return };
    let regex = match Regex::new(pattern) {
        Ok(r) => r,
        Err(_) => {
            session.log(LogLevel::Warn, &format!("invalid pattern '{pattern}' in {:?}", d.kind));
            return;
        }
    };
    if !regex.is_match(&subject) {
        return;
    }
    if let (Some(name), Some(value)) = (&d.name, &d.value) {
        session.set_env(name, value);
    }
}

fn attribute_value(attribute: &EnvAttribute, session: &dyn Session) -> Option<String> {
    match attribute {
        EnvAttribute::RemoteAddr => Some(session.client_ip().to_string()),
        EnvAttribute::RequestUri => Some(session.uri().to_string()),
        EnvAttribute::UserAgent => session.request_header("User-Agent"),
        EnvAttribute::Header(name) => session.request_header(name),
    }
}
