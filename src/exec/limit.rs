//! `Limit` / `LimitExcept` executor (§4.7): method-scoped filters around a
//! children list, run through the caller-supplied `child_runner`.

use crate::directive::{Directive, Kind, Payload};

/// Returns the directives that should actually execute given the request
/// method: a `Limit`'s children run iff `method` is in its method list,
/// `LimitExcept`'s children run iff it's NOT in its list. Directives of
/// other kinds pass through unchanged — only `Limit`/`LimitExcept`
/// containers are filtered, everything else in `directives` still runs.
#[must_use]
pub fn resolve<'a>(directives: &'a [Directive], method: &str) -> Vec<&'a Directive> {
    let mut resolved = Vec::new();
    for d in directives {
        match d.kind {
            Kind::Limit | Kind::LimitExcept => {
                let Payload::Limit { methods, children } = &d.payload else { continue };
                let method_in_list = methods.iter().any(|m| m.eq_ignore_ascii_case(method));
                let should_run = if d.kind == Kind::Limit { method_in_list } else { !method_in_list };
                if should_run {
                    resolved.extend(children.iter());
                }
            }
            _ => resolved.push(d),
        }
    }
    resolved
}
