//! Canonical text printer (§4.3) — the round-trip target for [`crate::parser::parse`].

use crate::directive::{BruteAction, Directive, Kind, OrderMode, Payload};
use std::fmt::Write as _;

/// Prints a directive list as canonical `.htaccess` text. The output
/// always ends with a trailing `\n`; `parse(print(list))` is structurally
/// equivalent to `list` under the identity-key-free equality used by §8's
/// round-trip property (same kinds/fields/children in order).
#[must_use]
pub fn print(directives: &[Directive]) -> String {
    let mut out = String::new();
    print_into(directives, &mut out);
    out
}

fn print_into(directives: &[Directive], out: &mut String) {
    for d in directives {
        print_one(d, out);
    }
}

/// Re-quotes `s` with `"` if it contains whitespace, so the tokenizer reads
/// it back as the single token it was parsed from (§4.3: "Quoted arguments
/// are re-quoted with `\"`").
fn quoted_if_needed(s: &str) -> String {
    if s.contains(char::is_whitespace) {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

fn print_one(d: &Directive, out: &mut String) {
    match d.kind {
        Kind::HeaderSet
        | Kind::HeaderUnset
        | Kind::HeaderAppend
        | Kind::HeaderMerge
        | Kind::HeaderAdd
        | Kind::HeaderAlwaysSet
        | Kind::HeaderAlwaysUnset
        | Kind::HeaderAlwaysAppend
        | Kind::HeaderAlwaysMerge
        | Kind::HeaderAlwaysAdd => {
            let mode = match d.kind {
                Kind::HeaderSet | Kind::HeaderAlwaysSet => "set",
                Kind::HeaderUnset | Kind::HeaderAlwaysUnset => "unset",
                Kind::HeaderAppend | Kind::HeaderAlwaysAppend => "append",
                Kind::HeaderMerge | Kind::HeaderAlwaysMerge => "merge",
                _ => "add",
            };
            let prefix = if d.kind.is_always_header() { "always " } else { "" };
            let name = d.name.as_deref().unwrap_or("");
            match &d.value {
                Some(v) => writeln!(out, "Header {prefix}{mode} {name} {}", quoted_if_needed(v)).unwrap(),
                None => writeln!(out, "Header {prefix}{mode} {name}").unwrap(),
            }
        }
        Kind::RequestHeaderSet | Kind::RequestHeaderUnset => {
            let mode = if d.kind == Kind::RequestHeaderSet { "set" } else { "unset" };
            let name = d.name.as_deref().unwrap_or("");
            match &d.value {
                Some(v) => writeln!(out, "RequestHeader {mode} {name} {}", quoted_if_needed(v)).unwrap(),
                None => writeln!(out, "RequestHeader {mode} {name}").unwrap(),
            }
        }
        Kind::PhpValue | Kind::PhpAdminValue => {
            let keyword = if d.kind == Kind::PhpValue { "php_value" } else { "php_admin_value" };
            writeln!(out, "{keyword} {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::PhpFlag | Kind::PhpAdminFlag => {
            let keyword = if d.kind == Kind::PhpFlag { "php_flag" } else { "php_admin_flag" };
            writeln!(out, "{keyword} {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::Order => {
            let operand = match &d.payload {
                Payload::Order(OrderMode::AllowDeny) => "Allow,Deny",
                Payload::Order(OrderMode::DenyAllow) => "Deny,Allow",
                _ => "Allow,Deny",
            };
            writeln!(out, "Order {operand}").unwrap();
        }
        Kind::AllowFrom => writeln!(out, "Allow from {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::DenyFrom => writeln!(out, "Deny from {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::Redirect => {
            let status = match &d.payload {
                Payload::Redirect { status_code, .. } => *status_code,
                _ => 302,
            };
            let name = d.name.as_deref().unwrap_or("");
            let value = d.value.as_deref().unwrap_or("");
            if status == 302 {
                writeln!(out, "Redirect {name} {value}").unwrap();
            } else {
                writeln!(out, "Redirect {status} {name} {value}").unwrap();
            }
        }
        Kind::RedirectMatch => {
            let (status, pattern) = match &d.payload {
                Payload::Redirect { status_code, pattern } => (*status_code, pattern.as_deref().unwrap_or("")),
                _ => (302, ""),
            };
            let value = d.value.as_deref().unwrap_or("");
            if status == 302 {
                writeln!(out, "RedirectMatch {pattern} {value}").unwrap();
            } else {
                writeln!(out, "RedirectMatch {status} {pattern} {value}").unwrap();
            }
        }
        Kind::ErrorDocument => {
            let code = match &d.payload {
                Payload::ErrorCode(c) => *c,
                _ => 0,
            };
            writeln!(out, "ErrorDocument {code} {}", d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::FilesMatch => {
            let pattern = match &d.payload {
                Payload::Container { pattern, .. } => pattern.as_str(),
                _ => "",
            };
            writeln!(out, "<FilesMatch \"{pattern}\">").unwrap();
            print_into(d.children(), out);
            writeln!(out, "</FilesMatch>").unwrap();
        }
        Kind::Files => {
            let pattern = match &d.payload {
                Payload::Container { pattern, .. } => pattern.as_str(),
                _ => "",
            };
            writeln!(out, "<Files \"{pattern}\">").unwrap();
            print_into(d.children(), out);
            writeln!(out, "</Files>").unwrap();
        }
        Kind::ExpiresActive => {
            let on = matches!(d.payload, Payload::Bool(true));
            writeln!(out, "ExpiresActive {}", if on { "On" } else { "Off" }).unwrap();
        }
        Kind::ExpiresByType => {
            writeln!(
                out,
                "ExpiresByType {} \"{}\"",
                d.name.as_deref().unwrap_or(""),
                d.value.as_deref().unwrap_or("")
            )
            .unwrap();
        }
        Kind::ExpiresDefault => {
            writeln!(out, "ExpiresDefault \"{}\"", d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::SetEnv => {
            writeln!(out, "SetEnv {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::SetEnvIf | Kind::BrowserMatch => {
            let pattern = match &d.payload {
                Payload::EnvIf { pattern, .. } => pattern.as_str(),
                _ => "",
            };
            let name = d.name.as_deref().unwrap_or("");
            let value = d.value.as_deref().unwrap_or("");
            if d.kind == Kind::SetEnvIf {
                let attribute = match &d.payload {
                    Payload::EnvIf { attribute, .. } => attribute.to_string(),
                    _ => String::new(),
                };
                writeln!(out, "SetEnvIf {attribute} \"{pattern}\" {name}={value}").unwrap();
            } else {
                writeln!(out, "BrowserMatch \"{pattern}\" {name}={value}").unwrap();
            }
        }
        Kind::BruteForceProtection | Kind::BruteForceXForwardedFor => {
            let enabled = matches!(d.payload, Payload::Bool(true));
            writeln!(out, "{} {}", d.kind.keyword(), if enabled { "On" } else { "Off" }).unwrap();
        }
        Kind::BruteForceAllowedAttempts | Kind::BruteForceWindow | Kind::BruteForceThrottleDuration => {
            let n = match d.payload {
                Payload::Number(n) => n,
                _ => 0,
            };
            writeln!(out, "{} {n}", d.kind.keyword()).unwrap();
        }
        Kind::BruteForceAction => {
            let action = match d.payload {
                Payload::BruteAction(BruteAction::Block) => "block",
                Payload::BruteAction(BruteAction::Throttle) => "throttle",
                _ => "block",
            };
            writeln!(out, "BruteForceAction {action}").unwrap();
        }
        Kind::BruteForceWhitelist => {
            writeln!(out, "BruteForceWhitelist {}", d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::BruteForceProtectPath => {
            writeln!(out, "BruteForceProtectPath {}", d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::IfModule => {
            let name = d.name.as_deref().unwrap_or("");
            writeln!(out, "<IfModule {name}>").unwrap();
            print_into(d.children(), out);
            writeln!(out, "</IfModule>").unwrap();
        }
        Kind::Options => {
            let flags = match d.payload {
                Payload::Options(f) => f,
                _ => Default::default(),
            };
            let mut parts = Vec::new();
            for (value, name) in [
                (flags.indexes, "Indexes"),
                (flags.follow_symlinks, "FollowSymLinks"),
                (flags.multi_views, "MultiViews"),
                (flags.exec_cgi, "ExecCGI"),
            ] {
                match value {
                    1 => parts.push(format!("+{name}")),
                    -1 => parts.push(format!("-{name}")),
                    _ => {}
                }
            }
            writeln!(out, "Options {}", parts.join(" ")).unwrap();
        }
        Kind::RequireAllGranted => writeln!(out, "Require all granted").unwrap(),
        Kind::RequireAllDenied => writeln!(out, "Require all denied").unwrap(),
        Kind::RequireIp => writeln!(out, "Require ip {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::RequireNotIp => writeln!(out, "Require not ip {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::RequireAny => {
            writeln!(out, "<RequireAny>").unwrap();
            print_into(d.children(), out);
            writeln!(out, "</RequireAny>").unwrap();
        }
        Kind::RequireAll => {
            writeln!(out, "<RequireAll>").unwrap();
            print_into(d.children(), out);
            writeln!(out, "</RequireAll>").unwrap();
        }
        Kind::Limit | Kind::LimitExcept => {
            let (methods, tag) = match &d.payload {
                Payload::Limit { methods, .. } => (methods.clone(), d.kind.keyword()),
                _ => (Vec::new(), d.kind.keyword()),
            };
            writeln!(out, "<{tag} {}>", methods.join(" ")).unwrap();
            print_into(d.children(), out);
            writeln!(out, "</{tag}>").unwrap();
        }
        Kind::AuthType => writeln!(out, "AuthType {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::AuthName => writeln!(out, "AuthName \"{}\"", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::AuthUserFile => writeln!(out, "AuthUserFile {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::RequireValidUser => writeln!(out, "Require valid-user").unwrap(),
        Kind::AddHandler => {
            writeln!(out, "AddHandler {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::SetHandler => writeln!(out, "SetHandler {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::AddType => {
            writeln!(out, "AddType {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::DirectoryIndex => writeln!(out, "DirectoryIndex {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::ForceType => writeln!(out, "ForceType {}", d.value.as_deref().unwrap_or("")).unwrap(),
        Kind::AddEncoding => {
            writeln!(out, "AddEncoding {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
        Kind::AddCharset => {
            writeln!(out, "AddCharset {} {}", d.name.as_deref().unwrap_or(""), d.value.as_deref().unwrap_or("")).unwrap();
        }
    }
}
