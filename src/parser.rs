//! The `.htaccess` text parser (§4.1): a single-pass, line-oriented scan
//! that never aborts on a bad line — it warns and keeps going, the same
//! failure policy the C source implements with `continue` inside its main
//! loop. Modeled in shape on `rsync_cli::frontend::filter_rules`'s own
//! hand-written line scanner, which parses one filter-rule line at a time
//! into a tagged enum the same way.

use crate::directive::{
    BruteAction, Directive, EnvAttribute, Kind, OptionFlags, OrderMode, Payload,
};
use crate::expires;

/// One diagnostic emitted for a skipped line or block.
#[derive(Clone, Debug)]
pub struct ParseWarning {
    pub source: String,
    pub line: u32,
    pub message: String,
}

/// Parses `.htaccess` text into a flat `Vec<Directive>` (containers nest
/// their own children inside). Never returns an error: malformed lines are
/// recorded as warnings and skipped, per §4.1's failure policy.
pub fn parse(text: &str, source_label: &str) -> (Vec<Directive>, Vec<ParseWarning>) {
    let mut warnings = Vec::new();
    let mut stack: Vec<(Directive, u32)> = Vec::new();
    let mut root = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("</") {
            let Some(name) = rest.strip_suffix('>') else {
                warn(&mut warnings, source_label, line_no, "malformed closer");
                continue;
            };
            let Some((open, open_line)) = stack.pop() else {
                warn(
                    &mut warnings,
                    source_label,
                    line_no,
                    "closer without matching opener",
                );
                continue;
            };
            if !open.kind.keyword().eq_ignore_ascii_case(name.trim()) {
                warn(
                    &mut warnings,
                    source_label,
                    line_no,
                    &format!("closer </{name}> does not match opener at line {open_line}"),
                );
                continue;
            }
            push_directive(&mut stack, &mut root, open);
            continue;
        }

        if let Some(rest) = line.strip_prefix('<') {
            let Some(header) = rest.strip_suffix('>') else {
                warn(&mut warnings, source_label, line_no, "malformed opener");
                continue;
            };
            let mut tokens = tokenize(header);
            let Some(name) = tokens.first().cloned() else {
                warn(&mut warnings, source_label, line_no, "empty opener");
                continue;
            };
            match parse_opener(&name, &mut tokens, line_no, source_label, &mut warnings) {
                Some(directive) => stack.push((directive, line_no)),
                None => continue,
            }
            continue;
        }

        let tokens = tokenize(line);
        let Some(keyword) = tokens.first() else {
            continue;
        };
        match parse_simple(keyword, &tokens, line_no, source_label, &mut warnings) {
            Some(directive) => push_directive(&mut stack, &mut root, directive),
            None => continue,
        }
    }

    for (open, open_line) in stack.drain(..) {
        warn(
            &mut warnings,
            source_label,
            open_line,
            &format!("unclosed <{}> discarded", open.kind.keyword()),
        );
        let _ = open;
    }

    (root, warnings)
}

fn push_directive(stack: &mut Vec<(Directive, u32)>, root: &mut Vec<Directive>, directive: Directive) {
    if let Some((parent, _)) = stack.last_mut() {
        parent.children_mut().push(directive);
    } else {
        root.push(directive);
    }
}

fn warn(warnings: &mut Vec<ParseWarning>, source: &str, line: u32, message: &str) {
    warnings.push(ParseWarning {
        source: source.to_string(),
        line,
        message: message.to_string(),
    });
    #[cfg(feature = "tracing")]
    tracing::warn!(source, line, message, "htaccess parse warning");
}

/// Splits a line into whitespace-delimited tokens, treating a `"…"` run as
/// a single token (quotes retained — some executors need the leading `"`).
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            let mut tok = String::from("\"");
            chars.next();
            for c in chars.by_ref() {
                tok.push(c);
                if c == '"' {
                    break;
                }
            }
            tokens.push(tok);
            continue;
        }
        let mut tok = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            tok.push(c);
            chars.next();
        }
        tokens.push(tok);
    }
    tokens
}

fn unquote(tok: &str) -> &str {
    tok.trim_matches('"')
}

fn parse_opener(
    name: &str,
    tokens: &mut Vec<String>,
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "filesmatch" => {
            let pattern = tokens.get(1).map(|s| unquote(s).to_string())?;
            Some(
                Directive::new(Kind::FilesMatch, line).with_payload(Payload::Container {
                    pattern,
                    children: Vec::new(),
                }),
            )
        }
        "files" => {
            let pattern = tokens.get(1).map(|s| unquote(s).to_string())?;
            Some(
                Directive::new(Kind::Files, line).with_payload(Payload::Container {
                    pattern,
                    children: Vec::new(),
                }),
            )
        }
        "ifmodule" => {
            let arg = tokens.get(1).cloned()?;
            let negated = arg.starts_with('!');
            Some(
                Directive::new(Kind::IfModule, line)
                    .with_name(arg)
                    .with_payload(Payload::IfModule {
                        negated,
                        children: Vec::new(),
                    }),
            )
        }
        "requireany" => Some(
            Directive::new(Kind::RequireAny, line)
                .with_payload(Payload::Require { children: Vec::new() }),
        ),
        "requireall" => Some(
            Directive::new(Kind::RequireAll, line)
                .with_payload(Payload::Require { children: Vec::new() }),
        ),
        "limit" => {
            let methods = tokens[1..].iter().map(|s| unquote(s).to_string()).collect();
            Some(
                Directive::new(Kind::Limit, line).with_payload(Payload::Limit {
                    methods,
                    children: Vec::new(),
                }),
            )
        }
        "limitexcept" => {
            let methods = tokens[1..].iter().map(|s| unquote(s).to_string()).collect();
            Some(
                Directive::new(Kind::LimitExcept, line).with_payload(Payload::Limit {
                    methods,
                    children: Vec::new(),
                }),
            )
        }
        _ => {
            warn(warnings, source, line, &format!("unknown container <{name}>"));
            None
        }
    }
}

fn parse_simple(
    keyword: &str,
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let lower = keyword.to_ascii_lowercase();
    match lower.as_str() {
        "header" => parse_header(tokens, line, source, warnings, false),
        "requestheader" => parse_request_header(tokens, line, source, warnings),
        "php_value" => parse_php(tokens, line, Kind::PhpValue, Kind::PhpValue, source, warnings),
        "php_flag" => parse_php_flag(tokens, line, Kind::PhpFlag, source, warnings),
        "php_admin_value" => {
            parse_php(tokens, line, Kind::PhpAdminValue, Kind::PhpAdminValue, source, warnings)
        }
        "php_admin_flag" => parse_php_flag(tokens, line, Kind::PhpAdminFlag, source, warnings),
        "order" => parse_order(tokens, line, source, warnings),
        "allow" => parse_acl(tokens, line, Kind::AllowFrom, source, warnings),
        "deny" => parse_acl(tokens, line, Kind::DenyFrom, source, warnings),
        "redirect" => parse_redirect(tokens, line, source, warnings),
        "redirectmatch" => parse_redirect_match(tokens, line, source, warnings),
        "errordocument" => parse_error_document(tokens, line, source, warnings),
        "expiresactive" => parse_expires_active(tokens, line, source, warnings),
        "expiresbytype" => parse_expires_by_type(tokens, line, source, warnings),
        "expiresdefault" => parse_expires_default(tokens, line, source, warnings),
        "setenv" => parse_set_env(tokens, line, source, warnings),
        "setenvif" => parse_env_if(tokens, line, Kind::SetEnvIf, source, warnings),
        "browsermatch" => parse_browser_match(tokens, line, source, warnings),
        "bruteforceprotection" => parse_bool(tokens, line, Kind::BruteForceProtection, source, warnings),
        "bruteforceallowedattempts" => {
            parse_number(tokens, line, Kind::BruteForceAllowedAttempts, source, warnings)
        }
        "bruteforcewindow" => parse_number(tokens, line, Kind::BruteForceWindow, source, warnings),
        "bruteforceaction" => parse_bruteforce_action(tokens, line, source, warnings),
        "bruteforcethrottleduration" => {
            parse_number(tokens, line, Kind::BruteForceThrottleDuration, source, warnings)
        }
        "bruteforcexforwardedfor" => {
            parse_bool(tokens, line, Kind::BruteForceXForwardedFor, source, warnings)
        }
        "bruteforcewhitelist" => Some(
            Directive::new(Kind::BruteForceWhitelist, line)
                .with_value(tokens[1..].join(" ")),
        ),
        "bruteforceprotectpath" => {
            let value = tokens.get(1)?;
            Some(Directive::new(Kind::BruteForceProtectPath, line).with_value(unquote(value)))
        }
        "options" => parse_options(tokens, line, source, warnings),
        "require" => parse_require(tokens, line, source, warnings),
        "authtype" => Some(Directive::new(Kind::AuthType, line).with_value(tokens.get(1)?.clone())),
        "authname" => Some(Directive::new(Kind::AuthName, line).with_value(unquote(tokens.get(1)?))),
        "authuserfile" => {
            Some(Directive::new(Kind::AuthUserFile, line).with_value(unquote(tokens.get(1)?)))
        }
        "addhandler" => Some(
            Directive::new(Kind::AddHandler, line)
                .with_name(tokens.get(1)?.clone())
                .with_value(tokens[2..].join(" ")),
        ),
        "sethandler" => Some(Directive::new(Kind::SetHandler, line).with_value(tokens.get(1)?.clone())),
        "addtype" => Some(
            Directive::new(Kind::AddType, line)
                .with_name(tokens.get(1)?.clone())
                .with_value(tokens[2..].join(" ")),
        ),
        "directoryindex" => {
            Some(Directive::new(Kind::DirectoryIndex, line).with_value(tokens[1..].join(" ")))
        }
        "forcetype" => Some(Directive::new(Kind::ForceType, line).with_value(tokens.get(1)?.clone())),
        "addencoding" => Some(
            Directive::new(Kind::AddEncoding, line)
                .with_name(tokens.get(1)?.clone())
                .with_value(tokens[2..].join(" ")),
        ),
        "addcharset" => Some(
            Directive::new(Kind::AddCharset, line)
                .with_name(tokens.get(1)?.clone())
                .with_value(tokens[2..].join(" ")),
        ),
        _ => {
            warn(warnings, source, line, &format!("unknown directive '{keyword}'"));
            None
        }
    }
}

fn parse_header(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
    _unused: bool,
) -> Option<Directive> {
    let first = tokens.get(1)?.to_ascii_lowercase();
    let always = first == "always";
    let mode_idx = if always { 2 } else { 1 };
    let mode = tokens.get(mode_idx)?.to_ascii_lowercase();
    let kind = match (always, mode.as_str()) {
        (false, "set") => Kind::HeaderSet,
        (false, "unset") => Kind::HeaderUnset,
        (false, "append") => Kind::HeaderAppend,
        (false, "merge") => Kind::HeaderMerge,
        (false, "add") => Kind::HeaderAdd,
        (true, "set") => Kind::HeaderAlwaysSet,
        (true, "unset") => Kind::HeaderAlwaysUnset,
        (true, "append") => Kind::HeaderAlwaysAppend,
        (true, "merge") => Kind::HeaderAlwaysMerge,
        (true, "add") => Kind::HeaderAlwaysAdd,
        _ => {
            warn(warnings, source, line, "unknown Header mode");
            return None;
        }
    };
    let name = tokens.get(mode_idx + 1)?.clone();
    let value = tokens.get(mode_idx + 2).map(|s| unquote(s).to_string());
    let mut directive = Directive::new(kind, line).with_name(name);
    if let Some(value) = value {
        directive = directive.with_value(value);
    }
    Some(directive)
}

fn parse_request_header(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let mode = tokens.get(1)?.to_ascii_lowercase();
    let kind = match mode.as_str() {
        "set" => Kind::RequestHeaderSet,
        "unset" => Kind::RequestHeaderUnset,
        _ => {
            warn(warnings, source, line, "unknown RequestHeader mode");
            return None;
        }
    };
    let name = tokens.get(2)?.clone();
    let value = tokens.get(3).map(|s| unquote(s).to_string());
    let mut directive = Directive::new(kind, line).with_name(name);
    if let Some(value) = value {
        directive = directive.with_value(value);
    }
    Some(directive)
}

fn parse_php(
    tokens: &[String],
    line: u32,
    kind: Kind,
    _kind2: Kind,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let name = tokens.get(1)?.clone();
    let value = tokens.get(2..)?.join(" ");
    Some(Directive::new(kind, line).with_name(name).with_value(value))
}

fn parse_php_flag(
    tokens: &[String],
    line: u32,
    kind: Kind,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let name = tokens.get(1)?.clone();
    let raw = tokens.get(2)?.to_ascii_lowercase();
    if raw != "on" && raw != "off" {
        warn(warnings, source, line, &format!("{kind:?} value must be on/off"));
        return None;
    }
    Some(Directive::new(kind, line).with_name(name).with_value(raw))
}

fn parse_order(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let operand = tokens.get(1)?.replace(' ', "").to_ascii_lowercase();
    let mode = match operand.as_str() {
        "allow,deny" => OrderMode::AllowDeny,
        "deny,allow" => OrderMode::DenyAllow,
        _ => {
            warn(warnings, source, line, "unknown Order operand");
            return None;
        }
    };
    Some(Directive::new(Kind::Order, line).with_payload(Payload::Order(mode)))
}

fn parse_acl(
    tokens: &[String],
    line: u32,
    kind: Kind,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    if !tokens.get(1).is_some_and(|t| t.eq_ignore_ascii_case("from")) {
        warn(warnings, source, line, "expected 'from'");
        return None;
    }
    let value = tokens[2..].join(" ");
    if value.is_empty() {
        return None;
    }
    Some(Directive::new(kind, line).with_value(value))
}

fn parse_redirect(
    tokens: &[String],
    line: u32,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let mut idx = 1;
    let status_code = tokens
        .get(idx)
        .and_then(|t| t.parse::<u16>().ok())
        .map(|code| {
            idx += 1;
            code
        })
        .unwrap_or(302);
    let prefix = tokens.get(idx)?.clone();
    let value = tokens.get(idx + 1..)?.join(" ");
    Some(
        Directive::new(Kind::Redirect, line)
            .with_name(prefix)
            .with_value(value)
            .with_payload(Payload::Redirect {
                status_code,
                pattern: None,
            }),
    )
}

fn parse_redirect_match(
    tokens: &[String],
    line: u32,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let mut idx = 1;
    let status_code = tokens
        .get(idx)
        .and_then(|t| t.parse::<u16>().ok())
        .map(|code| {
            idx += 1;
            code
        })
        .unwrap_or(302);
    let pattern = unquote(tokens.get(idx)?).to_string();
    let value = tokens.get(idx + 1..)?.join(" ");
    Some(
        Directive::new(Kind::RedirectMatch, line)
            .with_value(value)
            .with_payload(Payload::Redirect {
                status_code,
                pattern: Some(pattern),
            }),
    )
}

fn parse_error_document(
    tokens: &[String],
    line: u32,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let code: u16 = tokens.get(1)?.parse().ok()?;
    let value = tokens.get(2..)?.join(" ");
    Some(
        Directive::new(Kind::ErrorDocument, line)
            .with_value(value)
            .with_payload(Payload::ErrorCode(code)),
    )
}

fn parse_expires_active(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let raw = tokens.get(1)?.to_ascii_lowercase();
    let enabled = match raw.as_str() {
        "on" => true,
        "off" => false,
        _ => {
            warn(warnings, source, line, "ExpiresActive expects On/Off");
            return None;
        }
    };
    Some(Directive::new(Kind::ExpiresActive, line).with_payload(Payload::Bool(enabled)))
}

fn parse_expires_by_type(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let mime = tokens.get(1)?.clone();
    let raw = unquote(tokens.get(2)?).to_string();
    let Some(duration_sec) = expires::parse_duration(&raw) else {
        warn(warnings, source, line, "unparsable expires duration");
        return None;
    };
    Some(
        Directive::new(Kind::ExpiresByType, line)
            .with_name(mime)
            .with_value(raw)
            .with_payload(Payload::Expires { duration_sec }),
    )
}

fn parse_expires_default(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let raw = unquote(tokens.get(1)?).to_string();
    let Some(duration_sec) = expires::parse_duration(&raw) else {
        warn(warnings, source, line, "unparsable expires duration");
        return None;
    };
    Some(
        Directive::new(Kind::ExpiresDefault, line)
            .with_value(raw)
            .with_payload(Payload::Expires { duration_sec }),
    )
}

fn parse_set_env(
    tokens: &[String],
    line: u32,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let name = tokens.get(1)?.clone();
    let value = tokens.get(2..)?.join(" ");
    Some(Directive::new(Kind::SetEnv, line).with_name(name).with_value(value))
}

fn parse_attribute(token: &str) -> EnvAttribute {
    match token.to_ascii_lowercase().as_str() {
        "remote_addr" => EnvAttribute::RemoteAddr,
        "request_uri" => EnvAttribute::RequestUri,
        "user-agent" | "user_agent" => EnvAttribute::UserAgent,
        _ => EnvAttribute::Header(token.to_string()),
    }
}

fn parse_env_if(
    tokens: &[String],
    line: u32,
    kind: Kind,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let attribute = parse_attribute(tokens.get(1)?);
    let pattern = unquote(tokens.get(2)?).to_string();
    let (name, value) = tokens.get(3)?.split_once('=')?;
    Some(
        Directive::new(kind, line)
            .with_name(name.to_string())
            .with_value(value.to_string())
            .with_payload(Payload::EnvIf { attribute, pattern }),
    )
}

fn parse_browser_match(
    tokens: &[String],
    line: u32,
    _source: &str,
    _warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let pattern = unquote(tokens.get(1)?).to_string();
    let (name, value) = tokens.get(2)?.split_once('=')?;
    Some(
        Directive::new(Kind::BrowserMatch, line)
            .with_name(name.to_string())
            .with_value(value.to_string())
            .with_payload(Payload::EnvIf {
                attribute: EnvAttribute::UserAgent,
                pattern,
            }),
    )
}

fn parse_bool(
    tokens: &[String],
    line: u32,
    kind: Kind,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let raw = tokens.get(1)?.to_ascii_lowercase();
    let enabled = match raw.as_str() {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => {
            warn(warnings, source, line, &format!("{kind:?} expects on/off"));
            return None;
        }
    };
    Some(Directive::new(kind, line).with_payload(Payload::Bool(enabled)))
}

fn parse_number(
    tokens: &[String],
    line: u32,
    kind: Kind,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    match tokens.get(1)?.parse::<u64>() {
        Ok(n) => Some(Directive::new(kind, line).with_payload(Payload::Number(n))),
        Err(_) => {
            warn(warnings, source, line, &format!("{kind:?} expects a non-negative integer"));
            None
        }
    }
}

fn parse_bruteforce_action(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let raw = tokens.get(1)?.to_ascii_lowercase();
    let action = match raw.as_str() {
        "block" => BruteAction::Block,
        "throttle" => BruteAction::Throttle,
        _ => {
            warn(warnings, source, line, "BruteForceAction expects block/throttle");
            return None;
        }
    };
    Some(Directive::new(Kind::BruteForceAction, line).with_payload(Payload::BruteAction(action)))
}

fn parse_options(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let mut flags = OptionFlags::default();
    for tok in &tokens[1..] {
        let (sign, name) = match tok.split_at(1) {
            ("+", rest) => (1, rest),
            ("-", rest) => (-1, rest),
            _ => {
                warn(warnings, source, line, &format!("Options flag '{tok}' missing +/- prefix"));
                continue;
            }
        };
        match name.to_ascii_lowercase().as_str() {
            "indexes" => flags.indexes = sign,
            "followsymlinks" => flags.follow_symlinks = sign,
            "multiviews" => flags.multi_views = sign,
            "execcgi" => flags.exec_cgi = sign,
            _ => {
                warn(warnings, source, line, &format!("unknown Options flag '{name}'"));
            }
        }
    }
    Some(Directive::new(Kind::Options, line).with_payload(Payload::Options(flags)))
}

fn parse_require(
    tokens: &[String],
    line: u32,
    source: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Directive> {
    let first = tokens.get(1)?.to_ascii_lowercase();
    match first.as_str() {
        "all" => {
            let second = tokens.get(2)?.to_ascii_lowercase();
            match second.as_str() {
                "granted" => Some(Directive::new(Kind::RequireAllGranted, line)),
                "denied" => Some(Directive::new(Kind::RequireAllDenied, line)),
                _ => {
                    warn(warnings, source, line, "Require all expects granted/denied");
                    None
                }
            }
        }
        "valid-user" => Some(Directive::new(Kind::RequireValidUser, line)),
        "ip" => Some(Directive::new(Kind::RequireIp, line).with_value(tokens.get(2)?.clone())),
        "not" => {
            let kind_tok = tokens.get(2)?.to_ascii_lowercase();
            if kind_tok != "ip" {
                warn(warnings, source, line, "Require not expects ip");
                return None;
            }
            Some(Directive::new(Kind::RequireNotIp, line).with_value(tokens.get(3)?.clone()))
        }
        _ => {
            warn(warnings, source, line, "unknown Require operand");
            None
        }
    }
}
