//! `AuthType Basic` executor (§4.7 "Auth Basic"). Verifies credentials
//! from the `Authorization` request header against an `AuthUserFile`
//! (`user:hash` per line), accepting classic `crypt(3)` DES, `$apr1$` MD5,
//! and `$2y$` bcrypt hashes.
//!
//! bcrypt and classic DES-crypt verification are delegated to the
//! `pwhash` crate (an ecosystem enrichment dependency, documented in
//! `DESIGN.md`); `$apr1$` is implemented directly against the `md-5` crate
//! the same way the `checksums` module already depends on an MD5 primitive
//! for rsync's legacy checksum algorithm.

use crate::directive::{Directive, Kind};
use crate::session::{LogLevel, Session};
use base64::Engine as _;
use md5::{Digest, Md5};

/// Outcome of a `Basic` auth pass. `NotRequired` means no `AuthType
/// Basic` + `Require valid-user` pair was configured — the dispatcher
/// proceeds without touching status/headers.
#[derive(Debug, Eq, PartialEq)]
pub enum AuthOutcome {
    NotRequired,
    Allowed,
    /// Status already set on the session (401 or 500); dispatcher must
    /// short-circuit.
    Denied,
}

pub trait PasswordFileReader {
    fn read(&self, path: &str) -> Option<String>;
}

pub struct StdPasswordFileReader;

impl PasswordFileReader for StdPasswordFileReader {
    fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

struct AuthConfig<'a> {
    auth_type: Option<&'a str>,
    auth_name: Option<&'a str>,
    auth_user_file: Option<&'a str>,
    require_valid_user: bool,
}

fn gather(directives: &[Directive]) -> AuthConfig<'_> {
    let mut config = AuthConfig {
        auth_type: None,
        auth_name: None,
        auth_user_file: None,
        require_valid_user: false,
    };
    for d in directives {
        match d.kind {
            Kind::AuthType => config.auth_type = d.value.as_deref(),
            Kind::AuthName => config.auth_name = d.value.as_deref(),
            Kind::AuthUserFile => config.auth_user_file = d.value.as_deref(),
            Kind::RequireValidUser => config.require_valid_user = true,
            _ => {}
        }
    }
    config
}

pub fn apply<R: PasswordFileReader>(directives: &[Directive], session: &mut dyn Session, reader: &R) -> AuthOutcome {
    let config = gather(directives);

    let Some(auth_type) = config.auth_type else { return AuthOutcome::NotRequired };
    if !auth_type.eq_ignore_ascii_case("basic") {
        return AuthOutcome::NotRequired;
    }
    if !config.require_valid_user {
        return AuthOutcome::NotRequired;
    }

    let Some(user_file) = config.auth_user_file else {
        session.log(LogLevel::Error, "AuthUserFile not specified");
        session.set_status(500);
        return AuthOutcome::Denied;
    };

    let deny_401 = |session: &mut dyn Session| {
        if let Some(realm) = config.auth_name {
            session.set_www_authenticate(realm);
        }
        session.set_status(401);
        AuthOutcome::Denied
    };

    let Some((user, pass)) = session
        .authorization_header()
        .as_deref()
        .and_then(parse_basic_auth)
    else {
        return deny_401(session);
    };

    let Some(contents) = reader.read(user_file) else {
        session.log(LogLevel::Error, &format!("cannot open AuthUserFile '{user_file}'"));
        session.set_status(500);
        return AuthOutcome::Denied;
    };

    let authenticated = contents
        .lines()
        .filter_map(|line| line.split_once(':'))
        .any(|(line_user, hash)| line_user == user && crypt_verify(hash, &pass));

    if authenticated {
        AuthOutcome::Allowed
    } else {
        deny_401(session)
    }
}

fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let b64 = header.strip_prefix("Basic ").or_else(|| header.strip_prefix("basic "))?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(b64.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn crypt_verify(hash: &str, password: &str) -> bool {
    if let Some(rest) = hash.strip_prefix("$apr1$") {
        return apr1_verify(rest, password);
    }
    pwhash::unix::verify(password, hash)
}

/// Verifies against an `$apr1$salt$digest` hash (the leading `$apr1$` is
/// already stripped from `rest`). Mirrors the standard `crypt-md5`
/// algorithm used by both glibc's `$1$` and Apache's `$apr1$` schemes,
/// which differ only in their magic string.
fn apr1_verify(rest: &str, password: &str) -> bool {
    let Some((salt, _digest)) = rest.split_once('$') else { return false };
    let salt = &salt[..salt.len().min(8)];
    let computed = apr1_hash(password.as_bytes(), salt.as_bytes());
    computed == rest
}

const TO64: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const APR1_MAGIC: &[u8] = b"$apr1$";

fn apr1_hash(password: &[u8], salt: &[u8]) -> String {
    let mut ctx1 = Md5::new();
    ctx1.update(password);
    ctx1.update(APR1_MAGIC);
    ctx1.update(salt);
    ctx1.update(password);
    let final_hash: [u8; 16] = ctx1.finalize().into();

    let mut ctx = Md5::new();
    ctx.update(password);
    ctx.update(APR1_MAGIC);
    ctx.update(salt);

    let mut remaining = password.len();
    while remaining > 0 {
        let take = remaining.min(16);
        ctx.update(&final_hash[..take]);
        remaining -= take;
    }

    let mut i = password.len();
    while i > 0 {
        if i & 1 != 0 {
            ctx.update([0u8]);
        } else {
            ctx.update(&password[..1]);
        }
        i >>= 1;
    }

    let mut final_hash: [u8; 16] = ctx.finalize().into();

    for i in 0..1000 {
        let mut round = Md5::new();
        if i % 2 != 0 {
            round.update(password);
        } else {
            round.update(final_hash);
        }
        if i % 3 != 0 {
            round.update(salt);
        }
        if i % 7 != 0 {
            round.update(password);
        }
        if i % 2 != 0 {
            round.update(final_hash);
        } else {
            round.update(password);
        }
        final_hash = round.finalize().into();
    }

    let mut out = Vec::with_capacity(22);
    let triples: [(usize, usize, usize); 5] = [(0, 6, 12), (1, 7, 13), (2, 8, 14), (3, 9, 15), (4, 10, 5)];
    for (a, b, c) in triples {
        let value = ((final_hash[a] as u32) << 16) | ((final_hash[b] as u32) << 8) | final_hash[c] as u32;
        to64(&mut out, value, 4);
    }
    to64(&mut out, final_hash[11] as u32, 2);

    let salt_str = String::from_utf8_lossy(salt);
    let out_str = String::from_utf8(out).expect("to64 output is ASCII");
    format!("{salt_str}${out_str}")
}

fn to64(out: &mut Vec<u8>, mut value: u32, count: usize) {
    for _ in 0..count {
        out.push(TO64[(value & 0x3f) as usize]);
        value >>= 6;
    }
}
