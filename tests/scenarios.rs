//! End-to-end scenarios: literal `.htaccess` inputs executed against a
//! mock session, checked against the exact outputs each directive's
//! documented behavior calls for.

mod support;

use htdirectives::exec::auth::PasswordFileReader;
use htdirectives::exec::{on_receive_request_header, on_send_response_header, RequestOutcome};
use htdirectives::parser::parse;
use htdirectives::IpStore;
use support::MockSession;

struct NoPasswordFile;
impl PasswordFileReader for NoPasswordFile {
    fn read(&self, _path: &str) -> Option<String> {
        None
    }
}

fn request(directives: &[htdirectives::Directive], uri: &str, client_ip: &str) -> (RequestOutcome, MockSession) {
    let mut session = MockSession::default();
    session.uri = uri.to_string();
    session.client_ip = client_ip.to_string();
    session.method = "GET".to_string();
    let store = IpStore::init();
    let outcome = on_receive_request_header(directives, &mut session, &store, &NoPasswordFile, 0);
    (outcome, session)
}

#[test]
fn scenario_1_redirect_short_circuits() {
    let (directives, warnings) = parse("Redirect 301 /old /new\n", "t");
    assert!(warnings.is_empty());
    let (outcome, session) = request(&directives, "/old/page", "1.2.3.4");
    assert_eq!(outcome, RequestOutcome::ShortCircuit);
    assert_eq!(session.status(), 301);
    assert_eq!(session.response_header("Location"), Some("/new".to_string()));
}

#[test]
fn scenario_2_redirect_match_substitutes_groups() {
    let (directives, _) = parse(
        "RedirectMatch ^/blog/([0-9]+)/(.+)$ https://new.example.com/$2/$1\n",
        "t",
    );
    let (outcome, session) = request(&directives, "/blog/2024/hello", "1.2.3.4");
    assert_eq!(outcome, RequestOutcome::ShortCircuit);
    assert_eq!(session.status(), 302);
    assert_eq!(
        session.response_header("Location"),
        Some("https://new.example.com/hello/2024".to_string())
    );
}

#[test]
fn scenario_3_order_deny_allow_acl() {
    let (directives, _) = parse("Order Deny,Allow\nDeny from all\nAllow from 10.0.0.0/8\n", "t");
    let (outcome, session) = request(&directives, "/", "10.5.3.1");
    assert_eq!(outcome, RequestOutcome::Continue);
    assert_eq!(session.status(), 0);

    let (outcome, session) = request(&directives, "/", "8.8.8.8");
    assert_eq!(outcome, RequestOutcome::ShortCircuit);
    assert_eq!(session.status(), 403);
}

#[test]
fn scenario_4_directory_override_child_wins() {
    use htdirectives::walker::{DirectoryWalker, EngineConfig, FileProbe};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    struct FakeProbe(HashMap<PathBuf, (i64, String)>);
    impl FileProbe for FakeProbe {
        fn mtime(&self, path: &Path) -> Option<i64> {
            self.0.get(path).map(|(m, _)| *m)
        }
        fn read(&self, path: &Path) -> Option<String> {
            self.0.get(path).map(|(_, c)| c.clone())
        }
    }

    let mut files = HashMap::new();
    files.insert(PathBuf::from("/var/www/.htaccess"), (1, "Header set X-H parent\n".to_string()));
    files.insert(PathBuf::from("/var/www/sub/.htaccess"), (1, "Header set X-H child\n".to_string()));

    let cache = htdirectives::ParseCache::init(16);
    let walker = DirectoryWalker::new(&cache, FakeProbe(files), EngineConfig::default());
    let merged = walker.walk(Path::new("/var/www"), Path::new("/var/www/sub")).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].value.as_deref(), Some("child"));
}

#[test]
fn scenario_5_bruteforce_blocks_third_attempt() {
    let text = "BruteForceProtection On\nBruteForceAllowedAttempts 2\nBruteForceWindow 300\nBruteForceAction block\n";
    let (directives, _) = parse(text, "t");
    let store = IpStore::init();

    let mut session = MockSession::default();
    session.client_ip = "1.2.3.4".to_string();
    session.uri = "/".to_string();
    session.method = "GET".to_string();

    let outcome = on_receive_request_header(&directives, &mut session, &store, &NoPasswordFile, 0);
    assert_eq!(outcome, RequestOutcome::Continue);

    let mut session2 = MockSession::default();
    session2.client_ip = "1.2.3.4".to_string();
    session2.uri = "/".to_string();
    session2.method = "GET".to_string();
    let outcome = on_receive_request_header(&directives, &mut session2, &store, &NoPasswordFile, 1);
    assert_eq!(outcome, RequestOutcome::Continue);

    let mut session3 = MockSession::default();
    session3.client_ip = "1.2.3.4".to_string();
    session3.uri = "/".to_string();
    session3.method = "GET".to_string();
    let outcome = on_receive_request_header(&directives, &mut session3, &store, &NoPasswordFile, 2);
    assert_eq!(outcome, RequestOutcome::ShortCircuit);
    assert_eq!(session3.status(), 403);
}

#[test]
fn scenario_6_basic_auth_correct_and_wrong_password() {
    use base64::Engine as _;
    use htdirectives::exec::auth::apply;

    struct FakeReader(String);
    impl PasswordFileReader for FakeReader {
        fn read(&self, _path: &str) -> Option<String> {
            Some(self.0.clone())
        }
    }

    // crypt(3) DES hash for "hunter2" with salt "ab", verified via `pwhash::unix::verify`
    // in src/exec/auth.rs's non-`$apr1$` branch.
    let hash = pwhash::unix::crypt("hunter2", "ab").expect("crypt hash");
    let reader = FakeReader(format!("alice:{hash}\n"));

    let (directives, _) = parse(
        "AuthType Basic\nAuthName \"Restricted\"\nAuthUserFile /etc/htpasswd\nRequire valid-user\n",
        "t",
    );

    let mut session = MockSession::default();
    session.authorization = Some(format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("alice:hunter2")
    ));
    let outcome = apply(&directives, &mut session, &reader);
    assert_eq!(outcome, htdirectives::exec::auth::AuthOutcome::Allowed);

    let mut session = MockSession::default();
    session.authorization = Some(format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("alice:wrong")
    ));
    let outcome = apply(&directives, &mut session, &reader);
    assert_eq!(outcome, htdirectives::exec::auth::AuthOutcome::Denied);
    assert_eq!(session.status(), 401);
    assert!(session.www_authenticate.unwrap().contains("realm=\"Restricted\""));
}

#[test]
fn response_phase_applies_headers_filesmatch_expires_and_errordocument() {
    let text = "\
Header set X-Global yes
<FilesMatch \"\\.php$\">
Header set X-PHP yes
</FilesMatch>
ExpiresActive On
ExpiresByType text/html \"access plus 1 hour\"
ErrorDocument 404 \"Not found here\n";
    let (directives, warnings) = parse(text, "t");
    assert!(warnings.is_empty());

    let mut session = MockSession::default();
    session.set_response_header("Content-Type", "text/html");
    on_send_response_header(&directives, &mut session);
    assert_eq!(session.response_header("X-Global"), Some("yes".to_string()));
    assert_eq!(session.response_header("Cache-Control"), Some("max-age=3600".to_string()));

    let mut session = MockSession::default();
    session.uri = "/index.php".to_string();
    on_send_response_header(&directives, &mut session);
    assert_eq!(session.response_header("X-PHP"), Some("yes".to_string()));

    let mut session = MockSession::default();
    session.set_status(404);
    on_send_response_header(&directives, &mut session);
    assert_eq!(session.body, Some(b"Not found here".to_vec()));
}
