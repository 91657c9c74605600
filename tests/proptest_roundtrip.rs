//! Property tests for the parser/printer round-trip and the parse cache's
//! mtime-keyed invalidation, covering spec §8's "Universal properties".

use htdirectives::parser::parse;
use htdirectives::printer::print;
use htdirectives::ParseCache;
use htdirectives::directive::{Directive, Kind};
use proptest::prelude::*;

/// A handful of independently valid single-line/single-block directive
/// snippets, combined in random order and count. Every generated string is
/// guaranteed parseable without warnings, so the round-trip property can be
/// checked exactly rather than approximately.
fn directive_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Header set X-Frame-Options DENY\n".to_string()),
        Just("Header unset X-Powered-By\n".to_string()),
        Just("Header always append X-A 1\n".to_string()),
        Just("RequestHeader set X-Req 1\n".to_string()),
        Just("Order Allow,Deny\n".to_string()),
        Just("Order Deny,Allow\n".to_string()),
        Just("Allow from 10.0.0.0/8\n".to_string()),
        Just("Deny from all\n".to_string()),
        Just("Redirect /a /b\n".to_string()),
        Just("Redirect 301 /old /new\n".to_string()),
        Just("RedirectMatch ^/x/(.+)$ /y/$1\n".to_string()),
        Just("ErrorDocument 404 \"not found\n".to_string()),
        Just("ExpiresActive On\n".to_string()),
        Just("ExpiresByType text/html \"access plus 1 hour\"\n".to_string()),
        Just("ExpiresDefault \"access plus 1 day\"\n".to_string()),
        Just("SetEnv FOO bar\n".to_string()),
        Just("SetEnvIf Remote_Addr \"^10\\.\" internal\n".to_string()),
        Just("BrowserMatch \"MSIE\" is_ie\n".to_string()),
        Just("BruteForceProtection On\n".to_string()),
        Just("BruteForceAllowedAttempts 5\n".to_string()),
        Just("BruteForceWindow 300\n".to_string()),
        Just("BruteForceAction block\n".to_string()),
        Just("<FilesMatch \"\\.php$\">\nHeader set X-PHP yes\n</FilesMatch>\n".to_string()),
        Just("<IfModule mod_headers.c>\nHeader set X-H yes\n</IfModule>\n".to_string()),
        Just("<Limit GET POST>\nHeader set X-L yes\n</Limit>\n".to_string()),
        Just("AuthType Basic\n".to_string()),
        Just("AuthUserFile /etc/htpasswd\n".to_string()),
        Just("Require valid-user\n".to_string()),
        Just("Require all granted\n".to_string()),
        Just("Require ip 10.0.0.0/8\n".to_string()),
        Just("AddHandler cgi-script .cgi\n".to_string()),
        Just("DirectoryIndex index.html index.php\n".to_string()),
        Just("Options +Indexes -FollowSymLinks\n".to_string()),
    ]
}

proptest! {
    /// `parse(print(directives)) == directives` for any combination of
    /// independently-valid snippets, in any order.
    #[test]
    fn parse_print_round_trips(lines in proptest::collection::vec(directive_line(), 0..20)) {
        let text = lines.concat();
        let (directives, warnings) = parse(&text, "t");
        prop_assert!(warnings.is_empty(), "unexpected warnings parsing generated text: {warnings:?}\n{text}");

        let printed = print(&directives);
        let (reparsed, warnings2) = parse(&printed, "t2");
        prop_assert!(warnings2.is_empty(), "unexpected warnings on reparse: {warnings2:?}\n{printed}");
        prop_assert_eq!(directives, reparsed);
    }

    /// The parser never panics on arbitrary byte soup, regardless of how
    /// malformed — worst case it should emit warnings and an empty or
    /// partial list, never abort.
    #[test]
    fn parse_never_panics_on_arbitrary_input(input in "\\PC{0,500}") {
        let _ = parse(&input, "fuzz");
    }

    /// Lines that merely start with a recognized keyword but are otherwise
    /// garbage must not panic the tokenizer or any per-kind parse helper.
    #[test]
    fn parse_never_panics_on_keyword_prefixed_garbage(
        keyword in prop::sample::select(vec![
            "Header", "RequestHeader", "Order", "Allow", "Deny", "Redirect",
            "RedirectMatch", "ErrorDocument", "ExpiresActive", "ExpiresByType",
            "SetEnv", "SetEnvIf", "BrowserMatch", "BruteForceAction",
            "AuthType", "Require", "Options", "php_value", "php_flag",
        ]),
        suffix in "[ -~]{0,60}",
    ) {
        let input = format!("{keyword} {suffix}\n");
        let _ = parse(&input, "fuzz");
    }
}

proptest! {
    /// The parse cache only ever returns a hit when the stored mtime
    /// exactly matches the probed mtime; any other mtime is a miss, never
    /// stale data.
    #[test]
    fn cache_hits_only_on_exact_mtime_match(
        stored_mtime in any::<i64>(),
        probed_mtime in any::<i64>(),
    ) {
        let cache = ParseCache::init(4);
        let directives = vec![Directive::new(Kind::Order, 1)];
        cache.put("/x/.htaccess".to_string(), stored_mtime, directives.clone());

        let result = cache.get("/x/.htaccess", probed_mtime);
        if stored_mtime == probed_mtime {
            prop_assert_eq!(result, Some(directives));
        } else {
            prop_assert_eq!(result, None);
        }
    }
}
