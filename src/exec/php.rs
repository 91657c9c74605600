//! `php_value` / `php_flag` / `php_admin_value` / `php_admin_flag` executor
//! (§4.7 "PHP family").

use crate::directive::{Directive, Kind};
use crate::session::{LogLevel, Session};

/// PHP_INI_SYSTEM settings that `php_value`/`php_flag` may never touch.
/// `php_admin_value`/`php_admin_flag` bypass this list entirely. Per the
/// resolved open question in §9, `memory_limit`, `max_input_time`,
/// `post_max_size`, `upload_max_filesize`, and `safe_mode` are
/// deliberately NOT listed here — they are PHP_INI_PERDIR and settable
/// from `.htaccess`.
const SYSTEM_BLACKLIST: &[&str] = &[
    "allow_url_fopen",
    "allow_url_include",
    "disable_classes",
    "disable_functions",
    "engine",
    "expose_php",
    "open_basedir",
    "realpath_cache_size",
    "realpath_cache_ttl",
    "upload_tmp_dir",
    "max_file_uploads",
    "sys_temp_dir",
];

fn is_blacklisted(name: &str) -> bool {
    SYSTEM_BLACKLIST.iter().any(|&s| s.eq_ignore_ascii_case(name))
}

/// Applies every PHP ini directive in order, pushing `(name, value,
/// is_admin)` records onto the session. User-level settings naming a
/// blacklisted PHP_INI_SYSTEM setting are skipped with a warning.
pub fn apply(directives: &[Directive], session: &mut dyn Session) {
    for d in directives {
        let (is_admin, name, value) = match d.kind {
            Kind::PhpValue => (false, &d.name, &d.value),
            Kind::PhpFlag => (false, &d.name, &d.value),
            Kind::PhpAdminValue => (true, &d.name, &d.value),
            Kind::PhpAdminFlag => (true, &d.name, &d.value),
            _ => continue,
        };
        let (Some(name), Some(value)) = (name, value) else { continue };
        if !is_admin && is_blacklisted(name) {
            session.log(LogLevel::Warn, &format!("php ini setting '{name}' is PHP_INI_SYSTEM, skipped"));
            continue;
        }
        session.push_php_ini(name, value, is_admin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::session::mock::MockSession;

    #[test]
    fn blacklisted_setting_is_skipped_for_user_level() {
        let (directives, _) = parse("php_value open_basedir /tmp\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert!(session.php_ini.is_empty());
    }

    #[test]
    fn blacklisted_setting_is_accepted_for_admin_level() {
        let (directives, _) = parse("php_admin_value open_basedir /tmp\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert_eq!(session.php_ini.len(), 1);
        assert!(session.php_ini[0].2);
    }

    #[test]
    fn perdir_settings_are_not_blacklisted() {
        let (directives, _) = parse("php_value memory_limit 256M\nphp_value max_input_time 60\n", "t");
        let mut session = MockSession::default();
        apply(&directives, &mut session);
        assert_eq!(session.php_ini.len(), 2);
    }
}
