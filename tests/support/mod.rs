//! Shared `Session` test double for integration tests, in the same
//! `test-support` crate convention used elsewhere: one fixture module
//! reused across multiple test files rather than each test file rolling
//! its own. Deliberately not shared with the unit-test
//! `session::mock::MockSession` inside the crate — that copy only needs a
//! sliver of the surface for its own module's tests, this one exercises the
//! full `Session` trait end to end.

use htdirectives::directive::OptionFlags;
use htdirectives::session::{LogLevel, Session};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
pub struct MockSession {
    pub request_headers: HashMap<String, String>,
    pub response_headers: Vec<(String, String)>,
    pub env: HashMap<String, String>,
    pub status: u16,
    pub uri: String,
    pub method: String,
    pub document_root: String,
    pub client_ip: String,
    pub php_ini: Vec<(String, String, bool)>,
    pub body: Option<Vec<u8>>,
    pub options: OptionFlags,
    pub authorization: Option<String>,
    pub www_authenticate: Option<String>,
    pub files: Vec<String>,
    pub logs: RefCell<Vec<String>>,
    pub directory_hints: HashMap<String, String>,
    pub loaded_modules: Vec<String>,
}

impl Session for MockSession {
    fn request_header(&self, name: &str) -> Option<String> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.request_headers.insert(name.to_string(), value.to_string());
    }

    fn remove_request_header(&mut self, name: &str) {
        self.request_headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }

    fn response_header(&self, name: &str) -> Option<String> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn response_header_count(&self, name: &str) -> usize {
        self.response_headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .count()
    }

    fn set_response_header(&mut self, name: &str, value: &str) {
        self.response_headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response_headers.push((name.to_string(), value.to_string()));
    }

    fn add_response_header(&mut self, name: &str, value: &str) {
        self.response_headers.push((name.to_string(), value.to_string()));
    }

    fn append_response_header(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.response_headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            existing.1 = format!("{}, {}", existing.1, value);
        } else {
            self.response_headers.push((name.to_string(), value.to_string()));
        }
    }

    fn remove_response_header(&mut self, name: &str) {
        self.response_headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    fn response_content_type(&self) -> Option<String> {
        self.response_header("Content-Type")
    }

    fn env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn set_env(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn rewrite_uri(&mut self, new_uri: &str) {
        self.uri = new_uri.to_string();
    }

    fn document_root(&self) -> &str {
        &self.document_root
    }

    fn client_ip(&self) -> &str {
        &self.client_ip
    }

    fn file_exists(&self, relative_path: &str) -> bool {
        self.files.iter().any(|f| f == relative_path)
    }

    fn push_php_ini(&mut self, name: &str, value: &str, is_admin: bool) {
        self.php_ini.push((name.to_string(), value.to_string(), is_admin));
    }

    fn set_response_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    fn set_directory_options(&mut self, options: OptionFlags) {
        self.options = options;
    }

    fn directory_options(&self) -> OptionFlags {
        self.options
    }

    fn set_directory_hint(&mut self, key: &str, value: &str) {
        self.directory_hints.insert(key.to_string(), value.to_string());
    }

    fn authorization_header(&self) -> Option<String> {
        self.authorization.clone()
    }

    fn set_www_authenticate(&mut self, realm: &str) {
        self.www_authenticate = Some(format!("Basic realm=\"{realm}\""));
    }

    fn module_loaded(&self, name: &str) -> bool {
        self.loaded_modules.iter().any(|m| m.eq_ignore_ascii_case(name))
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.logs.borrow_mut().push(format!("{level:?}: {message}"));
    }
}
