//! The host session interface (§6.1). The engine is generic over this
//! trait the same way `rsync_core` is generic over a transport/config
//! collaborator rather than hard-coding one concrete host — no HTTP server
//! ships with this crate, only the seam it plugs into.

use crate::directive::OptionFlags;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One in-flight request, as seen by the directive engine. All accessors
/// are synchronous: the engine never awaits the host, it only reads and
/// mutates request/response state the host already has in hand.
pub trait Session {
    fn request_header(&self, name: &str) -> Option<String>;
    fn set_request_header(&mut self, name: &str, value: &str);
    fn remove_request_header(&mut self, name: &str);

    fn response_header(&self, name: &str) -> Option<String>;
    fn response_header_count(&self, name: &str) -> usize;
    fn set_response_header(&mut self, name: &str, value: &str);
    fn add_response_header(&mut self, name: &str, value: &str);
    fn append_response_header(&mut self, name: &str, value: &str);
    fn remove_response_header(&mut self, name: &str);
    fn response_content_type(&self) -> Option<String>;

    fn env(&self, name: &str) -> Option<String>;
    fn set_env(&mut self, name: &str, value: &str);

    fn status(&self) -> u16;
    fn set_status(&mut self, status: u16);

    fn uri(&self) -> &str;
    fn method(&self) -> &str;
    fn rewrite_uri(&mut self, new_uri: &str);

    fn document_root(&self) -> &str;
    fn client_ip(&self) -> &str;
    fn file_exists(&self, relative_path: &str) -> bool;

    fn push_php_ini(&mut self, name: &str, value: &str, is_admin: bool);

    fn set_response_body(&mut self, body: Vec<u8>);

    fn set_directory_options(&mut self, options: OptionFlags);
    fn directory_options(&self) -> OptionFlags;

    /// Generic per-directory hint setter used by the handler/type/charset
    /// family (`AddHandler`, `SetHandler`, `AddType`, `ForceType`,
    /// `AddEncoding`, `AddCharset`) — `key` is the directive keyword
    /// lower-cased, `value` the directive's effective value.
    fn set_directory_hint(&mut self, key: &str, value: &str);

    fn authorization_header(&self) -> Option<String>;
    fn set_www_authenticate(&mut self, realm: &str);

    /// Whether the named server module is currently loaded — the truth
    /// value behind `IfModule`, supplied entirely by the host.
    fn module_loaded(&self, name: &str) -> bool;

    fn log(&self, level: LogLevel, message: &str);
}
