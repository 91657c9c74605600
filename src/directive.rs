//! The directive data model: the 59-kind tagged record described by the
//! directive taxonomy, its per-kind payload, and the identity-key equality
//! used by the directory walker's override merge.
//!
//! Modeled the way `FilterRuleSpec` (`rsync_core::client::config`)
//! represents a parsed rule: a `kind` enum plus a flat struct of optional
//! fields, rather than a pointer-chased tagged union. Containers own their
//! children directly in a `Vec`, so freeing is just `Drop` — no manual
//! recursive walk is needed.

use std::fmt;

/// One of the 59 directive kinds. IDs 0-27 are v1 and their discriminants
/// must never be renumbered; IDs 28-58 are v2 additions, appended only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Kind {
    HeaderSet = 0,
    HeaderUnset = 1,
    HeaderAppend = 2,
    HeaderMerge = 3,
    HeaderAdd = 4,
    RequestHeaderSet = 5,
    RequestHeaderUnset = 6,
    PhpValue = 7,
    PhpFlag = 8,
    PhpAdminValue = 9,
    PhpAdminFlag = 10,
    Order = 11,
    AllowFrom = 12,
    DenyFrom = 13,
    Redirect = 14,
    RedirectMatch = 15,
    ErrorDocument = 16,
    FilesMatch = 17,
    ExpiresActive = 18,
    ExpiresByType = 19,
    SetEnv = 20,
    SetEnvIf = 21,
    BrowserMatch = 22,
    BruteForceProtection = 23,
    BruteForceAllowedAttempts = 24,
    BruteForceWindow = 25,
    BruteForceAction = 26,
    BruteForceThrottleDuration = 27,

    IfModule = 28,
    Options = 29,
    Files = 30,
    HeaderAlwaysSet = 31,
    HeaderAlwaysUnset = 32,
    HeaderAlwaysAppend = 33,
    HeaderAlwaysMerge = 34,
    HeaderAlwaysAdd = 35,
    ExpiresDefault = 36,
    RequireAllGranted = 37,
    RequireAllDenied = 38,
    RequireIp = 39,
    RequireNotIp = 40,
    RequireAny = 41,
    RequireAll = 42,
    Limit = 43,
    LimitExcept = 44,
    AuthType = 45,
    AuthName = 46,
    AuthUserFile = 47,
    RequireValidUser = 48,
    AddHandler = 49,
    SetHandler = 50,
    AddType = 51,
    DirectoryIndex = 52,
    ForceType = 53,
    AddEncoding = 54,
    AddCharset = 55,
    BruteForceXForwardedFor = 56,
    BruteForceWhitelist = 57,
    BruteForceProtectPath = 58,
}

impl Kind {
    /// Returns the directive keyword as it appears in `.htaccess` text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::HeaderSet | Self::HeaderUnset | Self::HeaderAppend | Self::HeaderMerge
            | Self::HeaderAdd => "Header",
            Self::RequestHeaderSet | Self::RequestHeaderUnset => "RequestHeader",
            Self::PhpValue => "php_value",
            Self::PhpFlag => "php_flag",
            Self::PhpAdminValue => "php_admin_value",
            Self::PhpAdminFlag => "php_admin_flag",
            Self::Order => "Order",
            Self::AllowFrom => "Allow",
            Self::DenyFrom => "Deny",
            Self::Redirect => "Redirect",
            Self::RedirectMatch => "RedirectMatch",
            Self::ErrorDocument => "ErrorDocument",
            Self::FilesMatch => "FilesMatch",
            Self::ExpiresActive => "ExpiresActive",
            Self::ExpiresByType => "ExpiresByType",
            Self::SetEnv => "SetEnv",
            Self::SetEnvIf => "SetEnvIf",
            Self::BrowserMatch => "BrowserMatch",
            Self::BruteForceProtection => "BruteForceProtection",
            Self::BruteForceAllowedAttempts => "BruteForceAllowedAttempts",
            Self::BruteForceWindow => "BruteForceWindow",
            Self::BruteForceAction => "BruteForceAction",
            Self::BruteForceThrottleDuration => "BruteForceThrottleDuration",
            Self::IfModule => "IfModule",
            Self::Options => "Options",
            Self::Files => "Files",
            Self::HeaderAlwaysSet
            | Self::HeaderAlwaysUnset
            | Self::HeaderAlwaysAppend
            | Self::HeaderAlwaysMerge
            | Self::HeaderAlwaysAdd => "Header",
            Self::ExpiresDefault => "ExpiresDefault",
            Self::RequireAllGranted => "Require",
            Self::RequireAllDenied => "Require",
            Self::RequireIp => "Require",
            Self::RequireNotIp => "Require",
            Self::RequireAny => "RequireAny",
            Self::RequireAll => "RequireAll",
            Self::Limit => "Limit",
            Self::LimitExcept => "LimitExcept",
            Self::AuthType => "AuthType",
            Self::AuthName => "AuthName",
            Self::AuthUserFile => "AuthUserFile",
            Self::RequireValidUser => "Require",
            Self::AddHandler => "AddHandler",
            Self::SetHandler => "SetHandler",
            Self::AddType => "AddType",
            Self::DirectoryIndex => "DirectoryIndex",
            Self::ForceType => "ForceType",
            Self::AddEncoding => "AddEncoding",
            Self::AddCharset => "AddCharset",
            Self::BruteForceXForwardedFor => "BruteForceXForwardedFor",
            Self::BruteForceWhitelist => "BruteForceWhitelist",
            Self::BruteForceProtectPath => "BruteForceProtectPath",
        }
    }

    /// Whether this kind's payload owns a `children` list.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::FilesMatch
                | Self::IfModule
                | Self::Files
                | Self::RequireAny
                | Self::RequireAll
                | Self::Limit
                | Self::LimitExcept
        )
    }

    /// Whether this kind is a `Header*`/`RequestHeader*` mutation, the only
    /// family `FilesMatch`/`Files` children may legally contain (§4.6).
    #[must_use]
    pub const fn is_header_kind(self) -> bool {
        matches!(
            self,
            Self::HeaderSet
                | Self::HeaderUnset
                | Self::HeaderAppend
                | Self::HeaderMerge
                | Self::HeaderAdd
                | Self::HeaderAlwaysSet
                | Self::HeaderAlwaysUnset
                | Self::HeaderAlwaysAppend
                | Self::HeaderAlwaysMerge
                | Self::HeaderAlwaysAdd
                | Self::RequestHeaderSet
                | Self::RequestHeaderUnset
        )
    }

    /// Whether this is one of the five "always" response-header variants
    /// that apply regardless of the current status code.
    #[must_use]
    pub const fn is_always_header(self) -> bool {
        matches!(
            self,
            Self::HeaderAlwaysSet
                | Self::HeaderAlwaysUnset
                | Self::HeaderAlwaysAppend
                | Self::HeaderAlwaysMerge
                | Self::HeaderAlwaysAdd
        )
    }
}

/// `Order` directive's evaluation policy (§4.7 Access control).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderMode {
    /// Default deny: evaluate Allow then Deny.
    AllowDeny,
    /// Default allow: evaluate Deny then Allow.
    DenyAllow,
}

/// `BruteForceAction`'s two behaviors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BruteAction {
    Block,
    Throttle,
}

/// Attribute a `SetEnvIf`/`BrowserMatch` pattern is matched against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnvAttribute {
    RemoteAddr,
    RequestUri,
    UserAgent,
    /// An arbitrary request header, named case-insensitively.
    Header(String),
}

impl fmt::Display for EnvAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteAddr => write!(f, "Remote_Addr"),
            Self::RequestUri => write!(f, "Request_URI"),
            Self::UserAgent => write!(f, "User-Agent"),
            Self::Header(name) => write!(f, "{name}"),
        }
    }
}

/// Tri-state `Options` flags: -1 disables, 0 leaves untouched, +1 enables.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct OptionFlags {
    pub indexes: i8,
    pub follow_symlinks: i8,
    pub multi_views: i8,
    pub exec_cgi: i8,
}

/// Kind-discriminated payload; the arm actually populated is determined by
/// the owning [`Directive::kind`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    Order(OrderMode),
    Redirect {
        status_code: u16,
        pattern: Option<String>,
    },
    ErrorCode(u16),
    Container {
        pattern: String,
        children: Vec<Directive>,
    },
    IfModule {
        negated: bool,
        children: Vec<Directive>,
    },
    Expires {
        duration_sec: u64,
    },
    Bool(bool),
    Number(u64),
    BruteAction(BruteAction),
    EnvIf {
        attribute: EnvAttribute,
        pattern: String,
    },
    Options(OptionFlags),
    Require {
        children: Vec<Directive>,
    },
    Limit {
        methods: Vec<String>,
        children: Vec<Directive>,
    },
}

/// One parsed `.htaccess` directive.
///
/// `name`/`value` carry the generic key/value pair most kinds use; the rest
/// lives in `payload`. Order within the owning `Vec` is semantically
/// significant (§4.4).
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub kind: Kind,
    pub line: u32,
    pub name: Option<String>,
    pub value: Option<String>,
    pub payload: Payload,
}

impl Directive {
    pub fn new(kind: Kind, line: u32) -> Self {
        Self {
            kind,
            line,
            name: None,
            value: None,
            payload: Payload::None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Children of a container directive, or an empty slice for non-containers.
    #[must_use]
    pub fn children(&self) -> &[Directive] {
        match &self.payload {
            Payload::Container { children, .. } | Payload::IfModule { children, .. } => children,
            Payload::Require { children } | Payload::Limit { children, .. } => children,
            _ => &[],
        }
    }

    /// Mutable children of a container directive.
    pub fn children_mut(&mut self) -> &mut Vec<Directive> {
        match &mut self.payload {
            Payload::Container { children, .. } | Payload::IfModule { children, .. } => children,
            Payload::Require { children } | Payload::Limit { children, .. } => children,
            _ => unreachable!("children_mut called on a non-container directive"),
        }
    }

    /// The identity key used by the directory walker's child-overrides-parent
    /// merge (§4.5). Two directives are "the same" for override purposes iff
    /// their kinds match and this returns equal keys; kinds not covered by
    /// the identity-key table are never override-merged (the walker always
    /// appends them instead of calling this method).
    #[must_use]
    pub fn overrides(&self, other: &Directive) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            Kind::HeaderSet
            | Kind::HeaderUnset
            | Kind::HeaderAppend
            | Kind::HeaderMerge
            | Kind::HeaderAdd
            | Kind::HeaderAlwaysSet
            | Kind::HeaderAlwaysUnset
            | Kind::HeaderAlwaysAppend
            | Kind::HeaderAlwaysMerge
            | Kind::HeaderAlwaysAdd
            | Kind::RequestHeaderSet
            | Kind::RequestHeaderUnset
            | Kind::PhpValue
            | Kind::PhpFlag
            | Kind::PhpAdminValue
            | Kind::PhpAdminFlag
            | Kind::SetEnv
            | Kind::ExpiresByType => self.name.is_some() && self.name == other.name,
            Kind::ErrorDocument => match (&self.payload, &other.payload) {
                (Payload::ErrorCode(a), Payload::ErrorCode(b)) => a == b,
                _ => false,
            },
            Kind::AllowFrom | Kind::DenyFrom => self.value.is_some() && self.value == other.value,
            Kind::Redirect => self.name.is_some() && self.name == other.name,
            Kind::RedirectMatch | Kind::FilesMatch => match (&self.payload, &other.payload) {
                (
                    Payload::Redirect { pattern: a, .. },
                    Payload::Redirect { pattern: b, .. },
                ) => a.is_some() && a == b,
                (Payload::Container { pattern: a, .. }, Payload::Container { pattern: b, .. }) => {
                    a == b
                }
                _ => false,
            },
            Kind::SetEnvIf | Kind::BrowserMatch => match (&self.payload, &other.payload) {
                (
                    Payload::EnvIf {
                        attribute: attr_a,
                        pattern: pat_a,
                    },
                    Payload::EnvIf {
                        attribute: attr_b,
                        pattern: pat_b,
                    },
                ) => self.name.is_some() && self.name == other.name && attr_a == attr_b && pat_a == pat_b,
                _ => false,
            },
            Kind::Order
            | Kind::ExpiresActive
            | Kind::BruteForceProtection
            | Kind::BruteForceAllowedAttempts
            | Kind::BruteForceWindow
            | Kind::BruteForceAction
            | Kind::BruteForceThrottleDuration => true,
            _ => false,
        }
    }
}
