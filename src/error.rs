//! Central error type, in `rsync_core`'s own style: one `thiserror`-derived
//! type per crate for the handful of failures that actually cross a public
//! boundary, rather than threading `Box<dyn Error>` everywhere.
//!
//! Per-line `.htaccess` parse problems are deliberately *not* represented
//! here — §7 and §4.1 call for warn-and-skip, not a `Result` error, so the
//! parser never constructs one of these for a bad line. Likewise, `.htaccess`
//! I/O failures (treated as absent, §7) and `AuthUserFile`/hash failures
//! (surfaced as a 500 directly on the session, §4.7 "Auth Basic") never
//! cross this boundary either — both are reported through the session, not
//! through this enum, so it only carries the walker's own bounds failures.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("directory nesting depth {depth} exceeds configured maximum {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    #[error("path length {len} exceeds configured maximum {max}")]
    PathTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
