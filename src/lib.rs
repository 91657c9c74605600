//! An Apache-style per-directory directive engine: parses `.htaccess`
//! files, merges them down a directory chain with child-overrides-parent
//! semantics, and executes the merged list against a host-supplied
//! [`Session`] at the two points a web server touches per-directory
//! configuration — receiving a request's headers and sending a response's.
//!
//! The crate ships no HTTP server and no filesystem daemon of its own; it
//! is a library seam a host embeds, the same way a transport-agnostic
//! engine is wired up to a concrete socket layer by the binary that owns it.
//!
//! ```no_run
//! use htdirectives::{Engine, bruteforce::IpStore, exec::auth::StdPasswordFileReader};
//!
//! let engine = Engine::init(htdirectives::walker::EngineConfig::default());
//! // host supplies a `Session` impl per in-flight request, then calls:
//! // engine.on_receive_request_header(&merged, &mut session, &StdPasswordFileReader, now);
//! // engine.on_send_response_header(&merged, &mut session);
//! ```

pub mod bruteforce;
pub mod cache;
pub mod cidr;
pub mod directive;
pub mod error;
pub mod exec;
pub mod expires;
pub mod parser;
pub mod printer;
pub mod session;
pub mod walker;

pub use bruteforce::IpStore;
pub use cache::ParseCache;
pub use directive::{Directive, Kind, Payload};
pub use error::{EngineError, Result};
pub use exec::{on_receive_request_header, on_send_response_header, RequestOutcome};
pub use session::{LogLevel, Session};
pub use walker::{DirectoryWalker, EngineConfig, FileProbe, StdFileProbe};

use std::path::Path;

/// Bundles the two process-wide stores (the parse cache and the brute-force
/// IP table) with a directory walker, so a host only needs to keep one
/// value alive for the lifetime of the server rather than wiring the
/// pieces together itself.
///
/// Both stores are plain owned fields here rather than the
/// `OnceLock<ParseCache>` / `OnceLock<IpStore>` process-wide statics the
/// design notes describe as the "authorized lifecycle points" for this
/// crate's global state: a host that genuinely wants a single process-wide
/// instance installs `Engine` itself behind a `OnceLock` (or an `Arc`
/// shared across worker threads) rather than this crate hiding that choice
/// behind hidden statics, which would make unit-testing multiple engines
/// side by side impossible within one process.
pub struct Engine {
    pub cache: ParseCache,
    pub ip_store: IpStore,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn init(config: EngineConfig) -> Self {
        Self {
            cache: ParseCache::init(config.cache_buckets),
            ip_store: IpStore::init(),
            config,
        }
    }

    /// Tears down both process-wide stores. Safe to call at graceful
    /// shutdown; a subsequent `walk`/dispatch call simply repopulates them.
    pub fn destroy(&self) {
        self.cache.destroy();
        self.ip_store.destroy();
    }

    /// Assembles the merged directive list in effect for `target_dir`,
    /// walking from `doc_root` down to it (§4.5).
    pub fn merged_directives(&self, doc_root: &Path, target_dir: &Path) -> Result<Vec<Directive>> {
        let walker = DirectoryWalker::new(&self.cache, StdFileProbe, self.config);
        walker.walk(doc_root, target_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_init_produces_empty_stores() {
        let engine = Engine::init(EngineConfig::default());
        assert_eq!(engine.cache.len(), 0);
        engine.destroy();
    }
}
