//! Directory walker (§4.5): assembles the effective directive list for a
//! request by descending from `doc_root` to `target_dir`, consulting the
//! parse cache at each level, and merging levels with child-overrides-
//! parent semantics keyed by each kind's identity key
//! ([`Directive::overrides`]).

use crate::cache::ParseCache;
use crate::directive::Directive;
use crate::error::{EngineError, Result};
use crate::parser;
use std::path::{Path, PathBuf};

/// Caps and defaults for a single walk, as an explicit, host-supplied
/// configuration struct rather than a compiled-in constant.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub max_depth: usize,
    pub max_path_len: usize,
    pub cache_buckets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_path_len: 4096,
            cache_buckets: 256,
        }
    }
}

/// Abstracts the filesystem probe the walker needs, so the merge algorithm
/// itself can be unit-tested without touching a real filesystem.
pub trait FileProbe {
    /// Returns the modification time (as an opaque integer, e.g. Unix
    /// seconds) of `path`, or `None` if the file does not exist or is not
    /// readable.
    fn mtime(&self, path: &Path) -> Option<i64>;
    /// Reads the full contents of `path`, or `None` on any I/O failure.
    fn read(&self, path: &Path) -> Option<String>;
}

/// [`FileProbe`] backed by real filesystem calls.
pub struct StdFileProbe;

impl FileProbe for StdFileProbe {
    fn mtime(&self, path: &Path) -> Option<i64> {
        let meta = std::fs::metadata(path).ok()?;
        let modified = meta.modified().ok()?;
        let secs = modified
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();
        Some(secs as i64)
    }

    fn read(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

pub struct DirectoryWalker<'a, P: FileProbe> {
    cache: &'a ParseCache,
    probe: P,
    config: EngineConfig,
}

impl<'a, P: FileProbe> DirectoryWalker<'a, P> {
    pub fn new(cache: &'a ParseCache, probe: P, config: EngineConfig) -> Self {
        Self { cache, probe, config }
    }

    /// Builds the merged directive list covering `target_dir`, walking
    /// every `.htaccess` from `doc_root` down to `target_dir` inclusive.
    /// Returns an empty list if `target_dir` does not begin with
    /// `doc_root`, or if either path exceeds the configured bounds.
    pub fn walk(&self, doc_root: &Path, target_dir: &Path) -> Result<Vec<Directive>> {
        if target_dir.to_string_lossy().len() > self.config.max_path_len {
            return Err(EngineError::PathTooLong {
                len: target_dir.to_string_lossy().len(),
                max: self.config.max_path_len,
            });
        }
        if !target_dir.starts_with(doc_root) {
            return Ok(Vec::new());
        }

        let levels = self.levels(doc_root, target_dir)?;
        let mut merged: Vec<Directive> = Vec::new();
        for level in levels {
            let candidate = level.join(".htaccess");
            let Some(per_level) = self.parse_level(&candidate) else {
                continue;
            };
            merge_in_place(&mut merged, per_level);
        }
        Ok(merged)
    }

    fn levels(&self, doc_root: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let relative = target_dir
            .strip_prefix(doc_root)
            .expect("checked by starts_with above");
        let mut levels = vec![doc_root.to_path_buf()];
        let mut cursor = doc_root.to_path_buf();
        for component in relative.components() {
            cursor.push(component);
            levels.push(cursor.clone());
            if levels.len() > self.config.max_depth {
                return Err(EngineError::MaxDepthExceeded {
                    depth: levels.len(),
                    max: self.config.max_depth,
                });
            }
        }
        Ok(levels)
    }

    fn parse_level(&self, candidate: &Path) -> Option<Vec<Directive>> {
        let mtime = self.probe.mtime(candidate)?;
        let path_key = candidate.to_string_lossy().into_owned();
        if let Some(cached) = self.cache.get(&path_key, mtime) {
            return Some(cached);
        }
        let text = self.probe.read(candidate)?;
        let (directives, _warnings) = parser::parse(&text, &path_key);
        self.cache.put(path_key, mtime, directives.clone());
        Some(directives)
    }
}

/// Merges `child` into `merged` using child-overrides-parent semantics: for
/// each directive in `child`, an existing entry in `merged` with the same
/// identity key is replaced in place; otherwise the child directive is
/// appended. Kinds with no identity key (not covered by
/// [`Directive::overrides`]) are always appended, preserving append order
/// across unrelated kinds.
fn merge_in_place(merged: &mut Vec<Directive>, child: Vec<Directive>) {
    for directive in child {
        match merged.iter().position(|p| p.overrides(&directive)) {
            Some(idx) => merged[idx] = directive,
            None => merged.push(directive),
        }
    }
}
