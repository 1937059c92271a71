// crates/script-gate-core/src/runtime/metadata.rs
// ============================================================================
// Module: Script Gate Local Asset Metadata
// Description: Maps site-hosted script URLs to files and reads their metadata.
// Purpose: Record size and modification time for locally served scripts.
// Dependencies: url, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Only sources on the site's own origin are considered. The URL path is
//! mapped under the content directory when it sits beneath the content URL,
//! then under the site root. Paths containing parent-directory segments are
//! never resolved. Any failure yields no metadata.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use url::Url;

use crate::core::FileMetadata;
use crate::interfaces::MetadataResolver;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Filesystem-backed metadata resolver for site-hosted scripts.
#[derive(Debug, Clone)]
pub struct LocalAssetResolver {
    /// Public site URL.
    site_url: Url,
    /// Public URL of the content directory.
    content_url: Url,
    /// Filesystem path of the content directory.
    content_dir: PathBuf,
    /// Filesystem path of the site root.
    root_dir: PathBuf,
}

impl LocalAssetResolver {
    /// Creates a resolver for the given site layout.
    #[must_use]
    pub const fn new(site_url: Url, content_url: Url, content_dir: PathBuf, root_dir: PathBuf) -> Self {
        Self {
            site_url,
            content_url,
            content_dir,
            root_dir,
        }
    }

    /// Returns the candidate file paths for a source, most specific first.
    #[must_use]
    pub fn candidate_paths(&self, src: &str) -> Vec<PathBuf> {
        let Ok(url) = Url::parse(src) else {
            return Vec::new();
        };
        if !same_origin(&url, &self.site_url) {
            return Vec::new();
        }
        let mut candidates = Vec::with_capacity(2);
        if same_origin(&url, &self.content_url)
            && let Some(rest) = strip_path_prefix(url.path(), self.content_url.path())
            && let Some(path) = join_segments(&self.content_dir, rest)
        {
            candidates.push(path);
        }
        let site_relative = strip_path_prefix(url.path(), self.site_url.path()).unwrap_or_else(|| url.path());
        if let Some(path) = join_segments(&self.root_dir, site_relative)
            && !candidates.contains(&path)
        {
            candidates.push(path);
        }
        candidates
    }
}

impl MetadataResolver for LocalAssetResolver {
    fn resolve(&self, src: &str) -> Option<FileMetadata> {
        self.candidate_paths(src).iter().find_map(|path| read_metadata(path))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when both URLs share scheme, host, and port.
fn same_origin(left: &Url, right: &Url) -> bool {
    left.scheme() == right.scheme()
        && left.host_str() == right.host_str()
        && left.port_or_known_default() == right.port_or_known_default()
}

/// Strips a directory-style URL path prefix.
fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') { Some(rest) } else { None }
}

/// Joins URL path segments under a base directory, refusing traversal.
fn join_segments(base: &Path, url_path: &str) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    let mut pushed = false;
    for segment in url_path.split('/').filter(|segment| !segment.is_empty()) {
        if segment == ".." || segment == "." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
        pushed = true;
    }
    pushed.then_some(path)
}

/// Reads size and modification time for a regular file.
fn read_metadata(path: &Path) -> Option<FileMetadata> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    let modified_at = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok());
    Some(FileMetadata {
        size_bytes: metadata.len(),
        modified_at,
    })
}
