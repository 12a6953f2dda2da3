//! Simple-path memoization.
//!
//! Path expressions such as `statuses.3.id` are looked up far more often than
//! they are distinct, so their parses are memoized in an [`IncrementalCache`].
//! A path is *simple* when it is a `.`-separated list of non-empty segments
//! made only of ASCII letters, digits and `_`. All-digit segments are array
//! indices; everything else is a field name.
//!
//! Paths that are not simple (wildcards, escapes, queries, modifiers) are
//! memoized too, as [`ParsedPath::NotSimple`], so a repeated lookup of the same
//! complex path costs one cache hit instead of a rescan.
//!
//! # Example
//!
//! ```
//! use rcu_cache::config::PathCacheConfig;
//! use rcu_cache::path::{PathCache, Segment};
//!
//! let paths = PathCache::new(PathCacheConfig::default());
//!
//! let segments = paths.simple_segments("statuses.3.id").unwrap();
//! assert_eq!(
//!     &segments[..],
//!     &[
//!         Segment::Field("statuses".to_string()),
//!         Segment::Index(3),
//!         Segment::Field("id".to_string()),
//!     ]
//! );
//!
//! assert!(paths.simple_segments("friends.#.name").is_none());
//! ```

use crate::config::PathCacheConfig;
use crate::incremental::StrCache;
use core::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One step of a simple path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Array index, from an all-digit segment.
    Index(usize),
    /// Object field name.
    Field(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Field(name) => f.write_str(name),
        }
    }
}

/// Why a path is not simple.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path, or one of its segments, is empty.
    #[error("empty path segment at offset {offset}")]
    EmptySegment {
        /// Byte offset where the empty segment starts.
        offset: usize,
    },
    /// The path ends with a `.`.
    #[error("path ends with a separator")]
    TrailingDot,
    /// A byte outside `[A-Za-z0-9_.]` was found.
    #[error("character {ch:?} at offset {offset} is not allowed in a simple path")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// Byte offset of the character.
        offset: usize,
    },
    /// An all-digit segment is larger than `i64::MAX` or does not fit in `usize`.
    #[error("index {segment:?} is out of range")]
    IndexOverflow {
        /// The digits that overflowed.
        segment: String,
    },
}

/// Parses `path` as a simple path.
///
/// # Errors
///
/// Returns a [`PathError`] describing the first reason the path is not simple.
///
/// # Example
///
/// ```
/// use rcu_cache::path::{parse_simple_path, PathError, Segment};
///
/// assert_eq!(
///     parse_simple_path("a.0").unwrap(),
///     vec![Segment::Field("a".to_string()), Segment::Index(0)]
/// );
/// assert_eq!(parse_simple_path("a."), Err(PathError::TrailingDot));
/// ```
pub fn parse_simple_path(path: &str) -> Result<Vec<Segment>, PathError> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (offset, ch) in path.char_indices() {
        if ch == '.' {
            segments.push(parse_segment(&path[start..offset], start)?);
            if offset + 1 == path.len() {
                return Err(PathError::TrailingDot);
            }
            start = offset + 1;
        } else if !is_name_char(ch) {
            return Err(PathError::InvalidChar { ch, offset });
        }
    }
    segments.push(parse_segment(&path[start..], start)?);

    Ok(segments)
}

fn parse_segment(segment: &str, offset: usize) -> Result<Segment, PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment { offset });
    }
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        // Indices share the signed 64-bit range of JSON integers.
        return segment
            .parse::<i64>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .map(Segment::Index)
            .ok_or_else(|| PathError::IndexOverflow {
                segment: segment.to_string(),
            });
    }
    Ok(Segment::Field(segment.to_string()))
}

#[inline]
fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Memoized outcome of parsing one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath {
    /// The path is simple; these are its segments.
    Simple(Arc<[Segment]>),
    /// The path needs the general query engine.
    NotSimple,
}

impl ParsedPath {
    /// Parses `path`, folding every [`PathError`] into `NotSimple`.
    pub fn parse(path: &str) -> Self {
        match parse_simple_path(path) {
            Ok(segments) => ParsedPath::Simple(segments.into()),
            Err(err) => {
                tracing::trace!(%err, "path is not simple");
                ParsedPath::NotSimple
            }
        }
    }

    /// Returns the segments of a simple path.
    pub fn segments(&self) -> Option<&Arc<[Segment]>> {
        match self {
            ParsedPath::Simple(segments) => Some(segments),
            ParsedPath::NotSimple => None,
        }
    }
}

/// Memoizes simple-path parses in a shared [`IncrementalCache`](crate::IncrementalCache).
///
/// Construct one per process or per subsystem and pass it by reference;
/// it is `Send + Sync`.
pub struct PathCache {
    cache: StrCache<ParsedPath>,
    enabled: bool,
}

impl PathCache {
    /// Creates a path cache from its configuration.
    pub fn new(config: PathCacheConfig) -> Self {
        Self {
            cache: StrCache::init(config.cache, None),
            enabled: config.enabled,
        }
    }

    /// Returns whether memoization is switched on.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the memoized parse of `path`, parsing and recording it on a miss.
    ///
    /// The outcome is recorded even when the path is not simple. When the
    /// cache is disabled the path is parsed every time and nothing is stored.
    pub fn lookup(&self, path: &str) -> ParsedPath {
        if !self.enabled {
            return ParsedPath::parse(path);
        }
        if let Some(parsed) = self.cache.get(path) {
            return parsed;
        }

        let parsed = ParsedPath::parse(path);
        if self.cache.set(path.to_string(), parsed.clone()) {
            // Another thread recorded this path first; both parses are equal.
            tracing::trace!(path, "path parse already memoized");
        }
        parsed
    }

    /// Returns the segments of `path` if it is simple and memoization is enabled.
    ///
    /// Returns `None` for paths that are not simple and for every path while
    /// the cache is disabled.
    pub fn simple_segments(&self, path: &str) -> Option<Arc<[Segment]>> {
        if !self.enabled {
            return None;
        }
        match self.lookup(path) {
            ParsedPath::Simple(segments) => Some(segments),
            ParsedPath::NotSimple => None,
        }
    }

    /// Returns the backing cache, e.g. for [`stats`](crate::IncrementalCache::stats).
    pub fn cache(&self) -> &StrCache<ParsedPath> {
        &self.cache
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(PathCacheConfig::default())
    }
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCache")
            .field("enabled", &self.enabled)
            .field("cache", &self.cache)
            .finish()
    }
}
