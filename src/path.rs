// treesync is a directory-tree backup reconciliation engine
// Copyright (C) 2025  Javier Lancha Vázquez <javier.lancha@gmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::BackupError;

/// Per-host case-sensitivity policy for path comparison. Windows-like hosts
/// compare case-insensitively; everything else is case-sensitive. Resolved
/// once from the host by [`CasePolicy::host`] and threaded explicitly
/// through every snapshot and the overlap check, rather than held in global
/// mutable state, so tests can exercise both policies side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    Sensitive,
    Insensitive,
}

impl CasePolicy {
    pub fn host() -> Self {
        if cfg!(windows) {
            CasePolicy::Insensitive
        } else {
            CasePolicy::Sensitive
        }
    }

    /// The comparison key for a canonical path string under this policy.
    pub fn normalize(self, canonical: &str) -> String {
        match self {
            CasePolicy::Insensitive => canonical.to_lowercase(),
            CasePolicy::Sensitive => canonical.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PathError {
    #[error("rooted path not allowed: {0}")]
    Rooted(String),
    #[error("'..' segment not allowed: {0}")]
    ParentSegment(String),
}

impl From<PathError> for BackupError {
    fn from(err: PathError) -> Self {
        BackupError::InvalidArgument(err.to_string())
    }
}

/// A normalized, validated, forward-slash path relative to some root. Never
/// rooted, never contains a `..` segment. The empty path denotes the root
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Parses `raw` into a [`RelativePath`]. Backslashes are normalized to
    /// forward slashes. A drive-letter root (`C:/...`) is always rejected. A
    /// single leading separator is trimmed on case-sensitive platforms and
    /// rejected on case-insensitive ones. Empty or whitespace-only input
    /// yields the empty path.
    pub fn new(raw: &str, policy: CasePolicy) -> Result<Self, PathError> {
        if raw.trim().is_empty() {
            return Ok(Self(String::new()));
        }

        let slashed = raw.replace('\\', "/");

        if slashed.as_bytes().get(1) == Some(&b':') {
            return Err(PathError::Rooted(raw.to_string()));
        }

        let body = match slashed.strip_prefix('/') {
            Some(rest) => match policy {
                CasePolicy::Insensitive => return Err(PathError::Rooted(raw.to_string())),
                CasePolicy::Sensitive => rest,
            },
            None => slashed.as_str(),
        };

        let mut segments = Vec::new();
        for segment in body.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment == ".." {
                return Err(PathError::ParentSegment(raw.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self(segments.join("/")))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical forward-slash projection.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The platform-native projection, with separators converted.
    pub fn to_native_string(&self) -> String {
        if cfg!(windows) {
            self.0.replace('/', "\\")
        } else {
            self.0.clone()
        }
    }

    /// `true` if `self` is a strict descendant of `ancestor` under `policy`.
    pub fn has_strict_ancestor(&self, ancestor: &RelativePath, policy: CasePolicy) -> bool {
        let a = policy.normalize(&ancestor.0);
        let p = policy.normalize(&self.0);
        p.len() > a.len() && p.starts_with(&a) && p.as_bytes()[a.len()] == b'/'
    }
}

/// Joins `root` with a relative path's native projection.
pub fn combine(root: &Path, relative: &RelativePath) -> PathBuf {
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative.to_native_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_yield_empty_path() {
        assert_eq!(RelativePath::new("", CasePolicy::Sensitive).unwrap().as_str(), "");
        assert_eq!(RelativePath::new("   ", CasePolicy::Sensitive).unwrap().as_str(), "");
    }

    #[test]
    fn backslashes_are_normalized() {
        let path = RelativePath::new("a\\b\\c.txt", CasePolicy::Sensitive).unwrap();
        assert_eq!(path.as_str(), "a/b/c.txt");
    }

    #[test]
    fn parent_segment_is_rejected() {
        assert!(RelativePath::new("a/../b", CasePolicy::Sensitive).is_err());
        assert!(RelativePath::new("..", CasePolicy::Sensitive).is_err());
    }

    #[test]
    fn leading_separator_trimmed_when_case_sensitive() {
        let path = RelativePath::new("/a/b", CasePolicy::Sensitive).unwrap();
        assert_eq!(path.as_str(), "a/b");
    }

    #[test]
    fn leading_separator_rejected_when_case_insensitive() {
        assert!(RelativePath::new("/a/b", CasePolicy::Insensitive).is_err());
    }

    #[test]
    fn drive_letter_root_always_rejected() {
        assert!(RelativePath::new("C:/Users", CasePolicy::Sensitive).is_err());
        assert!(RelativePath::new("C:/Users", CasePolicy::Insensitive).is_err());
    }

    #[test]
    fn constructor_is_idempotent() {
        for raw in ["a/b/c.txt", "/a/b", "a//b///c"] {
            let once = RelativePath::new(raw, CasePolicy::Sensitive);
            if let Ok(once) = once {
                let twice = RelativePath::new(once.as_str(), CasePolicy::Sensitive).unwrap();
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn strict_ancestor_detection() {
        let a = RelativePath::new("a", CasePolicy::Sensitive).unwrap();
        let ab = RelativePath::new("a/b", CasePolicy::Sensitive).unwrap();
        let ac = RelativePath::new("ac", CasePolicy::Sensitive).unwrap();
        assert!(ab.has_strict_ancestor(&a, CasePolicy::Sensitive));
        assert!(!ac.has_strict_ancestor(&a, CasePolicy::Sensitive));
        assert!(!a.has_strict_ancestor(&a, CasePolicy::Sensitive));
    }
}
