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

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::backend::FsBackend;
use crate::cancel::{CANCEL_POLL_MASK, CancellationToken};
use crate::error::BackupError;
use crate::path::{CasePolicy, RelativePath};

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(0, 0).unwrap()
}

/// An immutable `(path, length, mtime)` triple. `length`/`mtime` are
/// zero/epoch when the owning snapshot was captured without metadata.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: RelativePath,
    pub length: u64,
    pub mtime: DateTime<Utc>,
}

/// An in-memory inventory of a directory tree at a point in time. Both
/// containers are keyed by a policy-normalized comparison key, derived once
/// at capture time, so lookups are policy-consistent without requiring
/// mutable global state.
#[derive(Debug)]
pub struct Snapshot {
    policy: CasePolicy,
    files: HashMap<String, FileEntry>,
    dirs: HashMap<String, RelativePath>,
}

impl Snapshot {
    /// A zero-size snapshot, used when the destination did not previously
    /// exist.
    pub fn empty(policy: CasePolicy) -> Self {
        Self {
            policy,
            files: HashMap::new(),
            dirs: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CasePolicy {
        self.policy
    }

    fn key(&self, path: &RelativePath) -> String {
        self.policy.normalize(path.as_str())
    }

    pub fn contains_file(&self, path: &RelativePath) -> bool {
        self.files.contains_key(&self.key(path))
    }

    pub fn get_file(&self, path: &RelativePath) -> Option<&FileEntry> {
        self.files.get(&self.key(path))
    }

    pub fn contains_dir(&self, path: &RelativePath) -> bool {
        self.dirs.contains_key(&self.key(path))
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.values().map(|entry| &entry.path)
    }

    pub fn dir_paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.dirs.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Builds [`Snapshot`]s by recursively enumerating a directory tree through
/// an [`FsBackend`].
pub struct SnapshotService;

impl SnapshotService {
    /// Enumerates `root`'s directories then files, inserting each into the
    /// snapshot under `policy`. If `include_metadata` is false every
    /// [`FileEntry`] carries `length=0, mtime=epoch` — the read-only side of
    /// the pipeline (e.g. a destination when only deletion will occur).
    ///
    /// Cancellation is polled once every 256 enumerated items.
    pub fn capture(
        backend: &dyn FsBackend,
        root: &Path,
        include_metadata: bool,
        policy: CasePolicy,
        cancel: &CancellationToken,
    ) -> Result<Snapshot, BackupError> {
        let mut dirs = HashMap::new();
        let mut files = HashMap::new();
        let mut counter: u32 = 0;

        for absolute in backend.enumerate_directories_recursive(root)? {
            counter = counter.wrapping_add(1);
            if counter & CANCEL_POLL_MASK == 0 && cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            let Some(relative) = to_relative(root, &absolute, policy)? else {
                continue;
            };
            let key = policy.normalize(relative.as_str());
            dirs.insert(key, relative);
        }

        for absolute in backend.enumerate_files_recursive(root)? {
            counter = counter.wrapping_add(1);
            if counter & CANCEL_POLL_MASK == 0 && cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            let Some(relative) = to_relative(root, &absolute, policy)? else {
                continue;
            };

            let (length, mtime) = if include_metadata {
                backend.get_file_metadata(&absolute)?
            } else {
                (0, epoch())
            };

            let key = policy.normalize(relative.as_str());
            files.insert(
                key,
                FileEntry {
                    path: relative,
                    length,
                    mtime,
                },
            );
        }

        Ok(Snapshot { policy, files, dirs })
    }
}

fn to_relative(root: &Path, absolute: &Path, policy: CasePolicy) -> Result<Option<RelativePath>, BackupError> {
    let Ok(stripped) = absolute.strip_prefix(root) else {
        return Ok(None);
    };
    let raw = stripped.to_string_lossy().replace('\\', "/");
    let relative = RelativePath::new(&raw, policy)?;
    if relative.is_empty() {
        return Ok(None);
    }
    Ok(Some(relative))
}
