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

pub mod localfs;
pub mod volume;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cancel::CancellationToken;
use crate::error::BackupError;

/// Abstract filesystem capability the engine depends on. The policy for
/// using these primitives is the hard part; the primitives themselves are
/// not, which is why a single concrete implementation
/// ([`localfs::LocalFsBackend`]) is usually enough, with this trait
/// existing purely as the seam tests substitute.
pub trait FsBackend: Send + Sync {
    fn directory_exists(&self, path: &Path) -> bool;

    fn create_directory(&self, path: &Path) -> Result<(), BackupError>;

    /// Absolute paths of every directory beneath `root`, recursively.
    fn enumerate_directories_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, BackupError>;

    /// Absolute paths of every file beneath `root`, recursively. Symlinks
    /// are surfaced as regular files, never followed.
    fn enumerate_files_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, BackupError>;

    fn get_file_metadata(&self, path: &Path) -> Result<(u64, DateTime<Utc>), BackupError>;

    /// Copies `src` to `dst`. When `overwrite` is false the call fails if
    /// `dst` already exists. When `mtime` is given, it is applied to `dst`
    /// after the copy completes.
    fn copy_file(
        &self,
        src: &Path,
        dst: &Path,
        overwrite: bool,
        mtime: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<(), BackupError>;

    fn delete_file_if_exists(&self, path: &Path) -> Result<(), BackupError>;

    fn delete_directory_if_exists(&self, path: &Path, recursive: bool) -> Result<(), BackupError>;
}
