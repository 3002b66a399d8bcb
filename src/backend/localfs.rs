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

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use filetime::FileTime;
use walkdir::WalkDir;

use super::FsBackend;
use crate::cancel::CancellationToken;
use crate::error::BackupError;

/// Sequential copy/hash buffer size. Amortizes syscall and disk-seek
/// overhead; see the concurrency & resource model's buffer sizing note.
const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// [`FsBackend`] backed directly by `std::fs`.
pub struct LocalFsBackend;

impl LocalFsBackend {
    pub fn new() -> Self {
        Self
    }

    fn stream_copy(src: &Path, dst: &Path, overwrite: bool, cancel: &CancellationToken) -> Result<(), BackupError> {
        let mut reader = fs::File::open(src)?;
        let mut writer = if overwrite {
            fs::File::create(dst)?
        } else {
            fs::OpenOptions::new().write(true).create_new(true).open(dst)?
        };

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            if cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
        }
        Ok(())
    }
}

impl Default for LocalFsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend for LocalFsBackend {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path) -> Result<(), BackupError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn enumerate_directories_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, BackupError> {
        let dirs = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect();
        Ok(dirs)
    }

    fn enumerate_files_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, BackupError> {
        let files = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() || entry.file_type().is_symlink())
            .map(|entry| entry.into_path())
            .collect();
        Ok(files)
    }

    fn get_file_metadata(&self, path: &Path) -> Result<(u64, DateTime<Utc>), BackupError> {
        let meta = fs::metadata(path)?;
        let mtime = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| DateTime::<Utc>::from_timestamp(0, 0).unwrap());
        Ok((meta.len(), mtime))
    }

    fn copy_file(
        &self,
        src: &Path,
        dst: &Path,
        overwrite: bool,
        mtime: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<(), BackupError> {
        if cancel.is_cancelled() {
            return Err(BackupError::Cancelled);
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::stream_copy(src, dst, overwrite, cancel)?;
        if let Some(mtime) = mtime {
            filetime::set_file_mtime(dst, FileTime::from(SystemTime::from(mtime)))?;
        }
        Ok(())
    }

    fn delete_file_if_exists(&self, path: &Path) -> Result<(), BackupError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackupError::Io(e)),
        }
    }

    fn delete_directory_if_exists(&self, path: &Path, recursive: bool) -> Result<(), BackupError> {
        let result = if recursive { fs::remove_dir_all(path) } else { fs::remove_dir(path) };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackupError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new();
        let nested = dir.path().join("a/b/c");
        backend.create_directory(&nested).unwrap();
        assert!(backend.directory_exists(&nested));
        backend.create_directory(&nested).unwrap();
    }

    #[test]
    fn copy_file_sets_mtime() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"hello").unwrap();

        let mtime = DateTime::<Utc>::from_timestamp(1_000_000, 0).unwrap();
        let backend = LocalFsBackend::new();
        let cancel = CancellationToken::new();
        backend.copy_file(&src, &dst, false, Some(mtime), &cancel).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"hello");
        let (_, got_mtime) = backend.get_file_metadata(&dst).unwrap();
        assert_eq!(got_mtime, mtime);
    }

    #[test]
    fn copy_file_without_overwrite_fails_if_destination_exists() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let backend = LocalFsBackend::new();
        let cancel = CancellationToken::new();
        assert!(backend.copy_file(&src, &dst, false, None, &cancel).is_err());
    }

    #[test]
    fn delete_file_if_exists_is_noop_on_absent() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new();
        backend.delete_file_if_exists(&dir.path().join("missing.txt")).unwrap();
    }

    #[test]
    fn delete_directory_if_exists_is_noop_on_absent() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new();
        backend
            .delete_directory_if_exists(&dir.path().join("missing"), true)
            .unwrap();
    }

    #[test]
    fn enumerate_separates_files_and_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();

        let backend = LocalFsBackend::new();
        let dirs = backend.enumerate_directories_recursive(dir.path()).unwrap();
        let files = backend.enumerate_files_recursive(dir.path()).unwrap();

        assert_eq!(dirs, vec![dir.path().join("sub")]);
        assert_eq!(files.len(), 2);
    }
}
