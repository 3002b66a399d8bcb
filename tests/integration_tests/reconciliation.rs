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
use std::path::Path;

use tempfile::tempdir;
use treesync::backend::localfs::LocalFsBackend;
use treesync::{BackupMode, BackupOptions, BackupRequest, BackupResult, CancellationToken, Orchestrator};

fn run(source: &Path, destination: &Path, mode: BackupMode) -> BackupResult {
    let backend = LocalFsBackend::new();
    let orchestrator = Orchestrator::new(&backend);
    let request = BackupRequest {
        source_path: source.to_string_lossy().to_string(),
        destination_path: destination.to_string_lossy().to_string(),
        mode,
    };
    orchestrator
        .execute(&request, &BackupOptions::default(), None, &CancellationToken::new())
        .expect("run should succeed")
}

#[test]
fn sync_into_absent_destination_copies_everything() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();
    let destination_path = destination.path().join("dest");

    fs::write(source.path().join("file1.txt"), b"hello").unwrap();
    fs::create_dir(source.path().join("sub")).unwrap();
    fs::write(source.path().join("sub/file2.txt"), b"world").unwrap();

    let result = run(source.path(), &destination_path, BackupMode::Sync);

    assert_eq!(result.files_copied, 2);
    assert_eq!(result.files_overwritten, 0);
    assert_eq!(result.files_deleted, 0);
    assert_eq!(result.directories_created, 1);
    assert_eq!(result.directories_deleted, 0);

    assert_eq!(fs::read(destination_path.join("file1.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(destination_path.join("sub/file2.txt")).unwrap(), b"world");
}

#[test]
fn sync_prunes_destination_only_entries() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();

    fs::write(source.path().join("keep.txt"), b"k").unwrap();
    fs::write(destination.path().join("keep.txt"), b"k").unwrap();
    fs::write(destination.path().join("extra.txt"), b"x").unwrap();
    fs::create_dir(destination.path().join("extradir")).unwrap();
    fs::write(destination.path().join("extradir/nested.txt"), b"n").unwrap();

    let result = run(source.path(), destination.path(), BackupMode::Sync);

    assert_eq!(result.files_copied, 0);
    assert_eq!(result.files_overwritten, 0);
    assert!(result.files_deleted >= 1);
    assert_eq!(result.directories_created, 0);
    assert!(result.directories_deleted >= 1);

    assert!(!destination.path().join("extra.txt").exists());
    assert!(!destination.path().join("extradir").exists());
    assert_eq!(fs::read(destination.path().join("keep.txt")).unwrap(), b"k");
}

#[test]
fn sync_overwrites_files_whose_content_changed() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();

    fs::write(source.path().join("data.txt"), b"new").unwrap();
    fs::write(destination.path().join("data.txt"), b"old").unwrap();

    let now = filetime::FileTime::from_unix_time(2_000_000, 0);
    let yesterday = filetime::FileTime::from_unix_time(2_000_000 - 86_400, 0);
    filetime::set_file_mtime(source.path().join("data.txt"), now).unwrap();
    filetime::set_file_mtime(destination.path().join("data.txt"), yesterday).unwrap();

    let result = run(source.path(), destination.path(), BackupMode::Sync);

    assert_eq!(result.files_copied, 0);
    assert_eq!(result.files_overwritten, 1);
    assert_eq!(result.files_deleted, 0);
    assert_eq!(fs::read(destination.path().join("data.txt")).unwrap(), b"new");
}

#[test]
fn sync_skips_identical_files_without_hashing() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();

    fs::write(source.path().join("same.txt"), b"x").unwrap();
    fs::write(destination.path().join("same.txt"), b"x").unwrap();

    let mtime = filetime::FileTime::from_unix_time(3_000_000, 0);
    filetime::set_file_mtime(source.path().join("same.txt"), mtime).unwrap();
    filetime::set_file_mtime(destination.path().join("same.txt"), mtime).unwrap();

    let result = run(source.path(), destination.path(), BackupMode::Sync);

    assert_eq!(result, BackupResult::default());
}

#[test]
fn add_copies_missing_files_and_preserves_destination_only_entries() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();

    fs::write(source.path().join("new.txt"), b"n").unwrap();
    fs::write(source.path().join("shared.txt"), b"src").unwrap();
    fs::write(destination.path().join("shared.txt"), b"dst").unwrap();
    fs::write(destination.path().join("destonly.txt"), b"keep").unwrap();

    let result = run(source.path(), destination.path(), BackupMode::Add);

    assert_eq!(result.files_copied, 1);
    assert_eq!(result.files_overwritten, 0);
    assert_eq!(result.files_deleted, 0);

    assert_eq!(fs::read(destination.path().join("shared.txt")).unwrap(), b"dst");
    assert_eq!(fs::read(destination.path().join("destonly.txt")).unwrap(), b"keep");
    assert_eq!(fs::read(destination.path().join("new.txt")).unwrap(), b"n");
}

#[test]
fn remove_deletes_only_source_absent_files() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();

    fs::write(source.path().join("keep.txt"), b"k").unwrap();
    fs::write(destination.path().join("keep.txt"), b"d").unwrap();
    fs::write(destination.path().join("remove.txt"), b"r").unwrap();

    let result = run(source.path(), destination.path(), BackupMode::Remove);

    assert_eq!(result.files_deleted, 1);
    assert_eq!(result.files_copied, 0);
    assert_eq!(result.files_overwritten, 0);
    assert_eq!(fs::read(destination.path().join("keep.txt")).unwrap(), b"d");
    assert!(!destination.path().join("remove.txt").exists());
}

#[test]
fn remove_mode_destination_does_not_exist_returns_zero_counts() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();
    let missing_destination = destination.path().join("does-not-exist");
    fs::write(source.path().join("a.txt"), b"a").unwrap();

    let result = run(source.path(), &missing_destination, BackupMode::Remove);

    assert_eq!(result, BackupResult::default());
}
