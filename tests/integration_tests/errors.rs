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

use tempfile::tempdir;
use treesync::backend::localfs::LocalFsBackend;
use treesync::{BackupError, BackupMode, BackupOptions, BackupRequest, CancellationToken, Orchestrator};

#[test]
fn overlapping_source_and_destination_is_rejected() {
    let root = tempdir().unwrap();
    let source = root.path().join("a");
    let destination = root.path().join("a/b");
    fs::create_dir_all(&destination).unwrap();

    let backend = LocalFsBackend::new();
    let orchestrator = Orchestrator::new(&backend);
    let request = BackupRequest {
        source_path: source.to_string_lossy().to_string(),
        destination_path: destination.to_string_lossy().to_string(),
        mode: BackupMode::Sync,
    };

    let result = orchestrator.execute(&request, &BackupOptions::default(), None, &CancellationToken::new());
    assert!(matches!(result, Err(BackupError::PathOverlap(_))));
}

#[test]
fn absent_source_directory_is_reported() {
    let root = tempdir().unwrap();
    let source = root.path().join("does-not-exist");
    let destination = root.path().join("dest");

    let backend = LocalFsBackend::new();
    let orchestrator = Orchestrator::new(&backend);
    let request = BackupRequest {
        source_path: source.to_string_lossy().to_string(),
        destination_path: destination.to_string_lossy().to_string(),
        mode: BackupMode::Sync,
    };

    let result = orchestrator.execute(&request, &BackupOptions::default(), None, &CancellationToken::new());
    assert!(matches!(result, Err(BackupError::SourceNotFound(_))));
}

#[test]
fn cancellation_tripped_before_dispatch_is_observed() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();
    for i in 0..10 {
        fs::write(source.path().join(format!("file{i}.txt")), b"payload").unwrap();
    }

    let backend = LocalFsBackend::new();
    let orchestrator = Orchestrator::new(&backend);
    let request = BackupRequest {
        source_path: source.path().to_string_lossy().to_string(),
        destination_path: destination.path().to_string_lossy().to_string(),
        mode: BackupMode::Sync,
    };

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = orchestrator.execute(&request, &BackupOptions::default(), None, &cancel);
    assert!(matches!(result, Err(BackupError::Cancelled)));
}
