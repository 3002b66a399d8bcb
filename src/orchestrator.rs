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

use crate::backend::FsBackend;
use crate::cancel::CancellationToken;
use crate::error::BackupError;
use crate::executor::{BackupResult, Executor};
use crate::overwrite::OverwriteDetector;
use crate::path::CasePolicy;
use crate::plan::{BackupMode, PlanService};
use crate::progress::ProgressReporter;
use crate::snapshot::{Snapshot, SnapshotService};

/// One reconciliation request: two absolute-ish paths and a mode.
#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub source_path: String,
    pub destination_path: String,
    pub mode: BackupMode,
}

/// Tunable worker-pool sizes: hash concurrency clamped to the CPU count
/// within `[2, 16]`, file IO concurrency fixed at 4.
#[derive(Debug, Clone, Copy)]
pub struct BackupOptions {
    pub max_hash_concurrency: usize,
    pub max_file_io_concurrency: usize,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            max_hash_concurrency: num_cpus::get().clamp(2, 16),
            max_file_io_concurrency: 4,
        }
    }
}

/// Validates inputs, drives the pipeline (snapshot -> plan -> overwrite
/// detection -> execute), and aggregates the result. Owns the snapshots for
/// the lifetime of one run; nothing crosses run boundaries.
pub struct Orchestrator<'a> {
    backend: &'a dyn FsBackend,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn FsBackend) -> Self {
        Self { backend }
    }

    pub fn execute(
        &self,
        request: &BackupRequest,
        options: &BackupOptions,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<BackupResult, BackupError> {
        let policy = CasePolicy::host();
        let (source_path, destination_path) = validate_and_normalize(&request.source_path, &request.destination_path)?;
        validate_no_overlap(&source_path, &destination_path, policy)?;

        if !self.backend.directory_exists(&source_path) {
            return Err(BackupError::SourceNotFound(source_path.display().to_string()));
        }

        let destination_existed = self.backend.directory_exists(&destination_path);
        let newly_created = match request.mode {
            BackupMode::Sync | BackupMode::Add => {
                if !destination_existed {
                    self.backend.create_directory(&destination_path)?;
                    true
                } else {
                    false
                }
            }
            BackupMode::Remove => false,
        };

        let source_needs_metadata = matches!(request.mode, BackupMode::Sync | BackupMode::Add);
        let source_snapshot =
            SnapshotService::capture(self.backend, &source_path, source_needs_metadata, policy, cancel)?;

        let destination_absent_for_remove = request.mode == BackupMode::Remove && !destination_existed;
        let destination_snapshot = if newly_created || destination_absent_for_remove {
            Snapshot::empty(policy)
        } else {
            let destination_needs_metadata = request.mode == BackupMode::Sync;
            SnapshotService::capture(self.backend, &destination_path, destination_needs_metadata, policy, cancel)?
        };

        let plan = PlanService::build(request.mode, &source_snapshot, &destination_snapshot);

        let files_to_overwrite = if request.mode == BackupMode::Sync && !plan.common_files.is_empty() {
            OverwriteDetector::classify(
                &plan.common_files,
                &source_snapshot,
                &destination_snapshot,
                &source_path,
                &destination_path,
                options.max_hash_concurrency,
                cancel,
            )?
        } else {
            Vec::new()
        };

        Executor::execute(
            request.mode,
            &plan,
            &source_snapshot,
            &source_path,
            &destination_path,
            &files_to_overwrite,
            self.backend,
            options.max_file_io_concurrency,
            progress,
            cancel,
        )
    }
}

/// Normalizes `source`/`destination` to absolute, trailing-separator-stripped
/// form. Rejects empty/whitespace-only input.
pub fn validate_and_normalize(source: &str, destination: &str) -> Result<(PathBuf, PathBuf), BackupError> {
    if source.trim().is_empty() || destination.trim().is_empty() {
        return Err(BackupError::InvalidArgument("source and destination paths must not be empty".into()));
    }
    Ok((normalize_path(source)?, normalize_path(destination)?))
}

fn normalize_path(raw: &str) -> Result<PathBuf, BackupError> {
    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(strip_trailing_separator(&absolute))
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    let as_string = path.to_string_lossy();
    let trimmed = as_string.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from(as_string.as_ref())
    } else {
        PathBuf::from(trimmed)
    }
}

/// Rejects when `source` is a prefix of `destination` or vice versa, under
/// `policy`'s case sensitivity.
pub fn validate_no_overlap(source: &Path, destination: &Path, policy: CasePolicy) -> Result<(), BackupError> {
    let with_trailing_separator = |path: &Path| -> String {
        let mut s = path.to_string_lossy().replace('\\', "/");
        if !s.ends_with('/') {
            s.push('/');
        }
        policy.normalize(&s)
    };

    let source = with_trailing_separator(source);
    let destination = with_trailing_separator(destination);

    if source.starts_with(&destination) || destination.starts_with(&source) {
        return Err(BackupError::PathOverlap(format!("{source} overlaps with {destination}")));
    }
    Ok(())
}
