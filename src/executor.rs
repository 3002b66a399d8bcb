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

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::backend::FsBackend;
use crate::backend::volume;
use crate::cancel::CancellationToken;
use crate::error::BackupError;
use crate::path::{RelativePath, combine};
use crate::plan::{BackupMode, Plan};
use crate::progress::{BackupProgress, ProgressReporter};
use crate::snapshot::Snapshot;

/// Tally of filesystem operations a run performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupResult {
    pub directories_created: u32,
    pub files_copied: u32,
    pub files_overwritten: u32,
    pub files_deleted: u32,
    pub directories_deleted: u32,
}

/// Applies a [`Plan`] to the filesystem with bounded parallelism, reporting
/// progress and tallying results. A fixed DAG: Prepare -> (CreateDirs ->
/// CopyMissing -> [Sync only: Overwrite]) -> (DeleteFiles -> DeleteDirs) ->
/// Done. Any primitive error aborts the run immediately; no compensating
/// undo is attempted.
pub struct Executor;

impl Executor {
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        mode: BackupMode,
        plan: &Plan,
        source_snapshot: &Snapshot,
        source_root: &Path,
        destination_root: &Path,
        files_to_overwrite: &[RelativePath],
        backend: &dyn FsBackend,
        max_file_io_concurrency: usize,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<BackupResult, BackupError> {
        let io_concurrency = volume::clamp_io_concurrency(destination_root, max_file_io_concurrency.max(1));

        let total = Self::total_items(mode, plan, files_to_overwrite);
        let processed = AtomicU32::new(0);
        if let Some(reporter) = progress {
            reporter.report(BackupProgress {
                phase: "Preparing",
                processed: 0,
                total,
            });
        }

        let mut result = BackupResult::default();

        if matches!(mode, BackupMode::Sync | BackupMode::Add) {
            result.directories_created = Self::create_directories(
                &plan.directories_to_create,
                destination_root,
                backend,
                io_concurrency,
                &processed,
                total,
                progress,
                cancel,
            )?;

            result.files_copied = Self::copy_files(
                &plan.missing_files,
                source_snapshot,
                source_root,
                destination_root,
                backend,
                io_concurrency,
                false,
                "Copying files",
                &processed,
                total,
                progress,
                cancel,
            )?;

            if mode == BackupMode::Sync && !files_to_overwrite.is_empty() {
                result.files_overwritten = Self::copy_files(
                    files_to_overwrite,
                    source_snapshot,
                    source_root,
                    destination_root,
                    backend,
                    io_concurrency,
                    true,
                    "Overwriting files",
                    &processed,
                    total,
                    progress,
                    cancel,
                )?;
            }
        }

        if matches!(mode, BackupMode::Sync | BackupMode::Remove) {
            result.files_deleted = Self::delete_files(
                &plan.extra_files,
                destination_root,
                backend,
                io_concurrency,
                &processed,
                total,
                progress,
                cancel,
            )?;

            result.directories_deleted = Self::delete_directories(
                &plan.top_level_extra_dirs,
                destination_root,
                backend,
                &processed,
                total,
                progress,
                cancel,
            )?;
        }

        Ok(result)
    }

    fn total_items(mode: BackupMode, plan: &Plan, files_to_overwrite: &[RelativePath]) -> u32 {
        let mut total = 0usize;
        if matches!(mode, BackupMode::Sync | BackupMode::Add) {
            total += plan.directories_to_create.len();
            total += plan.missing_files.len();
            if mode == BackupMode::Sync {
                total += files_to_overwrite.len();
            }
        }
        if matches!(mode, BackupMode::Sync | BackupMode::Remove) {
            total += plan.extra_files.len();
            total += plan.top_level_extra_dirs.len();
        }
        total as u32
    }

    fn report(progress: Option<&dyn ProgressReporter>, phase: &'static str, processed: &AtomicU32, total: u32) {
        if let Some(reporter) = progress {
            let processed = processed.fetch_add(1, Ordering::AcqRel) + 1;
            reporter.report(BackupProgress {
                phase,
                processed,
                total,
            });
        } else {
            processed.fetch_add(1, Ordering::AcqRel);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_directories(
        dirs: &[RelativePath],
        destination_root: &Path,
        backend: &dyn FsBackend,
        concurrency: usize,
        processed: &AtomicU32,
        total: u32,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<u32, BackupError> {
        if dirs.is_empty() {
            return Ok(0);
        }
        let count = AtomicU32::new(0);
        Self::run_pool(concurrency, dirs, |dir| {
            if cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            backend.create_directory(&combine(destination_root, dir))?;
            count.fetch_add(1, Ordering::AcqRel);
            Self::report(progress, "Creating directories", processed, total);
            Ok(())
        })?;
        Ok(count.load(Ordering::Acquire))
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_files(
        paths: &[RelativePath],
        source_snapshot: &Snapshot,
        source_root: &Path,
        destination_root: &Path,
        backend: &dyn FsBackend,
        concurrency: usize,
        overwrite: bool,
        phase: &'static str,
        processed: &AtomicU32,
        total: u32,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<u32, BackupError> {
        if paths.is_empty() {
            return Ok(0);
        }
        let count = AtomicU32::new(0);
        Self::run_pool(concurrency, paths, |path| {
            if cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            let mtime = source_snapshot.get_file(path).map(|entry| entry.mtime);
            backend.copy_file(
                &combine(source_root, path),
                &combine(destination_root, path),
                overwrite,
                mtime,
                cancel,
            )?;
            count.fetch_add(1, Ordering::AcqRel);
            Self::report(progress, phase, processed, total);
            Ok(())
        })?;
        Ok(count.load(Ordering::Acquire))
    }

    #[allow(clippy::too_many_arguments)]
    fn delete_files(
        paths: &[RelativePath],
        destination_root: &Path,
        backend: &dyn FsBackend,
        concurrency: usize,
        processed: &AtomicU32,
        total: u32,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<u32, BackupError> {
        if paths.is_empty() {
            return Ok(0);
        }
        let count = AtomicU32::new(0);
        Self::run_pool(concurrency, paths, |path| {
            if cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            backend.delete_file_if_exists(&combine(destination_root, path))?;
            count.fetch_add(1, Ordering::AcqRel);
            Self::report(progress, "Deleting files", processed, total);
            Ok(())
        })?;
        Ok(count.load(Ordering::Acquire))
    }

    /// Top-level extra directories are deleted sequentially: recursive
    /// deletion is already parallel at the tree level, and parent/child
    /// ordering among the top-level set must not race.
    fn delete_directories(
        dirs: &[RelativePath],
        destination_root: &Path,
        backend: &dyn FsBackend,
        processed: &AtomicU32,
        total: u32,
        progress: Option<&dyn ProgressReporter>,
        cancel: &CancellationToken,
    ) -> Result<u32, BackupError> {
        let mut count = 0u32;
        for dir in dirs {
            if cancel.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            backend.delete_directory_if_exists(&combine(destination_root, dir), true)?;
            count += 1;
            Self::report(progress, "Deleting directories", processed, total);
        }
        Ok(count)
    }

    /// Runs `op` over `items` with a rayon pool of `concurrency` threads.
    /// The first error tripping the cancellation token (via `op` itself)
    /// causes peer tasks to short-circuit at their next cancellation check.
    fn run_pool<T, F>(concurrency: usize, items: &[T], op: F) -> Result<(), BackupError>
    where
        T: Sync,
        F: Fn(&T) -> Result<(), BackupError> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .build()
            .map_err(|e| BackupError::Io(std::io::Error::other(e.to_string())))?;
        pool.install(|| items.par_iter().try_for_each(&op))
    }
}
