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

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::cancel::CancellationToken;
use crate::error::BackupError;
use crate::hashing;
use crate::path::{RelativePath, combine};
use crate::snapshot::Snapshot;

/// Classifies which of `common` files need rewriting in `Sync` mode, via a
/// three-level equivalence ladder: size difference, then exact mtime
/// equality, then a SHA-256 fallback compared in constant time. Only called
/// when `common` is non-empty.
pub struct OverwriteDetector;

impl OverwriteDetector {
    #[allow(clippy::too_many_arguments)]
    pub fn classify(
        common: &[RelativePath],
        source: &Snapshot,
        destination: &Snapshot,
        source_root: &Path,
        destination_root: &Path,
        max_hash_concurrency: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<RelativePath>, BackupError> {
        if common.is_empty() {
            return Ok(Vec::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_hash_concurrency.max(1))
            .build()
            .map_err(|e| BackupError::Io(std::io::Error::other(e.to_string())))?;

        let (sender, receiver) = crossbeam_channel::unbounded();

        let outcome: Result<(), BackupError> = pool.install(|| {
            common.par_iter().try_for_each(|path| -> Result<(), BackupError> {
                if cancel.is_cancelled() {
                    return Err(BackupError::Cancelled);
                }

                let source_entry = source
                    .get_file(path)
                    .expect("classify is only called with paths present in both snapshots");
                let destination_entry = destination
                    .get_file(path)
                    .expect("classify is only called with paths present in both snapshots");

                if source_entry.length != destination_entry.length {
                    let _ = sender.send(path.clone());
                    return Ok(());
                }

                if source_entry.mtime == destination_entry.mtime {
                    return Ok(());
                }

                let source_hash = hashing::sha256(&combine(source_root, path), cancel)?;
                let destination_hash = hashing::sha256(&combine(destination_root, path), cancel)?;

                if !hashing::constant_time_eq(&source_hash, &destination_hash) {
                    let _ = sender.send(path.clone());
                }

                Ok(())
            })
        });

        drop(sender);
        outcome?;

        Ok(receiver.into_iter().collect())
    }
}
