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

/// One sample of `(phase, processed, total)` posted after each executor
/// operation completes. Consumers may coalesce; the stream is
/// back-pressure-less and carries no terminal marker of its own (the
/// terminal `BackupResult` is reported on a different channel).
#[derive(Debug, Clone)]
pub struct BackupProgress {
    pub phase: &'static str,
    pub processed: u32,
    pub total: u32,
}

/// Consumes [`BackupProgress`] samples. The executor holds an
/// `Option<&dyn ProgressReporter>`; the reporter may be absent.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: BackupProgress);
}

/// A reporter that discards every sample, used by tests and by callers with
/// no presentation layer.
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn report(&self, _progress: BackupProgress) {}
}
