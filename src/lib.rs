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

//! Core reconciliation engine: given a source tree, a destination tree and a
//! [`BackupMode`], compute and apply the file-system operations that bring
//! the destination into the policy-defined relationship with the source.

pub mod backend;
pub mod cancel;
pub mod error;
pub mod executor;
pub mod hashing;
pub mod overwrite;
pub mod path;
pub mod plan;
pub mod progress;
pub mod snapshot;
pub mod orchestrator;

pub use cancel::CancellationToken;
pub use error::BackupError;
pub use executor::{BackupResult, Executor};
pub use orchestrator::{BackupOptions, BackupRequest, Orchestrator};
pub use path::{CasePolicy, RelativePath};
pub use plan::{BackupMode, Plan, PlanService};
pub use progress::{BackupProgress, NullProgressReporter, ProgressReporter};
pub use snapshot::{FileEntry, Snapshot, SnapshotService};
