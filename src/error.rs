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

use thiserror::Error;

/// The full error taxonomy surfaced by the core engine.
///
/// Errors propagate out of the orchestrator unwrapped; the presentation
/// layer maps each variant to an exit code (`Cancelled` -> 130,
/// `InvalidArgument` for an unrecognized mode -> 2, everything else -> 1).
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("source and destination paths overlap: {0}")]
    PathOverlap(String),

    #[error("source directory not found: {0}")]
    SourceNotFound(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
