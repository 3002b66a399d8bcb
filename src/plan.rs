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

use crate::path::RelativePath;
use crate::snapshot::Snapshot;

/// Closed tagged enumeration of reconciliation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    Sync,
    Add,
    Remove,
}

/// The classified set of operations derived from two snapshots under a
/// given mode. `Add` never populates `extra_files`/`top_level_extra_dirs`;
/// `Remove` never populates `directories_to_create`/`missing_files`/
/// `common_files`.
#[derive(Debug, Default)]
pub struct Plan {
    /// Present in source, absent in destination; sorted so every parent
    /// precedes its children.
    pub directories_to_create: Vec<RelativePath>,
    /// In source, not in destination.
    pub missing_files: Vec<RelativePath>,
    /// In both (populated only in `Sync`); candidates for content
    /// comparison.
    pub common_files: Vec<RelativePath>,
    /// In destination, not in source.
    pub extra_files: Vec<RelativePath>,
    /// Destination-only directories with no destination-only ancestor.
    /// Recursive deletion of each covers exactly the destination-only
    /// subtree.
    pub top_level_extra_dirs: Vec<RelativePath>,
}

pub struct PlanService;

impl PlanService {
    /// Pure function over two snapshots: no filesystem access.
    pub fn build(mode: BackupMode, source: &Snapshot, destination: &Snapshot) -> Plan {
        let mut plan = Plan::default();

        if matches!(mode, BackupMode::Sync | BackupMode::Add) {
            plan.directories_to_create = source
                .dir_paths()
                .filter(|dir| !destination.contains_dir(dir))
                .cloned()
                .collect();
            plan.directories_to_create
                .sort_by_key(|path| path.as_str().len());

            for file in source.file_paths() {
                if !destination.contains_file(file) {
                    plan.missing_files.push(file.clone());
                } else if mode == BackupMode::Sync {
                    plan.common_files.push(file.clone());
                }
            }
        }

        if matches!(mode, BackupMode::Sync | BackupMode::Remove) {
            plan.extra_files = destination
                .file_paths()
                .filter(|file| !source.contains_file(file))
                .cloned()
                .collect();

            let mut destination_only_dirs: Vec<RelativePath> = destination
                .dir_paths()
                .filter(|dir| !source.contains_dir(dir))
                .cloned()
                .collect();
            destination_only_dirs.sort_by_key(|path| path.as_str().len());

            let policy = destination.policy();
            for dir in &destination_only_dirs {
                let has_destination_only_ancestor = destination_only_dirs
                    .iter()
                    .any(|other| dir.has_strict_ancestor(other, policy));
                if !has_destination_only_ancestor {
                    plan.top_level_extra_dirs.push(dir.clone());
                }
            }
        }

        plan
    }
}
