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

use sysinfo::Disks;

const NETWORK_FILESYSTEMS: &[&str] = &["nfs", "smb", "cifs", "afpfs", "9p", "sshfs"];
const OPTICAL_FILESYSTEMS: &[&str] = &["iso9660", "udf"];

enum VolumeKind {
    Removable,
    Network,
    Optical,
}

fn detect_volume_kind(path: &Path) -> Option<VolumeKind> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())?;

    if disk.is_removable() {
        return Some(VolumeKind::Removable);
    }

    let file_system = disk.file_system().to_string_lossy().to_lowercase();
    if NETWORK_FILESYSTEMS.iter().any(|name| file_system.contains(name)) {
        return Some(VolumeKind::Network);
    }
    if OPTICAL_FILESYSTEMS.iter().any(|name| file_system.contains(name)) {
        return Some(VolumeKind::Optical);
    }

    None
}

/// Clamps `configured` IO concurrency to 1 for network, removable, or
/// optical destination volumes. Falls back to `configured` whenever the
/// destination's volume cannot be resolved — inspection is best-effort.
pub fn clamp_io_concurrency(destination_root: &Path, configured: usize) -> usize {
    match detect_volume_kind(destination_root) {
        Some(VolumeKind::Removable) | Some(VolumeKind::Network) | Some(VolumeKind::Optical) => 1,
        None => configured,
    }
}
