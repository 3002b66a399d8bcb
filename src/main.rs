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

mod cli;

use colored::Colorize;

use treesync::backend::localfs::LocalFsBackend;
use treesync::{BackupError, BackupOptions, BackupRequest, CancellationToken, Orchestrator};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = match cli::Cli::resolve() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{} {e}", "error:".bold().red());
            return if e.downcast_ref::<cli::InvalidModeError>().is_some() {
                2
            } else {
                1
            };
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        if ctrlc::set_handler(move || cancel.cancel()).is_err() {
            eprintln!("{}", "warning: failed to install Ctrl-C handler".yellow());
        }
    }

    let backend = LocalFsBackend::new();
    let orchestrator = Orchestrator::new(&backend);
    let progress = cli::CliProgressReporter::new();

    let request = BackupRequest {
        source_path: args.source,
        destination_path: args.dest,
        mode: args.mode,
    };
    let options = BackupOptions::default();

    let outcome = orchestrator.execute(&request, &options, Some(&progress), &cancel);
    progress.finish();

    match outcome {
        Ok(result) => {
            cli::print_summary(&result);
            0
        }
        Err(BackupError::Cancelled) => {
            eprintln!("{}", "cancelled".bold().yellow());
            130
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".bold().red());
            1
        }
    }
}
