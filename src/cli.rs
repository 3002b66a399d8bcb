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

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use treesync::{BackupMode, BackupProgress, BackupResult, ProgressReporter};

const PROGRESS_REFRESH_RATE_HZ: u64 = 10;

/// Reconcile a destination directory tree against a source tree.
#[derive(Parser, Debug)]
#[command(about = "Reconcile a destination directory tree against a source tree")]
pub struct Cli {
    /// Source directory.
    #[arg(long)]
    pub source: Option<String>,

    /// Destination directory.
    #[arg(long = "dest")]
    pub dest: Option<String>,

    /// Reconciliation policy: sync, add, or remove.
    #[arg(long)]
    pub mode: Option<String>,
}

/// Arguments fully resolved, with `mode` parsed into its typed enum.
pub struct ResolvedArgs {
    pub source: String,
    pub dest: String,
    pub mode: BackupMode,
}

/// Thrown when the user supplied an unrecognized `--mode` value; the
/// presentation layer maps this to exit code 2.
#[derive(Debug)]
pub struct InvalidModeError(pub String);

impl std::fmt::Display for InvalidModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid mode '{}': expected sync, add, or remove", self.0)
    }
}

impl std::error::Error for InvalidModeError {}

impl Cli {
    /// Parses command-line flags, then interactively prompts for anything
    /// left unset.
    pub fn resolve() -> Result<ResolvedArgs> {
        let cli = Cli::parse();

        let source = match cli.source {
            Some(source) => source,
            None => Input::new()
                .with_prompt("Source directory")
                .interact_text()
                .context("failed to read source directory")?,
        };

        let dest = match cli.dest {
            Some(dest) => dest,
            None => Input::new()
                .with_prompt("Destination directory")
                .interact_text()
                .context("failed to read destination directory")?,
        };

        let mode_str = match cli.mode {
            Some(mode) => mode,
            None => {
                let options = ["sync", "add", "remove"];
                let selection = Select::new()
                    .with_prompt("Mode")
                    .items(&options)
                    .default(0)
                    .interact()
                    .context("failed to read mode selection")?;
                options[selection].to_string()
            }
        };

        let mode = parse_mode(&mode_str)?;

        Ok(ResolvedArgs { source, dest, mode })
    }
}

pub fn parse_mode(raw: &str) -> Result<BackupMode, InvalidModeError> {
    match raw.to_ascii_lowercase().as_str() {
        "sync" => Ok(BackupMode::Sync),
        "add" => Ok(BackupMode::Add),
        "remove" => Ok(BackupMode::Remove),
        other => Err(InvalidModeError(other.to_string())),
    }
}

/// Drives a single [`indicatif::ProgressBar`] from [`BackupProgress`]
/// samples.
pub struct CliProgressReporter {
    bar: ProgressBar,
}

impl CliProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(PROGRESS_REFRESH_RATE_HZ as u8));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:30.cyan/white}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(1000 / PROGRESS_REFRESH_RATE_HZ));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for CliProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliProgressReporter {
    fn report(&self, progress: BackupProgress) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.processed as u64);
        self.bar.set_message(progress.phase);
    }
}

pub fn print_summary(result: &BackupResult) {
    println!("{}", "Done".bold().green());
    println!("  directories created:  {}", result.directories_created);
    println!("  files copied:         {}", result.files_copied);
    println!("  files overwritten:    {}", result.files_overwritten);
    println!("  files deleted:        {}", result.files_deleted);
    println!("  directories deleted:  {}", result.directories_deleted);
}
