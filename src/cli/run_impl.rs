use anyhow::Result;
use std::path::Path;

use crate::formatter::ClangFormat;
use crate::languages::filter_c_family;
use crate::vcs::{CollectCommand, CollectMode, collect_files, repository_root};

use super::Options;

pub const NO_MATCHING_FILES: &str = "There are no C/C++/Objective-C files in this repository";

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Formatted { files: usize, batches: usize },
    /// Nothing to format; reported to the user but still a non-zero exit.
    NoMatchingFiles,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Formatted { .. } => 0,
            Self::NoMatchingFiles => 1,
        }
    }
}

pub fn run_with_options(opts: &Options) -> Result<Outcome> {
    let root = match opts.mode {
        CollectMode::All => Some(repository_root(Path::new("."))?),
        _ => None,
    };
    let command = CollectCommand::new(&opts.git, opts.mode, root.as_deref(), &opts.scopes);
    let files = collect_files(&command)?;
    let c_files = filter_c_family(&files);
    log::debug!(
        "collected {} path(s), {} C-family",
        files.len(),
        c_files.len()
    );

    if c_files.is_empty() {
        println!("{NO_MATCHING_FILES}");
        return Ok(Outcome::NoMatchingFiles);
    }

    if opts.verbose {
        for file in &c_files {
            println!("{file}");
        }
    }

    let mut formatter = ClangFormat::new(opts.clang_format.clone(), opts.batch_size);
    if opts.mode.runs_at_root() {
        formatter = formatter.at_repository_root()?;
    }

    let pb = if opts.progress {
        let total = c_files.len().div_ceil(opts.batch_size.max(1));
        let pb = indicatif::ProgressBar::new(total as u64);
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner} {pos}/{len} batches {wide_bar} {eta}")?
                .tick_chars("⠁⠃⠇⠋⠙⠸⢰⣠⣄⡆"),
        );
        Some(pb)
    } else {
        None
    };

    let result = formatter.apply(&c_files, |_| {
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    });
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let batches = result?;

    log::info!("formatted {} file(s) in {} batch(es)", c_files.len(), batches);
    Ok(Outcome::Formatted {
        files: c_files.len(),
        batches,
    })
}
