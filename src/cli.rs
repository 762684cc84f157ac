//! Command-line interface module for pcopy.
//!
//! This module handles everything between the terminal and the organizer:
//! - Flag parsing
//! - Interactive prompts when no source is given on the command line
//! - Target root preparation
//! - Run orchestration and the final summary

use crate::config::{ConfigError, DEFAULT_MAX_FILES, OrganizeOptions};
use crate::file_organizer::{FileOrganizer, OrganizeResult, RunReport};
use crate::output::OutputFormatter;
use clap::Parser;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Sort the files of a directory into category subdirectories.
#[derive(Debug, Parser)]
#[command(name = "pcopy", version, about)]
pub struct Args {
    /// Source directory. Prompted for when omitted.
    pub source: Option<PathBuf>,

    /// Target root. Defaults to <SOURCE>/Organized.
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Only report what would happen.
    #[arg(short, long)]
    pub preview: bool,

    /// Maximum number of files to process.
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Print the run report as JSON after the run.
    #[arg(long)]
    pub json: bool,

    /// Never prompt; fail if the source is missing.
    #[arg(long)]
    pub no_prompt: bool,
}

impl Args {
    /// Turns parsed flags into run options, prompting for what is missing.
    ///
    /// When a source is given on the command line nothing is prompted for.
    pub fn into_options<R: BufRead, W: Write>(
        self,
        input: &mut R,
        output: &mut W,
    ) -> Result<OrganizeOptions, ConfigError> {
        match self.source {
            Some(source) => OrganizeOptions::new(source, self.target, self.preview, self.max_files),
            None if self.no_prompt => Err(ConfigError::EmptySource),
            None => prompt_options(input, output, self.max_files),
        }
    }
}

/// Asks for source, target and preview mode on the given streams.
///
/// A blank target selects `<source>/Organized`. Preview is on when the answer
/// starts with `y` or `Y`; anything else, including a blank line, applies the
/// changes.
///
/// # Examples
///
/// ```
/// use pcopy::cli::prompt_options;
/// use std::path::Path;
///
/// let mut input = "/tmp/inbox\n\ny\n".as_bytes();
/// let mut output = Vec::new();
/// let options = prompt_options(&mut input, &mut output, 50).unwrap();
/// assert_eq!(options.target, Path::new("/tmp/inbox/Organized"));
/// assert!(options.preview);
/// ```
pub fn prompt_options<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    max_files: usize,
) -> Result<OrganizeOptions, ConfigError> {
    let source = ask(input, output, "Enter source directory: ")?;
    if source.is_empty() {
        return Err(ConfigError::EmptySource);
    }

    let target = ask(
        input,
        output,
        "Enter target directory (optional, press Enter for default): ",
    )?;
    let target = (!target.is_empty()).then(|| PathBuf::from(target));

    let preview = ask(input, output, "Preview only? (y/n): ")?;
    let preview = preview.starts_with(['y', 'Y']);

    OrganizeOptions::new(source, target, preview, max_files)
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<String, ConfigError> {
    write!(output, "{}", question).map_err(ConfigError::PromptIo)?;
    output.flush().map_err(ConfigError::PromptIo)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(ConfigError::PromptIo)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Runs an organization pass and prints the summary.
///
/// Outside preview mode the target root is created first; failing to create
/// it aborts the run before any file is touched.
///
/// # Examples
///
/// ```no_run
/// use pcopy::cli::run_cli;
/// use pcopy::config::OrganizeOptions;
///
/// let options = OrganizeOptions::new("/tmp/inbox", None, false, 50).unwrap();
/// match run_cli(&options) {
///     Ok(report) => println!("{} moved", report.moved),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(options: &OrganizeOptions) -> OrganizeResult<RunReport> {
    OutputFormatter::plain(&format!(
        "Starting organization: {} -> {}",
        options.source.display(),
        options.target.display()
    ));

    if options.preview {
        OutputFormatter::preview_notice("No files will be moved.");
    } else {
        FileOrganizer::prepare_target_root(&options.target)?;
    }

    let report = FileOrganizer::default().run(options)?;

    if !report.files.is_empty() {
        OutputFormatter::summary_table(&category_counts(&report), report.processed);
    }

    let failures = report.processed - report.moved;
    if !options.preview && failures > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review the messages above.",
            failures
        ));
    }

    OutputFormatter::plain(&format!(
        "Complete! {} files processed. Check {}",
        report.processed,
        options.target.display()
    ));

    Ok(report)
}

fn category_counts(report: &RunReport) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in &report.files {
        *counts
            .entry(record.classification.category.dir_name().to_string())
            .or_insert(0) += 1;
    }
    counts
}
