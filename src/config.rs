//! Run options and fixed budgets.
//!
//! There is no configuration file: every run is described by an
//! [`OrganizeOptions`] value, assembled from command-line flags or from the
//! interactive prompts in [`crate::cli`], and validated here before any
//! filesystem work starts.

use std::path::{Path, PathBuf};

/// Upper bound (exclusive) on the byte length of any path the tool builds.
pub const MAX_PATH_LEN: usize = 4096;

/// Upper bound (exclusive) on the byte length of a generated filename.
pub const MAX_NAME_LEN: usize = 50;

/// Upper bound (exclusive) on the number of bytes sampled from a text file.
pub const MAX_SAMPLE_LEN: usize = 2000;

/// Processing cap used when none is given.
pub const DEFAULT_MAX_FILES: usize = 50;

/// Name of the target root created under the source when no target is given.
pub const DEFAULT_TARGET_DIR: &str = "Organized";

/// Errors raised while assembling or validating run options.
#[derive(Debug)]
pub enum ConfigError {
    /// No source directory was supplied.
    EmptySource,
    /// The processing cap must be a positive integer.
    InvalidMaxFiles(usize),
    /// The target root path does not fit in the path budget.
    TargetPathTooLong(PathBuf),
    /// Reading an answer from the terminal failed.
    PromptIo(std::io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptySource => write!(f, "Source directory is required"),
            ConfigError::InvalidMaxFiles(n) => {
                write!(f, "Maximum files to process must be positive, got {}", n)
            }
            ConfigError::TargetPathTooLong(path) => {
                write!(f, "Target directory path too long: {}", path.display())
            }
            ConfigError::PromptIo(e) => write!(f, "Could not read input: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated parameters of a single organization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Directory whose regular files are organized.
    pub source: PathBuf,
    /// Root under which category subdirectories are created.
    pub target: PathBuf,
    /// Report classifications without touching the filesystem.
    pub preview: bool,
    /// Maximum number of files processed in this run.
    pub max_files: usize,
}

impl OrganizeOptions {
    /// Builds options, defaulting the target to `<source>/Organized`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, the cap is zero, or the
    /// resulting target path reaches [`MAX_PATH_LEN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pcopy::config::OrganizeOptions;
    /// use std::path::Path;
    ///
    /// let options = OrganizeOptions::new("/tmp/inbox", None, false, 50).unwrap();
    /// assert_eq!(options.target, Path::new("/tmp/inbox/Organized"));
    /// ```
    pub fn new(
        source: impl Into<PathBuf>,
        target: Option<PathBuf>,
        preview: bool,
        max_files: usize,
    ) -> Result<Self, ConfigError> {
        let source = source.into();
        if source.as_os_str().is_empty() {
            return Err(ConfigError::EmptySource);
        }
        if max_files == 0 {
            return Err(ConfigError::InvalidMaxFiles(max_files));
        }

        let target = match target {
            Some(t) if !t.as_os_str().is_empty() => t,
            _ => default_target(&source),
        };
        if !fits_path_budget(&target) {
            return Err(ConfigError::TargetPathTooLong(target));
        }

        Ok(Self {
            source,
            target,
            preview,
            max_files,
        })
    }
}

/// Returns the default target root for a source directory.
pub fn default_target(source: &Path) -> PathBuf {
    source.join(DEFAULT_TARGET_DIR)
}

/// Returns true if the path is strictly shorter than [`MAX_PATH_LEN`] bytes.
pub fn fits_path_budget(path: &Path) -> bool {
    path.as_os_str().len() < MAX_PATH_LEN
}

/// Truncates a string to at most `max_bytes` bytes without splitting a char.
pub(crate) fn truncate_to_bytes(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
