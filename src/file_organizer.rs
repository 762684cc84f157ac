/// File organization: scanning, destination resolution and moves.
///
/// This module drives a single run. It lists the regular files of the source
/// directory up to a processing cap, classifies each one, creates the
/// category subdirectory under the target root, picks a destination that
/// does not collide with an existing entry, and renames the file into place.
/// In preview mode only the classification is reported.
use crate::config::{OrganizeOptions, fits_path_budget};
use crate::content_sampler::sample_content;
use crate::file_category::{Category, ClassificationResult, FileMapper, serialize_lossy};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

/// A regular file discovered directly under the source directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Full path to the file.
    pub path: PathBuf,
    /// Base name of the file, exactly as listed.
    pub name: OsString,
    /// Lowercased extension including the leading dot, or empty.
    pub extension: String,
}

impl FileEntry {
    /// Builds an entry from a path, rejecting paths over the length budget.
    pub fn from_path(path: PathBuf) -> OrganizeResult<Self> {
        if !fits_path_budget(&path) {
            return Err(OrganizeError::PathTooLong { path });
        }

        let name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
        let lossy = name.to_string_lossy();
        let extension = lossy
            .rfind('.')
            .map(|idx| lossy[idx..].to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            path,
            name,
            extension,
        })
    }

    fn from_dir_entry(entry: &DirEntry) -> OrganizeResult<Self> {
        Self::from_path(entry.path())
    }
}

/// What happened to one processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Preview mode: classified and reported only.
    Previewed,
    /// The file now lives at `destination`.
    Moved {
        #[serde(serialize_with = "serialize_lossy")]
        destination: PathBuf,
    },
    /// No move was attempted.
    Skipped { reason: String },
    /// The rename call itself failed.
    MoveFailed {
        #[serde(serialize_with = "serialize_lossy")]
        destination: PathBuf,
        reason: String,
    },
}

/// Per-file line of a [`RunReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Source file name, lossily converted for display.
    pub name: String,
    pub classification: ClassificationResult,
    pub outcome: FileOutcome,
}

/// Summary of one organization run.
///
/// Only printed on request; nothing about a run is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// RFC 3339 timestamp of when the run started.
    pub started_at: String,
    /// RFC 3339 timestamp of when the run finished.
    pub finished_at: String,
    #[serde(serialize_with = "serialize_lossy")]
    pub source: PathBuf,
    #[serde(serialize_with = "serialize_lossy")]
    pub target: PathBuf,
    pub preview: bool,
    /// Files that reached classification. Never exceeds the cap.
    pub processed: usize,
    /// Files successfully renamed into the target tree.
    pub moved: usize,
    pub files: Vec<FileRecord>,
}

impl RunReport {
    fn new(options: &OrganizeOptions) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            source: options.source.clone(),
            target: options.target.clone(),
            preview: options.preview,
            processed: 0,
            moved: 0,
            files: Vec::new(),
        }
    }

    fn record(&mut self, name: &OsStr, classification: ClassificationResult, outcome: FileOutcome) {
        self.processed += 1;
        if matches!(outcome, FileOutcome::Moved { .. }) {
            self.moved += 1;
        }
        self.files.push(FileRecord {
            name: name.to_string_lossy().into_owned(),
            classification,
            outcome,
        });
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> OrganizeResult<String> {
        serde_json::to_string_pretty(self).map_err(OrganizeError::ReportSerialization)
    }
}

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source directory could not be opened for listing.
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The target root could not be created and does not exist.
    TargetCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A constructed path reached the path-length budget.
    PathTooLong { path: PathBuf },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Every collision-free candidate would exceed the path-length budget.
    NameResolutionOverflow { last_candidate: PathBuf },
    /// Failed to move a file to its destination.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The run report could not be serialized.
    ReportSerialization(serde_json::Error),
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnreadable { path, source } => {
                write!(
                    f,
                    "Cannot open source directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::TargetCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create target directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::PathTooLong { path } => write!(f, "Path too long: {}", path.display()),
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Could not create subdirectory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::NameResolutionOverflow { last_candidate } => {
                write!(
                    f,
                    "Filename too long while resolving collisions, last candidate was {}",
                    last_candidate.display()
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Move failed {} -> {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::ReportSerialization(e) => write!(f, "Could not serialize run report: {}", e),
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes files by moving them into category subdirectories.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    mapper: FileMapper,
}

impl FileOrganizer {
    /// Creates an organizer that classifies with the given mapper.
    pub fn new(mapper: FileMapper) -> Self {
        Self { mapper }
    }

    /// Runs one pass over the source directory.
    ///
    /// Entries that are not regular files are skipped without a message.
    /// Per-file failures are reported and recorded in the returned report;
    /// only an unreadable source directory aborts the run.
    ///
    /// The target root must already exist unless `options.preview` is set;
    /// see [`FileOrganizer::prepare_target_root`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pcopy::config::OrganizeOptions;
    /// use pcopy::file_organizer::FileOrganizer;
    ///
    /// let options = OrganizeOptions::new("/tmp/inbox", None, true, 50).unwrap();
    /// let report = FileOrganizer::default().run(&options).unwrap();
    /// println!("{} files processed", report.processed);
    /// ```
    pub fn run(&self, options: &OrganizeOptions) -> OrganizeResult<RunReport> {
        let entries =
            fs::read_dir(&options.source).map_err(|e| OrganizeError::SourceUnreadable {
                path: options.source.clone(),
                source: e,
            })?;

        let mut report = RunReport::new(options);

        for entry in entries.flatten() {
            if report.processed >= options.max_files {
                log::debug!("processing cap of {} reached", options.max_files);
                break;
            }

            let is_regular = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_regular {
                continue;
            }

            let file = match FileEntry::from_dir_entry(&entry) {
                Ok(file) => file,
                Err(e) => {
                    OutputFormatter::warning(&e.to_string());
                    continue;
                }
            };

            OutputFormatter::plain(&format!("Processing: {}", file.name.to_string_lossy()));
            log::debug!("{} has extension {:?}", file.path.display(), file.extension);

            let sample = sample_content(&file.path);
            log::debug!("sample of {}: {:.60}", file.path.display(), sample.as_text());
            let classification = self.mapper.classify(&file.path, &sample);
            OutputFormatter::info(&format!(
                "  -> Category: {}, New: {} ({})",
                classification.category,
                classification.new_name.to_string_lossy(),
                classification.description
            ));

            let outcome = if options.preview {
                FileOutcome::Previewed
            } else {
                Self::place_file(&file, &classification, &options.target)
            };

            report.record(&file.name, classification, outcome);
        }

        report.finished_at = chrono::Utc::now().to_rfc3339();
        Ok(report)
    }

    fn place_file(
        file: &FileEntry,
        classification: &ClassificationResult,
        target_root: &Path,
    ) -> FileOutcome {
        let category_dir = match Self::ensure_category_dir(target_root, classification.category)
        {
            Ok(dir) => dir,
            Err(e) => {
                OutputFormatter::warning(&e.to_string());
                return FileOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let destination = match Self::resolve_destination(&category_dir, &classification.new_name)
        {
            Ok(path) => path,
            Err(e) => {
                OutputFormatter::warning(&format!("{}; file left in place", e));
                return FileOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        match Self::move_file(&file.path, &destination) {
            Ok(()) => {
                OutputFormatter::success(&format!("  Moved to: {}", destination.display()));
                FileOutcome::Moved { destination }
            }
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                FileOutcome::MoveFailed {
                    destination,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Creates the target root if it does not exist yet.
    ///
    /// The parent must exist; an existing directory is not an error.
    pub fn prepare_target_root(target_root: &Path) -> OrganizeResult<()> {
        if !fits_path_budget(target_root) {
            return Err(OrganizeError::PathTooLong {
                path: target_root.to_path_buf(),
            });
        }
        create_dir_if_absent(target_root).map_err(|e| OrganizeError::TargetCreationFailed {
            path: target_root.to_path_buf(),
            source: e,
        })
    }

    /// Ensures `target_root/<Category>` exists and returns its path.
    pub fn ensure_category_dir(target_root: &Path, category: Category) -> OrganizeResult<PathBuf> {
        let category_dir = target_root.join(category.dir_name());
        if !fits_path_budget(&category_dir) {
            return Err(OrganizeError::PathTooLong { path: category_dir });
        }

        create_dir_if_absent(&category_dir).map_err(|e| {
            OrganizeError::DirectoryCreationFailed {
                path: category_dir.clone(),
                source: e,
            }
        })?;
        Ok(category_dir)
    }

    /// Picks a destination for `new_name` inside `category_dir` that no
    /// existing entry occupies.
    ///
    /// `name.ext` is tried first, then `name_1.ext`, `name_2.ext` and so on.
    /// The extension is everything from the last dot of `new_name`.
    ///
    /// # Errors
    ///
    /// Returns `PathTooLong` if even the first candidate is over budget, and
    /// `NameResolutionOverflow` if a numbered candidate would be.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pcopy::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// // With Documents/document.txt already present:
    /// let dest = FileOrganizer::resolve_destination(Path::new("Documents"), "document.txt").unwrap();
    /// assert_eq!(dest, Path::new("Documents/document_1.txt"));
    /// ```
    pub fn resolve_destination(
        category_dir: &Path,
        new_name: impl AsRef<OsStr>,
    ) -> OrganizeResult<PathBuf> {
        let new_name = new_name.as_ref();
        let mut candidate = category_dir.join(new_name);
        if !fits_path_budget(&candidate) {
            return Err(OrganizeError::PathTooLong { path: candidate });
        }

        let (base, ext) = split_name(new_name);

        let mut counter: u64 = 1;
        while entry_exists(&candidate) {
            let mut numbered = base.clone();
            numbered.push(format!("_{}", counter));
            numbered.push(&ext);
            let next = category_dir.join(numbered);
            if !fits_path_budget(&next) {
                return Err(OrganizeError::NameResolutionOverflow {
                    last_candidate: candidate,
                });
            }
            candidate = next;
            counter += 1;
        }

        log::debug!("resolved {} after {} attempt(s)", candidate.display(), counter);
        Ok(candidate)
    }

    /// Renames `file_path` to `destination`.
    ///
    /// This is a plain rename, so it fails across filesystem boundaries.
    pub fn move_file(file_path: &Path, destination: &Path) -> OrganizeResult<()> {
        fs::rename(file_path, destination).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination.to_path_buf(),
            source_error: e,
        })
    }
}

/// Splits a filename into base and extension at its last `.`, keeping the
/// dot with the extension. Works on the raw OS string so no bytes are lost.
fn split_name(name: &OsStr) -> (OsString, OsString) {
    let as_path = Path::new(name);
    match (as_path.file_stem(), as_path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (stem.to_os_string(), dotted)
        }
        // `.bashrc`: the whole name is the extension
        _ if name.as_encoded_bytes().first() == Some(&b'.') => {
            (OsString::new(), name.to_os_string())
        }
        _ => (name.to_os_string(), OsString::new()),
    }
}

fn create_dir_if_absent(path: &Path) -> std::io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

// Dangling symlinks count as taken.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
