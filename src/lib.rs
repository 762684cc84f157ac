//! pcopy - sort the files of a directory into category subdirectories
//!
//! This library samples and classifies the regular files of a source
//! directory by extension, then moves each one into a category folder under
//! a target root, renaming on collision. A preview mode reports the
//! classification without touching the filesystem.

pub mod cli;
pub mod config;
pub mod content_sampler;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use config::{ConfigError, OrganizeOptions};
pub use content_sampler::{ContentSample, sample_content};
pub use file_category::{Category, ClassificationResult, FileMapper};
pub use file_organizer::{FileOrganizer, FileOutcome, OrganizeError, RunReport};

pub use cli::run_cli;
