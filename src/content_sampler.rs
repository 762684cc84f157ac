//! Bounded content sampling for plain-text files.

use crate::config::MAX_SAMPLE_LEN;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Extensions, as written in the file name, whose content is sampled.
const SAMPLED_EXTENSIONS: &[&str] = &[".txt", ".md"];

/// What the sampler could learn about a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSample {
    /// Raw prefix of a text file, shorter than [`MAX_SAMPLE_LEN`] bytes.
    Excerpt(Vec<u8>),
    /// The file is not a sampled type; holds `File: <path>`.
    Placeholder(String),
    /// The file could not be statted or read; holds `Could not read <path>`.
    Unreadable(String),
}

impl ContentSample {
    /// Returns the sample as text, replacing invalid UTF-8.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            ContentSample::Excerpt(bytes) => String::from_utf8_lossy(bytes),
            ContentSample::Placeholder(s) | ContentSample::Unreadable(s) => s.as_str().into(),
        }
    }
}

/// Samples the beginning of a file.
///
/// Files ending in `.txt` or `.md` yield up to `MAX_SAMPLE_LEN - 1` raw bytes.
/// Everything else yields a placeholder. Failures never propagate: they are
/// folded into [`ContentSample::Unreadable`].
///
/// # Examples
///
/// ```no_run
/// use pcopy::content_sampler::{sample_content, ContentSample};
/// use std::path::Path;
///
/// match sample_content(Path::new("/tmp/notes.txt")) {
///     ContentSample::Excerpt(bytes) => println!("{} bytes sampled", bytes.len()),
///     other => println!("{}", other.as_text()),
/// }
/// ```
pub fn sample_content(path: &Path) -> ContentSample {
    if let Err(e) = fs::metadata(path) {
        log::debug!("stat failed for {}: {}", path.display(), e);
        return unreadable(path);
    }

    if !is_sampled(path) {
        return ContentSample::Placeholder(format!("File: {}", path.display()));
    }

    match read_prefix(path) {
        Ok(bytes) => ContentSample::Excerpt(bytes),
        Err(e) => {
            log::debug!("sampling failed for {}: {}", path.display(), e);
            unreadable(path)
        }
    }
}

fn read_prefix(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buffer = Vec::new();
    file.take((MAX_SAMPLE_LEN - 1) as u64)
        .read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn is_sampled(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(idx) => SAMPLED_EXTENSIONS.contains(&&name[idx..]),
        None => false,
    }
}

fn unreadable(path: &Path) -> ContentSample {
    ContentSample::Unreadable(format!("Could not read {}", path.display()))
}
