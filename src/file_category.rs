/// Rule-based file classification.
///
/// This module maps a file's extension to one of a small, closed set of
/// categories and proposes a canonical replacement filename for it.
/// Matching is case-insensitive, but the extension keeps its original case
/// in the proposed name.
///
/// # Examples
///
/// ```
/// use pcopy::content_sampler::ContentSample;
/// use pcopy::file_category::{Category, FileMapper};
/// use std::path::Path;
///
/// let mapper = FileMapper::default();
/// let sample = ContentSample::Placeholder(String::new());
/// let result = mapper.classify(Path::new("notes.TXT"), &sample);
/// assert_eq!(result.category, Category::Documents);
/// assert_eq!(result.new_name, "document.TXT");
/// ```
use crate::config::{MAX_NAME_LEN, truncate_to_bytes};
use crate::content_sampler::ContentSample;
use serde::{Serialize, Serializer};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Represents a file category.
///
/// Every file lands in exactly one category; `Others` catches whatever no
/// rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// PDF, plain text, Markdown and Word files
    Documents,
    /// Raster images
    Images,
    /// Source code and web files
    Code,
    /// Audio and video
    Media,
    /// Compressed archives
    Archives,
    /// Anything else
    Others,
}

impl Category {
    /// Returns the subdirectory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use pcopy::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Documents => "Documents",
            Category::Images => "Images",
            Category::Code => "Code",
            Category::Media => "Media",
            Category::Archives => "Archives",
            Category::Others => "Others",
        }
    }

    /// Returns the filename tag used for renamed files, if the category renames.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Category::Documents => Some("document"),
            Category::Images => Some("image"),
            Category::Code => Some("code"),
            Category::Media => Some("media"),
            Category::Archives => Some("archive"),
            Category::Others => None,
        }
    }

    /// Returns the human-readable description attached to classifications.
    pub fn description(&self) -> String {
        format!("Rule-based categorization for {}", self.dir_name())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One entry of the ordered rule table.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Category assigned on match.
    pub category: Category,
}

impl CategoryRule {
    fn new(extensions: &[&str], category: Category) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            category,
        }
    }

    fn matches(&self, lowered_ext: &str) -> bool {
        self.extensions.iter().any(|e| e == lowered_ext)
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Proposed base filename inside the category directory.
    #[serde(serialize_with = "serialize_lossy")]
    pub new_name: OsString,
    pub description: String,
}

/// Serializes an OS string as UTF-8, replacing invalid sequences.
pub(crate) fn serialize_lossy<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<OsStr>,
    S: Serializer,
{
    serializer.serialize_str(&value.as_ref().to_string_lossy())
}

/// Splits a base filename at its last `.`.
///
/// Returns the part before the dot and the extension text after it, or
/// `None` when the name contains no dot. `archive.tar.gz` splits into
/// `("archive.tar", "gz")`.
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rfind('.').map(|idx| (&name[..idx], &name[idx + 1..]))
}

/// Maps file extensions to categories through an ordered rule table.
///
/// Rules are checked top to bottom and the first match wins, so a custom
/// rule added with [`FileMapper::add_rule`] only applies to extensions
/// no earlier rule claims.
#[derive(Debug, Clone)]
pub struct FileMapper {
    rules: Vec<CategoryRule>,
}

impl FileMapper {
    /// Creates a `FileMapper` with the standard rule table.
    pub fn new() -> Self {
        let mut mapper = Self { rules: Vec::new() };
        mapper.populate_standard_rules();
        mapper
    }

    fn populate_standard_rules(&mut self) {
        self.add_rule(&["pdf", "txt", "md", "docx"], Category::Documents);
        self.add_rule(&["jpg", "jpeg", "png", "gif", "bmp"], Category::Images);
        // sh and json stay in Others
        self.add_rule(
            &["py", "c", "cpp", "java", "js", "html", "css"],
            Category::Code,
        );
        self.add_rule(&["mp4", "avi", "mkv", "mp3", "wav"], Category::Media);
        self.add_rule(&["zip", "rar", "tar", "gz"], Category::Archives);
    }

    /// Appends a rule after the existing ones.
    pub fn add_rule(&mut self, extensions: &[&str], category: Category) {
        self.rules.push(CategoryRule::new(extensions, category));
    }

    /// Maps an extension (without the dot) to a category, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use pcopy::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.extension_to_category("PNG"), Some(Category::Images));
    /// assert_eq!(mapper.extension_to_category("sh"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        let lowered = ext.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category)
    }

    /// Classifies a file by the extension of its base name.
    ///
    /// The content sample is accepted for future content-aware rules; the
    /// current table looks at extensions only. This function is total.
    pub fn classify(&self, path: &Path, _sample: &ContentSample) -> ClassificationResult {
        let base_name: OsString = path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_os_string();
        let lossy_name = base_name.to_string_lossy();

        let matched = split_extension(&lossy_name).and_then(|(_, ext)| {
            self.extension_to_category(ext)
                .and_then(|category| category.tag().map(|tag| (category, tag, ext)))
        });

        // Others keeps the name byte for byte; generated names are always UTF-8.
        let (category, new_name) = match matched {
            Some((category, tag, ext)) => {
                let mut name = format!("{}.{}", tag, ext);
                truncate_to_bytes(&mut name, MAX_NAME_LEN - 1);
                (category, OsString::from(name))
            }
            None => (Category::Others, base_name.clone()),
        };

        ClassificationResult {
            category,
            new_name,
            description: category.description(),
        }
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> ClassificationResult {
        FileMapper::default().classify(
            Path::new(name),
            &ContentSample::Placeholder(format!("File: {}", name)),
        )
    }

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Documents.dir_name(), "Documents");
        assert_eq!(Category::Images.dir_name(), "Images");
        assert_eq!(Category::Code.dir_name(), "Code");
        assert_eq!(Category::Media.dir_name(), "Media");
        assert_eq!(Category::Archives.dir_name(), "Archives");
        assert_eq!(Category::Others.dir_name(), "Others");
    }

    #[test]
    fn test_rule_groups_and_tags() {
        let groups: &[(&[&str], Category, &str)] = &[
            (&["pdf", "txt", "md", "docx"], Category::Documents, "document"),
            (&["jpg", "jpeg", "png", "gif", "bmp"], Category::Images, "image"),
            (
                &["py", "c", "cpp", "java", "js", "html", "css"],
                Category::Code,
                "code",
            ),
            (&["mp4", "avi", "mkv", "mp3", "wav"], Category::Media, "media"),
            (&["zip", "rar", "tar", "gz"], Category::Archives, "archive"),
        ];

        for (extensions, category, tag) in groups {
            for ext in *extensions {
                let result = classify(&format!("/inbox/some_file.{}", ext));
                assert_eq!(result.category, *category, "extension {}", ext);
                assert_eq!(result.new_name, OsString::from(format!("{}.{}", tag, ext)));
            }
        }
    }

    #[test]
    fn test_case_insensitive_match_keeps_case() {
        let upper = classify("IMG.JPG");
        let lower = classify("img.jpg");
        assert_eq!(upper.category, Category::Images);
        assert_eq!(lower.category, Category::Images);
        assert_eq!(upper.new_name, "image.JPG");
        assert_eq!(lower.new_name, "image.jpg");

        assert_eq!(classify("notes.TXT").new_name, "document.TXT");
    }

    #[test]
    fn test_only_last_extension_counts() {
        let result = classify("archive.tar.gz");
        assert_eq!(result.category, Category::Archives);
        assert_eq!(result.new_name, "archive.gz");
    }

    #[test]
    fn test_unknown_extensions_fall_back_to_others() {
        for name in ["run.sh", "data.json", "Makefile", "weird.XYZ"] {
            let result = classify(&format!("/inbox/{}", name));
            assert_eq!(result.category, Category::Others);
            assert_eq!(result.new_name, OsString::from(name));
        }
    }

    #[test]
    fn test_others_keeps_original_case_and_strips_dirs() {
        let result = classify("/Some/Dir.d/ReadMe");
        assert_eq!(result.category, Category::Others);
        assert_eq!(result.new_name, "ReadMe");
    }

    #[cfg(unix)]
    #[test]
    fn test_others_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"r\xE9sum\xE9.sh");
        let result = FileMapper::default().classify(
            Path::new(name),
            &ContentSample::Placeholder(String::new()),
        );
        assert_eq!(result.category, Category::Others);
        assert_eq!(result.new_name.as_os_str(), name);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_stem_still_matches_extension() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xE9.PNG");
        let result = FileMapper::default().classify(
            Path::new(name),
            &ContentSample::Placeholder(String::new()),
        );
        assert_eq!(result.category, Category::Images);
        assert_eq!(result.new_name, "image.PNG");
    }

    #[test]
    fn test_hidden_file_extension() {
        let result = classify(".md");
        assert_eq!(result.category, Category::Documents);
        assert_eq!(result.new_name, "document.md");
    }

    #[test]
    fn test_description_names_category() {
        assert_eq!(
            classify("a.png").description,
            "Rule-based categorization for Images"
        );
        assert_eq!(
            classify("a.sh").description,
            "Rule-based categorization for Others"
        );
    }

    #[test]
    fn test_generated_name_is_truncated() {
        let ext = "P".repeat(80);
        // Not a known extension, so use a custom rule to force a rename.
        let mut mapper = FileMapper::default();
        mapper.add_rule(&[ext.as_str()], Category::Code);

        let result = mapper.classify(
            Path::new(&format!("file.{}", ext)),
            &ContentSample::Placeholder(String::new()),
        );
        assert_eq!(result.category, Category::Code);
        let new_name = result.new_name.to_str().expect("generated names are UTF-8");
        assert_eq!(new_name.len(), MAX_NAME_LEN - 1);
        assert!(new_name.starts_with("code.PPP"));
    }

    #[test]
    fn test_first_rule_wins() {
        let mut mapper = FileMapper::default();
        mapper.add_rule(&["png", "svg"], Category::Media);
        assert_eq!(mapper.extension_to_category("png"), Some(Category::Images));
        assert_eq!(mapper.extension_to_category("SVG"), Some(Category::Media));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("document.txt"), Some(("document", "txt")));
        assert_eq!(split_extension("noext"), None);
        assert_eq!(split_extension("trailing."), Some(("trailing", "")));
    }
}
