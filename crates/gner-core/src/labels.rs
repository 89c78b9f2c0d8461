//! Label vocabulary and BIO tag handling.

use std::path::Path;

use tracing::debug;

use crate::error::LabelError;

/// The canonical outside label. Nodes carrying it belong to no entity.
pub const OUTSIDE_LABEL: &str = "O";

/// BIO interpretation of a single label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'a> {
    /// The node is outside any entity span.
    Outside,
    /// The node begins a span of the given entity type.
    Begin(&'a str),
    /// The node continues a span of the given entity type.
    Inside(&'a str),
}

/// Ordered label vocabulary, index = class id.
///
/// Loaded once from a text file with one label per line and read-only
/// afterwards. The line count must equal the configured class count.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Load the vocabulary from a file, one label per line.
    ///
    /// Fails if the file cannot be read, if any line is empty, or if the
    /// number of lines differs from `classes`.
    pub fn from_file(path: &Path, classes: usize) -> Result<Self, LabelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LabelError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut labels = Vec::with_capacity(classes);
        for (idx, line) in content.lines().enumerate() {
            let label = line.trim();
            if label.is_empty() {
                return Err(LabelError::Empty { line: idx + 1 });
            }
            labels.push(label.to_string());
        }

        if labels.len() != classes {
            return Err(LabelError::CountMismatch {
                expected: classes,
                actual: labels.len(),
            });
        }

        debug!("Loaded {} labels from {}", labels.len(), path.display());
        Ok(Self { labels })
    }

    /// Build a vocabulary from owned label strings.
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Label string for a class id.
    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.labels.get(class_id as usize).map(String::as_str)
    }

    /// Number of labels in the vocabulary.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// BIO tag for a class id.
    ///
    /// `"O"` is outside; `B-`/`I-` prefixes carry the entity type. A label
    /// with neither prefix is treated as beginning a one-node span of its
    /// own type, so vocabulary drift surfaces in scoring instead of
    /// disappearing. Ids outside the vocabulary decode as outside; the
    /// pipeline never produces one.
    pub fn tag(&self, class_id: u32) -> Tag<'_> {
        let Some(label) = self.get(class_id) else {
            return Tag::Outside;
        };

        if label == OUTSIDE_LABEL {
            Tag::Outside
        } else if let Some(ty) = label.strip_prefix("B-") {
            Tag::Begin(ty)
        } else if let Some(ty) = label.strip_prefix("I-") {
            Tag::Inside(ty)
        } else {
            Tag::Begin(label)
        }
    }
}
