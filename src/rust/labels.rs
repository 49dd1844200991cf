use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::classifier::ClassifierError;

/// Ordered class names, indexed the way the model emits its scores.
///
/// The labels file holds one `<index>:<label>` entry per line. Entries are
/// indexed by their position in the file; the number left of the colon is only
/// documentation and a disagreement with the position is logged, not enforced.
/// Labels are kept byte-for-byte, including any further colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Reads and parses a UTF-8 labels file.
    ///
    /// # Errors
    /// - `Io` if the file cannot be read
    /// - `Parse` if a line has no `:` separator
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ClassifierError::Io(format!("Failed to read labels file {:?}: {}", path, e))
        })?;
        let table = Self::parse(&text)?;
        debug!("Loaded {} labels from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parses labels file content.
    pub fn parse(text: &str) -> Result<Self, ClassifierError> {
        let mut labels = Vec::new();
        for (position, line) in text.lines().enumerate() {
            let (index, label) = line.split_once(':').ok_or_else(|| ClassifierError::Parse {
                line: position + 1,
                message: format!("missing ':' separator in {:?}", line),
            })?;

            match index.trim().parse::<usize>() {
                Ok(index) if index == position => {}
                Ok(index) => warn!(
                    "Labels line {} declares index {} but is used as class {}",
                    position + 1,
                    index,
                    position
                ),
                Err(_) => warn!(
                    "Labels line {} has a non-numeric index {:?}",
                    position + 1,
                    index
                ),
            }

            labels.push(label.to_string());
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl From<Vec<String>> for LabelTable {
    fn from(labels: Vec<String>) -> Self {
        Self { labels }
    }
}
