//! Generated document bookkeeping.
//!
//! Each rendered document is stored as `<stem>.docx` next to a `<stem>.json`
//! metadata file carrying the human-readable download name.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata stored beside a generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    /// Stored file name, e.g. `2f1c….docx`
    pub doc_filename: String,

    /// Suggested download name
    pub display_name: String,

    /// Capitalized document type
    pub document_type: String,

    /// Local creation time
    pub created_at: NaiveDateTime,
}

impl OutputMetadata {
    /// Create metadata for a stored document.
    pub fn new(
        doc_filename: impl Into<String>,
        display_name: impl Into<String>,
        document_type: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            doc_filename: doc_filename.into(),
            display_name: display_name.into(),
            document_type: document_type.into(),
            created_at,
        }
    }
}

/// Keep alphanumerics, spaces and underscores; trim trailing space and
/// turn the remaining spaces into underscores.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
}

/// Download name: timestamp, requested type and sanitized parties/subject
/// joined with `_`, empty parts skipped.
pub fn display_name(
    created_at: NaiveDateTime,
    document_type: &str,
    sender: Option<&str>,
    recipient: Option<&str>,
    subject: Option<&str>,
) -> String {
    let timestamp = created_at.format("%Y%m%d_%H%M%S").to_string();
    let mut parts = vec![timestamp, document_type.to_string()];
    parts.extend([sender, recipient, subject].into_iter().flatten().map(sanitize));
    parts.retain(|p| !p.is_empty());
    format!("{}.docx", parts.join("_"))
}

/// Directory of generated documents.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Open an output directory, creating it when needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a rendered document and its metadata under `stem`.
    ///
    /// Returns the document path.
    pub fn save(&self, stem: &str, content: &[u8], metadata: &OutputMetadata) -> Result<PathBuf> {
        let doc_path = self.root.join(format!("{}.docx", stem));
        std::fs::write(&doc_path, content)?;

        let meta_path = self.root.join(format!("{}.json", stem));
        let json = serde_json::to_string_pretty(metadata)?;
        std::fs::write(&meta_path, json)?;

        log::info!("saved {} as {:?}", doc_path.display(), metadata.display_name);
        Ok(doc_path)
    }

    /// Keep the raw record text that produced a document, as `<stem>.yaml`.
    pub fn save_source(&self, stem: &str, source: &str) -> Result<PathBuf> {
        let path = self.root.join(format!("{}.yaml", stem));
        std::fs::write(&path, source)?;
        Ok(path)
    }

    /// Metadata of every stored document, newest first.
    ///
    /// Unreadable or malformed metadata files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<OutputMetadata>> {
        let mut items = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_metadata(&path) {
                Ok(meta) => items.push(meta),
                Err(e) => log::warn!("skipping metadata file {}: {}", path.display(), e),
            }
        }
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.doc_filename.cmp(&b.doc_filename))
        });
        Ok(items)
    }

    /// Path of a stored document, if it exists.
    ///
    /// Names with path separators are rejected.
    pub fn document_path(&self, doc_filename: &str) -> Option<PathBuf> {
        if doc_filename.contains(['/', '\\']) || doc_filename == ".." {
            return None;
        }
        let path = self.root.join(doc_filename);
        path.is_file().then_some(path)
    }

    /// Download name of a stored document; falls back to the file name when
    /// its metadata is missing or unreadable.
    pub fn download_name(&self, doc_filename: &str) -> String {
        let stem = doc_filename.strip_suffix(".docx").unwrap_or(doc_filename);
        read_metadata(&self.root.join(format!("{}.json", stem)))
            .map(|meta| meta.display_name)
            .unwrap_or_else(|_| doc_filename.to_string())
    }
}

fn read_metadata(path: &Path) -> Result<OutputMetadata> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
