//! Template directory and document kind resolution.

mod output;

pub use output::{display_name, sanitize, OutputDir, OutputMetadata};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::docx::Template;
use crate::error::{Error, Result};
use crate::record::capitalize;

/// Template file extension.
pub const TEMPLATE_EXTENSION: &str = "docx";

/// Template used for memos.
pub const MEMO_TEMPLATE: &str = "sluzhebnaya_zapiska.docx";

/// Template used for letters and, until they get their own, every other kind.
pub const LETTER_TEMPLATE: &str = "pismo.docx";

/// Kind of document a generation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Internal memo (служебная записка)
    Memo,
    /// Letter (письмо)
    Letter,
    /// Order (приказ)
    Order,
    /// Application (заявление)
    Application,
    /// Meeting protocol (протокол)
    Protocol,
    /// Report memo (докладная записка)
    Report,
}

impl DocumentKind {
    /// All kinds.
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Memo,
        DocumentKind::Letter,
        DocumentKind::Order,
        DocumentKind::Application,
        DocumentKind::Protocol,
        DocumentKind::Report,
    ];

    /// Resolve a free-text document type.
    ///
    /// Underscores count as spaces and case is ignored, so `Служебная_записка`
    /// and `memo` both resolve.
    pub fn from_request(text: &str) -> Result<Self> {
        let normalized = normalize_request(text);
        let kind = match normalized.as_str() {
            "служебная записка" | "memo" => DocumentKind::Memo,
            "письмо" | "letter" => DocumentKind::Letter,
            "приказ" | "order" => DocumentKind::Order,
            "заявление" | "application" => DocumentKind::Application,
            "протокол" | "protocol" => DocumentKind::Protocol,
            "докладная записка" | "report" => DocumentKind::Report,
            _ => return Err(Error::UnknownDocumentType(text.to_string())),
        };
        log::debug!("document type {:?} resolved to {:?}", text, kind);
        Ok(kind)
    }

    /// Template identifier for this kind.
    pub fn template_id(self) -> &'static str {
        match self {
            DocumentKind::Memo => MEMO_TEMPLATE,
            _ => LETTER_TEMPLATE,
        }
    }

    /// Whether the kind has a template of its own rather than the letter
    /// fallback.
    pub fn has_dedicated_template(self) -> bool {
        matches!(self, DocumentKind::Memo | DocumentKind::Letter)
    }

    /// Display title, as written on the document.
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Memo => "Служебная записка",
            DocumentKind::Letter => "Письмо",
            DocumentKind::Order => "Приказ",
            DocumentKind::Application => "Заявление",
            DocumentKind::Protocol => "Протокол",
            DocumentKind::Report => "Докладная записка",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_request(s)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Canonical lower-case form of a requested document type.
pub fn normalize_request(text: &str) -> String {
    text.replace('_', " ").trim().to_lowercase()
}

/// Form of a requested document type stored in the record.
pub fn document_type_value(text: &str) -> String {
    capitalize(&normalize_request(text))
}

/// A directory of `.docx` templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    /// Open a template directory.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::TemplateNotFound(root));
        }
        Ok(Self { root })
    }

    /// Directory holding the templates.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Template file names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_template = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION));
            if !is_template {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Path of a template identifier; the extension may be omitted.
    ///
    /// Identifiers naming anything outside the store are rejected.
    pub fn path_of(&self, id: &str) -> Result<PathBuf> {
        let escapes = id.is_empty()
            || id.contains(['/', '\\'])
            || id == ".."
            || Path::new(id).is_absolute();
        if escapes {
            return Err(Error::TemplateNotFound(PathBuf::from(id)));
        }

        let file = if Path::new(id)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
        {
            id.to_string()
        } else {
            format!("{}.{}", id, TEMPLATE_EXTENSION)
        };
        Ok(self.root.join(file))
    }

    /// Load a template by identifier.
    pub fn load(&self, id: &str) -> Result<Template> {
        Template::open(self.path_of(id)?)
    }

    /// Load the template for a document kind.
    pub fn load_kind(&self, kind: DocumentKind) -> Result<Template> {
        if !kind.has_dedicated_template() {
            log::info!("no dedicated template for {}; using {}", kind, kind.template_id());
        }
        self.load(kind.template_id())
    }
}

/// Load a template given either a file path or a store identifier.
///
/// An existing file wins; otherwise `template` is looked up in `store`.
pub fn resolve_template(template: &str, store: Option<&TemplateStore>) -> Result<Template> {
    let path = Path::new(template);
    if path.is_file() {
        return Template::open(path);
    }
    match store {
        Some(store) => store.load(template),
        None => Err(Error::TemplateNotFound(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_request() {
        assert_eq!(
            DocumentKind::from_request("Служебная_записка").unwrap(),
            DocumentKind::Memo
        );
        assert_eq!(DocumentKind::from_request(" ПИСЬМО ").unwrap(), DocumentKind::Letter);
        assert_eq!(
            DocumentKind::from_request("докладная_записка").unwrap(),
            DocumentKind::Report
        );
        assert_eq!("memo".parse::<DocumentKind>().unwrap(), DocumentKind::Memo);
    }

    #[test]
    fn test_unknown_request() {
        let err = DocumentKind::from_request("invoice").unwrap_err();
        assert!(matches!(err, Error::UnknownDocumentType(ref t) if t == "invoice"));
    }

    #[test]
    fn test_template_fallback() {
        assert_eq!(DocumentKind::Memo.template_id(), MEMO_TEMPLATE);
        assert_eq!(DocumentKind::Letter.template_id(), LETTER_TEMPLATE);
        for kind in [
            DocumentKind::Order,
            DocumentKind::Application,
            DocumentKind::Protocol,
            DocumentKind::Report,
        ] {
            assert_eq!(kind.template_id(), LETTER_TEMPLATE);
            assert!(!kind.has_dedicated_template());
        }
    }

    #[test]
    fn test_document_type_value() {
        assert_eq!(document_type_value("СЛУЖЕБНАЯ_ЗАПИСКА"), "Служебная записка");
    }

    #[test]
    fn test_store_list_and_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pismo.docx"), b"x").unwrap();
        std::fs::write(dir.path().join("a.DOCX"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.docx")).unwrap();

        let store = TemplateStore::open(dir.path()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a.DOCX", "pismo.docx"]);
        assert_eq!(
            store.path_of("pismo").unwrap(),
            dir.path().join("pismo.docx")
        );
        assert!(store.path_of("../secret.docx").is_err());
    }

    #[test]
    fn test_store_load_missing() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load("missing"),
            Err(Error::TemplateNotFound(_))
        ));
        assert!(matches!(
            store.load_kind(DocumentKind::Order),
            Err(Error::TemplateNotFound(p)) if p.ends_with(LETTER_TEMPLATE)
        ));
    }

    #[test]
    fn test_open_missing_dir() {
        assert!(matches!(
            TemplateStore::open("/nonexistent/templates"),
            Err(Error::TemplateNotFound(_))
        ));
    }
}
