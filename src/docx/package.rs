//! OOXML package (zip container) access.
//!
//! Every entry is held in memory in archive order. Parts that are never
//! replaced are written back byte for byte.

use crate::error::{Error, Result};
use crate::model::StoryKind;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document part.
pub const MAIN_PART: &str = "word/document.xml";

/// A single archive entry.
#[derive(Debug, Clone)]
pub struct PartEntry {
    /// Entry name inside the archive, e.g. `word/document.xml`
    pub name: String,

    /// Raw entry bytes (decompressed)
    pub data: Vec<u8>,

    /// Compression used when the entry was read
    pub compression: CompressionMethod,
}

/// An in-memory `.docx` package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<PartEntry>,
}

impl Package {
    /// Read a package from archive bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            entries.push(PartEntry {
                name: file.name().to_string(),
                data: buf,
                compression: file.compression(),
            });
        }

        log::trace!("read package with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Entry names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Check whether the package has an entry.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Bytes of an entry.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Bytes of an entry, or [`Error::MissingPart`].
    pub fn require(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Replace an entry's bytes, or append a new deflated entry.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PartEntry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    /// Header and footer parts, in archive order.
    pub fn story_parts(&self) -> Vec<(String, StoryKind)> {
        self.part_names()
            .filter_map(|name| story_kind(name).map(|kind| (name.to_string(), kind)))
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the package has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the package to archive bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// Classify a part name as a header or footer story.
///
/// Matches `word/header<N>.xml` and `word/footer<N>.xml`, where `<N>` is
/// zero or more digits.
pub fn story_kind(name: &str) -> Option<StoryKind> {
    let file = name.strip_prefix("word/")?.strip_suffix(".xml")?;
    let (kind, rest) = if let Some(rest) = file.strip_prefix("header") {
        (StoryKind::Header, rest)
    } else if let Some(rest) = file.strip_prefix("footer") {
        (StoryKind::Footer, rest)
    } else {
        return None;
    };
    rest.chars().all(|c| c.is_ascii_digit()).then_some(kind)
}
