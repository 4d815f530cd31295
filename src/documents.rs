//! Source documents selected for upload
//!
//! The evaluation service only ingests PDF, plain text and DOCX files. That
//! restriction is applied here, when files are selected, before any request is
//! built. The service may still reject content it cannot parse.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Document categories accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Docx,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Pdf,
        DocumentKind::PlainText,
        DocumentKind::Docx,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "txt",
            DocumentKind::Docx => "docx",
        }
    }

    /// Matches a MIME type, ignoring parameters such as `; charset=utf-8`
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime_type().eq_ignore_ascii_case(essence))
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::PlainText => "TXT",
            DocumentKind::Docx => "DOCX",
        };
        f.write_str(label)
    }
}

/// A document ready to be sent to `/upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    pub content: Bytes,
    pub kind: DocumentKind,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>, kind: DocumentKind) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            kind,
        }
    }

    /// Builds a document when the declared MIME type is accepted.
    ///
    /// An empty or generic MIME type (`application/octet-stream`) falls back to
    /// the file extension, which is what browsers and most pickers report for
    /// DOCX files they do not recognise.
    pub fn from_declared(
        name: impl Into<String>,
        content: impl Into<Bytes>,
        mime_type: &str,
    ) -> Option<Self> {
        let name = name.into();
        let kind = DocumentKind::from_mime_type(mime_type).or_else(|| {
            let generic = mime_type.trim().is_empty()
                || mime_type.eq_ignore_ascii_case("application/octet-stream");
            if generic {
                DocumentKind::from_file_name(&name)
            } else {
                None
            }
        })?;
        Some(Self::new(name, content, kind))
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn listing(&self) -> UploadedFile {
        UploadedFile {
            name: self.name.clone(),
            size_bytes: self.size_bytes(),
        }
    }
}

/// Listing view of a selected document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

impl fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} KB)", self.name, self.size_kib())
    }
}
