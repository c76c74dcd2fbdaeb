//! File storage for supporting documents and parish assets.
//!
//! Uploads are opaque blobs to the rest of the system: the lifecycle
//! modules hand bytes over and get back a stored-file reference. The
//! store verifies the content against the declared type from magic
//! bytes (extensions and client-declared MIME can be wrong), enforces
//! the size cap, and writes atomically so a crashed upload never leaves
//! a half-written file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::models::SupportingFileType;
use crate::validation::MAX_FILE_BYTES;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty")]
    Empty,

    #[error("file exceeds the {max} byte limit")]
    TooLarge { max: u64 },

    #[error("content does not match declared type {declared}")]
    FormatMismatch { declared: &'static str },
}

/// Reference to a stored blob, returned to the caller after a
/// successful write.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one upload. Fails without touching the root directory when
    /// the content is empty, oversized, or does not carry the magic
    /// bytes of the declared type.
    pub fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        declared: SupportingFileType,
    ) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() as u64 > MAX_FILE_BYTES {
            return Err(StorageError::TooLarge { max: MAX_FILE_BYTES });
        }
        if !matches_declared_type(bytes, declared) {
            return Err(StorageError::FormatMismatch { declared: declared.as_str() });
        }

        std::fs::create_dir_all(&self.root)?;

        let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name));
        let path = self.root.join(&file_name);

        // Write to a temp file in the same directory, then persist: the
        // final path either holds the complete blob or does not exist.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;

        Ok(StoredFile {
            file_name,
            content_type: declared.mime_type().to_string(),
            size_bytes: bytes.len() as u64,
            path,
        })
    }
}

/// Magic-byte check per accepted type. Magic bytes don't lie —
/// extensions can be wrong.
fn matches_declared_type(bytes: &[u8], declared: SupportingFileType) -> bool {
    match declared {
        // PDF: %PDF
        SupportingFileType::Pdf => bytes.starts_with(b"%PDF"),
        // JPEG: FF D8 FF
        SupportingFileType::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        // PNG: 89 50 4E 47
        SupportingFileType::Png => bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        // Legacy Word: OLE2 compound file header
        SupportingFileType::Doc => {
            bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        // OOXML Word: ZIP local-file header
        SupportingFileType::Docx => bytes.starts_with(b"PK\x03\x04"),
    }
}

/// Sanitize a filename — strip path components, limit length
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "upload".to_string()
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF_BYTES: &[u8] = b"%PDF-1.4 minimal";
    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn store() -> (FileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (FileStore::new(dir.path()), dir)
    }

    #[test]
    fn stores_pdf_and_returns_reference() {
        let (store, _dir) = store();
        let stored = store
            .store(PDF_BYTES, "certificate.pdf", SupportingFileType::Pdf)
            .unwrap();
        assert!(stored.path.exists());
        assert_eq!(stored.size_bytes, PDF_BYTES.len() as u64);
        assert_eq!(stored.content_type, "application/pdf");
        assert_eq!(std::fs::read(&stored.path).unwrap(), PDF_BYTES);
    }

    #[test]
    fn mismatched_magic_bytes_rejected() {
        let (store, _dir) = store();
        // PNG content declared as PDF
        let err = store
            .store(PNG_BYTES, "sneaky.pdf", SupportingFileType::Pdf)
            .unwrap_err();
        assert!(matches!(err, StorageError::FormatMismatch { declared: "pdf" }));
    }

    #[test]
    fn empty_upload_rejected() {
        let (store, _dir) = store();
        let err = store.store(b"", "empty.pdf", SupportingFileType::Pdf).unwrap_err();
        assert!(matches!(err, StorageError::Empty));
    }

    #[test]
    fn oversized_upload_rejected() {
        let (store, _dir) = store();
        let big = vec![0x89, 0x50, 0x4E, 0x47]
            .into_iter()
            .chain(std::iter::repeat(0u8))
            .take(MAX_FILE_BYTES as usize + 1)
            .collect::<Vec<_>>();
        let err = store.store(&big, "huge.png", SupportingFileType::Png).unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }

    #[test]
    fn failed_store_leaves_no_file() {
        let (store, dir) = store();
        let _ = store.store(PNG_BYTES, "sneaky.pdf", SupportingFileType::Pdf);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty(), "rejected upload must not leave files");
    }

    #[test]
    fn docx_zip_header_accepted() {
        let (store, _dir) = store();
        let docx = b"PK\x03\x04rest-of-zip";
        assert!(store.store(docx, "form.docx", SupportingFileType::Docx).is_ok());
    }

    #[test]
    fn sanitize_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("normal_file.pdf"), "normal_file.pdf");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("file\0name.pdf"), "filename.pdf");
    }

    #[test]
    fn stored_names_are_unique_per_upload() {
        let (store, _dir) = store();
        let a = store.store(PDF_BYTES, "same.pdf", SupportingFileType::Pdf).unwrap();
        let b = store.store(PDF_BYTES, "same.pdf", SupportingFileType::Pdf).unwrap();
        assert_ne!(a.file_name, b.file_name);
    }
}
