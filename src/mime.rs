//! Content-type classification from magic bytes, plus hidden-file detection.
//!
//! Classification reads file content (never the filename extension) and
//! resolves each file to a closed [`DocumentKind`] exactly once, so the
//! extraction engine dispatches on an enum instead of re-matching MIME
//! prefixes at every call site.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Sentinel type for zero-length files. Always unsupported.
pub const EMPTY_FILE_MIME: &str = "inode/x-empty";

/// Bytes sniffed from the head of a file for magic-byte detection.
const SNIFF_LEN: usize = 8192;

/// Closed set of content categories the extraction engine knows how to
/// handle. Resolved once by [`classify`] + [`DocumentKind::from_mime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Plain (or otherwise unrecognized but textual) content.
    Text,
    Pdf,
    /// OOXML word-processing document.
    Docx,
    /// Legacy binary `.doc`, extracted via an external converter.
    LegacyDoc,
    /// JPEG, PNG, or TIFF raster image.
    Image,
}

impl DocumentKind {
    /// Map a sniffed MIME label to a supported category.
    ///
    /// Returns `None` for anything outside the allow-list. The empty-file
    /// sentinel is rejected up front, before any prefix check.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime == EMPTY_FILE_MIME {
            return None;
        }
        if mime.starts_with("text/") {
            return Some(Self::Text);
        }
        if mime == "application/pdf" {
            return Some(Self::Pdf);
        }
        if mime.starts_with("application/vnd.openxmlformats-officedocument") {
            return Some(Self::Docx);
        }
        if mime == "application/msword" {
            return Some(Self::LegacyDoc);
        }
        match mime {
            "image/jpeg" | "image/png" | "image/tiff" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::LegacyDoc => "doc",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect a file's MIME type from its leading bytes.
///
/// Unreadable files classify as `application/octet-stream` rather than
/// erroring; the walker filters them out as unsupported.
pub fn classify(path: &Path) -> String {
    let mut buffer = [0u8; SNIFF_LEN];
    let bytes_read = match File::open(path).and_then(|mut f| f.read(&mut buffer)) {
        Ok(n) => n,
        Err(_) => return "application/octet-stream".to_string(),
    };

    if bytes_read == 0 {
        return EMPTY_FILE_MIME.to_string();
    }

    let head = &buffer[..bytes_read];
    if let Some(detected) = infer::get(head) {
        return detected.mime_type().to_string();
    }

    // No magic matched. Content that still looks like text gets the plain
    // text label so prose files without signatures stay in scope.
    if looks_textual(head) {
        "text/plain".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// Heuristic text check: no NUL bytes and at most 10% control characters
/// outside the usual whitespace set.
fn looks_textual(bytes: &[u8]) -> bool {
    if bytes.contains(&0) {
        return false;
    }
    let control = bytes
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c))
        .count();
    control * 10 <= bytes.len()
}

/// Whether a directory entry counts as hidden.
///
/// Dot-prefixed names are hidden everywhere; on Windows the filesystem
/// hidden-attribute bit also counts. Attribute lookup failure defaults to
/// "not hidden".
pub fn is_hidden(name: &str, path: &Path) -> bool {
    if name.starts_with('.') {
        return true;
    }
    has_hidden_attribute(path)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    match std::fs::metadata(path) {
        Ok(meta) => meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0,
        Err(_) => false,
    }
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_pdf_magic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n%rest of document").unwrap();
        assert_eq!(classify(f.path()), "application/pdf");
    }

    #[test]
    fn test_classify_png_magic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0])
            .unwrap();
        assert_eq!(classify(f.path()), "image/png");
    }

    #[test]
    fn test_classify_empty_file_sentinel() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(classify(f.path()), EMPTY_FILE_MIME);
        assert_eq!(DocumentKind::from_mime(EMPTY_FILE_MIME), None);
    }

    #[test]
    fn test_classify_prose_as_text() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"contact me at a@b.com\nnothing binary here\n")
            .unwrap();
        assert_eq!(classify(f.path()), "text/plain");
    }

    #[test]
    fn test_classify_binary_garbage() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x00, 0x01, 0x02, 0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(classify(f.path()), "application/octet-stream");
    }

    #[test]
    fn test_kind_allow_list() {
        assert_eq!(DocumentKind::from_mime("text/plain"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_mime("application/msword"),
            Some(DocumentKind::LegacyDoc)
        );
        assert_eq!(DocumentKind::from_mime("image/tiff"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("image/gif"), None);
        assert_eq!(DocumentKind::from_mime("application/zip"), None);
    }

    #[test]
    fn test_dotfile_is_hidden() {
        assert!(is_hidden(".secrets.txt", Path::new("/tmp/.secrets.txt")));
        assert!(!is_hidden("visible.txt", Path::new("/tmp/visible.txt")));
    }
}
