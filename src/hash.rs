//! Content hashing for incremental-rescan skip decisions.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Read buffer size for streamed hashing.
const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 digest of a file as a lowercase hex string.
///
/// Reads the file in fixed-size chunks so arbitrarily large documents never
/// get loaded whole into memory. The digest depends on file bytes alone.
///
/// On error the caller must treat the file as un-hashable: excluded from
/// hash-based skip decisions and from reports, never fatal to the scan.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_hash_deterministic() {
        let a = write_temp(b"hello world");
        let b = write_temp(b"hello world");
        assert_eq!(hash_file(a.path()).unwrap(), hash_file(b.path()).unwrap());
    }

    #[test]
    fn test_hash_is_lowercase_hex_sha256() {
        let f = write_temp(b"hello world");
        let digest = hash_file(f.path()).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // Known SHA-256 of "hello world"
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        let a = write_temp(b"hello world");
        let b = write_temp(b"hello worle");
        assert_ne!(hash_file(a.path()).unwrap(), hash_file(b.path()).unwrap());
    }

    #[test]
    fn test_large_file_spans_chunks() {
        let data = vec![0xabu8; CHUNK_SIZE * 3 + 17];
        let f = write_temp(&data);
        let streamed = hash_file(f.path()).unwrap();
        let whole = hex::encode(Sha256::digest(&data));
        assert_eq!(streamed, whole);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(hash_file(Path::new("/nonexistent/piiscan-test-file")).is_err());
    }
}
