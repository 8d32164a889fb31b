//! Content hashing for bookmark revisions
//!
//! A bookmark records a short SHA-256 fingerprint of the file it was placed
//! in, so callers can tell when the marked source has changed since.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Compute 8-character hex hash of content (first 32 bits of SHA-256).
///
/// # Arguments
/// * `content` - Byte slice to hash
///
/// # Returns
/// 8-character lowercase hex string (e.g., "a1b2c3d4")
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(&result[..4])
}

/// Compute hash of file contents.
pub fn file_hash(path: &Path) -> ApplicationResult<String> {
    let content = std::fs::read(path).map_err(|e| ApplicationError::OperationFailed {
        context: format!("read file for hashing: {}", path.display()),
        source: Box::new(e),
    })?;
    Ok(content_hash(&content))
}

/// True if `path` still hashes to `expected`.
///
/// Unreadable files count as changed.
pub fn is_unchanged(path: &Path, expected: &str) -> bool {
    file_hash(path).map(|h| h == expected).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_content_when_hashing_then_returns_8_hex_chars() {
        let hash = content_hash(b"fn main() {}");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn given_same_content_when_hashing_twice_then_identical() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn given_edited_file_when_checking_then_reports_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lib.rs");
        std::fs::write(&path, "one").unwrap();
        let before = file_hash(&path).unwrap();
        assert!(is_unchanged(&path, &before));

        std::fs::write(&path, "two").unwrap();
        assert!(!is_unchanged(&path, &before));
    }

    #[test]
    fn given_missing_file_when_hashing_then_operation_failed() {
        let err = file_hash(Path::new("/definitely/not/here.rs")).unwrap_err();
        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    }
}
