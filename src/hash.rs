use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Content digest recorded for every archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    pub algorithm: String,
    pub value: String,
}

impl HashInfo {
    /// Calculate SHA-256 hash of a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(Self::from_digest(hasher))
    }

    /// Calculate SHA-256 hash of data in memory
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self::from_digest(hasher)
    }

    fn from_digest(hasher: Sha256) -> Self {
        Self {
            algorithm: "SHA-256".to_string(),
            value: hex::encode(hasher.finalize()),
        }
    }

    /// Check in-memory data against this digest
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::from_bytes(data).value == self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_hash_from_bytes() {
        let hash = HashInfo::from_bytes(b"test data");
        assert_eq!(hash.algorithm, "SHA-256");
        assert_eq!(hash.value.len(), 64);
    }

    #[test]
    fn test_hash_file_matches_bytes() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(b"frame data").unwrap();
        temp_file.flush().unwrap();

        let from_file = HashInfo::from_file(temp_file.path()).unwrap();
        assert_eq!(from_file, HashInfo::from_bytes(b"frame data"));
    }

    #[test]
    fn test_hash_empty() {
        let expected_empty_hash =
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(HashInfo::from_bytes(b"").value, expected_empty_hash);
    }

    #[test]
    fn test_matches() {
        let hash = HashInfo::from_bytes(b"original");
        assert!(hash.matches(b"original"));
        assert!(!hash.matches(b"modified"));
    }

    #[test]
    fn test_hash_from_file_nonexistent() {
        assert!(HashInfo::from_file("/nonexistent/file.bin").is_err());
    }
}
