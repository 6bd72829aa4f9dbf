use crate::error::{VidsealError, VidsealResult};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Entry metadata readable without the passphrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub encrypted: bool,
}

fn open<P: AsRef<Path>>(path: P) -> VidsealResult<ZipArchive<File>> {
    let file = File::open(path.as_ref())?;
    Ok(ZipArchive::new(file)?)
}

fn decrypt_error(name: &str, err: ZipError) -> VidsealError {
    match err {
        ZipError::InvalidPassword => {
            VidsealError::InvalidPassphrase(format!("Wrong passphrase for entry '{}'", name))
        }
        other => other.into(),
    }
}

/// List entries in archive order
pub fn list_entries<P: AsRef<Path>>(path: P) -> VidsealResult<Vec<EntryInfo>> {
    let mut archive = open(path)?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        entries.push(EntryInfo {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            encrypted: entry.encrypted(),
        });
    }

    Ok(entries)
}

/// Decrypt and return the content of one entry
pub fn read_entry<P: AsRef<Path>>(path: P, name: &str, passphrase: &str) -> VidsealResult<Vec<u8>> {
    let mut archive = open(path)?;
    let mut entry = archive
        .by_name_decrypt(name, passphrase.as_bytes())
        .map_err(|e| decrypt_error(name, e))?;

    // The header size is untrusted; let the buffer grow with the data
    let mut buffer = Vec::new();
    entry
        .read_to_end(&mut buffer)
        .map_err(|e| VidsealError::ArchiveRead(format!("Failed to read '{}': {}", name, e)))?;
    Ok(buffer)
}

/// Extract every entry into `dest_dir`, returning the written paths
pub fn extract_all<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    dest_dir: Q,
    passphrase: &str,
) -> VidsealResult<Vec<PathBuf>> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir)?;

    let mut archive = open(path)?;
    let mut written = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index_decrypt(i, passphrase.as_bytes())
            .map_err(|e| decrypt_error(&format!("#{}", i), e))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            VidsealError::ArchiveRead(format!("Unsafe entry name: {}", entry.name()))
        })?;
        let outpath = dest_dir.join(relative);
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| {
            VidsealError::ArchiveRead(format!("Failed to extract '{}': {}", entry.name(), e))
        })?;
        written.push(outpath);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::EncryptedArchiveBuilder;
    use crate::config::Compression;
    use tempfile::TempDir;

    fn sample_archive(dir: &Path) -> PathBuf {
        let output = dir.join("sample.zip");
        let mut builder =
            EncryptedArchiveBuilder::create(&output, "s3cret-pass", Compression::default())
                .unwrap();
        builder.add_bytes("seed42_a_cat.mp4", b"cat").unwrap();
        builder.add_bytes("seed7_a_dog.mp4", b"dog").unwrap();
        builder.finish().unwrap();
        output
    }

    #[test]
    fn test_list_entries_without_passphrase() {
        let temp_dir = TempDir::new().unwrap();
        let archive = sample_archive(temp_dir.path());

        let entries = list_entries(&archive).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["seed42_a_cat.mp4", "seed7_a_dog.mp4"]);
        assert!(entries.iter().all(|e| e.encrypted));
        assert_eq!(entries[0].size, 3);
    }

    #[test]
    fn test_read_entry_with_passphrase() {
        let temp_dir = TempDir::new().unwrap();
        let archive = sample_archive(temp_dir.path());

        assert_eq!(
            read_entry(&archive, "seed7_a_dog.mp4", "s3cret-pass").unwrap(),
            b"dog"
        );
    }

    #[test]
    fn test_wrong_passphrase_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let archive = sample_archive(temp_dir.path());

        assert!(read_entry(&archive, "seed42_a_cat.mp4", "not-the-pass").is_err());
    }

    #[test]
    fn test_unknown_entry() {
        let temp_dir = TempDir::new().unwrap();
        let archive = sample_archive(temp_dir.path());

        let result = read_entry(&archive, "seed1_missing.mp4", "s3cret-pass");
        assert!(matches!(result, Err(VidsealError::ArchiveRead(_))));
    }

    #[test]
    fn test_read_entry_ignores_header_size() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("large.zip");
        let payload = vec![7u8; 256 * 1024];

        let mut builder =
            EncryptedArchiveBuilder::create(&output, "s3cret-pass", Compression::default())
                .unwrap();
        builder.add_bytes("seed1_big.mp4", &payload).unwrap();
        builder.finish().unwrap();

        assert_eq!(read_entry(&output, "seed1_big.mp4", "s3cret-pass").unwrap(), payload);
    }

    #[test]
    fn test_extract_all() {
        let temp_dir = TempDir::new().unwrap();
        let archive = sample_archive(temp_dir.path());
        let dest = temp_dir.path().join("extracted");

        let written = extract_all(&archive, &dest, "s3cret-pass").unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(dest.join("seed42_a_cat.mp4")).unwrap(), b"cat");
        assert_eq!(fs::read(dest.join("seed7_a_dog.mp4")).unwrap(), b"dog");
    }
}
