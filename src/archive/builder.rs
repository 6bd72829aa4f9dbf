use crate::config::Compression;
use crate::error::{VidsealError, VidsealResult};
use crate::hash::HashInfo;
use crate::logger::LogLevel;
use crate::passphrase::validate_passphrase;
use crate::vidseal_log;
use crate::writer::StagedFile;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{AesMode, ZipWriter};

/// One entry committed to the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedEntry {
    pub name: String,
    pub size: u64,
    /// Digest of the plaintext entry content
    pub hash: HashInfo,
}

/// A finished archive at its final path
#[derive(Debug, Clone, Serialize)]
pub struct EncryptedArchive {
    pub path: PathBuf,
    pub size: u64,
    pub entries: Vec<ArchivedEntry>,
}

/// Writes AES-256 encrypted, compressed ZIP archives
///
/// Entries go into a hidden temporary file next to the output path. Only
/// `finish()` moves it to the output path, so an aborted build never leaves a
/// file there. Dropping the builder discards the temporary file.
pub struct EncryptedArchiveBuilder {
    output_path: PathBuf,
    passphrase: String,
    compression: Compression,
    zip: ZipWriter<NamedTempFile>,
    entries: Vec<ArchivedEntry>,
    names: HashSet<String>,
}

impl EncryptedArchiveBuilder {
    pub fn create(
        output_path: impl Into<PathBuf>,
        passphrase: &str,
        compression: Compression,
    ) -> VidsealResult<Self> {
        validate_passphrase(passphrase)?;
        compression.validate()?;

        let output_path = output_path.into();
        let parent = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(".vidseal-")
            .suffix(".zip.partial")
            .tempfile_in(&parent)
            .map_err(|e| VidsealError::archive_write(output_path.display().to_string(), e))?;

        vidseal_log!(
            LogLevel::Debug,
            "archive",
            "Building archive {} in {}",
            output_path.display(),
            temp.path().display()
        );

        Ok(Self {
            output_path,
            passphrase: passphrase.to_string(),
            compression,
            zip: ZipWriter::new(temp),
            entries: Vec::new(),
            names: HashSet::new(),
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn entries(&self) -> &[ArchivedEntry] {
        &self.entries
    }

    /// Write `data` as an encrypted entry named `name`
    ///
    /// `name` must be a bare file name; directory structure is never stored.
    pub fn add_bytes(&mut self, name: &str, data: &[u8]) -> VidsealResult<ArchivedEntry> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(VidsealError::archive_write(
                name,
                "entry name must be a bare file name",
            ));
        }
        if !self.names.insert(name.to_string()) {
            return Err(VidsealError::DuplicateEntry(name.to_string()));
        }

        let size = data.len() as u64;
        let options: FileOptions<()> = FileOptions::default()
            .compression_method(self.compression.method())
            .compression_level(Some(self.compression.level()))
            .large_file(size >= u64::from(u32::MAX))
            .unix_permissions(0o644)
            .with_aes_encryption(AesMode::Aes256, &self.passphrase);

        self.zip
            .start_file(name, options)
            .map_err(|e| VidsealError::archive_write(name, e))?;
        self.zip
            .write_all(data)
            .map_err(|e| VidsealError::archive_write(name, e))?;

        let entry = ArchivedEntry {
            name: name.to_string(),
            size,
            hash: HashInfo::from_bytes(data),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Archive a staged file by content, then delete the staged copy
    ///
    /// A failed deletion is logged and left to the staging sweep.
    pub fn add_staged_file(&mut self, staged: &StagedFile) -> VidsealResult<ArchivedEntry> {
        let data = fs::read(&staged.path)
            .map_err(|e| VidsealError::archive_write(staged.file_name.clone(), e))?;
        let entry = self.add_bytes(&staged.file_name, &data)?;
        drop(data);

        match fs::remove_file(&staged.path) {
            Ok(()) => vidseal_log!(
                LogLevel::Debug,
                "archive",
                "Archived and removed staged file {}",
                staged.file_name
            ),
            Err(e) => vidseal_log!(
                LogLevel::Warn,
                "archive",
                "Archived {} but could not remove staged copy: {}",
                staged.file_name,
                e
            ),
        }

        Ok(entry)
    }

    /// Write the central directory and move the archive into place
    ///
    /// An existing file at the output path is never replaced.
    pub fn finish(self) -> VidsealResult<EncryptedArchive> {
        let target = self.output_path.display().to_string();

        let temp = self
            .zip
            .finish()
            .map_err(|e| VidsealError::archive_write(target.clone(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| VidsealError::archive_write(target.clone(), e))?;
        temp.persist_noclobber(&self.output_path)
            .map_err(|e| VidsealError::archive_write(target.clone(), e.error))?;

        let size = fs::metadata(&self.output_path)?.len();

        vidseal_log!(
            LogLevel::Info,
            "archive",
            "Encrypted archive written: {} ({} entries, {} bytes)",
            target,
            self.entries.len(),
            size
        );

        Ok(EncryptedArchive {
            path: self.output_path,
            size,
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reader;
    use tempfile::TempDir;

    const PASSPHRASE: &str = "correct horse";

    fn staged_file(dir: &Path, name: &str, content: &[u8]) -> StagedFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        StagedFile {
            path,
            file_name: name.to_string(),
            size: content.len() as u64,
            seed: 1,
            label: "label".to_string(),
        }
    }

    #[test]
    fn test_build_archive_with_entries() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.zip");

        let mut builder =
            EncryptedArchiveBuilder::create(&output, PASSPHRASE, Compression::default()).unwrap();
        builder.add_bytes("seed1_a.mp4", b"first video").unwrap();
        builder.add_bytes("seed2_b.mp4", b"second video").unwrap();
        assert!(!output.exists());

        let archive = builder.finish().unwrap();
        assert_eq!(archive.path, output);
        assert_eq!(archive.entries.len(), 2);
        assert!(archive.size > 0);

        let content = reader::read_entry(&output, "seed2_b.mp4", PASSPHRASE).unwrap();
        assert_eq!(content, b"second video");
    }

    #[test]
    fn test_staged_file_removed_after_commit() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("staging");
        fs::create_dir(&staging).unwrap();
        let staged = staged_file(&staging, "seed42_a_cat.mp4", b"cat video");

        let mut builder = EncryptedArchiveBuilder::create(
            temp_dir.path().join("out.zip"),
            PASSPHRASE,
            Compression::Deflated { level: 9 },
        )
        .unwrap();
        let entry = builder.add_staged_file(&staged).unwrap();

        assert_eq!(entry.name, "seed42_a_cat.mp4");
        assert_eq!(entry.size, 9);
        assert!(entry.hash.matches(b"cat video"));
        assert!(!staged.path.exists());
    }

    #[test]
    fn test_missing_staged_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let staged = StagedFile {
            path: temp_dir.path().join("gone.mp4"),
            file_name: "gone.mp4".to_string(),
            size: 0,
            seed: 3,
            label: "gone".to_string(),
        };

        let mut builder = EncryptedArchiveBuilder::create(
            temp_dir.path().join("out.zip"),
            PASSPHRASE,
            Compression::default(),
        )
        .unwrap();
        let result = builder.add_staged_file(&staged);

        assert!(matches!(
            result,
            Err(VidsealError::ArchiveWrite { ref entry, .. }) if entry == "gone.mp4"
        ));
    }

    #[test]
    fn test_dropped_builder_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.zip");

        {
            let mut builder =
                EncryptedArchiveBuilder::create(&output, PASSPHRASE, Compression::default())
                    .unwrap();
            builder.add_bytes("seed1_a.mp4", b"data").unwrap();
        }

        assert!(!output.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_entry_names_must_be_bare() {
        let temp_dir = TempDir::new().unwrap();
        let mut builder = EncryptedArchiveBuilder::create(
            temp_dir.path().join("out.zip"),
            PASSPHRASE,
            Compression::default(),
        )
        .unwrap();

        assert!(builder.add_bytes("staging/seed1.mp4", b"x").is_err());
        assert!(builder.add_bytes("..", b"x").is_err());
        assert!(builder.entries().is_empty());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut builder = EncryptedArchiveBuilder::create(
            temp_dir.path().join("out.zip"),
            PASSPHRASE,
            Compression::default(),
        )
        .unwrap();

        builder.add_bytes("seed1_a.mp4", b"x").unwrap();
        let result = builder.add_bytes("seed1_a.mp4", b"y");
        assert!(matches!(result, Err(VidsealError::DuplicateEntry(_))));
    }

    #[test]
    fn test_existing_output_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.zip");
        fs::write(&output, b"previous run").unwrap();

        let builder =
            EncryptedArchiveBuilder::create(&output, PASSPHRASE, Compression::default()).unwrap();
        let result = builder.finish();

        assert!(matches!(result, Err(VidsealError::ArchiveWrite { .. })));
        assert_eq!(fs::read(&output).unwrap(), b"previous run");
    }

    #[test]
    fn test_weak_passphrase_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = EncryptedArchiveBuilder::create(
            temp_dir.path().join("out.zip"),
            "",
            Compression::default(),
        );
        assert!(matches!(result, Err(VidsealError::InvalidPassphrase(_))));
    }
}
