//! Password-protected batch archives
//!
//! Archives are ZIP files whose entries are compressed and then encrypted
//! with WinZip AES-256. Entry names are bare file names.

pub mod builder;
pub mod reader;

pub use builder::{ArchivedEntry, EncryptedArchive, EncryptedArchiveBuilder};
pub use reader::{extract_all, list_entries, read_entry, EntryInfo};
