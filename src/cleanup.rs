//! Bottom-up removal of staging directories
//!
//! `sweep` is safe to call any number of times: a directory that is already
//! gone counts as clean. Individual failures do not stop the sweep; they are
//! collected and reported once everything removable has been removed.

use crate::error::{VidsealError, VidsealResult};
use crate::logger::LogLevel;
use crate::vidseal_log;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a sweep removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    /// The directory did not exist when the sweep started
    pub already_absent: bool,
}

/// Remove `dir`, everything below it, files first and directories last
pub fn sweep(dir: &Path) -> VidsealResult<CleanupReport> {
    let mut report = CleanupReport::default();

    match fs::symlink_metadata(dir) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            vidseal_log!(
                LogLevel::Debug,
                "cleanup",
                "Nothing to clean, {} is already gone",
                dir.display()
            );
            report.already_absent = true;
            return Ok(report);
        }
        Err(source) => {
            return Err(VidsealError::Cleanup {
                path: dir.to_path_buf(),
                remaining: 1,
                source,
            })
        }
    }

    let mut failures: Vec<(PathBuf, io::Error)> = Vec::new();
    remove_tree(dir, &mut report, &mut failures);

    let remaining = failures.len();
    match failures.into_iter().next() {
        None => {
            vidseal_log!(
                LogLevel::Info,
                "cleanup",
                "Removed {} ({} file(s), {} dir(s))",
                dir.display(),
                report.files_removed,
                report.dirs_removed
            );
            Ok(report)
        }
        Some((path, source)) => {
            vidseal_log!(
                LogLevel::Error,
                "cleanup",
                "Cleanup of {} incomplete: {} failure(s), first at {}: {}",
                dir.display(),
                remaining,
                path.display(),
                source
            );
            Err(VidsealError::Cleanup {
                path: dir.to_path_buf(),
                remaining,
                source,
            })
        }
    }
}

fn remove_tree(dir: &Path, report: &mut CleanupReport, failures: &mut Vec<(PathBuf, io::Error)>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            failures.push((dir.to_path_buf(), e));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failures.push((dir.to_path_buf(), e));
                continue;
            }
        };
        let path = entry.path();

        // file_type() does not follow symlinks, so links are unlinked, never descended
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            remove_tree(&path, report, failures);
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => report.files_removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => failures.push((path, e)),
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => report.dirs_removed += 1,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => failures.push((dir.to_path_buf(), e)),
    }
}
