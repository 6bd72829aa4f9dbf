//! File naming for staged files, archive entries and the archive itself

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Sortable local timestamp used in archive filenames
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Longest file name, in bytes, accepted by common filesystems
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Characters replaced in labels besides whitespace and control characters
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Truncate a label to `max_chars` characters, then replace unsafe characters with `_`
pub fn sanitize_label(label: &str, max_chars: usize) -> String {
    label
        .chars()
        .take(max_chars)
        .map(|c| {
            if c.is_whitespace() || c.is_control() || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `seed{seed}_{sanitized_label}.{ext}`
///
/// The label is also cut on a character boundary so the whole name stays
/// within `MAX_FILE_NAME_BYTES`.
pub fn entry_file_name(seed: u64, label: &str, max_chars: usize, extension: &str) -> String {
    let prefix = format!("seed{}_", seed);
    let suffix = format!(".{}", extension);
    let budget = MAX_FILE_NAME_BYTES.saturating_sub(prefix.len() + suffix.len());

    let sanitized = sanitize_label(label, max_chars);
    let label = truncate_to_bytes(&sanitized, budget);
    format!("{}{}{}", prefix, label, suffix)
}

/// Longest prefix of `s` that is at most `max_bytes` long and ends on a char boundary
fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// `{timestamp}_{suite_name}_videos.zip`
pub fn archive_file_name<Tz: TimeZone>(timestamp: &DateTime<Tz>, suite_name: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_videos.zip",
        timestamp.format(TIMESTAMP_FORMAT),
        suite_name
    )
}

pub fn archive_path<Tz: TimeZone>(
    output_dir: &Path,
    timestamp: &DateTime<Tz>,
    suite_name: &str,
) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    output_dir.join(archive_file_name(timestamp, suite_name))
}
