//! Local file and path helpers
//!
//! Name helpers work on `/`-separated strings; directory helpers touch the
//! filesystem and are blocking, so schedule them with
//! [`ScopedBackgroundRunner::launch_blocking`](crate::runner::ScopedBackgroundRunner::launch_blocking)
//! from async code.

use crate::error::{LifescopeError, Result};
use crate::format::format_double_x_bit;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names starting with this are hidden from directory listings
pub const HIDDEN_PREFIX: char = '.';

const SIZE_UNITS: [&str; 3] = ["KB", "MB", "GB"];
const SIZE_STEP: f64 = 1024.0;

/// Final `/`-separated component of `path`
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the final component including the dot, or `""`
///
/// `"photo.png"` gives `".png"`; a dot-file such as `".profile"` is all
/// extension.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    name.rfind('.').map_or("", |dot| &name[dot..])
}

/// Whether `url` refers to something other than an HTTP(S) resource
pub fn is_local(url: &str) -> bool {
    !url.starts_with("http://") && !url.starts_with("https://")
}

/// Directory part of `path` as an absolute path; directories map to themselves
pub fn path_without_filename(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let absolute = std::path::absolute(path)?;
    Ok(absolute
        .parent()
        .map_or_else(|| absolute.clone(), Path::to_path_buf))
}

/// Human-readable size with at most one fractional digit, e.g. `"1.5 MB"`
///
/// Sizes are never shown below KB; anything past the GB range stays in GB.
#[allow(clippy::cast_precision_loss)]
pub fn readable_file_size(size: u64) -> String {
    let mut value = size as f64 / SIZE_STEP;
    let mut unit = 0;
    while unit + 1 < SIZE_UNITS.len() && (value * 10.0).round() / 10.0 >= SIZE_STEP {
        value /= SIZE_STEP;
        unit += 1;
    }

    let rendered = format_double_x_bit(value, 1);
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{} {}", rendered, SIZE_UNITS[unit])
}

/// Split a file name into stem and extension (with dot)
///
/// A leading dot does not start an extension here.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Create a new empty file named `name` in `directory`
///
/// When `name` is taken, `stem(1).ext`, `stem(2).ext`, ... are tried in
/// order. Creation is exclusive, so concurrent callers never share a file.
pub fn generate_file_name(directory: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains('/') {
        return Err(LifescopeError::validation(
            "name",
            "must be a non-empty single path component",
        ));
    }

    let (stem, ext) = split_name(name);
    let mut index: u32 = 0;
    loop {
        let candidate = if index == 0 {
            name.to_string()
        } else {
            format!("{}({}){}", stem, index, ext)
        };
        let path = directory.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!("Generated file {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                index = index.checked_add(1).ok_or_else(|| {
                    LifescopeError::io(format!("no free name for {} in {}", name, directory.display()))
                })?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Non-hidden regular files in `dir`, sorted case-insensitively by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_entries(dir, |p| p.is_file())
}

/// Non-hidden directories in `dir`, sorted case-insensitively by name
pub fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    list_entries(dir, |p| p.is_dir())
}

fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(HIDDEN_PREFIX) {
            continue;
        }
        let path = entry.path();
        if keep(&path) {
            entries.push(path);
        }
    }
    entries.sort_by_cached_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_helpers() {
        assert_eq!(file_name("/sdcard/DCIM/photo.png"), "photo.png");
        assert_eq!(file_name("photo.png"), "photo.png");
        assert_eq!(extension("/sdcard/DCIM/photo.png"), ".png");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("some.dir/README"), "");
        assert_eq!(extension(".profile"), ".profile");
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("/data/file.txt"));
        assert!(is_local("file:///data/file.txt"));
        assert!(!is_local("http://example.com/a"));
        assert!(!is_local("https://example.com/a"));
    }

    #[test]
    fn test_readable_file_size() {
        assert_eq!(readable_file_size(0), "0 KB");
        assert_eq!(readable_file_size(512), "0.5 KB");
        assert_eq!(readable_file_size(1023), "1 KB");
        assert_eq!(readable_file_size(1024), "1 KB");
        assert_eq!(readable_file_size(1536), "1.5 KB");
        assert_eq!(readable_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(readable_file_size(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
        assert_eq!(readable_file_size(1024 * 1024 - 1), "1 MB");
        assert_eq!(readable_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("a.txt"), ("a", ".txt"));
        assert_eq!(split_name(".env"), (".env", ""));
        assert_eq!(split_name("Makefile"), ("Makefile", ""));
    }
}
