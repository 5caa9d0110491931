//! Chunked output helpers

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Returns the path of chunk `index` for `target`
///
/// The index goes between the file stem and the extension.
///
/// # Example
///
/// ```
/// use kpvotes::output::chunk_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(chunk_path(Path::new("out/votes.csv"), 2), PathBuf::from("out/votes.2.csv"));
/// assert_eq!(chunk_path(Path::new("votes"), 0), PathBuf::from("votes.0"));
/// ```
pub fn chunk_path(target: &Path, index: usize) -> PathBuf {
    let mut name = OsString::new();
    name.push(target.file_stem().unwrap_or_default());
    name.push(format!(".{}", index));

    if let Some(ext) = target.extension() {
        name.push(".");
        name.push(ext);
    }

    target.with_file_name(name)
}

/// Splits items into groups of at most `size`
///
/// A zero size yields a single group. Empty input yields one empty group so
/// that a header-only file is still produced.
pub fn split_into_chunks<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if items.is_empty() || size == 0 {
        return vec![items.to_vec()];
    }

    items.chunks(size).map(<[T]>::to_vec).collect()
}
