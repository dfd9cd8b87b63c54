// ABOUTME: Git integration — .gitignore entry and the clean/smudge filter installation.
// ABOUTME: Every file edit here is an idempotent append guarded by a presence check.

pub mod filter;
pub mod ignore;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{IoContext, Result, SyncError};

pub use filter::{FILTER_NAME, FilterReport, install_filter};
pub use ignore::add_ignore_entry;

/// Read a text file, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(SyncError::io("read", path, e)),
    }
}

/// Append `block` to `existing` and write the result to `path`, inserting a
/// newline first when the existing content does not end with one.
pub(crate) fn append_block(path: &Path, existing: &str, block: &str) -> Result<()> {
    let mut content = existing.to_string();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(block);
    fs::write(path, content).with_path("write", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_block_adds_missing_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        append_block(&path, "a", "b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn append_block_to_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        append_block(&path, "", "b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "b\n");
    }

    #[test]
    fn read_or_empty_on_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(read_or_empty(&tmp.path().join("nope")).unwrap(), "");
    }
}
