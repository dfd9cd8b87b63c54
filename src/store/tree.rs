// ABOUTME: Directory tree operations over session stores — listing, moving, merging, removing.
// ABOUTME: Copies are verified by length before any source is deleted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IoContext, Result, SyncError};
use crate::paths::is_session_file;

/// Session files directly inside `dir`, sorted by name. A missing directory has none.
pub fn list_sessions(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SyncError::io("read directory", dir, e)),
    };
    let mut sessions = Vec::new();
    for entry in entries {
        let path = entry.with_path("read directory", dir)?.path();
        if is_session_file(&path) {
            sessions.push(path);
        }
    }
    sessions.sort();
    Ok(sessions)
}

pub fn count_sessions(dir: &Path) -> Result<usize> {
    Ok(list_sessions(dir)?.len())
}

/// One file copied from `src` to `dest`.
struct CopiedFile {
    src: PathBuf,
    dest: PathBuf,
}

/// Recursively copy `src` into `dest`. When `overwrite` is false, files that
/// already exist at the destination are skipped.
fn copy_tree(src: &Path, dest: &Path, overwrite: bool, copied: &mut Vec<CopiedFile>) -> Result<()> {
    fs::create_dir_all(dest).with_path("create directory", dest)?;
    for entry in fs::read_dir(src).with_path("read directory", src)? {
        let entry = entry.with_path("read directory", src)?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry.file_type().with_path("inspect", &src_path)?;

        if file_type.is_dir() {
            copy_tree(&src_path, &dest_path, overwrite, copied)?;
            continue;
        }
        if !overwrite && dest_path.exists() {
            debug!(path = %dest_path.display(), "keeping existing file");
            continue;
        }
        fs::copy(&src_path, &dest_path).with_path("copy", &src_path)?;
        copied.push(CopiedFile {
            src: src_path,
            dest: dest_path,
        });
    }
    Ok(())
}

fn verify(copied: &[CopiedFile]) -> Result<()> {
    for file in copied {
        let expected = fs::metadata(&file.src).with_path("inspect", &file.src)?.len();
        let actual = fs::metadata(&file.dest)
            .with_path("inspect", &file.dest)?
            .len();
        if expected != actual {
            return Err(SyncError::CopyMismatch {
                path: file.dest.clone(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Move everything under `src` into `dest`, then delete `src`.
///
/// The source is removed only after every copy has been verified, so an
/// interrupted move leaves duplicates rather than missing files. Returns the
/// number of files moved.
pub fn move_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = Vec::new();
    copy_tree(src, dest, true, &mut copied)?;
    verify(&copied)?;
    remove_tree(src)?;
    debug!(files = copied.len(), from = %src.display(), to = %dest.display(), "moved tree");
    Ok(copied.len())
}

/// Copy files from `src` into `dest` without overwriting anything already in
/// `dest`. The source is left in place. Returns the number of files copied.
pub fn merge_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = Vec::new();
    copy_tree(src, dest, false, &mut copied)?;
    verify(&copied)?;
    debug!(files = copied.len(), from = %src.display(), to = %dest.display(), "merged tree");
    Ok(copied.len())
}

pub fn remove_tree(dir: &Path) -> Result<()> {
    debug!(path = %dir.display(), "removing directory");
    fs::remove_dir_all(dir).with_path("remove", dir)
}
