// ABOUTME: Filesystem link handling — classifies what sits at the global entry and creates the link.
// ABOUTME: Symlinks on Unix; directory junctions on Windows, which need no elevated privileges.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IoContext, Result, SyncError};

/// What currently occupies a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Nothing is there.
    Missing,
    /// A symlink or junction, with its target resolved against the link's parent.
    Link { target: PathBuf },
    /// An ordinary directory.
    Directory,
    /// A regular file or anything else that is neither a link nor a directory.
    File,
}

/// Classify the entry at `path` without following links.
///
/// Junctions can report as plain directories, so a directory whose target can
/// be read with `read_link` is treated as a link. If reading fails it is an
/// ordinary directory.
pub fn probe(path: &Path) -> Result<EntryKind> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(EntryKind::Missing),
        Err(e) => return Err(SyncError::io("inspect", path, e)),
    };

    let file_type = meta.file_type();
    if file_type.is_symlink() {
        let target = fs::read_link(path).with_path("read link", path)?;
        return Ok(EntryKind::Link {
            target: resolve_target(path, target),
        });
    }
    if file_type.is_dir() {
        return Ok(match fs::read_link(path) {
            Ok(target) => EntryKind::Link {
                target: resolve_target(path, target),
            },
            Err(_) => EntryKind::Directory,
        });
    }
    Ok(EntryKind::File)
}

fn resolve_target(link: &Path, target: PathBuf) -> PathBuf {
    if target.is_absolute() {
        return target;
    }
    match link.parent() {
        Some(parent) => parent.join(target),
        None => target,
    }
}

/// Compare two paths after resolving them. Falls back to a lexical comparison
/// when either side cannot be canonicalized (e.g. it does not exist yet).
pub fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => {
            let a: PathBuf = a.components().collect();
            let b: PathBuf = b.components().collect();
            a == b
        }
    }
}

/// Create a directory link at `link` pointing to `target`.
pub fn create_link(target: &Path, link: &Path) -> Result<()> {
    debug!(target = %target.display(), link = %link.display(), "creating link");
    platform_link(target, link)
}

#[cfg(unix)]
fn platform_link(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).with_path("create symlink", link)
}

#[cfg(windows)]
fn platform_link(target: &Path, link: &Path) -> Result<()> {
    let output = std::process::Command::new("cmd")
        .args(["/C", "mklink", "/J"])
        .arg(link)
        .arg(target)
        .output()
        .with_path("create junction", link)?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(SyncError::io(
        "create junction",
        link,
        std::io::Error::other(stderr),
    ))
}

#[cfg(not(any(unix, windows)))]
fn platform_link(_target: &Path, link: &Path) -> Result<()> {
    Err(SyncError::io(
        "create link",
        link,
        std::io::Error::new(ErrorKind::Unsupported, "links are not supported here"),
    ))
}
