// ABOUTME: Error types for the session store and git integration layers.
// ABOUTME: I/O failures carry the operation and path so the CLI can surface them verbatim.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the reconciler, link handling, and filter installation.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Something other than a directory or link sits where the session link belongs.
    #[error("A file exists at Claude Code location: {}", path.display())]
    ForeignFile { path: PathBuf },

    /// A link already exists at the global entry but points elsewhere.
    #[error(
        "A link at {} already points to {}, not to this project",
        path.display(),
        target.display()
    )]
    ForeignLink { path: PathBuf, target: PathBuf },

    /// The project has no `.git` directory.
    #[error("Not a Git repository: {}", path.display())]
    NotGitRepo { path: PathBuf },

    /// The history folder has not been created yet.
    #[error("Project not initialized. Please run \"init\" first.")]
    NotInitialized,

    /// A copied file did not arrive intact, so the source was left in place.
    #[error("Copy of {} did not verify ({expected} bytes expected, {actual} found)", path.display())]
    CopyMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Any filesystem operation that failed unexpectedly.
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Wrap an I/O error with the operation and path it concerned.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Extension for attaching operation/path context to `std::io::Result`.
pub trait IoContext<T> {
    fn with_path(self, op: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, op: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SyncError::io(op, path, e))
    }
}
