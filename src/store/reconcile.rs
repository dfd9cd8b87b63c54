// ABOUTME: The init reconciler — decides how to fold Claude Code's global session directory into the project.
// ABOUTME: Classification and planning are pure; `reconcile` applies the plan and creates the link.

use std::fs;

use tracing::{debug, info};

use super::link::{self, EntryKind};
use super::tree;
use crate::error::{IoContext, Result, SyncError};
use crate::paths::ProjectLayout;

/// Which side(s) hold session files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Neither,
    GlobalOnly,
    ProjectOnly,
    Both,
}

impl Placement {
    pub fn classify(global_sessions: usize, project_sessions: usize) -> Self {
        match (global_sessions > 0, project_sessions > 0) {
            (false, false) => Self::Neither,
            (true, false) => Self::GlobalOnly,
            (false, true) => Self::ProjectOnly,
            (true, true) => Self::Both,
        }
    }
}

/// What to do with an existing global directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing worth keeping globally; delete it.
    Discard,
    /// Move the global tree into the project store.
    Move,
    /// Copy missing files into the project store, then delete the global tree.
    Merge,
    /// Sessions would be moved or merged, but the caller did not pass `--force`.
    RequireForce,
}

/// Decide the reconciliation for a placement.
pub fn plan(placement: Placement, force: bool) -> Reconciliation {
    match (placement, force) {
        (Placement::Neither | Placement::ProjectOnly, _) => Reconciliation::Discard,
        (Placement::GlobalOnly, true) => Reconciliation::Move,
        (Placement::Both, true) => Reconciliation::Merge,
        (Placement::GlobalOnly | Placement::Both, false) => Reconciliation::RequireForce,
    }
}

/// What happened to a pre-existing global directory before linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// There was no global directory.
    None,
    /// The global directory held no sessions and was deleted.
    Discarded,
    /// `sessions` session files (and `files` files overall) were moved into the project.
    Moved { sessions: usize, files: usize },
    /// `copied` files were merged in; `total` is the session count afterwards.
    Merged { copied: usize, total: usize },
}

/// Result of running the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The global entry already links to this project's history folder.
    AlreadyInitialized,
    /// Sessions exist globally and `--force` was not given. Nothing was changed.
    NeedsForce {
        placement: Placement,
        global_sessions: usize,
        project_sessions: usize,
    },
    /// The link was created.
    Linked {
        migration: Migration,
        created_history_dir: bool,
        project_sessions: usize,
    },
}

/// Reconcile the global store entry with the project store and create the link.
///
/// Errors abort immediately. Work already done (e.g. a completed move) is not
/// rolled back.
pub fn reconcile(layout: &ProjectLayout, force: bool) -> Result<InitOutcome> {
    let global = &layout.global_entry;
    let history = &layout.history_dir;

    let migration = match link::probe(global)? {
        EntryKind::Link { target } => {
            if link::same_path(&target, history) {
                if !history.exists() {
                    fs::create_dir_all(history).with_path("create directory", history)?;
                }
                return Ok(InitOutcome::AlreadyInitialized);
            }
            return Err(SyncError::ForeignLink {
                path: global.clone(),
                target,
            });
        }
        EntryKind::File => {
            return Err(SyncError::ForeignFile {
                path: global.clone(),
            });
        }
        EntryKind::Missing => Migration::None,
        EntryKind::Directory => {
            let global_sessions = tree::count_sessions(global)?;
            let project_sessions = tree::count_sessions(history)?;
            let placement = Placement::classify(global_sessions, project_sessions);
            debug!(?placement, global_sessions, project_sessions, "existing global directory");

            match plan(placement, force) {
                Reconciliation::RequireForce => {
                    return Ok(InitOutcome::NeedsForce {
                        placement,
                        global_sessions,
                        project_sessions,
                    });
                }
                Reconciliation::Discard => {
                    tree::remove_tree(global)?;
                    Migration::Discarded
                }
                Reconciliation::Move => {
                    let files = tree::move_tree(global, history)?;
                    Migration::Moved {
                        sessions: global_sessions,
                        files,
                    }
                }
                Reconciliation::Merge => {
                    let copied = tree::merge_tree(global, history)?;
                    tree::remove_tree(global)?;
                    Migration::Merged {
                        copied,
                        total: tree::count_sessions(history)?,
                    }
                }
            }
        }
    };

    let created_history_dir = !history.exists();
    if created_history_dir {
        fs::create_dir_all(history).with_path("create directory", history)?;
    }
    if let Some(parent) = global.parent() {
        fs::create_dir_all(parent).with_path("create directory", parent)?;
    }
    link::create_link(history, global)?;
    info!(link = %global.display(), target = %history.display(), "session link created");

    Ok(InitOutcome::Linked {
        migration,
        created_history_dir,
        project_sessions: tree::count_sessions(history)?,
    })
}
