// ABOUTME: Session store module — relocates Claude Code's global session directory into the project.
// ABOUTME: Link detection/creation, directory tree moves and merges, and the init reconciler.

pub mod link;
pub mod reconcile;
pub mod tree;

pub use link::{EntryKind, create_link, probe, same_path};
pub use reconcile::{InitOutcome, Migration, Placement, Reconciliation, plan, reconcile};
pub use tree::{count_sessions, list_sessions, merge_tree, move_tree, remove_tree};
