// ABOUTME: Git clean/smudge filter installation for session files.
// ABOUTME: Writes wrapper scripts, the versioned .gitconfig section, local git config, and .gitattributes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use super::{append_block, read_or_empty};
use crate::error::{IoContext, Result, SyncError};

/// Name of the git filter driver.
pub const FILTER_NAME: &str = "claude-clean";

/// Directory (relative to the project root) holding the filter scripts.
pub const FILTER_DIR: &str = ".gitfilters";

pub const CLEAN_SCRIPT: &str = "clean-sessions.sh";
pub const SMUDGE_SCRIPT: &str = "smudge-sessions.sh";

const CLEAN_SCRIPT_BODY: &str = "#!/bin/sh
# Git clean filter: strips credentials and absolute cwd paths from Claude Code sessions.
# Set CLAUDE_CHATS_SYNC_BIN if claude-chats-sync is not on PATH.
exec \"${CLAUDE_CHATS_SYNC_BIN:-claude-chats-sync}\" filter clean
";

const SMUDGE_SCRIPT_BODY: &str = "#!/bin/sh
# Git smudge filter: restores absolute cwd paths in Claude Code sessions on checkout.
# Set CLAUDE_CHATS_SYNC_BIN if claude-chats-sync is not on PATH.
exec \"${CLAUDE_CHATS_SYNC_BIN:-claude-chats-sync}\" filter smudge
";

/// Command git runs for the clean side of the filter.
pub fn clean_command() -> String {
    format!("sh {FILTER_DIR}/{CLEAN_SCRIPT}")
}

/// Command git runs for the smudge side of the filter.
pub fn smudge_command() -> String {
    format!("sh {FILTER_DIR}/{SMUDGE_SCRIPT}")
}

/// The `.gitattributes` line that routes session files through the filter.
pub fn attribute_line(folder_name: &str) -> String {
    format!("{folder_name}/**/*.jsonl filter={FILTER_NAME}")
}

/// Pattern written by earlier versions, which only covered the top level.
fn legacy_attribute_line(folder_name: &str) -> String {
    format!("{folder_name}/*.jsonl filter={FILTER_NAME}")
}

/// What `install_filter` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub clean_script: PathBuf,
    pub smudge_script: PathBuf,
    /// Whether the `[filter]` section was appended to `.gitconfig`.
    pub gitconfig_updated: bool,
    /// Whether `.gitattributes` was written.
    pub attributes_updated: bool,
    /// Set when registering the filter in local git config failed.
    pub local_config_error: Option<String>,
}

/// Install the session filter into the git repository at `project_root`.
///
/// Registration in the local git config is best-effort: a failure is returned
/// in the report rather than as an error.
pub fn install_filter(project_root: &Path, folder_name: &str) -> Result<FilterReport> {
    if !project_root.join(".git").exists() {
        return Err(SyncError::NotGitRepo {
            path: project_root.to_path_buf(),
        });
    }

    let filter_dir = project_root.join(FILTER_DIR);
    fs::create_dir_all(&filter_dir).with_path("create directory", &filter_dir)?;
    let clean_script = write_script(&filter_dir.join(CLEAN_SCRIPT), CLEAN_SCRIPT_BODY)?;
    let smudge_script = write_script(&filter_dir.join(SMUDGE_SCRIPT), SMUDGE_SCRIPT_BODY)?;

    let gitconfig_updated = update_gitconfig(project_root)?;

    let local_config_error = match register_local(project_root) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "could not register filter in local git config");
            Some(e.to_string())
        }
    };

    let attributes_updated = update_attributes(project_root, folder_name)?;

    Ok(FilterReport {
        clean_script,
        smudge_script,
        gitconfig_updated,
        attributes_updated,
        local_config_error,
    })
}

fn write_script(path: &Path, body: &str) -> Result<PathBuf> {
    fs::write(path, body).with_path("write", path)?;
    make_executable(path);
    Ok(path.to_path_buf())
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o755)) {
        debug!(path = %path.display(), error = %e, "chmod failed; ignoring");
    }
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

/// Append the filter section to the versioned `.gitconfig` unless present.
fn update_gitconfig(project_root: &Path) -> Result<bool> {
    let path = project_root.join(".gitconfig");
    let content = read_or_empty(&path)?;
    if content.contains(&format!("[filter \"{FILTER_NAME}\"]")) {
        return Ok(false);
    }
    let block = format!(
        "[filter \"{FILTER_NAME}\"]\n\tclean = {}\n\tsmudge = {}\n",
        clean_command(),
        smudge_command()
    );
    append_block(&path, &content, &block)?;
    Ok(true)
}

/// Register the filter driver in the repository's local git config.
fn register_local(project_root: &Path) -> Result<()> {
    for (key, value) in [
        (format!("filter.{FILTER_NAME}.clean"), clean_command()),
        (format!("filter.{FILTER_NAME}.smudge"), smudge_command()),
    ] {
        let output = Command::new("git")
            .args(["config", key.as_str(), value.as_str()])
            .current_dir(project_root)
            .output()
            .with_path("run git config in", project_root)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SyncError::io(
                "run git config in",
                project_root,
                std::io::Error::other(stderr),
            ));
        }
    }
    Ok(())
}

/// Add the attribute line to `.gitattributes`, upgrading the legacy pattern in place.
fn update_attributes(project_root: &Path, folder_name: &str) -> Result<bool> {
    let path = project_root.join(".gitattributes");
    let content = read_or_empty(&path)?;
    let line = attribute_line(folder_name);

    if content.lines().any(|l| l.trim() == line) {
        return Ok(false);
    }

    let legacy = legacy_attribute_line(folder_name);
    if content.lines().any(|l| l.trim() == legacy) {
        let upgraded: Vec<&str> = content
            .lines()
            .map(|l| if l.trim() == legacy { line.as_str() } else { l })
            .collect();
        let mut upgraded = upgraded.join("\n");
        if content.ends_with('\n') {
            upgraded.push('\n');
        }
        fs::write(&path, upgraded).with_path("write", &path)?;
        return Ok(true);
    }

    let block = format!("\n# Claude Code sessions - clean sensitive data on commit\n{line}\n");
    append_block(&path, &content, &block)?;
    Ok(true)
}
