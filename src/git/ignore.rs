// ABOUTME: .gitignore maintenance — appends a commented-out ignore entry for the history folder.
// ABOUTME: Left commented so sessions are shared by default; uncommenting opts out of committing them.

use std::path::Path;

use super::{append_block, read_or_empty};
use crate::error::Result;

/// Add the commented ignore entry for `folder_name` to `<project>/.gitignore`.
///
/// Returns `false` without touching the file when the folder is already mentioned.
pub fn add_ignore_entry(project_root: &Path, folder_name: &str) -> Result<bool> {
    let path = project_root.join(".gitignore");
    let content = read_or_empty(&path)?;
    if content.contains(&format!("{folder_name}/")) {
        return Ok(false);
    }

    let block = format!(
        "\n# Claude Code conversation history\n\
         # Uncomment the line below to ignore session files, OR configure Git filter for safe sharing\n\
         # {folder_name}/\n"
    );
    append_block(&path, &content, &block)?;
    Ok(true)
}
