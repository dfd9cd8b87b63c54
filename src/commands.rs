// ABOUTME: Command handlers — init, status, open, clean, setup-git-filter, update, and the git filter driver.
// ABOUTME: Resolves process-wide inputs (cwd, home) once, then calls into the pure core and reports results.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context as _, bail};
use chrono::{DateTime, Local};
use tracing::debug;

use crate::cli::{Cli, FilterMode};
use crate::config::Config;
use crate::error::SyncError;
use crate::git::{self, FilterReport};
use crate::paths::{self, PathStyle, ProjectLayout};
use crate::redact;
use crate::store::{self, EntryKind, InitOutcome, Migration, Placement};
use crate::ui;

/// Everything a command needs, resolved from CLI flags, config and environment.
#[derive(Debug, Clone)]
pub struct Context {
    pub layout: ProjectLayout,
    pub folder_name: String,
    pub force: bool,
}

impl Context {
    /// Build a context from explicit inputs.
    pub fn new(project_root: &Path, claude_home: &Path, folder_name: &str, force: bool) -> Self {
        Self {
            layout: ProjectLayout::new(project_root, claude_home, folder_name, PathStyle::native()),
            folder_name: folder_name.to_string(),
            force,
        }
    }

    /// Build a context from parsed arguments, reading the working directory if no
    /// project path was given.
    pub fn from_cli(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let project_path = match &cli.project_path {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let project_root = paths::resolve_project_root(&project_path)
            .with_context(|| format!("Invalid project path: {}", project_path.display()))?;
        let claude_home = config.claude_home(cli.claude_home.as_deref());
        let folder_name = config.folder_name(cli.folder_name.as_deref());
        Ok(Self::new(&project_root, &claude_home, folder_name, cli.force))
    }
}

/// `init`: reconcile the global store with the project and create the link.
pub fn init(ctx: &Context) -> anyhow::Result<InitOutcome> {
    let layout = &ctx.layout;
    let outcome = store::reconcile(layout, ctx.force).context("Failed to initialize")?;

    match outcome {
        InitOutcome::AlreadyInitialized => {
            ui::success("Claude Code Chats Sync already initialized");
            ui::info(format!("History folder: {}", layout.history_dir.display()));
            ui::info(format!("Linked to: {}", layout.global_entry.display()));
        }
        InitOutcome::NeedsForce {
            placement,
            global_sessions,
            project_sessions,
        } => report_needs_force(placement, global_sessions, project_sessions),
        InitOutcome::Linked {
            migration,
            created_history_dir,
            project_sessions,
        } => {
            report_migration(migration, project_sessions);
            if created_history_dir {
                ui::success(format!("Created folder: {}", layout.history_dir.display()));
            }
            ui::success("Claude Code Chats Sync initialized!");
            ui::info(format!("History folder: {}", layout.history_dir.display()));
            ui::info(format!("Linked to: {}", layout.global_entry.display()));

            // Best-effort and independent: neither failure undoes the link.
            add_ignore_entry(ctx);
            match git::install_filter(&layout.project_root, &ctx.folder_name) {
                Ok(report) => report_local_config(&report),
                Err(SyncError::NotGitRepo { .. }) => {
                    ui::warn("Not a Git repository. Git filter will not be configured.")
                }
                Err(e) => ui::warn(format!("Failed to setup Git filter: {e}")),
            }
        }
    }
    Ok(outcome)
}

fn report_needs_force(placement: Placement, global_sessions: usize, project_sessions: usize) {
    if placement == Placement::Both {
        ui::warn("Found sessions in both locations:");
        ui::info(format!("  - Claude's storage: {global_sessions} session(s)"));
        ui::info(format!("  - Project folder: {project_sessions} session(s)"));
        ui::info("Use --force to merge them into your project folder");
    } else {
        ui::warn(format!(
            "Found {global_sessions} existing Claude Code session(s) in Claude's storage."
        ));
        ui::info("Use --force to move them to your project folder");
    }
}

fn report_migration(migration: Migration, project_sessions: usize) {
    if let Some(summary) = migration_summary(migration) {
        ui::success(summary);
    } else if project_sessions > 0 {
        ui::info(format!(
            "Using existing {project_sessions} session(s) from project folder"
        ));
    }
}

/// One-line summary of a move or merge; `None` when nothing was migrated.
fn migration_summary(migration: Migration) -> Option<String> {
    match migration {
        Migration::Moved { sessions, files } => Some(format!(
            "Moved {sessions} session(s) ({files} file(s)) to project folder!"
        )),
        Migration::Merged { copied, total } => Some(format!(
            "Merged {copied} file(s) from Claude's storage; {total} session(s) now in project folder"
        )),
        Migration::None | Migration::Discarded => None,
    }
}

fn add_ignore_entry(ctx: &Context) {
    match git::add_ignore_entry(&ctx.layout.project_root, &ctx.folder_name) {
        Ok(true) => ui::success("Added .gitignore entry (commented by default)"),
        Ok(false) => debug!("gitignore entry already present"),
        Err(e) => ui::warn(format!("Could not update .gitignore: {e}")),
    }
}

fn report_local_config(report: &FilterReport) {
    if let Some(err) = &report.local_config_error {
        ui::warn(format!("Failed to configure local Git filter: {err}"));
    }
}

/// `status`: report the history folder and link state.
pub fn status(ctx: &Context) -> anyhow::Result<()> {
    let layout = &ctx.layout;
    ui::heading("📊 Claude Code Chats Sync Status");

    if layout.history_dir.is_dir() {
        let sessions = store::list_sessions(&layout.history_dir)?;
        ui::success("History folder exists");
        ui::info(format!("   Path: {}", layout.history_dir.display()));
        ui::info(format!("   Sessions: {}", sessions.len()));
        if let Some(modified) = newest_modification(&sessions) {
            ui::info(format!(
                "   Last activity: {}",
                modified.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    } else {
        ui::error("History folder not found");
    }

    match store::probe(&layout.global_entry)? {
        EntryKind::Link { target } if store::same_path(&target, &layout.history_dir) => {
            ui::success("Symlink created");
            ui::info(format!("   Path: {}", layout.global_entry.display()));
        }
        EntryKind::Link { target } => {
            ui::warn(format!("Link points elsewhere: {}", target.display()));
            ui::info(format!("   Path: {}", layout.global_entry.display()));
        }
        EntryKind::Directory => {
            ui::warn("Claude Code is still using its own directory. Run \"init\" to link it.");
            ui::info(format!("   Path: {}", layout.global_entry.display()));
        }
        EntryKind::File => {
            ui::error(format!(
                "A file exists at Claude Code location: {}",
                layout.global_entry.display()
            ));
        }
        EntryKind::Missing => ui::error("Symlink not created"),
    }
    println!();
    Ok(())
}

fn newest_modification(sessions: &[PathBuf]) -> Option<DateTime<Local>> {
    sessions
        .iter()
        .filter_map(|path| fs::metadata(path).and_then(|m| m.modified()).ok())
        .max()
        .map(DateTime::<Local>::from)
}

/// `open`: show the history folder in the platform file manager.
pub fn open(ctx: &Context) -> anyhow::Result<()> {
    let history = &ctx.layout.history_dir;
    if !history.exists() {
        bail!("History folder does not exist. Please initialize first.");
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    };
    Command::new(opener)
        .arg(history)
        .spawn()
        .with_context(|| format!("Failed to open folder with {opener}"))?;
    ui::success(format!("Opened history folder: {}", history.display()));
    Ok(())
}

/// Counts from cleaning a history folder in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    /// Session files examined.
    pub scanned: usize,
    /// Session files whose content changed and were rewritten.
    pub rewritten: usize,
}

/// Redact credentials from every session file in `dir`. Files are only
/// rewritten when redaction changed them. Content is treated as raw bytes, so
/// a file that is not valid UTF-8 is still scanned.
pub fn clean_session_files(dir: &Path) -> anyhow::Result<CleanSummary> {
    let sessions = store::list_sessions(dir)?;
    let mut rewritten = 0;
    for path in &sessions {
        let content =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let cleaned = redact::redact(&content);
        if cleaned != content {
            fs::write(path, cleaned)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            rewritten += 1;
        }
    }
    Ok(CleanSummary {
        scanned: sessions.len(),
        rewritten,
    })
}

/// `clean`: redact credentials in place across the history folder.
pub fn clean(ctx: &Context) -> anyhow::Result<()> {
    let history = &ctx.layout.history_dir;
    if !history.exists() {
        bail!("History folder does not exist");
    }
    let count = store::count_sessions(history)?;
    if count == 0 {
        ui::warn("No session files to clean");
        return Ok(());
    }

    ui::info(format!("Cleaning {count} session file(s)..."));
    let summary = clean_session_files(history)?;
    ui::success(format!("Cleaned {} session file(s)", summary.scanned));
    ui::info(format!(
        "Sensitive data has been redacted ({} file(s) changed)",
        summary.rewritten
    ));
    Ok(())
}

/// `setup-git-filter`: install the clean/smudge filter.
pub fn setup_git_filter(ctx: &Context) -> anyhow::Result<FilterReport> {
    let report = git::install_filter(&ctx.layout.project_root, &ctx.folder_name)
        .context("Failed to setup Git filter")?;
    report_local_config(&report);
    ui::success("Git filter configured");
    ui::info("Session files will be automatically cleaned on commit");
    ui::info("Original files remain unchanged. Only committed versions are cleaned.");
    Ok(report)
}

/// `update`: re-install the filter on an initialized repository.
pub fn update(ctx: &Context) -> anyhow::Result<FilterReport> {
    let layout = &ctx.layout;
    if !layout.git_dir().exists() {
        return Err(SyncError::NotGitRepo {
            path: layout.project_root.clone(),
        }
        .into());
    }
    if !layout.history_dir.exists() {
        return Err(SyncError::NotInitialized.into());
    }

    ui::info("Updating Git filter configuration...");
    let report = setup_git_filter(ctx)?;
    ui::success("Git filter updated successfully!");
    ui::info("Included:");
    ui::info("  - Smudge filter: Restores absolute paths on checkout");
    ui::info("  - Clean filter: Removes absolute paths from cwd field");
    ui::info("  - Pattern: Matches all .jsonl files in subdirectories");
    Ok(report)
}

/// Apply a filter mode to raw blob content. `working_dir` is only used by smudge.
pub fn apply_filter(mode: FilterMode, content: &[u8], working_dir: &Path) -> Vec<u8> {
    match mode {
        FilterMode::Clean => redact::clean_filter(content),
        FilterMode::Smudge => redact::smudge(content, working_dir),
    }
}

/// `filter clean|smudge`: stream `input` through the filter into `output`.
pub fn run_filter(
    mode: FilterMode,
    working_dir: &Path,
    mut input: impl Read,
    mut output: impl Write,
) -> anyhow::Result<()> {
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .context("Failed to read filter input")?;
    let filtered = apply_filter(mode, &raw, working_dir);
    output
        .write_all(&filtered)
        .context("Failed to write filter output")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_filter_clean_streams_redacted_text() {
        let input = br#"{"cwd":"/home/u/app","primaryApiKey":"sk-ant-x"}"#;
        let mut out = Vec::new();
        run_filter(FilterMode::Clean, Path::new("/ignored"), &input[..], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"{"cwd":"app","primaryApiKey":"[REDACTED]"}"#
        );
    }

    #[test]
    fn run_filter_smudge_uses_working_dir() {
        let input = br#"{"cwd":"app"}"#;
        let mut out = Vec::new();
        run_filter(FilterMode::Smudge, Path::new("/home/u/app"), &input[..], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"cwd":"/home/u/app"}"#);
    }

    #[test]
    fn clean_session_files_rewrites_only_changed_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dirty = tmp.path().join("a.jsonl");
        let tidy = tmp.path().join("b.jsonl");
        let other = tmp.path().join("notes.txt");
        fs::write(&dirty, r#"{"token":"abc"}"#).unwrap();
        fs::write(&tidy, r#"{"foo":"bar"}"#).unwrap();
        fs::write(&other, r#"{"token":"abc"}"#).unwrap();

        let summary = clean_session_files(tmp.path()).unwrap();

        assert_eq!(
            summary,
            CleanSummary {
                scanned: 2,
                rewritten: 1
            }
        );
        assert_eq!(fs::read_to_string(&dirty).unwrap(), r#"{"token":"[REDACTED]"}"#);
        assert_eq!(fs::read_to_string(&other).unwrap(), r#"{"token":"abc"}"#);
    }

    #[test]
    fn run_filter_passes_invalid_utf8_through_unchanged() {
        let input = b"{\"note\":\"caf\xe9\",\"foo\":\"bar\"}\n";
        let mut out = Vec::new();
        run_filter(FilterMode::Clean, Path::new("/ignored"), &input[..], &mut out).unwrap();
        assert_eq!(out, input);

        let mut out = Vec::new();
        run_filter(FilterMode::Smudge, Path::new("/home/u/app"), &input[..], &mut out).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn clean_session_files_handles_invalid_utf8_files() {
        let tmp = tempfile::tempdir().unwrap();
        let binary = tmp.path().join("a.jsonl");
        let text = tmp.path().join("b.jsonl");
        fs::write(&binary, b"{\"token\":\"secret\",\"n\":\"\xff\"}").unwrap();
        fs::write(&text, r#"{"apiKey":"k"}"#).unwrap();

        let summary = clean_session_files(tmp.path()).unwrap();

        assert_eq!(
            summary,
            CleanSummary {
                scanned: 2,
                rewritten: 2
            }
        );
        assert_eq!(
            fs::read(&binary).unwrap(),
            b"{\"token\":\"[REDACTED]\",\"n\":\"\xff\"}"
        );
        assert_eq!(fs::read_to_string(&text).unwrap(), r#"{"apiKey":"[REDACTED]"}"#);
    }

    #[test]
    fn merge_summary_counts_files_and_sessions_separately() {
        let summary = migration_summary(Migration::Merged { copied: 3, total: 2 }).unwrap();
        assert_eq!(
            summary,
            "Merged 3 file(s) from Claude's storage; 2 session(s) now in project folder"
        );
        assert!(migration_summary(Migration::Discarded).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn from_cli_collapses_parent_components() {
        use std::ffi::OsStr;

        use clap::Parser;

        let tmp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        let project = root.join("proj");
        fs::create_dir_all(project.join("sub")).unwrap();
        let home = root.join("home");
        let parse = |path: &Path| {
            Cli::parse_from([
                OsStr::new("claude-chats-sync"),
                OsStr::new("--project-path"),
                path.as_os_str(),
                OsStr::new("--claude-home"),
                home.as_os_str(),
                OsStr::new("status"),
            ])
        };
        let config = Config::default();

        let plain = Context::from_cli(&parse(&project), &config).unwrap();
        let dotted = Context::from_cli(&parse(&project.join("sub").join("..")), &config).unwrap();
        let missing = Context::from_cli(
            &parse(&project.join("gone").join("..").join("sub").join("..")),
            &config,
        )
        .unwrap();

        assert_eq!(dotted.layout.global_entry, plain.layout.global_entry);
        assert_eq!(missing.layout.global_entry, plain.layout.global_entry);
        assert!(!plain.layout.global_entry.to_string_lossy().contains(".."));
    }

    #[test]
    fn context_derives_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(tmp.path(), &tmp.path().join(".claude"), ".s", false);
        assert_eq!(ctx.layout.history_dir, tmp.path().join(".s"));
        assert!(ctx.layout.global_entry.starts_with(tmp.path().join(".claude").join("projects")));
    }
}
