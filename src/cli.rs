// ABOUTME: CLI argument parsing using clap.
// ABOUTME: Subcommands mirror the sync workflow; options are global so they work on either side of the command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sync Claude Code chat sessions into your project directory.
#[derive(Parser, Debug)]
#[command(name = "claude-chats-sync")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  claude-chats-sync init
  claude-chats-sync init --folder-name .sessions
  claude-chats-sync init --force
  claude-chats-sync status
  claude-chats-sync clean
  claude-chats-sync setup-git-filter
  claude-chats-sync update
")]
pub struct Cli {
    /// History folder name inside the project [default: .claudeCodeSessions]
    #[arg(long, global = true)]
    pub folder_name: Option<String>,

    /// Move or merge sessions already in Claude Code's storage
    #[arg(long, global = true)]
    pub force: bool,

    /// Project path (default: current directory)
    #[arg(long, global = true)]
    pub project_path: Option<PathBuf>,

    /// Claude Code data directory (default: ~/.claude)
    #[arg(long, global = true, env = "CLAUDE_CONFIG_DIR")]
    pub claude_home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize sync for the current project
    Init,
    /// Check sync status and session count
    Status,
    /// Open the history folder in the file manager
    Open,
    /// Clean sensitive data from session files
    Clean,
    /// Set up the Git filter for automatic cleaning
    SetupGitFilter,
    /// Update the Git filter to the latest version
    Update,
    /// Run as a Git filter driver (stdin to stdout)
    #[command(hide = true)]
    Filter {
        #[command(subcommand)]
        mode: FilterMode,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Strip credentials and absolute cwd paths
    Clean,
    /// Restore absolute cwd paths from the working directory
    Smudge,
}
