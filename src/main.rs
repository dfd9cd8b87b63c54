// ABOUTME: Entry point for claude-chats-sync — keeps Claude Code chat history inside the project.
// ABOUTME: Parses CLI args, loads config, sets up tracing, and dispatches to command handlers.

use std::io;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use claude_chats_sync::cli::{Cli, Commands};
use claude_chats_sync::commands::{self, Context};
use claude_chats_sync::config::Config;
use claude_chats_sync::ui;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        ui::error(format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        // Git runs filters from the repository root with nothing else configured.
        Commands::Filter { mode } => {
            let cwd = std::env::current_dir()?;
            commands::run_filter(mode, &cwd, io::stdin().lock(), io::stdout().lock())
        }
        Commands::Init => commands::init(&context(&cli)?).map(|_| ()),
        Commands::Status => commands::status(&context(&cli)?),
        Commands::Open => commands::open(&context(&cli)?),
        Commands::Clean => commands::clean(&context(&cli)?),
        Commands::SetupGitFilter => commands::setup_git_filter(&context(&cli)?).map(|_| ()),
        Commands::Update => commands::update(&context(&cli)?).map(|_| ()),
    }
}

fn context(cli: &Cli) -> anyhow::Result<Context> {
    let config = Config::load()?;
    Context::from_cli(cli, &config)
}
