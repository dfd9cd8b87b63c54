// ABOUTME: Library root for claude-chats-sync — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod paths;
pub mod redact;
pub mod store;
pub mod ui;
