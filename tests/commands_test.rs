// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

//! Commands Module Integration Tests
//!
//! Routing priority and the commands that need no network access.

use certnotify::Args;
use certnotify::commands::{
    Command, CommandRouter, NotifyCommand, PollCommand, PrintPollsCommand, ResetConfigCommand,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_command_names() {
    assert_eq!(NotifyCommand::new(Args::default()).name(), "NotifyCommand");
    assert_eq!(PollCommand::new(Args::default()).name(), "PollCommand");
    assert_eq!(PrintPollsCommand::new().name(), "PrintPollsCommand");
    assert_eq!(ResetConfigCommand::new(Args::default()).name(), "ResetConfigCommand");
}

#[test]
fn test_route_priority() {
    let mut args = Args::default();
    args.reset_config = true;
    args.poll.queries = vec!["certs".to_string()];
    assert_eq!(CommandRouter::route(args.clone()).unwrap().name(), "ResetConfigCommand");

    args.poll.print_polls = true;
    assert_eq!(CommandRouter::route(args).unwrap().name(), "PrintPollsCommand");
}

#[tokio::test]
async fn test_notify_without_channel_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("certnotify.toml");
    fs::write(&path, "[certificates]\nlocations = [\"example.org\"]\n").unwrap();

    let mut args = Args::default();
    args.config = Some(path);

    let err = NotifyCommand::new(args).execute().await.unwrap_err();
    assert!(err.to_string().contains("No notification channel enabled"));
}

#[tokio::test]
async fn test_poll_without_locations_fails() {
    let dir = TempDir::new().unwrap();
    let mut args = Args::default();
    args.config = Some(dir.path().join("certnotify.toml"));
    args.poll.queries = vec!["certs".to_string()];

    let err = PollCommand::new(args).execute().await.unwrap_err();
    assert!(err.to_string().contains("No locations configured"));
}

#[tokio::test]
async fn test_print_polls_succeeds() {
    PrintPollsCommand::new().execute().await.unwrap();
}
