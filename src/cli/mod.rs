// CLI module - Command line interface and argument parsing
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::config::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

mod poll_args;

pub use poll_args::PollArgs;

/// certnotify - TLS certificate expiry notifier
///
/// Checks the certificates of the configured hosts or files and mails a
/// warning for every certificate close to expiry. With `--poll` single
/// values are printed instead, for use by monitoring scripts.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(name = "certnotify")]
#[command(about = "Notifies about expiring TLS certificates", long_about = None)]
pub struct Args {
    /// Configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub poll: PollArgs,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Recreate the default configuration file and exit
    #[arg(long = "reset-config")]
    pub reset_config: bool,
}

impl Args {
    /// Configuration file to use
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}
