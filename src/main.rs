// certnotify - TLS certificate expiry notifier
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use anyhow::Result;
use certnotify::commands::CommandRouter;
use certnotify::{Args, NotifyError};
use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -v wins over RUST_LOG
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = CommandRouter::route(args)?;
    debug!("Running {}", command.name());

    if let Err(e) = command.execute().await {
        match e.downcast_ref::<NotifyError>() {
            Some(notify_error) => error!("{} error: {}", notify_error.kind(), notify_error),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
