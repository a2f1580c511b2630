// PollCommand - Prints requested certificate values
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use super::collect::collect_certificates;
use crate::Args;
use crate::config::Configuration;
use crate::notification::{Channel, NotificationChannel};
use anyhow::Result;
use async_trait::async_trait;

/// PollCommand answers `--poll` queries on stdout, one line per query
pub struct PollCommand {
    args: Args,
}

impl PollCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for PollCommand {
    async fn execute(&self) -> Result<()> {
        let config = Configuration::load(self.args.config_path())?;
        let mut channel = Channel::from_config(&config, &self.args.poll.queries)?;

        collect_certificates(&config, &mut channel).await?;
        channel.send()?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "PollCommand"
    }
}
