// NotifyCommand - Mails a warning for every certificate close to expiry
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use super::collect::collect_certificates;
use crate::Args;
use crate::config::Configuration;
use crate::notification::{Channel, NotificationChannel};
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// NotifyCommand runs the mail channel
///
/// The SMTP session is opened before any certificate is retrieved and is
/// closed when the channel is dropped, on success and on error alike.
pub struct NotifyCommand {
    args: Args,
}

impl NotifyCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for NotifyCommand {
    async fn execute(&self) -> Result<()> {
        let config = Configuration::load(self.args.config_path())?;
        let mut channel = Channel::from_config(&config, &[])?;

        collect_certificates(&config, &mut channel).await?;
        let sent = channel.send()?;

        info!("Sent {} expiry warning(s) via {}", sent, channel.name());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotifyCommand"
    }
}
