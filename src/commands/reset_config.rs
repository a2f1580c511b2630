// ResetConfigCommand - Recreates the default configuration file
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::config::Configuration;
use anyhow::Result;
use async_trait::async_trait;

pub struct ResetConfigCommand {
    args: Args,
}

impl ResetConfigCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for ResetConfigCommand {
    async fn execute(&self) -> Result<()> {
        let path = self.args.config_path();
        Configuration::reset(&path)?;
        println!("✓ Default configuration written to {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ResetConfigCommand"
    }
}
