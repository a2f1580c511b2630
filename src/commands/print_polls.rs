// PrintPollsCommand - Lists the recognised poll queries
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::notification::get_polls;
use anyhow::Result;
use async_trait::async_trait;

pub struct PrintPollsCommand;

impl PrintPollsCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrintPollsCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for PrintPollsCommand {
    async fn execute(&self) -> Result<()> {
        for poll in get_polls() {
            println!("{}", poll);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "PrintPollsCommand"
    }
}
