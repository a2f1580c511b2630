// Command trait - Defines the interface for all command implementations
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use anyhow::Result;
use async_trait::async_trait;

/// One operational mode of certnotify
///
/// The router picks exactly one command per invocation from the parsed
/// arguments; `main` executes it and turns an error into exit status 1.
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> Result<()>;

    /// Get a human-readable name for this command (for logging/debugging)
    fn name(&self) -> &'static str;
}
