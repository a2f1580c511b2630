// CommandRouter - Routes CLI arguments to appropriate Command
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::{Command, NotifyCommand, PollCommand, PrintPollsCommand, ResetConfigCommand};
use crate::Args;
use anyhow::Result;

/// CommandRouter determines which Command to execute based on CLI arguments
///
/// Priority order:
/// 1. Print poll patterns (--print-polls)
/// 2. Reset the configuration file (--reset-config)
/// 3. Poll values (--poll)
/// 4. Mail notification (default)
pub struct CommandRouter;

impl CommandRouter {
    /// Route CLI arguments to the appropriate Command
    pub fn route(args: Args) -> Result<Box<dyn Command>> {
        if args.poll.print_polls {
            return Ok(Box::new(PrintPollsCommand::new()));
        }

        if args.reset_config {
            return Ok(Box::new(ResetConfigCommand::new(args)));
        }

        if args.poll.is_polling() {
            return Ok(Box::new(PollCommand::new(args)));
        }

        Ok(Box::new(NotifyCommand::new(args)))
    }
}
