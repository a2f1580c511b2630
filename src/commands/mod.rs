// Commands module - Command Pattern implementation
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

mod collect;
mod command;
mod router;

// Individual command implementations
mod notify;
mod poll;
mod print_polls;
mod reset_config;

pub use collect::collect_certificates;
pub use command::Command;
pub use router::CommandRouter;

pub use notify::NotifyCommand;
pub use poll::PollCommand;
pub use print_polls::PrintPollsCommand;
pub use reset_config::ResetConfigCommand;
