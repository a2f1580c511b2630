// Poll/script channel arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use clap::Args;

/// Poll mode options
///
/// Passing at least one query selects the script channel instead of mail.
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Poll a value instead of sending mail (repeatable, e.g. cert.<id>.valid_days)
    #[arg(short = 'p', long = "poll", value_name = "QUERY")]
    pub queries: Vec<String>,

    /// Print the recognised poll queries and exit
    #[arg(short = 'P', long = "print-polls")]
    pub print_polls: bool,
}

impl PollArgs {
    pub fn is_polling(&self) -> bool {
        !self.queries.is_empty()
    }
}
