// certnotify - TLS certificate expiry notifier
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

pub mod certificates;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod locations;
pub mod notification;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use crate::certificates::{Certificate, CertificateSettings, RetrievalMode};
pub use crate::cli::Args;
pub use crate::config::Configuration;
pub use crate::error::NotifyError;
pub use crate::locations::{LocationResolver, ResolvedLocation};
pub use crate::notification::{Channel, NotificationChannel};

/// Result type for certnotify operations
pub type Result<T> = std::result::Result<T, NotifyError>;
