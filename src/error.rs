// Error types for certnotify
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0
//
// Every failure except a missed poll query is fatal for the run. The variants
// below group them into the four classes the binary reports before exiting.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for certnotify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuration is missing, malformed or incomplete
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A `section:` location points to a section without locations
    #[error("No location specified for [{section}]")]
    MissingSection { section: String },

    /// An option holds a value of the wrong type
    #[error("Option '{option}' must be {expected}, found {found}")]
    OptionType {
        option: String,
        expected: &'static str,
        found: String,
    },

    /// Certificate could not be fetched from its location
    #[error("Failed to retrieve certificate from {location}: {details}")]
    Retrieval { location: String, details: String },

    /// Connection or handshake did not finish in time
    #[error("Timed out after {duration:?} while contacting {location}")]
    Timeout { location: String, duration: Duration },

    /// Location uses a scheme without a known default port
    #[error("No default port known for scheme '{scheme}' in {location}")]
    UnknownScheme { location: String, scheme: String },

    /// Certificate file could not be read
    #[error("Failed to read certificate file {path}: {source}")]
    CertificateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Certificate bytes could not be decoded
    #[error("Failed to parse certificate from {location}: {details}")]
    Parse { location: String, details: String },

    /// Certificate has no Subject Alternative Name extension
    #[error("Certificate from {location} has no Subject Alternative Name extension")]
    MissingSubjectAltName { location: String },

    /// SMTP session or delivery failure
    #[error("SMTP error: {details}")]
    Transport { details: String },

    /// SMTP server does not advertise any AUTH mechanism
    #[error("SMTP server {server} does not support authentication")]
    AuthNotSupported { server: String },

    /// SMTP server offers AUTH, but none of the mechanisms we speak
    #[error("No suitable authentication method found on {server}")]
    NoAuthMechanism { server: String },

    /// SMTP server rejected the configured credentials
    #[error("SMTP server {server} rejected the credentials: {details}")]
    CredentialsRejected { server: String, details: String },

    /// SMTP server does not offer STARTTLS
    #[error("SMTP server {server} does not offer STARTTLS")]
    StarttlsUnavailable { server: String },

    /// Generic I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl NotifyError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        NotifyError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a transport error
    pub fn transport(details: impl std::fmt::Display) -> Self {
        NotifyError::Transport {
            details: details.to_string(),
        }
    }

    /// Error class as reported in the log line before exit
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::Configuration { .. }
            | NotifyError::MissingSection { .. }
            | NotifyError::OptionType { .. } => ErrorKind::Configuration,
            NotifyError::Retrieval { .. }
            | NotifyError::Timeout { .. }
            | NotifyError::UnknownScheme { .. }
            | NotifyError::CertificateFile { .. }
            | NotifyError::Io { .. } => ErrorKind::Retrieval,
            NotifyError::Parse { .. } | NotifyError::MissingSubjectAltName { .. } => {
                ErrorKind::Parse
            }
            NotifyError::Transport { .. }
            | NotifyError::AuthNotSupported { .. }
            | NotifyError::NoAuthMechanism { .. }
            | NotifyError::CredentialsRejected { .. }
            | NotifyError::StarttlsUnavailable { .. } => ErrorKind::Transport,
        }
    }
}

/// Coarse error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Retrieval,
    Parse,
    Transport,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Retrieval => write!(f, "retrieval"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Transport => write!(f, "transport"),
        }
    }
}

impl From<toml::de::Error> for NotifyError {
    fn from(err: toml::de::Error) -> Self {
        NotifyError::config(format!("Failed to parse TOML config: {}", err))
    }
}

impl From<handlebars::RenderError> for NotifyError {
    fn from(err: handlebars::RenderError) -> Self {
        NotifyError::config(format!("Message template error: {}", err))
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotifyError::config(format!("Email address error: {}", err))
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::transport(format!("Email error: {}", err))
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::transport(err)
    }
}
