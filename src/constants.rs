// certnotify - TLS certificate expiry checker and notifier
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

//! Static tables and fixed values
//!
//! Everything here is built once and never mutated: the scheme to port table
//! used when a host location carries no explicit port, network timeouts and
//! the vocabulary of the poll query grammar.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Host retrieval
// =============================================================================

/// Scheme assumed when a host location has no `scheme://` prefix
pub const DEFAULT_SCHEME: &str = "https";

/// TCP connect timeout for host retrieval
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS handshake timeout for host retrieval
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static! {
    /// Well-known ports per URI scheme
    pub static ref DEFAULT_PORTS: HashMap<&'static str, u16> = {
        let mut ports = HashMap::new();
        ports.insert("http", 80);
        ports.insert("https", 443);
        ports.insert("ftp", 21);
        ports.insert("sftp", 22);
        ports.insert("ftps", 990);
        ports.insert("smtp", 25);
        ports.insert("smtps", 465);
        ports.insert("pop3", 110);
        ports.insert("pop3s", 995);
        ports.insert("imap", 143);
        ports.insert("imaps", 993);
        ports.insert("ldap", 389);
        ports.insert("ldaps", 636);
        ports.insert("ssh", 22);
        ports.insert("telnet", 23);
        ports.insert("nntp", 119);
        ports.insert("gopher", 70);
        ports.insert("rtsp", 554);
        ports.insert("mysql", 3306);
        ports.insert("postgresql", 5432);
        ports.insert("redis", 6379);
        ports.insert("mongodb", 27017);
        ports.insert("smb", 445);
        ports
    };
}

/// Look up the default port for a scheme
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS.get(scheme.to_ascii_lowercase().as_str()).copied()
}

// =============================================================================
// Certificates
// =============================================================================

/// Seconds per day, used for floor division of the remaining validity
pub const SECONDS_PER_DAY: i64 = 86_400;

/// PEM tag of an X.509 certificate
pub const PEM_CERTIFICATE_TAG: &str = "CERTIFICATE";

// =============================================================================
// Notification
// =============================================================================

/// Subject line of expiry warning mails
pub const MAIL_SUBJECT: &str = "Certificate expiry";

/// SMTP connect timeout
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix that turns a location into a section reference
pub const SECTION_PREFIX: &str = "section:";

/// Registry-wide poll query
pub const POLL_ALL: &str = "certs";

/// Placeholder for the certificate identifier in listed poll patterns
pub const POLL_ID_PLACEHOLDER: &str = "<id>";
