// Certificate - one retrieved certificate with its expiry predicates
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::parser::{self, ParsedCertificate};
use super::retrieval;
use crate::config::Configuration;
use crate::{NotifyError, Result};
use chrono::{DateTime, Duration, Utc};
use handlebars::Handlebars;
use pem::Pem;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How a location is turned into a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Connect to the location and take the certificate it presents
    Host,
    /// Read a PEM file from the location
    Files,
}

impl FromStr for RetrievalMode {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(RetrievalMode::Host),
            "files" | "file" => Ok(RetrievalMode::Files),
            other => Err(NotifyError::config(format!(
                "Unknown poll-mode '{}' (use host or files)",
                other
            ))),
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::Host => write!(f, "host"),
            RetrievalMode::Files => write!(f, "files"),
        }
    }
}

/// Effective certificate settings of a location
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateSettings {
    pub mode: RetrievalMode,
    pub max_age: i64,
    pub cert_file: String,
    pub message_template: String,
}

impl CertificateSettings {
    /// Resolve settings, preferring values of the override section
    pub fn from_config(config: &Configuration, section: Option<&str>) -> Result<Self> {
        Ok(Self {
            mode: config.get_str("poll-mode", section)?.parse()?,
            max_age: config.get_int("max-age", section)?,
            cert_file: config.get_str("cert-file", section)?,
            message_template: config.get_str("message-template", section)?,
        })
    }
}

/// A retrieved certificate
///
/// The raw PEM is always present. The decoded fields are filled in exactly
/// once, either right after retrieval or by the first predicate that needs
/// them (`ensure_parsed`).
#[derive(Debug, Clone)]
pub struct Certificate {
    location: String,
    settings: CertificateSettings,
    pem: Pem,
    parsed: Option<ParsedCertificate>,
}

impl Certificate {
    /// Retrieve the certificate of a location
    pub async fn retrieve(location: &str, settings: CertificateSettings) -> Result<Self> {
        let pem = match settings.mode {
            RetrievalMode::Host => retrieval::fetch_host(location).await?,
            RetrievalMode::Files => retrieval::read_file(location, &settings.cert_file)?,
        };

        Ok(Self::from_pem(location, settings, pem))
    }

    /// Wrap an already retrieved certificate
    pub fn from_pem(location: &str, settings: CertificateSettings, pem: Pem) -> Self {
        Self {
            location: location.to_string(),
            settings,
            pem,
            parsed: None,
        }
    }

    /// Wrap PEM text, failing if it holds no certificate
    pub fn from_pem_text(location: &str, settings: CertificateSettings, text: &str) -> Result<Self> {
        let pem = parser::decode_pem(location, text.as_bytes())?;
        Ok(Self::from_pem(location, settings, pem))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn mode(&self) -> RetrievalMode {
        self.settings.mode
    }

    pub fn max_age(&self) -> i64 {
        self.settings.max_age
    }

    pub fn settings(&self) -> &CertificateSettings {
        &self.settings
    }

    pub fn pem(&self) -> &Pem {
        &self.pem
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.is_some()
    }

    /// Decoded fields, if already parsed
    pub fn parsed(&self) -> Option<&ParsedCertificate> {
        self.parsed.as_ref()
    }

    /// Decode the certificate unless that already happened
    pub fn ensure_parsed(&mut self) -> Result<&ParsedCertificate> {
        if self.parsed.is_none() {
            let parsed = parser::parse_pem(&self.location, &self.pem)?;
            debug!(
                "Parsed certificate of {} ({}): valid {} - {}, hosts [{}]",
                self.location,
                parsed.subject,
                parsed.not_before,
                parsed.not_after,
                parsed.hosts.join(", ")
            );
            self.parsed = Some(parsed);
        }

        // Filled in above
        self.parsed.as_ref().ok_or_else(|| NotifyError::Parse {
            location: self.location.clone(),
            details: "certificate not parsed".to_string(),
        })
    }

    /// DNS names the certificate is valid for
    pub fn hosts(&mut self) -> Result<Vec<String>> {
        Ok(self.ensure_parsed()?.hosts.clone())
    }

    /// Time left until expiry, negative once expired
    pub fn until_expiry(&mut self) -> Result<Duration> {
        self.until_expiry_at(Utc::now())
    }

    pub fn until_expiry_at(&mut self, now: DateTime<Utc>) -> Result<Duration> {
        Ok(self.ensure_parsed()?.until_expiry_at(now))
    }

    /// Whole days until expiry, rounded down
    pub fn valid_days(&mut self) -> Result<i64> {
        self.valid_days_at(Utc::now())
    }

    pub fn valid_days_at(&mut self, now: DateTime<Utc>) -> Result<i64> {
        Ok(self.ensure_parsed()?.valid_days_at(now))
    }

    /// Current time lies strictly between notBefore and notAfter
    pub fn is_valid(&mut self) -> Result<bool> {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&mut self, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.ensure_parsed()?.is_valid_at(now))
    }

    /// Expiry is within `max-age` days, or already passed
    pub fn should_warn(&mut self) -> Result<bool> {
        self.should_warn_at(Utc::now())
    }

    pub fn should_warn_at(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let days = self.valid_days_at(now)?;
        debug!(
            "{}: {} days left, max age {} days",
            self.location, days, self.settings.max_age
        );
        Ok(days <= self.settings.max_age)
    }

    /// Render the configured message template
    pub fn message(&mut self) -> Result<String> {
        let template = self.settings.message_template.clone();
        self.render_message(&template)
    }

    /// Render a message template for this certificate
    ///
    /// Unknown placeholders fail instead of rendering as empty text.
    pub fn render_message(&mut self, template: &str) -> Result<String> {
        self.render_message_at(template, Utc::now())
    }

    pub fn render_message_at(&mut self, template: &str, now: DateTime<Utc>) -> Result<String> {
        let max_age = self.settings.max_age;
        let location = self.location.clone();
        let parsed = self.ensure_parsed()?;
        let remaining = parsed.until_expiry_at(now);

        let data = serde_json::json!({
            "host": location,
            "valid_days": parsed.valid_days_at(now),
            "valid_seconds": remaining.num_milliseconds() as f64 / 1000.0,
            "valid": parsed.is_valid_at(now),
            "max_age": max_age,
            "hosts": parsed.hosts.join(", "),
            "nl": "\n",
        });

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Ok(handlebars.render_template(template, &data)?)
    }
}

/// Certificates are equal when they hold the same DER encoding
impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.pem.contents() == other.pem.contents()
    }
}

impl Eq for Certificate {}
