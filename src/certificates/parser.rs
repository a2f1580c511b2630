// Certificate Parser - Decode PEM certificates and extract the fields we check
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::constants::{PEM_CERTIFICATE_TAG, SECONDS_PER_DAY};
use crate::{NotifyError, Result};
use chrono::{DateTime, Duration, Utc};
use ::pem::Pem;
use x509_parser::prelude::{FromDer, GeneralName, X509Certificate};

/// Fields of a decoded certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// DNS names of the Subject Alternative Name extension
    pub hosts: Vec<String>,
}

impl ParsedCertificate {
    /// Signed time left until `not_after`, negative once expired
    pub fn until_expiry_at(&self, now: DateTime<Utc>) -> Duration {
        self.not_after.signed_duration_since(now)
    }

    /// Whole days until expiry, rounded towards negative infinity
    pub fn valid_days_at(&self, now: DateTime<Utc>) -> i64 {
        self.until_expiry_at(now)
            .num_milliseconds()
            .div_euclid(SECONDS_PER_DAY * 1000)
    }

    /// Strictly inside the validity window
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before < now && now < self.not_after
    }
}

/// Decode the first certificate block of a PEM document
pub fn decode_pem(location: &str, text: &[u8]) -> Result<Pem> {
    let blocks = ::pem::parse_many(text).map_err(|e| NotifyError::Retrieval {
        location: location.to_string(),
        details: format!("invalid PEM data: {}", e),
    })?;

    blocks
        .into_iter()
        .find(|block| block.tag() == PEM_CERTIFICATE_TAG)
        .ok_or_else(|| NotifyError::Retrieval {
            location: location.to_string(),
            details: "no PEM certificate found".to_string(),
        })
}

/// Wrap DER bytes as a PEM certificate
pub fn der_to_pem(der_bytes: &[u8]) -> Pem {
    Pem::new(PEM_CERTIFICATE_TAG, der_bytes.to_vec())
}

/// Parse a PEM certificate
pub fn parse_pem(location: &str, pem: &Pem) -> Result<ParsedCertificate> {
    parse_der(location, pem.contents())
}

/// Parse a single certificate from DER bytes
pub fn parse_der(location: &str, der_bytes: &[u8]) -> Result<ParsedCertificate> {
    let parse_error = |details: String| NotifyError::Parse {
        location: location.to_string(),
        details,
    };

    let (_, cert) = X509Certificate::from_der(der_bytes)
        .map_err(|e| parse_error(format!("invalid X.509 structure: {}", e)))?;

    // A missing extension is an error, an extension without DNS names is not
    let san = cert
        .subject_alternative_name()
        .map_err(|e| parse_error(format!("invalid extensions: {}", e)))?
        .ok_or_else(|| NotifyError::MissingSubjectAltName {
            location: location.to_string(),
        })?;

    let hosts = san
        .value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(dns.to_string()),
            _ => None,
        })
        .collect();

    let validity = cert.validity();
    let not_before = DateTime::from_timestamp(validity.not_before.timestamp(), 0)
        .ok_or_else(|| parse_error("notBefore out of range".to_string()))?;
    let not_after = DateTime::from_timestamp(validity.not_after.timestamp(), 0)
        .ok_or_else(|| parse_error("notAfter out of range".to_string()))?;

    Ok(ParsedCertificate {
        subject: cert.subject().to_string(),
        not_before,
        not_after,
        hosts,
    })
}
