// Certificate Registry - keyed certificates shared by all channels
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::certificates::Certificate;
use tracing::{debug, warn};

/// Turn a location into an identifier usable in poll queries
///
/// Everything except ASCII letters, digits, `-` and `_` becomes `_`, so
/// `www.example.org` is registered as `www_example_org`.
pub fn normalize_identifier(location: &str) -> String {
    location
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Certificates keyed by normalized location, in registration order
#[derive(Debug, Default)]
pub struct CertificateRegistry {
    entries: Vec<(String, Certificate)>,
}

impl CertificateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a certificate and return its identifier
    ///
    /// Registering the same identifier again replaces the certificate but
    /// keeps its original position.
    pub fn register(&mut self, certificate: Certificate) -> String {
        let id = normalize_identifier(certificate.location());

        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => {
                if entry.1.location() == certificate.location() {
                    debug!("Replacing registered certificate {}", id);
                } else {
                    warn!(
                        "{} and {} share the identifier {}, only {} will be checked",
                        entry.1.location(),
                        certificate.location(),
                        id,
                        certificate.location()
                    );
                }
                entry.1 = certificate;
            }
            None => {
                debug!("Registered {} as {}", certificate.location(), id);
                self.entries.push((id.clone(), certificate));
            }
        }

        id
    }

    pub fn lookup(&self, id: &str) -> Option<&Certificate> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, cert)| cert)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut Certificate> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, cert)| cert)
    }

    /// Registered identifiers in registration order
    pub fn identifiers(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Drop entries holding a certificate that is already registered
    ///
    /// The first registered entry of each certificate survives. Returns the
    /// number of removed entries.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        let mut kept: Vec<(String, Certificate)> = Vec::with_capacity(before);

        for (id, cert) in self.entries.drain(..) {
            match kept.iter().find(|(_, existing)| *existing == cert) {
                Some((first, _)) => {
                    debug!("Pruning {}: same certificate as {}", id, first);
                }
                None => kept.push((id, cert)),
            }
        }

        self.entries = kept;
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Certificate)> {
        self.entries.iter().map(|(key, cert)| (key.as_str(), cert))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Certificate)> {
        self.entries
            .iter_mut()
            .map(|(key, cert)| (key.as_str(), cert))
    }
}
