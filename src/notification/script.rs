// Script Channel - answers poll queries instead of pushing messages
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::NotificationChannel;
use super::registry::CertificateRegistry;
use crate::Result;
use crate::certificates::Certificate;
use crate::constants::{POLL_ALL, POLL_ID_PLACEHOLDER};
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Per-certificate value a query can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollField {
    ValidDays,
    ValidSeconds,
    Valid,
    MaxAge,
    ShouldWarn,
}

impl PollField {
    pub const ALL: [PollField; 5] = [
        PollField::ValidDays,
        PollField::ValidSeconds,
        PollField::Valid,
        PollField::MaxAge,
        PollField::ShouldWarn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollField::ValidDays => "valid_days",
            PollField::ValidSeconds => "valid_seconds",
            PollField::Valid => "valid",
            PollField::MaxAge => "max-age",
            PollField::ShouldWarn => "should_warn",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    fn evaluate(&self, cert: &mut Certificate) -> Result<PollValue> {
        Ok(match self {
            PollField::ValidDays => PollValue::Integer(cert.valid_days()?),
            PollField::ValidSeconds => {
                PollValue::Float(cert.until_expiry()?.num_milliseconds() as f64 / 1000.0)
            }
            PollField::Valid => PollValue::Boolean(cert.is_valid()?),
            PollField::MaxAge => PollValue::Integer(cert.max_age()),
            PollField::ShouldWarn => PollValue::Boolean(cert.should_warn()?),
        })
    }
}

/// A parsed poll query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollQuery {
    /// `certs`
    All,
    /// `cert.<id>.<field>`
    Field { id: String, field: PollField },
    Invalid,
}

impl PollQuery {
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        if query == POLL_ALL {
            return PollQuery::All;
        }

        let segments: Vec<&str> = query.split('.').collect();
        match segments.as_slice() {
            ["cert", id, field] if !id.is_empty() => match PollField::from_name(field) {
                Some(field) => PollQuery::Field {
                    id: id.to_string(),
                    field,
                },
                None => PollQuery::Invalid,
            },
            _ => PollQuery::Invalid,
        }
    }
}

/// Answer to a single query
#[derive(Debug, Clone, PartialEq)]
pub enum PollValue {
    Identifiers(Vec<String>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Query not recognised or certificate not registered
    None,
}

impl fmt::Display for PollValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollValue::Identifiers(ids) => write!(f, "{}", ids.join(" ")),
            PollValue::Integer(value) => write!(f, "{}", value),
            PollValue::Float(value) => write!(f, "{}", value),
            PollValue::Boolean(value) => write!(f, "{}", value),
            PollValue::None => write!(f, "none"),
        }
    }
}

/// Recognised query patterns
pub fn get_polls() -> Vec<String> {
    let mut polls = vec![POLL_ALL.to_string()];
    polls.extend(
        PollField::ALL
            .iter()
            .map(|field| format!("cert.{}.{}", POLL_ID_PLACEHOLDER, field.as_str())),
    );
    polls
}

/// Channel for external scripts pulling single values
#[derive(Debug, Default)]
pub struct ScriptChannel {
    registry: CertificateRegistry,
    queries: Vec<String>,
}

impl ScriptChannel {
    /// Channel answering `queries` on `send`
    pub fn new(queries: Vec<String>) -> Self {
        Self {
            registry: CertificateRegistry::new(),
            queries,
        }
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Answer each query, in order
    ///
    /// Misses answer `none` without failing the batch. A certificate that
    /// cannot be parsed fails the whole call.
    pub fn poll(&mut self, queries: &[String]) -> Result<Vec<PollValue>> {
        for (_, cert) in self.registry.iter_mut() {
            cert.ensure_parsed()?;
        }

        queries.iter().map(|query| self.answer(query)).collect()
    }

    pub fn get_polls(&self) -> Vec<String> {
        get_polls()
    }

    /// Answer the configured queries, one line each
    pub fn write_results<W: Write>(&mut self, out: &mut W) -> Result<usize> {
        let queries = self.queries.clone();
        let values = self.poll(&queries)?;
        for value in &values {
            writeln!(out, "{}", value)?;
        }
        Ok(values.len())
    }

    fn answer(&mut self, query: &str) -> Result<PollValue> {
        match PollQuery::parse(query) {
            PollQuery::All => Ok(PollValue::Identifiers(self.registry.identifiers())),
            PollQuery::Field { id, field } => match self.registry.lookup_mut(&id) {
                Some(cert) => {
                    let value = field.evaluate(cert)?;
                    debug!("{} = {}", query, value);
                    Ok(value)
                }
                None => {
                    warn!("No certificate registered as '{}' ({})", id, query);
                    Ok(PollValue::None)
                }
            },
            PollQuery::Invalid => {
                warn!("Unknown poll query '{}'", query);
                Ok(PollValue::None)
            }
        }
    }
}

impl NotificationChannel for ScriptChannel {
    fn name(&self) -> &'static str {
        "script"
    }

    fn registry(&self) -> &CertificateRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut CertificateRegistry {
        &mut self.registry
    }

    fn send(&mut self) -> Result<usize> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_results(&mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::{CertificateSettings, RetrievalMode};
    use crate::testing::{CertSpec, mint_certificate};
    use chrono::{Duration, Utc};

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|q| q.to_string()).collect()
    }

    fn cert(location: &str, not_after_days: i64) -> Certificate {
        let now = Utc::now();
        let settings = CertificateSettings {
            mode: RetrievalMode::Host,
            max_age: 14,
            cert_file: "cert.pem".to_string(),
            message_template: "{{host}}".to_string(),
        };
        let pem = mint_certificate(&CertSpec::new(
            now - Duration::days(1),
            now + Duration::days(not_after_days) + Duration::hours(1),
        ));
        Certificate::from_pem_text(location, settings, &pem).unwrap()
    }

    fn channel() -> ScriptChannel {
        let mut channel = ScriptChannel::default();
        channel.register(cert("a.example.org", 7));
        channel.register(cert("b.example.org", 60));
        channel
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(PollQuery::parse("certs"), PollQuery::All);
        assert_eq!(
            PollQuery::parse("cert.a_example_org.valid_days"),
            PollQuery::Field {
                id: "a_example_org".to_string(),
                field: PollField::ValidDays,
            }
        );
        assert_eq!(
            PollQuery::parse("cert.x.max-age"),
            PollQuery::Field {
                id: "x".to_string(),
                field: PollField::MaxAge,
            }
        );
        assert_eq!(PollQuery::parse("cert.x.issuer"), PollQuery::Invalid);
        assert_eq!(PollQuery::parse("cert..valid"), PollQuery::Invalid);
        assert_eq!(PollQuery::parse("cert.x"), PollQuery::Invalid);
        assert_eq!(PollQuery::parse("not.a.real.query"), PollQuery::Invalid);
        assert_eq!(PollQuery::parse("certificate.x.valid"), PollQuery::Invalid);
        assert_eq!(PollQuery::parse(""), PollQuery::Invalid);
    }

    #[test]
    fn test_poll_certs() {
        let mut channel = channel();
        let values = channel.poll(&queries(&["certs"])).unwrap();

        assert_eq!(
            values,
            vec![PollValue::Identifiers(vec![
                "a_example_org".to_string(),
                "b_example_org".to_string()
            ])]
        );
    }

    #[test]
    fn test_poll_fields_in_order() {
        let mut channel = channel();
        let values = channel
            .poll(&queries(&[
                "cert.a_example_org.valid_days",
                "cert.a_example_org.should_warn",
                "cert.b_example_org.should_warn",
                "cert.b_example_org.max-age",
                "cert.b_example_org.valid",
            ]))
            .unwrap();

        assert_eq!(
            values,
            vec![
                PollValue::Integer(7),
                PollValue::Boolean(true),
                PollValue::Boolean(false),
                PollValue::Integer(14),
                PollValue::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_poll_valid_seconds() {
        let mut channel = channel();
        let values = channel
            .poll(&queries(&["cert.a_example_org.valid_seconds"]))
            .unwrap();

        match values[0] {
            PollValue::Float(seconds) => {
                assert!(seconds > (7 * 86_400) as f64);
                assert!(seconds < (8 * 86_400) as f64);
            }
            ref other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_poll_misses_do_not_abort() {
        let mut channel = channel();
        let values = channel
            .poll(&queries(&[
                "cert.unknownid.valid",
                "not.a.real.query",
                "cert.a_example_org.max-age",
            ]))
            .unwrap();

        assert_eq!(
            values,
            vec![PollValue::None, PollValue::None, PollValue::Integer(14)]
        );
    }

    #[test]
    fn test_poll_empty_batch() {
        let mut channel = channel();
        assert!(channel.poll(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_get_polls() {
        let polls = get_polls();

        assert_eq!(polls.len(), 6);
        assert_eq!(polls[0], "certs");
        assert!(polls.contains(&"cert.<id>.valid_days".to_string()));
        assert!(polls.contains(&"cert.<id>.max-age".to_string()));
        assert_eq!(ScriptChannel::default().get_polls(), polls);
    }

    #[test]
    fn test_write_results() {
        let mut channel = channel();
        channel.queries = queries(&["cert.a_example_org.valid_days", "certs", "bogus"]);

        let mut out = Vec::new();
        assert_eq!(channel.write_results(&mut out).unwrap(), 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "7\na_example_org b_example_org\nnone\n"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PollValue::None.to_string(), "none");
        assert_eq!(PollValue::Boolean(false).to_string(), "false");
        assert_eq!(PollValue::Integer(-3).to_string(), "-3");
    }
}
