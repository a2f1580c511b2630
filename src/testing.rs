// Test helpers - mint certificates with exact validity windows
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509, X509Builder, X509NameBuilder};

/// Subject Alternative Name layout of a minted certificate
#[derive(Debug, Clone)]
pub enum SanSpec {
    Dns(Vec<String>),
    IpOnly(String),
    Absent,
}

/// Description of a test certificate
#[derive(Debug, Clone)]
pub struct CertSpec {
    pub common_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub san: SanSpec,
}

impl CertSpec {
    pub fn new(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        Self {
            common_name: "example.org".to_string(),
            not_before,
            not_after,
            san: SanSpec::Dns(vec!["example.org".to_string()]),
        }
    }

    pub fn with_hosts(mut self, hosts: &[&str]) -> Self {
        if let Some(first) = hosts.first() {
            self.common_name = first.to_string();
        }
        self.san = SanSpec::Dns(hosts.iter().map(|h| h.to_string()).collect());
        self
    }

    pub fn with_ip_only_san(mut self, ip: &str) -> Self {
        self.san = SanSpec::IpOnly(ip.to_string());
        self
    }

    pub fn without_san(mut self) -> Self {
        self.san = SanSpec::Absent;
        self
    }
}

/// Build a self-signed certificate and its key
pub fn build_certificate(spec: &CertSpec) -> (X509, PKey<Private>) {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let pkey = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();

    let mut name_builder = X509NameBuilder::new().unwrap();
    name_builder
        .append_entry_by_text("CN", &spec.common_name)
        .unwrap();
    let name = name_builder.build();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();

    let not_before = Asn1Time::from_unix(spec.not_before.timestamp()).unwrap();
    let not_after = Asn1Time::from_unix(spec.not_after.timestamp()).unwrap();
    builder.set_not_before(&not_before).unwrap();
    builder.set_not_after(&not_after).unwrap();
    builder.set_pubkey(&pkey).unwrap();

    let mut san = SubjectAlternativeName::new();
    let has_san = match &spec.san {
        SanSpec::Dns(hosts) => {
            for host in hosts {
                san.dns(host);
            }
            true
        }
        SanSpec::IpOnly(ip) => {
            san.ip(ip);
            true
        }
        SanSpec::Absent => false,
    };
    if has_san {
        let extension = san.build(&builder.x509v3_context(None, None)).unwrap();
        builder.append_extension(extension).unwrap();
    }

    builder.sign(&pkey, MessageDigest::sha256()).unwrap();
    (builder.build(), pkey)
}

/// Mint a self-signed certificate and return it as PEM text
pub fn mint_certificate(spec: &CertSpec) -> String {
    let (cert, _) = build_certificate(spec);
    String::from_utf8(cert.to_pem().unwrap()).unwrap()
}
