// Certificate retrieval - fetch the presented certificate of a host or read it from disk
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::parser::{decode_pem, der_to_pem};
use crate::constants::{CONNECT_TIMEOUT, DEFAULT_SCHEME, HANDSHAKE_TIMEOUT, default_port};
use crate::{NotifyError, Result};
use pem::Pem;
use rustls::ClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use url::{Host, Url};

/// Split a host location into host name and port
///
/// Locations without a scheme are treated as https. Without an explicit port
/// the well-known port of the scheme is used.
pub fn parse_uri(location: &str) -> Result<(String, u16)> {
    let with_scheme = if location.contains("://") {
        location.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, location)
    };

    let url = Url::parse(&with_scheme).map_err(|e| NotifyError::Retrieval {
        location: location.to_string(),
        details: format!("invalid address: {}", e),
    })?;

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => {
            return Err(NotifyError::Retrieval {
                location: location.to_string(),
                details: "no host name".to_string(),
            });
        }
    };

    let port = match url.port() {
        Some(port) => port,
        None => default_port(url.scheme()).ok_or_else(|| NotifyError::UnknownScheme {
            location: location.to_string(),
            scheme: url.scheme().to_string(),
        })?,
    };

    Ok((host, port))
}

/// Fetch the leaf certificate a host presents during the TLS handshake
///
/// The peer certificate is not verified: expired and self-signed certificates
/// are exactly what we want to look at.
pub async fn fetch_host(location: &str) -> Result<Pem> {
    let (host, port) = parse_uri(location)?;
    debug!("Connecting to {}:{}", host, port);

    let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
        .await
        .map_err(|_| NotifyError::Timeout {
            location: location.to_string(),
            duration: CONNECT_TIMEOUT,
        })?
        .map_err(|e| NotifyError::Retrieval {
            location: location.to_string(),
            details: format!("connection to {}:{} failed: {}", host, port, e),
        })?;

    let connector = TlsConnector::from(Arc::new(inspecting_client_config(location)?));

    let server_name = ServerName::try_from(host.clone()).map_err(|_| NotifyError::Retrieval {
        location: location.to_string(),
        details: format!("invalid server name {}", host),
    })?;

    let tls_stream = timeout(HANDSHAKE_TIMEOUT, connector.connect(server_name, stream))
        .await
        .map_err(|_| NotifyError::Timeout {
            location: location.to_string(),
            duration: HANDSHAKE_TIMEOUT,
        })?
        .map_err(|e| NotifyError::Retrieval {
            location: location.to_string(),
            details: format!("TLS handshake failed: {}", e),
        })?;

    let (_io, connection) = tls_stream.get_ref();
    let leaf = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| NotifyError::Retrieval {
            location: location.to_string(),
            details: "no certificate received from server".to_string(),
        })?;

    Ok(der_to_pem(leaf.as_ref()))
}

/// Read a PEM certificate from a directory (using `cert_file`) or a file path
pub fn read_file(location: &str, cert_file: &str) -> Result<Pem> {
    let path = Path::new(location);
    let path = if path.is_dir() {
        path.join(cert_file)
    } else {
        path.to_path_buf()
    };
    debug!("Reading certificate file {:?}", path);

    let contents = fs::read(&path).map_err(|source| NotifyError::CertificateFile {
        path: path.clone(),
        source,
    })?;

    decode_pem(location, &contents)
}

fn inspecting_client_config(location: &str) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| NotifyError::Retrieval {
            location: location.to_string(),
            details: format!("TLS setup failed: {}", e),
        })?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth();

    Ok(config)
}

/// Verifier that accepts whatever certificate the server presents
#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA1,
            rustls::SignatureScheme::ECDSA_SHA1_Legacy,
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
            rustls::SignatureScheme::ED448,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CertSpec, build_certificate, mint_certificate};
    use chrono::{Duration, Utc};
    use rustls::ServerConfig;
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use tempfile::TempDir;
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    #[test]
    fn test_parse_uri_defaults_to_https() {
        assert_eq!(
            parse_uri("example.com").unwrap(),
            ("example.com".to_string(), 443)
        );
    }

    #[test]
    fn test_parse_uri_scheme_ports() {
        assert_eq!(parse_uri("smtps://mail.example.com").unwrap().1, 465);
        assert_eq!(parse_uri("imaps://mail.example.com").unwrap().1, 993);
        assert_eq!(parse_uri("ldaps://dir.example.com").unwrap().1, 636);
        assert_eq!(parse_uri("postgresql://db.example.com").unwrap().1, 5432);
    }

    #[test]
    fn test_parse_uri_explicit_port() {
        assert_eq!(
            parse_uri("example.com:8443").unwrap(),
            ("example.com".to_string(), 8443)
        );
        assert_eq!(
            parse_uri("https://example.com:443/path").unwrap(),
            ("example.com".to_string(), 443)
        );
        assert_eq!(
            parse_uri("127.0.0.1:4433").unwrap(),
            ("127.0.0.1".to_string(), 4433)
        );
    }

    #[test]
    fn test_parse_uri_unknown_scheme() {
        let err = parse_uri("gemini://example.com").unwrap_err();
        assert!(matches!(err, NotifyError::UnknownScheme { .. }));
    }

    #[test]
    fn test_read_file_from_directory_and_path() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let pem_text = mint_certificate(&CertSpec::new(now, now + Duration::days(10)));
        fs::write(dir.path().join("fullchain.pem"), &pem_text).unwrap();

        let location = dir.path().to_str().unwrap();
        let from_dir = read_file(location, "fullchain.pem").unwrap();

        let file = dir.path().join("fullchain.pem");
        let from_path = read_file(file.to_str().unwrap(), "ignored.pem").unwrap();

        assert_eq!(from_dir, from_path);
    }

    #[test]
    fn test_read_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_file(dir.path().to_str().unwrap(), "cert.pem").unwrap_err();
        assert!(matches!(err, NotifyError::CertificateFile { .. }));
    }

    #[test]
    fn test_read_file_not_pem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cert.pem"), "hello").unwrap();

        let err = read_file(dir.path().to_str().unwrap(), "cert.pem").unwrap_err();
        assert!(matches!(err, NotifyError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_fetch_host_accepts_expired_self_signed() {
        let now = Utc::now();
        let spec = CertSpec::new(now - Duration::days(60), now - Duration::days(2))
            .with_hosts(&["localhost"]);
        let (cert, key) = build_certificate(&spec);
        let cert_der = cert.to_der().unwrap();

        let server_config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(
            vec![CertificateDer::from(cert_der.clone())],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.private_key_to_pkcs8().unwrap())),
        )
        .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(server_config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ = acceptor.accept(stream).await;
        });

        let pem = fetch_host(&format!("127.0.0.1:{}", port)).await.unwrap();
        server.await.unwrap();

        assert_eq!(pem.tag(), "CERTIFICATE");
        assert_eq!(pem.contents(), cert_der.as_slice());
    }

    #[tokio::test]
    async fn test_fetch_host_connection_refused() {
        // Bind and drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = fetch_host(&format!("127.0.0.1:{}", port)).await.unwrap_err();
        assert!(matches!(err, NotifyError::Retrieval { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_host_public() {
        let pem = fetch_host("https://www.rust-lang.org").await.unwrap();
        assert_eq!(pem.tag(), "CERTIFICATE");
    }
}
