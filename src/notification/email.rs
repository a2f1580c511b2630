// Mail Channel - expiry warnings over SMTP
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::registry::CertificateRegistry;
use super::NotificationChannel;
use crate::config::{Configuration, MAIL};
use crate::constants::{MAIL_SUBJECT, SMTP_TIMEOUT};
use crate::{NotifyError, Result};
use lettre::Message;
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::commands::Ehlo;
use lettre::transport::smtp::extension::ClientId;
use std::fmt;
use tracing::{debug, info, warn};

/// Transport security of the SMTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Unencrypted session
    Plain,
    /// Plaintext session upgraded before authentication
    Starttls,
    /// Encrypted from the first byte
    Tls,
}

impl From<&str> for SmtpSecurity {
    /// Unknown values fall back to STARTTLS
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLAIN" => SmtpSecurity::Plain,
            "TLS" | "SSL" => SmtpSecurity::Tls,
            "STARTTLS" => SmtpSecurity::Starttls,
            other => {
                warn!("Unknown smtp-security '{}', using STARTTLS", other);
                SmtpSecurity::Starttls
            }
        }
    }
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmtpSecurity::Plain => write!(f, "PLAIN"),
            SmtpSecurity::Starttls => write!(f, "STARTTLS"),
            SmtpSecurity::Tls => write!(f, "TLS"),
        }
    }
}

/// Mail channel settings from the `[mail]` section
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub user: String,
    pub password: String,
    pub sender: Mailbox,
    pub receiver: Mailbox,
}

impl MailSettings {
    /// Read the mail settings, failing when any of them is left empty
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |option: &'static str| -> Result<String> {
            let value = config.get_str(option, None)?.trim().to_string();
            if value.is_empty() {
                missing.push(option);
            }
            Ok(value)
        };

        let server = required("smtp-server")?;
        let user = required("smtp-user")?;
        let password = required("smtp-password")?;
        let sender = required("sender")?;
        let receiver = required("receiver")?;

        let port = config.get_int("smtp-port", None)?;
        if port == 0 {
            missing.push("smtp-port");
        }

        if !missing.is_empty() {
            return Err(NotifyError::config(format!(
                "Mail is enabled but [{}] is incomplete, set: {}",
                MAIL,
                missing.join(", ")
            )));
        }

        let port = u16::try_from(port)
            .map_err(|_| NotifyError::config(format!("Invalid smtp-port {}", port)))?;

        Ok(Self {
            server,
            port,
            security: SmtpSecurity::from(config.get_str("smtp-security", None)?.as_str()),
            user,
            password,
            sender: sender.parse()?,
            receiver: receiver.parse()?,
        })
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }
}

/// Something that transmits finished messages
pub trait Mailer: Send {
    fn deliver(&mut self, message: &Message) -> Result<()>;
}

/// An authenticated SMTP session
///
/// Opened once and reused for every message. The session is closed with
/// QUIT when it is dropped.
pub struct SmtpSession {
    server: String,
    connection: Option<SmtpConnection>,
}

impl SmtpSession {
    /// Connect, secure and authenticate
    pub fn open(settings: &MailSettings) -> Result<Self> {
        let hello = ClientId::default();
        let address = (settings.server.as_str(), settings.port);

        debug!(
            "Connecting to {}:{} using {}",
            settings.server, settings.port, settings.security
        );

        let connection = match settings.security {
            SmtpSecurity::Plain => {
                SmtpConnection::connect(address, Some(SMTP_TIMEOUT), &hello, None, None)?
            }
            SmtpSecurity::Tls => {
                let tls = TlsParameters::new(settings.server.clone())?;
                SmtpConnection::connect(address, Some(SMTP_TIMEOUT), &hello, Some(&tls), None)?
            }
            SmtpSecurity::Starttls => {
                let mut connection =
                    SmtpConnection::connect(address, Some(SMTP_TIMEOUT), &hello, None, None)?;
                if !connection.can_starttls() {
                    connection.abort();
                    return Err(NotifyError::StarttlsUnavailable {
                        server: settings.server.clone(),
                    });
                }
                let tls = TlsParameters::new(settings.server.clone())?;
                connection.starttls(&tls, &hello)?;
                debug!("Upgraded connection to {} with STARTTLS", settings.server);
                connection
            }
        };

        let mut session = Self {
            server: settings.server.clone(),
            connection: Some(connection),
        };
        session.authenticate(&hello, &settings.credentials())?;

        Ok(session)
    }

    fn connection(&mut self) -> Result<&mut SmtpConnection> {
        self.connection
            .as_mut()
            .ok_or_else(|| NotifyError::transport("SMTP session already closed"))
    }

    fn authenticate(&mut self, hello: &ClientId, credentials: &Credentials) -> Result<()> {
        let server = self.server.clone();
        let connection = self.connection()?;

        // ServerInfo drops mechanisms lettre cannot speak, so ask for the raw capabilities
        let capabilities = connection.command(Ehlo::new(hello.clone()))?;
        if !advertises_auth(capabilities.message()) {
            return Err(NotifyError::AuthNotSupported { server });
        }

        let mechanism = connection
            .server_info()
            .get_auth_mechanism(&[Mechanism::Plain, Mechanism::Login])
            .ok_or_else(|| NotifyError::NoAuthMechanism {
                server: server.clone(),
            })?;

        debug!("Authenticating to {} with {:?}", server, mechanism);
        connection
            .auth(&[mechanism], credentials)
            .map_err(|e| NotifyError::CredentialsRejected {
                server,
                details: e.to_string(),
            })?;

        Ok(())
    }

    /// Send QUIT and release the connection
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            match connection.quit() {
                Ok(_) => debug!("Closed SMTP session with {}", self.server),
                Err(e) => debug!("QUIT to {} failed: {}", self.server, e),
            }
        }
    }
}

/// EHLO reply lists an AUTH capability, whatever its mechanisms
fn advertises_auth<'a>(lines: impl IntoIterator<Item = &'a str>) -> bool {
    lines.into_iter().any(|line| {
        let keyword = line
            .split([' ', '='])
            .next()
            .unwrap_or_default();
        keyword.eq_ignore_ascii_case("AUTH")
    })
}

impl Mailer for SmtpSession {
    fn deliver(&mut self, message: &Message) -> Result<()> {
        self.connection()?
            .send(message.envelope(), &message.formatted())?;
        Ok(())
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pushes one message per certificate that is about to expire
pub struct MailChannel {
    registry: CertificateRegistry,
    settings: MailSettings,
    mailer: Box<dyn Mailer>,
}

impl MailChannel {
    /// Open the SMTP session for this run
    pub fn new(settings: MailSettings) -> Result<Self> {
        let session = SmtpSession::open(&settings)?;
        Ok(Self::with_mailer(settings, Box::new(session)))
    }

    /// Use an already opened mailer
    pub fn with_mailer(settings: MailSettings, mailer: Box<dyn Mailer>) -> Self {
        Self {
            registry: CertificateRegistry::new(),
            settings,
            mailer,
        }
    }

    pub fn settings(&self) -> &MailSettings {
        &self.settings
    }
}

fn build_message(settings: &MailSettings, body: String) -> Result<Message> {
    let message = Message::builder()
        .from(settings.sender.clone())
        .to(settings.receiver.clone())
        .subject(MAIL_SUBJECT)
        .header(header::ContentType::TEXT_PLAIN)
        .body(body)?;

    Ok(message)
}

impl NotificationChannel for MailChannel {
    fn name(&self) -> &'static str {
        "mail"
    }

    fn registry(&self) -> &CertificateRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut CertificateRegistry {
        &mut self.registry
    }

    fn send(&mut self) -> Result<usize> {
        let pruned = self.registry.prune();
        if pruned > 0 {
            debug!("Pruned {} duplicate certificate(s)", pruned);
        }

        for (_, cert) in self.registry.iter_mut() {
            cert.ensure_parsed()?;
        }

        let mut sent = 0;
        for (id, cert) in self.registry.iter_mut() {
            if !cert.should_warn()? {
                debug!("{}: no warning needed", id);
                continue;
            }

            let message = build_message(&self.settings, cert.message()?)?;
            info!(
                "Sending expiry warning for {} to {}",
                cert.location(),
                self.settings.receiver
            );
            self.mailer.deliver(&message)?;
            sent += 1;
        }

        Ok(sent)
    }
}
