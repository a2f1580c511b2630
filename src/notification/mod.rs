// Notification channels
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

pub mod email;
pub mod registry;
pub mod script;

use crate::certificates::Certificate;
use crate::config::{Configuration, MAIL};
use crate::{NotifyError, Result};
use tracing::debug;

pub use email::{MailChannel, MailSettings, Mailer, SmtpSecurity, SmtpSession};
pub use registry::{CertificateRegistry, normalize_identifier};
pub use script::{PollField, PollQuery, PollValue, ScriptChannel, get_polls};

/// Common behavior of all channels
///
/// Every channel owns a registry of the certificates collected for this
/// run. `send` delivers whatever the channel produces and returns the number
/// of delivered items.
pub trait NotificationChannel {
    fn name(&self) -> &'static str;

    fn registry(&self) -> &CertificateRegistry;

    fn registry_mut(&mut self) -> &mut CertificateRegistry;

    fn register(&mut self, certificate: Certificate) -> String {
        self.registry_mut().register(certificate)
    }

    fn lookup(&self, id: &str) -> Option<&Certificate> {
        self.registry().lookup(id)
    }

    fn prune(&mut self) -> usize {
        self.registry_mut().prune()
    }

    fn send(&mut self) -> Result<usize>;
}

/// The channel selected for this run
pub enum Channel {
    Mail(MailChannel),
    Script(ScriptChannel),
}

impl Channel {
    /// Pick the channel
    ///
    /// Poll queries select the script channel. Otherwise mail must be
    /// enabled, in which case the SMTP session is opened right away.
    pub fn from_config(config: &Configuration, queries: &[String]) -> Result<Self> {
        if !queries.is_empty() {
            debug!("Using script channel for {} query(ies)", queries.len());
            return Ok(Channel::Script(ScriptChannel::new(queries.to_vec())));
        }

        if config.get_bool("mail-enable", None)? {
            let settings = MailSettings::from_config(config)?;
            return Ok(Channel::Mail(MailChannel::new(settings)?));
        }

        Err(NotifyError::config(format!(
            "No notification channel enabled: set mail-enable in [{}] or pass --poll",
            MAIL
        )))
    }

    fn inner(&self) -> &dyn NotificationChannel {
        match self {
            Channel::Mail(channel) => channel,
            Channel::Script(channel) => channel,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn NotificationChannel {
        match self {
            Channel::Mail(channel) => channel,
            Channel::Script(channel) => channel,
        }
    }
}

impl NotificationChannel for Channel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn registry(&self) -> &CertificateRegistry {
        self.inner().registry()
    }

    fn registry_mut(&mut self) -> &mut CertificateRegistry {
        self.inner_mut().registry_mut()
    }

    fn send(&mut self) -> Result<usize> {
        self.inner_mut().send()
    }
}
