// Shared helpers for the integration tests
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

#![allow(dead_code)]

#[path = "../../src/testing.rs"]
mod testing;

pub use testing::{CertSpec, SanSpec, build_certificate, mint_certificate};

use certnotify::config::{Configuration, MAIL};
use certnotify::notification::Mailer;
use lettre::Message;
use std::sync::{Arc, Mutex};

/// Mailer keeping every delivered message as text
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl Mailer for RecordingMailer {
    fn deliver(&mut self, message: &Message) -> certnotify::Result<()> {
        let text = String::from_utf8_lossy(&message.formatted()).into_owned();
        self.sent.lock().unwrap().push(text);
        Ok(())
    }
}

/// Add a complete `[mail]` section
pub fn enable_mail(config: &mut Configuration) {
    config.set(MAIL, "mail-enable", true);
    config.set(MAIL, "smtp-server", "smtp.example.com");
    config.set(MAIL, "smtp-user", "notifier");
    config.set(MAIL, "smtp-password", "secret");
    config.set(MAIL, "sender", "certs@example.com");
    config.set(MAIL, "receiver", "admin@example.com");
}
