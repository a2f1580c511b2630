// Certificate collection shared by the notify and poll commands
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::Result;
use crate::certificates::{Certificate, CertificateSettings};
use crate::config::Configuration;
use crate::locations::LocationResolver;
use crate::notification::NotificationChannel;
use tracing::info;

/// Retrieve the certificate of every configured location into `channel`
///
/// Locations are handled one after another in configured order. The first
/// failure ends the run.
pub async fn collect_certificates<C>(config: &Configuration, channel: &mut C) -> Result<usize>
where
    C: NotificationChannel + Send,
{
    let auto_load = config.get_bool("auto-load-certs", None)?;
    let locations = LocationResolver::new(config).resolve()?;

    for resolved in &locations {
        info!("Processing {}", resolved);

        let settings = CertificateSettings::from_config(config, resolved.section.as_deref())?;
        let mut certificate = Certificate::retrieve(&resolved.location, settings).await?;
        if auto_load {
            certificate.ensure_parsed()?;
        }

        channel.register(certificate);
    }

    Ok(locations.len())
}
