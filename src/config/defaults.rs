// Option defaults and help text
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::ConfigValue;
use lazy_static::lazy_static;

/// Section holding run-wide settings
pub const GENERAL: &str = "general";

/// Section holding the global certificate settings
pub const CERTIFICATES: &str = "certificates";

/// Section holding the mail channel settings
pub const MAIL: &str = "mail";

/// Sections with a fixed meaning; every other section is an override section
pub const FIXED_SECTIONS: &[&str] = &[GENERAL, CERTIFICATES, MAIL];

/// Template used when `message-template` is not configured
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "The certificate for {{host}} expires in {{valid_days}} days \
(warning threshold: {{max_age}} days, currently valid: {{valid}}).{{nl}}It covers: {{hosts}}";

/// Static description of one option
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub section: &'static str,
    pub default: ConfigValue,
    pub help: &'static str,
}

lazy_static! {
    /// All known options in the order they are written to a fresh config file
    pub static ref OPTIONS: Vec<OptionSpec> = vec![
        OptionSpec {
            name: "check-interval",
            section: GENERAL,
            default: ConfigValue::Int(24),
            help: "How often the certificates should be checked, in hours.\n\
                   Only used when installing the scheduler entry.\n\
                   Default: 24",
        },
        OptionSpec {
            name: "auto-load-certs",
            section: GENERAL,
            default: ConfigValue::Bool(true),
            help: "Parse certificates as soon as they are retrieved. When false they are\n\
                   parsed on first use.\n\
                   Default: true",
        },
        OptionSpec {
            name: "poll-mode",
            section: CERTIFICATES,
            default: ConfigValue::Str("host".to_string()),
            help: "How certificates are retrieved. Can be overridden per custom section.\n\
                   host:  connect to each location and inspect the certificate it presents\n\
                   files: read certificates from the given directories or files\n\
                   Default: host",
        },
        OptionSpec {
            name: "locations",
            section: CERTIFICATES,
            default: ConfigValue::List(Vec::new()),
            help: "List of locations.\n\
                   In host mode these are urls or host names, e.g. https://example.org\n\
                   In files mode these are directories, e.g. /etc/letsencrypt/live/example.org\n\
                   Prefix a custom section name with 'section:' to use its own settings,\n\
                   e.g. section:example_org",
        },
        OptionSpec {
            name: "max-age",
            section: CERTIFICATES,
            default: ConfigValue::Int(32),
            help: "Number of days before expiry from which warnings are issued.\n\
                   Default: 32",
        },
        OptionSpec {
            name: "cert-file",
            section: CERTIFICATES,
            default: ConfigValue::Str("cert.pem".to_string()),
            help: "Certificate file name read from each location directory in files mode.\n\
                   Default: cert.pem",
        },
        OptionSpec {
            name: "message-template",
            section: CERTIFICATES,
            default: ConfigValue::Str(DEFAULT_MESSAGE_TEMPLATE.to_string()),
            help: "Warning message. Available placeholders: {{host}}, {{valid_days}},\n\
                   {{valid_seconds}}, {{valid}}, {{max_age}}, {{hosts}} and {{nl}} (newline).",
        },
        OptionSpec {
            name: "mail-enable",
            section: MAIL,
            default: ConfigValue::Bool(false),
            help: "Send warnings by mail.\n\
                   Default: false",
        },
        OptionSpec {
            name: "sender",
            section: MAIL,
            default: ConfigValue::Str(String::new()),
            help: "Address the warnings are sent from.",
        },
        OptionSpec {
            name: "receiver",
            section: MAIL,
            default: ConfigValue::Str(String::new()),
            help: "Address the warnings are sent to.",
        },
        OptionSpec {
            name: "smtp-server",
            section: MAIL,
            default: ConfigValue::Str(String::new()),
            help: "Outgoing mail server.",
        },
        OptionSpec {
            name: "smtp-port",
            section: MAIL,
            default: ConfigValue::Int(587),
            help: "Port of the outgoing mail server.\n\
                   Default: 587",
        },
        OptionSpec {
            name: "smtp-security",
            section: MAIL,
            default: ConfigValue::Str("STARTTLS".to_string()),
            help: "Transport security: PLAIN, STARTTLS or TLS.\n\
                   Default: STARTTLS",
        },
        OptionSpec {
            name: "smtp-user",
            section: MAIL,
            default: ConfigValue::Str(String::new()),
            help: "User name for SMTP authentication.",
        },
        OptionSpec {
            name: "smtp-password",
            section: MAIL,
            default: ConfigValue::Str(String::new()),
            help: "Password for SMTP authentication.",
        },
    ];
}

/// Find the description of an option
pub fn option_spec(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| spec.name == name)
}

/// Trailer appended to a freshly written config file
pub const OVERRIDE_EXAMPLE: &str = "\
# It is possible to add a custom section which overrides the options in [certificates].
# It needs to be referenced in locations, e.g. section:example_org
# Options the section does not set fall back to [certificates]:
#
# [example_org]
# poll-mode = \"host\"
# locations = [\"https://example.org\", \"https://jellyfin.example.org\"]
# max-age = 14
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_option_has_a_fixed_section() {
        for spec in OPTIONS.iter() {
            assert!(FIXED_SECTIONS.contains(&spec.section), "{}", spec.name);
            assert!(!spec.help.is_empty(), "{}", spec.name);
        }
    }

    #[test]
    fn test_option_spec_lookup() {
        let spec = option_spec("max-age").unwrap();
        assert_eq!(spec.section, CERTIFICATES);
        assert_eq!(spec.default, ConfigValue::Int(32));

        assert!(option_spec("no-such-option").is_none());
    }
}
