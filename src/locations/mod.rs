// Location resolution
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0
//
// Expands the configured `locations` list into the flat, ordered list of
// locations to check. An entry `section:<name>` is replaced by the locations
// of that override section, which are then checked with the section's own
// settings.

use crate::config::{CERTIFICATES, Configuration};
use crate::constants::SECTION_PREFIX;
use crate::{NotifyError, Result};
use std::fmt;
use tracing::{debug, info};

/// One location together with the override section it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub location: String,
    pub section: Option<String>,
}

impl ResolvedLocation {
    fn global(location: &str) -> Self {
        Self {
            location: location.to_string(),
            section: None,
        }
    }

    fn in_section(location: &str, section: &str) -> Self {
        Self {
            location: location.to_string(),
            section: Some(section.to_string()),
        }
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{} [{}]", self.location, section),
            None => write!(f, "{}", self.location),
        }
    }
}

/// Walks the configured locations
pub struct LocationResolver<'a> {
    config: &'a Configuration,
}

impl<'a> LocationResolver<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Resolve every configured location in order
    pub fn resolve(&self) -> Result<Vec<ResolvedLocation>> {
        let entries = self.config.get_list("locations", None)?;
        if entries.is_empty() {
            return Err(NotifyError::config(format!(
                "No locations configured in [{}]",
                CERTIFICATES
            )));
        }

        let mut resolved = Vec::new();
        for entry in &entries {
            match section_reference(entry) {
                Some(section) => resolved.extend(self.resolve_section(section)?),
                None => resolved.push(ResolvedLocation::global(entry)),
            }
        }

        debug!("Resolved {} location(s)", resolved.len());
        Ok(resolved)
    }

    fn resolve_section(&self, section: &str) -> Result<Vec<ResolvedLocation>> {
        let locations = match self.config.section_locations(section) {
            Some(locations) if !locations.is_empty() => locations,
            _ => {
                return Err(NotifyError::MissingSection {
                    section: section.to_string(),
                });
            }
        };

        info!("Found section [{}] with {} location(s)", section, locations.len());

        locations
            .iter()
            .map(|location| {
                if section_reference(location).is_some() {
                    return Err(NotifyError::config(format!(
                        "Section [{}] refers to another section ({}); sections cannot be nested",
                        section, location
                    )));
                }
                Ok(ResolvedLocation::in_section(location, section))
            })
            .collect()
    }
}

/// Section name of a `section:<name>` entry
fn section_reference(entry: &str) -> Option<&str> {
    entry
        .strip_prefix(SECTION_PREFIX)
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;

    fn names(resolved: &[ResolvedLocation]) -> Vec<&str> {
        resolved.iter().map(|r| r.location.as_str()).collect()
    }

    #[test]
    fn test_scalar_section_locations() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", vec!["section:east"]);
        config.set("east", "locations", "a.example.com");

        let resolved = LocationResolver::new(&config).resolve().unwrap();

        assert_eq!(
            resolved,
            vec![ResolvedLocation {
                location: "a.example.com".to_string(),
                section: Some("east".to_string()),
            }]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", vec!["x.example.com", "section:east"]);
        config.set("east", "locations", vec!["y.example.com", "z.example.com"]);

        let resolved = LocationResolver::new(&config).resolve().unwrap();

        assert_eq!(
            names(&resolved),
            vec!["x.example.com", "y.example.com", "z.example.com"]
        );
        assert_eq!(resolved[0].section, None);
        assert_eq!(resolved[2].section.as_deref(), Some("east"));
    }

    #[test]
    fn test_missing_locations() {
        let config = Configuration::default();
        let err = LocationResolver::new(&config).resolve().unwrap_err();
        assert!(matches!(err, NotifyError::Configuration { .. }));

        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", ConfigValue::List(Vec::new()));
        assert!(LocationResolver::new(&config).resolve().is_err());
    }

    #[test]
    fn test_unknown_section() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", vec!["section:west"]);

        let err = LocationResolver::new(&config).resolve().unwrap_err();
        assert_eq!(err.to_string(), "No location specified for [west]");
    }

    #[test]
    fn test_section_without_locations() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", vec!["a.example.com", "section:east"]);
        config.set("east", "max-age", 5);

        assert!(matches!(
            LocationResolver::new(&config).resolve(),
            Err(NotifyError::MissingSection { .. })
        ));

        config.set("east", "locations", "");
        assert!(matches!(
            LocationResolver::new(&config).resolve(),
            Err(NotifyError::MissingSection { .. })
        ));
    }

    #[test]
    fn test_nested_sections_rejected() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", vec!["section:east"]);
        config.set("east", "locations", vec!["a.example.com", "section:west"]);
        config.set("west", "locations", "b.example.com");

        let err = LocationResolver::new(&config).resolve().unwrap_err();
        assert!(err.to_string().contains("cannot be nested"));
    }

    #[test]
    fn test_comma_separated_string() {
        let mut config = Configuration::default();
        config.set(CERTIFICATES, "locations", "a.example.com, b.example.com");

        let resolved = LocationResolver::new(&config).resolve().unwrap();
        assert_eq!(names(&resolved), vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResolvedLocation::global("a.example.com").to_string(), "a.example.com");
        assert_eq!(
            ResolvedLocation::in_section("a.example.com", "east").to_string(),
            "a.example.com [east]"
        );
    }
}
