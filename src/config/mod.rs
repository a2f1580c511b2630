// Configuration - sectioned key/value store with typed defaults
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

pub mod defaults;

use crate::{NotifyError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use defaults::{CERTIFICATES, FIXED_SECTIONS, GENERAL, MAIL, OPTIONS, OptionSpec, option_spec};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/certnotify.toml";

/// A single option value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// Name of the value type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Int(_) => "an integer",
            ConfigValue::Float(_) => "a float",
            ConfigValue::Str(_) => "a string",
            ConfigValue::List(_) => "a list",
        }
    }

    /// Interpret as a list of strings
    ///
    /// A string is split on commas, so `"a, b"` yields two entries while a
    /// plain `"a.example.com"` yields exactly one.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            ConfigValue::List(items) => items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ConfigValue::Str(value) => value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            other => vec![other.to_string()],
        }
    }

    fn to_toml(&self) -> toml::Value {
        match self {
            ConfigValue::Bool(b) => toml::Value::Boolean(*b),
            ConfigValue::Int(i) => toml::Value::Integer(*i),
            ConfigValue::Float(f) => toml::Value::Float(*f),
            ConfigValue::Str(s) => toml::Value::String(s.clone()),
            ConfigValue::List(items) => toml::Value::Array(
                items
                    .iter()
                    .map(|item| toml::Value::String(item.clone()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Str(s) => write!(f, "{}", s),
            ConfigValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(values: Vec<&str>) -> Self {
        ConfigValue::List(values.into_iter().map(str::to_string).collect())
    }
}

type Section = HashMap<String, ConfigValue>;

/// Loaded configuration
///
/// Options live in one of the fixed sections (`[general]`, `[certificates]`,
/// `[mail]`). Any other section is an override section: it may set the
/// certificate options again and falls back to the global values for the
/// ones it leaves out.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    path: Option<PathBuf>,
    sections: HashMap<String, Section>,
}

impl Configuration {
    /// Load configuration from a TOML file, writing the defaults first if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            info!("Configuration file {:?} not found, creating it", path);
            Self::create_default(path)?;
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            NotifyError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config = Self::parse(&contents)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let sections: HashMap<String, Section> = toml::from_str(contents)?;

        for name in sections.keys() {
            if !FIXED_SECTIONS.contains(&name.as_str()) {
                debug!("Found override section [{}]", name);
            }
        }

        Ok(Self {
            path: None,
            sections,
        })
    }

    /// Write a commented configuration file holding every default
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::render_default()).map_err(|e| {
            NotifyError::config(format!("Failed to write config file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Remove the configuration file and write the defaults again
    pub fn reset<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Self::create_default(path)
    }

    /// Render the default configuration file contents
    pub fn render_default() -> String {
        let mut out = String::from("# certnotify configuration\n");

        for section in FIXED_SECTIONS {
            out.push_str(&format!("\n[{}]\n", section));

            for spec in OPTIONS.iter().filter(|spec| spec.section == *section) {
                out.push('\n');
                for line in spec.help.lines() {
                    out.push_str(&format!("# {}\n", line));
                }
                out.push_str(&format!("{} = {}\n", spec.name, spec.default.to_toml()));
            }
        }

        out.push('\n');
        out.push_str(defaults::OVERRIDE_EXAMPLE);
        out
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set an option in a section
    pub fn set(&mut self, section: &str, option: &str, value: impl Into<ConfigValue>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.into());
    }

    /// Check whether a section exists
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Names of all override sections
    pub fn override_sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sections
            .keys()
            .map(String::as_str)
            .filter(|name| !FIXED_SECTIONS.contains(name))
            .collect();
        names.sort_unstable();
        names
    }

    /// Locations configured in an override section
    ///
    /// Returns None when the section does not exist or sets no locations.
    pub fn section_locations(&self, name: &str) -> Option<Vec<String>> {
        self.sections
            .get(name)
            .and_then(|section| section.get("locations"))
            .map(ConfigValue::to_list)
    }

    /// Get an option value
    ///
    /// With a section override the value set in that section wins. Otherwise
    /// (or when the section leaves it out) the value from the option's own
    /// section is used, falling back to the built-in default.
    pub fn get(&self, option: &str, section_override: Option<&str>) -> Result<ConfigValue> {
        let spec = option_spec(option)
            .ok_or_else(|| NotifyError::config(format!("Unknown option '{}'", option)))?;

        if let Some(section) = section_override {
            if let Some(value) = self.lookup(section, option) {
                return Ok(value.clone());
            }
            debug!(
                "Option '{}' not set in [{}], using global value",
                option, section
            );
        }

        if let Some(value) = self.lookup(spec.section, option) {
            return Ok(value.clone());
        }

        debug!("Option '{}' not configured, using default {}", option, spec.default);
        Ok(spec.default.clone())
    }

    /// Get an option as a string
    pub fn get_str(&self, option: &str, section_override: Option<&str>) -> Result<String> {
        match self.get(option, section_override)? {
            ConfigValue::Str(value) => Ok(value),
            ConfigValue::Int(value) => Ok(value.to_string()),
            other => Err(type_error(option, "a string", &other)),
        }
    }

    /// Get an option as an integer
    pub fn get_int(&self, option: &str, section_override: Option<&str>) -> Result<i64> {
        match self.get(option, section_override)? {
            ConfigValue::Int(value) => Ok(value),
            ConfigValue::Str(value) => match value.trim().parse::<i64>() {
                Ok(parsed) => Ok(parsed),
                Err(_) => Err(type_error(option, "an integer", &ConfigValue::Str(value))),
            },
            other => Err(type_error(option, "an integer", &other)),
        }
    }

    /// Get an option as a boolean
    pub fn get_bool(&self, option: &str, section_override: Option<&str>) -> Result<bool> {
        match self.get(option, section_override)? {
            ConfigValue::Bool(value) => Ok(value),
            ConfigValue::Str(ref value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(type_error(option, "a boolean", &ConfigValue::Str(value.clone()))),
            },
            other => Err(type_error(option, "a boolean", &other)),
        }
    }

    /// Get an option as a list of strings
    pub fn get_list(&self, option: &str, section_override: Option<&str>) -> Result<Vec<String>> {
        Ok(self.get(option, section_override)?.to_list())
    }

    fn lookup(&self, section: &str, option: &str) -> Option<&ConfigValue> {
        self.sections.get(section).and_then(|s| s.get(option))
    }
}

fn type_error(option: &str, expected: &'static str, found: &ConfigValue) -> NotifyError {
    NotifyError::OptionType {
        option: option.to_string(),
        expected,
        found: found.type_name().to_string(),
    }
}
