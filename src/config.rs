//! Configuration management for the diff engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (fleetdiff.toml)
//! - Environment variables (FLEETDIFF__*)
//!
//! ## Example config file (fleetdiff.toml):
//! ```toml
//! [contracts]
//! dns = "record"
//! firewall_rules = "collection"
//!
//! [identity]
//! candidates = ["_name", "name", "no", "id"]
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::align::AlignmentBuilder;
use crate::error::Result;
use crate::identity::{IdentityResolver, DEFAULT_CANDIDATES};
use crate::validate::{SectionContract, Validator};
use crate::value::Shape;

/// Main configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Expected top-level shape per section
    #[serde(default = "default_contracts")]
    pub contracts: SectionContract,

    /// Identity key resolution
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Identity key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Candidate keys, tried in order against the first record
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_candidates() -> Vec<String> {
    DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

fn default_contracts() -> SectionContract {
    let records = [
        "system",
        "routing",
        "vpn",
        "dns",
        "ntp",
        "users",
        "snmp",
        "ips",
        "content_filter",
        "app_patrol",
        "logging",
        "firewall_settings",
    ];
    let collections = [
        "interfaces",
        "nat",
        "nat_snat",
        "firewall_rules",
        "address_objects",
        "service_objects",
    ];

    records
        .iter()
        .map(|s| (s.to_string(), Shape::Record))
        .chain(collections.iter().map(|s| (s.to_string(), Shape::Collection)))
        .collect()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contracts: default_contracts(),
            identity: IdentityConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    ///
    /// Every source is merged over the built-in defaults table by table, so a
    /// file listing one contract adds to the default contracts instead of
    /// replacing them.
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        // Load from default locations
        let config_locations = ["fleetdiff.toml", ".fleetdiff.toml", "config/fleetdiff.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("net", "fleet", "fleetdiff") {
            let xdg_config = config_dir.config_dir().join("fleetdiff.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (FLEETDIFF__*)
        builder = builder.add_source(
            Environment::with_prefix("FLEETDIFF")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn identity_resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.identity.candidates.clone())
    }

    pub fn alignment_builder(&self) -> AlignmentBuilder {
        AlignmentBuilder::new(self.identity_resolver())
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.contracts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.contracts.expected("dns"), Some(Shape::Record));
        assert_eq!(config.contracts.expected("firewall_rules"), Some(Shape::Collection));
        assert_eq!(config.contracts.len(), 18);
        assert_eq!(config.identity.candidates[0], "_name");
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[contracts]"));
        assert!(toml_str.contains("[identity]"));
        let back: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.contracts, config.contracts);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: EngineConfig = toml::from_str("[output]\nformat = \"compact\"\n").unwrap();
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert_eq!(config.contracts.expected("interfaces"), Some(Shape::Collection));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[contracts]\nvlans = \"collection\"\n").unwrap();

        let config = EngineConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.contracts.expected("vlans"), Some(Shape::Collection));
    }

    #[test]
    fn test_file_contracts_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[contracts]\nvlans = \"collection\"\ndns = \"collection\"\n").unwrap();

        let config = EngineConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.contracts.len(), 19);
        assert_eq!(config.contracts.expected("dns"), Some(Shape::Collection));
        assert_eq!(config.contracts.expected("firewall_rules"), Some(Shape::Collection));
        assert_eq!(config.contracts.expected("system"), Some(Shape::Record));
        assert_eq!(config.identity.candidates[0], "_name");
    }
}
