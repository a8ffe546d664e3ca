//! # Configuration
//!
//! Store identity and upload policies, loadable from TOML.
//!
//! ```toml
//! database_name = "DevangPortfolio"
//! schema_version = 1
//! storage_path = "/home/me/.local/share/folio/folio.db"
//!
//! [policies.gallery]
//! max_bytes = 104857600
//!
//! [policies.resume]
//! allowed_types = ["application/pdf"]
//! ```
//!
//! Every key is optional; anything missing keeps its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::media::{KindPolicy, Partition, PolicyTable};
use crate::storage::{DatabaseConfig, DEFAULT_SCHEMA_VERSION};

/// Store name used when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "DevangPortfolio";

/// Portfolio configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioConfig {
    /// Store name
    pub database_name: String,
    /// Requested schema version
    pub schema_version: u32,
    /// Database file (None for in-memory)
    pub storage_path: Option<PathBuf>,
    /// Upload policy per partition
    pub policies: PolicyTable,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            schema_version: DEFAULT_SCHEMA_VERSION,
            storage_path: None,
            policies: PolicyTable::default(),
        }
    }
}

/// On-disk shape: everything optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database_name: Option<String>,
    schema_version: Option<u32>,
    storage_path: Option<PathBuf>,
    #[serde(default)]
    policies: PolicyOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyOverrides {
    profile_picture: Option<PolicyOverride>,
    gallery: Option<PolicyOverride>,
    resume: Option<PolicyOverride>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyOverride {
    allowed_types: Option<Vec<String>>,
    max_bytes: Option<u64>,
}

impl PolicyOverride {
    fn apply(self, policy: &mut KindPolicy) {
        if let Some(types) = self.allowed_types {
            policy.allowed_types = types;
        }
        if let Some(max) = self.max_bytes {
            policy.max_bytes = max;
        }
    }
}

impl FolioConfig {
    /// Parse a TOML document, filling gaps with defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(s)?;
        let mut config = Self::default();

        if let Some(name) = file.database_name {
            config.database_name = name;
        }
        if let Some(version) = file.schema_version {
            config.schema_version = version;
        }
        config.storage_path = file.storage_path;

        let overrides = [
            (Partition::ProfilePicture, file.policies.profile_picture),
            (Partition::Gallery, file.policies.gallery),
            (Partition::Resume, file.policies.resume),
        ];
        for (partition, policy) in overrides {
            if let Some(policy) = policy {
                policy.apply(config.policies.for_partition_mut(partition));
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Use an on-disk database at `path`.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Reject values the store or the upload policies cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.database_name.trim().is_empty() {
            return Err(Error::InvalidConfig("database_name is empty".into()));
        }
        if self.schema_version == 0 {
            return Err(Error::InvalidConfig("schema_version must be at least 1".into()));
        }
        for partition in Partition::ALL {
            let policy = self.policies.for_partition(partition);
            if policy.allowed_types.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "{} allows no file types",
                    partition.name()
                )));
            }
            if policy.max_bytes == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} max_bytes must be positive",
                    partition.name()
                )));
            }
        }
        Ok(())
    }

    /// Store configuration declaring the three portfolio partitions.
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.storage_path.clone(),
            name: self.database_name.clone(),
            version: self.schema_version,
            partitions: Partition::specs(),
        }
    }
}
