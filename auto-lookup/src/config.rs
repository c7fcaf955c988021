//! Reads service configurations from a YAML file.
//!
//! ```yaml
//! timeout_secs: 10
//! services:
//!   nrplade:
//!     country: dk
//!     host: https://api.nrpla.de
//!     path: v1
//!     method: GET
//!     token: secret
//!     headers:
//!       Accept: application/json
//! ```
//!
//! Every entry under `services` becomes one [`ServiceDefinition`]. The entry's
//! `provider` key selects the implementation and defaults to the entry's name.

use std::{fs, path::Path, time::Duration};

use log::info;
use serde::Deserialize;
use serde_yaml::Value;
use shared::data::{deserialize_scalar, Country, HeaderSet, ServiceConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read the config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse YAML file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("parse YAML file: section 'services' is missing or not a mapping")]
    MissingServices,
    #[error("parse YAML file: service {0:?} is invalid: {1}")]
    InvalidService(String, String),
    #[error("parse YAML file: timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Everything read from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Timeout for requests to the services. `None` leaves the choice to the caller.
    pub timeout: Option<Duration>,
    /// The services in the order they appear in the file.
    pub services: Vec<ServiceDefinition>,
}

/// A single configured service along with the implementation it should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub provider: String,
    pub config: ServiceConfig,
}

#[derive(Deserialize)]
struct RawConfig {
    timeout_secs: Option<u64>,
    services: Option<Value>,
}

/// Keys other than these are ignored.
#[derive(Deserialize)]
struct ServiceEntry {
    provider: Option<String>,
    #[serde(deserialize_with = "deserialize_scalar")]
    country: String,
    #[serde(deserialize_with = "deserialize_scalar")]
    host: String,
    #[serde(deserialize_with = "deserialize_scalar")]
    path: String,
    #[serde(default = "default_method", deserialize_with = "deserialize_scalar")]
    method: String,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    token: String,
    #[serde(default)]
    headers: HeaderSet,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// This function will return an error if the file can not be read or is not a valid config.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    info!("Reading config from {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses a config from its YAML source.
///
/// # Errors
///
/// This function will return an error if the YAML is malformed, the `services`
/// section is missing or any service entry lacks required fields.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(content)?;
    if raw.timeout_secs == Some(0) {
        return Err(ConfigError::ZeroTimeout);
    }

    let Some(Value::Mapping(entries)) = raw.services else {
        return Err(ConfigError::MissingServices);
    };

    let mut services = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let name = match key {
            Value::String(name) => name,
            other => {
                return Err(ConfigError::InvalidService(
                    format!("{other:?}"),
                    "service names must be strings".to_string(),
                ))
            }
        };
        info!("Identified service {name:?}");

        let entry: ServiceEntry = serde_yaml::from_value(value)
            .map_err(|err| ConfigError::InvalidService(name.clone(), err.to_string()))?;

        services.push(ServiceDefinition {
            provider: entry.provider.unwrap_or_else(|| name.clone()),
            config: ServiceConfig {
                name,
                country: Country::from(entry.country),
                host: entry.host,
                path: entry.path,
                method: entry.method,
                token: entry.token,
                headers: entry.headers,
            },
        });
    }

    Ok(Config {
        timeout: raw.timeout_secs.map(Duration::from_secs),
        services,
    })
}
