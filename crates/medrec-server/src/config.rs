use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::bind_addr`].
pub const BIND_ADDR_ENV: &str = "MEDREC_BIND_ADDR";

/// Server configuration.
///
/// Loaded from defaults, then an optional TOML file, then the environment.
/// Every field is optional in the file.
///
/// ```toml
/// bind_addr = "0.0.0.0:3001"
/// seed_path = "data/patients.json"
/// cors_permissive = true
///
/// [api_tokens]
/// "s3cret" = "dr-house"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON seed file loaded into the in-memory store at startup.
    pub seed_path: Option<PathBuf>,
    /// Allow cross-origin requests from any origin.
    pub cors_permissive: bool,
    /// Bearer token to editor name. Empty means anonymous access.
    pub api_tokens: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            seed_path: None,
            cors_permissive: true,
            api_tokens: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> ServerResult<Self> {
        toml::from_str(content).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Defaults, overlaid by `path` if given, overlaid by the environment.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.override_bind_addr(std::env::var(BIND_ADDR_ENV).ok().as_deref())?;
        Ok(config)
    }

    fn override_bind_addr(&mut self, value: Option<&str>) -> ServerResult<()> {
        if let Some(value) = value {
            self.bind_addr = value
                .parse()
                .map_err(|e| ServerError::Config(format!("{BIND_ADDR_ENV}={value}: {e}")))?;
        }
        Ok(())
    }
}
