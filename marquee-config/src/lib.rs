// Configuration management for the Marquee backend

pub mod env;
pub mod error;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use validation::{ConfigValidator, Validate};

use marquee_log::{info, warn};
use secrecy::SecretString;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// Default Razorpay API root
pub const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// HTTP listener settings, read from `MARQUEE_*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            body_limit: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Payment gateway credentials and client settings, read from `RAZORPAY_*`
///
/// Secrets have no defaults. A missing secret stays `None` here and fails
/// closed with a configuration error when an operation needs it.
#[derive(Debug)]
pub struct GatewayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<SecretString>,
    pub webhook_secret: Option<SecretString>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            key_secret: None,
            webhook_secret: None,
            api_base: DEFAULT_RAZORPAY_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load from the process environment, overlaid on an optional env file.
    ///
    /// With `None`, a `.env` in the working directory is read if present.
    /// An explicitly named file must exist. Process variables take
    /// precedence over file entries.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(env_file, process_vars(std::env::vars_os()))
    }

    /// Same as [`AppConfig::load`] with an explicit process environment.
    pub fn load_with_env(
        env_file: Option<&Path>,
        process: HashMap<String, String>,
    ) -> Result<Self> {
        let mut vars = match env_file {
            Some(path) => read_env_file(path)?,
            None => read_env_file(Path::new(".env")).unwrap_or_default(),
        };
        vars.extend(process);

        let config = Self::from_loader(&EnvLoader::default().with_source(vars))?;
        config.validate()?;
        Ok(config)
    }

    /// Build from any loader; prefixes are applied here.
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let server_env = loader.scoped("MARQUEE");
        let gateway_env = loader.scoped("RAZORPAY");

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: server_env.load_var_or("host", &defaults.host),
            port: server_env.parse_or("port", defaults.port)?,
            cors_origins: server_env.load_list("cors_origins"),
            body_limit: server_env.parse_or("body_limit", defaults.body_limit)?,
        };

        let gateway = GatewayConfig {
            key_id: gateway_env.load_opt("key_id"),
            key_secret: gateway_env.load_opt("key_secret").map(SecretString::from),
            webhook_secret: gateway_env.load_opt("webhook_secret").map(SecretString::from),
            api_base: gateway_env.load_var_or("api_base", DEFAULT_RAZORPAY_API_BASE),
            timeout: Duration::from_secs(gateway_env.parse_or("timeout_secs", 10u64)?),
        };

        Ok(Self { server, gateway })
    }

    /// Log one warning per missing credential.
    pub fn report_missing_secrets(&self) {
        if self.gateway.key_id.is_none() {
            warn!("RAZORPAY_KEY_ID is not set; order creation will fail");
        }
        if self.gateway.key_secret.is_none() {
            warn!("RAZORPAY_KEY_SECRET is not set; order creation and payment verification will fail");
        }
        if self.gateway.webhook_secret.is_none() {
            info!("RAZORPAY_WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.server.host, "MARQUEE_HOST")?;
        ConfigValidator::is_port(self.server.port, "MARQUEE_PORT")?;
        ConfigValidator::in_range(self.server.body_limit, 1024, 16 * 1024 * 1024, "MARQUEE_BODY_LIMIT")?;
        ConfigValidator::is_url(&self.gateway.api_base, "RAZORPAY_API_BASE")?;
        ConfigValidator::in_range(self.gateway.timeout.as_secs(), 1, 120, "RAZORPAY_TIMEOUT_SECS")?;
        Ok(())
    }
}

/// Process variables as UTF-8; entries that are not valid UTF-8 are skipped.
fn process_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                warn!(%key, "Skipping environment variable with non UTF-8 value");
                None
            }
            (Err(key), _) => {
                warn!(key = %key.to_string_lossy(), "Skipping environment variable with non UTF-8 name");
                None
            }
        })
        .collect()
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

    entries
        .map(|entry| entry.map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e))))
        .collect()
}
