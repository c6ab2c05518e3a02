// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// Where variables are read from
#[derive(Debug, Clone, Default)]
enum Source {
    #[default]
    Process,
    Map(Arc<HashMap<String, String>>),
}

/// Environment variable loader
///
/// Keys are upper-cased and joined to the prefix with `_`, so
/// `EnvLoader::new(Some("RAZORPAY".into())).load_var("key_id")` reads
/// `RAZORPAY_KEY_ID`.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: Option<String>,
    source: Source,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix,
            source: Source::Process,
        }
    }

    /// Read from a fixed map instead of the process environment
    pub fn with_source(mut self, vars: HashMap<String, String>) -> Self {
        self.source = Source::Map(Arc::new(vars));
        self
    }

    /// Same source, different prefix
    pub fn scoped(&self, prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            source: self.source.clone(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key);
        match self.source {
            Source::Process => env::var(&full_key).map_err(ConfigError::EnvError),
            Source::Map(ref vars) => vars
                .get(&full_key)
                .cloned()
                .ok_or(ConfigError::KeyNotFound(full_key)),
        }
    }

    /// Load a variable, treating unset and blank values alike
    pub fn load_opt(&self, key: &str) -> Option<String> {
        self.load_var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and parse, falling back to `default` when unset
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.load_opt(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::ParseError {
                key: self.full_key(key),
                message: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Load a comma-separated list
    pub fn load_list(&self, key: &str) -> Vec<String> {
        self.load_opt(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
