use thiserror::Error;

pub const TABLE_ENV: &str = "EDEN_TABLE";
pub const PROVISIONER_FUNCTION_ENV: &str = "EDEN_PROVISIONER_FUNCTION";
pub const BIND_ADDR_ENV: &str = "EDEN_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub table_name: String,
    pub provisioner_function: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            table_name: required(TABLE_ENV)?,
            provisioner_function: required(PROVISIONER_FUNCTION_ENV)?,
        })
    }
}
