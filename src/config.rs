//! Environment-based configuration types for samldb runtime settings.

use anyhow::Result;

use crate::errors::SettingsError;
use crate::saml::client::{CallbackUrlTemplate, DEFAULT_CLIENT_NAME_PARAMETER};

/// Name of the table holding client configuration rows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName(String);

/// Application environment tag distinguishing rows in a shared table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment(String);

/// Query parameter carrying the client name on callback URLs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientNameParameter(String);

/// Main application configuration
#[derive(Clone)]
pub struct Config {
    pub version: String,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub table_name: TableName,
    pub environment: Environment,
    pub callback_url: Option<String>,
    pub client_name_parameter: ClientNameParameter,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let storage_backend = default_env("STORAGE_BACKEND", "postgres");
        let database_url = optional_env("DATABASE_URL");
        let table_name: TableName = require_env("SAML_CLIENT_TABLE")?.try_into()?;
        let environment: Environment = require_env("SAML_ENVIRONMENT")?.try_into()?;
        let callback_url = optional_env("SAML_CALLBACK_URL").filter(|v| !v.trim().is_empty());
        let client_name_parameter: ClientNameParameter =
            default_env("SAML_CLIENT_NAME_PARAMETER", DEFAULT_CLIENT_NAME_PARAMETER).try_into()?;

        let config = Self {
            version: version()?,
            storage_backend,
            database_url,
            table_name,
            environment,
            callback_url,
            client_name_parameter,
        };

        // Surface a malformed callback URL at startup rather than at first registry build.
        config.callback_template()?;
        Ok(config)
    }

    /// Callback URL template, if a base callback URL is configured
    pub fn callback_template(&self) -> Result<Option<CallbackUrlTemplate>, SettingsError> {
        self.callback_url
            .as_deref()
            .map(|base| CallbackUrlTemplate::new(base, self.client_name_parameter.as_ref()))
            .transpose()
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(SettingsError::VersionNotSet.into())
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SettingsError::EnvVarRequired(name.to_string()).into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl TryFrom<String> for TableName {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // Interpolated into query text, so only plain or schema-qualified identifiers pass.
        let value = value.trim().to_string();
        let mut parts = value.split('.');
        let valid = match (parts.next(), parts.next(), parts.next()) {
            (Some(table), None, None) => is_identifier(table),
            (Some(schema), Some(table), None) => is_identifier(schema) && is_identifier(table),
            _ => false,
        };
        if valid {
            Ok(Self(value))
        } else {
            Err(SettingsError::InvalidTableName(value))
        }
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Environment {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            Err(SettingsError::BlankEnvironment)
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientNameParameter {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_string();
        if value.is_empty() {
            Err(SettingsError::BlankClientNameParameter)
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for ClientNameParameter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
