//! Standardized error types following the `error-samldb-<domain>-<number>` format.

use thiserror::Error;

/// Runtime settings errors that occur during startup
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Error when a required environment variable is not set
    #[error("error-samldb-settings-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when version information is not available
    #[error("error-samldb-settings-2 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when the configuration table name is not a plain SQL identifier
    #[error("error-samldb-settings-3 Invalid table name '{0}'")]
    InvalidTableName(String),

    /// Error when the environment tag is blank
    #[error("error-samldb-settings-4 The environment tag must not be blank")]
    BlankEnvironment,

    /// Error when the base callback URL cannot be parsed
    #[error("error-samldb-settings-5 Invalid callback URL '{0}': {1}")]
    InvalidCallbackUrl(String, url::ParseError),

    /// Error when the client name parameter is blank
    #[error("error-samldb-settings-6 The client name parameter must not be blank")]
    BlankClientNameParameter,

    /// Error when the storage backend is not known or not compiled in
    #[error("error-samldb-settings-7 Unknown storage backend: {0}")]
    UnknownStorageBackend(String),

    /// Error when a backend needs a database URL and none was given
    #[error("error-samldb-settings-8 DATABASE_URL required for {0} backend")]
    DatabaseUrlRequired(String),
}

/// Record source errors, raised while fetching raw client records
#[derive(Debug, Error)]
pub enum SourceError {
    /// Error when database connection fails
    #[error("error-samldb-source-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-samldb-source-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when a row cannot be decoded into a record
    #[error("error-samldb-source-3 Row decoding failed for column {column}: {message}")]
    RowDecodingFailed { column: &'static str, message: String },

    /// Error when the request itself is invalid
    #[error("error-samldb-source-4 Invalid data: {0}")]
    InvalidData(String),
}

/// Client configuration errors, raised while validating and materializing one client
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested client name is blank
    #[error("error-samldb-config-1 The client name must not be blank")]
    BlankClientName,

    /// No record exists for the requested client name
    #[error("error-samldb-config-2 Configuration for client '{0}' could not be loaded")]
    RecordNotFound(String),

    /// The loaded record carries a different name than the one requested
    #[error(
        "error-samldb-config-3 Configuration for client '{requested}' could not be loaded: record is named '{found}'"
    )]
    RecordNameMismatch { requested: String, found: String },

    /// A mandatory field is blank or empty
    #[error("error-samldb-config-4 Client '{client}': {field} must not be blank")]
    MissingField { client: String, field: &'static str },

    /// The maximum authentication lifetime is zero or negative
    #[error(
        "error-samldb-config-5 Client '{client}': maximum authentication lifetime must be positive, got {value}"
    )]
    NonPositiveLifetime { client: String, value: i64 },

    /// The keystore type is not one this crate can read
    #[error("error-samldb-config-6 Client '{client}': unsupported keystore type '{keystore_type}'")]
    UnsupportedKeystoreType {
        client: String,
        keystore_type: String,
    },

    /// The keystore blob cannot be parsed or decrypted
    #[error("error-samldb-config-7 Client '{client}': keystore could not be read: {message}")]
    KeystoreUnreadable { client: String, message: String },

    /// The keystore has no private key entry under the alias
    #[error("error-samldb-config-8 Client '{client}': no private key entry for alias '{alias}'")]
    KeyEntryNotFound { client: String, alias: String },

    /// The private key cannot be recovered with the private key password
    #[error(
        "error-samldb-config-9 Client '{client}': private key '{alias}' could not be recovered: {message}"
    )]
    PrivateKeyUnrecoverable {
        client: String,
        alias: String,
        message: String,
    },

    /// The certificate attached to the key entry is not a usable X.509 certificate
    #[error(
        "error-samldb-config-10 Client '{client}': certificate for alias '{alias}' is invalid: {message}"
    )]
    CertificateInvalid {
        client: String,
        alias: String,
        message: String,
    },
}

/// Client registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two records collapse to the same case-insensitive client name
    #[error("error-samldb-registry-1 Duplicate name in clients: {0}")]
    DuplicateName(String),

    /// No client is registered under the name
    #[error("error-samldb-registry-2 No client found for name: {0}")]
    ClientNotFound(String),

    /// No client of the requested type is registered
    #[error("error-samldb-registry-3 No client found for type: {0}")]
    ClientTypeNotFound(&'static str),

    /// The request carries no client name parameter
    #[error("error-samldb-registry-4 Request has no '{0}' parameter")]
    MissingClientNameParameter(String),

    /// A client failed validation during the build pass
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The record source failed during the build pass
    #[error(transparent)]
    Source(#[from] SourceError),
}
