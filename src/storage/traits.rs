//! Record source trait and the raw client record it produces.
//!
//! A record source supplies unvalidated per-client configuration rows. It
//! never interprets them: validation and materialization happen in
//! [`crate::saml::ClientConfiguration`].

use crate::errors::SourceError;
use async_trait::async_trait;
use std::fmt;

pub type Result<T> = std::result::Result<T, SourceError>;

/// One persisted client configuration row, exactly as stored.
///
/// Fields are owned values: a record handed out by any source is the caller's
/// own copy, so mutating it never reaches the source's stored copy.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawClientRecord {
    /// Client name, unique per environment
    pub client_name: String,
    /// Application environment the row applies to
    pub environment: String,
    /// Binary keystore container
    pub keystore_data: Vec<u8>,
    /// Password protecting the keystore container
    pub keystore_password: Option<String>,
    /// Alias of the private key entry inside the keystore
    pub keystore_alias: String,
    /// Password protecting the private key entry
    pub private_key_password: Option<String>,
    /// Identity provider metadata document (XML text)
    pub identity_provider_metadata: String,
    /// Identity provider entity ID
    pub identity_provider_entity_id: String,
    /// Service provider entity ID
    pub service_provider_entity_id: String,
    /// Maximum authentication lifetime in seconds
    pub maximum_authentication_lifetime: i64,
    /// Destination binding type URI; blank means the default binding
    pub destination_binding_type: Option<String>,
}

impl fmt::Debug for RawClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawClientRecord")
            .field("client_name", &self.client_name)
            .field("environment", &self.environment)
            .field("keystore_data", &format_args!("<{} bytes>", self.keystore_data.len()))
            .field("keystore_password", &redacted(&self.keystore_password))
            .field("keystore_alias", &self.keystore_alias)
            .field("private_key_password", &redacted(&self.private_key_password))
            .field(
                "identity_provider_metadata",
                &format_args!("<{} chars>", self.identity_provider_metadata.len()),
            )
            .field(
                "identity_provider_entity_id",
                &self.identity_provider_entity_id,
            )
            .field("service_provider_entity_id", &self.service_provider_entity_id)
            .field(
                "maximum_authentication_lifetime",
                &self.maximum_authentication_lifetime,
            )
            .field("destination_binding_type", &self.destination_binding_type)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

/// Supplier of raw client configuration records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Names of every client configured for the environment
    async fn load_names(&self) -> Result<Vec<String>>;

    /// Every record configured for the environment
    async fn load_all(&self) -> Result<Vec<RawClientRecord>>;

    /// The record for a single client, or `None` if there is none
    async fn load_one(&self, client_name: &str) -> Result<Option<RawClientRecord>>;
}
