//! Database-loaded SAML client configuration.
//!
//! Raw records from a [`RecordSource`](crate::storage::RecordSource) flow through
//! the [`ConfigurationCache`](crate::storage::ConfigurationCache) into validated
//! [`ClientConfiguration`]s, which the [`ClientRegistry`] collects into named
//! [`SamlClient`]s.

pub mod client;
pub mod configuration;
pub mod constants;
pub mod keystore;
pub mod registry;
pub mod resource;
pub mod security;

pub use client::{
    AuthorizationGenerator, CallbackUrlTemplate, DefaultRolesPermissionsGenerator, SamlClient,
    UserProfile,
};
pub use configuration::ClientConfiguration;
pub use keystore::{CredentialStore, KeystoreParameters, KeystoreType};
pub use registry::ClientRegistry;
pub use resource::{ByteArrayResource, Resource, StringResource};
pub use security::{SignaturePolicy, SigningDefaults};
