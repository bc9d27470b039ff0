//! SQLite record source implementation.

pub mod saml_clients;

pub use saml_clients::SqliteSamlClientSource;
