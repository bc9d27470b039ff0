//! Database-backed SAML client configuration (samldb) library crate.
//!
//! Loads SAML service provider client configurations from a database table,
//! caches them for the life of the process, and materializes keystores and
//! identity provider metadata into in-memory credential material.

pub mod config;
pub mod errors;
pub mod saml;
pub mod storage;
