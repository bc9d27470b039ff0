//! Keystore materialization: binary keystore blob to in-memory credential store.
//!
//! Only PKCS#12 containers are read. Tools that write PKCS#12 (keytool,
//! openssl) protect the key bags and the integrity MAC with a single password,
//! so a private key is recovered by reopening the container with the private
//! key password.

use crate::errors::ConfigError;
use p12_keystore::{KeyStore, KeyStoreEntry};
use std::fmt;
use std::sync::Arc;

/// Keystore type assumed when none is configured
pub const DEFAULT_KEYSTORE_TYPE: KeystoreType = KeystoreType::Pkcs12;

/// Alias looked up when none is configured
pub const FALLBACK_KEYSTORE_ALIAS: &str = "saml-sp-keystore";

/// Supported keystore container formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeystoreType {
    Pkcs12,
}

impl KeystoreType {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pkcs12 => "PKCS12",
        }
    }

    /// Parse a keystore type name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PKCS12" | "P12" | "PFX" => Some(Self::Pkcs12),
            _ => None,
        }
    }
}

impl fmt::Display for KeystoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for opening a keystore blob
#[derive(Clone, Copy)]
pub struct KeystoreParameters<'a> {
    /// Client the keystore belongs to, for error reporting
    pub client_name: &'a str,
    pub keystore_type: Option<&'a str>,
    pub alias: Option<&'a str>,
    pub password: &'a str,
}

/// Kind of a keystore entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Private key with its certificate chain
    PrivateKey,
    /// Trusted certificate without a key
    TrustedCertificate,
}

/// Parsed X.509 certificate
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    public_key: Vec<u8>,
}

impl Certificate {
    fn from_der(der: &[u8]) -> Result<Self, String> {
        let (_, parsed) = x509_parser::parse_x509_certificate(der).map_err(|e| e.to_string())?;
        let public_key = parsed.public_key().raw.to_vec();
        if public_key.is_empty() {
            return Err("certificate carries no public key".to_string());
        }
        Ok(Self {
            der: der.to_vec(),
            subject: parsed.subject().to_string(),
            public_key,
        })
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// DER-encoded SubjectPublicKeyInfo
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// PKCS#8 private key recovered from a keystore
pub struct PrivateKey {
    der: Vec<u8>,
}

impl PrivateKey {
    pub fn as_pkcs8_der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[derive(Clone, Debug)]
struct StoredEntry {
    alias: String,
    kind: EntryKind,
    chain: Vec<Certificate>,
}

/// Credential material materialized from a keystore blob.
///
/// Holds certificates for every entry. Private keys are not retained; they are
/// recovered on demand with [`CredentialStore::private_key`].
#[derive(Clone)]
pub struct CredentialStore {
    client_name: String,
    keystore_type: KeystoreType,
    alias: String,
    entries: Vec<StoredEntry>,
    data: Arc<[u8]>,
}

impl CredentialStore {
    /// Parse `data` and resolve the configured alias to a private key entry.
    ///
    /// A blank type falls back to [`DEFAULT_KEYSTORE_TYPE`] and a blank alias
    /// to [`FALLBACK_KEYSTORE_ALIAS`], each with a warning.
    pub fn open(data: &[u8], parameters: KeystoreParameters<'_>) -> Result<Self, ConfigError> {
        let client = parameters.client_name;

        let keystore_type = match parameters.keystore_type.filter(|t| !t.trim().is_empty()) {
            Some(name) => {
                KeystoreType::parse(name).ok_or_else(|| ConfigError::UnsupportedKeystoreType {
                    client: client.to_string(),
                    keystore_type: name.to_string(),
                })?
            }
            None => {
                tracing::warn!(
                    client_name = %client,
                    keystore_type = %DEFAULT_KEYSTORE_TYPE,
                    "Using default keystore type"
                );
                DEFAULT_KEYSTORE_TYPE
            }
        };

        let alias = match parameters.alias.filter(|a| !a.trim().is_empty()) {
            Some(alias) => alias.trim(),
            None => {
                tracing::warn!(
                    client_name = %client,
                    alias = FALLBACK_KEYSTORE_ALIAS,
                    "Using fallback keystore alias"
                );
                FALLBACK_KEYSTORE_ALIAS
            }
        };

        let store = KeyStore::from_pkcs12(data, parameters.password).map_err(|e| {
            ConfigError::KeystoreUnreadable {
                client: client.to_string(),
                message: e.to_string(),
            }
        })?;

        let mut entries = Vec::new();
        for (entry_alias, entry) in store.entries() {
            let (kind, certificates) = match entry {
                KeyStoreEntry::PrivateKeyChain(chain) => (
                    EntryKind::PrivateKey,
                    chain.chain().iter().map(|c| c.as_der()).collect::<Vec<_>>(),
                ),
                KeyStoreEntry::Certificate(certificate) => {
                    (EntryKind::TrustedCertificate, vec![certificate.as_der()])
                }
                #[allow(unreachable_patterns)]
                _ => {
                    tracing::debug!(
                        client_name = %client,
                        alias = %entry_alias,
                        "Skipping unsupported keystore entry"
                    );
                    continue;
                }
            };

            let chain = certificates
                .into_iter()
                .map(Certificate::from_der)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| ConfigError::CertificateInvalid {
                    client: client.to_string(),
                    alias: entry_alias.to_string(),
                    message,
                })?;

            entries.push(StoredEntry {
                alias: entry_alias.to_string(),
                kind,
                chain,
            });
        }

        let key_entry = entries
            .iter()
            .find(|entry| {
                entry.kind == EntryKind::PrivateKey && entry.alias.eq_ignore_ascii_case(alias)
            })
            .ok_or_else(|| ConfigError::KeyEntryNotFound {
                client: client.to_string(),
                alias: alias.to_string(),
            })?;

        if key_entry.chain.is_empty() {
            return Err(ConfigError::CertificateInvalid {
                client: client.to_string(),
                alias: key_entry.alias.clone(),
                message: "private key entry has no certificate".to_string(),
            });
        }

        Ok(Self {
            client_name: client.to_string(),
            keystore_type,
            alias: key_entry.alias.clone(),
            entries,
            data: Arc::from(data),
        })
    }

    pub fn keystore_type(&self) -> KeystoreType {
        self.keystore_type
    }

    /// Alias of the private key entry used for signing, as stored in the container
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Aliases of every entry
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.alias.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_key_entry(&self, alias: &str) -> bool {
        self.entry(alias)
            .is_some_and(|entry| entry.kind == EntryKind::PrivateKey)
    }

    /// Leaf certificate of the entry
    pub fn certificate(&self, alias: &str) -> Option<&Certificate> {
        self.entry(alias).and_then(|entry| entry.chain.first())
    }

    pub fn certificate_chain(&self, alias: &str) -> Option<&[Certificate]> {
        self.entry(alias).map(|entry| entry.chain.as_slice())
    }

    /// Recover the private key stored under `alias` with `password`
    pub fn private_key(&self, alias: &str, password: &str) -> Result<PrivateKey, ConfigError> {
        let unrecoverable = |message: String| ConfigError::PrivateKeyUnrecoverable {
            client: self.client_name.clone(),
            alias: alias.to_string(),
            message,
        };

        let store = KeyStore::from_pkcs12(&self.data, password)
            .map_err(|e| unrecoverable(e.to_string()))?;

        for (entry_alias, entry) in store.entries() {
            if !entry_alias.eq_ignore_ascii_case(alias) {
                continue;
            }
            if let KeyStoreEntry::PrivateKeyChain(chain) = entry {
                let der = chain.key().to_vec();
                if der.is_empty() {
                    return Err(unrecoverable("empty private key".to_string()));
                }
                return Ok(PrivateKey { der });
            }
        }

        Err(ConfigError::KeyEntryNotFound {
            client: self.client_name.clone(),
            alias: alias.to_string(),
        })
    }

    // Key entries win over certificate entries stored under the same alias.
    fn entry(&self, alias: &str) -> Option<&StoredEntry> {
        let mut matching = self
            .entries
            .iter()
            .filter(|entry| entry.alias.eq_ignore_ascii_case(alias));
        let first = matching.next()?;
        if first.kind == EntryKind::PrivateKey {
            return Some(first);
        }
        matching
            .find(|entry| entry.kind == EntryKind::PrivateKey)
            .or(Some(first))
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("keystore_type", &self.keystore_type)
            .field("alias", &self.alias)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
