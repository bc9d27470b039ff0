//! Signature signing defaults and the per-client policy derived from them.
//!
//! [`SigningDefaults`] stands in for the protocol stack's default security
//! configuration: it is injected into the registry and can be replaced. Every
//! client derives its [`SignaturePolicy`] from it, minus the digest methods
//! excluded by local policy.

use super::constants::*;

/// Digest method never offered for signature references
pub const EXCLUDED_DIGEST_METHOD: &str = ALGO_DIGEST_SHA512;

/// Platform default signature signing configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningDefaults {
    pub blacklisted_algorithms: Vec<String>,
    pub signature_algorithms: Vec<String>,
    pub signature_reference_digest_methods: Vec<String>,
    pub signature_canonicalization_algorithm: String,
}

impl Default for SigningDefaults {
    /// The XML security defaults of the Shibboleth/OpenSAML stack.
    fn default() -> Self {
        let owned =
            |uris: &[&str]| -> Vec<String> { uris.iter().map(|uri| uri.to_string()).collect() };
        Self {
            blacklisted_algorithms: owned(&[
                ALGO_DIGEST_MD5,
                ALGO_SIGNATURE_RSA_MD5,
                ALGO_MAC_HMAC_MD5,
            ]),
            signature_algorithms: owned(&[
                ALGO_SIGNATURE_RSA_SHA256,
                ALGO_SIGNATURE_RSA_SHA384,
                ALGO_SIGNATURE_RSA_SHA512,
                ALGO_SIGNATURE_RSA_SHA1,
                ALGO_SIGNATURE_ECDSA_SHA256,
                ALGO_SIGNATURE_ECDSA_SHA384,
                ALGO_SIGNATURE_ECDSA_SHA512,
                ALGO_SIGNATURE_ECDSA_SHA1,
                ALGO_SIGNATURE_DSA_SHA1,
                ALGO_MAC_HMAC_SHA256,
                ALGO_MAC_HMAC_SHA384,
                ALGO_MAC_HMAC_SHA512,
                ALGO_MAC_HMAC_SHA1,
            ]),
            signature_reference_digest_methods: owned(&[
                ALGO_DIGEST_SHA256,
                ALGO_DIGEST_SHA384,
                ALGO_DIGEST_SHA512,
                ALGO_DIGEST_SHA1,
            ]),
            signature_canonicalization_algorithm: ALGO_C14N_EXCLUSIVE_OMIT_COMMENTS.to_string(),
        }
    }
}

/// Signature algorithm policy of one client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignaturePolicy {
    blacklisted_algorithms: Vec<String>,
    signature_algorithms: Vec<String>,
    signature_reference_digest_methods: Vec<String>,
    signature_canonicalization_algorithm: String,
}

impl SignaturePolicy {
    pub fn blacklisted_algorithms(&self) -> &[String] {
        &self.blacklisted_algorithms
    }

    pub fn signature_algorithms(&self) -> &[String] {
        &self.signature_algorithms
    }

    pub fn signature_reference_digest_methods(&self) -> &[String] {
        &self.signature_reference_digest_methods
    }

    pub fn signature_canonicalization_algorithm(&self) -> &str {
        &self.signature_canonicalization_algorithm
    }
}

impl From<&SigningDefaults> for SignaturePolicy {
    fn from(defaults: &SigningDefaults) -> Self {
        Self {
            blacklisted_algorithms: defaults.blacklisted_algorithms.clone(),
            signature_algorithms: defaults.signature_algorithms.clone(),
            signature_reference_digest_methods: defaults
                .signature_reference_digest_methods
                .iter()
                .filter(|method| method.as_str() != EXCLUDED_DIGEST_METHOD)
                .cloned()
                .collect(),
            signature_canonicalization_algorithm: defaults
                .signature_canonicalization_algorithm
                .clone(),
        }
    }
}
