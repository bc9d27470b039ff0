//! SAML 2.0 binding URIs and XML security algorithm identifiers.

// ============================================================================
// Binding URIs
// ============================================================================

/// SAML binding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamlBinding {
    /// HTTP POST binding.
    HttpPost,
    /// HTTP Redirect binding.
    HttpRedirect,
    /// HTTP Artifact binding.
    HttpArtifact,
    /// SOAP binding.
    Soap,
}

impl SamlBinding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [Self::HttpPost, Self::HttpRedirect, Self::HttpArtifact, Self::Soap]
            .into_iter()
            .find(|binding| binding.uri() == uri.trim())
    }
}

/// Binding used when a record leaves the destination binding type blank.
pub const DEFAULT_DESTINATION_BINDING: SamlBinding = SamlBinding::HttpRedirect;

// ============================================================================
// Signature algorithms
// ============================================================================

pub const ALGO_SIGNATURE_RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const ALGO_SIGNATURE_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ALGO_SIGNATURE_RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
pub const ALGO_SIGNATURE_RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
pub const ALGO_SIGNATURE_RSA_MD5: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-md5";
pub const ALGO_SIGNATURE_ECDSA_SHA1: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha1";
pub const ALGO_SIGNATURE_ECDSA_SHA256: &str =
    "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
pub const ALGO_SIGNATURE_ECDSA_SHA384: &str =
    "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384";
pub const ALGO_SIGNATURE_ECDSA_SHA512: &str =
    "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512";
pub const ALGO_SIGNATURE_DSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#dsa-sha1";

// ============================================================================
// MAC algorithms
// ============================================================================

pub const ALGO_MAC_HMAC_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#hmac-sha1";
pub const ALGO_MAC_HMAC_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha256";
pub const ALGO_MAC_HMAC_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha384";
pub const ALGO_MAC_HMAC_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha512";
pub const ALGO_MAC_HMAC_MD5: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-md5";

// ============================================================================
// Digest methods
// ============================================================================

pub const ALGO_DIGEST_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const ALGO_DIGEST_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const ALGO_DIGEST_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const ALGO_DIGEST_SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
pub const ALGO_DIGEST_MD5: &str = "http://www.w3.org/2001/04/xmldsig-more#md5";

// ============================================================================
// Canonicalization
// ============================================================================

pub const ALGO_C14N_EXCLUSIVE_OMIT_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_from_uri() {
        assert_eq!(
            SamlBinding::from_uri(" urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST "),
            Some(SamlBinding::HttpPost)
        );
        assert_eq!(SamlBinding::from_uri("urn:example:unknown"), None);
    }

    #[test]
    fn test_default_binding_is_redirect() {
        assert_eq!(
            DEFAULT_DESTINATION_BINDING.uri(),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"
        );
    }
}
