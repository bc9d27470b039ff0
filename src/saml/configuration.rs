//! Validated, materialized configuration of one SAML client.

use crate::errors::{ConfigError, RegistryError};
use crate::saml::constants::DEFAULT_DESTINATION_BINDING;
use crate::saml::constants::SamlBinding;
use crate::saml::keystore::{
    CredentialStore, DEFAULT_KEYSTORE_TYPE, KeystoreParameters, KeystoreType,
};
use crate::saml::resource::{ByteArrayResource, StringResource};
use crate::saml::security::{SignaturePolicy, SigningDefaults};
use crate::storage::traits::{RawClientRecord, RecordSource};
use std::fmt;
use std::path::Path;

/// Configuration of one SAML client, built from a database record.
///
/// Either every mandatory field is present and the keystore has been
/// materialized, or construction fails. There is no partially valid value.
#[derive(Clone)]
pub struct ClientConfiguration {
    name: String,
    environment: String,
    destination_binding_type: String,
    identity_provider_entity_id: String,
    identity_provider_metadata: StringResource,
    keystore_type: KeystoreType,
    keystore_resource: ByteArrayResource,
    keystore_password: String,
    keystore_alias: String,
    private_key_password: String,
    maximum_authentication_lifetime: u64,
    service_provider_entity_id: String,
    credential_store: CredentialStore,
    signature_policy: SignaturePolicy,
}

fn require(client: &str, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            client: client.to_string(),
            field,
        })
    } else {
        Ok(())
    }
}

impl ClientConfiguration {
    /// Load the record for `name` from `source` and build its configuration
    pub async fn load(
        name: &str,
        source: &dyn RecordSource,
        signing_defaults: &SigningDefaults,
    ) -> Result<Self, RegistryError> {
        if name.trim().is_empty() {
            return Err(ConfigError::BlankClientName.into());
        }
        let record = source.load_one(name).await?;
        Ok(Self::from_record(name, record, signing_defaults)?)
    }

    /// Validate `record` as the configuration of client `name` and materialize it
    pub fn from_record(
        name: &str,
        record: Option<RawClientRecord>,
        signing_defaults: &SigningDefaults,
    ) -> Result<Self, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::BlankClientName);
        }

        let record = record.ok_or_else(|| ConfigError::RecordNotFound(name.to_string()))?;
        if record.client_name != name {
            return Err(ConfigError::RecordNameMismatch {
                requested: name.to_string(),
                found: record.client_name,
            });
        }

        let destination_binding_type = record
            .destination_binding_type
            .filter(|binding| !binding.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESTINATION_BINDING.uri().to_string());
        let keystore_password = record.keystore_password.unwrap_or_default();
        let private_key_password = record.private_key_password.unwrap_or_default();
        let keystore_type = DEFAULT_KEYSTORE_TYPE;

        require(name, "clientName", name)?;
        require(name, "destinationBindingType", &destination_binding_type)?;
        require(name, "identityProviderEntityId", &record.identity_provider_entity_id)?;
        require(name, "identityProviderMetadata", &record.identity_provider_metadata)?;
        require(name, "keystoreType", keystore_type.name())?;
        if record.keystore_data.is_empty() {
            return Err(ConfigError::MissingField {
                client: name.to_string(),
                field: "keystoreBinaryData",
            });
        }
        require(name, "keystorePassword", &keystore_password)?;
        require(name, "keystoreAlias", &record.keystore_alias)?;
        require(name, "privateKeyPassword", &private_key_password)?;
        if record.maximum_authentication_lifetime <= 0 {
            return Err(ConfigError::NonPositiveLifetime {
                client: name.to_string(),
                value: record.maximum_authentication_lifetime,
            });
        }
        require(name, "serviceProviderEntityId", &record.service_provider_entity_id)?;

        let credential_store = CredentialStore::open(
            &record.keystore_data,
            KeystoreParameters {
                client_name: name,
                keystore_type: Some(keystore_type.name()),
                alias: Some(record.keystore_alias.as_str()),
                password: &keystore_password,
            },
        )?;
        // The key itself is not kept; it only has to be recoverable.
        let _ = credential_store.private_key(credential_store.alias(), &private_key_password)?;

        Ok(Self {
            name: name.to_string(),
            environment: record.environment,
            destination_binding_type,
            identity_provider_entity_id: record.identity_provider_entity_id,
            identity_provider_metadata: StringResource::new(record.identity_provider_metadata),
            keystore_type,
            keystore_resource: ByteArrayResource::new(record.keystore_data),
            keystore_password,
            keystore_alias: record.keystore_alias,
            private_key_password,
            maximum_authentication_lifetime: record.maximum_authentication_lifetime as u64,
            service_provider_entity_id: record.service_provider_entity_id,
            credential_store,
            signature_policy: SignaturePolicy::from(signing_defaults),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Environment tag of the record the configuration was built from
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Destination binding URI, the redirect binding unless the record names one
    pub fn destination_binding_type(&self) -> &str {
        &self.destination_binding_type
    }

    /// The destination binding, if it is one of the standard SAML bindings
    pub fn destination_binding(&self) -> Option<SamlBinding> {
        SamlBinding::from_uri(&self.destination_binding_type)
    }

    pub fn identity_provider_entity_id(&self) -> &str {
        &self.identity_provider_entity_id
    }

    pub fn identity_provider_metadata_resource(&self) -> &StringResource {
        &self.identity_provider_metadata
    }

    /// Always `None`: metadata comes from the database, not a file
    pub fn identity_provider_metadata_path(&self) -> Option<&Path> {
        None
    }

    pub fn keystore_type(&self) -> KeystoreType {
        self.keystore_type
    }

    pub fn keystore_alias(&self) -> &str {
        &self.keystore_alias
    }

    pub fn keystore_password(&self) -> &str {
        &self.keystore_password
    }

    pub fn private_key_password(&self) -> &str {
        &self.private_key_password
    }

    pub fn keystore_resource(&self) -> &ByteArrayResource {
        &self.keystore_resource
    }

    /// Always `None`: the keystore comes from the database, not a file
    pub fn keystore_path(&self) -> Option<&Path> {
        None
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.credential_store
    }

    /// Maximum authentication lifetime in seconds
    pub fn maximum_authentication_lifetime(&self) -> u64 {
        self.maximum_authentication_lifetime
    }

    pub fn service_provider_entity_id(&self) -> &str {
        &self.service_provider_entity_id
    }

    pub fn signature_policy(&self) -> &SignaturePolicy {
        &self.signature_policy
    }
}

impl fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("name", &self.name)
            .field("environment", &self.environment)
            .field("destination_binding_type", &self.destination_binding_type)
            .field("identity_provider_entity_id", &self.identity_provider_entity_id)
            .field("keystore_type", &self.keystore_type)
            .field("keystore_alias", &self.keystore_alias)
            .field("keystore_password", &"<redacted>")
            .field("private_key_password", &"<redacted>")
            .field(
                "maximum_authentication_lifetime",
                &self.maximum_authentication_lifetime,
            )
            .field("service_provider_entity_id", &self.service_provider_entity_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saml::constants::ALGO_DIGEST_SHA512;
    use crate::saml::resource::Resource;
    use crate::storage::inmemory::MemoryRecordSource;

    const KEYSTORE: &[u8] = include_bytes!("../../tests/fixtures/sp_keystore_0.p12");
    const METADATA: &str = include_str!("../../tests/fixtures/idp_metadata_0.xml");

    fn record(name: &str) -> RawClientRecord {
        RawClientRecord {
            client_name: name.to_string(),
            environment: "Unit_Test_Env".to_string(),
            keystore_data: KEYSTORE.to_vec(),
            keystore_password: Some("Keystore_Pwd_0".to_string()),
            keystore_alias: "sp0".to_string(),
            private_key_password: Some("Keystore_Pwd_0".to_string()),
            identity_provider_metadata: METADATA.to_string(),
            identity_provider_entity_id: "https://idp.testshib.org/idp/shibboleth".to_string(),
            service_provider_entity_id: "urn:samldb:unittest:sp1".to_string(),
            maximum_authentication_lifetime: 3600,
            destination_binding_type: None,
        }
    }

    fn build(record: RawClientRecord) -> Result<ClientConfiguration, ConfigError> {
        let name = record.client_name.clone();
        ClientConfiguration::from_record(&name, Some(record), &SigningDefaults::default())
    }

    #[test]
    fn test_valid_record() {
        let configuration = build(record("SAML_0")).unwrap();

        assert_eq!(configuration.name(), "SAML_0");
        assert_eq!(configuration.environment(), "Unit_Test_Env");
        assert_eq!(
            configuration.destination_binding(),
            Some(DEFAULT_DESTINATION_BINDING)
        );
        assert_eq!(configuration.keystore_type(), KeystoreType::Pkcs12);
        assert_eq!(configuration.keystore_alias(), "sp0");
        assert_eq!(configuration.maximum_authentication_lifetime(), 3600);
        assert_eq!(
            configuration.identity_provider_entity_id(),
            "https://idp.testshib.org/idp/shibboleth"
        );
        assert_eq!(
            configuration.service_provider_entity_id(),
            "urn:samldb:unittest:sp1"
        );
        assert!(configuration.keystore_path().is_none());
        assert!(configuration.identity_provider_metadata_path().is_none());
        assert!(configuration.keystore_resource().exists());
        assert!(configuration.identity_provider_metadata_resource().exists());
        assert!(configuration.credential_store().is_key_entry("sp0"));
        assert!(
            !configuration
                .signature_policy()
                .signature_reference_digest_methods()
                .iter()
                .any(|m| m == ALGO_DIGEST_SHA512)
        );
    }

    #[test]
    fn test_explicit_binding_is_kept() {
        let mut post = record("SAML_0");
        post.destination_binding_type = Some(SamlBinding::HttpPost.uri().to_string());
        let configuration = build(post).unwrap();
        assert_eq!(configuration.destination_binding(), Some(SamlBinding::HttpPost));

        let mut blank = record("SAML_0");
        blank.destination_binding_type = Some("  ".to_string());
        let configuration = build(blank).unwrap();
        assert_eq!(
            configuration.destination_binding_type(),
            DEFAULT_DESTINATION_BINDING.uri()
        );
    }

    #[test]
    fn test_blank_name_and_missing_record() {
        let defaults = SigningDefaults::default();
        assert!(matches!(
            ClientConfiguration::from_record(" ", Some(record(" ")), &defaults),
            Err(ConfigError::BlankClientName)
        ));
        assert!(matches!(
            ClientConfiguration::from_record("SAML_0", None, &defaults),
            Err(ConfigError::RecordNotFound(name)) if name == "SAML_0"
        ));
        assert!(matches!(
            ClientConfiguration::from_record("SAML_0", Some(record("saml_0")), &defaults),
            Err(ConfigError::RecordNameMismatch { found, .. }) if found == "saml_0"
        ));
    }

    #[test]
    fn test_blank_fields_are_named() {
        let cases: Vec<(&str, fn(&mut RawClientRecord))> = vec![
            (
                "identityProviderEntityId",
                |r: &mut RawClientRecord| r.identity_provider_entity_id.clear(),
            ),
            (
                "identityProviderMetadata",
                |r: &mut RawClientRecord| r.identity_provider_metadata = " \n".to_string(),
            ),
            ("keystoreBinaryData", |r: &mut RawClientRecord| r.keystore_data.clear()),
            ("keystorePassword", |r: &mut RawClientRecord| r.keystore_password = None),
            ("keystoreAlias", |r: &mut RawClientRecord| r.keystore_alias = "\t".to_string()),
            (
                "privateKeyPassword",
                |r: &mut RawClientRecord| r.private_key_password = Some(String::new()),
            ),
            (
                "serviceProviderEntityId",
                |r: &mut RawClientRecord| r.service_provider_entity_id = "  ".to_string(),
            ),
        ];

        for (expected, mutate) in cases {
            let mut broken = record("SAML_0");
            mutate(&mut broken);
            match build(broken) {
                Err(ConfigError::MissingField { field, client }) => {
                    assert_eq!(field, expected);
                    assert_eq!(client, "SAML_0");
                }
                other => panic!("{expected}: expected MissingField, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_lifetime_must_be_positive() {
        for value in [0, -1] {
            let mut broken = record("SAML_0");
            broken.maximum_authentication_lifetime = value;
            assert!(matches!(
                build(broken),
                Err(ConfigError::NonPositiveLifetime { value: v, .. }) if v == value
            ));
        }
    }

    #[test]
    fn test_keystore_errors_are_fatal() {
        let mut corrupt = record("SAML_0");
        corrupt.keystore_data = b"garbage".to_vec();
        assert!(matches!(build(corrupt), Err(ConfigError::KeystoreUnreadable { .. })));

        let mut wrong_alias = record("SAML_0");
        wrong_alias.keystore_alias = "sp9".to_string();
        assert!(matches!(build(wrong_alias), Err(ConfigError::KeyEntryNotFound { .. })));

        let mut wrong_key_password = record("SAML_0");
        wrong_key_password.private_key_password = Some("Priv_Key_Pwd_0".to_string());
        assert!(matches!(
            build(wrong_key_password),
            Err(ConfigError::PrivateKeyUnrecoverable { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let configuration = build(record("SAML_0")).unwrap();
        let debug = format!("{:?}", configuration);
        assert!(!debug.contains("Keystore_Pwd_0"));
        assert!(debug.contains("SAML_0"));
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = MemoryRecordSource::new(vec![record("SAML_0")]);
        let defaults = SigningDefaults::default();

        let configuration = ClientConfiguration::load("SAML_0", &source, &defaults)
            .await
            .unwrap();
        assert_eq!(configuration.name(), "SAML_0");

        assert!(matches!(
            ClientConfiguration::load("SAML_1", &source, &defaults).await,
            Err(RegistryError::Config(ConfigError::RecordNotFound(_)))
        ));
        assert!(matches!(
            ClientConfiguration::load("", &source, &defaults).await,
            Err(RegistryError::Config(ConfigError::BlankClientName))
        ));
    }
}
