//! Registry of the SAML clients configured in the database.
//!
//! The client collection is built once, on first use, from the names the
//! [`ConfigurationCache`] knows. The whole build runs under one critical
//! section and is published only when every client validated. A failed build
//! publishes nothing, and the next call builds again. The collection can not
//! be replaced from outside.

use crate::errors::RegistryError;
use crate::saml::client::{
    AuthorizationGenerator, CallbackUrlTemplate, DEFAULT_CLIENT_NAME_PARAMETER, SamlClient,
};
use crate::saml::configuration::ClientConfiguration;
use crate::saml::security::SigningDefaults;
use crate::storage::cache::ConfigurationCache;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Case-insensitive form of a client name, shared by duplicate detection and lookup
fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lazily-built collection of database-configured SAML clients
pub struct ClientRegistry {
    cache: Arc<ConfigurationCache>,
    signing_defaults: SigningDefaults,
    callback: Option<CallbackUrlTemplate>,
    authorization_generators: Vec<Arc<dyn AuthorizationGenerator>>,
    clients: OnceCell<Vec<SamlClient>>,
}

impl ClientRegistry {
    pub fn new(cache: Arc<ConfigurationCache>) -> Self {
        Self {
            cache,
            signing_defaults: SigningDefaults::default(),
            callback: None,
            authorization_generators: Vec::new(),
            clients: OnceCell::new(),
        }
    }

    /// Give every client a callback URL derived from `template`
    pub fn with_callback(mut self, template: CallbackUrlTemplate) -> Self {
        self.callback = Some(template);
        self
    }

    /// Add a generator applied to the profiles of every client
    pub fn with_authorization_generator(
        mut self,
        generator: Arc<dyn AuthorizationGenerator>,
    ) -> Self {
        self.authorization_generators.push(generator);
        self
    }

    /// Replace the platform signing defaults the client policies derive from
    pub fn with_signing_defaults(mut self, signing_defaults: SigningDefaults) -> Self {
        self.signing_defaults = signing_defaults;
        self
    }

    /// Query parameter that carries the client name on callbacks
    pub fn client_name_parameter(&self) -> &str {
        self.callback
            .as_ref()
            .map(CallbackUrlTemplate::parameter)
            .unwrap_or(DEFAULT_CLIENT_NAME_PARAMETER)
    }

    pub fn is_initialized(&self) -> bool {
        self.clients.initialized()
    }

    /// Build the client collection unless it has already been built
    pub async fn initialize(&self) -> Result<(), RegistryError> {
        self.clients().await.map(|_| ())
    }

    /// Every registered client, in name order. Empty when no records exist.
    pub async fn list_clients(&self) -> Result<&[SamlClient], RegistryError> {
        self.clients().await.map(Vec::as_slice)
    }

    /// The client registered under `name`, compared case-insensitively
    pub async fn find_client(&self, name: &str) -> Result<&SamlClient, RegistryError> {
        let wanted = fold_name(name);
        self.clients()
            .await?
            .iter()
            .find(|client| fold_name(client.name()) == wanted)
            .ok_or_else(|| RegistryError::ClientNotFound(name.to_string()))
    }

    /// The client named by the client name parameter of a query string
    pub async fn find_client_in_query(&self, query: &str) -> Result<&SamlClient, RegistryError> {
        let parameter = self.client_name_parameter();
        let name = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == parameter)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RegistryError::MissingClientNameParameter(parameter.to_string()))?;
        self.find_client(&name).await
    }

    /// The first registered client of type `T`
    pub async fn find_client_of<T: Any>(&self) -> Result<&T, RegistryError> {
        self.clients()
            .await?
            .iter()
            .find_map(|client| (client as &dyn Any).downcast_ref::<T>())
            .ok_or(RegistryError::ClientTypeNotFound(std::any::type_name::<T>()))
    }

    async fn clients(&self) -> Result<&Vec<SamlClient>, RegistryError> {
        self.clients.get_or_try_init(|| self.build()).await
    }

    async fn build(&self) -> Result<Vec<SamlClient>, RegistryError> {
        let names = self.cache.names().await?;

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(fold_name(name)) {
                return Err(RegistryError::DuplicateName(name.clone()));
            }
        }

        let mut clients = Vec::with_capacity(names.len());
        for name in &names {
            let configuration =
                ClientConfiguration::load(name, self.cache.as_ref(), &self.signing_defaults).await?;
            let mut client = SamlClient::new(name.clone(), configuration);
            if let Some(template) = &self.callback {
                client.update_callback_url(template);
            }
            if !self.authorization_generators.is_empty() {
                client.add_authorization_generators(&self.authorization_generators);
            }
            clients.push(client);
        }

        tracing::info!(count = clients.len(), names = ?names, "Dynamically loaded SAML clients");
        Ok(clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::MemoryRecordSource;
    use crate::storage::traits::RawClientRecord;

    fn registry(records: Vec<RawClientRecord>) -> ClientRegistry {
        let source = Arc::new(MemoryRecordSource::new(records));
        ClientRegistry::new(Arc::new(ConfigurationCache::new(source)))
    }

    #[tokio::test]
    async fn test_empty_source_yields_no_clients() {
        let registry = registry(vec![]);
        assert!(!registry.is_initialized());
        assert!(registry.list_clients().await.unwrap().is_empty());
        assert!(registry.is_initialized());
        assert!(matches!(
            registry.find_client("SAML_0").await,
            Err(RegistryError::ClientNotFound(_))
        ));
        assert!(matches!(
            registry.find_client_of::<SamlClient>().await,
            Err(RegistryError::ClientTypeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_is_detected_before_validation() {
        // Neither record could be materialized; the duplicate wins anyway.
        let registry = registry(vec![
            RawClientRecord {
                client_name: "A".to_string(),
                ..Default::default()
            },
            RawClientRecord {
                client_name: "a".to_string(),
                ..Default::default()
            },
        ]);
        assert!(matches!(
            registry.initialize().await,
            Err(RegistryError::DuplicateName(name)) if name == "a"
        ));
        assert!(!registry.is_initialized());
    }

    #[tokio::test]
    async fn test_invalid_record_aborts_build() {
        let registry = registry(vec![RawClientRecord {
            client_name: "SAML_0".to_string(),
            ..Default::default()
        }]);
        assert!(matches!(
            registry.list_clients().await,
            Err(RegistryError::Config(_))
        ));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_fold_name_is_unicode_aware() {
        assert_eq!(fold_name(" Ärzte "), fold_name("ÄRZTE"));
        assert_eq!(fold_name("Ärzte"), "ärzte");
        assert_ne!(fold_name("Ärzte"), fold_name("Arzte"));
    }

    #[test]
    fn test_client_name_parameter() {
        let registry = registry(vec![]);
        assert_eq!(registry.client_name_parameter(), DEFAULT_CLIENT_NAME_PARAMETER);

        let registry = registry
            .with_callback(CallbackUrlTemplate::new("http://myappli/callback", "type").unwrap());
        assert_eq!(registry.client_name_parameter(), "type");
    }
}
