//! SAML client objects handed out by the registry.

use crate::errors::SettingsError;
use crate::saml::configuration::ClientConfiguration;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Query parameter used to carry the client name when none is configured
pub const DEFAULT_CLIENT_NAME_PARAMETER: &str = "client_name";

/// Base callback URL that every client extends with its own name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackUrlTemplate {
    base: Url,
    parameter: String,
}

impl CallbackUrlTemplate {
    pub fn new(base: &str, parameter: &str) -> Result<Self, SettingsError> {
        let parameter = parameter.trim();
        if parameter.is_empty() {
            return Err(SettingsError::BlankClientNameParameter);
        }
        let base = Url::parse(base.trim())
            .map_err(|e| SettingsError::InvalidCallbackUrl(base.to_string(), e))?;
        Ok(Self {
            base,
            parameter: parameter.to_string(),
        })
    }

    /// Name of the query parameter carrying the client name
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Callback URL for `client_name`.
    ///
    /// A base URL that already carries the parameter is returned unchanged.
    pub fn url_for(&self, client_name: &str) -> String {
        if self.base.query_pairs().any(|(key, _)| key == self.parameter) {
            return self.base.to_string();
        }
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair(&self.parameter, client_name);
        url.to_string()
    }
}

/// Authenticated user profile as seen by authorization generators
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub client_name: Option<String>,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Computes roles and permissions for a freshly authenticated profile
pub trait AuthorizationGenerator: Send + Sync {
    fn generate(&self, profile: UserProfile) -> UserProfile;
}

impl<F> AuthorizationGenerator for F
where
    F: Fn(UserProfile) -> UserProfile + Send + Sync,
{
    fn generate(&self, profile: UserProfile) -> UserProfile {
        self(profile)
    }
}

/// Grants a fixed set of roles and permissions to every profile
#[derive(Clone, Debug, Default)]
pub struct DefaultRolesPermissionsGenerator {
    roles: Vec<String>,
    permissions: Vec<String>,
}

impl DefaultRolesPermissionsGenerator {
    pub fn new(roles: Vec<String>, permissions: Vec<String>) -> Self {
        Self { roles, permissions }
    }
}

impl AuthorizationGenerator for DefaultRolesPermissionsGenerator {
    fn generate(&self, mut profile: UserProfile) -> UserProfile {
        profile.roles.extend(self.roles.iter().cloned());
        profile.permissions.extend(self.permissions.iter().cloned());
        profile
    }
}

/// A named SAML client bound to its database-loaded configuration
#[derive(Clone)]
pub struct SamlClient {
    name: String,
    configuration: Arc<ClientConfiguration>,
    callback_url: Option<String>,
    authorization_generators: Vec<Arc<dyn AuthorizationGenerator>>,
}

impl SamlClient {
    pub fn new(name: impl Into<String>, configuration: ClientConfiguration) -> Self {
        Self {
            name: name.into(),
            configuration: Arc::new(configuration),
            callback_url: None,
            authorization_generators: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn authorization_generator_count(&self) -> usize {
        self.authorization_generators.len()
    }

    pub(crate) fn update_callback_url(&mut self, template: &CallbackUrlTemplate) {
        self.callback_url = Some(template.url_for(&self.name));
    }

    pub(crate) fn add_authorization_generators(
        &mut self,
        generators: &[Arc<dyn AuthorizationGenerator>],
    ) {
        self.authorization_generators
            .extend(generators.iter().cloned());
    }

    /// Tag `profile` with this client and run the authorization generators in order
    pub fn generate_authorization(&self, mut profile: UserProfile) -> UserProfile {
        profile.client_name = Some(self.name.clone());
        self.authorization_generators
            .iter()
            .fold(profile, |profile, generator| generator.generate(profile))
    }
}

impl fmt::Debug for SamlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamlClient")
            .field("name", &self.name)
            .field("callback_url", &self.callback_url)
            .field(
                "authorization_generators",
                &self.authorization_generators.len(),
            )
            .field("configuration", &self.configuration)
            .finish()
    }
}
