//! The auth service contract shared by the wrapped Keycloak client and the
//! decorator around it.

pub mod custom;
pub mod end_session;
pub mod keycloak;
pub mod mock;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use custom::{AuthSettings, CustomAuthService, LogoutOutcome};
pub use keycloak::KeycloakInstance;

/// Options handed to [`AuthService::init`].
///
/// `url` is the authority, `idp_hint` preselects an identity provider.
/// Anything else a caller wants to pass lives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_hint: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Exposes the Keycloak client owned by an auth service.
pub trait KeycloakService: Send + Sync {
    fn keycloak_instance(&self) -> Option<KeycloakInstance>;
}

/// An authentication service the shell talks to.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Set up the session. Returns whether the user is authenticated.
    async fn init(&self, config: Option<InitConfig>) -> Result<bool>;

    /// Headers to attach to outgoing API calls.
    fn header_values(&self) -> HashMap<String, String>;

    async fn logout(&self) -> Result<()>;

    /// Refresh the access token if it is close to expiry.
    async fn update_token_if_needed(&self) -> Result<bool>;

    /// Service-level handle onto the Keycloak client, if any.
    fn keycloak_service(&self) -> Option<&dyn KeycloakService> {
        None
    }

    /// Direct Keycloak client, for services without a service-level handle.
    fn keycloak(&self) -> Option<KeycloakInstance> {
        None
    }
}

/// Keycloak client reachable through `service`: the service-level handle
/// wins when present, even if it currently holds no instance.
pub fn resolve_keycloak(service: &dyn AuthService) -> Option<KeycloakInstance> {
    match service.keycloak_service() {
        Some(handle) => handle.keycloak_instance(),
        None => service.keycloak(),
    }
}
