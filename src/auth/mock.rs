use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{AuthService, InitConfig, KeycloakInstance, KeycloakService};
use crate::error::Result;

/// Service-level Keycloak handle with a fixed instance.
pub struct StaticKeycloakService(pub Option<KeycloakInstance>);

impl KeycloakService for StaticKeycloakService {
    fn keycloak_instance(&self) -> Option<KeycloakInstance> {
        self.0.clone()
    }
}

/// A scripted auth service for tests. Records what the decorator forwards.
pub struct MockAuthService {
    init_result: bool,
    token_result: bool,
    headers: HashMap<String, String>,
    keycloak_service: Option<StaticKeycloakService>,
    keycloak: Option<KeycloakInstance>,
    init_calls: Mutex<Vec<Option<InitConfig>>>,
    logouts: AtomicUsize,
    token_updates: AtomicUsize,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self {
            init_result: true,
            token_result: true,
            headers: HashMap::new(),
            keycloak_service: None,
            keycloak: None,
            init_calls: Mutex::new(Vec::new()),
            logouts: AtomicUsize::new(0),
            token_updates: AtomicUsize::new(0),
        }
    }

    pub fn with_init_result(mut self, result: bool) -> Self {
        self.init_result = result;
        self
    }

    pub fn with_token_result(mut self, result: bool) -> Self {
        self.token_result = result;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_keycloak_service(mut self, instance: Option<KeycloakInstance>) -> Self {
        self.keycloak_service = Some(StaticKeycloakService(instance));
        self
    }

    pub fn with_keycloak(mut self, instance: KeycloakInstance) -> Self {
        self.keycloak = Some(instance);
        self
    }

    /// Configs passed to `init`, in call order.
    pub fn init_calls(&self) -> Vec<Option<InitConfig>> {
        self.init_calls.lock().unwrap().clone()
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn token_update_count(&self) -> usize {
        self.token_updates.load(Ordering::SeqCst)
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn init(&self, config: Option<InitConfig>) -> Result<bool> {
        self.init_calls.lock().unwrap().push(config);
        Ok(self.init_result)
    }

    fn header_values(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    async fn logout(&self) -> Result<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_token_if_needed(&self) -> Result<bool> {
        self.token_updates.fetch_add(1, Ordering::SeqCst);
        Ok(self.token_result)
    }

    fn keycloak_service(&self) -> Option<&dyn KeycloakService> {
        self.keycloak_service
            .as_ref()
            .map(|s| s as &dyn KeycloakService)
    }

    fn keycloak(&self) -> Option<KeycloakInstance> {
        self.keycloak.clone()
    }
}
