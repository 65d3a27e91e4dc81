//! Decorator that adds a BFF configuration lookup in front of `init` and a
//! POST end-session request in front of `logout`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::end_session::{EndSessionOutcome, end_session};
use super::{AuthService, InitConfig, resolve_keycloak};
use crate::bff::{ConfigRequest, ConfigResponse, ExtensionsClient};
use crate::consts::{BFF_URL_SETTING, IDM_ID_KEY, IDM_ID_PARAM, IDP_HINT_KEY, LOGOUT_REDIRECT_URL_KEY};
use crate::error::{Error, Result};
use crate::host::Host;

/// Settings read from the injected config map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    /// Base URL of the BFF serving the configuration endpoint.
    pub bff_url: Option<String>,
}

impl AuthSettings {
    pub fn from_map(config: &HashMap<String, String>) -> Self {
        Self {
            bff_url: config
                .get(BFF_URL_SETTING)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// What `logout` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// End-session POST was redirected; the host navigated to this URL.
    Redirected(String),
    /// End-session POST succeeded; the host reloaded.
    Reloaded,
    /// No Keycloak handle was reachable; the wrapped service logged out.
    Delegated,
}

/// Wraps a Keycloak-backed [`AuthService`].
pub struct CustomAuthService {
    delegate: Arc<dyn AuthService>,
    settings: AuthSettings,
    host: Host,
    http: reqwest::Client,
}

impl CustomAuthService {
    pub fn new(delegate: Arc<dyn AuthService>, config: &HashMap<String, String>, host: Host) -> Self {
        Self {
            delegate,
            settings: AuthSettings::from_map(config),
            host,
            http: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, test servers).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    pub fn delegate(&self) -> &Arc<dyn AuthService> {
        &self.delegate
    }

    /// Ask the BFF for the authority and identity provider hint, sending
    /// along the hints a previous session stored, and store the new ones.
    pub async fn fetch_configuration(&self) -> Result<ConfigResponse> {
        let bff_url = self
            .settings
            .bff_url
            .as_deref()
            .ok_or(Error::MissingSetting(BFF_URL_SETTING))?;
        let client = ExtensionsClient::new(self.http.clone(), bff_url)?;

        let request = ConfigRequest {
            href: self.host.location.href(),
            idp_hint: self.host.storage.get(IDP_HINT_KEY)?,
            idm_id: self.stored_idm_id()?,
        };
        let response = client.get_configuration(&request).await?;

        if let Some(idp_hint) = response.idp_hint.as_deref().filter(|s| !s.is_empty()) {
            self.host.storage.set(IDP_HINT_KEY, idp_hint)?;
        }
        if let Some(idm_id) = response.idm_id.as_deref().filter(|s| !s.is_empty()) {
            self.host.storage.set(IDM_ID_KEY, idm_id)?;
        }

        tracing::info!(
            url = ?response.url,
            idp_hint = ?response.idp_hint,
            "received auth configuration"
        );
        Ok(response)
    }

    /// The `idmId` query parameter of the stored logout redirect URL, or the
    /// stored `idmId` when that URL carries none.
    fn stored_idm_id(&self) -> Result<Option<String>> {
        let redirect = self.host.storage.get(LOGOUT_REDIRECT_URL_KEY)?;
        let origin = Url::parse(&self.host.location.origin())?;
        let redirect = origin.join(redirect.as_deref().unwrap_or("/"))?;

        let from_redirect = redirect
            .query_pairs()
            .find(|(k, _)| k == IDM_ID_PARAM)
            .map(|(_, v)| v.into_owned());

        match from_redirect {
            Some(id) => Ok(Some(id)),
            None => self.host.storage.get(IDM_ID_KEY),
        }
    }

    /// Log out, preferring a POST end-session request when a Keycloak
    /// handle is reachable through the wrapped service.
    pub async fn logout_with_outcome(&self) -> Result<LogoutOutcome> {
        let Some(instance) = resolve_keycloak(self.delegate.as_ref()) else {
            tracing::warn!("Could not logout via POST. Using GET.");
            self.delegate.logout().await?;
            return Ok(LogoutOutcome::Delegated);
        };

        let current = self.host.location.href();
        match end_session(&self.http, &instance, &current).await? {
            EndSessionOutcome::Redirected(url) => {
                tracing::info!(%url, "end-session redirected");
                self.host.location.assign(&url);
                Ok(LogoutOutcome::Redirected(url))
            }
            EndSessionOutcome::Completed => {
                tracing::info!("end-session completed, reloading");
                self.host.location.reload();
                Ok(LogoutOutcome::Reloaded)
            }
        }
    }
}

#[async_trait]
impl AuthService for CustomAuthService {
    /// Any `config` passed in is replaced by what the BFF returns.
    async fn init(&self, _config: Option<InitConfig>) -> Result<bool> {
        let ConfigResponse { url, idp_hint, .. } = self.fetch_configuration().await?;
        let config = InitConfig {
            url,
            idp_hint,
            ..InitConfig::default()
        };
        self.delegate.init(Some(config)).await
    }

    fn header_values(&self) -> HashMap<String, String> {
        self.delegate.header_values()
    }

    async fn logout(&self) -> Result<()> {
        self.logout_with_outcome().await.map(|_| ())
    }

    async fn update_token_if_needed(&self) -> Result<bool> {
        self.delegate.update_token_if_needed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mock::MockAuthService;

    fn config(bff_url: &str) -> HashMap<String, String> {
        HashMap::from([(BFF_URL_SETTING.to_string(), bff_url.to_string())])
    }

    fn service(delegate: Arc<MockAuthService>, config: &HashMap<String, String>) -> CustomAuthService {
        CustomAuthService::new(
            delegate,
            config,
            Host::in_memory("https://shell.example.com/app").unwrap(),
        )
    }

    #[test]
    fn settings_read_bff_url() {
        let settings = AuthSettings::from_map(&config("https://bff.example.com"));
        assert_eq!(settings.bff_url.as_deref(), Some("https://bff.example.com"));
    }

    #[test]
    fn blank_bff_url_counts_as_missing() {
        assert_eq!(AuthSettings::from_map(&config("  ")).bff_url, None);
        assert_eq!(AuthSettings::from_map(&HashMap::new()).bff_url, None);
    }

    #[tokio::test]
    async fn init_without_bff_url_fails_before_delegating() {
        let delegate = Arc::new(MockAuthService::new());
        let svc = service(delegate.clone(), &HashMap::new());

        let err = svc.init(None).await.unwrap_err();
        assert!(matches!(err, Error::MissingSetting(BFF_URL_SETTING)));
        assert!(delegate.init_calls().is_empty());
    }

    #[test]
    fn header_values_forward_to_delegate() {
        let delegate = Arc::new(MockAuthService::new().with_header("Authorization", "Bearer token"));
        let svc = service(delegate, &config("https://bff.example.com"));

        assert_eq!(
            svc.header_values(),
            HashMap::from([("Authorization".to_string(), "Bearer token".to_string())])
        );
    }

    #[tokio::test]
    async fn update_token_forwards_to_delegate() {
        let delegate = Arc::new(MockAuthService::new().with_token_result(false));
        let svc = service(delegate.clone(), &config("https://bff.example.com"));

        assert!(!svc.update_token_if_needed().await.unwrap());
        assert_eq!(delegate.token_update_count(), 1);
    }

    #[tokio::test]
    async fn logout_without_handle_delegates() {
        let delegate = Arc::new(MockAuthService::new());
        let svc = service(delegate.clone(), &config("https://bff.example.com"));

        assert_eq!(svc.logout_with_outcome().await.unwrap(), LogoutOutcome::Delegated);
        assert_eq!(delegate.logout_count(), 1);
    }

    #[test]
    fn idm_id_prefers_logout_redirect_query() {
        let host = Host::in_memory("https://shell.example.com/app").unwrap();
        host.storage.set(LOGOUT_REDIRECT_URL_KEY, "/?idmId=from-url").unwrap();
        host.storage.set(IDM_ID_KEY, "from-key").unwrap();
        let svc = CustomAuthService::new(Arc::new(MockAuthService::new()), &HashMap::new(), host);

        assert_eq!(svc.stored_idm_id().unwrap().as_deref(), Some("from-url"));
    }

    #[test]
    fn idm_id_empty_query_param_wins() {
        let host = Host::in_memory("https://shell.example.com/app").unwrap();
        host.storage.set(LOGOUT_REDIRECT_URL_KEY, "/?idmId=").unwrap();
        host.storage.set(IDM_ID_KEY, "from-key").unwrap();
        let svc = CustomAuthService::new(Arc::new(MockAuthService::new()), &HashMap::new(), host);

        assert_eq!(svc.stored_idm_id().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn idm_id_falls_back_to_stored_key() {
        let host = Host::in_memory("https://shell.example.com/app").unwrap();
        host.storage.set(LOGOUT_REDIRECT_URL_KEY, "/welcome?lang=en").unwrap();
        host.storage.set(IDM_ID_KEY, "from-key").unwrap();
        let svc = CustomAuthService::new(Arc::new(MockAuthService::new()), &HashMap::new(), host);

        assert_eq!(svc.stored_idm_id().unwrap().as_deref(), Some("from-key"));
    }

    #[test]
    fn idm_id_reads_absolute_redirect_url() {
        let host = Host::in_memory("https://shell.example.com/app").unwrap();
        host.storage
            .set(LOGOUT_REDIRECT_URL_KEY, "https://other.example.com/bye?idmId=abs")
            .unwrap();
        let svc = CustomAuthService::new(Arc::new(MockAuthService::new()), &HashMap::new(), host);

        assert_eq!(svc.stored_idm_id().unwrap().as_deref(), Some("abs"));
    }

    #[test]
    fn idm_id_absent_everywhere_is_none() {
        let svc = service(Arc::new(MockAuthService::new()), &HashMap::new());
        assert!(svc.stored_idm_id().unwrap().is_none());
    }
}
