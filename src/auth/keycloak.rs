//! The Keycloak handle the logout flow reads tokens and endpoints from.

use url::Url;

use crate::error::Result;

/// How the logout request reaches the end-session endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoutMethod {
    /// Browser redirect with token hints in the query string.
    #[default]
    Get,
    /// Form POST with token hints in the body.
    Post,
}

#[derive(Debug, Clone, Default)]
pub struct LogoutOptions {
    pub method: LogoutMethod,
    pub redirect_uri: Option<String>,
}

/// State of a live Keycloak client: where it talks to and what it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeycloakInstance {
    pub auth_server_url: String,
    pub realm: String,
    pub client_id: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Default post-logout redirect configured on the client.
    pub redirect_uri: Option<String>,
}

impl KeycloakInstance {
    pub fn new(
        auth_server_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            auth_server_url: auth_server_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            id_token: None,
            refresh_token: None,
            redirect_uri: None,
        }
    }

    pub fn with_tokens(
        mut self,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.id_token = Some(id_token.into());
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// `{server}/realms/{realm}/protocol/openid-connect/logout`
    pub fn logout_endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(self.auth_server_url.trim_end_matches('/'))?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["realms", self.realm.as_str(), "protocol", "openid-connect", "logout"]);
        Ok(url)
    }

    /// Logout URL for the given method.
    ///
    /// POST logouts carry their hints in the body, so the bare endpoint is
    /// returned. GET logouts get `client_id`, `post_logout_redirect_uri`
    /// and, when an ID token is held, `id_token_hint` in the query.
    /// `current_href` is the redirect target of last resort.
    pub fn create_logout_url(&self, options: &LogoutOptions, current_href: &str) -> Result<Url> {
        let mut url = self.logout_endpoint()?;
        if options.method == LogoutMethod::Post {
            return Ok(url);
        }

        let redirect = options
            .redirect_uri
            .as_deref()
            .or(self.redirect_uri.as_deref())
            .unwrap_or(current_href);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("post_logout_redirect_uri", redirect);
            if let Some(id_token) = &self.id_token {
                query.append_pair("id_token_hint", id_token);
            }
        }
        Ok(url)
    }
}
