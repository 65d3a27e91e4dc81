//! POST variant of the OpenID Connect end-session request.

use super::keycloak::{KeycloakInstance, LogoutMethod, LogoutOptions};
use crate::error::{Error, Result};

/// How the identity provider answered the end-session POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndSessionOutcome {
    /// The provider redirected; carries the final URL.
    Redirected(String),
    /// The provider answered 2xx without redirecting.
    Completed,
}

/// Send the end-session POST for `instance`.
///
/// Token hints travel form-encoded in the body. Hints the instance does not
/// hold are left out rather than sent empty.
pub async fn end_session(
    http: &reqwest::Client,
    instance: &KeycloakInstance,
    post_logout_redirect_uri: &str,
) -> Result<EndSessionOutcome> {
    let options = LogoutOptions {
        method: LogoutMethod::Post,
        redirect_uri: None,
    };
    let logout_url = instance.create_logout_url(&options, post_logout_redirect_uri)?;

    let mut form: Vec<(&str, &str)> = Vec::with_capacity(4);
    if let Some(id_token) = &instance.id_token {
        form.push(("id_token_hint", id_token.as_str()));
    }
    form.push(("client_id", instance.client_id.as_str()));
    if let Some(refresh_token) = &instance.refresh_token {
        form.push(("refresh_token", refresh_token.as_str()));
    }
    form.push(("post_logout_redirect_uri", post_logout_redirect_uri));

    tracing::debug!(url = %logout_url, client_id = %instance.client_id, "sending end-session request");

    let resp = http.post(logout_url.clone()).form(&form).send().await?;

    if resp.url() != &logout_url {
        return Ok(EndSessionOutcome::Redirected(resp.url().to_string()));
    }

    let status = resp.status();
    if status.is_success() {
        return Ok(EndSessionOutcome::Completed);
    }

    Err(Error::LogoutFailed {
        status: status.as_u16(),
    })
}
