//! Client for the backend-for-frontend configuration endpoint.
//!
//! The BFF tells the shell which authority to talk to and which identity
//! provider to preselect, given the page the user landed on and whatever
//! hints a previous session left behind.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::consts::CONFIG_PATH;
use crate::error::{Error, Result};

/// Body of the configuration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idm_id: Option<String>,
}

/// Authority and hints returned by the BFF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub idp_hint: Option<String>,
    #[serde(default)]
    pub idm_id: Option<String>,
}

/// Typed access to the BFF's internal extension endpoints.
#[derive(Debug, Clone)]
pub struct ExtensionsClient {
    http: reqwest::Client,
    config_url: Url,
}

impl ExtensionsClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self> {
        // Without the trailing slash `join` would replace the last segment.
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let config_url = Url::parse(&base)?.join(CONFIG_PATH)?;
        Ok(Self { http, config_url })
    }

    pub fn config_url(&self) -> &Url {
        &self.config_url
    }

    /// POST the request and decode the BFF's answer.
    pub async fn get_configuration(&self, request: &ConfigRequest) -> Result<ConfigResponse> {
        tracing::debug!(
            url = %self.config_url,
            href = %request.href,
            idp_hint = ?request.idp_hint,
            idm_id = ?request.idm_id,
            "requesting configuration"
        );

        let resp = self
            .http
            .post(self.config_url.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ConfigRequest {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}
