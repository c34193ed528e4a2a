//! Rally Web Services API client.
//!
//! Sync HTTP client for the Rally WSAPI with HTTP Basic or API-key
//! authentication and the standard integration-identification headers.

mod attachments;
mod projects;
mod query;
mod workspaces;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use ureq::Agent;

use crate::error::RallyError;

pub use query::{QueryRequest, QueryResult};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Path segment every WSAPI endpoint lives under.
const SERVICE_PATH: &str = "/slm";

/// Credentials for the WSAPI session.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// HTTP Basic username/password.
    Basic {
        /// Account username (usually an email address).
        username: String,
        /// Account password.
        password: String,
    },
    /// API key, sent as the `ZSESSIONID` header.
    ApiKey(String),
}

/// Client identification sent with every request via the
/// `X-RallyIntegration*` headers.
#[derive(Debug, Clone)]
pub struct Integration {
    /// Integration name.
    pub name: String,
    /// Integration vendor.
    pub vendor: String,
    /// Integration version.
    pub version: String,
}

impl Default for Integration {
    fn default() -> Self {
        Self {
            name: "attex".to_owned(),
            vendor: "attex".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Rally WSAPI client. One authenticated session per instance.
pub struct RallyClient {
    agent: Agent,
    base_url: String,
    api_version: String,
    credentials: Credentials,
    integration: Integration,
}

impl RallyClient {
    /// Open a session against the WSAPI and validate it with a
    /// subscription read.
    ///
    /// The base URL is normalized to target the `/slm` service path; a
    /// trailing slash is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`RallyError::ConnectionFailed`] when the probe request
    /// fails. This is fatal to an export run.
    pub fn connect(
        base_url: &str,
        credentials: Credentials,
        api_version: &str,
        integration: Integration,
    ) -> Result<Self, RallyError> {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let client = Self {
            agent,
            base_url: normalize_base_url(base_url),
            api_version: api_version.to_owned(),
            credentials,
            integration,
        };
        client.probe()?;
        info!("connected to {}", client.base_url);
        Ok(client)
    }

    /// WSAPI endpoint root, e.g. `https://host/slm/webservice/v2.0`.
    pub(crate) fn webservice_url(&self) -> String {
        format!("{}/webservice/{}", self.base_url, self.api_version)
    }

    /// Object ref for a workspace OID.
    #[must_use]
    pub fn workspace_ref(&self, oid: &str) -> String {
        format!("{}/workspace/{oid}", self.webservice_url())
    }

    /// Validate the session with a subscription read.
    fn probe(&self) -> Result<(), RallyError> {
        let url = format!("{}/subscription", self.webservice_url());
        let params = [("fetch".to_owned(), "Name".to_owned())];
        self.get_json::<serde_json::Value>(&url, &params)
            .map(|_| ())
            .map_err(|err| RallyError::ConnectionFailed {
                url: self.base_url.clone(),
                reason: err.to_string(),
            })
    }

    /// GET a WSAPI URL with query parameters, returning deserialized
    /// JSON. Non-2xx statuses become [`RallyError::HttpResponse`].
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, RallyError> {
        debug!(url, "GET");

        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .header("X-RallyIntegrationName", &self.integration.name)
            .header("X-RallyIntegrationVendor", &self.integration.vendor)
            .header("X-RallyIntegrationVersion", &self.integration.version);

        request = match &self.credentials {
            Credentials::Basic { username, password } => {
                request.header("Authorization", &basic_auth(username, password))
            }
            Credentials::ApiKey(key) => request.header("ZSESSIONID", key),
        };

        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = request.call()?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(RallyError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body.read_json()?)
    }
}

/// `Basic` authorization header value for a username/password pair.
fn basic_auth(username: &str, password: &str) -> String {
    let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

/// Ensure the base URL targets the `/slm` service path.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(SERVICE_PATH) {
        trimmed.to_owned()
    } else {
        format!("{trimmed}{SERVICE_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_appends_service_path() {
        assert_eq!(
            normalize_base_url("https://rally.example.com"),
            "https://rally.example.com/slm"
        );
    }

    #[test]
    fn test_normalize_tolerates_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://rally.example.com/"),
            "https://rally.example.com/slm"
        );
        assert_eq!(
            normalize_base_url("https://rally.example.com/slm/"),
            "https://rally.example.com/slm"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_service_path() {
        assert_eq!(
            normalize_base_url("https://rally.example.com/slm"),
            "https://rally.example.com/slm"
        );
    }

    #[test]
    fn test_basic_auth_header() {
        // "user:pass" in base64
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }
}
