//! Authenticated LuCI session
//!
//! Holds the router address, credentials and TLS options, and the token
//! obtained from the LuCI login endpoint. The token is replaced in place when
//! it is refreshed.

use crate::config::{RouterConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{AuthError, RpcError};
use crate::rpc::jsonrpc::{decode_response, JsonRpcRequest};
use crate::types::{AuthToken, RouterPassword, LUCI_RPC_AUTH_PATH, LUCI_RPC_UCI_PATH};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// LuCI RPC endpoints of a router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Auth,
    Uci,
}

/// One authenticated session against a router
#[derive(Debug)]
pub struct Session {
    host: String,
    username: String,
    password: RouterPassword,
    token: Option<AuthToken>,
    base_url: Url,
    auth_url: Url,
    uci_url: Url,
    client: Client,
    next_id: u64,
}

impl Session {
    /// Log in to a router with the default request timeout
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the credentials are rejected or the router
    /// cannot be reached.
    pub async fn connect(
        host: &str,
        username: &str,
        password: RouterPassword,
        use_ssl: bool,
        verify_ssl: bool,
    ) -> Result<Self, AuthError> {
        let mut session = Self::new(
            host,
            username,
            password,
            use_ssl,
            verify_ssl,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )?;
        session.refresh().await?;
        Ok(session)
    }

    /// Log in to the router described by `config`
    pub async fn from_config(
        config: &RouterConfig,
        password: RouterPassword,
    ) -> Result<Self, AuthError> {
        let mut session = Self::new(
            &config.host,
            &config.username,
            password,
            config.use_ssl,
            config.verify_ssl,
            config.timeout(),
        )?;
        session.refresh().await?;
        Ok(session)
    }

    /// Build an unauthenticated session
    ///
    /// No request is sent; the first `refresh` performs the login.
    pub fn new(
        host: &str,
        username: &str,
        password: RouterPassword,
        use_ssl: bool,
        verify_ssl: bool,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let scheme = if use_ssl { "https" } else { "http" };
        let invalid = |e: url::ParseError| AuthError::InvalidAddress {
            host: host.to_string(),
            reason: e.to_string(),
        };
        let base_url = Url::parse(&format!("{}://{}", scheme, host)).map_err(invalid)?;
        let auth_url = base_url.join(LUCI_RPC_AUTH_PATH).map_err(invalid)?;
        let uci_url = base_url.join(LUCI_RPC_UCI_PATH).map_err(invalid)?;

        let client = Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| AuthError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self {
            host: host.to_string(),
            username: username.to_string(),
            password,
            token: None,
            base_url,
            auth_url,
            uci_url,
            client,
            next_id: 1,
        })
    }

    /// Reacquire the token using the stored credentials
    ///
    /// Safe to call repeatedly; each call performs exactly one login request
    /// and never retries on its own. On failure the session is left without a
    /// token.
    #[tracing::instrument(skip(self), fields(host = %self.host, username = %self.username))]
    pub async fn refresh(&mut self) -> Result<(), AuthError> {
        self.token = None;

        let username = self.username.clone();
        let password = self.password.clone();
        let result = self
            .post(
                Endpoint::Auth,
                "login",
                &[username.as_str(), password.expose()],
                false,
            )
            .await;

        match result {
            Ok(Value::String(token)) if !token.is_empty() => {
                info!("Obtained LuCI token for {}", self.host);
                self.token = Some(AuthToken::new(token));
                Ok(())
            }
            Ok(Value::Null) | Ok(Value::String(_)) => {
                warn!("Login rejected by {}", self.host);
                Err(AuthError::Rejected {
                    host: self.host.clone(),
                })
            }
            Ok(other) => Err(AuthError::Protocol {
                host: self.host.clone(),
                reason: format!("expected a token string, got {}", other),
            }),
            Err(e) => Err(self.login_error(e)),
        }
    }

    /// Drop the current token
    ///
    /// The next call through the RPC client logs in again before sending.
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            debug!("Invalidated LuCI token for {}", self.host);
        }
    }

    /// Current token, if logged in
    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Whether the session currently holds a token
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Router host this session talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// LuCI login user
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Base URL of the router, `<scheme>://<host>/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST one JSON-RPC request to a LuCI endpoint
    ///
    /// With `with_token`, the current token is sent as the `auth` query
    /// parameter.
    pub(crate) async fn post(
        &mut self,
        endpoint: Endpoint,
        method: &str,
        params: &[&str],
        with_token: bool,
    ) -> Result<Value, RpcError> {
        let id = self.next_id;
        self.next_id += 1;

        let url = match endpoint {
            Endpoint::Auth => self.auth_url.clone(),
            Endpoint::Uci => self.uci_url.clone(),
        };
        let mut request = self
            .client
            .post(url.clone())
            .json(&JsonRpcRequest { id, method, params });
        if with_token {
            if let Some(token) = &self.token {
                request = request.query(&[("auth", token.expose())]);
            }
        }

        debug!(id, method, url = %url, "Sending LuCI RPC request");

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        debug!(id, status = %status, "LuCI RPC response received");
        decode_response(status, &body)
    }

    fn login_error(&self, error: RpcError) -> AuthError {
        let host = self.host.clone();
        match error {
            RpcError::Unauthorized | RpcError::InvalidToken => AuthError::Rejected { host },
            RpcError::RpcModuleMissing => AuthError::RpcModuleMissing { host },
            RpcError::Network { reason } => AuthError::Unreachable { host, reason },
            other => AuthError::Protocol {
                host,
                reason: other.to_string(),
            },
        }
    }
}

fn network_error(e: reqwest::Error) -> RpcError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection refused or unreachable".to_string()
    } else {
        format!("request failed: {}", e)
    };
    RpcError::Network { reason }
}
