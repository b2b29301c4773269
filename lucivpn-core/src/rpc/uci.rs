//! UCI calls over LuCI JSON-RPC
//!
//! `UciClient` owns the router session and sends UCI methods to the
//! `/cgi-bin/luci/rpc/uci` endpoint. An expired token is refreshed and the
//! call retried once; a second rejection is returned to the caller and the
//! fresh token is kept for the next call.

use crate::error::RpcError;
use crate::rpc::session::{Endpoint, Session};
use serde_json::Value;
use tracing::{debug, info, warn};

/// UCI methods exposed by the LuCI RPC module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciMethod {
    /// `get_all(config[, section])`
    GetAll,
    /// `get(config, section, option)`
    Get,
    /// `set(config, section, option, value)`
    Set,
    /// `commit(config)`
    Commit,
}

impl UciMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UciMethod::GetAll => "get_all",
            UciMethod::Get => "get",
            UciMethod::Set => "set",
            UciMethod::Commit => "commit",
        }
    }
}

impl std::fmt::Display for UciMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RPC client bound to one router session
#[derive(Debug)]
pub struct UciClient {
    session: Session,
}

impl UciClient {
    /// Wrap an established session
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Router host of the underlying session
    pub fn host(&self) -> &str {
        self.session.host()
    }

    /// Invoke a UCI method and return its decoded `result`
    ///
    /// Each call logs in at most once. On an invalid-token response the
    /// session is refreshed and the call sent once more; if this call already
    /// had to log in because no token was held, the rejection is returned
    /// without another login. Every other failure is returned as is.
    #[tracing::instrument(skip(self), fields(host = %self.session.host()))]
    pub async fn call(&mut self, method: UciMethod, args: &[&str]) -> Result<Value, RpcError> {
        let logged_in = if self.session.is_authenticated() {
            false
        } else {
            debug!("No token held, logging in before {}", method);
            self.session.refresh().await?;
            true
        };

        match self.send(method, args).await {
            Err(RpcError::InvalidToken) if logged_in => {
                warn!("Fresh token rejected, giving up on {}", method);
                Err(RpcError::InvalidToken)
            }
            Err(RpcError::InvalidToken) => {
                info!("Refreshing login token");
                self.session.invalidate();
                self.session.refresh().await?;

                let retried = self.send(method, args).await;
                if matches!(retried, Err(RpcError::InvalidToken)) {
                    warn!("Token rejected again after refresh, giving up on {}", method);
                }
                retried
            }
            other => other,
        }
    }

    async fn send(&mut self, method: UciMethod, args: &[&str]) -> Result<Value, RpcError> {
        self.session
            .post(Endpoint::Uci, method.as_str(), args, true)
            .await
    }
}
