//! LuCI JSON-RPC envelope
//!
//! Request encoding and response classification shared by the login and UCI
//! endpoints.

use crate::error::RpcError;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Outgoing JSON-RPC request
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [&'a str],
}

/// Classify an HTTP response from a LuCI RPC endpoint
///
/// 403 is the router's way of saying the token is no longer valid.
pub fn decode_response(status: StatusCode, body: &str) -> Result<Value, RpcError> {
    match status {
        StatusCode::OK => {}
        StatusCode::UNAUTHORIZED => return Err(RpcError::Unauthorized),
        StatusCode::FORBIDDEN => return Err(RpcError::InvalidToken),
        StatusCode::NOT_FOUND => return Err(RpcError::RpcModuleMissing),
        other => {
            return Err(RpcError::Status {
                status: other.as_u16(),
            })
        }
    }

    let envelope: Value =
        serde_json::from_str(body).map_err(|e| RpcError::MalformedResponse {
            reason: format!("invalid JSON: {}", e),
        })?;

    let object = envelope
        .as_object()
        .ok_or_else(|| RpcError::MalformedResponse {
            reason: "response is not a JSON object".to_string(),
        })?;

    match object.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => {
            return Err(RpcError::Remote {
                message: message.clone(),
            })
        }
        Some(other) => {
            return Err(RpcError::Remote {
                message: other.to_string(),
            })
        }
    }

    object
        .get("result")
        .cloned()
        .ok_or_else(|| RpcError::MalformedResponse {
            reason: "no result in response".to_string(),
        })
}
