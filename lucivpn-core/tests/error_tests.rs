//! Unit tests for error types and conversions

use lucivpn_core::error::{AuthError, ConfigError, KeyringError, LuciError, RpcError};

#[test]
fn test_auth_error_display() {
    let error = AuthError::Rejected {
        host: "192.168.1.1".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Login rejected by 192.168.1.1: check username and password"
    );
}

#[test]
fn test_rpc_error_display() {
    assert_eq!(
        RpcError::InvalidToken.to_string(),
        "Router rejected the session token"
    );
    assert_eq!(
        RpcError::Status { status: 502 }.to_string(),
        "Unexpected HTTP status 502"
    );
}

#[test]
fn test_refresh_error_wraps_auth_error() {
    let auth = AuthError::RpcModuleMissing {
        host: "router.lan".to_string(),
    };
    let rpc: RpcError = auth.clone().into();
    assert_eq!(rpc, RpcError::Refresh(auth));
    assert!(rpc.to_string().starts_with("Token refresh failed:"));
}

#[test]
fn test_keyring_error_display() {
    assert_eq!(
        KeyringError::PasswordNotFound.to_string(),
        "Router password not found in keyring"
    );
}

#[test]
fn test_luci_error_from_conversions() {
    let config: LuciError = ConfigError::MissingField {
        field: "router".to_string(),
    }
    .into();
    assert!(matches!(config, LuciError::Config(_)));

    let rpc: LuciError = RpcError::Unauthorized.into();
    assert!(matches!(rpc, LuciError::Rpc(_)));

    let io: LuciError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, LuciError::Io(_)));
}

#[test]
fn test_luci_error_from_toml() {
    let toml_error: toml::de::Error =
        toml::from_str::<serde_json::Value>("invalid toml").unwrap_err();
    let error: LuciError = toml_error.into();
    assert!(matches!(error, LuciError::Toml(_)));
}
