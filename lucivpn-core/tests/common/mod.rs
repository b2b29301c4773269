//! Fake LuCI router shared by the integration tests

#![allow(dead_code)]

use lucivpn_core::config::RouterConfig;
use lucivpn_core::rpc::{Session, UciClient};
use lucivpn_core::types::RouterPassword;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const AUTH_PATH: &str = "/cgi-bin/luci/rpc/auth";
pub const UCI_PATH: &str = "/cgi-bin/luci/rpc/uci";
pub const USERNAME: &str = "root";
pub const PASSWORD: &str = "secret";

/// JSON-RPC success envelope
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": 1, "result": result, "error": null}))
}

/// Mock a login that hands out `token`
pub fn login_returning(token: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_partial_json(json!({"method": "login", "params": [USERNAME, PASSWORD]})))
        .respond_with(rpc_result(json!(token)))
}

/// Mock a UCI call made with `token`
pub fn uci_call(token: &str, body: Value) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(UCI_PATH))
        .and(query_param("auth", token))
        .and(body_partial_json(body))
}

/// Host string of the fake router
pub fn host_of(server: &MockServer) -> String {
    server.address().to_string()
}

/// Router configuration pointing at the fake router, password inline
pub fn router_config(server: &MockServer) -> RouterConfig {
    let mut config = RouterConfig::new(host_of(server), USERNAME.to_string());
    config.password = Some(PASSWORD.to_string());
    config
}

/// Log in to the fake router
pub async fn connect(server: &MockServer) -> UciClient {
    let session = Session::connect(
        &host_of(server),
        USERNAME,
        RouterPassword::from(PASSWORD),
        false,
        true,
    )
    .await
    .expect("login against fake router");
    UciClient::new(session)
}

/// Bodies of the UCI requests the fake router received, in order
pub async fn uci_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == UCI_PATH)
        .map(|r| serde_json::from_slice(&r.body).expect("JSON body"))
        .collect()
}

/// Number of login requests the fake router received
pub async fn login_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == AUTH_PATH)
        .count()
}
