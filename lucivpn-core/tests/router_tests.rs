//! Router set and poller behaviour

mod common;

use common::*;
use lucivpn_core::config::RouterConfig;
use lucivpn_core::error::{LuciError, RpcError};
use lucivpn_core::vpn::{run_poller, RegistryEvent, Router, Routers};
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use wiremock::{MockServer, ResponseTemplate};

async fn healthy_router(sections: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    login_returning("tok").mount(&server).await;
    uci_call("tok", json!({"method": "get_all"}))
        .respond_with(rpc_result(sections))
        .mount(&server)
        .await;
    server
}

/// Test connect_all keeps going when one router is down
#[tokio::test]
async fn test_connect_all_isolates_failures() {
    let server = healthy_router(json!({})).await;

    let mut down = RouterConfig::new("127.0.0.1:59997".to_string(), USERNAME.to_string());
    down.password = Some(PASSWORD.to_string());

    let configs = vec![router_config(&server), down];
    let (routers, failures) = Routers::connect_all(&configs, None).await;

    assert_eq!(routers.len(), 1);
    assert!(routers.get(&host_of(&server)).is_some());
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "127.0.0.1:59997");
    assert!(matches!(failures[0].1, LuciError::Auth(_)));
}

/// Test poll_all polls every router and reports only the failing one
#[tokio::test]
async fn test_poll_all_isolates_hosts() {
    let good = healthy_router(json!({"cfg1": {".name": "home", "enabled": "1"}})).await;

    let bad = MockServer::start().await;
    login_returning("tok").mount(&bad).await;
    uci_call("tok", json!({"method": "get_all"}))
        .respond_with(ResponseTemplate::new(500))
        .mount(&bad)
        .await;

    let (mut routers, failures) =
        Routers::connect_all(&[router_config(&good), router_config(&bad)], None).await;
    assert!(failures.is_empty());

    let poll_failures = routers.poll_all().await;

    assert_eq!(poll_failures.len(), 1);
    assert_eq!(poll_failures[0].0, host_of(&bad));
    assert_eq!(poll_failures[0].1, RpcError::Status { status: 500 });

    let good_router = routers.get(&host_of(&good)).unwrap();
    assert_eq!(good_router.registry().is_enabled("home"), Some(true));
    assert!(routers.get(&host_of(&bad)).unwrap().registry().is_empty());
}

/// Test registries stay separate per host
#[tokio::test]
async fn test_registries_are_per_host() {
    let first = healthy_router(json!({"cfg1": {".name": "home", "enabled": "1"}})).await;
    let second = healthy_router(json!({"cfg1": {".name": "home", "enabled": "0"}})).await;

    let (mut routers, _) =
        Routers::connect_all(&[router_config(&first), router_config(&second)], None).await;
    routers.poll_all().await;

    assert_eq!(
        routers.get(&host_of(&first)).unwrap().registry().is_enabled("home"),
        Some(true)
    );
    assert_eq!(
        routers.get(&host_of(&second)).unwrap().registry().is_enabled("home"),
        Some(false)
    );
}

/// Test the poller polls immediately and stops on shutdown
#[tokio::test]
async fn test_run_poller_polls_until_shutdown() {
    let server = healthy_router(json!({"cfg1": {".name": "home", "enabled": "1"}})).await;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let router = Router::connect(router_config(&server), Some(events_tx))
        .await
        .unwrap();
    assert_eq!(router.scan_interval(), Duration::from_secs(600));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(run_poller(router, shutdown_rx));

    let first = tokio::time::timeout(Duration::from_secs(5), events_rx.recv())
        .await
        .expect("poll within timeout");
    assert_eq!(
        first,
        Some(RegistryEvent::Discovered {
            host: host_of(&server),
            name: "home".to_string()
        })
    );

    shutdown_tx.send(true).unwrap();
    let router = tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .expect("poller stops")
        .unwrap();

    assert_eq!(router.registry().is_enabled("home"), Some(true));
    assert_eq!(uci_requests(&server).await.len(), 1);
}

/// Test switching through a router reads the new state back
#[tokio::test]
async fn test_router_turn_off() {
    let server = healthy_router(json!({"cfg1": {".name": "home", "enabled": "1"}})).await;
    uci_call("tok", json!({"method": "set", "params": ["openvpn", "home", "enabled", "0"]}))
        .respond_with(rpc_result(json!(true)))
        .mount(&server)
        .await;
    uci_call("tok", json!({"method": "commit"}))
        .respond_with(rpc_result(json!(true)))
        .mount(&server)
        .await;
    uci_call("tok", json!({"method": "get"}))
        .respond_with(rpc_result(json!("0")))
        .mount(&server)
        .await;

    let mut router = Router::connect(router_config(&server), None).await.unwrap();
    router.poll().await.unwrap();
    router.turn_off("home").await.unwrap();

    assert_eq!(router.registry().is_enabled("home"), Some(false));
    assert!(!router.status("home").await.unwrap());
}
