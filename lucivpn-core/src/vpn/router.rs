//! Routers and polling
//!
//! A `Router` pairs the RPC client of one host with that host's registry.
//! `Routers` is the caller-owned set of them, indexed by host. Hosts never
//! share state; a failure on one does not stop the others.

use crate::auth::password::resolve_password;
use crate::config::RouterConfig;
use crate::error::{LuciError, RpcError};
use crate::rpc::{Session, UciClient};
use crate::vpn::registry::{get_enabled, RegistryEvent, VpnRegistry};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// One configured router with its session and registry
#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    client: UciClient,
    registry: VpnRegistry,
}

impl Router {
    /// Resolve the password, log in, and create an empty registry
    ///
    /// # Errors
    ///
    /// Returns a keyring error when no password is available, or an
    /// authentication error when the login fails.
    #[tracing::instrument(skip(config, events), fields(host = %config.host))]
    pub async fn connect(
        config: RouterConfig,
        events: Option<mpsc::UnboundedSender<RegistryEvent>>,
    ) -> Result<Self, LuciError> {
        let password = resolve_password(&config)?;
        let session = Session::from_config(&config, password).await?;
        Ok(Self::from_parts(config, UciClient::new(session), events))
    }

    /// Assemble a router from an existing client
    pub fn from_parts(
        config: RouterConfig,
        client: UciClient,
        events: Option<mpsc::UnboundedSender<RegistryEvent>>,
    ) -> Self {
        let mut registry = VpnRegistry::new(config.host.clone());
        if let Some(events) = events {
            registry = registry.with_events(events);
        }
        Self {
            config,
            client,
            registry,
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn registry(&self) -> &VpnRegistry {
        &self.registry
    }

    /// Polling interval, never below the minimum
    pub fn scan_interval(&self) -> Duration {
        self.config.scan_interval()
    }

    /// Poll every OpenVPN section of this router
    pub async fn poll(&mut self) -> Result<BTreeMap<String, bool>, RpcError> {
        self.registry.poll(&mut self.client).await
    }

    /// Read one instance's state directly from the router
    pub async fn status(&mut self, name: &str) -> Result<bool, RpcError> {
        get_enabled(&mut self.client, name).await
    }

    /// Re-read one known instance; failures leave the state unchanged
    pub async fn refresh_instance(&mut self, name: &str) -> Option<bool> {
        self.registry.refresh_instance(&mut self.client, name).await
    }

    /// Re-read every known instance
    pub async fn refresh_all(&mut self) -> BTreeMap<String, bool> {
        self.registry.refresh_all(&mut self.client).await
    }

    pub async fn turn_on(&mut self, name: &str) -> Result<(), RpcError> {
        self.registry.turn_on(&mut self.client, name).await
    }

    pub async fn turn_off(&mut self, name: &str) -> Result<(), RpcError> {
        self.registry.turn_off(&mut self.client, name).await
    }
}

/// Caller-owned set of routers, indexed by host
#[derive(Debug, Default)]
pub struct Routers {
    routers: BTreeMap<String, Router>,
}

impl Routers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to every configured router
    ///
    /// Routers that fail to connect are returned next to the set instead of
    /// aborting the others.
    pub async fn connect_all(
        configs: &[RouterConfig],
        events: Option<mpsc::UnboundedSender<RegistryEvent>>,
    ) -> (Self, Vec<(String, LuciError)>) {
        let mut routers = Self::new();
        let mut failures = Vec::new();

        for config in configs {
            match Router::connect(config.clone(), events.clone()).await {
                Ok(router) => {
                    info!("Connected to {}", config.host);
                    routers.insert(router);
                }
                Err(e) => {
                    error!("Cannot connect to {}: {}", config.host, e);
                    failures.push((config.host.clone(), e));
                }
            }
        }

        (routers, failures)
    }

    /// Add a router, replacing any router with the same host
    pub fn insert(&mut self, router: Router) -> Option<Router> {
        self.routers.insert(router.host().to_string(), router)
    }

    pub fn get(&self, host: &str) -> Option<&Router> {
        self.routers.get(host)
    }

    pub fn get_mut(&mut self, host: &str) -> Option<&mut Router> {
        self.routers.get_mut(host)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.routers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Poll every router once, in host order
    ///
    /// Returns the hosts whose poll failed.
    pub async fn poll_all(&mut self) -> Vec<(String, RpcError)> {
        let mut failures = Vec::new();
        for (host, router) in self.routers.iter_mut() {
            if let Err(e) = router.poll().await {
                warn!("Poll of {} failed: {}", host, e);
                failures.push((host.clone(), e));
            }
        }
        failures
    }

    /// Take the routers out of the set, e.g. to give each its own poller task
    pub fn into_routers(self) -> impl Iterator<Item = Router> {
        self.routers.into_values()
    }
}

/// Poll a router on its scan interval until `shutdown` becomes `true`
///
/// The first poll runs immediately. Poll failures are logged and the loop
/// carries on. The router is handed back when the loop stops.
pub async fn run_poller(mut router: Router, mut shutdown: watch::Receiver<bool>) -> Router {
    let interval = router.scan_interval();
    info!(
        "Polling {} every {}s",
        router.host(),
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = router.poll().await {
                    warn!("Poll of {} failed: {}", router.host(), e);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Stopped polling {}", router.host());
    router
}
