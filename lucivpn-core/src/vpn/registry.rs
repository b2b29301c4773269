//! VPN instance registry for one router
//!
//! The registry is filled by polling `get_all openvpn`. An instance exists
//! here only after a poll has returned it; it is never removed. Each poll
//! overwrites the enabled flag, and a known instance missing from the
//! response is recorded as disabled.

use crate::error::RpcError;
use crate::rpc::{UciClient, UciMethod};
use crate::types::{ENABLED_OPTION, OPENVPN_CONFIG};
use crate::vpn::instance::{parse_enabled, VpnInstance};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A poll returned an instance name not seen before on this host
    Discovered { host: String, name: String },

    /// A poll completed and the registry reflects it
    StateUpdated { host: String },
}

/// In-memory map of VPN instance name to last known state
#[derive(Debug)]
pub struct VpnRegistry {
    host: String,
    instances: HashMap<String, VpnInstance>,
    events: Option<mpsc::UnboundedSender<RegistryEvent>>,
}

impl VpnRegistry {
    /// Create an empty registry for a router host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            instances: HashMap::new(),
            events: None,
        }
    }

    /// Send discovery and update events to `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<RegistryEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn get(&self, name: &str) -> Option<&VpnInstance> {
        self.instances.get(name)
    }

    /// Last known state of an instance, `None` if never polled
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.instances.get(name).map(VpnInstance::is_enabled)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances sorted by name
    pub fn instances(&self) -> Vec<&VpnInstance> {
        let mut instances: Vec<_> = self.instances.values().collect();
        instances.sort_by(|a, b| a.name().cmp(b.name()));
        instances
    }

    /// Name to enabled flag for every known instance
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.instances
            .iter()
            .map(|(name, instance)| (name.clone(), instance.is_enabled()))
            .collect()
    }

    /// Poll the router and update the registry
    ///
    /// Returns the state of every known instance after the poll. On error the
    /// registry is left untouched.
    #[tracing::instrument(skip(self, client), fields(host = %self.host))]
    pub async fn poll(&mut self, client: &mut UciClient) -> Result<BTreeMap<String, bool>, RpcError> {
        let result = client.call(UciMethod::GetAll, &[OPENVPN_CONFIG]).await?;
        debug!("get_all openvpn returned: {}", result);
        self.apply_poll(&result)
    }

    /// Apply a `get_all openvpn` result to the registry
    pub fn apply_poll(&mut self, result: &Value) -> Result<BTreeMap<String, bool>, RpcError> {
        let sections = result
            .as_object()
            .ok_or_else(|| RpcError::MalformedResponse {
                reason: format!("get_all {} did not return an object", OPENVPN_CONFIG),
            })?;

        let mut observed: HashMap<String, bool> = HashMap::new();
        for (key, section) in sections {
            let Some(options) = section.as_object() else {
                debug!("Skipping non-section entry {}", key);
                continue;
            };

            let name = options
                .get(".name")
                .and_then(Value::as_str)
                .unwrap_or(key)
                .to_string();
            let enabled = parse_enabled(options.get(ENABLED_OPTION));
            observed.insert(name, enabled);
        }

        for instance in self.instances.values_mut() {
            if !observed.contains_key(instance.name()) && instance.is_enabled() {
                debug!("{} missing from poll, marking disabled", instance.name());
                instance.set_enabled(false);
            }
        }

        for (name, enabled) in observed {
            match self.instances.get_mut(&name) {
                Some(instance) => {
                    if instance.set_enabled(enabled) {
                        info!("vpn {} is now {}", name, if enabled { "on" } else { "off" });
                    }
                }
                None => {
                    info!("vpn {} found", name);
                    self.instances
                        .insert(name.clone(), VpnInstance::new(name.clone(), enabled));
                    self.emit(RegistryEvent::Discovered {
                        host: self.host.clone(),
                        name,
                    });
                }
            }
        }

        self.emit(RegistryEvent::StateUpdated {
            host: self.host.clone(),
        });

        Ok(self.snapshot())
    }

    /// Re-read one known instance from the router
    ///
    /// A failed read is logged and leaves the stored state unchanged. Unknown
    /// names are not added. Returns the state now stored, if any.
    pub async fn refresh_instance(&mut self, client: &mut UciClient, name: &str) -> Option<bool> {
        if !self.instances.contains_key(name) {
            debug!("Not refreshing unknown vpn {}", name);
            return None;
        }

        match get_enabled(client, name).await {
            Ok(enabled) => {
                debug!("get {} returned enabled={}", name, enabled);
                let instance = self.instances.get_mut(name)?;
                instance.set_enabled(enabled);
                Some(enabled)
            }
            Err(e) => {
                warn!("Failed to read state of vpn {}: {}", name, e);
                self.is_enabled(name)
            }
        }
    }

    /// Re-read every known instance, one at a time
    ///
    /// Failures are isolated per instance.
    pub async fn refresh_all(&mut self, client: &mut UciClient) -> BTreeMap<String, bool> {
        let mut names: Vec<String> = self.instances.keys().cloned().collect();
        names.sort();
        for name in names {
            self.refresh_instance(client, &name).await;
        }
        self.snapshot()
    }

    /// Enable an instance on the router, then re-read its state
    pub async fn turn_on(&mut self, client: &mut UciClient, name: &str) -> Result<(), RpcError> {
        debug!("{} turned on", name);
        set_enabled(client, name, true).await?;
        self.refresh_instance(client, name).await;
        Ok(())
    }

    /// Disable an instance on the router, then re-read its state
    pub async fn turn_off(&mut self, client: &mut UciClient, name: &str) -> Result<(), RpcError> {
        debug!("{} turned off", name);
        set_enabled(client, name, false).await?;
        self.refresh_instance(client, name).await;
        Ok(())
    }

    fn emit(&self, event: RegistryEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody listens anymore
            let _ = events.send(event);
        }
    }
}

/// Stage and persist the enabled flag of one instance
///
/// Sends `set openvpn <name> enabled 1|0` then `commit openvpn`. Local state
/// is not touched.
pub async fn set_enabled(client: &mut UciClient, name: &str, on: bool) -> Result<(), RpcError> {
    let value = if on { "1" } else { "0" };
    client
        .call(UciMethod::Set, &[OPENVPN_CONFIG, name, ENABLED_OPTION, value])
        .await?;
    client.call(UciMethod::Commit, &[OPENVPN_CONFIG]).await?;
    Ok(())
}

/// Read the enabled flag of one instance from the router
pub async fn get_enabled(client: &mut UciClient, name: &str) -> Result<bool, RpcError> {
    let value = client
        .call(UciMethod::Get, &[OPENVPN_CONFIG, name, ENABLED_OPTION])
        .await?;
    Ok(parse_enabled(Some(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_poll_scenario() {
        let mut registry = VpnRegistry::new("router.lan");
        let states = registry
            .apply_poll(&json!({
                "cfg1": {".name": "home", "enabled": "1"},
                "cfg2": {".name": "work"}
            }))
            .unwrap();

        assert_eq!(states.get("home"), Some(&true));
        assert_eq!(states.get("work"), Some(&false));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_absent_instance_becomes_disabled() {
        let mut registry = VpnRegistry::new("router.lan");
        registry
            .apply_poll(&json!({"cfg1": {".name": "home", "enabled": "1"}}))
            .unwrap();
        registry.apply_poll(&json!({})).unwrap();

        assert_eq!(registry.is_enabled("home"), Some(false));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_section_key_used_without_name() {
        let mut registry = VpnRegistry::new("router.lan");
        registry
            .apply_poll(&json!({"office": {"enabled": "1"}, "junk": "x"}))
            .unwrap();

        assert_eq!(registry.is_enabled("office"), Some(true));
        assert!(registry.get("junk").is_none());
    }

    #[test]
    fn test_non_object_result_leaves_registry_untouched() {
        let mut registry = VpnRegistry::new("router.lan");
        registry
            .apply_poll(&json!({"cfg1": {".name": "home", "enabled": "1"}}))
            .unwrap();

        let result = registry.apply_poll(&json!(false));
        assert!(matches!(result, Err(RpcError::MalformedResponse { .. })));
        assert_eq!(registry.is_enabled("home"), Some(true));
    }

    #[test]
    fn test_discovery_emitted_once_per_name() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut registry = VpnRegistry::new("router.lan").with_events(tx);
        let response = json!({"cfg1": {".name": "home", "enabled": "0"}});

        registry.apply_poll(&response).unwrap();
        registry.apply_poll(&response).unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                RegistryEvent::Discovered {
                    host: "router.lan".to_string(),
                    name: "home".to_string()
                },
                RegistryEvent::StateUpdated {
                    host: "router.lan".to_string()
                },
                RegistryEvent::StateUpdated {
                    host: "router.lan".to_string()
                },
            ]
        );
    }
}
