//! VPN instance commands
//!
//! Each command loads the configuration, logs in to the routers it needs and
//! talks to them sequentially.

use colored::Colorize;
use lucivpn_core::config::toml_config::load_config;
use lucivpn_core::error::LuciError;
use lucivpn_core::vpn::{run_poller, RegistryEvent, Router, Routers};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

fn state_label(enabled: bool) -> colored::ColoredString {
    if enabled {
        "on".green()
    } else {
        "off".red()
    }
}

/// JSON view of a router's instances: name -> {enabled, last_updated}
fn instance_states(router: &Router) -> BTreeMap<&str, Value> {
    router
        .registry()
        .instances()
        .into_iter()
        .map(|i| {
            let state = json!({
                "enabled": i.is_enabled(),
                "last_updated": i.last_updated().to_rfc3339(),
            });
            (i.name(), state)
        })
        .collect()
}

/// Log in to a single configured router
async fn connect_router(host: &str) -> Result<Router, LuciError> {
    let config = load_config()?;
    let router_config = config.router(host)?.clone();
    Router::connect(router_config, None).await
}

/// Run the list command
pub async fn run_list(host: Option<&str>, json: bool) -> Result<(), LuciError> {
    let config = load_config()?;
    let configs = match host {
        Some(host) => vec![config.router(host)?.clone()],
        None => config.routers.clone(),
    };

    let (mut routers, mut failures) = Routers::connect_all(&configs, None).await;
    let poll_failures = routers.poll_all().await;

    if json {
        let states: BTreeMap<&str, BTreeMap<&str, Value>> = routers
            .hosts()
            .filter_map(|h| routers.get(h).map(|r| (h, instance_states(r))))
            .collect();
        let rendered = serde_json::to_string_pretty(&states).map_err(|e| {
            LuciError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
        println!("{}", rendered);
    } else {
        for host in routers.hosts() {
            let Some(router) = routers.get(host) else {
                continue;
            };
            println!("{}", host.bold());
            if router.registry().is_empty() {
                println!("  (no OpenVPN instances)");
            }
            for instance in router.registry().instances() {
                println!("  {:<24} {}", instance.name(), state_label(instance.is_enabled()));
            }
        }
    }

    for (host, error) in &poll_failures {
        eprintln!("{} {}: {}", "✗".red(), host, error);
    }
    for (host, error) in &failures {
        eprintln!("{} {}: {}", "✗".red(), host, error);
    }

    if !failures.is_empty() {
        let (_, error) = failures.remove(0);
        return Err(error);
    }
    if let Some((_, error)) = poll_failures.into_iter().next() {
        return Err(LuciError::Rpc(error));
    }

    Ok(())
}

/// Run the status command
pub async fn run_status(host: &str, name: &str) -> Result<(), LuciError> {
    let mut router = connect_router(host).await?;
    let enabled = router.status(name).await?;
    println!("{}: {}", name, state_label(enabled));
    Ok(())
}

/// Run the on/off commands
pub async fn run_switch(host: &str, name: &str, on: bool) -> Result<(), LuciError> {
    let mut router = connect_router(host).await?;
    router.poll().await?;

    if router.registry().get(name).is_none() {
        return Err(LuciError::UnknownInstance {
            host: host.to_string(),
            name: name.to_string(),
        });
    }

    if on {
        router.turn_on(name).await?;
    } else {
        router.turn_off(name).await?;
    }

    match router.registry().is_enabled(name) {
        Some(enabled) if enabled == on => {
            println!("{} {}: {}", "✓".green(), name, state_label(enabled));
        }
        Some(enabled) => {
            warn!("{} reports {} after switching", name, enabled);
            println!("{} {}: {}", "!".yellow(), name, state_label(enabled));
        }
        None => println!("{} {}", "✓".green(), name),
    }

    Ok(())
}

/// Run the watch command
///
/// One poller task per router; Ctrl-C stops them all.
pub async fn run_watch() -> Result<(), LuciError> {
    let config = load_config()?;
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let (routers, failures) = Routers::connect_all(&config.routers, Some(events_tx)).await;
    for (host, error) in &failures {
        eprintln!("{} {}: {}", "✗".red(), host, error);
    }
    if routers.is_empty() {
        if let Some((_, error)) = failures.into_iter().next() {
            return Err(error);
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pollers: Vec<_> = routers
        .into_routers()
        .map(|router| tokio::spawn(run_poller(router, shutdown_rx.clone())))
        .collect();

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                RegistryEvent::Discovered { host, name } => {
                    println!("{} new instance {} on {}", "+".green(), name, host);
                }
                RegistryEvent::StateUpdated { host } => {
                    info!("State of {} updated", host);
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Interrupted, stopping pollers");
    let _ = shutdown_tx.send(true);

    for poller in pollers {
        match poller.await {
            Ok(router) => {
                for instance in router.registry().instances() {
                    println!("{} {}", router.host(), instance);
                }
            }
            Err(e) => warn!("Poller task failed: {}", e),
        }
    }

    // Pollers held the last senders; the logger ends once they are gone
    let _ = event_logger.await;
    Ok(())
}
