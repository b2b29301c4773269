//! Setup command implementation
//!
//! Interactive command that adds a router to the configuration and stores
//! its password in the system keyring.

use lucivpn_core::{
    auth::keyring,
    config::{toml_config, RouterConfig, DEFAULT_SCAN_INTERVAL_SECS, MIN_SCAN_INTERVAL_SECS},
    error::{ConfigError, LuciError},
    rpc::Session,
    types::RouterPassword,
};
use std::io::{self, Write};

/// Run the setup command
pub async fn run_setup() -> Result<(), LuciError> {
    println!("🔐 lucivpn Router Setup");
    println!("======================");
    println!();
    println!("The router password will be stored in your system keyring.");
    println!("Configuration will be saved to ~/.config/lucivpn/config.toml");
    println!();

    let mut config = if toml_config::config_exists()? {
        toml_config::load_config()?
    } else {
        Default::default()
    };

    let router = collect_router_config()?;

    if config.routers.iter().any(|r| r.host == router.host) {
        println!("⚠️  {} is already configured.", router.host);
        if !prompt_yes_no("Overwrite existing entry?", false)? {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    router.validate().map_err(|e| {
        LuciError::Config(ConfigError::ValidationError {
            message: format!("Configuration validation failed: {}", e),
        })
    })?;

    let password = RouterPassword::new(prompt_input("Password: ")?);

    // Check the credentials before saving anything
    println!();
    println!("🔌 Logging in to {}...", router.host);
    let session = Session::from_config(&router, password.clone()).await?;
    println!("✓ Login successful as {}", session.username());

    println!("💾 Saving configuration...");
    keyring::store_password(&router.username, &router.host, &password)?;
    config.upsert_router(router);
    toml_config::save_config(&config)?;

    println!("✅ Setup complete!");
    println!();
    println!("You can now use:");
    println!("  lucivpn list                  - Show OpenVPN instances");
    println!("  lucivpn on <host> <name>      - Enable an instance");
    println!("  lucivpn off <host> <name>     - Disable an instance");
    println!("  lucivpn watch                 - Poll routers until Ctrl-C");

    Ok(())
}

/// Collect router configuration interactively
fn collect_router_config() -> Result<RouterConfig, LuciError> {
    println!("Router Configuration:");
    println!("--------------------");

    let host = prompt_required("Router host (hostname or IP)", "192.168.1.1")?;
    let username = prompt_required("Username", "root")?;
    let use_ssl = prompt_yes_no("Use HTTPS?", false)?;
    let verify_ssl = if use_ssl {
        prompt_yes_no("Verify the router certificate?", true)?
    } else {
        true
    };

    let scan_interval_secs: u64 = prompt_required(
        &format!("Poll interval in seconds (min {})", MIN_SCAN_INTERVAL_SECS),
        &DEFAULT_SCAN_INTERVAL_SECS.to_string(),
    )?
    .parse()
    .map_err(|_| {
        LuciError::Config(ConfigError::ValidationError {
            message: "Invalid poll interval".to_string(),
        })
    })?;

    let mut router = RouterConfig::new(host, username);
    router.use_ssl = use_ssl;
    router.verify_ssl = verify_ssl;
    router.scan_interval_secs = scan_interval_secs.max(MIN_SCAN_INTERVAL_SECS);
    Ok(router)
}

/// Prompt for a required value with default
fn prompt_required(prompt: &str, default: &str) -> Result<String, LuciError> {
    let prompt_text = if default.is_empty() {
        format!("{}: ", prompt)
    } else {
        format!("{} [{}]: ", prompt, default)
    };

    loop {
        let input = prompt_input(&prompt_text)?;

        if input.trim().is_empty() {
            if !default.is_empty() {
                return Ok(default.to_string());
            }
            println!("❌ This field is required. Please enter a value.");
            continue;
        }

        return Ok(input.trim().to_string());
    }
}

/// Prompt for yes/no with default
fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool, LuciError> {
    let default_indicator = if default_yes { "[Y/n]" } else { "[y/N]" };
    let prompt_text = format!("{} {}: ", prompt, default_indicator);

    loop {
        let input = prompt_input(&prompt_text)?.to_lowercase();

        match input.as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            "" => return Ok(default_yes),
            _ => {
                println!("Please enter 'y' for yes or 'n' for no.");
                continue;
            }
        }
    }
}

/// Low-level input prompting
fn prompt_input(prompt: &str) -> Result<String, LuciError> {
    print!("{}", prompt);
    io::stdout().flush().map_err(LuciError::Io)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(LuciError::Io)?;

    Ok(input.trim_end().to_string())
}
