//! doip-simd - DoIP Simulation Control Daemon
//!
//! Serves the HTTP control surface for a set of simulation platforms.
//!
//! Usage:
//!   doip-simd [config.toml]
//!
//! If no config file is provided, a built-in sample platform is served for
//! demo purposes.

use std::sync::Arc;

use doip_sim_core::mock::{MockEcu, MockGateway, MockPlatform, MockSimulationManager};
use doip_sim_core::{LookupEntry, SimulationManager};
use doip_sim_http::DoipHttpServerBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let mut result = Args { config_path: None };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            value if !value.starts_with('-') => {
                result.config_path = Some(value.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"doip-simd - DoIP Simulation Control Daemon

Usage: doip-simd [OPTIONS] [config.toml]

Options:
  -h, --help   Print this help message

Examples:
  # Run with a built-in sample platform
  doip-simd

  # Run with a config file
  doip-simd config.toml
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doip_simd=info,doip_sim_http=info,doip_sim_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting doip-simd (DoIP Simulation Control Daemon)");

    let args = parse_args();

    let (manager, port) = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        load_config_file(path)?
    } else {
        tracing::info!("No config file provided, serving the sample platform");
        (sample_manager(), 8080)
    };

    let server = DoipHttpServerBuilder::new(manager)
        .port(port)
        .server_name(format!("http://localhost:{port}"))
        .build()
        .await;

    server.start().await?;
    if let Some(addr) = server.local_addr().await {
        tracing::info!("Listening on http://{}", addr);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.stop().await;

    Ok(())
}

/// Load server settings and the platform tree from a TOML file.
fn load_config_file(path: &str) -> anyhow::Result<(Arc<dyn SimulationManager>, u16)> {
    let content = std::fs::read_to_string(path)?;
    let config: toml::Value = toml::from_str(&content)?;

    let port = config
        .get("server")
        .and_then(|s| s.get("port"))
        .and_then(|p| p.as_integer())
        .unwrap_or(8080) as u16;

    let mut manager = MockSimulationManager::new();

    if let Some(platforms) = config.get("platform").and_then(|p| p.as_array()) {
        tracing::info!(platform_count = platforms.len(), "Loading platform configs");
        for platform_config in platforms {
            manager.add_platform(load_platform(platform_config)?);
        }
    }

    Ok((Arc::new(manager), port))
}

fn load_platform(config: &toml::Value) -> anyhow::Result<MockPlatform> {
    let name = config
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow::anyhow!("Platform missing 'name' field"))?;

    let mut platform = MockPlatform::new(name);

    if let Some(gateways) = config.get("gateway").and_then(|g| g.as_array()) {
        for gateway_config in gateways {
            platform = platform.with_gateway(load_gateway(gateway_config)?);
        }
    }

    tracing::info!(platform = %name, "Configured platform");
    Ok(platform)
}

fn load_gateway(config: &toml::Value) -> anyhow::Result<MockGateway> {
    let name = config
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow::anyhow!("Gateway missing 'name' field"))?;

    let mut gateway = MockGateway::new(name);

    if let Some(ecus) = config.get("ecu").and_then(|e| e.as_array()) {
        for ecu_config in ecus {
            gateway = gateway.with_ecu(load_ecu(ecu_config)?);
        }
    }

    Ok(gateway)
}

fn load_ecu(config: &toml::Value) -> anyhow::Result<MockEcu> {
    let name = config
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow::anyhow!("Ecu missing 'name' field"))?;

    let mut ecu = MockEcu::new(name);

    if let Some(entries) = config.get("lookup").and_then(|l| l.as_array()) {
        for entry in entries {
            ecu = ecu.with_lookup_entry(load_lookup_entry(entry)?);
        }
    }

    Ok(ecu)
}

fn load_lookup_entry(config: &toml::Value) -> anyhow::Result<LookupEntry> {
    let regex = config
        .get("regex")
        .and_then(|r| r.as_str())
        .ok_or_else(|| anyhow::anyhow!("Lookup entry missing 'regex' field"))?;
    let result = config
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| anyhow::anyhow!("Lookup entry missing 'result' field"))?;

    let mut entry = LookupEntry::new(regex, result);

    if let Some(modifiers) = config.get("modifier").and_then(|m| m.as_array()) {
        for modifier in modifiers {
            let regex = modifier
                .get("regex")
                .and_then(|r| r.as_str())
                .ok_or_else(|| anyhow::anyhow!("Modifier missing 'regex' field"))?;
            let result = modifier
                .get("result")
                .and_then(|r| r.as_str())
                .ok_or_else(|| anyhow::anyhow!("Modifier missing 'result' field"))?;
            entry = entry.with_modifier(regex, result);
        }
    }

    Ok(entry)
}

/// Built-in platform served when no config file is given.
fn sample_manager() -> Arc<dyn SimulationManager> {
    let mut manager = MockSimulationManager::new();
    manager.add_platform(
        MockPlatform::new("X2024").with_gateway(
            MockGateway::new("GW").with_ecu(
                MockEcu::new("EMS")
                    .with_lookup_entry(
                        LookupEntry::new("10 03", "50 03 00 32 01 F4")
                            .with_modifier("22 F1 86", "62 F1 86 03"),
                    )
                    .with_lookup_entry(LookupEntry::new("3E 00", "7E 00")),
            ),
        ),
    );
    Arc::new(manager)
}
