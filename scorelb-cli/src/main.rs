//! Scorelb CLI Tool
//!
//! Command line interface for probing nodes and querying the optimal one

use anyhow::Result;
use clap::{Parser, Subcommand};
use scorelb_core::config::loader::load_config_from_path;
use scorelb_core::NodeSnapshot;
use scorelb_loadbalance::Balancer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scorelb")]
#[command(about = "Probe backend nodes and pick the one with the lowest score")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    ValidateConfig {
        /// Path to configuration file
        #[arg(short, long, default_value = "balancer.toml")]
        config: String,
    },
    /// Probe every node once and show its state
    Probe {
        /// Path to configuration file
        #[arg(short, long, default_value = "balancer.toml")]
        config: String,
        /// Print snapshots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe every node once and print the optimal node
    Select {
        /// Path to configuration file
        #[arg(short, long, default_value = "balancer.toml")]
        config: String,
        /// Consider nodes in error state as well
        #[arg(long)]
        include_errors: bool,
    },
    /// Keep refreshing nodes and print the optimal node every interval
    Watch {
        /// Path to configuration file
        #[arg(short, long, default_value = "balancer.toml")]
        config: String,
        /// Override the refresh interval in seconds
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "balancer_example.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => {
            println!("Validating configuration file: {}", config);
            match load_config_from_path(&config) {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("  - {} nodes configured", cfg.nodes.len());
                    println!("  - cache optimal node: {}", cfg.options.cache_optimal_node);
                    println!("  - watch interval: {}s", cfg.watch_interval_seconds);
                }
                Err(e) => {
                    eprintln!("❌ Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Probe { config, json } => {
            let cfg = load_config_from_path(&config)?;
            let balancer = Balancer::from_config(&cfg)?;
            balancer.refresh_once().await;

            let snapshots = balancer.snapshots();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else {
                for snapshot in &snapshots {
                    print_snapshot(snapshot);
                }
            }
        }
        Commands::Select {
            config,
            include_errors,
        } => {
            let cfg = load_config_from_path(&config)?;
            let balancer = Balancer::from_config(&cfg)?;
            balancer.refresh_once().await;

            match balancer.select_optimal(!include_errors) {
                Some(node) => println!("{}", node.endpoint()),
                None => {
                    eprintln!("❌ No node available");
                    std::process::exit(1);
                }
            }
        }
        Commands::Watch { config, interval } => {
            let cfg = load_config_from_path(&config)?;
            let interval = interval
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| cfg.watch_interval());
            watch(Arc::new(Balancer::from_config(&cfg)?), interval).await?;
        }
        Commands::GenerateConfig { output } => {
            println!("Generating configuration file: {}", output);
            std::fs::write(&output, EXAMPLE_CONFIG)?;
            println!("✅ Configuration file generated successfully");
        }
    }

    Ok(())
}

async fn watch(balancer: Arc<Balancer>, interval: std::time::Duration) -> Result<()> {
    let handle = balancer.spawn_watch(interval);
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, stopping watch loop");
                break;
            }
            _ = ticker.tick() => {
                match balancer.select_optimal(true) {
                    Some(node) => {
                        println!("optimal: {} (score: {})", node.endpoint(), node.score())
                    }
                    None => println!("optimal: <none>"),
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn print_snapshot(snapshot: &NodeSnapshot) {
    let state = if !snapshot.available {
        "UNAVAILABLE"
    } else if snapshot.error {
        "ERROR"
    } else {
        "OK"
    };

    println!(
        "{:<40} {:<12} status={:<4} score={}",
        snapshot.endpoint, state, snapshot.last_status, snapshot.score
    );
    for (name, metric) in &snapshot.metrics {
        println!(
            "    {:<20} value={} weight={} score={}",
            name, metric.value, metric.weight, metric.score
        );
    }
}

const EXAMPLE_CONFIG: &str = r#"# Scorelb Configuration File

# Seconds between refresh passes for `scorelb watch`
watchIntervalSeconds = 30

[options]
userAgent = "scorelb/0.1"
# Forwarded verbatim as the Authorization header when non-empty
authorization = ""
cacheOptimalNode = true
# Set to true so a cached node in error state no longer bypasses the availability filter
cacheRespectsAvailability = false
route = "/metrics"
probeTimeoutSeconds = 15

# Each node reports a JSON object of metric name -> value at {uri}{route}.
# Score = sum(value * weight); the lowest score wins.
[[nodes]]
uri = "http://localhost:6666"
[nodes.metrics]
memory = 5
cpu = 2

[[nodes]]
uri = "http://localhost:6667"
[nodes.metrics]
memory = 5
cpu = 2
"#;
