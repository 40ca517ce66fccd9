use crate::config::model::BalancerConfig;
use anyhow::Context;
use tracing::debug;

pub fn load_config_from_path(config_path: &str) -> Result<BalancerConfig, anyhow::Error> {
    let config_str = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file '{config_path}'"))?;
    let config = parse_config(&config_str)?;
    debug!("Loaded {} nodes from {}", config.nodes.len(), config_path);
    Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<BalancerConfig, anyhow::Error> {
    let config: BalancerConfig = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}
