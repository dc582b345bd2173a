//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Renders `config`, loaded from `path`, as commented TOML.
pub fn render_dump(config: &ClientConfig, path: &Path) -> ClientResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Serialize(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str))
}

/// Dump the current configuration, loaded from `path`, to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("{}", render_dump(config, path)?);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let feed = config.feed.to_feed_config()?;
    config.log.tracing_config(false)?;

    if let Some(source) = &config.feed.source
        && let Err(e) = calfeed_providers::HostPolicy::new()
            .with_allowed_domains(&feed.allowed_domains)
            .check_static(source)
    {
        return Err(ClientError::Config(format!(
            "feed.source is rejected by the URL policy: {}",
            e.message()
        )));
    }

    let dropped = config.feed.allowed_domains.len() - feed.allowed_domains.len();
    if dropped > 0 {
        println!("Ignoring {} invalid or duplicate allowed_domains entries.", dropped);
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path in effect.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
