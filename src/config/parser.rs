use super::Config;
use crate::error::{Result, WatchError};
use std::path::Path;

/// Read and parse a TOML configuration file.
///
/// # Errors
///
/// Returns [`WatchError::Configuration`] if the file cannot be read, is not
/// valid TOML, or fails validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        WatchError::config(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config_str(&content).map_err(|e| match e {
        WatchError::Configuration(message) => WatchError::config(format!(
            "Error parsing configuration file {}: {message}",
            path.display()
        )),
        other => other,
    })
}

/// Parse and validate configuration from TOML source.
///
/// # Errors
///
/// Returns [`WatchError::Configuration`] if the source is not valid TOML or
/// fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| WatchError::config(format!("Failed to parse TOML config: {e}")))?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    let roots = config.watch.roots();
    if roots.is_empty() {
        return Err(WatchError::config(
            "No watch root configured (set [watch] path or paths)",
        ));
    }

    if roots.iter().any(|root| root.as_os_str().is_empty()) {
        return Err(WatchError::config("Watch path cannot be empty"));
    }

    if let Some(output) = &config.output.path
        && output.as_os_str().is_empty()
    {
        return Err(WatchError::config("Output path cannot be empty"));
    }

    if let Some(log) = &config.log.path
        && log.as_os_str().is_empty()
    {
        return Err(WatchError::config("Log path cannot be empty"));
    }

    Ok(())
}
