//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::domain::worker::WorkerLocation;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "worker" => {
            value
                .parse::<WorkerLocation>()
                .map_err(|e| invalid(e.to_string()))?;
            config.worker = Some(value.trim().to_string());
        }
        "device" => config.device = Some(value.to_string()),
        "duration" | "drain_timeout" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if key == "duration" {
                config.duration = Some(value.to_string());
            } else {
                config.drain_timeout = Some(value.to_string());
            }
        }
        "output_dir" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
            config.output_dir = Some(value.to_string());
        }
        "debug" => {
            let flag = parse_bool(value)
                .map_err(|_| invalid("Value must be 'true' or 'false'".to_string()))?;
            config.debug = Some(flag);
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "worker" => config.worker.clone(),
        "device" => config.device.clone(),
        "duration" => config.duration.clone(),
        "drain_timeout" => config.drain_timeout.clone(),
        "output_dir" => config.output_dir.clone(),
        "debug" => config.debug.map(|b| b.to_string()),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert_eq!(parse_bool("yes"), Ok(true));
        assert_eq!(parse_bool("no"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn apply_durations() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "duration", "2m30s").unwrap();
        apply_value(&mut config, "drain_timeout", "10s").unwrap();
        assert_eq!(config.duration.as_deref(), Some("2m30s"));
        assert_eq!(config.drain_timeout.as_deref(), Some("10s"));

        assert!(apply_value(&mut config, "duration", "invalid").is_err());
        assert!(apply_value(&mut config, "drain_timeout", "0s").is_err());
    }

    #[test]
    fn apply_worker() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "worker", " mp3-recorder worker ").unwrap();
        assert_eq!(config.worker.as_deref(), Some("mp3-recorder worker"));
        assert!(apply_value(&mut config, "worker", "  ").is_err());
    }

    #[test]
    fn apply_debug_requires_bool() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "debug", "yes").unwrap();
        assert_eq!(config.debug, Some(true));
        assert!(apply_value(&mut config, "debug", "loud").is_err());
    }

    #[test]
    fn read_values() {
        let config = AppConfig::defaults();
        assert_eq!(read_value(&config, "worker").as_deref(), Some("builtin"));
        assert_eq!(read_value(&config, "debug").as_deref(), Some("false"));
        assert_eq!(read_value(&config, "duration"), None);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(check_key("api_key").is_err());
        assert!(check_key("output_dir").is_ok());
    }
}
