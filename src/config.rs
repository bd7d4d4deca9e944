//! Optional per-demo tuning, read from RON files under `config/`.

use std::{io::ErrorKind, path::Path};

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(ron::de::from_str(&content)?)
}

/// A missing file silently gives the defaults. A malformed one is logged, then also gives the
/// defaults.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load(path) {
        Ok(cfg) => {
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No config at {}; using defaults", path.display());
            T::default()
        }
        Err(e) => {
            log::warn!("Ignoring config {}: {e}", path.display());
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shooter::ShooterConfig;

    #[test]
    fn partial_config_keeps_other_defaults() {
        let cfg: ShooterConfig =
            ron::de::from_str("(fire_cooldown: 1.25, snake: (segment_count: 4))").unwrap();

        assert_eq!(cfg.fire_cooldown, 1.25);
        assert_eq!(cfg.snake.segment_count, 4);
        assert_eq!(cfg.snake.neck_length, 10.);
        assert_eq!(cfg.projectile_speed, 20.);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg: ShooterConfig = load_or_default(Path::new("config/does_not_exist.ron"));
        assert_eq!(cfg.max_range, 50.);
    }

    #[test]
    fn malformed_is_an_error() {
        let result: Result<ShooterConfig, _> = ron::de::from_str("(fire_cooldown: )");
        assert!(result.is_err());
    }
}
