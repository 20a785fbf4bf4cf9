use log::*;
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Field names printed by `table`, in column order
    pub fields: Vec<String>,
    /// Default interpolation for `sample` when `--hermite` isn't passed
    pub hermite: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fields: vec!["name".into(), "pos_x".into(), "pos_y".into(), "pos_z".into()],
            hermite: false,
        }
    }
}

impl Config {
    /// Reads the config at `path`. A missing or malformed file falls back to the defaults.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("no config at {}: {}", path.display(), e);
                return Default::default();
            }
        };
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Self {
        match toml::from_str(data) {
            Ok(e) => e,
            Err(e) => {
                error!("Failed to parse config file: {}", e);
                Default::default()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::from_toml("hermite = true");
        assert!(config.hermite);
        assert_eq!(config.fields, Config::default().fields);
    }

    #[test]
    fn malformed_config_is_default() {
        assert_eq!(Config::from_toml("fields = 3"), Config::default());
    }

    #[test]
    fn field_list() {
        let config = Config::from_toml(r#"fields = ["name", "ScaleX"]"#);
        assert_eq!(config.fields, ["name", "ScaleX"]);
    }
}
