use serde::Deserialize;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: -15.0,
            center_lon: -55.0,
            zoom: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StyleConfig {
    pub outline_color: String,
    pub outline_weight: f64,
    pub fill_opacity: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            outline_color: "black".to_string(),
            outline_weight: 1.0,
            fill_opacity: 0.5,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Everything in the config has a sensible default; the file is optional.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            println!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_expectations() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.map.center_lat, -15.0);
        assert_eq!(config.map.center_lon, -55.0);
        assert_eq!(config.map.zoom, 4);
        assert_eq!(config.style.outline_color, "black");
        assert_eq!(config.style.outline_weight, 1.0);
        assert_eq!(config.style.fill_opacity, 0.5);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: AppConfig = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.map.zoom, 4);
        assert_eq!(config.style.fill_opacity, 0.5);
    }
}
