use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::geo::GlobeGeometry;
use crate::tracker::DEFAULT_ISS_URL;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub observer: ObserverConfig,
    pub globe: GlobeConfig,
    pub display: DisplayConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub radius: f64,
    pub surface_offset: f64,
    pub altitude_scale: f64,
    pub sun_distance: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_rate: u64,   // milliseconds
    pub rotation_speed: f64, // degrees per frame
    pub show_labels: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub public_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ISS_URL.to_string(),
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: "You".to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        let geometry = GlobeGeometry::default();
        Self {
            radius: geometry.radius,
            surface_offset: geometry.surface_offset,
            altitude_scale: geometry.altitude_scale,
            sun_distance: 110.0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_rate: 50,
            rotation_speed: 0.5,
            show_labels: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_dir: PathBuf::from("public"),
        }
    }
}

impl GlobeConfig {
    pub fn geometry(&self) -> GlobeGeometry {
        GlobeGeometry {
            radius: self.radius,
            surface_offset: self.surface_offset,
            altitude_scale: self.altitude_scale,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Explicit path if given, otherwise the per-user config file when one
    /// exists, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("issglobe").join("config.toml"))
}
