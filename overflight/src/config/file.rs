//! INI configuration file loading.
//!
//! Any key missing from the file falls back to its default, so a config file
//! only needs to name what it changes:
//!
//! ```ini
//! [map]
//! spawn_lat = 40.7128
//! spawn_lng = -74.0060
//!
//! [terrain]
//! load_radius = 8
//! directional = true
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::SimConfig;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read or parsed.
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// A key held a value that could not be parsed as the expected type.
    #[error("Invalid value for [{section}] {key}: {value}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Default configuration file location (`~/.config/overflight/overflight.ini`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("overflight").join("overflight.ini"))
}

/// Load configuration from an INI file, with defaults for missing keys.
pub fn load_from_file(path: &Path) -> Result<SimConfig, ConfigError> {
    let ini = Ini::load_from_file(path)?;
    let mut config = SimConfig::default();

    if let Some(section) = ini.section(Some("map")) {
        for (key, value) in section.iter() {
            match key {
                "spawn_lat" => config.map.spawn_lat = parse("map", key, value)?,
                "spawn_lng" => config.map.spawn_lng = parse("map", key, value)?,
                "default_zoom" => config.map.default_zoom = parse("map", key, value)?,
                "centered" => config.map.centered = parse("map", key, value)?,
                "cone_length" => config.map.cone_length = parse("map", key, value)?,
                _ => unknown_key("map", key),
            }
        }
    }

    if let Some(section) = ini.section(Some("terrain")) {
        for (key, value) in section.iter() {
            match key {
                "tile_zoom" => config.terrain.tile_zoom = parse("terrain", key, value)?,
                "load_radius" => config.terrain.load_radius = parse("terrain", key, value)?,
                "eviction_buffer" => {
                    config.terrain.eviction_buffer = parse("terrain", key, value)?;
                }
                "max_loads_per_frame" => {
                    config.terrain.max_loads_per_frame = parse("terrain", key, value)?;
                }
                "max_evicts_per_frame" => {
                    config.terrain.max_evicts_per_frame = parse("terrain", key, value)?;
                }
                "preload_radius" => {
                    config.terrain.preload_radius = parse("terrain", key, value)?;
                }
                "directional" => config.terrain.directional = parse("terrain", key, value)?,
                _ => unknown_key("terrain", key),
            }
        }
    }

    if let Some(section) = ini.section(Some("flight")) {
        for (key, value) in section.iter() {
            match key {
                "start_altitude" => config.flight.start_altitude = parse("flight", key, value)?,
                "max_speed" => config.flight.max_speed = parse("flight", key, value)?,
                "acceleration" => config.flight.acceleration = parse("flight", key, value)?,
                "rotation_speed" => config.flight.rotation_speed = parse("flight", key, value)?,
                "lift_speed" => config.flight.lift_speed = parse("flight", key, value)?,
                "drag" => config.flight.drag = parse("flight", key, value)?,
                "min_clearance" => config.flight.min_clearance = parse("flight", key, value)?,
                _ => unknown_key("flight", key),
            }
        }
    }

    if let Some(section) = ini.section(Some("camera")) {
        for (key, value) in section.iter() {
            match key {
                "follow_distance" => {
                    config.camera.follow_distance = parse("camera", key, value)?;
                }
                "follow_height" => config.camera.follow_height = parse("camera", key, value)?,
                "lerp_factor" => config.camera.lerp_factor = parse("camera", key, value)?,
                "min_distance" => config.camera.min_distance = parse("camera", key, value)?,
                "max_distance" => config.camera.max_distance = parse("camera", key, value)?,
                "fov_degrees" => config.camera.fov_degrees = parse("camera", key, value)?,
                _ => unknown_key("camera", key),
            }
        }
    }

    if let Some(section) = ini.section(Some("landmarks")) {
        for (key, value) in section.iter() {
            match key {
                "load_distance" => {
                    config.landmarks.load_distance = parse("landmarks", key, value)?;
                }
                "unload_distance" => {
                    config.landmarks.unload_distance = parse("landmarks", key, value)?;
                }
                _ => unknown_key("landmarks", key),
            }
        }
    }

    Ok(config)
}

fn parse<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn unknown_key(section: &str, key: &str) {
    tracing::warn!(section, key, "Ignoring unknown configuration key");
}
