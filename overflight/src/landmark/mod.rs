//! Landmark catalog and proximity streaming.
//!
//! Landmarks are named structures anchored at real coordinates. Each frame
//! the loader sweeps the catalog against the vehicle position; entries load
//! within 500 m and unload past 1000 m (see
//! [`LandmarkConfig`](crate::config::LandmarkConfig)).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LandmarkConfig;
use crate::coord::{LocalProjection, WorldPosition};
use crate::proximity::{ProximityEvent, ProximityLoader};

/// Structural category of a landmark, driving its placeholder geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKind {
    Building,
    Tower,
    Castle,
    Palace,
    Monument,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Structure height, meters.
    pub height: f64,
    /// Horizontal extent of the placeholder geometry, meters.
    pub scale: f64,
    /// Placeholder RGB color.
    pub color: [u8; 3],
    pub kind: LandmarkKind,
}

/// The built-in catalog: six Oslo landmarks.
pub fn default_catalog() -> Vec<Landmark> {
    fn entry(
        id: &str,
        name: &str,
        lat: f64,
        lng: f64,
        height: f64,
        scale: f64,
        color: [u8; 3],
        kind: LandmarkKind,
    ) -> Landmark {
        Landmark {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lng,
            height,
            scale,
            color,
            kind,
        }
    }

    vec![
        entry(
            "oslo-opera",
            "Oslo Opera House",
            59.9075,
            10.7531,
            50.0,
            20.0,
            [0xee, 0xee, 0xee],
            LandmarkKind::Building,
        ),
        entry(
            "holmenkollen",
            "Holmenkollen Ski Jump",
            59.9647,
            10.6682,
            60.0,
            25.0,
            [0xcc, 0xcc, 0xcc],
            LandmarkKind::Tower,
        ),
        entry(
            "akershus",
            "Akershus Fortress",
            59.9077,
            10.7362,
            30.0,
            30.0,
            [0x8b, 0x73, 0x55],
            LandmarkKind::Castle,
        ),
        entry(
            "royal-palace",
            "Royal Palace Oslo",
            59.9169,
            10.7277,
            35.0,
            35.0,
            [0xf4, 0xe4, 0xc1],
            LandmarkKind::Palace,
        ),
        entry(
            "vigeland",
            "Vigeland Park Monolith",
            59.9270,
            10.7003,
            17.0,
            5.0,
            [0xd3, 0xd3, 0xd3],
            LandmarkKind::Monument,
        ),
        entry(
            "city-hall",
            "Oslo City Hall",
            59.9115,
            10.7330,
            66.0,
            30.0,
            [0xb8, 0x73, 0x33],
            LandmarkKind::Building,
        ),
    ]
}

/// Parse a catalog from JSON.
pub fn catalog_from_json(json: &str) -> Result<Vec<Landmark>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Streams catalog entries in and out around the vehicle.
pub struct LandmarkLoader {
    loader: ProximityLoader<Landmark>,
}

impl LandmarkLoader {
    /// Place a catalog in world space via the projection.
    pub fn new(
        catalog: Vec<Landmark>,
        config: &LandmarkConfig,
        projection: &LocalProjection,
    ) -> Self {
        let mut loader = ProximityLoader::new(config.load_distance, config.unload_distance);
        for landmark in catalog {
            let (x, z) = projection.geodetic_to_world(landmark.lat, landmark.lng);
            loader.insert(landmark, x, z);
        }
        Self { loader }
    }

    /// Sweep the catalog; logs each transition.
    pub fn update(&mut self, vehicle_position: &WorldPosition) -> Vec<ProximityEvent> {
        let events = self.loader.update(vehicle_position);
        for event in &events {
            match event {
                ProximityEvent::Loaded(index) => {
                    if let Some(landmark) = self.loader.get(*index) {
                        info!(id = %landmark.id, name = %landmark.name, "Landmark loaded");
                    }
                }
                ProximityEvent::Unloaded(index) => {
                    if let Some(landmark) = self.loader.get(*index) {
                        info!(id = %landmark.id, "Landmark unloaded");
                    }
                }
            }
        }
        events
    }

    /// Landmark for an event index.
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.loader.get(index)
    }

    /// Currently instantiated landmarks.
    pub fn loaded(&self) -> impl Iterator<Item = &Landmark> {
        self.loader.loaded()
    }

    pub fn loaded_count(&self) -> usize {
        self.loader.loaded_count()
    }
}
