//! Terrain streaming and elevation.
//!
//! Imagery tiles stream in around the vehicle through [`TileCache`]; ground
//! elevation is answered separately by a [`HeightProvider`]. The two are
//! deliberately independent: the flight model clamps against elevation every
//! frame whether or not imagery for that spot has arrived.

mod cache;
mod fetch;
mod height;
mod provider;
mod tile;

pub use cache::{TileCache, UpdateOutcome};
pub use fetch::{AsyncRequester, FetchResult, TileRequester};
pub use height::{ElevationGrid, FlatTerrain, HeightProvider, StreamedTerrain};
pub use provider::{ArcGisProvider, FetchError, ImageryProvider, OfflineProvider};
pub use tile::{TileEntry, TileVisual, FALLBACK_COLOR};
