//! Terrain height providers.
//!
//! The ground-clamp step asks one question: "what is the ground elevation at
//! this geodetic point?" The [`HeightProvider`] capability answers it. Two
//! implementations exist - a flat reference plane and a streamed per-tile
//! elevation sampler - chosen at construction time; callers never branch on
//! which one they hold.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::coord::{tile_to_bounds, to_tile_coords, TileCoord};

/// Supplies terrain elevation at a geodetic point.
///
/// Implementations never fail: where no data is available they return a
/// default elevation, so the ground clamp can run unconditionally every
/// frame.
pub trait HeightProvider: Send + Sync {
    /// Ground elevation in meters at the given point.
    fn height_at(&self, lat: f64, lng: f64) -> f64;
}

/// Constant-elevation terrain; the legacy flat-world provider.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    elevation: f64,
}

impl FlatTerrain {
    /// Flat terrain at the given elevation.
    pub fn new(elevation: f64) -> Self {
        Self { elevation }
    }

    /// Flat terrain at zero elevation.
    pub fn sea_level() -> Self {
        Self::new(0.0)
    }
}

impl HeightProvider for FlatTerrain {
    fn height_at(&self, _lat: f64, _lng: f64) -> f64 {
        self.elevation
    }
}

/// A square grid of elevation samples covering one tile.
///
/// Samples are stored row-major, north-to-south, west-to-east, with the
/// outermost samples sitting exactly on the tile edges.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    resolution: usize,
    samples: Vec<f32>,
}

impl ElevationGrid {
    /// Build a grid from row-major samples.
    ///
    /// Returns `None` unless `samples.len() == resolution * resolution` with
    /// `resolution >= 2`.
    pub fn new(resolution: usize, samples: Vec<f32>) -> Option<Self> {
        if resolution < 2 || samples.len() != resolution * resolution {
            return None;
        }
        Some(Self {
            resolution,
            samples,
        })
    }

    /// Bilinearly sample the grid at fractional tile coordinates in [0, 1].
    fn sample(&self, u: f64, v: f64) -> f64 {
        let max_index = (self.resolution - 1) as f64;
        let x = (u.clamp(0.0, 1.0)) * max_index;
        let y = (v.clamp(0.0, 1.0)) * max_index;

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.resolution - 1);
        let y1 = (y0 + 1).min(self.resolution - 1);
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let at = |col: usize, row: usize| self.samples[row * self.resolution + col] as f64;

        let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
        let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Height provider backed by streamed per-tile elevation grids.
///
/// Grids arrive and leave as their tiles stream in and out; a query landing
/// on a tile with no resident grid returns the fallback elevation, so
/// streaming gaps degrade to flat ground rather than blocking the clamp.
pub struct StreamedTerrain {
    zoom: u8,
    fallback: f64,
    grids: RwLock<HashMap<TileCoord, ElevationGrid>>,
}

impl StreamedTerrain {
    /// Empty streamed terrain sampling tiles at the given zoom.
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            fallback: 0.0,
            grids: RwLock::new(HashMap::new()),
        }
    }

    /// Install or replace the elevation grid for a tile.
    pub fn insert_grid(&self, coord: TileCoord, grid: ElevationGrid) {
        if let Ok(mut grids) = self.grids.write() {
            grids.insert(coord, grid);
        }
    }

    /// Drop the elevation grid for an evicted tile.
    pub fn remove_grid(&self, coord: &TileCoord) {
        if let Ok(mut grids) = self.grids.write() {
            grids.remove(coord);
        }
    }

    /// Number of resident grids.
    pub fn grid_count(&self) -> usize {
        self.grids.read().map(|grids| grids.len()).unwrap_or(0)
    }
}

impl HeightProvider for StreamedTerrain {
    fn height_at(&self, lat: f64, lng: f64) -> f64 {
        let Ok(coord) = to_tile_coords(lat, lng, self.zoom) else {
            return self.fallback;
        };
        let Ok(grids) = self.grids.read() else {
            return self.fallback;
        };
        let Some(grid) = grids.get(&coord) else {
            return self.fallback;
        };

        let bounds = tile_to_bounds(&coord);
        // North edge is v=0; latitude decreases with v
        let u = (lng - bounds.lng_min) / (bounds.lng_max - bounds.lng_min);
        let v = (bounds.lat_max - lat) / (bounds.lat_max - bounds.lat_min);
        grid.sample(u, v)
    }
}
