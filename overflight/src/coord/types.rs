//! Coordinate types shared across the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;
/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 19;
/// Minimum supported zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Meters per degree of latitude, the scale constant of the local projection.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Errors from coordinate conversions.
#[derive(Debug, Error)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range.
    #[error("Invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// Zoom level above the supported maximum.
    #[error("Invalid zoom level: {0} (must be 0 to {MAX_ZOOM})")]
    InvalidZoom(u8),
}

/// A latitude/longitude pair in degrees.
///
/// Always derived from a [`WorldPosition`](crate::coord::WorldPosition) via
/// the projection, never authoritative simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeodeticPoint {
    /// Create a new geodetic point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A Cartesian position in world space.
///
/// World space is meters anchored at the spawn origin: `x` increases east,
/// `z` increases south (the projection negates latitude deltas), `y` is
/// altitude above the reference plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    /// Create a new world position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of this position treated as a vector.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Length of the horizontal (XZ) component.
    pub fn horizontal_length(&self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Linear interpolation toward `other` by factor `t` in [0, 1].
    pub fn lerp(&self, other: &WorldPosition, t: f64) -> WorldPosition {
        WorldPosition {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A slippy-map tile coordinate.
///
/// `x` increases eastward from the antimeridian, `y` increases southward
/// from the north pole, per the standard Web Mercator tiling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile column (X coordinate, 0 = west edge).
    pub x: u32,
    /// Tile row (Y coordinate, 0 = north edge).
    pub y: u32,
    /// Zoom level.
    pub zoom: u8,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Chebyshev (chessboard) distance to another tile at the same zoom.
    pub fn chebyshev_distance(&self, other: &TileCoord) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        dx.max(dy) as u32
    }

    /// Euclidean distance to another tile at the same zoom, in tile units.
    pub fn euclidean_distance(&self, other: &TileCoord) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic bounds of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// Southernmost latitude.
    pub lat_min: f64,
    /// Northernmost latitude.
    pub lat_max: f64,
    /// Westernmost longitude.
    pub lng_min: f64,
    /// Easternmost longitude.
    pub lng_max: f64,
}

impl TileBounds {
    /// Center point of the bounds.
    pub fn center(&self) -> GeodeticPoint {
        GeodeticPoint::new(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lng_min + self.lng_max) / 2.0,
        )
    }
}

/// Real-world footprint of a tile in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileFootprint {
    /// East-west extent in meters, compensated by `cos(center_lat)`.
    pub size_x: f64,
    /// North-south extent in meters.
    pub size_z: f64,
    /// Latitude of the tile center.
    pub center_lat: f64,
    /// Longitude of the tile center.
    pub center_lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_display() {
        let tile = TileCoord::new(19295, 24640, 16);
        assert_eq!(format!("{}", tile), "16/19295/24640");
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = TileCoord::new(100, 100, 16);
        let b = TileCoord::new(103, 95, 16);
        assert_eq!(a.chebyshev_distance(&b), 5);
        assert_eq!(b.chebyshev_distance(&a), 5);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = TileCoord::new(0, 0, 10);
        let b = TileCoord::new(3, 4, 10);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_world_position_lerp() {
        let a = WorldPosition::new(0.0, 0.0, 0.0);
        let b = WorldPosition::new(10.0, 20.0, -10.0);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-12);
        assert!((mid.y - 10.0).abs() < 1e-12);
        assert!((mid.z - (-5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_world_position_is_finite() {
        assert!(WorldPosition::new(1.0, 2.0, 3.0).is_finite());
        assert!(!WorldPosition::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!WorldPosition::new(0.0, f64::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn test_tile_bounds_center() {
        let bounds = TileBounds {
            lat_min: 59.0,
            lat_max: 60.0,
            lng_min: 10.0,
            lng_max: 11.0,
        };
        let center = bounds.center();
        assert!((center.lat - 59.5).abs() < 1e-12);
        assert!((center.lng - 10.5).abs() < 1e-12);
    }
}
