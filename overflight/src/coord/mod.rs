//! Coordinate conversion module
//!
//! Provides conversions between world-space meters, geographic coordinates
//! (latitude/longitude), and Web Mercator tile coordinates, anchored at a
//! fixed geodetic spawn origin.

mod types;

pub use types::{
    CoordError, GeodeticPoint, TileBounds, TileCoord, TileFootprint, WorldPosition, MAX_LAT,
    MAX_ZOOM, METERS_PER_DEGREE, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Local flat-earth projection anchored at a fixed geodetic origin.
///
/// World X increases eastward, world Z increases southward: a point north of
/// the origin has negative Z. Longitude is scaled by the cosine of the
/// *origin* latitude, not the current latitude, so the projection is only
/// locally accurate. Error grows with distance from the origin; within ~50 km
/// the world/geodetic round trip holds to millimeters. This is a known
/// precision bound of the design, not corrected.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin_lat: f64,
    origin_lng: f64,
    /// Precomputed `cos(origin_lat)` for the longitude scale.
    cos_origin_lat: f64,
}

impl LocalProjection {
    /// Create a projection anchored at the given origin.
    pub fn new(origin_lat: f64, origin_lng: f64) -> Self {
        Self {
            origin_lat,
            origin_lng,
            cos_origin_lat: (origin_lat * PI / 180.0).cos(),
        }
    }

    /// The geodetic origin of this projection.
    pub fn origin(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.origin_lat, self.origin_lng)
    }

    /// Convert world-space meters to a geodetic point.
    ///
    /// Only the horizontal components participate; altitude is carried
    /// separately by the caller.
    pub fn world_to_geodetic(&self, x: f64, z: f64) -> GeodeticPoint {
        let lat = self.origin_lat - z / METERS_PER_DEGREE;
        let lng = self.origin_lng + x / (METERS_PER_DEGREE * self.cos_origin_lat);
        GeodeticPoint::new(lat, lng)
    }

    /// Convert a geodetic point to world-space meters (x east, z south).
    ///
    /// Exact inverse of [`world_to_geodetic`](Self::world_to_geodetic).
    pub fn geodetic_to_world(&self, lat: f64, lng: f64) -> (f64, f64) {
        let x = (lng - self.origin_lng) * METERS_PER_DEGREE * self.cos_origin_lat;
        let z = -(lat - self.origin_lat) * METERS_PER_DEGREE;
        (x, z)
    }
}

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lng` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 19)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lng: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=180.0).contains(&lng) {
        return Err(CoordError::InvalidLongitude(lng));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);

    let x = ((lng + 180.0) / 360.0 * n) as u32;

    // Web Mercator projection for the row
    let lat_rad = lat * PI / 180.0;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    Ok(TileCoord { x, y, zoom })
}

/// Converts tile coordinates to geographic bounds.
///
/// Uses the inverse Web Mercator corner formula; adjacent tiles share exactly
/// one edge (no gaps, no overlaps) up to floating-point tolerance.
#[inline]
pub fn tile_to_bounds(tile: &TileCoord) -> TileBounds {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lng_min = tile.x as f64 / n * 360.0 - 180.0;
    let lng_max = (tile.x as f64 + 1.0) / n * 360.0 - 180.0;

    let lat_min = (PI * (1.0 - 2.0 * (tile.y as f64 + 1.0) / n)).sinh().atan() * 180.0 / PI;
    let lat_max = (PI * (1.0 - 2.0 * tile.y as f64 / n)).sinh().atan() * 180.0 / PI;

    TileBounds {
        lat_min,
        lat_max,
        lng_min,
        lng_max,
    }
}

/// Derive a tile's real-world footprint in meters.
///
/// North-south extent comes straight from the latitude span; east-west extent
/// is compensated by the cosine of the tile's center latitude.
#[inline]
pub fn tile_footprint_meters(tile: &TileCoord) -> TileFootprint {
    let bounds = tile_to_bounds(tile);
    let center = bounds.center();

    let lat_diff = bounds.lat_max - bounds.lat_min;
    let lng_diff = bounds.lng_max - bounds.lng_min;

    TileFootprint {
        size_x: lng_diff * METERS_PER_DEGREE * (center.lat * PI / 180.0).cos(),
        size_z: lat_diff * METERS_PER_DEGREE,
        center_lat: center.lat,
        center_lng: center.lng,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAWN_LAT: f64 = 59.113277;
    const SPAWN_LNG: f64 = 10.110296;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let result = to_tile_coords(40.7128, -74.0060, 16);
        assert!(result.is_ok(), "Valid coordinates should not error");

        let tile = result.unwrap();
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_coords(90.0, 0.0, 10);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), CoordError::InvalidLatitude(_)));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = to_tile_coords(40.0, 200.0, 10);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            CoordError::InvalidLongitude(_)
        ));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_coords(40.0, 10.0, MAX_ZOOM + 1);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), CoordError::InvalidZoom(_)));
    }

    #[test]
    fn test_world_geodetic_round_trip_at_origin() {
        let projection = LocalProjection::new(SPAWN_LAT, SPAWN_LNG);
        let point = projection.world_to_geodetic(0.0, 0.0);
        assert!((point.lat - SPAWN_LAT).abs() < 1e-12);
        assert!((point.lng - SPAWN_LNG).abs() < 1e-12);
    }

    #[test]
    fn test_world_geodetic_round_trip_within_50_km() {
        let projection = LocalProjection::new(SPAWN_LAT, SPAWN_LNG);

        for &(x, z) in &[
            (1000.0, 2000.0),
            (-35_000.0, 12_345.6),
            (49_999.0, -49_999.0),
            (0.123, -0.456),
        ] {
            let point = projection.world_to_geodetic(x, z);
            let (rx, rz) = projection.geodetic_to_world(point.lat, point.lng);
            assert!(
                (rx - x).abs() < 1e-3,
                "x round trip failed: {} -> {}",
                x,
                rx
            );
            assert!(
                (rz - z).abs() < 1e-3,
                "z round trip failed: {} -> {}",
                z,
                rz
            );
        }
    }

    #[test]
    fn test_north_is_negative_z() {
        let projection = LocalProjection::new(SPAWN_LAT, SPAWN_LNG);
        // A point 1 km north of the origin
        let (_, z) = projection.geodetic_to_world(SPAWN_LAT + 1000.0 / METERS_PER_DEGREE, SPAWN_LNG);
        assert!((z - (-1000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_adjacent_tiles_share_one_edge() {
        let tile = to_tile_coords(SPAWN_LAT, SPAWN_LNG, 16).unwrap();
        let east = TileCoord::new(tile.x + 1, tile.y, tile.zoom);
        let south = TileCoord::new(tile.x, tile.y + 1, tile.zoom);

        let bounds = tile_to_bounds(&tile);
        let east_bounds = tile_to_bounds(&east);
        let south_bounds = tile_to_bounds(&south);

        assert!((bounds.lng_max - east_bounds.lng_min).abs() < 1e-9);
        assert!((bounds.lat_min - south_bounds.lat_max).abs() < 1e-9);
    }

    #[test]
    fn test_tile_footprint_near_spawn() {
        // Web Mercator tiles are locally square: at zoom 16 near 59°N both
        // extents come out around 314 m.
        let tile = to_tile_coords(SPAWN_LAT, SPAWN_LNG, 16).unwrap();
        let footprint = tile_footprint_meters(&tile);

        assert!(
            footprint.size_x > 250.0 && footprint.size_x < 400.0,
            "Unexpected east-west size: {}",
            footprint.size_x
        );
        assert!(
            footprint.size_z > 250.0 && footprint.size_z < 400.0,
            "Unexpected north-south size: {}",
            footprint.size_z
        );
        assert!((footprint.size_x - footprint.size_z).abs() < 20.0);
        assert!(footprint.center_lat > 59.0 && footprint.center_lat < 59.3);
        assert!(footprint.center_lng > 10.0 && footprint.center_lng < 10.2);
    }

    #[test]
    fn test_footprint_narrower_at_higher_latitude() {
        let equator = tile_footprint_meters(&to_tile_coords(0.1, 10.0, 12).unwrap());
        let north = tile_footprint_meters(&to_tile_coords(70.0, 10.0, 12).unwrap());
        assert!(north.size_x < equator.size_x);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_projection_round_trip(
                x in -50_000.0..50_000.0_f64,
                z in -50_000.0..50_000.0_f64,
            ) {
                let projection = LocalProjection::new(SPAWN_LAT, SPAWN_LNG);
                let point = projection.world_to_geodetic(x, z);
                let (rx, rz) = projection.geodetic_to_world(point.lat, point.lng);
                prop_assert!((rx - x).abs() < 1e-3);
                prop_assert!((rz - z).abs() < 1e-3);
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lat in -85.05..85.05_f64,
                lng in -180.0..180.0_f64,
                zoom in 0u8..=19
            ) {
                let tile = to_tile_coords(lat, lng, zoom)?;
                let max_tile = 2u32.pow(zoom as u32);
                prop_assert!(tile.x < max_tile);
                prop_assert!(tile.y < max_tile);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_longitude_monotonic_in_x(
                lat in 0.0..1.0_f64,
                lng1 in -180.0..-90.0_f64,
                lng2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                // For fixed latitude, increasing longitude never decreases x
                let tile1 = to_tile_coords(lat, lng1, zoom)?;
                let tile2 = to_tile_coords(lat, lng2, zoom)?;
                prop_assert!(tile1.x < tile2.x);
            }

            #[test]
            fn test_latitude_monotonic_in_y(
                lat1 in 40.0..60.0_f64,
                lat2 in -60.0..-40.0_f64,
                lng in -10.0..10.0_f64,
                zoom in 10u8..=15
            ) {
                // Row increases southward: higher latitude means smaller y
                let north = to_tile_coords(lat1, lng, zoom)?;
                let south = to_tile_coords(lat2, lng, zoom)?;
                prop_assert!(north.y < south.y);
            }

            #[test]
            fn test_bounds_contain_source_point(
                lat in -80.0..80.0_f64,
                lng in -179.0..179.0_f64,
                zoom in 5u8..=18
            ) {
                let tile = to_tile_coords(lat, lng, zoom)?;
                let bounds = tile_to_bounds(&tile);
                prop_assert!(lat >= bounds.lat_min - 1e-9 && lat <= bounds.lat_max + 1e-9);
                prop_assert!(lng >= bounds.lng_min - 1e-9 && lng <= bounds.lng_max + 1e-9);
            }

            #[test]
            fn test_footprint_is_positive(
                lat in -80.0..80.0_f64,
                lng in -179.0..179.0_f64,
                zoom in 5u8..=18
            ) {
                let tile = to_tile_coords(lat, lng, zoom)?;
                let footprint = tile_footprint_meters(&tile);
                prop_assert!(footprint.size_x > 0.0);
                prop_assert!(footprint.size_z > 0.0);
            }
        }
    }
}
