//! Streaming tile cache.
//!
//! The cache keeps a working set of imagery tiles around the vehicle. Each
//! update runs entirely on the simulation thread:
//!
//! 1. drain completed fetches and resolve their tiles,
//! 2. bail out early if the vehicle is still on the tile it was on last
//!    update (the streaming hysteresis),
//! 3. request missing tiles near the vehicle, closest first, capped per
//!    frame,
//! 4. evict tiles beyond the retention ring, capped per frame.
//!
//! The one exception to the hysteresis: when an eviction pass hit its
//! per-frame cap, the leftover work carries over as eviction debt and later
//! updates keep draining it even while the vehicle sits still. A teleport
//! strands an entire working set at once; without the debt it would linger
//! until the next tile crossing.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::TerrainConfig;
use crate::coord::{
    tile_footprint_meters, to_tile_coords, LocalProjection, TileCoord, WorldPosition,
};
use crate::terrain::fetch::{FetchResult, TileRequester};
use crate::terrain::tile::{TileEntry, TileVisual, FALLBACK_COLOR};

/// Forward wedge half-angle for directional streaming: tiles whose bearing
/// differs from the heading by more than this are skipped.
const WEDGE_HALF_ANGLE: f64 = std::f64::consts::PI * 0.75;

/// What one cache update did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Tiles newly requested this update.
    pub loaded: usize,
    /// Tiles evicted this update.
    pub evicted: usize,
    /// Whether the vehicle crossed into a new tile.
    pub tile_changed: bool,
}

/// Streaming cache of terrain imagery tiles.
pub struct TileCache {
    config: TerrainConfig,
    projection: LocalProjection,
    requester: Box<dyn TileRequester>,
    results: mpsc::UnboundedReceiver<FetchResult>,
    resident: HashMap<TileCoord, TileEntry>,
    last_tile: Option<TileCoord>,
    eviction_debt: bool,
}

impl TileCache {
    /// Create an empty cache.
    ///
    /// `results` is the receiving half of the requester's result channel.
    pub fn new(
        config: TerrainConfig,
        projection: LocalProjection,
        requester: Box<dyn TileRequester>,
        results: mpsc::UnboundedReceiver<FetchResult>,
    ) -> Self {
        Self {
            config,
            projection,
            requester,
            results,
            resident: HashMap::new(),
            last_tile: None,
            eviction_debt: false,
        }
    }

    /// Request every tile within the preload radius of the spawn origin.
    ///
    /// Runs once at startup, before the first frame. The radius is circular
    /// and requests go out closest-first; the per-frame load cap does not
    /// apply.
    pub fn preload(&mut self) -> usize {
        let origin = self.projection.origin();
        let Ok(center) = to_tile_coords(origin.lat, origin.lng, self.config.tile_zoom) else {
            warn!("Spawn origin outside tile range; preload skipped");
            return 0;
        };

        let radius = self.config.preload_radius;
        let mut candidates = self.collect_candidates(&center, radius, None);
        candidates.retain(|tile| center.euclidean_distance(tile) <= radius as f64);
        candidates.sort_by(|a, b| {
            center
                .euclidean_distance(a)
                .total_cmp(&center.euclidean_distance(b))
        });

        let count = candidates.len();
        for tile in candidates {
            self.admit(tile);
        }
        debug!(count, "Preloaded spawn tiles");
        count
    }

    /// Advance the streaming state for the vehicle's current position.
    ///
    /// `heading` is the vehicle yaw in radians; it only matters when
    /// directional streaming is enabled.
    pub fn update(&mut self, position: &WorldPosition, heading: f64) -> UpdateOutcome {
        self.drain_results();

        let mut outcome = UpdateOutcome::default();

        let point = self.projection.world_to_geodetic(position.x, position.z);
        let Ok(current) = to_tile_coords(point.lat, point.lng, self.config.tile_zoom) else {
            // Off the tiled world; keep the resident set as-is
            return outcome;
        };

        outcome.tile_changed = self.last_tile != Some(current);
        if !outcome.tile_changed && !self.eviction_debt {
            return outcome;
        }
        self.last_tile = Some(current);

        let wedge = self.config.directional.then_some(heading);
        let mut candidates = self.collect_candidates(&current, self.config.load_radius, wedge);
        candidates.sort_by(|a, b| {
            current
                .euclidean_distance(a)
                .total_cmp(&current.euclidean_distance(b))
        });

        for tile in candidates {
            if outcome.loaded >= self.config.max_loads_per_frame {
                break;
            }
            if self.admit(tile) {
                outcome.loaded += 1;
            }
        }

        outcome.evicted = self.evict_beyond_ring(&current);
        outcome
    }

    /// The entry for a tile, if resident.
    pub fn get(&self, coord: &TileCoord) -> Option<&TileEntry> {
        self.resident.get(coord)
    }

    /// All resident tiles, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &TileEntry> {
        self.resident.values()
    }

    /// Number of resident tiles.
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Number of resident tiles still waiting on imagery.
    pub fn pending_count(&self) -> usize {
        self.resident
            .values()
            .filter(|entry| !entry.visual.is_resolved())
            .count()
    }

    /// Apply completed fetches to their tiles.
    ///
    /// Results for tiles evicted while their fetch was in flight are
    /// dropped; re-admission issues a fresh request.
    fn drain_results(&mut self) {
        while let Ok(result) = self.results.try_recv() {
            let Some(entry) = self.resident.get_mut(&result.tile) else {
                debug!(tile = %result.tile, "Discarding result for evicted tile");
                continue;
            };

            entry.visual = match result.payload {
                Ok(bytes) => match image::load_from_memory(&bytes) {
                    Ok(decoded) => {
                        let rgb = decoded.to_rgb8();
                        TileVisual::Image {
                            width: rgb.width(),
                            height: rgb.height(),
                            data: rgb.into_raw(),
                        }
                    }
                    Err(e) => {
                        warn!(tile = %result.tile, error = %e, "Tile decode failed");
                        TileVisual::Fallback {
                            color: FALLBACK_COLOR,
                        }
                    }
                },
                Err(e) => {
                    debug!(tile = %result.tile, error = %e, "Tile fetch failed");
                    TileVisual::Fallback {
                        color: FALLBACK_COLOR,
                    }
                }
            };
        }
    }

    /// Non-resident tiles within a square radius of `center`, optionally
    /// filtered to the forward wedge around `heading`.
    fn collect_candidates(
        &self,
        center: &TileCoord,
        radius: u32,
        heading: Option<f64>,
    ) -> Vec<TileCoord> {
        let max_tile = 1i64 << self.config.tile_zoom;
        let radius = radius as i64;
        let mut candidates = Vec::new();

        for x in (center.x as i64 - radius)..=(center.x as i64 + radius) {
            if !(0..max_tile).contains(&x) {
                continue;
            }
            for y in (center.y as i64 - radius)..=(center.y as i64 + radius) {
                if !(0..max_tile).contains(&y) {
                    continue;
                }
                let tile = TileCoord::new(x as u32, y as u32, center.zoom);
                if self.resident.contains_key(&tile) {
                    continue;
                }

                if let Some(heading) = heading {
                    let dx = (tile.x as i64 - center.x as i64) as f64;
                    let dy = (tile.y as i64 - center.y as i64) as f64;
                    if !within_wedge(dx, dy, heading) {
                        continue;
                    }
                }

                candidates.push(tile);
            }
        }
        candidates
    }

    /// Admit a tile: place it in world space, mark it pending, request
    /// imagery. Returns false if already resident.
    fn admit(&mut self, coord: TileCoord) -> bool {
        if self.resident.contains_key(&coord) {
            return false;
        }

        let footprint = tile_footprint_meters(&coord);
        let (x, z) = self
            .projection
            .geodetic_to_world(footprint.center_lat, footprint.center_lng);

        self.resident.insert(
            coord,
            TileEntry {
                coord,
                footprint,
                center: WorldPosition::new(x, 0.0, z),
                visual: TileVisual::Pending,
            },
        );
        self.requester.request(coord);
        true
    }

    /// Evict tiles outside the retention ring, farthest first, capped per
    /// frame. Sets eviction debt when the cap left work behind.
    fn evict_beyond_ring(&mut self, current: &TileCoord) -> usize {
        let keep_radius = self.config.load_radius + self.config.eviction_buffer;
        let mut doomed: Vec<TileCoord> = self
            .resident
            .keys()
            .filter(|tile| tile.chebyshev_distance(current) > keep_radius)
            .copied()
            .collect();
        doomed.sort_by(|a, b| {
            current
                .euclidean_distance(b)
                .total_cmp(&current.euclidean_distance(a))
        });

        self.eviction_debt = doomed.len() > self.config.max_evicts_per_frame;

        let mut evicted = 0;
        for tile in doomed.into_iter().take(self.config.max_evicts_per_frame) {
            self.resident.remove(&tile);
            evicted += 1;
        }
        evicted
    }
}

/// True when the tile-space offset `(dx, dy)` lies within the forward wedge
/// around `heading`.
fn within_wedge(dx: f64, dy: f64, heading: f64) -> bool {
    use std::f64::consts::PI;

    let angle_to_tile = dx.atan2(dy);
    let mut diff = angle_to_tile - heading;
    while diff > PI {
        diff -= 2.0 * PI;
    }
    while diff < -PI {
        diff += 2.0 * PI;
    }
    diff.abs() < WEDGE_HALF_ANGLE
}
