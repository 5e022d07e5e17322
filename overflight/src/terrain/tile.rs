//! Resident tile representation.

use crate::coord::{TileCoord, TileFootprint, WorldPosition};

/// RGB of the solid ground color used when imagery cannot be fetched.
pub const FALLBACK_COLOR: [u8; 3] = [0x7c, 0xb3, 0x42];

/// What a resident tile currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileVisual {
    /// Imagery requested but not yet arrived; tile renders as placeholder.
    Pending,
    /// Decoded imagery, tightly packed RGB8.
    Image {
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    /// Imagery fetch or decode failed; tile renders a solid color.
    Fallback { color: [u8; 3] },
}

impl TileVisual {
    /// True once the tile no longer waits on a fetch.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TileVisual::Pending)
    }
}

/// A tile resident in the cache, placed in world space.
#[derive(Debug, Clone)]
pub struct TileEntry {
    /// Slippy coordinates of this tile.
    pub coord: TileCoord,
    /// Real-world extent and geodetic center.
    pub footprint: TileFootprint,
    /// World-space center of the tile quad (y = 0 ground plane).
    pub center: WorldPosition,
    /// Current display state.
    pub visual: TileVisual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_unresolved() {
        assert!(!TileVisual::Pending.is_resolved());
        assert!(TileVisual::Fallback {
            color: FALLBACK_COLOR
        }
        .is_resolved());
        assert!(TileVisual::Image {
            width: 1,
            height: 1,
            data: vec![0, 0, 0]
        }
        .is_resolved());
    }
}
