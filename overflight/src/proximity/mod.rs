//! Distance-hysteresis streaming.
//!
//! Generic load/unload gating for anything anchored at a world position:
//! items load inside one radius and unload beyond a larger one. The gap
//! between the two radii is the hysteresis band; an item sitting in the band
//! keeps whatever state it already has, so circling the boundary never
//! flickers.

use crate::coord::WorldPosition;

/// A load or unload decision emitted by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityEvent {
    Loaded(usize),
    Unloaded(usize),
}

struct Slot<T> {
    item: T,
    world_x: f64,
    world_z: f64,
    loaded: bool,
}

/// Tracks a fixed set of positioned items against load/unload radii.
pub struct ProximityLoader<T> {
    slots: Vec<Slot<T>>,
    load_distance: f64,
    unload_distance: f64,
}

impl<T> ProximityLoader<T> {
    /// Create a loader; `unload_distance` must exceed `load_distance`.
    pub fn new(load_distance: f64, unload_distance: f64) -> Self {
        debug_assert!(unload_distance > load_distance);
        Self {
            slots: Vec::new(),
            load_distance,
            unload_distance,
        }
    }

    /// Register an item at a world position. Items start unloaded.
    ///
    /// Returns the index used in [`ProximityEvent`]s.
    pub fn insert(&mut self, item: T, world_x: f64, world_z: f64) -> usize {
        self.slots.push(Slot {
            item,
            world_x,
            world_z,
            loaded: false,
        });
        self.slots.len() - 1
    }

    /// Sweep all items against the observer position, emitting one event per
    /// state change.
    pub fn update(&mut self, observer: &WorldPosition) -> Vec<ProximityEvent> {
        let mut events = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let dx = slot.world_x - observer.x;
            let dz = slot.world_z - observer.z;
            let distance = (dx * dx + dz * dz).sqrt();

            if !slot.loaded && distance < self.load_distance {
                slot.loaded = true;
                events.push(ProximityEvent::Loaded(index));
            } else if slot.loaded && distance > self.unload_distance {
                slot.loaded = false;
                events.push(ProximityEvent::Unloaded(index));
            }
        }
        events
    }

    /// The item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).map(|slot| &slot.item)
    }

    /// Whether the item at `index` is currently loaded.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.loaded)
    }

    /// Currently loaded items.
    pub fn loaded(&self) -> impl Iterator<Item = &T> {
        self.slots
            .iter()
            .filter(|slot| slot.loaded)
            .map(|slot| &slot.item)
    }

    /// Number of currently loaded items.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.loaded).count()
    }

    /// Total number of registered items.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
