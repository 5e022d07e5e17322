//! Asynchronous tile fetch plumbing.
//!
//! The cache runs on the simulation thread and must never block on the
//! network, so fetches are fire-and-forget: the requester spawns a task per
//! tile and posts the outcome on an unbounded channel the cache drains at
//! the start of each update. A stalled or lost fetch simply never posts;
//! the tile stays `Pending` and nothing waits on it.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coord::TileCoord;
use crate::terrain::provider::{FetchError, ImageryProvider};

/// Outcome of one tile fetch, posted back to the cache.
#[derive(Debug)]
pub struct FetchResult {
    pub tile: TileCoord,
    pub payload: Result<Bytes, FetchError>,
}

/// Issues tile fetches without blocking the caller.
///
/// The production implementation spawns tokio tasks; tests substitute a
/// recording stub so cache behavior can be driven deterministically.
pub trait TileRequester: Send {
    /// Begin fetching a tile. Must return immediately.
    fn request(&self, tile: TileCoord);
}

/// Tokio-backed requester: one task per tile, results on a channel.
pub struct AsyncRequester {
    provider: Arc<dyn ImageryProvider>,
    results: mpsc::UnboundedSender<FetchResult>,
    cancel: CancellationToken,
}

impl AsyncRequester {
    /// Create a requester and the receiver half the cache drains.
    ///
    /// Cancelling the token abandons all in-flight fetches; their tiles
    /// remain `Pending`.
    pub fn new(
        provider: Arc<dyn ImageryProvider>,
        cancel: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<FetchResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                provider,
                results: tx,
                cancel,
            },
            rx,
        )
    }
}

impl TileRequester for AsyncRequester {
    fn request(&self, tile: TileCoord) {
        let provider = Arc::clone(&self.provider);
        let results = self.results.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%tile, "Fetch cancelled");
                }
                payload = provider.fetch(tile) => {
                    // Receiver gone means the cache was dropped; nothing to do
                    let _ = results.send(FetchResult { tile, payload });
                }
            }
        });
    }
}
