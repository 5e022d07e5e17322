//! Satellite imagery providers.
//!
//! A provider turns a tile coordinate into encoded image bytes. The only
//! network provider is ArcGIS World Imagery (no authentication for the
//! public tier); [`OfflineProvider`] stands in when the simulation runs
//! without network access, forcing every tile onto the fallback color.

use bytes::Bytes;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::TileCoord;

/// Base URL for ArcGIS World Imagery tiles.
const ARCGIS_BASE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile";

/// Maximum zoom level served by ArcGIS World Imagery.
const ARCGIS_MAX_ZOOM: u8 = 19;

/// HTTP request timeout for tile fetches.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Errors from imagery fetching.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Zoom level not served by this provider.
    #[error("Zoom level {0} not supported by provider")]
    UnsupportedZoom(u8),

    /// Provider has no network access.
    #[error("Provider is offline")]
    Offline,
}

/// Trait for satellite imagery sources.
///
/// `fetch` returns a boxed future so providers can live behind
/// `Arc<dyn ImageryProvider>` and be swapped at construction time.
pub trait ImageryProvider: Send + Sync + 'static {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the encoded image for a tile.
    fn fetch(&self, tile: TileCoord) -> BoxFuture<'static, Result<Bytes, FetchError>>;
}

/// ArcGIS World Imagery provider.
///
/// URL pattern: `{base}/{z}/{y}/{x}` - row before column, which is easy to
/// get backwards.
pub struct ArcGisProvider {
    client: reqwest::Client,
}

impl ArcGisProvider {
    /// Create a provider with a default HTTP client.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn build_url(tile: &TileCoord) -> String {
        format!("{}/{}/{}/{}", ARCGIS_BASE_URL, tile.zoom, tile.y, tile.x)
    }
}

impl ImageryProvider for ArcGisProvider {
    fn name(&self) -> &'static str {
        "ArcGIS"
    }

    fn fetch(&self, tile: TileCoord) -> BoxFuture<'static, Result<Bytes, FetchError>> {
        let client = self.client.clone();
        Box::pin(async move {
            if tile.zoom > ARCGIS_MAX_ZOOM {
                return Err(FetchError::UnsupportedZoom(tile.zoom));
            }

            let url = ArcGisProvider::build_url(&tile);
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Http(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(FetchError::Http(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            response
                .bytes()
                .await
                .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))
        })
    }
}

/// Provider that fails every fetch.
///
/// Used for offline runs; the cache resolves every tile to the fallback
/// color, keeping the streaming pipeline itself exercised.
pub struct OfflineProvider;

impl ImageryProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "Offline"
    }

    fn fetch(&self, _tile: TileCoord) -> BoxFuture<'static, Result<Bytes, FetchError>> {
        Box::pin(async { Err(FetchError::Offline) })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Provider returning a canned response, for cache tests.
    pub struct StaticProvider {
        pub response: Result<Bytes, FetchError>,
    }

    impl ImageryProvider for StaticProvider {
        fn name(&self) -> &'static str {
            "Static"
        }

        fn fetch(&self, _tile: TileCoord) -> BoxFuture<'static, Result<Bytes, FetchError>> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[test]
    fn test_url_construction() {
        let tile = TileCoord::new(200, 100, 15);
        assert_eq!(
            ArcGisProvider::build_url(&tile),
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/15/100/200"
        );
    }

    #[tokio::test]
    async fn test_arcgis_rejects_unsupported_zoom() {
        let provider = ArcGisProvider::new().unwrap();
        // MAX_ZOOM in coord types is 19, but a hand-built coord can exceed it
        let tile = TileCoord::new(0, 0, 20);
        let result = provider.fetch(tile).await;
        assert_eq!(result, Err(FetchError::UnsupportedZoom(20)));
    }

    #[tokio::test]
    async fn test_offline_provider_always_fails() {
        let provider = OfflineProvider;
        let result = provider.fetch(TileCoord::new(1, 2, 16)).await;
        assert_eq!(result, Err(FetchError::Offline));
    }

    #[tokio::test]
    async fn test_static_provider_round_trip() {
        let provider = StaticProvider {
            response: Ok(Bytes::from_static(&[0xFF, 0xD8, 0xFF])),
        };
        let bytes = provider.fetch(TileCoord::new(0, 0, 16)).await.unwrap();
        assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
    }
}
