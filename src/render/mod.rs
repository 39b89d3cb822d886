//! Offscreen chart surfaces.
//!
//! A surface pairs a renderer with mutable display geometry. Captures
//! temporarily force the canonical export geometry and restore whatever
//! was there before, even when rendering fails. A per-surface lock
//! serializes captures of the same surface so concurrent report runs
//! never observe each other's geometry swap.

pub mod raster;
pub mod surfaces;
pub mod svg;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::services::aggregate::ChartStore;

/// Fixed export geometry: every captured chart renders at 1200x600
/// with animation-free, clipped output regardless of how the surface
/// is currently displayed.
pub const CANONICAL_WIDTH: u32 = 1200;
pub const CANONICAL_HEIGHT: u32 = 600;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("svg parse failed: {0}")]
    InvalidSvg(String),
    #[error("raster target has zero size")]
    ZeroSize,
    #[error("no data for surface {0}")]
    EmptyDataset(&'static str),
}

/// Decoded RGBA pixels of one captured surface.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Pixels with the alpha channel dropped. Surfaces render on an
    /// opaque white background, so alpha carries no information.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

/// Display geometry of a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
    /// Whether the surface scales with its container.
    pub responsive: bool,
    /// Whether drawing is clipped to the surface bounds.
    pub clipped: bool,
}

impl SurfaceGeometry {
    pub fn canonical() -> Self {
        Self {
            width: CANONICAL_WIDTH,
            height: CANONICAL_HEIGHT,
            responsive: false,
            clipped: true,
        }
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            responsive: true,
            clipped: true,
        }
    }
}

/// Renders a surface at the requested geometry from the current chart
/// datasets.
#[async_trait]
pub trait SurfaceRenderer: Send + Sync {
    async fn render(
        &self,
        charts: &ChartStore,
        geometry: &SurfaceGeometry,
    ) -> Result<RasterImage, RenderError>;
}

/// Restores the saved geometry when dropped, so early returns from a
/// failed render still leave the surface as it was.
struct GeometryLease<'a> {
    slot: MutexGuard<'a, SurfaceGeometry>,
    saved: SurfaceGeometry,
}

impl Drop for GeometryLease<'_> {
    fn drop(&mut self) {
        *self.slot = self.saved.clone();
    }
}

/// One registered surface: its renderer plus its live geometry.
pub struct SurfaceEntry {
    geometry: Mutex<SurfaceGeometry>,
    renderer: Box<dyn SurfaceRenderer>,
}

impl SurfaceEntry {
    pub fn new(renderer: Box<dyn SurfaceRenderer>) -> Self {
        Self {
            geometry: Mutex::new(SurfaceGeometry::default()),
            renderer,
        }
    }

    pub async fn geometry(&self) -> SurfaceGeometry {
        self.geometry.lock().await.clone()
    }

    pub async fn set_geometry(&self, geometry: SurfaceGeometry) {
        *self.geometry.lock().await = geometry;
    }

    /// Capture the surface at canonical geometry. The lock is held for
    /// the whole render, so two captures of the same surface run one
    /// after the other; the prior geometry is restored either way.
    pub async fn capture(&self, charts: &ChartStore) -> Result<RasterImage, RenderError> {
        let mut slot = self.geometry.lock().await;
        let saved = slot.clone();
        *slot = SurfaceGeometry::canonical();
        let lease = GeometryLease { slot, saved };
        let result = self
            .renderer
            .render(charts, &SurfaceGeometry::canonical())
            .await;
        drop(lease);
        result
    }
}

/// Registry of capturable surfaces keyed by surface id.
#[derive(Default)]
pub struct SurfaceRegistry {
    entries: HashMap<String, Arc<SurfaceEntry>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, renderer: Box<dyn SurfaceRenderer>) {
        self.entries
            .insert(id.into(), Arc::new(SurfaceEntry::new(renderer)));
    }

    pub fn get(&self, id: &str) -> Option<Arc<SurfaceEntry>> {
        self.entries.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRenderer;

    #[async_trait]
    impl SurfaceRenderer for FixedRenderer {
        async fn render(
            &self,
            _charts: &ChartStore,
            geometry: &SurfaceGeometry,
        ) -> Result<RasterImage, RenderError> {
            Ok(RasterImage {
                width: geometry.width,
                height: geometry.height,
                rgba: vec![0; (geometry.width * geometry.height * 4) as usize],
            })
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl SurfaceRenderer for FailingRenderer {
        async fn render(
            &self,
            _charts: &ChartStore,
            _geometry: &SurfaceGeometry,
        ) -> Result<RasterImage, RenderError> {
            Err(RenderError::EmptyDataset("failing"))
        }
    }

    #[tokio::test]
    async fn capture_uses_canonical_geometry_and_restores() {
        let entry = SurfaceEntry::new(Box::new(FixedRenderer));
        let display = SurfaceGeometry {
            width: 640,
            height: 320,
            responsive: true,
            clipped: false,
        };
        entry.set_geometry(display.clone()).await;

        let image = entry.capture(&ChartStore::default()).await.unwrap();
        assert_eq!(image.width, CANONICAL_WIDTH);
        assert_eq!(image.height, CANONICAL_HEIGHT);
        assert_eq!(entry.geometry().await, display);
    }

    #[tokio::test]
    async fn failed_capture_still_restores_geometry() {
        let entry = SurfaceEntry::new(Box::new(FailingRenderer));
        let display = SurfaceGeometry {
            width: 300,
            height: 150,
            responsive: false,
            clipped: true,
        };
        entry.set_geometry(display.clone()).await;

        assert!(entry.capture(&ChartStore::default()).await.is_err());
        assert_eq!(entry.geometry().await, display);
    }

    #[test]
    fn rgb_bytes_drops_alpha() {
        let image = RasterImage {
            width: 2,
            height: 1,
            rgba: vec![1, 2, 3, 255, 4, 5, 6, 255],
        };
        assert_eq!(image.rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }
}
