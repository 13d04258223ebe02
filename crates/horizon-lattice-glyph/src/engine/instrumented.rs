//! An engine wrapper that counts calls per operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{FontHandle, RasterEngine};
use crate::error::GlyphResult;
use crate::types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, RasterizeResult};

/// Number of engine calls made for each operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCallCounts {
    /// Calls to `load`.
    pub load: u64,
    /// Calls to `unload`.
    pub unload: u64,
    /// Calls to `glyph_count`.
    pub glyph_count: u64,
    /// Calls to `lookup_glyph_index`.
    pub lookup_glyph_index: u64,
    /// Calls to `metrics_indexed`.
    pub metrics_indexed: u64,
    /// Calls to `rasterize_indexed`.
    pub rasterize_indexed: u64,
    /// Calls to `units_per_em`.
    pub units_per_em: u64,
    /// Calls to `scale_factor`.
    pub scale_factor: u64,
    /// Calls to `horizontal_line_metrics`.
    pub horizontal_line_metrics: u64,
    /// Calls to `vertical_line_metrics`.
    pub vertical_line_metrics: u64,
}

impl EngineCallCounts {
    /// Calls made by queries, excluding load and unload bookkeeping.
    pub fn queries(&self) -> u64 {
        self.glyph_count
            + self.lookup_glyph_index
            + self.metrics_indexed
            + self.rasterize_indexed
            + self.units_per_em
            + self.scale_factor
            + self.horizontal_line_metrics
            + self.vertical_line_metrics
    }
}

#[derive(Default)]
struct Counters {
    load: AtomicU64,
    unload: AtomicU64,
    glyph_count: AtomicU64,
    lookup_glyph_index: AtomicU64,
    metrics_indexed: AtomicU64,
    rasterize_indexed: AtomicU64,
    units_per_em: AtomicU64,
    scale_factor: AtomicU64,
    horizontal_line_metrics: AtomicU64,
    vertical_line_metrics: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Wraps another engine and records how often each operation is invoked.
///
/// Useful for verifying that a [`FontCached`](crate::FontCached) reaches the
/// engine at most once per distinct query.
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_glyph::{FontdueEngine, InstrumentedEngine};
///
/// let engine = Arc::new(InstrumentedEngine::new(Arc::new(FontdueEngine::new())));
/// assert_eq!(engine.counts().queries(), 0);
/// ```
pub struct InstrumentedEngine {
    inner: Arc<dyn RasterEngine>,
    counters: Counters,
}

impl InstrumentedEngine {
    /// Wrap an engine.
    pub fn new(inner: Arc<dyn RasterEngine>) -> Self {
        Self {
            inner,
            counters: Counters::default(),
        }
    }

    /// Snapshot of the call counts so far.
    pub fn counts(&self) -> EngineCallCounts {
        let c = &self.counters;
        EngineCallCounts {
            load: c.load.load(Ordering::Relaxed),
            unload: c.unload.load(Ordering::Relaxed),
            glyph_count: c.glyph_count.load(Ordering::Relaxed),
            lookup_glyph_index: c.lookup_glyph_index.load(Ordering::Relaxed),
            metrics_indexed: c.metrics_indexed.load(Ordering::Relaxed),
            rasterize_indexed: c.rasterize_indexed.load(Ordering::Relaxed),
            units_per_em: c.units_per_em.load(Ordering::Relaxed),
            scale_factor: c.scale_factor.load(Ordering::Relaxed),
            horizontal_line_metrics: c.horizontal_line_metrics.load(Ordering::Relaxed),
            vertical_line_metrics: c.vertical_line_metrics.load(Ordering::Relaxed),
        }
    }

    /// Reset all counts to zero.
    pub fn reset(&self) {
        let c = &self.counters;
        for counter in [
            &c.load,
            &c.unload,
            &c.glyph_count,
            &c.lookup_glyph_index,
            &c.metrics_indexed,
            &c.rasterize_indexed,
            &c.units_per_em,
            &c.scale_factor,
            &c.horizontal_line_metrics,
            &c.vertical_line_metrics,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for InstrumentedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentedEngine")
            .field("counts", &self.counts())
            .finish_non_exhaustive()
    }
}

impl RasterEngine for InstrumentedEngine {
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> GlyphResult<FontHandle> {
        bump(&self.counters.load);
        self.inner.load(bytes, options)
    }

    fn unload(&self, handle: FontHandle) -> bool {
        bump(&self.counters.unload);
        self.inner.unload(handle)
    }

    fn glyph_count(&self, handle: FontHandle) -> GlyphResult<u16> {
        bump(&self.counters.glyph_count);
        self.inner.glyph_count(handle)
    }

    fn lookup_glyph_index(&self, handle: FontHandle, character: char) -> GlyphResult<GlyphIndex> {
        bump(&self.counters.lookup_glyph_index);
        self.inner.lookup_glyph_index(handle, character)
    }

    fn metrics_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<Metrics> {
        bump(&self.counters.metrics_indexed);
        self.inner.metrics_indexed(handle, index, px)
    }

    fn rasterize_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<RasterizeResult> {
        bump(&self.counters.rasterize_indexed);
        self.inner.rasterize_indexed(handle, index, px)
    }

    fn units_per_em(&self, handle: FontHandle) -> GlyphResult<u16> {
        bump(&self.counters.units_per_em);
        self.inner.units_per_em(handle)
    }

    fn scale_factor(&self, handle: FontHandle, px: f32) -> GlyphResult<f32> {
        bump(&self.counters.scale_factor);
        self.inner.scale_factor(handle, px)
    }

    fn horizontal_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        bump(&self.counters.horizontal_line_metrics);
        self.inner.horizontal_line_metrics(handle, px)
    }

    fn vertical_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        bump(&self.counters.vertical_line_metrics);
        self.inner.vertical_line_metrics(handle, px)
    }
}
