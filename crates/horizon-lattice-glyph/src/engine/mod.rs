//! The rasterization engine boundary.
//!
//! A [`RasterEngine`] owns parsed font data and answers metric and bitmap
//! queries for a `(handle, glyph index, pixel size)` triple. Facades never
//! touch font data directly; they hold a [`FontHandle`] and forward to the
//! engine.
//!
//! The process-wide engine must be brought up once before fonts can be created
//! with [`Font::new`](crate::Font::new):
//!
//! ```
//! use horizon_lattice_glyph::{initialize_engine, is_engine_initialized};
//!
//! initialize_engine();
//! assert!(is_engine_initialized());
//!
//! // Repeated calls return the same engine.
//! initialize_engine();
//! ```
//!
//! Facades can also be given an engine explicitly with
//! [`Font::with_engine`](crate::Font::with_engine), which bypasses the global.

mod fontdue_engine;
mod instrumented;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::{Arc, OnceLock};

use slotmap::new_key_type;
use tracing::info;

use crate::error::{GlyphError, GlyphResult};
use crate::logging::targets;
use crate::types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, RasterizeResult};

pub use fontdue_engine::FontdueEngine;
pub use instrumented::{EngineCallCounts, InstrumentedEngine};

new_key_type! {
    /// Identifies one loaded, configured font inside an engine.
    ///
    /// Handles become invalid once the font is unloaded.
    pub struct FontHandle;
}

/// Global engine instance.
static GLOBAL_ENGINE: OnceLock<Arc<FontdueEngine>> = OnceLock::new();

/// The operations a font facade needs from a rasterization engine.
///
/// Implementations hold mutable, handle-addressed state and must be safe to
/// share between threads. Every method except [`load`](Self::load) fails with
/// [`GlyphError::UnknownHandle`] when given a handle the engine does not know.
pub trait RasterEngine: Send + Sync {
    /// Parse font data and return a handle to the loaded font.
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> GlyphResult<FontHandle>;

    /// Release a loaded font. Returns `false` if the handle was unknown.
    fn unload(&self, handle: FontHandle) -> bool;

    /// Number of glyphs in the font's glyph table.
    fn glyph_count(&self, handle: FontHandle) -> GlyphResult<u16>;

    /// Map a character to a glyph index, or [`GlyphIndex::MISSING`] if absent.
    fn lookup_glyph_index(&self, handle: FontHandle, character: char) -> GlyphResult<GlyphIndex>;

    /// Layout metrics for a glyph at a pixel size.
    fn metrics_indexed(&self, handle: FontHandle, index: GlyphIndex, px: f32)
    -> GlyphResult<Metrics>;

    /// Layout metrics and coverage bitmap for a glyph at a pixel size.
    fn rasterize_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<RasterizeResult>;

    /// The font's units per em.
    fn units_per_em(&self, handle: FontHandle) -> GlyphResult<u16>;

    /// Multiplier from font design units to pixels at `px`.
    fn scale_factor(&self, handle: FontHandle, px: f32) -> GlyphResult<f32>;

    /// Horizontal line metrics, if the font has them.
    fn horizontal_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>>;

    /// Vertical line metrics, if the font has them.
    fn vertical_line_metrics(&self, handle: FontHandle, px: f32)
    -> GlyphResult<Option<LineMetrics>>;
}

/// Initialize the global rasterization engine.
///
/// Idempotent: the first call creates the engine, later calls return it.
pub fn initialize_engine() -> Arc<FontdueEngine> {
    let engine = GLOBAL_ENGINE.get_or_init(|| {
        info!(
            target: targets::ENGINE,
            "initialized global rasterization engine"
        );
        Arc::new(FontdueEngine::new())
    });
    Arc::clone(engine)
}

/// Check whether [`initialize_engine`] has been called.
pub fn is_engine_initialized() -> bool {
    GLOBAL_ENGINE.get().is_some()
}

/// Get the global rasterization engine.
///
/// Returns [`GlyphError::NotInitialized`] if [`initialize_engine`] has not
/// been called.
pub fn global_engine() -> GlyphResult<Arc<dyn RasterEngine>> {
    GLOBAL_ENGINE
        .get()
        .map(|engine| Arc::clone(engine) as Arc<dyn RasterEngine>)
        .ok_or(GlyphError::NotInitialized)
}
