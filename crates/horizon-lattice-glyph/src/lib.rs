//! Font metrics and glyph rasterization for Horizon Lattice.
//!
//! This crate wraps a rasterization engine behind two font types:
//!
//! - [`Font`] forwards every query to the engine.
//! - [`FontCached`] answers the same queries but memoizes each one, so
//!   repeated requests for the same glyph and size are served from cache.
//!
//! Both answer layout queries (advances, bounding boxes, line spacing) and
//! produce anti-aliased coverage bitmaps, addressed either by character or by
//! glyph index.
//!
//! # Getting Started
//!
//! Initialize the engine once, then load fonts from their raw bytes:
//!
//! ```no_run
//! use horizon_lattice_glyph::{initialize_engine, FontCached, LoadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! initialize_engine();
//!
//! let bytes = std::fs::read("fonts/OpenSans.ttf")?;
//! let mut font = FontCached::new(&bytes, LoadOptions::default())?;
//!
//! let line = font.horizontal_line_metrics(17.0)?;
//! let glyph = font.rasterize('g', 17.0)?;
//! println!("{:?} {}x{}", line, glyph.metrics.width, glyph.metrics.height);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Engines
//!
//! Any [`RasterEngine`] can back a font. [`InstrumentedEngine`] wraps another
//! engine and counts calls, which makes cache behavior observable:
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_lattice_glyph::{FontCached, FontdueEngine, InstrumentedEngine, LoadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(InstrumentedEngine::new(Arc::new(FontdueEngine::new())));
//! let bytes = std::fs::read("fonts/OpenSans.ttf")?;
//! let mut font = FontCached::with_engine(engine.clone(), &bytes, LoadOptions::default())?;
//!
//! font.rasterize('g', 17.0)?;
//! font.rasterize('g', 17.0)?;
//! assert_eq!(engine.counts().rasterize_indexed, 1);
//! # Ok(())
//! # }
//! ```

mod cache;
mod engine;
mod error;
mod font;
mod font_cached;
pub mod logging;
mod types;

pub use cache::{CacheStats, FontCacheStats};
pub use engine::{
    EngineCallCounts, FontHandle, FontdueEngine, InstrumentedEngine, RasterEngine, global_engine,
    initialize_engine, is_engine_initialized,
};
pub use error::{GlyphError, GlyphResult};
pub use font::{Font, MAX_PIXEL_SIZE};
pub use font_cached::FontCached;
pub use types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, OutlineBounds, RasterizeResult};
