//! The uncached font facade.

use std::sync::Arc;

use tracing::debug;

use crate::engine::{FontHandle, RasterEngine, global_engine};
use crate::error::{GlyphError, GlyphResult};
use crate::logging::targets;
use crate::types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, RasterizeResult};

/// The largest pixel size a font can be queried at.
pub const MAX_PIXEL_SIZE: f32 = 4096.0;

/// Reject pixel sizes outside `(0, MAX_PIXEL_SIZE]`. NaN is rejected too.
pub(crate) fn check_pixel_size(px: f32) -> GlyphResult<()> {
    if px > 0.0 && px <= MAX_PIXEL_SIZE {
        Ok(())
    } else {
        Err(GlyphError::InvalidPixelSize(px))
    }
}

/// A loaded font.
///
/// Every query goes to the rasterization engine; see
/// [`FontCached`](crate::FontCached) for a memoizing variant. The font is
/// released from the engine when this value is dropped or
/// [`release`](Self::release)d.
///
/// Characters the font does not contain resolve to
/// [`GlyphIndex::MISSING`], and their metrics and bitmaps are those of the
/// font's fallback glyph. Pixel sizes must be positive and at most
/// [`MAX_PIXEL_SIZE`], and glyph indices must be below
/// [`glyph_count`](Self::glyph_count); other values fail with a validation
/// error without reaching the engine.
///
/// # Example
///
/// ```no_run
/// use horizon_lattice_glyph::{initialize_engine, Font, LoadOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// initialize_engine();
///
/// let bytes = std::fs::read("fonts/OpenSans.ttf")?;
/// let font = Font::new(&bytes, LoadOptions::default())?;
///
/// let glyph = font.rasterize('g', 17.0)?;
/// println!(
///     "{}x{} bitmap, advance {}",
///     glyph.metrics.width, glyph.metrics.height, glyph.metrics.advance_width
/// );
/// # Ok(())
/// # }
/// ```
pub struct Font {
    engine: Arc<dyn RasterEngine>,
    handle: FontHandle,
    options: LoadOptions,
    glyph_count: u16,
    released: bool,
}

impl Font {
    /// Load a font through the global engine.
    ///
    /// # Errors
    ///
    /// Returns [`GlyphError::NotInitialized`] if
    /// [`initialize_engine`](crate::initialize_engine) has not been called,
    /// or a load error if the data is not a supported font or the collection
    /// index is out of range.
    pub fn new(bytes: &[u8], options: LoadOptions) -> GlyphResult<Self> {
        Self::with_engine(global_engine()?, bytes, options)
    }

    /// Load a font through a specific engine.
    pub fn with_engine(
        engine: Arc<dyn RasterEngine>,
        bytes: &[u8],
        options: LoadOptions,
    ) -> GlyphResult<Self> {
        let handle = engine.load(bytes, &options)?;
        let glyph_count = match engine.glyph_count(handle) {
            Ok(count) => count,
            Err(err) => {
                engine.unload(handle);
                return Err(err);
            }
        };

        debug!(
            target: targets::FONT,
            ?handle,
            glyph_count,
            scale = options.scale,
            "created font"
        );

        Ok(Self {
            engine,
            handle,
            options,
            glyph_count,
            released: false,
        })
    }

    /// The engine handle of this font.
    pub fn handle(&self) -> FontHandle {
        self.handle
    }

    /// The options the font was loaded with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Number of glyphs in the font.
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Find the glyph index for a character.
    ///
    /// Returns [`GlyphIndex::MISSING`] if the font does not contain it.
    pub fn lookup_glyph_index(&self, character: char) -> GlyphResult<GlyphIndex> {
        self.engine.lookup_glyph_index(self.handle, character)
    }

    /// Layout metrics for a character.
    ///
    /// Equivalent to `metrics_indexed(lookup_glyph_index(character)?, px)`.
    pub fn metrics(&self, character: char, px: f32) -> GlyphResult<Metrics> {
        let index = self.lookup_glyph_index(character)?;
        self.metrics_indexed(index, px)
    }

    /// Layout metrics for a glyph index.
    ///
    /// Prefer [`metrics`](Self::metrics) unless glyphs are pre-indexed.
    pub fn metrics_indexed(&self, index: GlyphIndex, px: f32) -> GlyphResult<Metrics> {
        self.check_glyph(index, px)?;
        self.engine.metrics_indexed(self.handle, index, px)
    }

    /// Layout metrics and coverage bitmap for a character.
    ///
    /// Equivalent to `rasterize_indexed(lookup_glyph_index(character)?, px)`.
    pub fn rasterize(&self, character: char, px: f32) -> GlyphResult<RasterizeResult> {
        let index = self.lookup_glyph_index(character)?;
        self.rasterize_indexed(index, px)
    }

    /// Layout metrics and coverage bitmap for a glyph index.
    pub fn rasterize_indexed(&self, index: GlyphIndex, px: f32) -> GlyphResult<RasterizeResult> {
        self.check_glyph(index, px)?;
        self.engine.rasterize_indexed(self.handle, index, px)
    }

    /// Line metrics for horizontal layout, or `None` if the font has none.
    pub fn horizontal_line_metrics(&self, px: f32) -> GlyphResult<Option<LineMetrics>> {
        check_pixel_size(px)?;
        self.engine.horizontal_line_metrics(self.handle, px)
    }

    /// Line metrics for vertical layout, or `None` if the font has none.
    pub fn vertical_line_metrics(&self, px: f32) -> GlyphResult<Option<LineMetrics>> {
        check_pixel_size(px)?;
        self.engine.vertical_line_metrics(self.handle, px)
    }

    /// The font's units per em.
    pub fn units_per_em(&self) -> GlyphResult<u16> {
        self.engine.units_per_em(self.handle)
    }

    /// Multiplier from font design units to pixels at `px`.
    pub fn scale_factor(&self, px: f32) -> GlyphResult<f32> {
        check_pixel_size(px)?;
        self.engine.scale_factor(self.handle, px)
    }

    /// Release the font's engine resources now.
    ///
    /// Dropping the font has the same effect.
    pub fn release(mut self) {
        self.unload();
    }

    fn check_glyph(&self, index: GlyphIndex, px: f32) -> GlyphResult<()> {
        check_pixel_size(px)?;
        if index.value() >= self.glyph_count {
            return Err(GlyphError::GlyphIndexOutOfRange {
                index: index.value(),
                glyph_count: self.glyph_count,
            });
        }
        Ok(())
    }

    fn unload(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.engine.unload(self.handle);
        debug!(
            target: targets::FONT,
            handle = ?self.handle,
            "released font"
        );
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        self.unload();
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("handle", &self.handle)
            .field("options", &self.options)
            .field("glyph_count", &self.glyph_count)
            .finish_non_exhaustive()
    }
}
