//! Rasterization engine backed by fontdue.

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::SlotMap;
use static_assertions::assert_impl_all;
use tracing::{debug, trace};

use super::{FontHandle, RasterEngine};
use crate::error::{GlyphError, GlyphResult};
use crate::font::check_pixel_size;
use crate::logging::targets;
use crate::types::{
    GlyphIndex, LineMetrics, LoadOptions, Metrics, OutlineBounds, RasterizeResult,
};

/// A parsed font and the facts recorded about it at load time.
struct LoadedFont {
    font: fontdue::Font,
    glyph_count: u16,
}

impl LoadedFont {
    fn check_index(&self, index: GlyphIndex) -> GlyphResult<u16> {
        if index.value() >= self.glyph_count {
            return Err(GlyphError::GlyphIndexOutOfRange {
                index: index.value(),
                glyph_count: self.glyph_count,
            });
        }
        Ok(index.value())
    }
}

/// The production rasterization engine.
///
/// Fonts are stored in a slot map keyed by [`FontHandle`]. Collection indices
/// are checked with ttf-parser before fontdue parses the data. Glyph queries
/// reject invalid pixel sizes and bitmaps too large to allocate.
pub struct FontdueEngine {
    fonts: Mutex<SlotMap<FontHandle, Arc<LoadedFont>>>,
}

assert_impl_all!(FontdueEngine: Send, Sync);

impl FontdueEngine {
    /// Create an engine with no fonts loaded.
    pub fn new() -> Self {
        Self {
            fonts: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Number of fonts currently loaded.
    pub fn font_count(&self) -> usize {
        self.fonts.lock().len()
    }

    /// Check whether a handle refers to a loaded font.
    pub fn contains(&self, handle: FontHandle) -> bool {
        self.fonts.lock().contains_key(handle)
    }

    // The lock is released before the font is queried, so slow rasterization
    // on one font does not block loads or queries on others.
    fn font(&self, handle: FontHandle) -> GlyphResult<Arc<LoadedFont>> {
        self.fonts
            .lock()
            .get(handle)
            .cloned()
            .ok_or(GlyphError::UnknownHandle)
    }
}

impl Default for FontdueEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontdueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueEngine")
            .field("font_count", &self.font_count())
            .finish()
    }
}

impl RasterEngine for FontdueEngine {
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> GlyphResult<FontHandle> {
        if !options.scale.is_finite() || options.scale <= 0.0 {
            return Err(GlyphError::InvalidOptions(format!(
                "scale must be a finite positive number, got {}",
                options.scale
            )));
        }

        // Plain font files hold exactly one face.
        let face_count = ttf_parser::fonts_in_collection(bytes).unwrap_or(1);
        if options.collection_index >= face_count {
            return Err(GlyphError::CollectionIndexOutOfRange {
                index: options.collection_index,
                count: face_count,
            });
        }

        // fontdue always offsets glyphs within their bounding box.
        if !options.enable_offset_bounding_box {
            debug!(
                target: targets::ENGINE,
                "offset bounding box cannot be disabled; ignoring"
            );
        }

        let font = fontdue::Font::from_bytes(
            bytes,
            fontdue::FontSettings {
                collection_index: options.collection_index,
                scale: options.scale,
                ..Default::default()
            },
        )
        .map_err(|e| GlyphError::InvalidFont(e.to_string()))?;
        let glyph_count = font.glyph_count();

        let handle = self
            .fonts
            .lock()
            .insert(Arc::new(LoadedFont { font, glyph_count }));

        debug!(
            target: targets::ENGINE,
            ?handle,
            glyph_count,
            collection_index = options.collection_index,
            face_count,
            size = bytes.len(),
            "loaded font"
        );

        Ok(handle)
    }

    fn unload(&self, handle: FontHandle) -> bool {
        let removed = self.fonts.lock().remove(handle).is_some();
        debug!(
            target: targets::ENGINE,
            ?handle,
            removed,
            "unloaded font"
        );
        removed
    }

    fn glyph_count(&self, handle: FontHandle) -> GlyphResult<u16> {
        Ok(self.font(handle)?.glyph_count)
    }

    fn lookup_glyph_index(&self, handle: FontHandle, character: char) -> GlyphResult<GlyphIndex> {
        let loaded = self.font(handle)?;
        Ok(GlyphIndex::new(loaded.font.lookup_glyph_index(character)))
    }

    fn metrics_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<Metrics> {
        check_pixel_size(px)?;
        let loaded = self.font(handle)?;
        let raw = loaded.check_index(index)?;
        Ok(Metrics::from(loaded.font.metrics_indexed(raw, px)))
    }

    fn rasterize_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<RasterizeResult> {
        check_pixel_size(px)?;
        let loaded = self.font(handle)?;
        let raw = loaded.check_index(index)?;
        check_bitmap_size(&loaded.font.metrics_indexed(raw, px))?;
        let (metrics, bitmap) = loaded.font.rasterize_indexed(raw, px);

        trace!(
            target: targets::ENGINE,
            ?handle,
            %index,
            px,
            width = metrics.width,
            height = metrics.height,
            "rasterized glyph"
        );

        Ok(RasterizeResult {
            metrics: Metrics::from(metrics),
            bitmap,
        })
    }

    fn units_per_em(&self, handle: FontHandle) -> GlyphResult<u16> {
        // fontdue reports the head table's u16 value as a float.
        Ok(self.font(handle)?.font.units_per_em() as u16)
    }

    fn scale_factor(&self, handle: FontHandle, px: f32) -> GlyphResult<f32> {
        Ok(self.font(handle)?.font.scale_factor(px))
    }

    fn horizontal_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        Ok(self
            .font(handle)?
            .font
            .horizontal_line_metrics(px)
            .map(LineMetrics::from))
    }

    fn vertical_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        Ok(self
            .font(handle)?
            .font
            .vertical_line_metrics(px)
            .map(LineMetrics::from))
    }
}

/// Upper bound on the coverage values in one glyph bitmap.
const MAX_BITMAP_PIXELS: usize = 1 << 26;

// Outlines can extend far past the em box, so a valid pixel size does not
// bound the bitmap.
fn check_bitmap_size(metrics: &fontdue::Metrics) -> GlyphResult<()> {
    match metrics.width.checked_mul(metrics.height) {
        Some(pixels) if pixels <= MAX_BITMAP_PIXELS => Ok(()),
        _ => Err(GlyphError::BitmapTooLarge {
            width: metrics.width,
            height: metrics.height,
        }),
    }
}

impl From<fontdue::OutlineBounds> for OutlineBounds {
    fn from(bounds: fontdue::OutlineBounds) -> Self {
        Self {
            xmin: bounds.xmin,
            ymin: bounds.ymin,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

impl From<fontdue::Metrics> for Metrics {
    fn from(metrics: fontdue::Metrics) -> Self {
        Self {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance_width: metrics.advance_width,
            advance_height: metrics.advance_height,
            bounds: OutlineBounds::from(metrics.bounds),
        }
    }
}

impl From<fontdue::LineMetrics> for LineMetrics {
    fn from(metrics: fontdue::LineMetrics) -> Self {
        Self {
            ascent: metrics.ascent,
            descent: metrics.descent,
            line_gap: metrics.line_gap,
            new_line_size: metrics.new_line_size,
        }
    }
}
