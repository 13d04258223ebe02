//! A deterministic in-memory engine for unit tests.
//!
//! Fonts are byte strings starting with `FAKE`. Letters `a..=z` map to glyph
//! indices `1..=26`; everything else maps to the missing glyph. Results are
//! simple functions of `(index, px)` so tests can tell queries apart.

use parking_lot::Mutex;
use slotmap::SlotMap;

use super::{FontHandle, RasterEngine};
use crate::error::{GlyphError, GlyphResult};
use crate::types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, OutlineBounds, RasterizeResult};

pub(crate) const GLYPH_COUNT: u16 = 64;
pub(crate) const FONT: &[u8] = b"FAKE font data";

#[derive(Default)]
pub(crate) struct FakeEngine {
    fonts: Mutex<SlotMap<FontHandle, LoadOptions>>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn font_count(&self) -> usize {
        self.fonts.lock().len()
    }

    fn check(&self, handle: FontHandle) -> GlyphResult<()> {
        if self.fonts.lock().contains_key(handle) {
            Ok(())
        } else {
            Err(GlyphError::UnknownHandle)
        }
    }

    fn metrics(index: GlyphIndex, px: f32) -> Metrics {
        let width = index.value() as usize;
        let height = px.ceil() as usize;
        Metrics {
            xmin: 0,
            ymin: -1,
            width,
            height,
            advance_width: index.value() as f32 + px * 0.5,
            advance_height: px,
            bounds: OutlineBounds {
                xmin: 0.25,
                ymin: -0.75,
                width: (width as f32 - 0.5).max(0.0),
                height: (height as f32 - 0.5).max(0.0),
            },
        }
    }
}

impl RasterEngine for FakeEngine {
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> GlyphResult<FontHandle> {
        if !bytes.starts_with(b"FAKE") {
            return Err(GlyphError::InvalidFont("missing FAKE magic".into()));
        }
        if options.collection_index > 0 {
            return Err(GlyphError::CollectionIndexOutOfRange {
                index: options.collection_index,
                count: 1,
            });
        }
        Ok(self.fonts.lock().insert(*options))
    }

    fn unload(&self, handle: FontHandle) -> bool {
        self.fonts.lock().remove(handle).is_some()
    }

    fn glyph_count(&self, handle: FontHandle) -> GlyphResult<u16> {
        self.check(handle)?;
        Ok(GLYPH_COUNT)
    }

    fn lookup_glyph_index(&self, handle: FontHandle, character: char) -> GlyphResult<GlyphIndex> {
        self.check(handle)?;
        let index = match character {
            'a'..='z' => character as u16 - 'a' as u16 + 1,
            _ => 0,
        };
        Ok(GlyphIndex::new(index))
    }

    fn metrics_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<Metrics> {
        self.check(handle)?;
        Ok(Self::metrics(index, px))
    }

    fn rasterize_indexed(
        &self,
        handle: FontHandle,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<RasterizeResult> {
        self.check(handle)?;
        let metrics = Self::metrics(index, px);
        Ok(RasterizeResult {
            metrics,
            bitmap: vec![index.value() as u8; metrics.pixel_count()],
        })
    }

    fn units_per_em(&self, handle: FontHandle) -> GlyphResult<u16> {
        self.check(handle)?;
        Ok(1000)
    }

    fn scale_factor(&self, handle: FontHandle, px: f32) -> GlyphResult<f32> {
        self.check(handle)?;
        Ok(px / 1000.0)
    }

    fn horizontal_line_metrics(
        &self,
        handle: FontHandle,
        px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        self.check(handle)?;
        Ok(Some(LineMetrics::new(px * 0.8, px * -0.2, px * 0.1)))
    }

    fn vertical_line_metrics(
        &self,
        handle: FontHandle,
        _px: f32,
    ) -> GlyphResult<Option<LineMetrics>> {
        self.check(handle)?;
        Ok(None)
    }
}
