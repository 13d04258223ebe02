//! The memoizing font facade.

use std::sync::Arc;

use crate::cache::{FontCacheStats, PixelSize, QueryCache, SlotCache};
use crate::engine::{FontHandle, RasterEngine};
use crate::error::GlyphResult;
use crate::font::Font;
use crate::types::{GlyphIndex, LineMetrics, LoadOptions, Metrics, RasterizeResult};

type GlyphKey = (GlyphIndex, PixelSize);

/// A font that memoizes every query.
///
/// Answers exactly what [`Font`] answers, but reaches the engine at most once
/// per distinct argument tuple per operation for its whole lifetime. Caches
/// are never evicted; they are freed together with the font.
///
/// Queries take `&mut self` because they fill the caches. Share a
/// `FontCached` between threads by wrapping it in a mutex.
///
/// # Example
///
/// ```no_run
/// use horizon_lattice_glyph::{initialize_engine, FontCached, LoadOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// initialize_engine();
///
/// let bytes = std::fs::read("fonts/OpenSans.ttf")?;
/// let mut font = FontCached::new(&bytes, LoadOptions::default())?;
///
/// for _ in 0..1000 {
///     // Rasterized once, then served from the cache.
///     let glyph = font.rasterize('g', 17.0)?;
///     assert!(!glyph.bitmap.is_empty());
/// }
/// assert_eq!(font.cache_stats().rasterize_indexed.misses, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FontCached {
    font: Font,
    glyph_indices: QueryCache<char, GlyphIndex>,
    metrics: QueryCache<GlyphKey, Metrics>,
    rasters: QueryCache<GlyphKey, RasterizeResult>,
    units_per_em: SlotCache<u16>,
    scale_factors: QueryCache<PixelSize, f32>,
    horizontal_line_metrics: QueryCache<PixelSize, Option<LineMetrics>>,
    vertical_line_metrics: QueryCache<PixelSize, Option<LineMetrics>>,
}

impl FontCached {
    /// Load a font through the global engine.
    ///
    /// Fails the same way as [`Font::new`].
    pub fn new(bytes: &[u8], options: LoadOptions) -> GlyphResult<Self> {
        Font::new(bytes, options).map(Self::from_font)
    }

    /// Load a font through a specific engine.
    pub fn with_engine(
        engine: Arc<dyn RasterEngine>,
        bytes: &[u8],
        options: LoadOptions,
    ) -> GlyphResult<Self> {
        Font::with_engine(engine, bytes, options).map(Self::from_font)
    }

    /// Add caching to an already loaded font.
    pub fn from_font(font: Font) -> Self {
        Self {
            font,
            glyph_indices: QueryCache::new("lookup_glyph_index"),
            metrics: QueryCache::new("metrics_indexed"),
            rasters: QueryCache::new("rasterize_indexed"),
            units_per_em: SlotCache::new(),
            scale_factors: QueryCache::new("scale_factor"),
            horizontal_line_metrics: QueryCache::new("horizontal_line_metrics"),
            vertical_line_metrics: QueryCache::new("vertical_line_metrics"),
        }
    }

    /// The uncached font underneath.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// The engine handle of this font.
    pub fn handle(&self) -> FontHandle {
        self.font.handle()
    }

    /// The options the font was loaded with.
    pub fn options(&self) -> &LoadOptions {
        self.font.options()
    }

    /// Number of glyphs in the font.
    pub fn glyph_count(&self) -> u16 {
        self.font.glyph_count()
    }

    /// Hit, miss, and entry counts for every cache.
    pub fn cache_stats(&self) -> FontCacheStats {
        FontCacheStats {
            lookup_glyph_index: self.glyph_indices.stats(),
            metrics_indexed: self.metrics.stats(),
            rasterize_indexed: self.rasters.stats(),
            units_per_em: self.units_per_em.stats(),
            scale_factor: self.scale_factors.stats(),
            horizontal_line_metrics: self.horizontal_line_metrics.stats(),
            vertical_line_metrics: self.vertical_line_metrics.stats(),
        }
    }

    /// Find the glyph index for a character.
    pub fn lookup_glyph_index(&mut self, character: char) -> GlyphResult<GlyphIndex> {
        let font = &self.font;
        self.glyph_indices
            .get_or_try_insert_with(character, || font.lookup_glyph_index(character))
            .copied()
    }

    /// Layout metrics for a character.
    ///
    /// Not cached on its own: composes the cached glyph lookup with the
    /// cached [`metrics_indexed`](Self::metrics_indexed).
    pub fn metrics(&mut self, character: char, px: f32) -> GlyphResult<Metrics> {
        let index = self.lookup_glyph_index(character)?;
        self.metrics_indexed(index, px)
    }

    /// Layout metrics for a glyph index.
    pub fn metrics_indexed(&mut self, index: GlyphIndex, px: f32) -> GlyphResult<Metrics> {
        let font = &self.font;
        self.metrics
            .get_or_try_insert_with((index, PixelSize::from(px)), || {
                font.metrics_indexed(index, px)
            })
            .copied()
    }

    /// Layout metrics and coverage bitmap for a character.
    ///
    /// Composes the cached glyph lookup with the cached
    /// [`rasterize_indexed`](Self::rasterize_indexed).
    pub fn rasterize(&mut self, character: char, px: f32) -> GlyphResult<&RasterizeResult> {
        let index = self.lookup_glyph_index(character)?;
        self.rasterize_indexed(index, px)
    }

    /// Layout metrics and coverage bitmap for a glyph index.
    pub fn rasterize_indexed(
        &mut self,
        index: GlyphIndex,
        px: f32,
    ) -> GlyphResult<&RasterizeResult> {
        let font = &self.font;
        self.rasters
            .get_or_try_insert_with((index, PixelSize::from(px)), || {
                font.rasterize_indexed(index, px)
            })
    }

    /// Line metrics for horizontal layout, or `None` if the font has none.
    pub fn horizontal_line_metrics(&mut self, px: f32) -> GlyphResult<Option<LineMetrics>> {
        let font = &self.font;
        self.horizontal_line_metrics
            .get_or_try_insert_with(PixelSize::from(px), || font.horizontal_line_metrics(px))
            .copied()
    }

    /// Line metrics for vertical layout, or `None` if the font has none.
    pub fn vertical_line_metrics(&mut self, px: f32) -> GlyphResult<Option<LineMetrics>> {
        let font = &self.font;
        self.vertical_line_metrics
            .get_or_try_insert_with(PixelSize::from(px), || font.vertical_line_metrics(px))
            .copied()
    }

    /// The font's units per em.
    pub fn units_per_em(&mut self) -> GlyphResult<u16> {
        let font = &self.font;
        self.units_per_em
            .get_or_try_init(|| font.units_per_em())
            .copied()
    }

    /// Multiplier from font design units to pixels at `px`.
    pub fn scale_factor(&mut self, px: f32) -> GlyphResult<f32> {
        let font = &self.font;
        self.scale_factors
            .get_or_try_insert_with(PixelSize::from(px), || font.scale_factor(px))
            .copied()
    }

    /// Release the font's engine resources and drop all caches.
    pub fn release(self) {
        self.font.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InstrumentedEngine;
    use crate::engine::fake::{self, FakeEngine};
    use crate::error::GlyphError;

    fn instrumented() -> (Arc<InstrumentedEngine>, FontCached) {
        let engine = Arc::new(InstrumentedEngine::new(Arc::new(FakeEngine::new())));
        let font =
            FontCached::with_engine(engine.clone(), fake::FONT, LoadOptions::default()).unwrap();
        (engine, font)
    }

    #[test]
    fn rasterize_indexed_hits_engine_once() {
        let (engine, mut font) = instrumented();
        let index = GlyphIndex::new(7);

        let first = font.rasterize_indexed(index, 17.0).unwrap().clone();
        let second = font.rasterize_indexed(index, 17.0).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(engine.counts().rasterize_indexed, 1);
        assert_eq!(font.cache_stats().rasterize_indexed.hits, 1);
    }

    #[test]
    fn character_queries_reuse_both_caches() {
        let (engine, mut font) = instrumented();

        for _ in 0..1000 {
            font.rasterize('g', 17.0).unwrap();
        }

        let counts = engine.counts();
        assert_eq!(counts.lookup_glyph_index, 1);
        assert_eq!(counts.rasterize_indexed, 1);

        let stats = font.cache_stats();
        assert_eq!(stats.lookup_glyph_index.lookups(), 1000);
        assert_eq!(stats.rasterize_indexed.misses, 1);
    }

    #[test]
    fn character_and_index_forms_share_entries() {
        let (engine, mut font) = instrumented();
        let index = font.lookup_glyph_index('c').unwrap();

        let by_char = font.metrics('c', 9.0).unwrap();
        let by_index = font.metrics_indexed(index, 9.0).unwrap();

        assert_eq!(by_char, by_index);
        assert_eq!(engine.counts().metrics_indexed, 1);
    }

    #[test]
    fn matches_uncached_results() {
        let engine = Arc::new(FakeEngine::new());
        let plain = Font::with_engine(engine.clone(), fake::FONT, LoadOptions::default()).unwrap();
        let mut cached =
            FontCached::with_engine(engine, fake::FONT, LoadOptions::default()).unwrap();

        for c in ['a', 'q', '?'] {
            for px in [3.0, 17.0] {
                assert_eq!(cached.metrics(c, px).unwrap(), plain.metrics(c, px).unwrap());
                assert_eq!(
                    cached.rasterize(c, px).unwrap(),
                    &plain.rasterize(c, px).unwrap()
                );
            }
        }
        assert_eq!(cached.units_per_em().unwrap(), plain.units_per_em().unwrap());
        assert_eq!(
            cached.scale_factor(20.0).unwrap(),
            plain.scale_factor(20.0).unwrap()
        );
        assert_eq!(
            cached.horizontal_line_metrics(20.0).unwrap(),
            plain.horizontal_line_metrics(20.0).unwrap()
        );
    }

    #[test]
    fn concatenation_colliding_tuples_are_cached_separately() {
        let (engine, mut font) = instrumented();

        let a = font.rasterize_indexed(GlyphIndex::new(1), 23.0).unwrap().clone();
        let b = font.rasterize_indexed(GlyphIndex::new(12), 3.0).unwrap().clone();

        assert_ne!(a, b);
        assert_eq!(a.metrics.width, 1);
        assert_eq!(b.metrics.width, 12);
        assert_eq!(engine.counts().rasterize_indexed, 2);
        assert_eq!(font.cache_stats().rasterize_indexed.entries, 2);
    }

    #[test]
    fn single_argument_caches_are_keyed_per_size() {
        let (engine, mut font) = instrumented();

        font.scale_factor(12.0).unwrap();
        font.scale_factor(12.0).unwrap();
        font.scale_factor(24.0).unwrap();
        font.horizontal_line_metrics(12.0).unwrap();
        font.horizontal_line_metrics(12.0).unwrap();
        assert_eq!(font.vertical_line_metrics(12.0).unwrap(), None);
        assert_eq!(font.vertical_line_metrics(12.0).unwrap(), None);

        let counts = engine.counts();
        assert_eq!(counts.scale_factor, 2);
        assert_eq!(counts.horizontal_line_metrics, 1);
        assert_eq!(counts.vertical_line_metrics, 1);
    }

    #[test]
    fn units_per_em_uses_a_single_slot() {
        let (engine, mut font) = instrumented();
        for _ in 0..5 {
            assert_eq!(font.units_per_em().unwrap(), 1000);
        }
        assert_eq!(engine.counts().units_per_em, 1);
        assert_eq!(font.cache_stats().units_per_em.hits, 4);
    }

    #[test]
    fn validation_errors_are_not_cached() {
        let (engine, mut font) = instrumented();

        for _ in 0..2 {
            assert!(matches!(
                font.rasterize_indexed(GlyphIndex::new(1), -1.0),
                Err(GlyphError::InvalidPixelSize(_))
            ));
        }
        assert!(matches!(
            font.metrics_indexed(GlyphIndex::new(u16::MAX), 10.0),
            Err(GlyphError::GlyphIndexOutOfRange { .. })
        ));

        let stats = font.cache_stats();
        assert_eq!(stats.rasterize_indexed.entries, 0);
        assert_eq!(stats.metrics_indexed.entries, 0);
        assert_eq!(engine.counts().rasterize_indexed, 0);
    }

    #[test]
    fn release_unloads_font() {
        let engine = Arc::new(FakeEngine::new());
        let font = FontCached::with_engine(engine.clone(), fake::FONT, LoadOptions::default())
            .unwrap();
        assert_eq!(engine.font_count(), 1);
        font.release();
        assert_eq!(engine.font_count(), 0);
    }
}
