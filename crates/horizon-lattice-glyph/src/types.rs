//! Load options and query result types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings applied once when a font is loaded.
///
/// # Example
///
/// ```
/// use horizon_lattice_glyph::LoadOptions;
///
/// let options = LoadOptions::new()
///     .collection_index(1)
///     .scale(24.0);
///
/// assert!(options.enable_offset_bounding_box);
/// assert_eq!(options.collection_index, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct LoadOptions {
    /// Offset glyphs relative to their position in their scaled bounding box.
    ///
    /// Required for laying glyphs out correctly. [`FontdueEngine`] always
    /// offsets; it records `false` but renders as if `true`.
    ///
    /// [`FontdueEngine`]: crate::FontdueEngine
    pub enable_offset_bounding_box: bool,
    /// The face to use when the data is a font collection.
    pub collection_index: u32,
    /// The pixel size the font geometry is optimized for.
    ///
    /// Rendering below this size costs the same; rendering above it costs
    /// slightly more.
    pub scale: f32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            enable_offset_bounding_box: true,
            collection_index: 0,
            scale: 40.0,
        }
    }
}

impl LoadOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether glyphs are offset within their scaled bounding box.
    pub fn enable_offset_bounding_box(mut self, enable: bool) -> Self {
        self.enable_offset_bounding_box = enable;
        self
    }

    /// Select a face within a font collection.
    pub fn collection_index(mut self, index: u32) -> Self {
        self.collection_index = index;
        self
    }

    /// Set the pixel size the font geometry is optimized for.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// An engine-internal identifier for one glyph in a font.
///
/// Index 0 is always the font's "missing glyph" fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GlyphIndex(pub u16);

impl GlyphIndex {
    /// The fallback glyph drawn for characters the font does not contain.
    pub const MISSING: Self = Self(0);

    /// Create a new glyph index.
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Whether this is the fallback glyph.
    pub const fn is_missing(self) -> bool {
        self.0 == 0
    }
}

impl From<u16> for GlyphIndex {
    fn from(index: u16) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for GlyphIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The bounds of a glyph's outline in subpixels.
///
/// An outline is always contained in its glyph's bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OutlineBounds {
    /// Subpixel offset of the left-most edge of the outline.
    pub xmin: f32,
    /// Subpixel offset of the bottom-most edge of the outline.
    pub ymin: f32,
    /// Width of the outline in subpixels.
    pub width: f32,
    /// Height of the outline in subpixels.
    pub height: f32,
}

/// Layout information for one glyph at a fixed pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Metrics {
    /// Whole pixel offset of the left-most edge of the bitmap. Negative when
    /// the glyph extends left of the origin.
    pub xmin: i32,
    /// Whole pixel offset of the bottom-most edge of the bitmap. Negative when
    /// the glyph extends below the baseline.
    pub ymin: i32,
    /// Width of the bitmap in whole pixels.
    pub width: usize,
    /// Height of the bitmap in whole pixels.
    pub height: usize,
    /// Advance width in subpixels, for horizontal layout.
    pub advance_width: f32,
    /// Advance height in subpixels, for vertical layout.
    pub advance_height: f32,
    /// The outline's bounding box at the offsets specified by the font.
    pub bounds: OutlineBounds,
}

impl Metrics {
    /// Check if the glyph has no visible pixels (e.g. a space).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of coverage values in this glyph's bitmap.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Metrics used to position consecutive lines of text.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LineMetrics {
    /// The highest point any glyph reaches above the baseline. Typically positive.
    pub ascent: f32,
    /// The lowest point any glyph reaches below the baseline. Typically negative.
    pub descent: f32,
    /// Designer-recommended gap between one line's descent and the next line's ascent.
    pub line_gap: f32,
    /// Height (horizontal layout) or width (vertical layout) of one line:
    /// `ascent - descent + line_gap`.
    pub new_line_size: f32,
}

impl LineMetrics {
    /// Create line metrics, deriving `new_line_size`.
    pub fn new(ascent: f32, descent: f32, line_gap: f32) -> Self {
        Self {
            ascent,
            descent,
            line_gap,
            new_line_size: ascent - descent + line_gap,
        }
    }
}

/// Metrics and coverage bitmap of a rasterized glyph.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterizeResult {
    /// Sizing and positioning of the glyph.
    pub metrics: Metrics,
    /// Coverage values, row-major from the top-left corner.
    ///
    /// 0 is no coverage and 255 is full coverage.
    pub bitmap: Vec<u8>,
}

impl RasterizeResult {
    /// Coverage at a bitmap coordinate, or `None` outside the bitmap.
    pub fn coverage_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.metrics.width || y >= self.metrics.height {
            return None;
        }
        self.bitmap.get(y * self.metrics.width + x).copied()
    }

    /// Check if any pixel has non-zero coverage.
    pub fn has_coverage(&self) -> bool {
        self.bitmap.iter().any(|&c| c > 0)
    }
}
