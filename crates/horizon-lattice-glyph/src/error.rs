//! Error types for the glyph crate.

use thiserror::Error;

/// Errors that can occur while loading or querying a font.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlyphError {
    /// The global rasterization engine has not been initialized.
    #[error("rasterization engine not initialized; call initialize_engine() first")]
    NotInitialized,

    /// The font data is invalid or in an unsupported format.
    #[error("invalid font data: {0}")]
    InvalidFont(String),

    /// The requested face does not exist in the font collection.
    #[error("collection index {index} out of range (font contains {count} faces)")]
    CollectionIndexOutOfRange { index: u32, count: u32 },

    /// The load options cannot be applied.
    #[error("invalid load options: {0}")]
    InvalidOptions(String),

    /// The pixel size is not positive or exceeds [`MAX_PIXEL_SIZE`](crate::MAX_PIXEL_SIZE).
    #[error("invalid pixel size: {0} (must be in (0, {max}])", max = crate::MAX_PIXEL_SIZE)]
    InvalidPixelSize(f32),

    /// The glyph's bitmap at the requested size is too large to allocate.
    #[error("glyph bitmap of {width}x{height} pixels is too large")]
    BitmapTooLarge { width: usize, height: usize },

    /// The glyph index is past the end of the font's glyph table.
    #[error("glyph index {index} out of range (font has {glyph_count} glyphs)")]
    GlyphIndexOutOfRange { index: u16, glyph_count: u16 },

    /// The font handle does not refer to a font loaded in the engine.
    #[error("unknown or released font handle")]
    UnknownHandle,
}

impl GlyphError {
    /// Whether this error was raised while loading a font.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFont(_) | Self::CollectionIndexOutOfRange { .. } | Self::InvalidOptions(_)
        )
    }
}

/// Result type for glyph operations.
pub type GlyphResult<T> = Result<T, GlyphError>;
