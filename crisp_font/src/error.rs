//! Failure kinds for each fallible boundary in the crate. Build-time failures
//! are `Result`s the caller sees synchronously; load-time failures are logged
//! and degrade the affected font only (see `loader`).

use thiserror::Error;

use crate::identity::FontIdentity;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(
        "font metrics cover {found} characters but the canonical character set has {expected}"
    )]
    InvalidCharacterSet { found: usize, expected: usize },

    #[error("character {0:?} at position {1} is out of canonical order")]
    CharacterOutOfOrder(char, usize),

    #[error("minified metrics blob carries a legacy `c` (character-list) field")]
    LegacyFormat,

    #[error("field `{field}` for {ch:?} did not round-trip through minify/expand")]
    RoundtripFailure { ch: char, field: &'static str },

    #[error("malformed minified metrics JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("atlas for {0} arrived before its metrics")]
    MissingMetricsForAtlas(FontIdentity),

    #[error("wide atlas for {id} is {actual_w}x{actual_h}, expected at least {expected_w}x{expected_h}")]
    DimensionMismatch {
        id: FontIdentity,
        actual_w: u32,
        actual_h: u32,
        expected_w: u32,
        expected_h: u32,
    },

    #[error("reconstruction produced positioning entries but a zero-sized tight atlas for {0}")]
    ReconstructionMismatch(FontIdentity),
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("host rasterizer returned no glyph for {0:?}")]
    MissingGlyph(char),

    #[error("correction table referenced unknown character {0:?}")]
    UnknownCorrectionCharacter(char),

    #[error("failed to parse font data: {0}")]
    InvalidFontData(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch metrics for {id}: {source}")]
    FetchMetrics {
        id: FontIdentity,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch atlas image for {id}: {source}")]
    FetchAtlas {
        id: FontIdentity,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics for {0} failed validation: {1}")]
    InvalidMetrics(FontIdentity, #[source] CodecError),

    #[error("failed to decode atlas image for {0}: {1}")]
    DecodeImage(FontIdentity, String),

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),
}

#[derive(Debug, Error)]
pub enum ImageCodecError {
    #[error("unrecognized image container (not PNG or QOI)")]
    UnknownFormat,

    #[error("PNG decode failed: {0}")]
    Png(String),

    #[error("QOI stream is truncated or malformed")]
    QoiMalformed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read corrections file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse corrections TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
