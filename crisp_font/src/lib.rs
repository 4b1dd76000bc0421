#![allow(clippy::too_many_arguments)]

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

#[macro_use]
mod macros;

mod atlas;
mod builder;
mod charset;
mod codec;
mod convert;
mod corrections;
mod error;
mod geometry;
mod identity;
mod image_codec;
mod loader;
mod metrics;
mod reconstruct;
mod store;
mod text_engine;

pub use crate::atlas::{AtlasData, AtlasImage, AtlasPositioning, GlyphPosition, ImageSource};
pub use crate::builder::{BuildOutput, Builder, FontdueRasterizer, GlyphBitmap, HostRasterizer};
pub use crate::charset::{character_set, is_canonical_order, CHARACTER_COUNT};
pub use crate::codec::{expand, minify, minify_with_verification, MinifiedMetrics};
pub use crate::corrections::{Correction, CorrectionKind, CorrectionsSpec};
pub use crate::error::{
    BuilderError, CodecError, ConfigError, ImageCodecError, LoadError, ReconstructError,
};
pub use crate::geometry::PixelRect;
pub use crate::identity::{FontIdentity, ParseIdentityError, Style, Weight};
pub use crate::image_codec::{decode_image, encode_png, encode_qoi, ImageFormat};
pub use crate::loader::{
    install_atlas, load_font, load_fonts, read_manifest, FilesystemSource, FontAssetSource, LoadProgress,
};
pub use crate::metrics::{CharacterMetrics, FontBaselines, FontMetrics, FontMetricsBuilder, KerningKey};
pub use crate::reconstruct::AtlasReconstructor;
pub use crate::store::{AtlasDataStore, FontMetricsStore};
pub use crate::text_engine::{DrawStatus, DrawTarget, TextEngine, TextProperties};
