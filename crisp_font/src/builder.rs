//! Drives a host rasteriser over the canonical character set, crops each
//! glyph to its ink bounds, applies per-family corrections, and packs a wide
//! atlas ready for `reconstruct::AtlasReconstructor`. Grounded in the
//! teacher's `FontAtlas::new_in`: rasterize scaled for the target pixel
//! density, but read unscaled metrics for layout, exactly as `guise` keeps
//! line metrics in logical pixels while rasterising at a scaled size.

use std::collections::HashMap;

use crate::atlas::AtlasImage;
use crate::charset::character_set;
use crate::convert::{cast_u32, round_px};
use crate::corrections::{CorrectionKind, CorrectionsSpec};
use crate::error::BuilderError;
use crate::geometry::PixelRect;
use crate::identity::{FontIdentity, Style, Weight};
use crate::metrics::{CharacterMetrics, FontBaselines, FontMetrics, FontMetricsBuilder};
use crate::reconstruct::scan_cell_bounds;
use crate::text_engine::KerningBracket;

/// One rasterised glyph: its measured metrics, the baseline-aligned cell
/// canvas it was captured into, and the tight ink bounds the same 4-phase
/// scan `reconstruct` uses finds inside that cell. A cell with no opaque
/// pixel (e.g. space) carries a zero-sized `tight_canvas_box`.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub character: char,
    pub metrics: CharacterMetrics,
    pub cell: AtlasImage,
    pub tight_canvas_box: PixelRect,
}

/// Host text-rasterisation backend. `FontdueRasterizer` is the concrete
/// implementation; alternative backends (a system font API, a different
/// rasteriser crate) only need to implement this trait.
pub trait HostRasterizer {
    fn baselines(&self, size_css_px: f64) -> FontBaselines;

    fn character_metrics(&self, c: char, size_css_px: f64) -> Option<CharacterMetrics>;

    /// Rasterises `c` into a `cell_w x cell_h` physical-pixel canvas with the
    /// glyph drawn at its natural baseline position.
    fn rasterize_cell(&self, c: char, size_css_px: f64, pixel_density: f64, cell_w: u32, cell_h: u32) -> Option<AtlasImage>;
}

/// Wraps a `fontdue::Font`. Rasterises at `size_css_px * pixel_density` (the
/// scaled size) but reads `size_css_px`-only metrics for layout, so glyph
/// advances and ink extents stay in CSS pixel units regardless of density.
pub struct FontdueRasterizer {
    font: fontdue::Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(font_bytes: &[u8]) -> Result<Self, BuilderError> {
        let settings = fontdue::FontSettings {
            collection_index: 0,
            scale: 40.0,
            ..Default::default()
        };
        let font = fontdue::Font::from_bytes(font_bytes, settings)
            .map_err(|e| BuilderError::InvalidFontData(e.to_string()))?;
        Ok(Self { font })
    }
}

impl HostRasterizer for FontdueRasterizer {
    fn baselines(&self, size_css_px: f64) -> FontBaselines {
        let line_metrics = self
            .font
            .horizontal_line_metrics(size_css_px as f32)
            .unwrap_or_default();
        FontBaselines {
            font_bounding_box_ascent: line_metrics.ascent as f64,
            font_bounding_box_descent: -line_metrics.descent as f64,
            hanging_baseline: line_metrics.ascent as f64,
            alphabetic_baseline: 0.0,
            ideographic_baseline: line_metrics.descent as f64,
        }
    }

    fn character_metrics(&self, c: char, size_css_px: f64) -> Option<CharacterMetrics> {
        let (metrics, _) = self.font.rasterize(c, size_css_px as f32);
        Some(CharacterMetrics {
            width: metrics.advance_width as f64,
            actual_bounding_box_left: (-metrics.xmin) as f64,
            actual_bounding_box_right: (metrics.xmin + metrics.width as i32) as f64,
            actual_bounding_box_ascent: (metrics.ymin + metrics.height as i32) as f64,
            actual_bounding_box_descent: (-metrics.ymin) as f64,
        })
    }

    fn rasterize_cell(&self, c: char, size_css_px: f64, pixel_density: f64, cell_w: u32, cell_h: u32) -> Option<AtlasImage> {
        let size_scaled = (size_css_px * pixel_density) as f32;
        let (metrics, coverage) = self.font.rasterize(c, size_scaled);

        let mut pixels = vec![0u8; cell_w as usize * cell_h as usize * 4];
        if metrics.width == 0 || metrics.height == 0 {
            return Some(AtlasImage::new(cell_w, cell_h, pixels));
        }

        // Baseline-align: the glyph's bottom row lands `−metrics.ymin`
        // physical pixels above the cell's bottom edge, mirroring the cell
        // padding convention `reconstruct` expects to scan.
        let origin_y = cell_h as i64 - (-metrics.ymin as i64) - metrics.height as i64;
        let origin_x = 0i64;

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let dst_x = origin_x + gx as i64;
                let dst_y = origin_y + gy as i64;
                if dst_x < 0 || dst_y < 0 || dst_x >= cell_w as i64 || dst_y >= cell_h as i64 {
                    continue;
                }
                let coverage_value = coverage[gy * metrics.width + gx];
                let idx = (dst_y as usize * cell_w as usize + dst_x as usize) * 4;
                pixels[idx] = 255;
                pixels[idx + 1] = 255;
                pixels[idx + 2] = 255;
                pixels[idx + 3] = coverage_value;
            }
        }

        Some(AtlasImage::new(cell_w, cell_h, pixels))
    }
}

/// Assembled wide atlas plus the metrics captured alongside it, ready for
/// `codec::minify`/`AtlasReconstructor::reconstruct`.
pub struct BuildOutput {
    pub metrics: FontMetrics,
    pub wide_atlas: AtlasImage,
    /// Kerning brackets derived from this font's applicable
    /// `KerningDiscretisationBracket` corrections, ready to hand to
    /// `TextProperties::kerning_discretization`.
    pub kerning_discretization: Vec<KerningBracket>,
}

pub struct Builder;

impl Builder {
    /// Captures every glyph of `id`'s character set from `rasterizer`,
    /// applies `corrections`, and packs the grid-layout wide atlas.
    pub fn build(
        id: &FontIdentity,
        rasterizer: &dyn HostRasterizer,
        corrections: Option<&CorrectionsSpec>,
    ) -> Result<BuildOutput, BuilderError> {
        let size = id.size();
        let pixel_density = id.pixel_density();
        let baselines = rasterizer.baselines(size);
        let cell_height_css = round_px(baselines.font_bounding_box_ascent + baselines.font_bounding_box_descent).max(0.0);
        let cell_height = (cell_height_css * pixel_density).round() as u32;

        let applicable_corrections: Vec<_> = corrections
            .map(|spec| spec.corrections_for(id.family(), id.style(), id.weight()))
            .unwrap_or_default()
            .into_iter()
            .filter(|c| c.applies_to_size(size))
            .collect();

        let kerning_discretization: Vec<KerningBracket> = applicable_corrections
            .iter()
            .filter(|c| c.kind == CorrectionKind::KerningDiscretisationBracket)
            .filter_map(|c| c.kerning_bracket)
            .collect();

        let mut metrics_builder = FontMetricsBuilder::new();
        metrics_builder.set_baselines(baselines);

        let mut bitmaps: HashMap<char, GlyphBitmap> = HashMap::new();

        for &c in character_set() {
            let mut char_metrics = rasterizer
                .character_metrics(c, size)
                .ok_or(BuilderError::MissingGlyph(c))?;

            for correction in &applicable_corrections {
                if correction.kind == CorrectionKind::KerningDiscretisationBracket {
                    continue;
                }
                let Some(&adjustment) = correction.values.get(&c) else {
                    continue;
                };
                match correction.kind {
                    CorrectionKind::PixelAdjustment => char_metrics.width += adjustment,
                    CorrectionKind::ProportionalAdjustment => char_metrics.width *= 1.0 + adjustment,
                    CorrectionKind::AdvancementOverride => char_metrics.width = adjustment,
                    CorrectionKind::KerningDiscretisationBracket => unreachable!("filtered out above"),
                }
            }

            let cell_width_css = round_px(char_metrics.actual_bounding_box_left + char_metrics.actual_bounding_box_right).max(0.0);
            let cell_width = (cell_width_css * pixel_density).round() as u32;

            let cell = rasterizer
                .rasterize_cell(c, size, pixel_density, cell_width.max(1), cell_height.max(1))
                .ok_or(BuilderError::MissingGlyph(c))?;

            let tight_canvas_box =
                scan_cell_bounds(&cell, PixelRect::new(0, 0, cell.width, cell.height)).unwrap_or_default();

            metrics_builder.set_character_metrics(c, char_metrics);
            bitmaps.insert(
                c,
                GlyphBitmap {
                    character: c,
                    metrics: char_metrics,
                    cell,
                    tight_canvas_box,
                },
            );
        }

        let metrics = metrics_builder.build();
        let wide_atlas = pack_wide_atlas(&metrics, &bitmaps, pixel_density);

        Ok(BuildOutput {
            metrics,
            wide_atlas,
            kerning_discretization,
        })
    }
}

fn pack_wide_atlas(metrics: &FontMetrics, bitmaps: &HashMap<char, GlyphBitmap>, pixel_density: f64) -> AtlasImage {
    let chars: Vec<char> = character_set().to_vec();
    let n = chars.len();
    let columns = (n as f64).sqrt().ceil().max(1.0) as usize;
    let cell_height = metrics.cell_height_phys_px(pixel_density);

    let mut column_widths = vec![0u32; columns];
    for (i, &c) in chars.iter().enumerate() {
        let col = i % columns;
        let w = metrics.cell_width_phys_px(c, pixel_density).unwrap_or(0);
        column_widths[col] = column_widths[col].max(w);
    }

    let total_width: u32 = column_widths.iter().sum();
    let rows = n.div_ceil(columns);
    let total_height = cast_u32(rows) * cell_height;

    let mut pixels = vec![0u8; total_width as usize * total_height as usize * 4];
    let mut column_x = vec![0u32; columns];
    let mut running = 0u32;
    for col in 0..columns {
        column_x[col] = running;
        running += column_widths[col];
    }

    for (i, &c) in chars.iter().enumerate() {
        let Some(bitmap) = bitmaps.get(&c) else { continue };
        let col = i % columns;
        let row = i / columns;
        let cell_x = column_x[col];
        let cell_y = cast_u32(row) * cell_height;

        for y in 0..bitmap.cell.height.min(cell_height) {
            for x in 0..bitmap.cell.width.min(column_widths[col]) {
                let rgba = bitmap.cell.rgba_at(x, y);
                let dst_idx = ((cell_y + y) as usize * total_width as usize + (cell_x + x) as usize) * 4;
                pixels[dst_idx..dst_idx + 4].copy_from_slice(&rgba);
            }
        }
    }

    AtlasImage::new(total_width, total_height, pixels)
}
