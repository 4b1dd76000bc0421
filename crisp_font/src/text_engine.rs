//! String measurement and drawing over a font's metrics and (optionally)
//! reconstructed atlas. Drawing never assumes a specific GPU or canvas API —
//! callers implement `DrawTarget`, mirroring the teacher's separation of
//! draw-list commands from the backend that rasterises them.

use serde::{Deserialize, Serialize};

use crate::atlas::AtlasData;
use crate::convert::round_px;
use crate::metrics::FontMetrics;

/// One bracket of a discretised kerning table: kerning values in
/// `min..=max` are replaced by `adjustment` at small sizes, to avoid
/// sub-pixel drift from proportional kerning. Mirrors the shape a
/// `corrections::Correction` of kind `KerningDiscretisationBracket` carries,
/// so `CorrectionsSpec::kerning_discretization_for` can hand these straight
/// to `TextProperties` without a translation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KerningBracket {
    pub min: f64,
    pub max: f64,
    pub adjustment: f64,
}

/// Parameters governing measurement and drawing for one draw call. Distinct
/// from `FontMetrics` because these vary per call site (font size cutoffs,
/// corrections), not per font family.
#[derive(Debug, Clone, Default)]
pub struct TextProperties {
    /// Below this CSS pixel size, kerning is not applied at all.
    pub kerning_size_cutoff: f64,
    /// When set, kerning adjustments fall back to the bracket containing
    /// the raw value instead of a proportional `width * kerning` term.
    pub kerning_discretization: Option<Vec<KerningBracket>>,
    /// When set, non-space glyphs with atlas positioning advance by
    /// `(tight_width + 1) + override` instead of `character_metrics.width`.
    pub small_size_advancement_override: Option<f64>,
}

/// Aggregate measurement of a string against one font.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
}

/// Per-draw-call status. Missing data never raises an error — the engine
/// degrades to placeholders and reports which degradation occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    Ok,
    NoMetrics,
    NoAtlas,
    PartialMetrics,
    PartialAtlas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawResult {
    pub rendered: bool,
    pub status: DrawStatus,
    pub placeholders_used: bool,
    pub advanced: f64,
}

/// Caller-supplied rasterisation backend. The engine only ever calls these
/// two methods; it never touches a GPU handle or canvas context directly.
pub trait DrawTarget {
    fn blit_atlas_region(
        &mut self,
        atlas: &AtlasData,
        src_x: u32,
        src_y: u32,
        width: u32,
        height: u32,
        dst_x: f64,
        dst_y: f64,
    );

    fn fill_placeholder(&mut self, dst_x: f64, dst_y: f64, width: f64, height: f64);
}

fn kerning_for(metrics: &FontMetrics, left: char, right: char, props: &TextProperties, font_size: f64) -> f64 {
    if font_size < props.kerning_size_cutoff {
        return 0.0;
    }
    metrics.kerning(left, right).unwrap_or(0.0)
}

fn base_advance(metrics: &FontMetrics, c: char, atlas: Option<&AtlasData>, props: &TextProperties) -> f64 {
    let char_metrics = metrics.character_metrics(c);

    if c == ' ' {
        if let Some(space_override) = metrics.space_advancement_override_for_small_sizes_in_px() {
            return space_override;
        }
    } else if let Some(small_override) = props.small_size_advancement_override {
        if let Some(atlas) = atlas {
            if let Some(position) = atlas.positioning.get(c) {
                return (position.tight_width as f64 + 1.0) + small_override;
            }
        }
    }

    char_metrics.map(|m| m.width).unwrap_or(0.0)
}

/// Pixel advance after the `i`-th glyph of `text`, including kerning against
/// the following glyph. `font_size` is the CSS pixel size used for the
/// kerning cutoff and discretisation decisions.
pub fn calculate_advancement(
    chars: &[char],
    i: usize,
    metrics: &FontMetrics,
    atlas: Option<&AtlasData>,
    props: &TextProperties,
    font_size: f64,
) -> f64 {
    let c = chars[i];
    let mut x = base_advance(metrics, c, atlas, props);

    if let Some(&next) = chars.get(i + 1) {
        let kerning = kerning_for(metrics, c, next, props, font_size);
        if kerning != 0.0 {
            match &props.kerning_discretization {
                Some(brackets) => {
                    if let Some(bracket) = brackets.iter().find(|b| kerning >= b.min && kerning <= b.max) {
                        x -= bracket.adjustment;
                    }
                }
                None => x -= x * kerning,
            }
        }
    }

    round_px(x)
}

/// Measures `text` against `metrics`, returning zero metrics for an empty
/// string.
pub fn measure_text(text: &str, metrics: &FontMetrics, atlas: Option<&AtlasData>, props: &TextProperties, font_size: f64) -> TextMetrics {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return TextMetrics::default();
    }

    let baselines = metrics.baselines();
    let height = round_px(baselines.font_bounding_box_ascent + baselines.font_bounding_box_descent);

    let advances: Vec<f64> = (0..chars.len())
        .map(|i| calculate_advancement(&chars, i, metrics, atlas, props, font_size))
        .collect();
    let width: f64 = advances.iter().sum();

    let first_abl = metrics
        .character_metrics(chars[0])
        .map(|m| m.actual_bounding_box_left)
        .unwrap_or(0.0);
    let last_abr = metrics
        .character_metrics(*chars.last().expect("checked non-empty above"))
        .map(|m| m.actual_bounding_box_right)
        .unwrap_or(0.0);
    let leading_width: f64 = advances[..advances.len() - 1].iter().sum();

    TextMetrics {
        width,
        height,
        actual_bounding_box_left: first_abl,
        actual_bounding_box_right: leading_width + last_abr,
    }
}

/// Draws `text` at `(x, y)` using `metrics` and, when available, `atlas`.
/// Characters with no atlas positioning are drawn as placeholders sized by
/// their cell dimensions; characters with no metrics at all contribute zero
/// advance and no placeholder (there is nothing to size it by).
pub fn draw_text_from_atlas(
    ctx: &mut dyn DrawTarget,
    text: &str,
    x: f64,
    y: f64,
    metrics: Option<&FontMetrics>,
    atlas: Option<&AtlasData>,
    props: &TextProperties,
    font_size: f64,
) -> DrawResult {
    let Some(metrics) = metrics else {
        return DrawResult {
            rendered: false,
            status: DrawStatus::NoMetrics,
            placeholders_used: false,
            advanced: 0.0,
        };
    };

    let chars: Vec<char> = text.chars().collect();
    let mut cursor_x = x;
    let mut placeholders_used = false;
    let mut saw_missing_position = false;

    for i in 0..chars.len() {
        let c = chars[i];
        let advance = calculate_advancement(&chars, i, metrics, atlas, props, font_size);

        match atlas.and_then(|a| a.positioning.get(c)) {
            Some(position) => {
                ctx.blit_atlas_region(
                    atlas.expect("position came from atlas"),
                    position.x_in_atlas,
                    position.y_in_atlas,
                    position.tight_width,
                    position.tight_height,
                    round_px(cursor_x + position.dx),
                    round_px(y + position.dy),
                );
            }
            None => {
                saw_missing_position = true;
                if let Some(char_metrics) = metrics.character_metrics(c) {
                    let cell_w = char_metrics.actual_bounding_box_left + char_metrics.actual_bounding_box_right;
                    let baselines = metrics.baselines();
                    let cell_h = baselines.font_bounding_box_ascent + baselines.font_bounding_box_descent;
                    ctx.fill_placeholder(round_px(cursor_x), round_px(y), round_px(cell_w), round_px(cell_h));
                    placeholders_used = true;
                }
            }
        }

        cursor_x += advance;
    }

    let status = if atlas.is_none() {
        DrawStatus::NoAtlas
    } else if saw_missing_position {
        DrawStatus::PartialAtlas
    } else {
        DrawStatus::Ok
    };

    DrawResult {
        rendered: true,
        status,
        placeholders_used,
        advanced: cursor_x - x,
    }
}

/// Stateless facade grouping the free functions above, mirroring how callers
/// in the source referred to "the text engine" as a single collaborator.
pub struct TextEngine;

impl TextEngine {
    pub fn measure_text(text: &str, metrics: &FontMetrics, atlas: Option<&AtlasData>, props: &TextProperties, font_size: f64) -> TextMetrics {
        measure_text(text, metrics, atlas, props, font_size)
    }

    pub fn draw_text_from_atlas(
        ctx: &mut dyn DrawTarget,
        text: &str,
        x: f64,
        y: f64,
        metrics: Option<&FontMetrics>,
        atlas: Option<&AtlasData>,
        props: &TextProperties,
        font_size: f64,
    ) -> DrawResult {
        draw_text_from_atlas(ctx, text, x, y, metrics, atlas, props, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasImage, AtlasPositioning, GlyphPosition};
    use crate::metrics::{CharacterMetrics, FontBaselines, FontMetricsBuilder};

    struct RecordingTarget {
        blits: Vec<(u32, u32, u32, u32, f64, f64)>,
        placeholders: Vec<(f64, f64, f64, f64)>,
    }

    impl RecordingTarget {
        fn new() -> Self {
            Self {
                blits: Vec::new(),
                placeholders: Vec::new(),
            }
        }
    }

    impl DrawTarget for RecordingTarget {
        fn blit_atlas_region(
            &mut self,
            _atlas: &AtlasData,
            src_x: u32,
            src_y: u32,
            width: u32,
            height: u32,
            dst_x: f64,
            dst_y: f64,
        ) {
            self.blits.push((src_x, src_y, width, height, dst_x, dst_y));
        }

        fn fill_placeholder(&mut self, dst_x: f64, dst_y: f64, width: f64, height: f64) {
            self.placeholders.push((dst_x, dst_y, width, height));
        }
    }

    fn sample_metrics() -> FontMetrics {
        let mut b = FontMetricsBuilder::new();
        b.set_baselines(FontBaselines {
            font_bounding_box_ascent: 14.0,
            font_bounding_box_descent: 4.0,
            hanging_baseline: 12.0,
            alphabetic_baseline: 0.0,
            ideographic_baseline: -2.0,
        });
        b.set_character_metrics(
            'a',
            CharacterMetrics {
                width: 10.0,
                actual_bounding_box_left: 1.0,
                actual_bounding_box_right: 7.0,
                actual_bounding_box_ascent: 9.0,
                actual_bounding_box_descent: 0.0,
            },
        );
        b.build()
    }

    #[test]
    fn measure_empty_string_is_zero_s2() {
        let metrics = sample_metrics();
        let result = measure_text("", &metrics, None, &TextProperties::default(), 19.0);
        assert_eq!(result, TextMetrics::default());
    }

    #[test]
    fn measure_single_glyph_s3() {
        let metrics = sample_metrics();
        let result = measure_text("a", &metrics, None, &TextProperties::default(), 19.0);

        assert_eq!(result.width, 10.0);
        assert_eq!(result.actual_bounding_box_left, 1.0);
        assert_eq!(result.actual_bounding_box_right, 7.0);
        assert_eq!(result.height, 18.0);
    }

    #[test]
    fn advance_override_uses_tight_width_plus_one_s4() {
        let metrics = sample_metrics();
        let mut positioning = AtlasPositioning::new();
        positioning.insert(
            'a',
            GlyphPosition {
                tight_width: 8,
                tight_height: 9,
                x_in_atlas: 0,
                y_in_atlas: 0,
                dx: 0.0,
                dy: 0.0,
            },
        );
        let atlas = AtlasData::new(AtlasImage::new(8, 9, vec![0u8; 8 * 9 * 4]), positioning);

        let props = TextProperties {
            small_size_advancement_override: Some(2.0),
            ..Default::default()
        };

        let chars: Vec<char> = "a".chars().collect();
        let advance = calculate_advancement(&chars, 0, &metrics, Some(&atlas), &props, 10.0);
        assert_eq!(advance, (8.0 + 1.0) + 2.0);
    }

    #[test]
    fn draw_with_metrics_but_no_atlas_reports_no_atlas_s5() {
        let metrics = sample_metrics();
        let mut ctx = RecordingTarget::new();
        let props = TextProperties::default();

        let result = draw_text_from_atlas(&mut ctx, "a", 0.0, 0.0, Some(&metrics), None, &props, 19.0);

        assert!(result.rendered);
        assert_eq!(result.status, DrawStatus::NoAtlas);
        assert!(result.placeholders_used);

        let measured = measure_text("a", &metrics, None, &props, 19.0);
        assert_eq!(result.advanced, measured.width);
    }

    #[test]
    fn draw_with_full_atlas_blits_and_reports_ok() {
        let metrics = sample_metrics();
        let mut positioning = AtlasPositioning::new();
        positioning.insert(
            'a',
            GlyphPosition {
                tight_width: 8,
                tight_height: 9,
                x_in_atlas: 0,
                y_in_atlas: 0,
                dx: -1.0,
                dy: -2.0,
            },
        );
        let atlas = AtlasData::new(AtlasImage::new(8, 9, vec![0u8; 8 * 9 * 4]), positioning);

        let mut ctx = RecordingTarget::new();
        let result = draw_text_from_atlas(&mut ctx, "a", 5.0, 5.0, Some(&metrics), Some(&atlas), &TextProperties::default(), 19.0);

        assert_eq!(result.status, DrawStatus::Ok);
        assert!(!result.placeholders_used);
        assert_eq!(ctx.blits.len(), 1);
        assert_eq!(ctx.blits[0], (0, 0, 8, 9, 4.0, 3.0));
    }

    #[test]
    fn kerning_below_size_cutoff_is_ignored() {
        let mut b = FontMetricsBuilder::new();
        b.set_baselines(FontBaselines {
            font_bounding_box_ascent: 14.0,
            font_bounding_box_descent: 4.0,
            hanging_baseline: 12.0,
            alphabetic_baseline: 0.0,
            ideographic_baseline: -2.0,
        });
        b.set_character_metrics(
            'A',
            CharacterMetrics {
                width: 10.0,
                actual_bounding_box_left: 0.0,
                actual_bounding_box_right: 10.0,
                actual_bounding_box_ascent: 9.0,
                actual_bounding_box_descent: 0.0,
            },
        );
        b.set_kerning('A', crate::metrics::KerningKey::Char('V'), -0.5);
        let metrics = b.build();

        let props = TextProperties {
            kerning_size_cutoff: 12.0,
            ..Default::default()
        };
        let chars: Vec<char> = "AV".chars().collect();
        let advance = calculate_advancement(&chars, 0, &metrics, None, &props, 10.0);
        assert_eq!(advance, 10.0);
    }
}
