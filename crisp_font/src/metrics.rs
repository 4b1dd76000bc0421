//! Per-glyph measurements and per-font baselines. `FontMetrics` is immutable
//! once built — the source's "FAB" builder / frozen-product split collapses
//! here into a single `FontMetrics` type plus a `FontMetricsBuilder` that
//! populates and freezes it.

use std::collections::HashMap;

/// Per-glyph measurement, in CSS pixel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub actual_bounding_box_ascent: f64,
    pub actual_bounding_box_descent: f64,
}

/// Baselines shared by every glyph in a font, measured once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontBaselines {
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
    pub hanging_baseline: f64,
    pub alphabetic_baseline: f64,
    pub ideographic_baseline: f64,
}

/// Key into a kerning rule row: either an exact right-hand character, or the
/// `*any*` wildcard that matches whatever character follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KerningKey {
    Char(char),
    Any,
}

/// Per-font record: per-glyph metrics, kerning table, shared baselines, and
/// an optional small-size space-advancement override. Immutable once built —
/// construct via `FontMetricsBuilder`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    character_metrics: HashMap<char, CharacterMetrics>,
    kerning_table: HashMap<char, HashMap<KerningKey, f64>>,
    baselines: FontBaselines,
    space_advancement_override_for_small_sizes_in_px: Option<f64>,
}

impl FontMetrics {
    pub fn character_metrics(&self, c: char) -> Option<&CharacterMetrics> {
        self.character_metrics.get(&c)
    }

    pub fn character_metrics_map(&self) -> &HashMap<char, CharacterMetrics> {
        &self.character_metrics
    }

    pub fn kerning(&self, left: char, right: char) -> Option<f64> {
        let row = self.kerning_table.get(&left)?;
        row.get(&KerningKey::Char(right))
            .or_else(|| row.get(&KerningKey::Any))
            .copied()
    }

    pub fn kerning_table(&self) -> &HashMap<char, HashMap<KerningKey, f64>> {
        &self.kerning_table
    }

    pub fn baselines(&self) -> FontBaselines {
        self.baselines
    }

    pub fn space_advancement_override_for_small_sizes_in_px(&self) -> Option<f64> {
        self.space_advancement_override_for_small_sizes_in_px
    }

    pub fn cell_height_phys_px(&self, pixel_density: f64) -> u32 {
        let b = self.baselines;
        round_half_away_from_zero(b.font_bounding_box_ascent + b.font_bounding_box_descent)
            .max(0.0)
            .mul_add(pixel_density, 0.0)
            .round() as u32
    }

    pub fn cell_width_phys_px(&self, c: char, pixel_density: f64) -> Option<u32> {
        let m = self.character_metrics(c)?;
        let css = round_half_away_from_zero(m.actual_bounding_box_left + m.actual_bounding_box_right);
        Some((css * pixel_density).round() as u32)
    }
}

fn round_half_away_from_zero(v: f64) -> f64 {
    v.round()
}

#[derive(Debug, Clone, Default)]
pub struct FontMetricsBuilder {
    character_metrics: HashMap<char, CharacterMetrics>,
    kerning_table: HashMap<char, HashMap<KerningKey, f64>>,
    baselines: Option<FontBaselines>,
    space_override: Option<f64>,
}

impl FontMetricsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_character_metrics(&mut self, c: char, metrics: CharacterMetrics) -> &mut Self {
        self.character_metrics.insert(c, metrics);
        self
    }

    pub fn set_kerning(&mut self, left: char, right: KerningKey, adjustment: f64) -> &mut Self {
        self.kerning_table.entry(left).or_default().insert(right, adjustment);
        self
    }

    pub fn set_baselines(&mut self, baselines: FontBaselines) -> &mut Self {
        self.baselines = Some(baselines);
        self
    }

    pub fn set_space_advancement_override_for_small_sizes_in_px(&mut self, v: f64) -> &mut Self {
        self.space_override = Some(v);
        self
    }

    /// Freezes the builder into an immutable `FontMetrics`.
    ///
    /// # Panics
    ///
    /// Panics if no baselines were set — every font must have them before it
    /// can be considered built, the same way the host rasteriser always
    /// reports them alongside the first glyph it measures.
    pub fn build(self) -> FontMetrics {
        FontMetrics {
            character_metrics: self.character_metrics,
            kerning_table: self.kerning_table,
            baselines: self.baselines.expect("FontMetricsBuilder::build called before set_baselines"),
            space_advancement_override_for_small_sizes_in_px: self.space_override,
        }
    }
}
