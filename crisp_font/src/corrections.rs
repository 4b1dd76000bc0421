//! Structured replacement for the free-form corrections DSL: a `serde`
//! config loaded from TOML, keyed by `(family, style, weight)`, holding the
//! same kind of per-character adjustment records the DSL used to produce.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::{Style, Weight};
use crate::text_engine::KerningBracket;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    PixelAdjustment,
    ProportionalAdjustment,
    AdvancementOverride,
    KerningDiscretisationBracket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub size_range: (f64, f64),
    pub kind: CorrectionKind,
    /// Per-character adjustments. Unused (left empty) for
    /// `KerningDiscretisationBracket`, which carries `kerning_bracket`
    /// instead since it isn't keyed by character.
    #[serde(default)]
    pub values: HashMap<char, f64>,
    /// Only meaningful for `CorrectionKind::KerningDiscretisationBracket`.
    #[serde(default)]
    pub kerning_bracket: Option<KerningBracket>,
}

impl Correction {
    pub fn applies_to_size(&self, size: f64) -> bool {
        size >= self.size_range.0 && size <= self.size_range.1
    }
}

/// A `(family, style, weight)` key as it appears in the TOML table. Styles
/// and weights round-trip through their `FromStr`/`Display` forms so the
/// file stays human-editable (`style = "italic"`, `weight = "bold"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrectionsKey {
    pub family: String,
    pub style: String,
    pub weight: String,
}

impl CorrectionsKey {
    pub fn matches(&self, family: &str, style: Style, weight: Weight) -> bool {
        if self.family != family {
            return false;
        }
        let style_str = match style {
            Style::Normal => "normal",
            Style::Italic => "italic",
            Style::Oblique => "oblique",
        };
        if self.style != style_str {
            return false;
        }
        let weight_str = match weight {
            Weight::Normal => "normal".to_string(),
            Weight::Bold => "bold".to_string(),
            Weight::Numeric(n) => n.to_string(),
        };
        self.weight == weight_str
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionsSpec {
    #[serde(default)]
    entries: Vec<CorrectionsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorrectionsEntry {
    #[serde(flatten)]
    key: CorrectionsKey,
    corrections: Vec<Correction>,
}

impl CorrectionsSpec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let spec: CorrectionsSpec = toml::from_str(&text)?;
        Ok(spec)
    }

    /// Corrections applicable to `(family, style, weight)`, across all size
    /// ranges — callers filter by size with `Correction::applies_to_size`.
    pub fn corrections_for(&self, family: &str, style: Style, weight: Weight) -> Vec<&Correction> {
        self.entries
            .iter()
            .filter(|entry| entry.key.matches(family, style, weight))
            .flat_map(|entry| entry.corrections.iter())
            .collect()
    }

    /// Projects the `KerningDiscretisationBracket` corrections applicable to
    /// `(family, style, weight)` at `size` into the brackets
    /// `TextProperties::kerning_discretization` expects.
    pub fn kerning_discretization_for(&self, family: &str, style: Style, weight: Weight, size: f64) -> Vec<KerningBracket> {
        self.corrections_for(family, style, weight)
            .into_iter()
            .filter(|c| c.kind == CorrectionKind::KerningDiscretisationBracket && c.applies_to_size(size))
            .filter_map(|c| c.kerning_bracket)
            .collect()
    }
}
