//! Minify / expand `FontMetrics` to and from the compact on-disk shape
//! (field names `k`/`b`/`g`/`s` are part of the on-disk contract) with strict
//! roundtrip guarantees. Kept as pure functions over value types — the
//! source's `MetricsMinifier`/`MetricsExpander` static "classes" collapse to
//! `minify`/`expand` here, with `minify_with_verification` composing them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::charset::character_set;
use crate::error::CodecError;
use crate::metrics::{CharacterMetrics, FontBaselines, FontMetrics, FontMetricsBuilder, KerningKey};

const WILDCARD_KEY: &str = "*any*";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct MinifiedBaselines {
    fba: f64,
    fbd: f64,
    hb: f64,
    ab: f64,
    ib: f64,
}

/// The minified wire shape. Deserialize is intentionally permissive about
/// field order but strict about which fields exist — a stray legacy `c` key
/// is detected before we ever get this far, by `expand`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinifiedMetrics {
    k: HashMap<String, HashMap<String, f64>>,
    b: MinifiedBaselines,
    /// `(character, [width, abl, abr, aba, abd])` pairs, in canonical
    /// character order.
    g: Vec<(char, [f64; 5])>,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<f64>,
}

/// Minifies `m` into the compact wire shape.
///
/// Requires `m.character_metrics()` to cover exactly the canonical 204
/// character set; any deviation fails with `InvalidCharacterSet`.
pub fn minify(m: &FontMetrics) -> Result<MinifiedMetrics, CodecError> {
    let canonical = character_set();
    let covered = m.character_metrics_map();

    if covered.len() != canonical.len() {
        return Err(CodecError::InvalidCharacterSet {
            found: covered.len(),
            expected: canonical.len(),
        });
    }
    for c in canonical {
        if !covered.contains_key(c) {
            return Err(CodecError::InvalidCharacterSet {
                found: covered.len(),
                expected: canonical.len(),
            });
        }
    }

    let g = canonical
        .iter()
        .map(|&c| {
            let cm = covered[&c];
            (
                c,
                [
                    cm.width,
                    cm.actual_bounding_box_left,
                    cm.actual_bounding_box_right,
                    cm.actual_bounding_box_ascent,
                    cm.actual_bounding_box_descent,
                ],
            )
        })
        .collect();

    let baselines = m.baselines();
    let b = MinifiedBaselines {
        fba: baselines.font_bounding_box_ascent,
        fbd: baselines.font_bounding_box_descent,
        hb: baselines.hanging_baseline,
        ab: baselines.alphabetic_baseline,
        ib: baselines.ideographic_baseline,
    };

    let mut k = HashMap::with_capacity(m.kerning_table().len());
    for (&left, row) in m.kerning_table() {
        let mut wire_row = HashMap::with_capacity(row.len());
        for (&key, &adjustment) in row {
            let wire_key = match key {
                KerningKey::Char(c) => c.to_string(),
                KerningKey::Any => WILDCARD_KEY.to_string(),
            };
            wire_row.insert(wire_key, adjustment);
        }
        k.insert(left.to_string(), wire_row);
    }

    Ok(MinifiedMetrics {
        k,
        b,
        g,
        s: m.space_advancement_override_for_small_sizes_in_px(),
    })
}

/// Expands a minified blob back into a `FontMetrics`.
///
/// Fails with `LegacyFormat` if `raw` carries a historical top-level `c`
/// (character-list) field, and with `CharacterOutOfOrder` if `g`'s entries
/// are not exactly the canonical set in canonical order.
pub fn expand(raw: &serde_json::Value) -> Result<FontMetrics, CodecError> {
    if raw.get("c").is_some() {
        return Err(CodecError::LegacyFormat);
    }

    let minified: MinifiedMetrics = serde_json::from_value(raw.clone())?;
    expand_minified(&minified)
}

fn expand_minified(minified: &MinifiedMetrics) -> Result<FontMetrics, CodecError> {
    let canonical = character_set();

    if minified.g.len() != canonical.len() {
        return Err(CodecError::InvalidCharacterSet {
            found: minified.g.len(),
            expected: canonical.len(),
        });
    }

    let mut builder = FontMetricsBuilder::new();
    builder.set_baselines(FontBaselines {
        font_bounding_box_ascent: minified.b.fba,
        font_bounding_box_descent: minified.b.fbd,
        hanging_baseline: minified.b.hb,
        alphabetic_baseline: minified.b.ab,
        ideographic_baseline: minified.b.ib,
    });

    for (i, &expected_char) in canonical.iter().enumerate() {
        let (actual_char, values) = minified.g[i];
        if actual_char != expected_char {
            return Err(CodecError::CharacterOutOfOrder(actual_char, i));
        }

        builder.set_character_metrics(
            actual_char,
            CharacterMetrics {
                width: values[0],
                actual_bounding_box_left: values[1],
                actual_bounding_box_right: values[2],
                actual_bounding_box_ascent: values[3],
                actual_bounding_box_descent: values[4],
            },
        );
    }

    for (left_str, row) in &minified.k {
        let Some(left) = left_str.chars().next() else {
            continue;
        };
        for (right_str, &adjustment) in row {
            let key = if right_str == WILDCARD_KEY {
                KerningKey::Any
            } else if let Some(right) = right_str.chars().next() {
                KerningKey::Char(right)
            } else {
                continue;
            };
            builder.set_kerning(left, key, adjustment);
        }
    }

    if let Some(s) = minified.s {
        builder.set_space_advancement_override_for_small_sizes_in_px(s);
    }

    Ok(builder.build())
}

/// Runs `expand(minify(m))` and compares the essential per-character fields
/// against the original. Any mismatch is fatal.
pub fn minify_with_verification(m: &FontMetrics) -> Result<MinifiedMetrics, CodecError> {
    let minified = minify(m)?;
    let raw = serde_json::to_value(&minified).expect("minified metrics always serialize");
    let roundtripped = expand(&raw)?;

    for &c in character_set() {
        let original = m.character_metrics(c).expect("checked by minify's InvalidCharacterSet guard");
        let back = roundtripped
            .character_metrics(c)
            .expect("expand always repopulates the full canonical set");

        if original.width != back.width {
            return Err(CodecError::RoundtripFailure { ch: c, field: "width" });
        }
        if original.actual_bounding_box_left != back.actual_bounding_box_left {
            return Err(CodecError::RoundtripFailure {
                ch: c,
                field: "actualBoundingBoxLeft",
            });
        }
        if original.actual_bounding_box_right != back.actual_bounding_box_right {
            return Err(CodecError::RoundtripFailure {
                ch: c,
                field: "actualBoundingBoxRight",
            });
        }
        if original.actual_bounding_box_ascent != back.actual_bounding_box_ascent {
            return Err(CodecError::RoundtripFailure {
                ch: c,
                field: "actualBoundingBoxAscent",
            });
        }
        if original.actual_bounding_box_descent != back.actual_bounding_box_descent {
            return Err(CodecError::RoundtripFailure {
                ch: c,
                field: "actualBoundingBoxDescent",
            });
        }
    }

    if m.baselines() != roundtripped.baselines() {
        return Err(CodecError::RoundtripFailure {
            ch: '\u{0}',
            field: "baselines",
        });
    }

    Ok(minified)
}
