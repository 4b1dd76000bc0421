//! `FontIdentity`: the immutable key used throughout the crate to address a
//! font's metrics and atlas. Replaces the deeply nested dynamic property maps
//! (`{pixelDensity: {family: {style: {weight: {size: ...}}}}}`) the source
//! used with a single value type that can be used directly as a `HashMap` key.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Normal,
    Italic,
    Oblique,
}

impl Style {
    fn as_str(self) -> &'static str {
        match self {
            Style::Normal => "normal",
            Style::Italic => "italic",
            Style::Oblique => "oblique",
        }
    }
}

impl FromStr for Style {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Style::Normal),
            "italic" => Ok(Style::Italic),
            "oblique" => Ok(Style::Oblique),
            _ => Err(ParseIdentityError::UnknownStyle),
        }
    }
}

/// Font weight. `Numeric` covers the CSS 100..900 scale; `Normal`/`Bold` are
/// kept as distinct variants because the id-string contract prints them as
/// the literal words, not as `400`/`700`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Normal,
    Bold,
    Numeric(u16),
}

impl Weight {
    fn as_string(self) -> String {
        match self {
            Weight::Normal => "normal".to_string(),
            Weight::Bold => "bold".to_string(),
            Weight::Numeric(n) => n.to_string(),
        }
    }
}

impl FromStr for Weight {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Weight::Normal),
            "bold" => Ok(Weight::Bold),
            _ => {
                let n: u16 = s.parse().map_err(|_| ParseIdentityError::UnknownWeight)?;
                if (100..=900).contains(&n) {
                    Ok(Weight::Numeric(n))
                } else {
                    Err(ParseIdentityError::UnknownWeight)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseIdentityError {
    MissingKeyword(&'static str),
    UnknownStyle,
    UnknownWeight,
    InvalidNumber(&'static str),
}

impl fmt::Display for ParseIdentityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseIdentityError::MissingKeyword(kw) => {
                write!(f, "id string is missing the `{kw}` keyword")
            }
            ParseIdentityError::UnknownStyle => write!(f, "unrecognized style"),
            ParseIdentityError::UnknownWeight => write!(f, "unrecognized weight"),
            ParseIdentityError::InvalidNumber(what) => write!(f, "invalid {what} number"),
        }
    }
}

impl std::error::Error for ParseIdentityError {}

/// Immutable font key: `(pixelDensity, family, style, weight, size)`. A value
/// type usable directly as a `HashMap` key — `pixelDensity` and `size` are
/// compared and hashed by bit pattern, which is sound here because every
/// `FontIdentity` is built either from a literal or from parsing the
/// canonical id string, never from arithmetic that could produce distinct bit
/// patterns for what should be the same value.
#[derive(Debug, Clone)]
pub struct FontIdentity {
    pixel_density: f64,
    family: String,
    style: Style,
    weight: Weight,
    size: f64,
}

impl FontIdentity {
    pub fn new(pixel_density: f64, family: impl Into<String>, style: Style, weight: Weight, size: f64) -> Self {
        assert!(size >= 9.0, "font size must be >= 9, got {size}");
        Self {
            pixel_density,
            family: family.into(),
            style,
            weight,
            size,
        }
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Canonical, lossless, round-trippable id string used as the on-disk
    /// name for both the metrics file and the atlas image.
    pub fn id_string(&self) -> String {
        format!(
            "density-{}-{}-style-{}-weight-{}-size-{}",
            decimal_parts(self.pixel_density),
            self.family,
            self.style.as_str(),
            self.weight.as_string(),
            decimal_parts(self.size),
        )
    }
}

impl fmt::Display for FontIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id_string())
    }
}

impl PartialEq for FontIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.pixel_density.to_bits() == other.pixel_density.to_bits()
            && self.family == other.family
            && self.style == other.style
            && self.weight == other.weight
            && self.size.to_bits() == other.size.to_bits()
    }
}

impl Eq for FontIdentity {}

impl std::hash::Hash for FontIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.pixel_density.to_bits().hash(state);
        self.family.hash(state);
        self.style.hash(state);
        self.weight.hash(state);
        self.size.to_bits().hash(state);
    }
}

impl FromStr for FontIdentity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The id string is anchored by four keywords in fixed order: density,
        // style, weight, size. Family sits between the density number and the
        // `style` keyword and may itself contain dashes, so every split below
        // locates its keyword by substring search rather than splitting
        // naively on `-`.
        let density_and_family = s
            .strip_prefix("density-")
            .ok_or(ParseIdentityError::MissingKeyword("density"))?;

        let style_idx = density_and_family
            .find("-style-")
            .ok_or(ParseIdentityError::MissingKeyword("style"))?;
        let density_and_family = &density_and_family[..style_idx];

        let mut parts = density_and_family.splitn(3, '-');
        let density_int: i64 = parts
            .next()
            .ok_or(ParseIdentityError::InvalidNumber("density"))?
            .parse()
            .map_err(|_| ParseIdentityError::InvalidNumber("density"))?;
        let density_frac = parts.next().ok_or(ParseIdentityError::InvalidNumber("density"))?;
        let family = parts
            .next()
            .ok_or(ParseIdentityError::MissingKeyword("style"))?
            .to_string();
        let pixel_density = combine_decimal_parts(density_int, density_frac)
            .ok_or(ParseIdentityError::InvalidNumber("density"))?;

        let after_style = &s[s.find("-style-").unwrap() + "-style-".len()..];
        let weight_idx = after_style
            .find("-weight-")
            .ok_or(ParseIdentityError::MissingKeyword("weight"))?;
        let style: Style = after_style[..weight_idx].parse()?;

        let after_weight = &after_style[weight_idx + "-weight-".len()..];
        let size_idx = after_weight
            .find("-size-")
            .ok_or(ParseIdentityError::MissingKeyword("size"))?;
        let weight: Weight = after_weight[..size_idx].parse()?;

        let size_str = &after_weight[size_idx + "-size-".len()..];
        let mut size_parts = size_str.splitn(2, '-');
        let size_int: i64 = size_parts
            .next()
            .ok_or(ParseIdentityError::InvalidNumber("size"))?
            .parse()
            .map_err(|_| ParseIdentityError::InvalidNumber("size"))?;
        let size_frac = size_parts.next().ok_or(ParseIdentityError::InvalidNumber("size"))?;
        let size = combine_decimal_parts(size_int, size_frac)
            .ok_or(ParseIdentityError::InvalidNumber("size"))?;

        Ok(FontIdentity {
            pixel_density,
            family,
            style,
            weight,
            size,
        })
    }
}

fn combine_decimal_parts(int_part: i64, frac_str: &str) -> Option<f64> {
    if frac_str == "0" {
        return Some(int_part as f64);
    }
    let frac_digits = frac_str.len() as i32;
    let frac_value: i64 = frac_str.parse().ok()?;
    let sign = if int_part < 0 { -1.0 } else { 1.0 };
    Some(int_part as f64 + sign * frac_value as f64 / 10f64.powi(frac_digits))
}

/// Prints a real number as the `<intPart>-<fracPart>` pair the id-string
/// contract uses, with `fracPart = "0"` for integers.
fn decimal_parts(v: f64) -> String {
    let int_part = v.trunc() as i64;
    let frac = (v.fract().abs() * 10f64.powi(6)).round() as i64;

    if frac == 0 {
        format!("{int_part}-0")
    } else {
        let mut frac_str = frac.to_string();
        while frac_str.ends_with('0') {
            frac_str.pop();
        }
        format!("{int_part}-{frac_str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_string_roundtrip_s1() {
        let id = FontIdentity::new(1.5, "Times New Roman", Style::Italic, Weight::Numeric(700), 18.0);
        assert_eq!(
            id.id_string(),
            "density-1-5-Times New Roman-style-italic-weight-700-size-18-0"
        );

        let parsed: FontIdentity = id.id_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_string_roundtrip_integer_density() {
        let id = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);
        assert_eq!(id.id_string(), "density-1-0-Arial-style-normal-weight-normal-size-14-0");

        let parsed: FontIdentity = id.id_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_string_roundtrip_dashed_family() {
        let id = FontIdentity::new(2.0, "Liberation-Mono", Style::Oblique, Weight::Bold, 12.5);
        let printed = id.id_string();
        let parsed: FontIdentity = printed.parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.family(), "Liberation-Mono");
    }

    #[test]
    fn equal_identities_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);
        let b = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);

        assert_eq!(a, b);
        assert_eq!(ha.finish(), hb.finish());
    }
}
