//! The frozen, ordered character inventory every font file must cover. Hoists
//! what the source treated as an implicit convention (whatever characters
//! happened to be iterated) into a first-class constant that minify-time
//! validation enforces.

/// Curated CP1252 `0x80..=0x9F` block (smart punctuation, dashes, ligatures,
/// caron letters, Euro sign, ellipsis), plus the Unicode minus sign, which
/// has no CP1252 slot of its own but is grouped here because it serves the
/// same "typographically correct punctuation" role as the dashes and quotes.
/// 22 characters.
const CP1252_SUPPLEMENT: &[char] = &[
    '\u{20AC}', // Euro sign
    '\u{201A}', // single low-9 quotation mark
    '\u{0192}', // Latin small letter f with hook
    '\u{201E}', // double low-9 quotation mark
    '\u{2026}', // horizontal ellipsis
    '\u{0160}', // Latin capital letter S with caron
    '\u{2039}', // single left-pointing angle quotation mark
    '\u{0152}', // Latin capital ligature OE
    '\u{017D}', // Latin capital letter Z with caron
    '\u{2018}', // left single quotation mark
    '\u{2019}', // right single quotation mark (curly apostrophe)
    '\u{201C}', // left double quotation mark
    '\u{201D}', // right double quotation mark
    '\u{2022}', // bullet
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{0161}', // Latin small letter s with caron
    '\u{203A}', // single right-pointing angle quotation mark
    '\u{0153}', // Latin small ligature oe
    '\u{017E}', // Latin small letter z with caron
    '\u{0178}', // Latin capital letter Y with diaeresis
    '\u{2212}', // minus sign
];

/// Latin-1 Supplement (`0xA0..=0xFF`) code points excluded from the character
/// set: legacy fraction glyphs and a handful of symbols with unreliable glyph
/// coverage across the target font families. 10 excluded, leaving 86.
const LATIN_1_BLACKLIST: &[u32] = &[
    0x00A6, // broken bar
    0x00A8, // diaeresis
    0x00A9, // copyright sign
    0x00AC, // not sign
    0x00AF, // macron
    0x00B4, // acute accent
    0x00B8, // cedilla
    0x00BC, // vulgar fraction one quarter
    0x00BD, // vulgar fraction one half
    0x00BE, // vulgar fraction three quarters
];

fn build_character_set() -> Vec<char> {
    let mut chars: Vec<char> = Vec::with_capacity(204);

    // ASCII printable range: 95 characters.
    for cp in 0x20u32..=0x7E {
        chars.push(char::from_u32(cp).unwrap());
    }

    // 22 characters.
    chars.extend_from_slice(CP1252_SUPPLEMENT);

    // Latin-1 Supplement minus the blacklist: 96 - 10 = 86 characters.
    for cp in 0xA0u32..=0xFF {
        if LATIN_1_BLACKLIST.contains(&cp) {
            continue;
        }
        chars.push(char::from_u32(cp).unwrap());
    }

    // 1 character. 95 + 22 + 86 + 1 = 204.
    chars.push('\u{2588}'); // full block, used for cursor/placeholder glyphs

    chars.sort_by_key(|c| *c as u32);
    chars
}

/// The canonical, frozen, sorted character inventory. 204 code points.
/// Ordering drives all atlas packing: builder and reconstructor alike walk
/// characters in this order.
pub fn character_set() -> &'static [char] {
    use std::sync::OnceLock;
    static SET: OnceLock<Vec<char>> = OnceLock::new();
    SET.get_or_init(build_character_set)
}

/// Number of characters every font file must contain, in this order.
pub const CHARACTER_COUNT: usize = 204;

/// Returns `true` if `chars` is exactly the canonical set, in canonical
/// order — no missing, extra, or reordered characters.
pub fn is_canonical_order<I>(chars: I) -> bool
where
    I: IntoIterator<Item = char>,
{
    character_set().iter().copied().eq(chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_exactly_204_characters() {
        assert_eq!(character_set().len(), CHARACTER_COUNT);
    }

    #[test]
    fn is_sorted_by_code_point() {
        let set = character_set();
        for window in set.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn contains_ascii_printables() {
        let set = character_set();
        assert!(set.contains(&'A'));
        assert!(set.contains(&' '));
        assert!(set.contains(&'~'));
    }

    #[test]
    fn contains_curated_extras() {
        let set = character_set();
        assert!(set.contains(&'\u{20AC}')); // Euro
        assert!(set.contains(&'\u{2026}')); // ellipsis
        assert!(set.contains(&'\u{2019}')); // curly apostrophe
        assert!(set.contains(&'\u{2013}')); // en dash
        assert!(set.contains(&'\u{2014}')); // em dash
        assert!(set.contains(&'\u{2212}')); // minus sign
        assert!(set.contains(&'\u{2588}')); // full block
    }

    #[test]
    fn excludes_blacklisted_latin1() {
        let set = character_set();
        assert!(!set.contains(&'\u{00BD}')); // one half
        assert!(!set.contains(&'\u{00A9}')); // copyright sign
    }

    #[test]
    fn is_canonical_order_detects_reorder_and_gaps() {
        let set: Vec<char> = character_set().to_vec();
        assert!(is_canonical_order(set.iter().copied()));

        let mut reordered = set.clone();
        reordered.swap(0, 1);
        assert!(!is_canonical_order(reordered));

        let mut truncated = set.clone();
        truncated.pop();
        assert!(!is_canonical_order(truncated));
    }
}
