//! HTML entity decoding for labels and cell text

use std::collections::HashMap;

use once_cell::sync::Lazy;

const SOFT_HYPHEN: char = '\u{AD}';

// Names of U+00A0..=U+00FF, in code point order
const LATIN1: &[&str] = &[
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc",
    "uuml", "yacute", "thorn", "yuml",
];

const OTHER: &[(&str, char)] = &[
    ("quot", '"'),
    ("amp", '&'),
    ("apos", '\''),
    ("lt", '<'),
    ("gt", '>'),
    ("OElig", '\u{152}'),
    ("oelig", '\u{153}'),
    ("Scaron", '\u{160}'),
    ("scaron", '\u{161}'),
    ("Yuml", '\u{178}'),
    ("fnof", '\u{192}'),
    ("circ", '\u{2C6}'),
    ("tilde", '\u{2DC}'),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("zwnj", '\u{200C}'),
    ("zwj", '\u{200D}'),
    ("lrm", '\u{200E}'),
    ("rlm", '\u{200F}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201A}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bdquo", '\u{201E}'),
    ("dagger", '\u{2020}'),
    ("Dagger", '\u{2021}'),
    ("bull", '\u{2022}'),
    ("hellip", '\u{2026}'),
    ("permil", '\u{2030}'),
    ("prime", '\u{2032}'),
    ("Prime", '\u{2033}'),
    ("lsaquo", '\u{2039}'),
    ("rsaquo", '\u{203A}'),
    ("euro", '\u{20AC}'),
    ("trade", '\u{2122}'),
];

static ENTITIES: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    let latin1 = LATIN1
        .iter()
        .enumerate()
        .filter_map(|(i, name)| char::from_u32(0xA0 + i as u32).map(|c| (*name, c)));
    latin1.chain(OTHER.iter().copied()).collect()
});

// Longest entity body we look at before giving up on finding ';'
const MAX_ENTITY_LEN: usize = 10;

fn decode_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    ENTITIES.get(body).copied()
}

/// Decode named, decimal and hex character references and drop soft hyphens
///
/// Unknown entities are kept as written.
///
/// ```
/// use sheetbind::decode_html_entities;
///
/// assert_eq!(decode_html_entities("Fish &amp; Chips"), "Fish & Chips");
/// assert_eq!(decode_html_entities("La&shy;phroaig"), "Laphroaig");
/// assert_eq!(decode_html_entities("&#8364;&#x41;&bogus;"), "\u{20AC}A&bogus;");
/// ```
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_entity(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out.retain(|c| c != SOFT_HYPHEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_table_is_complete() {
        assert_eq!(LATIN1.len(), 96);
        assert_eq!(ENTITIES.get("yuml"), Some(&'\u{FF}'));
        assert_eq!(ENTITIES.get("nbsp"), Some(&'\u{A0}'));
        assert_eq!(ENTITIES.get("uuml"), Some(&'ü'));
    }

    #[test]
    fn test_named_and_numeric() {
        assert_eq!(decode_html_entities("M&uuml;ller &lt;b&gt;"), "Müller <b>");
        assert_eq!(decode_html_entities("&ndash;&#039;&#X42;"), "\u{2013}'B");
        assert_eq!(decode_html_entities("caf&eacute;"), "café");
    }

    #[test]
    fn test_verbatim_when_not_an_entity() {
        assert_eq!(decode_html_entities("a & b"), "a & b");
        assert_eq!(decode_html_entities("&&amp;"), "&&");
        assert_eq!(decode_html_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_html_entities("tail &amp"), "tail &amp");
        assert_eq!(decode_html_entities("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn test_soft_hyphens_removed() {
        assert_eq!(decode_html_entities("Ab\u{AD}c"), "Abc");
        assert_eq!(decode_html_entities("&#173;x"), "x");
    }
}
