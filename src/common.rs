//! Shared text transforms used by more than one parser function.

use html_escape::NAMED_ENTITIES;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::borrow::Cow;

/// The longest name that can appear between `&` and `;` in a decodable
/// entity.
const MAX_ENTITY_LEN: usize = {
    let mut max = 0;
    let mut entities = NAMED_ENTITIES.as_slice();
    while let [(name, _), rest @ ..] = entities {
        if name.len() > max {
            max = name.len();
        }
        entities = rest;
    }
    max
};

/// Decodes numeric and named HTML entities, quotes included.
///
/// Unknown and unterminated entities pass through verbatim; HTML5 recovery
/// rules for a missing `;` are deliberately not applied.
pub fn decode_html(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut flushed = 0;
    for start in memchr::memchr_iter(b'&', bytes) {
        let body = start + 1;
        let end = (body + MAX_ENTITY_LEN + 1).min(bytes.len());
        let Some(len) = memchr::memchr(b';', &bytes[body..end]) else {
            continue;
        };

        let name = &text[body..body + len];
        let mut utf8 = [0; 4];
        let value = if let Some(code) = name.strip_prefix('#') {
            if let Some(hex) = code.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16)
            } else {
                code.parse::<u32>()
            }
            .ok()
            .and_then(char::from_u32)
            .map(|c| &*c.encode_utf8(&mut utf8))
        } else {
            NAMED_ENTITIES
                .binary_search_by(|(key, _)| key.cmp(&name.as_bytes()))
                .ok()
                .map(|index| NAMED_ENTITIES[index].1)
        };

        if let Some(value) = value {
            out += &text[flushed..start];
            out += value;
            flushed = body + len + ";".len();
        }
    }

    if flushed == 0 {
        Cow::Borrowed(text)
    } else {
        out += &text[flushed..];
        Cow::Owned(out)
    }
}

/// Escapes the characters significant to HTML, quotes included.
pub fn encode_html(text: &str) -> Cow<'_, str> {
    subst_chars(
        text,
        &[
            ('&', "&amp;"),
            ('"', "&quot;"),
            ('\'', "&#039;"),
            ('<', "&lt;"),
            ('>', "&gt;"),
        ],
    )
}

/// Percent-encodes a URL query string token by token.
///
/// Tokens split on `&`. A `key=value` token encodes each side of its first
/// `=`; a bare token carries its own separator so it survives a later decode
/// as a flag. Every non-alphanumeric byte is encoded, so the output is
/// unambiguous about `+`, `_`, `.`, and `-`.
pub fn url_encode_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for (index, token) in query.split('&').enumerate() {
        if index != 0 {
            out.push('&');
        }
        if let Some((key, value)) = token.split_once('=') {
            out.extend(utf8_percent_encode(key, NON_ALPHANUMERIC));
            out.push('=');
            out.extend(utf8_percent_encode(value, NON_ALPHANUMERIC));
        } else {
            out.push_str("%26");
            out.extend(utf8_percent_encode(token, NON_ALPHANUMERIC));
        }
    }
    out
}

/// Replaces wiki-syntax-significant characters with safe counterparts:
/// full-width forms for the ASCII syntax characters, U+00B7 for the middle
/// dot variants.
pub fn convert_spec(text: &str) -> Cow<'_, str> {
    subst_chars(
        text,
        &[
            ('#', "＃"),
            ('<', "＜"),
            ('>', "＞"),
            ('[', "［"),
            (']', "］"),
            ('|', "｜"),
            ('{', "｛"),
            ('}', "｝"),
            ('*', "＊"),
            ('•', "·"),
            ('．', "·"),
            ('‧', "·"),
            ('∙', "·"),
            ('⋅', "·"),
            ('･', "·"),
            ('〜', "～"),
            (':', "："),
        ],
    )
}

/// Replaces every character found in `table` with its substitute.
fn subst_chars<'a>(text: &'a str, table: &[(char, &str)]) -> Cow<'a, str> {
    let mut out = String::new();
    let mut flushed = 0;
    for (index, c) in text.char_indices() {
        if let Some((_, replacement)) = table.iter().find(|(find, _)| *find == c) {
            out += &text[flushed..index];
            out += replacement;
            flushed = index + c.len_utf8();
        }
    }

    if flushed == 0 {
        Cow::Borrowed(text)
    } else {
        out += &text[flushed..];
        Cow::Owned(out)
    }
}
