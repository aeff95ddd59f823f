//! Link candidate classification.

use crate::Result;
use parking_lot::Mutex;
use regex::Regex;
use std::{
    borrow::Cow,
    sync::{Arc, LazyLock},
};

/// Compiled patterns for a handful of distinct host configurations.
///
/// Both grammars depend only on static host configuration, so compiled
/// patterns are shared across calls. Racing recomputation is harmless; the
/// compiled value is deterministic from its key.
static PATTERNS: LazyLock<Mutex<schnellru::LruMap<(String, String), Arc<LinkPatterns>>>> =
    LazyLock::new(|| Mutex::new(schnellru::LruMap::new(schnellru::ByLength::new(4))));

/// The classification of a bracket-stripped link candidate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkKind {
    /// A bracketed external link target, with an optional label.
    External,
    /// A valid internal page link target.
    Internal,
    /// Text with no link semantics.
    PlainText,
}

/// Link grammars compiled from host configuration.
#[derive(Debug)]
pub struct LinkPatterns {
    /// The external link grammar, anchored over the re-bracketed candidate.
    external: Regex,
    /// The internal link grammar, anchored over the bare candidate.
    internal: Regex,
}

impl LinkPatterns {
    /// Compiles the grammars from the host's URL protocol alternation and
    /// legal title character class.
    ///
    /// The address and URL character classes match MediaWiki's
    /// `EXT_LINK_ADDR` and `EXT_LINK_URL_CLASS`: an IPv4 literal, a
    /// bracketed IPv6 literal, or safe URL characters, which exclude
    /// controls, whitespace separators, angle and square brackets, double
    /// quotes, DEL, and the replacement character.
    pub fn new(protocols: &str, title_chars: &str) -> Result<Self> {
        let external = format!(
            r#"^\[(?:(?i:{protocols})|/)(?:[0-9.]+|\[[0-9A-Fa-f:.]+\]|[^\x00-\x20<>"\[\]\x7F\p{{Zs}}\x{{FFFD}}])[^\x00-\x20<>"\[\]\x7F\p{{Zs}}\x{{FFFD}}]*\p{{Zs}}*[^\]\x00-\x08\x0A-\x1F\x{{FFFD}}]*\]$"#
        );
        let internal = format!(r"^[{title_chars}#%]+(\||$)");
        Ok(Self {
            external: Regex::new(&external)?,
            internal: Regex::new(&internal)?,
        })
    }

    /// Returns the cached patterns for the given host configuration,
    /// compiling them on first use.
    pub fn cached(protocols: &str, title_chars: &str) -> Result<Arc<Self>> {
        let key = (protocols.to_string(), title_chars.to_string());
        if let Some(patterns) = PATTERNS.lock().get(&key) {
            return Ok(Arc::clone(patterns));
        }

        // Compile outside the lock; a racing thread computes the same value
        // and the first insert wins.
        let patterns = Arc::new(Self::new(protocols, title_chars)?);
        let mut cache = PATTERNS.lock();
        let canonical = cache
            .get_or_insert(key, || Arc::clone(&patterns))
            .map(|cached| Arc::clone(cached));
        Ok(canonical.unwrap_or(patterns))
    }

    /// Classifies a bracket-stripped link candidate.
    pub fn classify(&self, candidate: &str) -> LinkKind {
        if self.external.is_match(&format!("[{candidate}]")) {
            LinkKind::External
        } else if self.internal.is_match(candidate) {
            LinkKind::Internal
        } else {
            LinkKind::PlainText
        }
    }

    /// Re-wraps `text` in the link syntax matching its classification.
    ///
    /// One surrounding bracket pair is stripped before classification, so
    /// already-bracketed external links come back unchanged.
    pub fn wrap<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let text = text.trim_ascii();
        let text = text.strip_prefix('[').unwrap_or(text);
        let text = text.strip_suffix(']').unwrap_or(text);
        if text.is_empty() {
            return Cow::Borrowed("");
        }

        match self.classify(text) {
            LinkKind::External => Cow::Owned(format!("[{text}]")),
            LinkKind::Internal => Cow::Owned(format!("[[{text}]]")),
            LinkKind::PlainText => Cow::Borrowed(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LEGAL_TITLE_CHARS, URL_PROTOCOLS};

    fn patterns() -> Arc<LinkPatterns> {
        LinkPatterns::cached(URL_PROTOCOLS, LEGAL_TITLE_CHARS).unwrap()
    }

    #[test]
    fn test_external_links() {
        let patterns = patterns();
        assert_eq!(
            patterns.wrap("http://example.com label"),
            "[http://example.com label]"
        );
        assert_eq!(
            patterns.wrap("[http://example.com]"),
            "[http://example.com]",
            "existing brackets should not double up"
        );
        assert_eq!(
            patterns.wrap("HTTPS://EXAMPLE.COM"),
            "[HTTPS://EXAMPLE.COM]",
            "protocol match should be case-insensitive"
        );
        assert_eq!(patterns.wrap("//example.com/x"), "[//example.com/x]");
        assert_eq!(patterns.wrap("/relative/path"), "[/relative/path]");
        assert_eq!(
            patterns.wrap("http://[2001:db8::1]/x"),
            "[http://[2001:db8::1]/x]"
        );
        assert_eq!(patterns.wrap("mailto:a@example.com"), "[mailto:a@example.com]");
    }

    #[test]
    fn test_internal_links() {
        let patterns = patterns();
        assert_eq!(patterns.wrap("Main Page"), "[[Main Page]]");
        assert_eq!(patterns.wrap("Main Page#History"), "[[Main Page#History]]");
        assert_eq!(
            patterns.wrap("Main Page|the wiki"),
            "[[Main Page|the wiki]]",
            "a piped label should stay part of the link"
        );
        assert_eq!(patterns.wrap(" Spaced out "), "[[Spaced out]]");
    }

    #[test]
    fn test_plain_text() {
        let patterns = patterns();
        assert_eq!(
            patterns.wrap("a<b"),
            "a<b",
            "angle brackets are not legal title characters"
        );
        assert_eq!(patterns.wrap("{{curly}}"), "{{curly}}");
        assert_eq!(patterns.wrap(""), "");
        assert_eq!(patterns.wrap("[]"), "");
    }

    #[test]
    fn test_narrow_title_chars() {
        // A host that does not allow `!` in titles leaves shouty text alone.
        let patterns = LinkPatterns::new(URL_PROTOCOLS, "A-Za-z0-9 ").unwrap();
        assert_eq!(patterns.wrap("not a link!!"), "not a link!!");
        assert_eq!(patterns.wrap("Main Page"), "[[Main Page]]");
    }

    #[test]
    fn test_cache_reuse() {
        let first = patterns();
        let second = patterns();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
