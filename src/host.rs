//! The collaborator interface a host wiki parser supplies.

use std::borrow::Cow;

/// The default recognized URI schemes, as a regex alternation.
///
/// Mirrors MediaWiki's `$wgUrlProtocols`, including the protocol-relative
/// `//` form.
pub const URL_PROTOCOLS: &str = "bitcoin:|ftp://|ftps://|geo:|git://|gopher://|http://|https://|irc://|ircs://|magnet:|mailto:|matrix:|mms://|news:|nntp://|redis://|sftp://|sip:|sips:|sms:|ssh://|svn://|tel:|telnet://|urn:|worldwind://|xmpp:|//";

/// The default set of characters legal in a page title, as a regex
/// character-class body.
///
/// Mirrors MediaWiki's `$wgLegalTitleChars`, with the byte range for
/// non-ASCII text widened to whole characters.
pub const LEGAL_TITLE_CHARS: &str =
    r#" %!"$&'()*,\-./0-9:;=?@A-Z\\^_`a-z~\x{80}-\x{10FFFF}+"#;

/// Collaborators supplied by the host wiki parser.
///
/// Everything here is read-only configuration or delegation except
/// [`Host::add_template`], which records a template usage against the page
/// being rendered.
pub trait Host {
    /// Returns true if `text` is a valid, normalizable page title.
    fn is_valid_title(&self, text: &str) -> bool;

    /// Returns the characters legal in a page title, as a regex
    /// character-class body like [`LEGAL_TITLE_CHARS`].
    fn legal_title_chars(&self) -> &str {
        LEGAL_TITLE_CHARS
    }

    /// Returns the recognized URI schemes, as a regex alternation like
    /// [`URL_PROTOCOLS`].
    fn url_protocols(&self) -> &str {
        URL_PROTOCOLS
    }

    /// Fetches the wikitext of the template with the given title, or `None`
    /// if no such page exists.
    fn fetch_template_text(&self, title: &str) -> Option<String>;

    /// Reverses the placeholder substitution the host applied to protect
    /// `<nowiki>` content from markup parsing.
    fn unstrip_nowiki<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    /// Removes HTML and markup tags from `text`.
    fn strip_tags<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    /// Records that the page being rendered uses the template with the given
    /// title.
    fn add_template(&mut self, title: &str);
}
