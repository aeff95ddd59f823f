//! Parser functions for template argument introspection and string
//! transformation.
//!
//! This crate implements the handler side of a MediaWiki-style function hook
//! surface. A host wikitext parser owns everything stateful (page fetching,
//! preprocessing, strip states, link tables) and hands each call a [`Frame`]
//! of template argument bindings plus the [`Host`] collaborators. Every
//! function is a string-in/string-out transform:
//!
//! * `param` tests whether any or all arguments in a set were passed to the
//!   enclosing template, counts them, or recalls the previous result
//! * `getparam` lists the arguments a template declares
//! * `rawparam` fetches an argument value without expanding it
//! * `exeparam` passes text through for the host to parse as wikitext
//! * `link` registers a template usage without emitting output
//! * `addlink` classifies text as an external link, internal link, or plain
//!   text, and wraps it accordingly
//! * `inoutro` wraps a non-empty value with an intro and an outro
//! * `htmlencode`, `htmldecode`, `urlencodequery`, `convertspec`, and
//!   `striptags` are plain text transforms
//!
//! Calls are dispatched by name through [`call_parser_fn`]; the host decides
//! what to do with the output based on the returned [`OutputMode`].

use core::fmt;

mod common;
mod frame;
mod functions;
mod host;
mod links;

pub use common::{convert_spec, decode_html, encode_html, url_encode_query};
pub use frame::{Frame, IndexedArgs, Node};
pub use functions::{call_parser_fn, names};
pub use host::{Host, LEGAL_TITLE_CHARS, URL_PROTOCOLS};
pub use links::{LinkKind, LinkPatterns};

/// A parser function evaluation error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host failed to expand an argument node.
    #[error(transparent)]
    Expand(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A write to a buffer failed.
    #[error("fmt error: {0}")]
    Fmt(#[from] fmt::Error),

    /// A host-supplied pattern fragment failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenience alias for parser function results.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// How the host must treat the text produced by a parser function call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// The output is final text.
    Literal,
    /// The output is wikitext which the host should run back through its
    /// parser.
    Wikitext,
}

/// Shared state threaded through every parser function call.
pub struct State<'a> {
    /// Host collaborators.
    pub host: &'a mut dyn Host,
}
