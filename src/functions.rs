//! Parser function implementations.
//!
//! <https://www.mediawiki.org/wiki/Manual:Parser_functions>

// Clippy: Function signatures all conform to a specific API; inline modules
// are clearer with wildcard import.
#![allow(clippy::unnecessary_wraps, clippy::wildcard_imports)]

use crate::{
    OutputMode, Result, State,
    common::{convert_spec, decode_html, encode_html, url_encode_query},
    frame::{Frame, IndexedArgs, Node},
    links::LinkPatterns,
};
use core::fmt::Write as _;
use std::borrow::Cow;

/// The function signature of a parser function.
type ParserFn = fn(&mut String, &mut State<'_>, &IndexedArgs<'_>) -> Result<OutputMode>;

mod args {
    //! Template argument introspection functions.

    use super::*;
    use indexmap::IndexSet;
    use regex::Regex;
    use std::sync::LazyLock;

    /// Dispatch modes for `{{#param:}}`, derived once from the leading
    /// token.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum Mode {
        /// Return the memoized result of the previous match.
        Recall,
        /// Count how many of the listed arguments were passed.
        Count,
        /// Scan for the first listed argument that was passed.
        Any,
        /// Verify that every listed argument was passed.
        All,
    }

    /// `{{#param:}}` or `{{#param: name ... }}` or `{{#param: & | name ... }}`
    /// or `{{#param: $ | name ... }}`
    ///
    /// Checks if any or all arguments in the set were provided when invoking
    /// a template and returns the matching argument name, or calculates how
    /// many arguments in the set were provided and returns the total.
    pub fn param(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        let sp = arguments.sp;
        if !sp.is_template() {
            return Ok(OutputMode::Literal);
        }

        let token = arguments.eval(0)?.map_or(Cow::Borrowed(""), trim);
        let mode = match &*token {
            "" if arguments.len() <= 1 => Mode::Recall,
            "$" => Mode::Count,
            "&" => Mode::All,
            _ => Mode::Any,
        };

        match mode {
            Mode::Recall => {
                if let Some(last) = sp.last_match() {
                    write!(out, "{last}")?;
                }
            }
            Mode::Count => {
                let mut count = 0;
                for node in arguments.iter().skip(1) {
                    let name = trim(node.expand()?);
                    if !name.is_empty() && sp.has_arg(&name) {
                        count += 1;
                    }
                }
                write!(out, "{count}")?;
            }
            Mode::Any | Mode::All => {
                // The `&` sentinel consumes its own slot; the default mode
                // token doubles as the first candidate name. Expansion is
                // short-circuit, so names after the deciding one are never
                // rendered.
                let matched = mode == Mode::Any;
                let mut last_name = String::new();
                let mut found = None;
                for node in arguments.iter().skip(usize::from(mode == Mode::All)) {
                    let name = trim(node.expand()?);
                    if !name.is_empty() && sp.has_arg(&name) == matched {
                        found = Some(if matched {
                            name.into_owned()
                        } else {
                            String::new()
                        });
                        break;
                    }
                    last_name = name.into_owned();
                }

                let result = found.unwrap_or(if matched { String::new() } else { last_name });
                sp.set_last_match(result.clone());
                write!(out, "{result}")?;
            }
        }

        Ok(OutputMode::Literal)
    }

    /// `{{#getparam: template [| separator] }}`
    ///
    /// Gets all the available arguments for a specific template, in
    /// declaration order.
    pub fn get_param(
        out: &mut String,
        state: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        /// An argument declaration: a literal `{{{`, optionally preceded by
        /// the `-{` conversion onset, then a name running to `|`, `{`, or
        /// `}`.
        static DECLARATION: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?:-\{)?\{\{\{\s*([^|{}]+)").unwrap());

        let Some(template) = arguments.eval(0)?.map(trim) else {
            return Ok(OutputMode::Literal);
        };

        let text = if state.host.is_valid_title(&template) {
            let Some(text) = state.host.fetch_template_text(&template) else {
                log::debug!("getparam: no template {template}");
                return Ok(OutputMode::Literal);
            };
            text
        } else {
            String::new()
        };

        let mut names = IndexSet::new();
        for (_, [name]) in DECLARATION.captures_iter(&text).map(|c| c.extract()) {
            names.insert(name);
        }

        let separator = arguments.eval(1)?.map_or(Cow::Borrowed(""), trim);
        let separator = state.host.unstrip_nowiki(&separator).replace(r"\n", "\n");
        for (index, name) in names.iter().enumerate() {
            if index != 0 {
                out.push_str(&separator);
            }
            out.push_str(name);
        }

        Ok(OutputMode::Literal)
    }

    /// `{{#rawparam: name }}`
    ///
    /// Gets the unparsed value of a specific argument within a template,
    /// with sub-templates and argument placeholders left verbatim.
    pub fn raw_param(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        let sp = arguments.sp;
        if !sp.is_template() {
            return Ok(OutputMode::Literal);
        }

        let name = arguments.eval(0)?.map_or(Cow::Borrowed(""), trim);
        if !name.is_empty()
            && let Some(value) = sp.raw_arg(&name)
        {
            write!(out, "{}", value.expand_raw()?)?;
        }

        Ok(OutputMode::Literal)
    }

    /// `{{#exeparam: text }}`
    ///
    /// Passes the given wikitext through for the host to parse.
    pub fn exe_param(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{text}")?;
        }
        Ok(OutputMode::Wikitext)
    }
}

mod links {
    //! Link registration and classification functions.

    use super::*;

    /// `{{#link: title }}`
    ///
    /// Adds a template link to the current page without emitting output.
    pub fn link(
        _: &mut String,
        state: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(target) = arguments.eval(0)?.map(trim)
            && state.host.is_valid_title(&target)
        {
            state.host.add_template(&target);
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#addlink: text }}`
    ///
    /// Wraps the given text as an external or internal link if it parses as
    /// one.
    pub fn add_link(
        out: &mut String,
        state: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            let patterns =
                LinkPatterns::cached(state.host.url_protocols(), state.host.legal_title_chars())?;
            write!(out, "{}", patterns.wrap(&text))?;
        }
        Ok(OutputMode::Literal)
    }
}

mod text {
    //! String transform functions.

    use super::*;

    /// `{{#inoutro: value [| intro [| outro [| default]]] }}`
    ///
    /// Wraps a non-empty value with an intro and an outro, or falls back to
    /// the default. Only the branch that is emitted is expanded.
    pub fn in_outro(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        let value = arguments.eval(0)?.map_or(Cow::Borrowed(""), trim);
        if value.is_empty() {
            if let Some(default) = arguments.eval(3)?.map(trim) {
                write!(out, "{default}")?;
            }
        } else {
            let intro = arguments.eval(1)?.map_or(Cow::Borrowed(""), trim);
            let outro = arguments.eval(2)?.map_or(Cow::Borrowed(""), trim);
            write!(out, "{intro}{value}{outro}")?;
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#htmlencode: text }}`
    pub fn html_encode(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{}", super::encode_html(&text))?;
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#htmldecode: text }}`
    pub fn html_decode(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{}", super::decode_html(&text))?;
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#urlencodequery: query }}`
    pub fn url_encode_query(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{}", super::url_encode_query(&text))?;
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#convertspec: text }}`
    pub fn convert_spec(
        out: &mut String,
        _: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{}", super::convert_spec(&text))?;
        }
        Ok(OutputMode::Literal)
    }

    /// `{{#striptags: text }}`
    pub fn strip_tags(
        out: &mut String,
        state: &mut State<'_>,
        arguments: &IndexedArgs<'_>,
    ) -> Result<OutputMode> {
        if let Some(text) = arguments.eval(0)?.map(trim) {
            write!(out, "{}", state.host.strip_tags(&text))?;
        }
        Ok(OutputMode::Literal)
    }
}

/// Known parser functions.
static PARSER_FUNCTIONS: phf::Map<&'static str, ParserFn> = phf::phf_map! {
    "param" => args::param,
    "getparam" => args::get_param,
    "rawparam" => args::raw_param,
    "exeparam" => args::exe_param,

    "link" => links::link,
    "addlink" => links::add_link,

    "inoutro" => text::in_outro,
    "htmlencode" => text::html_encode,
    "htmldecode" => text::html_decode,
    "urlencodequery" => text::url_encode_query,
    "convertspec" => text::convert_spec,
    "striptags" => text::strip_tags,
};

/// Returns the name of every known parser function, for hook registration by
/// the host.
pub fn names() -> impl Iterator<Item = &'static str> {
    PARSER_FUNCTIONS.keys().copied()
}

/// Calls a parser function by name.
///
/// The callee is matched case-insensitively. An unknown callee produces no
/// output.
pub fn call_parser_fn(
    out: &mut String,
    state: &mut State<'_>,
    sp: &Frame<'_>,
    callee: &str,
    arguments: &[&dyn Node],
) -> Result<OutputMode> {
    let args = IndexedArgs {
        arguments,
        callee,
        sp,
    };
    if let Some(parser_fn) = PARSER_FUNCTIONS.get(callee.to_ascii_lowercase().as_str()) {
        parser_fn(out, state, &args)
    } else {
        log::warn!("unknown parser function {callee}()");
        Ok(OutputMode::Literal)
    }
}

/// Trims ASCII whitespace from the value.
///
/// MediaWiki implicitly trims the pre-expanded arguments of function hooks
/// registered without `SFH_OBJECT_ARGS`. There is no such flag concept here,
/// so every function trims its own strings.
fn trim(value: Cow<'_, str>) -> Cow<'_, str> {
    match value {
        Cow::Borrowed(value) => Cow::Borrowed(value.trim_ascii()),
        Cow::Owned(value) => Cow::Owned(value.trim_ascii().to_string()),
    }
}
