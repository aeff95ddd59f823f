//! Template invocation frames and lazily evaluated arguments.

use crate::Result;
use core::fmt;
use std::{borrow::Cow, cell::RefCell, collections::HashMap};

/// A host-side handle to an unexpanded preprocessor node.
///
/// Parser functions receive their arguments unexpanded and evaluate them on
/// demand so that unused branches are never rendered. Frames hold the same
/// handles for the values of template arguments.
pub trait Node {
    /// Fully expands the node in its owning frame.
    fn expand(&self) -> Result<Cow<'_, str>>;

    /// Expands the node while leaving sub-templates and argument
    /// placeholders verbatim.
    fn expand_raw(&self) -> Result<Cow<'_, str>> {
        self.expand()
    }
}

/// Flat text needs no expansion.
impl Node for str {
    fn expand(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

/// A template transclusion frame.
///
/// Holds the argument bindings created when the host expands one template
/// invocation, plus the memo used by the recall mode of `{{#param:}}`. The
/// argument maps are never mutated by this crate; the memo lives and dies
/// with the frame, so parallel expansions of different frames cannot observe
/// each other's matches.
pub struct Frame<'a> {
    /// Arguments supplied as `key=value`, keyed by declared name.
    named: HashMap<String, &'a dyn Node>,
    /// Positional arguments, keyed by decimal index.
    numbered: HashMap<String, &'a dyn Node>,
    /// Whether this frame was created by a template transclusion.
    is_template: bool,
    /// The result of the most recent `{{#param:}}` match in this frame.
    last_match: RefCell<Option<String>>,
}

impl<'a> Frame<'a> {
    /// Creates a frame for a template transclusion with the given argument
    /// bindings.
    pub fn template(
        named: HashMap<String, &'a dyn Node>,
        numbered: HashMap<String, &'a dyn Node>,
    ) -> Self {
        Self {
            named,
            numbered,
            is_template: true,
            last_match: <_>::default(),
        }
    }

    /// Creates the frame of a page rendered outside any transclusion.
    pub fn top() -> Self {
        Self {
            named: <_>::default(),
            numbered: <_>::default(),
            is_template: false,
            last_match: <_>::default(),
        }
    }

    /// Returns true if the frame was created by a template transclusion.
    pub fn is_template(&self) -> bool {
        self.is_template
    }

    /// Returns true if an argument with the given declared name or index was
    /// passed to the template.
    pub fn has_arg(&self, name: &str) -> bool {
        self.named.contains_key(name) || self.numbered.contains_key(name)
    }

    /// Returns the unexpanded value of the argument with the given name.
    ///
    /// Named arguments shadow numbered ones.
    pub fn raw_arg(&self, name: &str) -> Option<&'a dyn Node> {
        self.named
            .get(name)
            .or_else(|| self.numbered.get(name))
            .copied()
    }

    /// Returns the memoized result of the most recent match.
    pub(crate) fn last_match(&self) -> Option<String> {
        self.last_match.borrow().clone()
    }

    /// Memoizes a match result.
    pub(crate) fn set_last_match(&self, value: String) {
        *self.last_match.borrow_mut() = Some(value);
    }
}

impl fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("is_template", &self.is_template)
            .field("named", &self.named.keys())
            .field("numbered", &self.numbered.keys())
            .field("last_match", &self.last_match)
            .finish()
    }
}

/// A helper for handling the argument list of a parser function call.
pub struct IndexedArgs<'a> {
    /// The raw arguments passed to the function.
    pub arguments: &'a [&'a dyn Node],
    /// The name of the callee.
    pub callee: &'a str,
    /// The frame the call was made from.
    pub sp: &'a Frame<'a>,
}

impl<'a> IndexedArgs<'a> {
    /// Evaluates the argument at the given index.
    ///
    /// The returned value includes any leading and trailing whitespace
    /// present in the original text.
    pub fn eval(&self, index: usize) -> Result<Option<Cow<'a, str>>> {
        self.arguments
            .get(index)
            .map(|node| (*node).expand())
            .transpose()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Returns an iterator over the raw arguments.
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Node> {
        self.arguments.iter().copied()
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_lookup() {
        let named = HashMap::from([("style".to_string(), "bold" as &dyn Node)]);
        let numbered = HashMap::from([
            ("1".to_string(), "first" as &dyn Node),
            ("style".to_string(), "shadowed" as &dyn Node),
        ]);
        let frame = Frame::template(named, numbered);

        assert!(frame.is_template());
        assert!(frame.has_arg("style"));
        assert!(frame.has_arg("1"));
        assert!(!frame.has_arg("2"));
        assert_eq!(
            frame.raw_arg("style").unwrap().expand().unwrap(),
            "bold",
            "named argument should shadow a numbered one"
        );
        assert_eq!(frame.raw_arg("1").unwrap().expand().unwrap(), "first");
        assert!(frame.raw_arg("missing").is_none());
    }

    #[test]
    fn test_top_frame() {
        let frame = Frame::top();
        assert!(!frame.is_template());
        assert!(!frame.has_arg("1"));
        assert_eq!(frame.last_match(), None);
    }
}
