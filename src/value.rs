//! Parse values and tagged trees
//!
//! Every parser returns a [`Value`]. There is one tree shape for everything:
//! grammar ASTs produced by the bootstrap parser and the trees produced by
//! compiled grammars alike.
//!
//! A *tagged node* is a `Sequence` whose first element is a `Symbol`:
//!
//! ```text
//! (name "a" (other "b"))   ==   Sequence[Symbol(name), Text(a), Sequence[Symbol(other), Text(b)]]
//! ```
//!
//! A sequence without a leading symbol is an untagged list. Sequence
//! composition splices untagged lists into their parent and keeps tagged
//! nodes nested, see [`crate::combinators::sequence`].

use crate::symbol::Symbol;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Hidden or absent result.
    #[default]
    Null,
    /// Text matched by a literal or a regular expression.
    Text(String),
    Symbol(Symbol),
    Sequence(Vec<Value>),
}

impl Value {
    /// Build a tagged node `[tag, ...children]`.
    pub fn tagged(tag: impl Into<Symbol>, children: Vec<Value>) -> Self {
        let mut items = Vec::with_capacity(children.len() + 1);
        items.push(Value::Symbol(tag.into()));
        items.extend(children);
        Value::Sequence(items)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// The tag of a tagged node.
    pub fn tag(&self) -> Option<Symbol> {
        match self {
            Value::Sequence(items) => match items.first() {
                Some(Value::Symbol(symbol)) => Some(*symbol),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.tag().is_some()
    }

    /// The children of a sequence, without the tag of a tagged node.
    pub fn children(&self) -> &[Value] {
        match self {
            Value::Sequence(items) if self.is_tagged() => &items[1..],
            Value::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Consume a sequence into its children, dropping the tag if any.
    pub fn into_children(self) -> Vec<Value> {
        let tagged = self.is_tagged();
        match self {
            Value::Sequence(mut items) => {
                if tagged {
                    items.remove(0);
                }
                items
            }
            _ => Vec::new(),
        }
    }

    /// Whether the value counts as "nothing": null, empty text, empty sequence.
    ///
    /// Empty values are dropped from sequences and turn a named rule's
    /// result into `Null`.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.is_empty(),
            Value::Symbol(_) => false,
            Value::Sequence(items) => items.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Render the tree as JSON, see the `Serialize` impl for the shape.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Value::Symbol(symbol)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

/// S-expression rendering: `(name "a" ("b" "c"))`, `nil` for null.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("nil"),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::Sequence(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Tagged nodes serialize as `{"tag": [children...]}`, untagged sequences as
/// arrays, text as strings, null as null and bare symbols as their name.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Symbol(symbol) => serializer.serialize_str(symbol.name()),
            Value::Sequence(items) => match self.tag() {
                Some(tag) => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    map.serialize_entry(tag.name(), &items[1..])?;
                    map.end()
                }
                None => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
            },
        }
    }
}
