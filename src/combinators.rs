//! Parser combinators
//!
//! Every parser is a [`RawParser`]: a shared function from a [`Cursor`] to a
//! [`ParseResult`]. On success it has advanced the cursor past what it
//! matched; on failure it returns a [`Failure`]. Whether the cursor is rewound
//! after a failure is up to the caller: `choice`, `maybe`, `star`, `look` and
//! `not` rewind, `sequence` does not.
//!
//! Primitives:
//!
//! - [`literal`] matches an exact string
//! - [`regex`] matches a regular expression anchored at the cursor
//! - [`epsilon`] matches the end of input
//!
//! Combinators build a parser out of other parsers:
//!
//! ```text
//! sequence  choice  maybe  star  plus  look  not  hide  map  end_of_input
//! ```
//!
//! Recursive parsers are tied together with a [`Forward`] slot and
//! [`forward_ref`], or, for compiled grammars, through the rule table (see
//! [`crate::grammar::table::grammar_ref`]).

use crate::cursor::Cursor;
use crate::error::ParseResult;
use crate::value::Value;
use log::warn;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Tag of the node returned by [`epsilon`].
pub const EPSILON: &str = "ε";

type ParseFn = dyn Fn(&mut Cursor<'_>) -> ParseResult + Send + Sync;

/// A cursor-based parser. Cheap to clone, safe to share between threads.
#[derive(Clone)]
pub struct RawParser(Arc<ParseFn>);

impl RawParser {
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&mut Cursor<'_>) -> ParseResult + Send + Sync + 'static,
    {
        Self(Arc::new(parse))
    }

    pub fn parse(&self, cursor: &mut Cursor<'_>) -> ParseResult {
        (self.0)(cursor)
    }

    /// Run the parser on a fresh cursor over `input`.
    pub fn parse_str(&self, input: &str) -> ParseResult {
        self.parse(&mut Cursor::new(input))
    }
}

impl fmt::Debug for RawParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawParser(..)")
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Match `text` exactly and return it.
pub fn literal(text: impl Into<String>) -> RawParser {
    let text = text.into();
    RawParser::new(move |cursor| {
        if cursor.read(text.len()) == text {
            cursor.advance(text.len());
            Ok(Value::Text(text.clone()))
        } else {
            Err(cursor.fail())
        }
    })
}

/// Match `pattern` at the cursor and return the matched text.
///
/// The pattern is anchored to the current position, so `a+` does not match
/// `"baa"`.
pub fn regex(pattern: &str) -> Result<RawParser, regex::Error> {
    let regex = Regex::new(&format!("^(?:{})", pattern))?;
    Ok(RawParser::new(move |cursor| {
        match regex.find(cursor.read_to_end()) {
            Some(found) => {
                let text = found.as_str().to_string();
                cursor.advance(found.end());
                Ok(Value::Text(text))
            }
            None => Err(cursor.fail()),
        }
    }))
}

/// Succeed only at the end of input, returning the node `(ε)`.
pub fn epsilon() -> RawParser {
    RawParser::new(|cursor| {
        if cursor.is_at_end() {
            Ok(Value::tagged(EPSILON, Vec::new()))
        } else {
            Err(cursor.fail())
        }
    })
}

// ============================================================================
// Combinators
// ============================================================================

/// Run every parser in order; fail as soon as one fails.
///
/// The result is one flat list: untagged lists returned by a child are
/// spliced in, tagged nodes stay nested, empty results are dropped. The
/// cursor is not rewound on failure.
pub fn sequence(parsers: impl IntoIterator<Item = RawParser>) -> RawParser {
    let parsers: Vec<RawParser> = parsers.into_iter().collect();
    RawParser::new(move |cursor| {
        let mut outputs = Vec::new();
        for parser in &parsers {
            splice_into(&mut outputs, parser.parse(cursor)?);
        }
        Ok(Value::Sequence(outputs))
    })
}

/// Add `value` to a sequence's outputs, flattening untagged lists.
pub(crate) fn splice_into(outputs: &mut Vec<Value>, value: Value) {
    match value {
        Value::Sequence(items) if !items.is_empty() && !matches!(items[0], Value::Symbol(_)) => {
            outputs.extend(items)
        }
        other if !other.is_empty() => outputs.push(other),
        _ => {}
    }
}

/// Ordered choice: the first parser that succeeds wins.
pub fn choice(parsers: impl IntoIterator<Item = RawParser>) -> RawParser {
    let parsers: Vec<RawParser> = parsers.into_iter().collect();
    RawParser::new(move |cursor| {
        let start = cursor.position();
        for parser in &parsers {
            match parser.parse(cursor) {
                Ok(value) => return Ok(value),
                Err(_) => cursor.restore(start),
            }
        }
        Err(cursor.fail())
    })
}

/// Optional: `parser`'s value, or `Null` without consuming anything.
pub fn maybe(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let start = cursor.position();
        match parser.parse(cursor) {
            Ok(value) => Ok(value),
            Err(_) => {
                cursor.restore(start);
                Ok(Value::Null)
            }
        }
    })
}

/// Zero or more repetitions. Never fails; `Null` when nothing matched.
pub fn star(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| Ok(repeat(&parser, cursor, Vec::new())))
}

/// One or more repetitions. The first occurrence is mandatory.
pub fn plus(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let first = parser.parse(cursor)?;
        let outputs = if first.is_empty() { Vec::new() } else { vec![first] };
        Ok(repeat(&parser, cursor, outputs))
    })
}

/// Greedy repetition shared by `star` and `plus`.
///
/// Stops at the first failure, and also at the first success that consumed
/// nothing, which would otherwise loop forever.
fn repeat(parser: &RawParser, cursor: &mut Cursor<'_>, mut outputs: Vec<Value>) -> Value {
    loop {
        let start = cursor.position();
        match parser.parse(cursor) {
            Ok(value) if cursor.position() > start => {
                if !value.is_empty() {
                    outputs.push(value);
                }
            }
            Ok(_) | Err(_) => {
                cursor.restore(start);
                break;
            }
        }
    }

    if outputs.is_empty() {
        Value::Null
    } else {
        Value::Sequence(outputs)
    }
}

/// Positive lookahead: succeed with `Null` iff `parser` matches here.
/// Never consumes input.
pub fn look(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let result = lookahead(&parser, cursor);
        match result {
            Ok(_) => Ok(Value::Null),
            Err(_) => Err(cursor.fail()),
        }
    })
}

/// Negative lookahead: succeed with `Null` iff `parser` does not match here.
/// Never consumes input.
pub fn not(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let result = lookahead(&parser, cursor);
        match result {
            Ok(_) => Err(cursor.fail()),
            Err(_) => Ok(Value::Null),
        }
    })
}

/// Run `parser` without moving the cursor. Failures inside it are not on
/// the parse path, so they do not count towards the furthest failure.
fn lookahead(parser: &RawParser, cursor: &mut Cursor<'_>) -> ParseResult {
    let start = cursor.position();
    let furthest = cursor.furthest();
    let result = parser.parse(cursor);
    cursor.restore(start);
    cursor.restore_furthest(furthest);
    result
}

/// Consume what `parser` matches but return `Null`.
pub fn hide(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| parser.parse(cursor).map(|_| Value::Null))
}

/// Transform the value of a successful parse.
pub fn map<F>(parser: RawParser, f: F) -> RawParser
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    RawParser::new(move |cursor| parser.parse(cursor).map(&f))
}

/// Run `parser`, then require that no input is left.
pub fn end_of_input(parser: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let value = parser.parse(cursor)?;
        if cursor.is_at_end() {
            Ok(value)
        } else {
            Err(cursor.fail())
        }
    })
}

// ============================================================================
// Forward references
// ============================================================================

/// A parser slot that is filled in after it is referenced.
///
/// ```text
/// let expr = Forward::new();
/// let parens = sequence([literal("("), maybe(forward_ref(&expr)), literal(")")]);
/// expr.define(parens)?;
/// ```
///
/// Parsers returned by [`forward_ref`] only hold a weak handle on the slot,
/// so a parser that refers to itself is not kept alive by that cycle. Keep
/// the `Forward` (or a clone) alive as long as its parsers are in use.
#[derive(Debug, Clone, Default)]
pub struct Forward {
    slot: Arc<OnceCell<RawParser>>,
}

impl Forward {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the slot. A slot can only be bound once; a second call hands the
    /// parser back.
    pub fn define(&self, parser: RawParser) -> Result<(), RawParser> {
        self.slot.set(parser)
    }

    pub fn is_defined(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// A parser that delegates to whatever `forward` is bound to at call time.
pub fn forward_ref(forward: &Forward) -> RawParser {
    let slot = Arc::downgrade(&forward.slot);
    RawParser::new(move |cursor| {
        let Some(cell) = slot.upgrade() else {
            warn!("forward reference used after its slot was dropped");
            return Err(cursor.fail());
        };
        match cell.get() {
            Some(parser) => parser.parse(cursor),
            None => {
                warn!("forward reference used before it was defined");
                Err(cursor.fail())
            }
        }
    })
}
