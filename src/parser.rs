//! Compiled grammars
//!
//! [`compile`] turns grammar text into a [`Parser`]:
//!
//! ```text
//! let parser = compile(r#"greeting = "hello" <#"\s+"> name
//!                         name = #"[a-z]+""#)?;
//! parser.parse("hello bob")?   // (greeting "hello" (name "bob"))
//! ```

use crate::combinators::{end_of_input, RawParser};
use crate::cursor::Cursor;
use crate::error::{GrammarError, ParseFailure};
use crate::grammar::bootstrap::parse_grammar;
use crate::grammar::compiler::{compile_rules, CompiledGrammar};
use crate::grammar::table::GrammarTable;
use crate::symbol::{Symbol, SymbolRegistry};
use crate::value::Value;
use serde::Deserialize;
use std::sync::Arc;

/// Options for [`compile_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Accept input the start rule matches only a prefix of. When false,
    /// the whole input must be consumed.
    pub partial: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { partial: true }
    }
}

impl CompileOptions {
    /// Options requiring the whole input to match.
    pub fn complete() -> Self {
        Self { partial: false }
    }
}

/// A compiled grammar, ready to parse.
///
/// Parsing never mutates the parser, so one `Parser` can serve many threads.
#[derive(Debug, Clone)]
pub struct Parser {
    table: Arc<GrammarTable>,
    start: Symbol,
    entry: RawParser,
    options: CompileOptions,
}

impl Parser {
    fn new(grammar: CompiledGrammar, options: CompileOptions) -> Result<Self, GrammarError> {
        let entry = grammar.table.get(grammar.start).cloned().ok_or_else(|| {
            GrammarError::Malformed(format!("start rule '{}' was not compiled", grammar.start))
        })?;
        Ok(Self {
            entry: finish(entry, options),
            table: grammar.table,
            start: grammar.start,
            options,
        })
    }

    /// Parse `input` from the start rule.
    pub fn parse(&self, input: &str) -> Result<Value, ParseFailure> {
        run(&self.entry, input)
    }

    /// Parse `input` starting from another rule of the grammar. Unknown rule
    /// names fail at offset 0.
    pub fn parse_rule(&self, rule: &str, input: &str) -> Result<Value, ParseFailure> {
        let parser = SymbolRegistry::global()
            .lookup(rule)
            .and_then(|name| self.table.get(name))
            .cloned();
        match parser {
            Some(parser) => run(&finish(parser, self.options), input),
            None => Err(ParseFailure::at(input, 0)),
        }
    }

    /// The start rule as a combinator, to embed in hand-built parsers.
    ///
    /// The returned parser keeps the grammar alive on its own.
    pub fn raw(&self) -> RawParser {
        let rooted = RootedEntry {
            _table: Arc::clone(&self.table),
            entry: self.entry.clone(),
        };
        RawParser::new(move |cursor| rooted.entry.parse(cursor))
    }

    pub fn start_rule(&self) -> Symbol {
        self.start
    }

    /// Rule names in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.table.rule_names()
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }
}

/// A start rule together with the table its references resolve through.
/// Rule references only hold the table weakly.
struct RootedEntry {
    _table: Arc<GrammarTable>,
    entry: RawParser,
}

fn finish(parser: RawParser, options: CompileOptions) -> RawParser {
    if options.partial {
        parser
    } else {
        end_of_input(parser)
    }
}

fn run(parser: &RawParser, input: &str) -> Result<Value, ParseFailure> {
    let mut cursor = Cursor::new(input);
    parser
        .parse(&mut cursor)
        .map_err(|failure| ParseFailure::at(input, cursor.furthest().max(failure.position)))
}

/// Compile `grammar` with the default options.
pub fn compile(grammar: &str) -> Result<Parser, GrammarError> {
    compile_with(grammar, CompileOptions::default())
}

pub fn compile_with(grammar: &str, options: CompileOptions) -> Result<Parser, GrammarError> {
    let rules = parse_grammar(grammar)?;
    Parser::new(compile_rules(rules)?, options)
}

/// Compile `grammar` straight to the combinator for its start rule.
pub fn compile_raw(grammar: &str, options: CompileOptions) -> Result<RawParser, GrammarError> {
    compile_with(grammar, options).map(|parser| parser.raw())
}
