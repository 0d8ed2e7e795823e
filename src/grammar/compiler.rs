//! Rule AST compiler
//!
//! Folds each rule AST into a parser and stores it in the rule table. The
//! fold is bottom-up: text leaves stay text until the `string`, `regexp` or
//! `ref` node above them turns them into a parser.
//!
//! Every rule body is wrapped so that its result is named after the rule:
//!
//! | body result            | rule `r`          | rule `<r>`   |
//! |------------------------|-------------------|--------------|
//! | empty                  | `nil`             | `nil`        |
//! | untagged list `(a b)`  | `(r a b)`         | `(a b)`      |
//! | anything else `x`      | `(r x)`           | `x`          |

use super::ast::{Construct, RuleDecl};
use super::table::{grammar_ref, GrammarTable};
use crate::combinators::{
    choice, epsilon, hide, literal, look, map, maybe, not, plus, regex, sequence, star, RawParser,
    EPSILON,
};
use crate::error::GrammarError;
use crate::symbol::Symbol;
use crate::transform::{fold, Fold};
use crate::value::Value;
use log::{debug, trace};
use std::sync::Arc;

/// A compiled grammar: its rule table and start rule.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub table: Arc<GrammarTable>,
    pub start: Symbol,
}

/// Compile rule ASTs, as produced by [`super::bootstrap::parse_grammar`].
/// The first rule is the start rule.
pub fn compile_rules(rules: Vec<Value>) -> Result<CompiledGrammar, GrammarError> {
    let decls = rules
        .into_iter()
        .map(RuleDecl::from_ast)
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = GrammarTable::new();
    for decl in &decls {
        table.declare(decl.name)?;
    }
    let start = table.start().ok_or(GrammarError::Empty)?;
    let table = Arc::new(table);

    for decl in decls {
        trace!("compiling rule {}: {}", decl.name, decl.body);
        let mut builder = RuleBuilder {
            table: &table,
            rule: decl.name,
        };
        let body = match fold(decl.body, &mut builder)? {
            Compiled::Parser(parser) => parser,
            Compiled::Text(text) => {
                return Err(GrammarError::Malformed(format!(
                    "rule '{}' has bare text {:?} as its body",
                    decl.name, text
                )))
            }
        };
        table.define(decl.name, named_rule(decl.name, decl.transparent, body))?;
    }

    debug!("compiled {} rules, start rule {}", table.len(), start);
    Ok(CompiledGrammar { table, start })
}

/// Intermediate fold result.
enum Compiled {
    Text(String),
    Parser(RawParser),
}

struct RuleBuilder<'t> {
    table: &'t Arc<GrammarTable>,
    /// Rule being compiled, for error messages.
    rule: Symbol,
}

impl RuleBuilder<'_> {
    fn build(
        &self,
        construct: Construct,
        children: Vec<Compiled>,
    ) -> Result<RawParser, GrammarError> {
        let parser = match construct {
            Construct::Literal => literal(self.text(construct, children)?),
            Construct::Regex => {
                let pattern = self.text(construct, children)?;
                regex(&pattern).map_err(|err| GrammarError::InvalidRegex {
                    rule: self.rule.to_string(),
                    pattern: pattern.clone(),
                    message: err.to_string(),
                })?
            }
            Construct::Reference => {
                let name = self.text(construct, children)?;
                if name == EPSILON {
                    epsilon()
                } else {
                    grammar_ref(self.table, Symbol::new(&name))
                }
            }
            Construct::Rule => self.single(construct, children)?,
            Construct::Hide => hide(self.single(construct, children)?),
            Construct::Group => group(self.single(construct, children)?),
            Construct::Optional => maybe(self.single(construct, children)?),
            Construct::Star => star(self.single(construct, children)?),
            Construct::Plus => plus(self.single(construct, children)?),
            Construct::Lookahead => look(self.single(construct, children)?),
            Construct::Negation => not(self.single(construct, children)?),
            Construct::Sequence => sequence(self.parsers(construct, children)?),
            Construct::Choice => choice(self.parsers(construct, children)?),
            Construct::RuleName => {
                return Err(self.malformed(construct, "not allowed in a rule body"))
            }
        };
        Ok(parser)
    }

    fn text(
        &self,
        construct: Construct,
        children: Vec<Compiled>,
    ) -> Result<String, GrammarError> {
        let mut children = children.into_iter();
        match (children.next(), children.next()) {
            (Some(Compiled::Text(text)), None) => Ok(text),
            _ => Err(self.malformed(construct, "expects a single text child")),
        }
    }

    fn single(
        &self,
        construct: Construct,
        children: Vec<Compiled>,
    ) -> Result<RawParser, GrammarError> {
        let mut parsers = self.parsers(construct, children)?;
        match parsers.len() {
            1 => Ok(parsers.remove(0)),
            _ => Err(self.malformed(construct, "expects a single operand")),
        }
    }

    fn parsers(
        &self,
        construct: Construct,
        children: Vec<Compiled>,
    ) -> Result<Vec<RawParser>, GrammarError> {
        if children.is_empty() {
            return Err(self.malformed(construct, "has no operands"));
        }
        children
            .into_iter()
            .map(|child| match child {
                Compiled::Parser(parser) => Ok(parser),
                Compiled::Text(_) => Err(self.malformed(construct, "expects parser operands")),
            })
            .collect()
    }

    fn malformed(&self, construct: Construct, problem: &str) -> GrammarError {
        GrammarError::Malformed(format!(
            "'{}' node in rule '{}' {}",
            construct.name(),
            self.rule,
            problem
        ))
    }
}

impl Fold for RuleBuilder<'_> {
    type Output = Compiled;
    type Error = GrammarError;

    fn leaf(&mut self, value: Value) -> Result<Compiled, GrammarError> {
        match value {
            Value::Text(text) => Ok(Compiled::Text(text)),
            other => Err(GrammarError::Malformed(format!(
                "unexpected {} in rule '{}'",
                other, self.rule
            ))),
        }
    }

    fn node(
        &mut self,
        tag: Option<Symbol>,
        children: Vec<Compiled>,
    ) -> Result<Compiled, GrammarError> {
        let construct = tag.and_then(Construct::from_symbol).ok_or_else(|| {
            GrammarError::Malformed(format!(
                "unknown node {} in rule '{}'",
                tag.map(Symbol::name).unwrap_or("(untagged)"),
                self.rule
            ))
        })?;
        self.build(construct, children).map(Compiled::Parser)
    }
}

/// `( ... )`: keep the group's result together as one nested list.
fn group(parser: RawParser) -> RawParser {
    map(parser, |value| {
        if value.is_empty() {
            Value::Null
        } else {
            Value::Sequence(vec![value])
        }
    })
}

fn named_rule(name: Symbol, transparent: bool, body: RawParser) -> RawParser {
    RawParser::new(move |cursor| {
        let start = cursor.position();
        match body.parse(cursor) {
            Ok(value) => {
                trace!("rule {} matched {}..{}", name, start, cursor.position());
                Ok(name_result(name, transparent, value))
            }
            Err(failure) => {
                trace!("rule {} failed at {}", name, start);
                Err(failure)
            }
        }
    })
}

/// Name a rule body's result, see the table in the module docs.
pub(crate) fn name_result(name: Symbol, transparent: bool, value: Value) -> Value {
    if value.is_empty() {
        return Value::Null;
    }
    if transparent {
        return value;
    }
    match value {
        Value::Sequence(items) if !matches!(items.first(), Some(Value::Symbol(_))) => {
            Value::tagged(name, items)
        }
        other => Value::tagged(name, vec![other]),
    }
}
