//! Rule ASTs
//!
//! The bootstrap parser describes a rule as a [`Value`] tree made of the
//! node kinds listed in [`Construct`]. A whole rule line looks like
//!
//! ```text
//! ((rule_name "def") (rule (or (ref "b") (and (ref "a") (group (ref "x"))))))
//! ```

use crate::error::GrammarError;
use crate::symbol::Symbol;
use crate::value::Value;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The node kinds of a rule AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    RuleName,
    Rule,
    Literal,
    Regex,
    Reference,
    Hide,
    Group,
    Optional,
    Star,
    Plus,
    Lookahead,
    Negation,
    Sequence,
    Choice,
}

static BY_SYMBOL: Lazy<HashMap<Symbol, Construct>> = Lazy::new(|| {
    Construct::ALL
        .iter()
        .map(|construct| (construct.symbol(), *construct))
        .collect()
});

impl Construct {
    pub const ALL: [Construct; 14] = [
        Construct::RuleName,
        Construct::Rule,
        Construct::Literal,
        Construct::Regex,
        Construct::Reference,
        Construct::Hide,
        Construct::Group,
        Construct::Optional,
        Construct::Star,
        Construct::Plus,
        Construct::Lookahead,
        Construct::Negation,
        Construct::Sequence,
        Construct::Choice,
    ];

    /// Tag used for this node kind in rule ASTs.
    pub fn name(self) -> &'static str {
        match self {
            Construct::RuleName => "rule_name",
            Construct::Rule => "rule",
            Construct::Literal => "string",
            Construct::Regex => "regexp",
            Construct::Reference => "ref",
            Construct::Hide => "hide",
            Construct::Group => "group",
            Construct::Optional => "maybe",
            Construct::Star => "star",
            Construct::Plus => "plus",
            Construct::Lookahead => "look",
            Construct::Negation => "not",
            Construct::Sequence => "and",
            Construct::Choice => "or",
        }
    }

    pub fn symbol(self) -> Symbol {
        Symbol::new(self.name())
    }

    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        BY_SYMBOL.get(&symbol).copied()
    }

    /// Build a node of this kind.
    pub fn node(self, children: Vec<Value>) -> Value {
        Value::tagged(self.symbol(), children)
    }
}

/// A rule line, split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDecl {
    pub name: Symbol,
    /// Declared as `<name>`: the rule's result is not wrapped in a node.
    pub transparent: bool,
    /// The `(rule ...)` node.
    pub body: Value,
}

impl RuleDecl {
    pub fn from_ast(ast: Value) -> Result<Self, GrammarError> {
        let malformed = |what: &str, ast: &Value| {
            GrammarError::Malformed(format!("{}: {}", what, ast))
        };
        if ast.is_tagged() {
            return Err(malformed("expected a rule name and a rule body", &ast));
        }

        let shown = ast.to_string();
        let mut parts = ast.into_children().into_iter();
        let (Some(head), Some(body), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GrammarError::Malformed(format!(
                "expected a rule name and a rule body: {}",
                shown
            )));
        };

        if head.tag() != Some(Construct::RuleName.symbol()) {
            return Err(malformed("expected a rule name", &head));
        }
        if body.tag() != Some(Construct::Rule.symbol()) {
            return Err(malformed("expected a rule body", &body));
        }

        let written = match head.children() {
            [Value::Text(name)] => name.as_str(),
            _ => return Err(malformed("expected a rule name", &head)),
        };
        let (name, transparent) = match written
            .strip_prefix('<')
            .and_then(|name| name.strip_suffix('>'))
        {
            Some(inner) => (inner, true),
            None => (written, false),
        };

        Ok(Self {
            name: Symbol::new(name),
            transparent,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_ast(name: &str) -> Value {
        Value::Sequence(vec![
            Construct::RuleName.node(vec![Value::text(name)]),
            Construct::Rule.node(vec![Construct::Literal.node(vec![Value::text("a")])]),
        ])
    }

    #[test]
    fn test_symbols_round_trip() {
        for construct in Construct::ALL {
            assert_eq!(Construct::from_symbol(construct.symbol()), Some(construct));
        }
        assert_eq!(Construct::from_symbol(Symbol::new("nope")), None);
    }

    #[test]
    fn test_rule_decl() {
        let decl = RuleDecl::from_ast(rule_ast("hello")).unwrap();
        assert_eq!(decl.name, Symbol::new("hello"));
        assert!(!decl.transparent);
        assert_eq!(decl.body.tag(), Some(Construct::Rule.symbol()));
    }

    #[test]
    fn test_transparent_rule_decl() {
        let decl = RuleDecl::from_ast(rule_ast("<ows>")).unwrap();
        assert_eq!(decl.name, Symbol::new("ows"));
        assert!(decl.transparent);
    }

    #[test]
    fn test_malformed_rule_decl() {
        let err = RuleDecl::from_ast(Value::text("x")).unwrap_err();
        assert!(matches!(err, GrammarError::Malformed(_)));

        let swapped = Value::Sequence(rule_ast("x").into_children().into_iter().rev().collect());
        assert!(RuleDecl::from_ast(swapped).is_err());
    }
}
