//! Bootstrap parser for the grammar notation
//!
//! The parser that reads grammar text is itself assembled from the
//! combinators, once, on first use. It reads a single rule line:
//!
//! ```text
//! line        := ws rule_name ws assign alternation ws END
//! rule_name   := '<' NAME '>' | NAME
//! assign      := '::=' | '::' | ':=' | '=' | ':'
//! alternation := sequence (ws '|' sequence)*
//! sequence    := (ws component)+
//! component   := ('!' | '&')? atom ('?' | '*' | '+')?
//! atom        := regexp | string | '(' alternation ws ')' | '<' alternation ws '>' | IDENT
//! ```
//!
//! Postfix operators bind tighter than prefix ones, so `!x*` reads as
//! `!(x*)`. A sequence or alternation of a single item is not wrapped in an
//! `and`/`or` node.
//!
//! Grammar text is split into lines before parsing. Blank lines and lines
//! starting with `//` are skipped.

use super::ast::Construct;
use crate::combinators::{
    choice, end_of_input, forward_ref, hide, literal, map, maybe, plus, regex, sequence, star,
    Forward, RawParser,
};
use crate::cursor::Cursor;
use crate::error::{GrammarError, ParseFailure};
use crate::value::Value;
use once_cell::sync::Lazy;

/// Rule names. `ε` is reserved for the end of input.
const NAME: &str = r"[A-Za-z_-][A-Za-z0-9_-]*";
/// Names that may be referenced from a rule body.
const IDENT: &str = r"[A-Za-z_-][A-Za-z0-9_-]*|ε";

static GRAMMAR_LINE: Lazy<GrammarLine> = Lazy::new(GrammarLine::build);

struct GrammarLine {
    line: RawParser,
    /// Owns the recursive slot `line` refers to.
    _alternation: Forward,
}

impl GrammarLine {
    fn build() -> Self {
        let alternation = Forward::new();

        let rule_name = map(
            pattern(&format!("<{NAME}>|{NAME}")),
            |name| Construct::RuleName.node(vec![name]),
        );
        let assign = hide(pattern("::=|::|:=|=|:"));

        let string = map(
            pattern(r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#),
            |quoted| {
                let body = quoted.as_text().map(unquote).unwrap_or_default();
                Construct::Literal.node(vec![Value::Text(unescape_string(body))])
            },
        );
        let regexp = map(
            pattern(r#"#"(?:\\.|[^"\\])*"|#'(?:\\.|[^'\\])*'"#),
            |quoted| {
                let text = quoted.as_text().unwrap_or_default();
                let quote = text.chars().nth(1).unwrap_or('"');
                let body = unquote(text.get(1..).unwrap_or_default());
                Construct::Regex.node(vec![Value::Text(unescape_regex(body, quote))])
            },
        );
        let reference = map(pattern(IDENT), |name| Construct::Reference.node(vec![name]));
        let group = map(delimited("(", &alternation, ")"), |inner| {
            Construct::Group.node(inner.into_children())
        });
        let hidden = map(delimited("<", &alternation, ">"), |inner| {
            Construct::Hide.node(inner.into_children())
        });

        let atom = choice([regexp, string, group, hidden, reference]);
        let component = map(
            sequence([maybe(pattern("[!&]")), atom, maybe(pattern("[?*+]"))]),
            apply_operators,
        );
        let items = map(plus(padded(component)), |items| {
            collapse(Construct::Sequence, items)
        });
        let more = map(
            sequence([whitespace(), hide(literal("|")), items.clone()]),
            first_child,
        );
        let body = map(sequence([items, star(more)]), |alternatives| {
            collapse(Construct::Choice, alternatives)
        });
        // The slot is fresh, so defining it cannot fail.
        let _ = alternation.define(body.clone());

        let line = end_of_input(sequence([
            whitespace(),
            rule_name,
            whitespace(),
            assign,
            map(body, |body| Construct::Rule.node(vec![body])),
            whitespace(),
        ]));

        Self {
            line,
            _alternation: alternation,
        }
    }
}

/// Parse one rule line into its AST `((rule_name NAME) (rule BODY))`.
pub fn parse_rule(line: &str) -> Result<Value, ParseFailure> {
    let mut cursor = Cursor::new(line);
    GRAMMAR_LINE
        .line
        .parse(&mut cursor)
        .map_err(|failure| ParseFailure::at(line, cursor.furthest().max(failure.position)))
}

/// Parse a whole grammar into rule ASTs, in declaration order.
///
/// Errors are located in `text`, not in the line that failed.
pub fn parse_grammar(text: &str) -> Result<Vec<Value>, GrammarError> {
    let mut rules = Vec::new();
    let mut line_start = 0;

    for (index, raw) in text.split('\n').enumerate() {
        let offset = line_start;
        line_start += raw.len() + 1;

        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let indent = raw.len() - raw.trim_start().len();
        let rule = parse_rule(line).map_err(|failure| {
            let position = offset + indent + failure.position;
            let columns = raw[..indent].chars().count();
            failure.relocate(position, index + 1, columns)
        })?;
        rules.push(rule);
    }

    Ok(rules)
}

fn pattern(source: &str) -> RawParser {
    regex(source).expect("bootstrap patterns are valid")
}

fn whitespace() -> RawParser {
    hide(pattern(r"\s*"))
}

/// `parser`, after optional whitespace.
fn padded(parser: RawParser) -> RawParser {
    let whitespace = whitespace();
    RawParser::new(move |cursor| {
        whitespace.parse(cursor)?;
        parser.parse(cursor)
    })
}

/// `open alternation ws close`, returning the alternation.
fn delimited(open: &str, alternation: &Forward, close: &str) -> RawParser {
    sequence([
        hide(literal(open)),
        padded(forward_ref(alternation)),
        whitespace(),
        hide(literal(close)),
    ])
}

/// Wrap an atom in its prefix and postfix operator nodes.
fn apply_operators(parts: Value) -> Value {
    let mut prefix = None;
    let mut suffix = None;
    let mut atom = Value::Null;

    for part in parts.into_children() {
        match part {
            Value::Text(op) if atom.is_null() => prefix = Some(op),
            Value::Text(op) => suffix = Some(op),
            node => atom = node,
        }
    }

    let atom = match suffix.as_deref() {
        Some("?") => Construct::Optional.node(vec![atom]),
        Some("*") => Construct::Star.node(vec![atom]),
        Some("+") => Construct::Plus.node(vec![atom]),
        _ => atom,
    };
    match prefix.as_deref() {
        Some("!") => Construct::Negation.node(vec![atom]),
        Some("&") => Construct::Lookahead.node(vec![atom]),
        _ => atom,
    }
}

/// A single item stands for itself; several become one `construct` node.
fn collapse(construct: Construct, items: Value) -> Value {
    let mut items = items.into_children();
    if items.len() == 1 {
        items.remove(0)
    } else {
        construct.node(items)
    }
}

fn first_child(value: Value) -> Value {
    value.into_children().into_iter().next().unwrap_or_default()
}

/// Strip the surrounding quotes of a quoted token.
fn unquote(quoted: &str) -> &str {
    quoted.get(1..quoted.len().saturating_sub(1)).unwrap_or_default()
}

/// Resolve backslash escapes in a string literal.
fn unescape_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Regex bodies keep their escapes, except for the escaped quote.
fn unescape_regex(body: &str, quote: char) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == quote => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(line: &str) -> String {
        let ast = parse_rule(line).unwrap();
        ast.children()[1].children()[0].to_string()
    }

    #[test]
    fn test_rule_line_shape() {
        let ast = parse_rule("def = 'a'").unwrap();
        assert_eq!(ast.to_string(), r#"((rule_name "def") (rule (string "a")))"#);
    }

    #[test]
    fn test_transparent_name_and_assign_operators() {
        let lines = [
            "<ows> = 'a'",
            "<ows> := 'a'",
            "<ows> : 'a'",
            "<ows> :: 'a'",
            "<ows> ::= 'a'",
        ];
        for line in lines {
            let ast = parse_rule(line).unwrap();
            assert_eq!(ast.children()[0].to_string(), r#"(rule_name "<ows>")"#, "{}", line);
        }
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(body("a = !x*"), r#"(not (star (ref "x")))"#);
        assert_eq!(body("a = &'x'?"), r#"(look (maybe (string "x")))"#);
        assert_eq!(
            body("a = x y | z"),
            r#"(or (and (ref "x") (ref "y")) (ref "z"))"#
        );
        assert_eq!(
            body("a = x | y | z"),
            r#"(or (ref "x") (ref "y") (ref "z"))"#
        );
    }

    #[test]
    fn test_group_and_hide() {
        assert_eq!(body("a = ( x )"), r#"(group (ref "x"))"#);
        assert_eq!(body("a = <x y>"), r#"(hide (and (ref "x") (ref "y")))"#);
        assert_eq!(
            body("a = (x | <y>)+"),
            r#"(plus (group (or (ref "x") (hide (ref "y")))))"#
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(body(r#"a = "say \"hi\"\n""#), r#"(string "say \"hi\"\n")"#);
        assert_eq!(body(r"a = 'it\'s'"), r#"(string "it's")"#);
    }

    #[test]
    fn test_regex_keeps_escapes() {
        assert_eq!(body(r#"a = #"\s+""#), r#"(regexp "\\s+")"#);
        assert_eq!(body(r#"a = #"\"[^\"]*\"""#), r#"(regexp "\"[^\"]*\"")"#);
        assert_eq!(body(r"a = #'\d'"), r#"(regexp "\\d")"#);
    }

    #[test]
    fn test_epsilon_reference() {
        assert_eq!(body("a = <ε> | b"), r#"(or (hide (ref "ε")) (ref "b"))"#);
    }

    #[test]
    fn test_epsilon_cannot_name_a_rule() {
        assert!(parse_rule("ε = 'a'").is_err());
        assert!(parse_rule("<ε> = 'a'").is_err());
        assert!(parse_rule("a = ε").is_ok());
    }

    #[test]
    fn test_invalid_line() {
        assert!(parse_rule("= 'a'").is_err());
        assert!(parse_rule("a = ").is_err());
        assert!(parse_rule("a = (x").is_err());
        assert!(parse_rule("a = 'unterminated").is_err());
    }

    #[test]
    fn test_grammar_skips_comments_and_blank_lines() {
        let rules = parse_grammar("\n// first\na = 'x'\n\n   \n  // second\nb = a\n").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_grammar_error_is_located_in_grammar_text() {
        let err = parse_grammar("a = 'x'\n// c\n  b = (y\n").unwrap_err();
        match err {
            GrammarError::Syntax(failure) => {
                assert_eq!(failure.line, 3);
                assert_eq!(failure.column, 9);
                assert_eq!(failure.position, 21);
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}
