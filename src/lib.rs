//! # partibus
//!
//! Parser combinators, and a grammar notation compiled onto them.
//!
//! Parsers can be assembled by hand from [`combinators`], or described as a
//! grammar and compiled with [`compile`]:
//!
//! ```text
//! name      = firstname <" "> lastname
//! firstname = #"\w+"
//! lastname  = #"\w+"
//! ```
//!
//! Parsing `"Bill Smith"` with that grammar yields the tree
//! `(name (firstname "Bill") (lastname "Smith"))`, which [`transform`] folds
//! into application values.
//!
//! Each rule name may be declared once per grammar; a second declaration,
//! with or without angle brackets, is a [`GrammarError::DuplicateRule`]
//! rather than a silent redefinition.
//!
//! The modules, from the bottom up:
//!
//! - [`symbol`]: interned names used as node tags
//! - [`cursor`], [`location`]: the input and positions in it
//! - [`value`]: parse results and trees
//! - [`combinators`]: primitive parsers and ways to combine them
//! - [`transform`]: bottom-up folds over trees
//! - [`grammar`]: the grammar notation, its parser and its compiler
//! - [`parser`]: the compiled [`Parser`]

pub mod combinators;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod location;
pub mod parser;
pub mod symbol;
pub mod transform;
pub mod value;

pub use combinators::{Forward, RawParser, EPSILON};
pub use cursor::Cursor;
pub use error::{Failure, GrammarError, ParseFailure, ParseResult};
pub use parser::{compile, compile_raw, compile_with, CompileOptions, Parser};
pub use symbol::{intern, Symbol, SymbolRegistry};
pub use transform::{fold, transform, Fold, Handlers, TreeValue};
pub use value::Value;
