//! Grammar notation
//!
//! A grammar is written one rule per line:
//!
//! ```text
//! // comments and blank lines are skipped
//! name      = firstname <" "> lastname
//! firstname = #"[A-Z][a-z]+"
//! <ows>     = #"\s*"
//! ```
//!
//! Compiling it happens in two passes. [`bootstrap`] parses each line with
//! combinators built by hand into a rule AST, and [`compiler`] folds those
//! ASTs into parsers stored in a [`table::GrammarTable`].

pub mod ast;
pub mod bootstrap;
pub mod compiler;
pub mod table;
