//! Rule table
//!
//! Every rule of a grammar is declared before any rule is compiled, so a
//! body can refer to rules defined later in the text. References are
//! resolved by name each time they run, through a weak handle on the table:
//! rules that refer to each other do not keep the table alive, the
//! [`crate::Parser`] owning it does.

use crate::combinators::RawParser;
use crate::error::GrammarError;
use crate::symbol::Symbol;
use log::warn;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub struct GrammarTable {
    rules: HashMap<Symbol, OnceCell<RawParser>>,
    /// Declaration order; the first rule is the start rule.
    order: Vec<Symbol>,
}

impl GrammarTable {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Reserve a slot for `name`.
    pub fn declare(&mut self, name: Symbol) -> Result<(), GrammarError> {
        if self.rules.contains_key(&name) {
            return Err(GrammarError::DuplicateRule(name.to_string()));
        }
        self.rules.insert(name, OnceCell::new());
        self.order.push(name);
        Ok(())
    }

    /// Fill the slot reserved for `name`. Each slot is filled exactly once.
    pub fn define(&self, name: Symbol, parser: RawParser) -> Result<(), GrammarError> {
        let slot = self.rules.get(&name).ok_or_else(|| {
            GrammarError::Malformed(format!("rule '{}' was never declared", name))
        })?;
        slot.set(parser)
            .map_err(|_| GrammarError::DuplicateRule(name.to_string()))
    }

    pub fn get(&self, name: Symbol) -> Option<&RawParser> {
        self.rules.get(&name).and_then(OnceCell::get)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.rules.contains_key(&name)
    }

    pub fn start(&self) -> Option<Symbol> {
        self.order.first().copied()
    }

    /// Rule names in declaration order.
    pub fn rule_names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for GrammarTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GrammarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarTable")
            .field("rules", &self.order)
            .finish()
    }
}

/// A parser that runs rule `name` of `table`, looked up when it runs.
///
/// Fails without consuming input if the rule is unknown or not compiled yet.
pub fn grammar_ref(table: &Arc<GrammarTable>, name: Symbol) -> RawParser {
    let table = Arc::downgrade(table);
    RawParser::new(move |cursor| {
        let Some(table) = table.upgrade() else {
            warn!("rule '{}' used after its grammar was dropped", name);
            return Err(cursor.fail());
        };
        match table.get(name) {
            Some(rule) => rule.parse(cursor),
            None => {
                warn!("reference to undefined rule '{}'", name);
                Err(cursor.fail())
            }
        }
    })
}
