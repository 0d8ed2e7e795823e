//! Interned symbols
//!
//! A [`Symbol`] names a grammar rule or the kind of a tree node. Symbols are
//! interned: the registry hands out one `&'static str` per distinct name, so
//! two symbols are equal exactly when they point at the same interned string.
//! Comparison and hashing never look at the characters.
//!
//! The registry is append-only. Interned names live for the rest of the
//! process, which is what lets a `Symbol` be `Copy` and carry no lifetime.
//!
//! Most code goes through the process-wide registry ([`intern`],
//! `Symbol::from("name")`). An explicit [`SymbolRegistry`] can be built for
//! isolation, but its symbols never compare equal to symbols of another
//! registry, even for the same name.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::RwLock;

static GLOBAL: Lazy<SymbolRegistry> = Lazy::new(SymbolRegistry::new);

/// An interned, identity-compared name.
#[derive(Clone, Copy)]
pub struct Symbol(&'static str);

impl Symbol {
    /// Intern `name` in the process-wide registry.
    pub fn new(name: &str) -> Self {
        GLOBAL.intern(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.0, other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.0, state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// Intern `name` in the process-wide registry.
pub fn intern(name: &str) -> Symbol {
    GLOBAL.intern(name)
}

/// Append-only table of interned names.
pub struct SymbolRegistry {
    names: RwLock<HashMap<&'static str, Symbol>>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
        }
    }

    /// The registry behind [`intern`] and `Symbol::from`.
    pub fn global() -> &'static SymbolRegistry {
        &GLOBAL
    }

    /// Return the symbol for `name`, creating it on first use.
    ///
    /// Concurrent first uses of the same name race on the write lock; the
    /// first writer wins and every caller gets its symbol.
    pub fn intern(&self, name: &str) -> Symbol {
        if let Some(symbol) = self.lookup(name) {
            return symbol;
        }

        let mut names = self
            .names
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(symbol) = names.get(name) {
            return *symbol;
        }
        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let symbol = Symbol(leaked);
        names.insert(leaked, symbol);
        symbol
    }

    /// Return the symbol for `name` only if it was interned before.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SymbolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolRegistry")
            .field("len", &self.len())
            .finish()
    }
}
