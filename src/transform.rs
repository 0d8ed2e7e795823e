//! Bottom-up tree transformation
//!
//! One traversal serves two purposes: compiling grammar ASTs into parsers
//! and folding parse trees into application values. Both are [`Fold`]
//! implementations driven by [`fold`]:
//!
//! 1. A non-sequence value is a leaf and goes to [`Fold::leaf`].
//! 2. A sequence has every child folded first (post-order), then the node is
//!    handed to [`Fold::node`] with its tag, if it has one, and the folded
//!    children.
//!
//! Callers normally use [`transform`] with a [`Handlers`] table instead of
//! implementing `Fold` themselves:
//!
//! ```text
//! tree:     (root (string "hello") (int "4"))
//! handlers: int    -> parse the text as a number
//!           string -> the text itself
//! result:   (root "hello" 4)
//! ```

use crate::symbol::Symbol;
use crate::value::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

/// A post-order traversal over [`Value`] trees.
pub trait Fold {
    type Output;
    type Error;

    /// Fold a leaf: null, text or a bare symbol.
    fn leaf(&mut self, value: Value) -> Result<Self::Output, Self::Error>;

    /// Fold a sequence whose children are already folded. `tag` is the
    /// leading symbol of a tagged node, `None` for an untagged list.
    fn node(
        &mut self,
        tag: Option<Symbol>,
        children: Vec<Self::Output>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Fold `tree` bottom-up with `folder`.
pub fn fold<F: Fold + ?Sized>(tree: Value, folder: &mut F) -> Result<F::Output, F::Error> {
    match tree {
        Value::Sequence(items) => {
            let mut items = items.into_iter().peekable();
            let tag = match items.peek() {
                Some(Value::Symbol(symbol)) => Some(*symbol),
                _ => None,
            };
            if tag.is_some() {
                items.next();
            }

            let mut children = Vec::with_capacity(items.len());
            for item in items {
                children.push(fold(item, folder)?);
            }
            folder.node(tag, children)
        }
        leaf => folder.leaf(leaf),
    }
}

/// A type parse trees can be folded into.
///
/// Values reach handlers already converted, so a domain type usually has a
/// variant that keeps raw leaves and unhandled nodes around.
pub trait TreeValue: Sized {
    fn from_leaf(value: Value) -> Self;

    /// Rebuild a node no handler was registered for.
    fn from_node(tag: Option<Symbol>, children: Vec<Self>) -> Self;
}

impl TreeValue for Value {
    fn from_leaf(value: Value) -> Self {
        value
    }

    fn from_node(tag: Option<Symbol>, children: Vec<Self>) -> Self {
        match tag {
            Some(tag) => Value::tagged(tag, children),
            None => Value::Sequence(children),
        }
    }
}

type Handler<T> = Box<dyn Fn(Vec<T>) -> T + Send + Sync>;

/// Per-tag handlers for [`transform`].
pub struct Handlers<T = Value> {
    handlers: HashMap<Symbol, Handler<T>>,
}

impl<T> Handlers<T> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for nodes tagged `tag`, builder style.
    pub fn on<F>(mut self, tag: impl Into<Symbol>, handler: F) -> Self
    where
        F: Fn(Vec<T>) -> T + Send + Sync + 'static,
    {
        self.insert(tag, handler);
        self
    }

    /// Register `handler` for nodes tagged `tag`, replacing any previous one.
    pub fn insert<F>(&mut self, tag: impl Into<Symbol>, handler: F)
    where
        F: Fn(Vec<T>) -> T + Send + Sync + 'static,
    {
        self.handlers.insert(tag.into(), Box::new(handler));
    }

    pub fn get(&self, tag: Symbol) -> Option<&(dyn Fn(Vec<T>) -> T + Send + Sync)> {
        self.handlers.get(&tag).map(|handler| handler.as_ref())
    }

    pub fn contains(&self, tag: Symbol) -> bool {
        self.handlers.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Handlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl<T: TreeValue> Fold for &Handlers<T> {
    type Output = T;
    type Error = Infallible;

    fn leaf(&mut self, value: Value) -> Result<T, Infallible> {
        Ok(T::from_leaf(value))
    }

    fn node(&mut self, tag: Option<Symbol>, children: Vec<T>) -> Result<T, Infallible> {
        match tag.and_then(|tag| self.get(tag)) {
            Some(handler) => Ok(handler(children)),
            None => Ok(T::from_node(tag, children)),
        }
    }
}

/// Fold `tree` into a `T`, calling the handler registered for each node's
/// tag with the node's already-transformed children. Nodes without a handler
/// are rebuilt with [`TreeValue::from_node`].
pub fn transform<T: TreeValue>(tree: Value, handlers: &Handlers<T>) -> T {
    let mut folder = handlers;
    match fold(tree, &mut folder) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Value {
        Value::tagged(
            "root",
            vec![
                Value::tagged("string", vec![Value::text("hello")]),
                Value::tagged("int", vec![Value::text("4")]),
            ],
        )
    }

    /// Records the order nodes are visited in.
    struct Visit(Vec<String>);

    impl Fold for Visit {
        type Output = ();
        type Error = Infallible;

        fn leaf(&mut self, value: Value) -> Result<(), Infallible> {
            self.0.push(value.to_string());
            Ok(())
        }

        fn node(&mut self, tag: Option<Symbol>, _: Vec<()>) -> Result<(), Infallible> {
            self.0.push(tag.map(|t| t.to_string()).unwrap_or_default());
            Ok(())
        }
    }

    #[test]
    fn test_fold_is_post_order() {
        let mut visit = Visit(Vec::new());
        fold(tree(), &mut visit).unwrap();
        assert_eq!(visit.0, vec!["\"hello\"", "string", "\"4\"", "int", "root"]);
    }

    #[test]
    fn test_atoms_pass_through() {
        let handlers = Handlers::<Value>::new().on("x", |_| Value::Null);
        assert_eq!(transform(Value::text("a"), &handlers), Value::text("a"));
        assert_eq!(transform(Value::Null, &handlers), Value::Null);
    }

    #[test]
    fn test_transform_without_handlers_rebuilds_tree() {
        let handlers = Handlers::<Value>::new();
        assert_eq!(transform(tree(), &handlers), tree());
    }

    #[test]
    fn test_transform_replaces_handled_nodes() {
        let handlers = Handlers::<Value>::new()
            .on("int", |children| {
                let n: i64 = children[0].as_text().unwrap().parse().unwrap();
                Value::text(format!("int:{}", n))
            })
            .on("string", |mut children| children.remove(0));
        let expected = Value::tagged("root", vec![Value::text("hello"), Value::text("int:4")]);
        assert_eq!(transform(tree(), &handlers), expected);
    }

    #[test]
    fn test_handlers_see_transformed_children() {
        let handlers = Handlers::<Value>::new()
            .on("string", |mut children| children.remove(0))
            .on("int", |mut children| children.remove(0))
            .on("root", |children| {
                let word = children[0].as_text().unwrap();
                let times: usize = children[1].as_text().unwrap().parse().unwrap();
                Value::text(word.repeat(times))
            });
        assert_eq!(
            transform(tree(), &handlers),
            Value::text("hellohellohellohello")
        );
    }

    #[test]
    fn test_untagged_lists_are_rebuilt() {
        let list = Value::Sequence(vec![
            Value::text("a"),
            Value::tagged("int", vec![Value::text("1")]),
        ]);
        let handlers = Handlers::<Value>::new().on("int", |mut c| c.remove(0));
        assert_eq!(
            transform(list, &handlers),
            Value::Sequence(vec![Value::text("a"), Value::text("1")])
        );
    }

    #[derive(Debug, PartialEq)]
    enum Calc {
        Num(i64),
        Raw(Value),
        List(Vec<Calc>),
    }

    impl TreeValue for Calc {
        fn from_leaf(value: Value) -> Self {
            Calc::Raw(value)
        }

        fn from_node(_: Option<Symbol>, children: Vec<Self>) -> Self {
            Calc::List(children)
        }
    }

    #[test]
    fn test_transform_into_domain_type() {
        let handlers = Handlers::new()
            .on("int", |children: Vec<Calc>| match &children[0] {
                Calc::Raw(Value::Text(t)) => Calc::Num(t.parse().unwrap()),
                _ => Calc::Num(0),
            })
            .on("sum", |children: Vec<Calc>| {
                Calc::Num(
                    children
                        .iter()
                        .map(|c| if let Calc::Num(n) = c { *n } else { 0 })
                        .sum(),
                )
            });
        let tree = Value::tagged(
            "sum",
            vec![
                Value::tagged("int", vec![Value::text("40")]),
                Value::tagged("int", vec![Value::text("2")]),
            ],
        );
        assert_eq!(transform(tree, &handlers), Calc::Num(42));
        assert_eq!(handlers.len(), 2);
        assert!(handlers.contains(Symbol::new("sum")));
    }
}
