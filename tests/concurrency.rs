//! Sharing compiled grammars between threads

use partibus::{compile, intern, Symbol, Value};
use std::sync::Arc;
use std::thread;

#[test]
fn test_one_parser_many_threads() {
    let parser = Arc::new(
        compile(
            r#"sum = number more*
more = <'+'> number
number = #'[0-9]+'"#,
        )
        .unwrap(),
    );

    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || {
                let input = vec![n.to_string(); n].join("+");
                let tree = parser.parse(&input).unwrap();
                (n, tree)
            })
        })
        .collect();

    for handle in handles {
        let (n, tree) = handle.join().unwrap();
        assert_eq!(tree.tag(), Some(Symbol::new("sum")));
        assert_eq!(tree.children().len(), n);
        assert_eq!(
            tree.children()[0],
            Value::tagged("number", vec![Value::text(n.to_string())])
        );
    }
}

#[test]
fn test_compiling_concurrently() {
    let names: Vec<Symbol> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let parser = compile(&format!("shared_rule = 'x{}'", i)).unwrap();
                    parser.start_rule()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected = intern("shared_rule");
    assert!(names.iter().all(|name| *name == expected));
}

#[test]
fn test_parses_from_scoped_threads() {
    let parser = compile("word = #'[a-z]+'").unwrap();
    thread::scope(|scope| {
        for word in ["alpha", "beta", "gamma"] {
            let parser = &parser;
            scope.spawn(move || {
                assert_eq!(
                    parser.parse(word).unwrap(),
                    Value::tagged("word", vec![Value::text(word)])
                );
            });
        }
    });
}
