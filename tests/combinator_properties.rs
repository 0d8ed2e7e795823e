//! Property-based tests for the combinators

use partibus::combinators::{choice, literal, look, not, plus, regex, star};
use partibus::{Cursor, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn literal_consumes_exactly_itself(s in "\\PC{1,20}") {
        let mut cursor = Cursor::new(&s);
        let value = literal(s.clone()).parse(&mut cursor).unwrap();
        prop_assert_eq!(value, Value::text(s.clone()));
        prop_assert_eq!(cursor.position(), s.len());
        prop_assert!(cursor.is_at_end());
    }

    #[test]
    fn literal_never_consumes_on_failure(s in "[a-z]{1,10}", input in "[A-Z]{0,10}") {
        let mut cursor = Cursor::new(&input);
        prop_assert!(literal(s).parse(&mut cursor).is_err());
        prop_assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn choice_restores_after_failed_branch(prefix in "[a-m]{1,8}", rest in "[n-z]{1,8}") {
        // The first branch consumes `prefix` before failing on the missing '!'
        let first = partibus::combinators::sequence([literal(prefix.clone()), literal("!")]);
        let second = literal(format!("{}{}", prefix, rest));
        let input = format!("{}{}", prefix, rest);

        let mut alone = Cursor::new(&input);
        second.parse(&mut alone).unwrap();

        let mut cursor = Cursor::new(&input);
        choice([first, second]).parse(&mut cursor).unwrap();
        prop_assert_eq!(cursor.position(), alone.position());
    }

    #[test]
    fn star_of_nothing_is_null(input in "[b-z]{0,10}") {
        let mut cursor = Cursor::new(&input);
        prop_assert_eq!(star(literal("a")).parse(&mut cursor), Ok(Value::Null));
        prop_assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn plus_returns_one_result_per_occurrence(n in 1usize..30, tail in "[b-z]{0,5}") {
        let input = format!("{}{}", "a".repeat(n), tail);
        let mut cursor = Cursor::new(&input);
        let value = plus(literal("a")).parse(&mut cursor).unwrap();
        prop_assert_eq!(value.children().len(), n);
        prop_assert_eq!(cursor.position(), n);
    }

    #[test]
    fn plus_of_nothing_fails(input in "[b-z]{0,10}") {
        prop_assert!(plus(literal("a")).parse_str(&input).is_err());
    }

    #[test]
    fn lookaheads_never_advance(input in "[a-c]{0,12}", at in 0usize..12) {
        let pattern = regex("[ab]+").unwrap();
        let start = at.min(input.len());
        for parser in [look(pattern.clone()), not(pattern.clone())] {
            let mut cursor = Cursor::new(&input);
            cursor.advance(start);
            let _ = parser.parse(&mut cursor);
            prop_assert_eq!(cursor.position(), start);
        }
    }

    #[test]
    fn look_and_not_are_complements(input in "[a-c]{0,12}") {
        let pattern = regex("[ab]+").unwrap();
        let looked = look(pattern.clone()).parse_str(&input).is_ok();
        let negated = not(pattern).parse_str(&input).is_ok();
        prop_assert_ne!(looked, negated);
    }

    #[test]
    fn star_terminates_on_zero_width_matches(input in "[a-z]{0,10}") {
        let mut cursor = Cursor::new(&input);
        let result = star(regex("x*").unwrap()).parse(&mut cursor);
        prop_assert!(result.is_ok());
    }
}
