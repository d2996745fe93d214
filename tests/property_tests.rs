// tests/property_tests.rs

use proptest::prelude::*;
use quill_lang::compiler::{Compiler, compile_expression};
use quill_lang::config::CompilerConfig;
use quill_lang::lexer::{lex, lex_code};
use quill_lang::sandbox::{Value, eval_source};
use rust_decimal::Decimal;

/// Pieces of story markup, biased towards delimiters so that balanced,
/// unbalanced and interleaved constructs all turn up.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("[".to_string()),
        Just("]".to_string()),
        Just("|n>[".to_string()),
        Just("]<n|".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("(if: ".to_string()),
        Just("(set: $a to ".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("''".to_string()),
        Just("//".to_string()),
        Just("*".to_string()),
        Just("~~".to_string()),
        Just("\n".to_string()),
        Just("# ".to_string()),
        Just("* ".to_string()),
        Just("[[go->there]]".to_string()),
        Just("`code`".to_string()),
        Just("<!-- c -->".to_string()),
        Just("$gold".to_string()),
        Just("_tmp".to_string()),
        Just("'s ".to_string()),
        Just(" and ".to_string()),
        Just(" is not ".to_string()),
        Just(" + ".to_string()),
        Just(", ".to_string()),
        Just("\"".to_string()),
        Just("'".to_string()),
        Just("café".to_string()),
        "[a-z0-9 ]{1,6}",
    ]
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..16).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_markup_coverage(source in document_strategy()) {
        let tree = lex(&source).unwrap();
        prop_assert_eq!(tree.reassemble(), source);
    }

    #[test]
    fn prop_code_coverage(source in document_strategy()) {
        let tree = lex_code(&source).unwrap();
        prop_assert_eq!(tree.reassemble(), source);
    }

    #[test]
    fn prop_arbitrary_text_coverage(source in "\\PC{0,48}") {
        let tree = lex(&source).unwrap();
        prop_assert_eq!(tree.reassemble(), source);
    }

    #[test]
    fn prop_spans_match_text(source in document_strategy()) {
        let tree = lex(&source).unwrap();
        for (id, node) in tree.iter() {
            prop_assert_eq!(node.text.as_str(), &source[node.start..node.end]);
            prop_assert!(!node.is_front);
            let mut cursor = node.start;
            for &child in tree.children(id) {
                prop_assert!(tree[child].start >= cursor);
                cursor = tree[child].end;
            }
            prop_assert!(cursor <= node.end);
        }
    }

    #[test]
    fn prop_compile_is_total(source in document_strategy()) {
        prop_assert!(compile_expression(&source, &CompilerConfig::default()).is_ok());

        let tree = lex(&source).unwrap();
        for found in Compiler::new(&tree).expressions() {
            prop_assert!(!found.code.is_empty());
            prop_assert_eq!(found.source.as_str(), &source[found.start..found.end]);
        }
    }

    #[test]
    fn prop_arithmetic_precedence(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
        let config = CompilerConfig::default();
        let sum = eval_source(&format!("{a} + {b} * {c}"), &config).unwrap();
        prop_assert_eq!(sum, Value::Number(Decimal::from(a + b * c)));

        let difference = eval_source(&format!("{a} - {b} - {c}"), &config).unwrap();
        prop_assert_eq!(difference, Value::Number(Decimal::from(a - b - c)));
    }
}

fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(", "),
        Just(" + "),
        Just(" * "),
        Just(" and "),
        Just(" or "),
        Just(" < "),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_long_flat_chains_compile(
        terms in prop::collection::vec("[0-9]{1,3}", 300..1500),
        separator in separator_strategy(),
    ) {
        let code = compile_expression(&terms.join(separator), &CompilerConfig::default()).unwrap();
        prop_assert!(!code.contains("nested too deeply"));
        prop_assert!(!code.contains("Errors.create"));
    }
}
