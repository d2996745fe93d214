// tests/lexer_tests.rs

use quill_lang::ast::{NodeId, TokenType, Tree};
use quill_lang::config::CompilerConfig;
use quill_lang::lexer::{Lexer, lex, lex_code};
use quill_lang::output::outline;
use quill_lang::rules::{Mode, Partial, Rule, RuleTable};

fn kinds(tree: &Tree, id: NodeId) -> Vec<TokenType> {
    tree.children(id).iter().map(|c| tree[*c].kind).collect()
}

fn top(source: &str) -> Vec<TokenType> {
    let tree = lex(source).unwrap();
    kinds(&tree, tree.root())
}

fn first_child(tree: &Tree) -> NodeId {
    tree.children(tree.root())[0]
}

// ============================================================================
// Coverage
// ============================================================================

#[test]
fn test_coverage_reproduces_source() {
    let inputs = vec![
        "",
        "plain prose",
        "Hello $name, you have (print: $gold + 5) coins.",
        "|shop>[''Buy'' something?]",
        "[[Go north->North]] or [[South<-Go south]]",
        "# Heading\n* item one\n0. numbered\n---\n==>\nright",
        "unclosed [hook and (macro: 1",
        "stray ] and ) and ''",
        "<!-- note --> `[verbatim]` {collapsed}",
        "(set: $a to (a: 1, 2, ...$b)'s 1st)",
        "naïve café → ünïcödé $x",
    ];

    for input in inputs {
        let tree = lex(input).unwrap();
        assert_eq!(tree.reassemble(), input, "Failed for input: {input:?}");
        assert_eq!(tree[tree.root()].text, input);
    }
}

#[test]
fn test_node_text_matches_span() {
    let source = "a (print: [b ''c''])";
    let tree = lex(source).unwrap();
    for (_, node) in tree.iter() {
        assert_eq!(node.text, &source[node.start..node.end]);
    }
}

// ============================================================================
// Folding
// ============================================================================

#[test]
fn test_named_hook_folds() {
    let tree = lex("|shop>[Buy]").unwrap();
    let hook = first_child(&tree);
    assert_eq!(tree[hook].kind, TokenType::Hook);
    assert_eq!(tree[hook].name(), Some("shop"));
    assert_eq!(tree[hook].text, "|shop>[Buy]");
    assert_eq!(tree[hook].inner_text(), Some("Buy"));
    assert_eq!(kinds(&tree, hook), vec![TokenType::Text]);
}

#[test]
fn test_back_named_hook() {
    let tree = lex("[text]<tag|").unwrap();
    let hook = first_child(&tree);
    assert_eq!(tree[hook].kind, TokenType::Hook);
    assert_eq!(tree[hook].name(), Some("tag"));
}

#[test]
fn test_no_residual_fronts_or_backs() {
    let tree = lex("[a [b] (print: (c)) ''d'']").unwrap();
    for (_, node) in tree.iter() {
        assert!(!node.is_front, "front left in tree: {:?}", node.kind);
        assert!(
            !matches!(
                node.kind,
                TokenType::HookFront
                    | TokenType::HookBack
                    | TokenType::MacroFront
                    | TokenType::GroupingFront
                    | TokenType::GroupingBack
                    | TokenType::BoldOpener
            ),
            "unfolded {:?}",
            node.kind
        );
    }
}

#[test]
fn test_twine_link_forms() {
    let test_cases = vec![
        ("[[Go north->North]]", "North", "Go north"),
        ("[[North<-Go north]]", "North", "Go north"),
        ("[[Go north|North]]", "North", "Go north"),
        ("[[North]]", "North", "North"),
    ];

    for (input, passage, text) in test_cases {
        let tree = lex(input).unwrap();
        let link = first_child(&tree);
        assert_eq!(tree[link].kind, TokenType::TwineLink, "Failed for input: {input}");
        assert_eq!(tree[link].value(), Some(passage));
        assert_eq!(tree[link].inner_text(), Some(text));
    }
}

#[test]
fn test_nearest_front_wins() {
    let tree = lex("[a[b]").unwrap();
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![TokenType::Text, TokenType::Text, TokenType::Hook]
    );
}

// ============================================================================
// Unbalanced Delimiters
// ============================================================================

#[test]
fn test_unclosed_opener_becomes_text() {
    let tree = lex("a [b").unwrap();
    assert!(
        tree.iter()
            .all(|(_, n)| matches!(n.kind, TokenType::Root | TokenType::Text))
    );
    assert_eq!(tree.reassemble(), "a [b");
}

#[test]
fn test_stray_closer_is_text() {
    assert_eq!(top("b]"), vec![TokenType::Text]);
}

#[test]
fn test_emphasis_cannot_cross_hook() {
    let tree = lex("''a[b''c]").unwrap();
    assert!(tree.iter().all(|(_, n)| n.kind != TokenType::Bold));
    let hook = tree
        .iter()
        .find(|(_, n)| n.kind == TokenType::Hook)
        .map(|(id, _)| id)
        .unwrap();
    assert_eq!(tree[hook].text, "[b''c]");
}

const CLOSES: &[(TokenType, TokenType)] = &[(TokenType::HookFront, TokenType::Hook)];
const WALLS: &[TokenType] = &[TokenType::CollapsedFront];

fn walled_table() -> RuleTable {
    let mut table = RuleTable::new();
    table.add(Rule::new("open", r"<", |_| Partial::new(TokenType::HookFront).front(None)).unwrap());
    table.add(Rule::new("wall", r"\|", |_| Partial::new(TokenType::CollapsedFront).front(None)).unwrap());
    table.add(
        Rule::new("close", r">", |_| {
            Partial::new(TokenType::HookBack).closes(CLOSES).cannot_cross(WALLS)
        })
        .unwrap(),
    );
    table.define_mode(Mode::Markup, &["open", "wall", "close"]).unwrap();
    table
}

#[test]
fn test_custom_table_folds() {
    let table = walled_table();
    let tree = Lexer::new(&table).lex("<a>", Mode::Markup).unwrap();
    assert_eq!(kinds(&tree, tree.root()), vec![TokenType::Hook]);
}

#[test]
fn test_cannot_cross_blocks_fold() {
    let table = walled_table();
    let tree = Lexer::new(&table).lex("<a|b>", Mode::Markup).unwrap();
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![TokenType::Text, TokenType::Text, TokenType::Text, TokenType::Text]
    );
    assert_eq!(tree.reassemble(), "<a|b>");
}

// ============================================================================
// Emphasis
// ============================================================================

#[test]
fn test_symmetric_emphasis() {
    let test_cases = vec![
        ("''b''", TokenType::Bold),
        ("//i//", TokenType::Italic),
        ("**s**", TokenType::Strong),
        ("*e*", TokenType::Em),
        ("~~x~~", TokenType::Strike),
        ("^^u^^", TokenType::Sup),
    ];

    for (input, expected) in test_cases {
        assert_eq!(top(input), vec![expected], "Failed for input: {input}");
    }
}

#[test]
fn test_repeated_emphasis_pairs() {
    assert_eq!(
        top("''a'' ''b''"),
        vec![TokenType::Bold, TokenType::Text, TokenType::Bold]
    );
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn test_macro_contents_are_code() {
    let tree = lex("(set: $a to 1)").unwrap();
    let mac = first_child(&tree);
    assert_eq!(tree[mac].kind, TokenType::Macro);
    assert_eq!(tree[mac].name(), Some("set"));
    assert_eq!(
        kinds(&tree, mac),
        vec![
            TokenType::Whitespace,
            TokenType::Variable,
            TokenType::Whitespace,
            TokenType::To,
            TokenType::Whitespace,
            TokenType::Number,
        ]
    );
}

#[test]
fn test_keywords_are_prose_outside_macros() {
    assert_eq!(top("this and that is not it"), vec![TokenType::Text]);
}

#[test]
fn test_keyword_inside_word_is_text() {
    let tree = lex_code("band").unwrap();
    assert_eq!(kinds(&tree, tree.root()), vec![TokenType::Text]);
}

#[test]
fn test_string_hides_delimiters() {
    let tree = lex(r#"(print: "a)b")"#).unwrap();
    let mac = first_child(&tree);
    assert_eq!(tree[mac].kind, TokenType::Macro);
    let string = tree
        .children(mac)
        .iter()
        .copied()
        .find(|c| tree[*c].kind == TokenType::String)
        .unwrap();
    assert_eq!(tree[string].value(), Some("a)b"));
}

#[test]
fn test_hook_inside_macro_is_markup() {
    let tree = lex("(either: [''x''])").unwrap();
    let mac = first_child(&tree);
    let hook = tree
        .children(mac)
        .iter()
        .copied()
        .find(|c| tree[*c].kind == TokenType::Hook)
        .unwrap();
    assert_eq!(kinds(&tree, hook), vec![TokenType::Bold]);
}

#[test]
fn test_code_operators() {
    let tree = lex_code("$a's name is not in (a: 1)").unwrap();
    let found: Vec<TokenType> = kinds(&tree, tree.root())
        .into_iter()
        .filter(|k| *k != TokenType::Whitespace)
        .collect();
    assert_eq!(
        found,
        vec![
            TokenType::Variable,
            TokenType::Property,
            TokenType::IsNotIn,
            TokenType::Macro,
        ]
    );
}

// ============================================================================
// Line-start Rules
// ============================================================================

#[test]
fn test_heading_only_at_line_start() {
    let tree = lex("## Title").unwrap();
    let heading = first_child(&tree);
    assert_eq!(tree[heading].kind, TokenType::Heading);
    assert_eq!(tree[heading].fields.depth, Some(2));
    assert_eq!(tree[heading].inner_text(), Some("Title"));

    assert_eq!(top("a # b"), vec![TokenType::Text]);
}

#[test]
fn test_list_items_after_break() {
    assert_eq!(
        top("x\n* item\n0. first"),
        vec![
            TokenType::Text,
            TokenType::Br,
            TokenType::BulletedItem,
            TokenType::Br,
            TokenType::NumberedItem,
        ]
    );
}

#[test]
fn test_block_markers() {
    assert_eq!(top("---"), vec![TokenType::Hr]);
    let tree = lex("=><=").unwrap();
    assert_eq!(tree[first_child(&tree)].value(), Some("center"));
}

#[test]
fn test_verbatim_is_not_lexed() {
    let tree = lex("`[not a hook]`").unwrap();
    let verbatim = first_child(&tree);
    assert_eq!(tree[verbatim].kind, TokenType::Verbatim);
    assert!(tree[verbatim].is_leaf());
}

#[test]
fn test_temp_variable_not_mid_word() {
    assert_eq!(top("_x"), vec![TokenType::TempVariable]);
    assert_eq!(top("snake_case"), vec![TokenType::Text]);
}

// ============================================================================
// Limits and Idempotence
// ============================================================================

#[test]
fn test_nesting_limit_demotes_openers() {
    let config = CompilerConfig {
        max_nesting_depth: 3,
        ..CompilerConfig::default()
    };
    let lexer = Lexer::with_config(RuleTable::standard(), &config);

    let tree = lexer.lex("[[[[x]", Mode::Markup).unwrap();
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![TokenType::Text, TokenType::Text, TokenType::Hook]
    );
    let hook = tree.children(tree.root())[2];
    assert_eq!(tree[hook].text, "[[x]");
    assert_eq!(kinds(&tree, hook), vec![TokenType::Text, TokenType::Text]);
}

#[test]
fn test_stray_openers_do_not_stop_the_document() {
    let source = format!("(print: $x) then {} and more", "[".repeat(300));
    let tree = lex(&source).unwrap();
    assert_eq!(tree.reassemble(), source);
    assert!(tree.iter().any(|(_, n)| n.kind == TokenType::Macro));
}

#[test]
fn test_fold_idempotence() {
    let inputs = vec![
        "''bold [hook]''",
        "(print: (a: 1, 2))",
        "|n>[x ''y'']",
        "[[a->b]]",
        "{ (if: $x)[y] }",
    ];

    for input in inputs {
        let tree = lex(input).unwrap();
        for &child in tree.children(tree.root()) {
            if tree[child].is_leaf() {
                continue;
            }
            let again = lex(&tree[child].text).unwrap();
            assert_eq!(again.children(again.root()).len(), 1, "Failed for input: {input}");
            assert_eq!(
                outline(&again, first_child(&again)),
                outline(&tree, child),
                "Failed for input: {input}"
            );
        }
    }
}
