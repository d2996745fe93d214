// tests/cli_tests.rs

use std::fs;

use quill_lang::cli::{CheckOptions, CheckResult, CliError, TreeFormat, execute_at, execute_check, execute_eval, execute_tree};
use quill_lang::config::{CompilerConfig, ConfigError};
use quill_lang::rules::Mode;

fn write_config(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("quill.toml");
    fs::write(&path, text).unwrap();
    path
}

// ============================================================================
// Config Files
// ============================================================================

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "max_nesting_depth = 8\nstart_mode = \"code\"\npretty = true\n");

    let config = CompilerConfig::load(&path).unwrap();
    assert_eq!(config.max_nesting_depth, 8);
    assert_eq!(config.start_mode, Mode::Code);
    assert!(config.pretty);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CompilerConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_config_limits_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "max_nesting_depth = 2\n");
    let config = CompilerConfig::load(&path).unwrap();

    let options = CheckOptions {
        source: "(1 + (1 + 1))".to_string(),
        expression: true,
        config,
    };
    let CheckResult::Expression(code) = execute_check(&options).unwrap() else {
        panic!("expected an expression result");
    };
    assert_eq!(
        code,
        r#"(Operations["+"](1,(Errors.create("syntax","This expression is nested too deeply."))))"#
    );
}

// ============================================================================
// Tree Command
// ============================================================================

#[test]
fn test_tree_json_structure() {
    let text = execute_tree("(print: $a)", &CompilerConfig::default(), TreeFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["kind"], "root");
    assert_eq!(json["children"][0]["kind"], "macro");
    assert_eq!(json["children"][0]["name"], "print");
    assert_eq!(json["children"][0]["children"][1]["kind"], "variable");
    assert_eq!(json["children"][0]["children"][1]["start"], 8);
}

#[test]
fn test_tree_in_code_mode() {
    let config = CompilerConfig {
        start_mode: Mode::Code,
        ..CompilerConfig::default()
    };
    let text = execute_tree("1 + 2", &config, TreeFormat::Outline).unwrap();
    assert_eq!(
        text,
        "root\n  number \"1\"\n  whitespace \" \"\n  addition \"+\"\n  whitespace \" \"\n  number \"2\"\n"
    );
}

// ============================================================================
// Compile and Eval Commands
// ============================================================================

#[test]
fn test_compile_expression() {
    let options = CheckOptions {
        source: "$a to 1".to_string(),
        expression: true,
        config: CompilerConfig::default(),
    };
    match execute_check(&options).unwrap() {
        CheckResult::Expression(code) => assert_eq!(
            code,
            r#"AssignmentRequest.create(VarRef.create(State.variables,"a"),1,"to")"#
        ),
        other => panic!("expected an expression result, got {other:?}"),
    }
}

#[test]
fn test_compile_document_serializes() {
    let options = CheckOptions {
        source: "x (print: 2)".to_string(),
        ..CheckOptions::default()
    };
    let CheckResult::Document(found) = execute_check(&options).unwrap() else {
        panic!("expected a document result");
    };
    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json[0]["start"], 2);
    assert_eq!(json[0]["code"], r#"Macros.run("print",[section,2])"#);
    assert!(json[0].get("node").is_none());
}

#[test]
fn test_eval_command() {
    let test_cases = vec![
        ("3 - 5 * 2", "-7"),
        ("3 < 4 and 5", "true"),
        ("'a' + 'b'", "ab"),
        ("1, 2", "(a: 1, 2)"),
    ];

    for (input, expected) in test_cases {
        let (_, value) = execute_eval(input, &CompilerConfig::default()).unwrap();
        assert_eq!(value.to_string(), expected, "Failed for input: {input}");
    }
}

#[test]
fn test_eval_reports_error_fragment() {
    let err = execute_eval("5 *", &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err, CliError::Eval(_)));
    assert!(err.to_string().contains("to the right of '*'"));
}

// ============================================================================
// At Command
// ============================================================================

#[test]
fn test_at_inside_hook() {
    let path = execute_at("|h>[''x'']", &CompilerConfig::default(), 6).unwrap();
    let kinds: Vec<&str> = path.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec!["text", "bold", "hook", "root"]);
    assert_eq!(path[2].name.as_deref(), Some("h"));
    assert_eq!((path[2].start, path[2].end), (0, 10));
}
