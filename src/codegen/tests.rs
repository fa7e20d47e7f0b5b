//! Unit tests for the code synthesizer, probing the emitted source text.

use super::codegen::generate;
use crate::grammar::grammar::Grammar;

fn calculator() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.set_class("", "Calculator");
    grammar.add_rule(None, r"\d+", Some("{ vec![Value::sym(\"number\"), Value::int(text.parse().unwrap())] }"));
    grammar.add_rule(None, r"\s+", None);
    grammar.add_rule(None, r"[+-]", Some("{ vec![Value::sym(\"op\"), Value::str(&text)] }"));
    grammar
}

#[test]
fn test_generate_simple_scanner() {
    let source = generate(&calculator());

    assert!(source.contains("pub struct Calculator {"));
    assert!(source.contains("if let Some(text) = self.ss.scan(&RE_0) {"));
    assert!(source.contains("if self.ss.skip(&RE_1).is_some() {"));
    assert!(source.contains("return Ok(None); // do nothing"));
    assert!(source.contains("fn scan_initial(&mut self) -> Result<Option<Vec<Value>>, ScanError> {"));
    assert!(source.contains("None => self.scan_initial()?,"));
}

#[test]
fn test_generate_is_idempotent() {
    let grammar = calculator();
    assert_eq!(generate(&grammar), generate(&grammar));
}

#[test]
fn test_generated_header_lines() {
    let mut grammar = Grammar::new();
    grammar.set_class("mod x;\nmod y;", "Calculator");
    grammar.add_rule(None, r"\d+", None);

    let source = generate(&grammar);
    let lines: Vec<&str> = source.lines().take(7).collect();
    let version = format!("// Generated by: scangen version {}.", env!("CARGO_PKG_VERSION"));
    assert_eq!(
        lines,
        vec![
            "// This file is automatically generated. Do not modify it.",
            version.as_str(),
            "",
            "#![allow(nonstandard_style, dead_code)]",
            "",
            "mod x;",
            "mod y;",
        ]
    );
}

#[test]
fn test_generated_source_comment() {
    let mut grammar = calculator();
    grammar.set_filename("calc.rex");
    assert!(generate(&grammar).contains("// Source: calc.rex\n"));
}

#[test]
fn test_generate_macros_expanded_in_order() {
    let mut grammar = Grammar::new();
    grammar.add_macro("D", r"\d");
    grammar.add_macro("NUM", r"#{D}+");
    grammar.add_rule(None, r"#{NUM}", None);

    let source = generate(&grammar);
    assert!(source.contains(r#"const D  : &str = r"\d";"#));
    assert!(source.contains(r#"const NUM: &str = r"\d+";"#));
    // the rule pattern is emitted fully expanded
    assert!(source.contains(r#"static ref RE_0: Regex = Regex::new(r"^(?:\d+)").unwrap();"#));
}

#[test]
fn test_generate_group_prefix_check() {
    let mut grammar = Grammar::new();
    grammar.begin_group(r"\d");
    grammar.add_group_rule(None, r"\d+\.\d+", Some("float"));
    grammar.add_group_rule(None, r"\d+", Some("int"));
    grammar.close_group();
    grammar.add_rule(None, r"\s+", None);

    let source = generate(&grammar);
    assert!(source.contains("if self.ss.check(&GROUP_0) {"));
    assert!(source.contains(r#"static ref GROUP_0: Regex = Regex::new(r"^(?:\d)").unwrap();"#));
    assert!(source.contains("return Ok(Some(self.float(text)));"));
    assert!(source.contains("return Ok(Some(self.int(text)));"));
}

#[test]
fn test_generate_predicate_precondition() {
    let mut grammar = Grammar::new();
    grammar.add_rule(None, r"\d+", None);
    grammar.add_rule(Some(":ARG"), r"\d+", None);
    grammar.add_rule(Some("poot_p"), r"[+-]", Some("{ vec![Value::sym(\"bad1\"), Value::str(&text)] }"));
    grammar.add_rule(Some("woot_p"), r"[+-]", Some("{ vec![Value::sym(\"op\"), Value::str(&text)] }"));

    let source = generate(&grammar);
    assert!(source.contains("if self.poot_p() {"));
    assert!(source.contains("if self.woot_p() {"));
    assert!(source.contains("None => self.scan_initial()?,"));
    assert!(source.contains("Some(\"ARG\") => self.scan_ARG()?,"));
    assert!(source.contains("fn scan_ARG(&mut self) -> Result<Option<Vec<Value>>, ScanError> {"));
}

#[test]
fn test_generate_state_literal_action() {
    let mut grammar = Grammar::new();
    grammar.add_rule(None, "rpn", Some(":RPN"));
    grammar.add_rule(Some(":RPN"), "alg", Some("nil"));

    let source = generate(&grammar);
    assert!(source.contains("return Ok(Some(vec![Value::sym(\"state\"), Value::sym(\"RPN\")]));"));
    assert!(source.contains("return Ok(Some(vec![Value::sym(\"state\"), Value::Nil]));"));
}

#[test]
fn test_generate_inherits() {
    let mut grammar = calculator();
    grammar.set_class("", "Calculator < Bar");
    let source = generate(&grammar);
    assert!(source.contains("/// The generated lexer Calculator < Bar."));
    assert!(source.contains("pub struct Calculator {"));
}

#[test]
fn test_generate_nested_class_name() {
    let mut grammar = calculator();
    grammar.set_class("", "Baz::Calculator < Foo::Bar");
    let source = generate(&grammar);
    assert!(source.contains("/// The generated lexer Baz::Calculator < Foo::Bar."));
    assert!(source.contains("pub struct Calculator {"));
}

#[test]
fn test_generate_start_lines_open_next_token() {
    let mut grammar = calculator();
    grammar.add_start("do_the_thing();");
    let source = generate(&grammar);
    assert!(source.contains(
        "    pub fn next_token(&mut self) -> Result<Option<Vec<Value>>, ScanError> {\n        do_the_thing();"
    ));
}

#[test]
fn test_generate_inner_and_end_lines() {
    let mut grammar = calculator();
    grammar.add_inner("fn helper(&self) -> bool { true }");
    grammar.add_end("pub const DONE: bool = true;");

    let source = generate(&grammar);
    assert!(source.contains("    fn helper(&self) -> bool { true }"));
    assert!(source.contains("\npub const DONE: bool = true;"));
}

#[test]
fn test_generate_option_gated_sections() {
    let plain = generate(&calculator());
    assert!(!plain.contains("lineno"));
    assert!(!plain.contains("old_pos"));
    assert!(!plain.contains("fn do_parse"));
    assert!(!plain.contains("fn main()"));
    assert!(!plain.contains("println!"));

    let mut grammar = calculator();
    grammar.set_option("lineno");
    grammar.set_option("column");
    grammar.set_option("do_parse");
    grammar.set_option("debug");
    grammar.set_option("stub");

    let source = generate(&grammar);
    assert!(source.contains("if self.ss.check(&RE_NEWLINE) {"));
    assert!(source.contains("self.lineno += 1;"));
    assert!(source.contains("self.old_pos = self.ss.pos();"));
    assert!(source.contains("pub fn column(&self) -> usize {"));
    assert!(source.contains("pub fn do_parse(&mut self) -> Result<(), ScanError> {"));
    assert!(source.contains("self.dispatch_token(&token)?;"));
    assert!(source.contains("println!(\"[{:?}, {:?}]\", self.state, token);"));
    assert!(source.contains("fn main() {"));
}

#[test]
fn test_generate_undefined_state_arm() {
    let source = generate(&calculator());
    assert!(source.contains("return Err(ScanError::undefined_state("));
    assert!(source.contains("Err(ScanError::scan_failure("));
}

#[test]
fn test_generate_widens_raw_string_fence_for_quotes() {
    let mut grammar = Grammar::new();
    grammar.add_rule(None, r#""[^"]*""#, Some("string"));

    let source = generate(&grammar);
    assert!(source.contains(r###"Regex::new(r#"^(?:"[^"]*")"#).unwrap();"###));
}

#[test]
fn test_generate_without_class_name_defaults() {
    let mut grammar = Grammar::new();
    grammar.add_rule(None, r"\d+", None);
    let source = generate(&grammar);
    assert!(source.contains("pub struct Lexer {"));
}
