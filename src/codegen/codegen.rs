use std::fmt::Write;

use crate::analyzer::analyzer::{analyze, Analysis};
use crate::grammar::grammar::{expand, Grammar};
use crate::matcher::matcher::{plan_label, ActionKind, Arm, RuleArm};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Renders a grammar to Rust scanner source. A pure transform: the same
/// unmutated grammar always renders to byte-identical text.
pub fn generate(grammar: &Grammar) -> String {
    Codegen::new(grammar).render()
}

/// Renders a pattern fragment as a Rust raw string literal, widening the
/// hash fence until the content fits.
fn raw_str_lit(text: &str) -> String {
    let mut fence = String::new();
    while text.contains(&format!("\"{}", fence)) {
        fence.push('#');
    }
    format!("r{fence}\"{text}\"{fence}")
}

fn state_expr(label: Option<&str>) -> String {
    match label {
        Some(name) => format!("Some({:?})", name),
        None => String::from("None"),
    }
}

fn label_method(label: Option<&str>) -> String {
    match label {
        Some(name) => format!("scan_{}", name),
        None => String::from("scan_initial"),
    }
}

struct Codegen<'g> {
    grammar: &'g Grammar,
    analysis: Analysis,
    table: Vec<(String, String)>,
    statics: Vec<(String, String)>,
    rule_count: usize,
    group_count: usize,
}

impl<'g> Codegen<'g> {
    fn new(grammar: &'g Grammar) -> Codegen<'g> {
        Codegen {
            grammar,
            analysis: analyze(grammar),
            table: grammar.macro_table(),
            statics: Vec::new(),
            rule_count: 0,
            group_count: 0,
        }
    }

    /// Registers an anchored pattern static and returns its name.
    fn pattern_static(&mut self, pattern: &str, group_prefix: bool) -> String {
        let name = if group_prefix {
            let name = format!("GROUP_{}", self.group_count);
            self.group_count += 1;
            name
        } else {
            let name = format!("RE_{}", self.rule_count);
            self.rule_count += 1;
            name
        };
        let anchored = format!("^(?:{})", expand(pattern, &self.table));
        self.statics.push((name.clone(), anchored));
        name
    }

    fn struct_name(&self) -> String {
        let full = self.grammar.class_name.as_deref().unwrap_or("Lexer");
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// The declared name with namespace and superclass, for the doc header.
    fn full_name(&self) -> String {
        let name = self.grammar.class_name.clone().unwrap_or_else(|| String::from("Lexer"));
        match &self.grammar.superclass {
            Some(superclass) => format!("{} < {}", name, superclass),
            None => name,
        }
    }

    fn render(mut self) -> String {
        let scan_fns = self.render_scan_fns();
        let opts = self.grammar.options;
        let name = self.struct_name();
        let mut out = String::new();

        writeln!(out, "// This file is automatically generated. Do not modify it.").unwrap();
        writeln!(out, "// Generated by: scangen version {}.", VERSION).unwrap();
        if let Some(filename) = &self.grammar.filename {
            writeln!(out, "// Source: {}", filename).unwrap();
        }
        writeln!(out).unwrap();
        writeln!(out, "#![allow(nonstandard_style, dead_code)]").unwrap();

        if !self.grammar.header.is_empty() {
            writeln!(out).unwrap();
            for line in &self.grammar.header {
                writeln!(out, "{}", line).unwrap();
            }
        }

        writeln!(out).unwrap();
        writeln!(out, "use lazy_static::lazy_static;").unwrap();
        writeln!(out, "use regex::Regex;").unwrap();
        writeln!(out, "use scangen::{{ScanError, StrScanner, Value}};").unwrap();

        if !self.grammar.macros.is_empty() {
            writeln!(out).unwrap();
            let width = self.table.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
            for (name, value) in &self.table {
                writeln!(out, "const {:width$}: &str = {};", name, raw_str_lit(value)).unwrap();
            }
        }

        writeln!(out).unwrap();
        writeln!(out, "lazy_static! {{").unwrap();
        if opts.lineno {
            writeln!(
                out,
                "    static ref RE_NEWLINE: Regex = Regex::new(r\"^\\n\").unwrap();"
            )
            .unwrap();
        }
        for (name, pattern) in &self.statics {
            writeln!(
                out,
                "    static ref {}: Regex = Regex::new({}).unwrap();",
                name,
                raw_str_lit(pattern)
            )
            .unwrap();
        }
        writeln!(out, "}}").unwrap();

        writeln!(out).unwrap();
        writeln!(out, "/// The generated lexer {}.", self.full_name()).unwrap();
        writeln!(out, "pub struct {} {{", name).unwrap();
        writeln!(out, "    pub ss: StrScanner,").unwrap();
        writeln!(out, "    pub state: Option<String>,").unwrap();
        writeln!(out, "    pub filename: Option<String>,").unwrap();
        if opts.lineno {
            writeln!(out, "    pub lineno: usize,").unwrap();
        }
        if opts.column {
            writeln!(out, "    pub old_pos: usize,").unwrap();
            writeln!(out, "    pub start_of_current_line_pos: usize,").unwrap();
        }
        writeln!(out, "}}").unwrap();

        writeln!(out).unwrap();
        writeln!(out, "impl {} {{", name).unwrap();
        writeln!(out, "    pub fn new() -> {} {{", name).unwrap();
        writeln!(out, "        {} {{", name).unwrap();
        writeln!(out, "            ss: StrScanner::default(),").unwrap();
        writeln!(out, "            state: None,").unwrap();
        writeln!(out, "            filename: None,").unwrap();
        if opts.lineno {
            writeln!(out, "            lineno: 1,").unwrap();
        }
        if opts.column {
            writeln!(out, "            old_pos: 0,").unwrap();
            writeln!(out, "            start_of_current_line_pos: 0,").unwrap();
        }
        writeln!(out, "        }}").unwrap();
        writeln!(out, "    }}").unwrap();

        if opts.column {
            writeln!(out).unwrap();
            writeln!(out, "    /// The current column, starting at 0.").unwrap();
            writeln!(out, "    pub fn column(&self) -> usize {{").unwrap();
            writeln!(
                out,
                "        self.old_pos.saturating_sub(self.start_of_current_line_pos)"
            )
            .unwrap();
            writeln!(out, "    }}").unwrap();
        }

        writeln!(out).unwrap();
        writeln!(out, "    /// Parse the given string.").unwrap();
        writeln!(out, "    pub fn parse(&mut self, input: &str) {{").unwrap();
        writeln!(out, "        self.ss = StrScanner::new(input);").unwrap();
        if opts.lineno {
            writeln!(out, "        self.lineno = 1;").unwrap();
        }
        if opts.column {
            writeln!(out, "        self.old_pos = 0;").unwrap();
            writeln!(out, "        self.start_of_current_line_pos = 0;").unwrap();
        }
        writeln!(out, "    }}").unwrap();

        writeln!(out).unwrap();
        writeln!(out, "    /// Read in and parse the file at `path`.").unwrap();
        writeln!(
            out,
            "    pub fn parse_file(&mut self, path: &str) -> Result<(), ScanError> {{"
        )
        .unwrap();
        writeln!(out, "        self.filename = Some(path.to_string());").unwrap();
        writeln!(out, "        let contents = std::fs::read_to_string(path)?;").unwrap();
        writeln!(out, "        self.parse(&contents);").unwrap();
        writeln!(out, "        Ok(())").unwrap();
        writeln!(out, "    }}").unwrap();

        writeln!(out).unwrap();
        writeln!(out, "    /// The current location in the parse.").unwrap();
        writeln!(out, "    pub fn location(&self) -> String {{").unwrap();
        writeln!(out, "        let mut parts = vec![self").unwrap();
        writeln!(out, "            .filename").unwrap();
        writeln!(out, "            .clone()").unwrap();
        writeln!(
            out,
            "            .unwrap_or_else(|| String::from(\"<input>\"))];"
        )
        .unwrap();
        if opts.lineno {
            writeln!(out, "        parts.push(self.lineno.to_string());").unwrap();
        } else if opts.column {
            writeln!(out, "        parts.push(String::from(\"?\"));").unwrap();
        }
        if opts.column {
            writeln!(out, "        parts.push(self.column().to_string());").unwrap();
        }
        writeln!(out, "        parts.join(\":\")").unwrap();
        writeln!(out, "    }}").unwrap();

        self.render_next_token(&mut out);
        out.push_str(&scan_fns);

        if opts.do_parse {
            writeln!(out).unwrap();
            writeln!(
                out,
                "    /// Parse the whole input, handing each token to `dispatch_token`."
            )
            .unwrap();
            writeln!(out, "    pub fn do_parse(&mut self) -> Result<(), ScanError> {{").unwrap();
            writeln!(out, "        while let Some(token) = self.next_token()? {{").unwrap();
            writeln!(out, "            self.dispatch_token(&token)?;").unwrap();
            writeln!(out, "        }}").unwrap();
            writeln!(out, "        Ok(())").unwrap();
            writeln!(out, "    }}").unwrap();
        }

        if !self.grammar.inners.is_empty() {
            writeln!(out).unwrap();
            for line in &self.grammar.inners {
                writeln!(out, "    {}", line).unwrap();
            }
        }
        writeln!(out, "}}").unwrap();

        if !self.grammar.ends.is_empty() {
            writeln!(out).unwrap();
            for line in &self.grammar.ends {
                writeln!(out, "{}", line).unwrap();
            }
        }

        if opts.stub {
            self.render_stub(&mut out, &name);
        }

        out
    }

    fn render_next_token(&self, out: &mut String) {
        let opts = self.grammar.options;

        writeln!(out).unwrap();
        writeln!(out, "    /// Lex the next token.").unwrap();
        writeln!(
            out,
            "    pub fn next_token(&mut self) -> Result<Option<Vec<Value>>, ScanError> {{"
        )
        .unwrap();
        for line in &self.grammar.starts {
            writeln!(out, "        {}", line).unwrap();
        }
        writeln!(out, "        let mut token: Option<Vec<Value>> = None;").unwrap();
        writeln!(out).unwrap();
        writeln!(out, "        while !self.ss.eos() && token.is_none() {{").unwrap();
        if opts.lineno {
            writeln!(out, "            if self.ss.check(&RE_NEWLINE) {{").unwrap();
            writeln!(out, "                self.lineno += 1;").unwrap();
            if opts.column {
                writeln!(out, "                // line starts 1 position after the newline").unwrap();
                writeln!(
                    out,
                    "                self.start_of_current_line_pos = self.ss.pos() + 1;"
                )
                .unwrap();
            }
            writeln!(out, "            }}").unwrap();
        }
        if opts.column {
            writeln!(out, "            self.old_pos = self.ss.pos();").unwrap();
        }
        writeln!(out, "            token = match self.state.as_deref() {{").unwrap();
        for group in &self.analysis.groups {
            for label in &group.labels {
                writeln!(
                    out,
                    "                {} => self.{}()?,",
                    state_expr(label.as_deref()),
                    label_method(label.as_deref())
                )
                .unwrap();
            }
        }
        writeln!(out, "                _ => {{").unwrap();
        writeln!(out, "                    return Err(ScanError::undefined_state(").unwrap();
        writeln!(out, "                        self.state.as_deref(),").unwrap();
        writeln!(out, "                        self.location(),").unwrap();
        writeln!(out, "                    ))").unwrap();
        writeln!(out, "                }}").unwrap();
        writeln!(out, "            }};").unwrap();
        writeln!(out, "        }}").unwrap();
        writeln!(out).unwrap();
        writeln!(out, "        if let Some(tok) = &token {{").unwrap();
        writeln!(out, "            if tok.len() < 2 {{").unwrap();
        writeln!(out, "                return Err(ScanError::bad_lexical_result(").unwrap();
        writeln!(out, "                    format!(\"{{:?}}\", tok),").unwrap();
        writeln!(out, "                    self.location(),").unwrap();
        writeln!(out, "                ));").unwrap();
        writeln!(out, "            }}").unwrap();
        writeln!(out, "            // auto-switch state").unwrap();
        writeln!(
            out,
            "            if matches!(tok.first(), Some(Value::Sym(kind)) if kind == \"state\") {{"
        )
        .unwrap();
        writeln!(
            out,
            "                self.state = tok.last().and_then(|v| v.as_state());"
        )
        .unwrap();
        writeln!(out, "            }}").unwrap();
        writeln!(out, "        }}").unwrap();
        if opts.debug {
            writeln!(out).unwrap();
            writeln!(out, "        println!(\"[{{:?}}, {{:?}}]\", self.state, token);").unwrap();
        }
        writeln!(out, "        Ok(token)").unwrap();
        writeln!(out, "    }}").unwrap();
    }

    fn render_scan_fns(&mut self) -> String {
        let mut out = String::new();
        for group in self.analysis.groups.clone() {
            for label in &group.labels {
                let arms = plan_label(
                    &self.analysis,
                    self.grammar,
                    label.as_deref(),
                    group.exclusive,
                );
                writeln!(out).unwrap();
                writeln!(
                    out,
                    "    fn {}(&mut self) -> Result<Option<Vec<Value>>, ScanError> {{",
                    label_method(label.as_deref())
                )
                .unwrap();
                for arm in &arms {
                    self.render_arm(&mut out, arm, 2);
                }
                writeln!(out, "        Err(ScanError::scan_failure(").unwrap();
                writeln!(out, "            {},", state_expr(label.as_deref())).unwrap();
                writeln!(out, "            self.location(),").unwrap();
                writeln!(out, "            self.ss.rest(),").unwrap();
                writeln!(out, "        ))").unwrap();
                writeln!(out, "    }}").unwrap();
            }
        }
        out
    }

    fn render_arm(&mut self, out: &mut String, arm: &Arm, depth: usize) {
        match arm {
            Arm::Rule(rule) => self.render_rule_arm(out, rule, depth),
            Arm::Group { prefix, arms } => {
                let name = self.pattern_static(prefix, true);
                let pad = "    ".repeat(depth);
                writeln!(out, "{pad}if self.ss.check(&{name}) {{").unwrap();
                for member in arms {
                    self.render_arm(out, member, depth + 1);
                }
                writeln!(out, "{pad}}}").unwrap();
            }
        }
    }

    fn render_rule_arm(&mut self, out: &mut String, rule: &RuleArm, depth: usize) {
        let mut depth = depth;
        let name = self.pattern_static(&rule.pattern, false);
        if let Some(predicate) = &rule.predicate {
            let pad = "    ".repeat(depth);
            writeln!(out, "{pad}if self.{predicate}() {{").unwrap();
            depth += 1;
        }
        let pad = "    ".repeat(depth);
        let inner = "    ".repeat(depth + 1);
        if rule.capture {
            writeln!(out, "{pad}if let Some(text) = self.ss.scan(&{name}) {{").unwrap();
        } else {
            writeln!(out, "{pad}if self.ss.skip(&{name}).is_some() {{").unwrap();
        }
        match &rule.action {
            ActionKind::None => {
                writeln!(out, "{inner}return Ok(None); // do nothing").unwrap();
            }
            ActionKind::Switch(target) => {
                let target = match target {
                    Some(state) => format!("Value::sym({:?})", state),
                    None => String::from("Value::Nil"),
                };
                writeln!(
                    out,
                    "{inner}return Ok(Some(vec![Value::sym(\"state\"), {target}]));"
                )
                .unwrap();
            }
            ActionKind::Method(method) => {
                writeln!(out, "{inner}return Ok(Some(self.{method}(text)));").unwrap();
            }
            ActionKind::Block { code, .. } => {
                writeln!(out, "{inner}return Ok(Some({code}));").unwrap();
            }
        }
        writeln!(out, "{pad}}}").unwrap();
        if rule.predicate.is_some() {
            let pad = "    ".repeat(depth - 1);
            writeln!(out, "{pad}}}").unwrap();
        }
    }

    fn render_stub(&self, out: &mut String, name: &str) {
        let lineno = if self.grammar.options.lineno {
            "rex.lineno.to_string()"
        } else {
            "String::from(\"-1\")"
        };

        writeln!(out).unwrap();
        writeln!(out, "fn main() {{").unwrap();
        writeln!(out, "    for path in std::env::args().skip(1) {{").unwrap();
        writeln!(out, "        let mut rex = {}::new();", name).unwrap();
        writeln!(
            out,
            "        let result = rex.parse_file(&path).and_then(|()| {{"
        )
        .unwrap();
        writeln!(out, "            while let Some(token) = rex.next_token()? {{").unwrap();
        writeln!(out, "                println!(\"{{:?}}\", token);").unwrap();
        writeln!(out, "            }}").unwrap();
        writeln!(out, "            Ok(())").unwrap();
        writeln!(out, "        }});").unwrap();
        writeln!(out, "        if let Err(e) = result {{").unwrap();
        writeln!(out, "            eprintln!(\"{{}}:{{}}:{{}}\", path, {}, e);", lineno).unwrap();
        writeln!(out, "            std::process::exit(1);").unwrap();
        writeln!(out, "        }}").unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "}}").unwrap();
    }
}
