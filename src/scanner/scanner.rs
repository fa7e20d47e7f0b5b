use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analyzer::analyzer::analyze;
use crate::errors::errors::{state_repr, ScanError};
use crate::grammar::grammar::{expand, Grammar, Options};
use crate::matcher::matcher::{plan_label, ActionKind, Arm};

use super::cursor::StrScanner;

lazy_static! {
    static ref NEWLINE: Regex = Regex::new(r"^\n").unwrap();
}

/// Reserved result kind: a token whose first element is this symbol also
/// switches the current lexical state to its last element.
pub const STATE_KIND: &str = "state";

/// A token payload field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    Nil,
}

impl Value {
    pub fn sym(name: &str) -> Value {
        Value::Sym(name.to_string())
    }

    pub fn str(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    pub fn int(n: i64) -> Value {
        Value::Int(n)
    }

    pub fn float(x: f64) -> Value {
        Value::Float(x)
    }

    /// The state this value names when it ends an auto-switch result.
    pub fn as_state(&self) -> Option<String> {
        match self {
            Value::Nil => None,
            Value::Sym(name) | Value::Str(name) => Some(name.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Sym(name) => write!(f, ":{}", name),
            Value::Str(text) => write!(f, "{:?}", text),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Nil => write!(f, "nil"),
        }
    }
}

/// A produced result: a kind followed by payload fields.
pub type Token = Vec<Value>;

/// Formats a token the way error messages and the debug trace show it.
pub fn format_token(token: &[Value]) -> String {
    let fields: Vec<String> = token.iter().map(|v| v.to_string()).collect();
    format!("[{}]", fields.join(", "))
}

pub type ActionFn = fn(&mut Scanner, &str) -> Result<Option<Token>, ScanError>;
pub type PredicateFn = fn(&Scanner) -> bool;
pub type TokenFn = fn(&mut Scanner, &Token) -> Result<(), ScanError>;

#[derive(Debug, Clone)]
struct CompiledRule {
    predicate: Option<String>,
    regex: Regex,
    capture: bool,
    action: ActionKind,
}

#[derive(Debug, Clone)]
enum CompiledArm {
    Rule(CompiledRule),
    Group { prefix: Regex, arms: Vec<CompiledArm> },
}

/// A scanner executing a grammar's dispatch structure in-process.
///
/// Action callables and inline blocks resolve through the registered
/// handler table (inline blocks are keyed by their code text); predicates
/// through the predicate table. Invoking an unregistered name panics, the
/// consuming program's contract violation, mirroring a dynamic dispatch
/// failure in the generated scanner.
#[derive(Debug)]
pub struct Scanner {
    pub ss: StrScanner,
    pub state: Option<String>,
    pub filename: Option<String>,
    pub lineno: usize,
    pub old_pos: usize,
    pub start_of_current_line_pos: usize,
    /// Per-instance scratch state for handlers and predicates.
    pub env: HashMap<String, Value>,
    options: Options,
    labels: Vec<(Option<String>, Rc<Vec<CompiledArm>>)>,
    handlers: HashMap<String, ActionFn>,
    predicates: HashMap<String, PredicateFn>,
    token_handlers: HashMap<String, TokenFn>,
}

fn compile_pattern(pattern: &str, table: &[(String, String)]) -> Result<Regex, ScanError> {
    let expanded = expand(pattern, table);
    Regex::new(&format!("^(?:{})", expanded)).map_err(|source| ScanError::InvalidPattern {
        pattern: expanded,
        source,
    })
}

fn compile_arm(arm: &Arm, table: &[(String, String)]) -> Result<CompiledArm, ScanError> {
    match arm {
        Arm::Rule(rule) => Ok(CompiledArm::Rule(CompiledRule {
            predicate: rule.predicate.clone(),
            regex: compile_pattern(&rule.pattern, table)?,
            capture: rule.capture,
            action: rule.action.clone(),
        })),
        Arm::Group { prefix, arms } => Ok(CompiledArm::Group {
            prefix: compile_pattern(prefix, table)?,
            arms: arms
                .iter()
                .map(|a| compile_arm(a, table))
                .collect::<Result<Vec<_>, _>>()?,
        }),
    }
}

impl Scanner {
    /// Compiles a grammar into an executable scanner: macro expansion,
    /// anchored pattern construction, and one ordered arm table per
    /// dispatch label.
    pub fn new(grammar: &Grammar) -> Result<Scanner, ScanError> {
        let analysis = analyze(grammar);
        let table = grammar.macro_table();
        let mut labels = Vec::new();

        for group in &analysis.groups {
            for label in &group.labels {
                let arms = plan_label(&analysis, grammar, label.as_deref(), group.exclusive);
                let compiled = arms
                    .iter()
                    .map(|arm| compile_arm(arm, &table))
                    .collect::<Result<Vec<_>, _>>()?;
                labels.push((label.clone(), Rc::new(compiled)));
            }
        }

        Ok(Scanner {
            ss: StrScanner::default(),
            state: None,
            filename: None,
            lineno: 1,
            old_pos: 0,
            start_of_current_line_pos: 0,
            env: HashMap::new(),
            options: grammar.options,
            labels,
            handlers: HashMap::new(),
            predicates: HashMap::new(),
            token_handlers: HashMap::new(),
        })
    }

    pub fn register_action(&mut self, name: &str, action: ActionFn) {
        self.handlers.insert(name.to_string(), action);
    }

    pub fn register_predicate(&mut self, name: &str, predicate: PredicateFn) {
        self.predicates.insert(name.to_string(), predicate);
    }

    pub fn register_token_handler(&mut self, kind: &str, handler: TokenFn) {
        self.token_handlers.insert(kind.to_string(), handler);
    }

    /// Prepares the scanner for an input buffer. A pre-seeded lexical
    /// state is preserved.
    pub fn parse(&mut self, input: &str) {
        self.ss = StrScanner::new(input);
        if self.options.lineno {
            self.lineno = 1;
        }
        if self.options.column {
            self.old_pos = 0;
            self.start_of_current_line_pos = 0;
        }
    }

    /// Reads in and prepares the file at `path`. I/O errors propagate
    /// unwrapped.
    pub fn parse_file(&mut self, path: &str) -> Result<(), ScanError> {
        self.filename = Some(path.to_string());
        let contents = fs::read_to_string(path)?;
        self.parse(&contents);
        Ok(())
    }

    /// The current column, starting at 0. Meaningful when the column
    /// option is on. Clamped while the newline itself is being consumed.
    pub fn column(&self) -> usize {
        self.old_pos.saturating_sub(self.start_of_current_line_pos)
    }

    /// The current location in the parse, for error messages.
    pub fn location(&self) -> String {
        let mut parts = vec![self
            .filename
            .clone()
            .unwrap_or_else(|| String::from("<input>"))];
        if self.options.lineno {
            parts.push(self.lineno.to_string());
        } else if self.options.column {
            parts.push(String::from("?"));
        }
        if self.options.column {
            parts.push(self.column().to_string());
        }
        parts.join(":")
    }

    /// Lexes the next token. Returns `None` when the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        let mut token: Option<Token> = None;

        while !self.ss.eos() && token.is_none() {
            if self.options.lineno && self.ss.check(&NEWLINE) {
                self.lineno += 1;
                if self.options.column {
                    // line starts 1 position after the newline
                    self.start_of_current_line_pos = self.ss.pos() + 1;
                }
            }
            if self.options.column {
                self.old_pos = self.ss.pos();
            }
            token = self.dispatch()?;
        }

        if let Some(tok) = &token {
            if tok.len() < 2 {
                return Err(ScanError::bad_lexical_result(
                    format_token(tok),
                    self.location(),
                ));
            }
            // auto-switch state
            if matches!(tok.first(), Some(Value::Sym(kind)) if kind == STATE_KIND) {
                self.state = tok.last().and_then(Value::as_state);
            }
        }

        if self.options.debug {
            let repr = token.as_deref().map_or_else(|| String::from("nil"), format_token);
            println!("[{}, {}]", state_repr(self.state.as_deref()), repr);
        }

        Ok(token)
    }

    /// Drains the scanner, collecting every produced token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Drives the scanner, handing each token to the handler registered
    /// for its kind.
    pub fn do_parse(&mut self) -> Result<(), ScanError> {
        while let Some(token) = self.next_token()? {
            let kind = match &token[0] {
                Value::Sym(name) | Value::Str(name) => name.clone(),
                other => other.to_string(),
            };
            let handler = *self
                .token_handlers
                .get(&kind)
                .unwrap_or_else(|| panic!("undefined token handler: {}", kind));
            handler(self, &token)?;
        }
        Ok(())
    }

    fn dispatch(&mut self) -> Result<Option<Token>, ScanError> {
        let arms = self
            .labels
            .iter()
            .find(|(label, _)| label.as_deref() == self.state.as_deref())
            .map(|(_, arms)| Rc::clone(arms));
        let Some(arms) = arms else {
            return Err(ScanError::undefined_state(
                self.state.as_deref(),
                self.location(),
            ));
        };
        match self.try_arms(&arms)? {
            Some(result) => Ok(result),
            None => Err(ScanError::scan_failure(
                self.state.as_deref(),
                self.location(),
                self.ss.rest(),
            )),
        }
    }

    /// Attempts arms in declaration order. The outer `None` means no arm
    /// matched; `Some(None)` is a successful match with no token.
    fn try_arms(&mut self, arms: &[CompiledArm]) -> Result<Option<Option<Token>>, ScanError> {
        for arm in arms {
            match arm {
                CompiledArm::Rule(rule) => {
                    if let Some(name) = &rule.predicate {
                        let predicate = *self
                            .predicates
                            .get(name)
                            .unwrap_or_else(|| panic!("undefined predicate: {}", name));
                        if !predicate(self) {
                            continue;
                        }
                    }
                    if rule.capture {
                        if let Some(text) = self.ss.scan(&rule.regex) {
                            return self.run_action(&rule.action, &text).map(Some);
                        }
                    } else if self.ss.skip(&rule.regex).is_some() {
                        return self.run_action(&rule.action, "").map(Some);
                    }
                }
                CompiledArm::Group { prefix, arms } => {
                    if self.ss.check(prefix) {
                        if let Some(result) = self.try_arms(arms)? {
                            return Ok(Some(result));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn run_action(&mut self, action: &ActionKind, text: &str) -> Result<Option<Token>, ScanError> {
        match action {
            ActionKind::None => Ok(None),
            ActionKind::Switch(target) => {
                let target = match target {
                    Some(name) => Value::sym(name),
                    None => Value::Nil,
                };
                Ok(Some(vec![Value::sym(STATE_KIND), target]))
            }
            ActionKind::Method(name) => self.invoke(name, text),
            ActionKind::Block { code, .. } => self.invoke(code, text),
        }
    }

    fn invoke(&mut self, key: &str, text: &str) -> Result<Option<Token>, ScanError> {
        let handler = *self
            .handlers
            .get(key)
            .unwrap_or_else(|| panic!("undefined action handler: {}", key));
        handler(self, text)
    }
}
