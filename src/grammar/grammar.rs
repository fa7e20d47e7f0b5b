use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref MACRO_REF: Regex = Regex::new(r"#\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// A named pattern fragment. Macros may reference earlier-declared macros
/// with `#{NAME}`; forward references are unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub pattern: String,
}

/// A lexical rule: an optional guard (state name or predicate name), a
/// pattern fragment, and an optional action.
///
/// The guard and action are raw text here; they are classified once by the
/// analyzer and the match planner respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub start: Option<String>,
    pub pattern: String,
    pub action: Option<String>,
}

impl Rule {
    pub fn new(start: Option<&str>, pattern: &str, action: Option<&str>) -> Rule {
        Rule {
            start: start.filter(|s| !s.is_empty()).map(str::to_string),
            pattern: pattern.to_string(),
            action: action.map(str::to_string),
        }
    }
}

/// Rules sharing a common regex prefix. The prefix is tested once,
/// non-consumingly, before any member rule is attempted. Groups do not
/// nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub prefix: String,
    pub rules: Vec<Rule>,
}

/// One entry in the top-level rule sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Rule(Rule),
    Group(Group),
}

/// Generator options, all off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub debug: bool,
    pub do_parse: bool,
    pub lineno: bool,
    pub column: bool,
    pub stub: bool,
}

impl Options {
    /// Turns on a recognized option. Unknown names are ignored.
    pub fn set(&mut self, name: &str) {
        match name {
            "debug" => self.debug = true,
            "do_parse" => self.do_parse = true,
            "lineno" => self.lineno = true,
            "column" => self.column = true,
            "stub" => self.stub = true,
            _ => {}
        }
    }
}

/// The full grammar for one scanner, built once per generation request and
/// immutable afterwards.
///
/// Declaration order of rules, groups, and macros is preserved and is
/// semantically meaningful: scanning is first-match in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub class_name: Option<String>,
    pub superclass: Option<String>,
    pub filename: Option<String>,
    pub header: Vec<String>,
    pub ends: Vec<String>,
    pub inners: Vec<String>,
    pub starts: Vec<String>,
    pub macros: Vec<Macro>,
    pub items: Vec<Item>,
    pub options: Options,
    open_group: Option<Group>,
}

impl PartialEq for Grammar {
    // Options, the source filename, and transient builder state do not
    // take part in structural equality.
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.superclass == other.superclass
            && self.header == other.header
            && self.ends == other.ends
            && self.inners == other.inners
            && self.macros == other.macros
            && self.items == other.items
            && self.starts == other.starts
    }
}

impl Grammar {
    pub fn new() -> Grammar {
        Grammar::default()
    }

    /// Records the class header: the prefix lines go to the header, the
    /// name becomes the class name. A ` < Super` suffix in the name is
    /// split off as the superclass.
    pub fn set_class(&mut self, prefix: &str, name: &str) {
        if !prefix.is_empty() {
            self.header.extend(prefix.split('\n').map(str::to_string));
        }
        match name.split_once(" < ") {
            Some((class, superclass)) => {
                self.class_name = Some(class.trim().to_string());
                self.superclass = Some(superclass.trim().to_string());
            }
            None => self.class_name = Some(name.to_string()),
        }
    }

    pub fn set_filename(&mut self, filename: &str) {
        self.filename = Some(filename.to_string());
    }

    pub fn add_macro(&mut self, name: &str, pattern: &str) {
        self.macros.push(Macro {
            name: name.to_string(),
            pattern: pattern.to_string(),
        });
    }

    /// Appends a top-level rule, closing any open group.
    pub fn add_rule(&mut self, start: Option<&str>, pattern: &str, action: Option<&str>) {
        self.close_group();
        self.items.push(Item::Rule(Rule::new(start, pattern, action)));
    }

    /// Opens a new group, closing any previously open one.
    pub fn begin_group(&mut self, prefix: &str) {
        self.close_group();
        self.open_group = Some(Group {
            prefix: prefix.to_string(),
            rules: Vec::new(),
        });
    }

    /// Appends a rule to the open group.
    ///
    /// # Panics
    ///
    /// Panics if no group is open; the front-end must open a group first.
    pub fn add_group_rule(&mut self, start: Option<&str>, pattern: &str, action: Option<&str>) {
        let group = self
            .open_group
            .as_mut()
            .expect("grouped rule declared outside a group");
        group.rules.push(Rule::new(start, pattern, action));
    }

    /// Commits the open group, if any, to the rule sequence.
    pub fn close_group(&mut self) {
        if let Some(group) = self.open_group.take() {
            self.items.push(Item::Group(group));
        }
    }

    /// A state boundary always terminates a group. The state itself is
    /// discovered from rule guards, so nothing else is recorded.
    pub fn add_state(&mut self, _name: &str) {
        self.close_group();
    }

    /// A line to run at the top of every `next_token` call.
    pub fn add_start(&mut self, line: &str) {
        self.starts.push(line.trim().to_string());
    }

    /// A line to place inside the generated impl block.
    pub fn add_inner(&mut self, line: &str) {
        self.inners.push(line.to_string());
    }

    /// A line to place after the generated scanner.
    pub fn add_end(&mut self, line: &str) {
        self.ends.push(line.to_string());
    }

    pub fn set_option(&mut self, name: &str) {
        self.options.set(name);
    }

    /// The macro table with every value expanded against earlier entries.
    /// Declaration order doubles as dependency order, so a single pass
    /// resolves recursive chains.
    pub fn macro_table(&self) -> Vec<(String, String)> {
        let mut table: Vec<(String, String)> = Vec::new();
        for mac in &self.macros {
            let expanded = expand(&mac.pattern, &table);
            table.push((mac.name.clone(), expanded));
        }
        table
    }
}

/// Substitutes `#{NAME}` references from the given table into a pattern
/// fragment. Unknown names are left verbatim; they surface later as
/// target-engine pattern errors, never as model errors.
pub fn expand(pattern: &str, table: &[(String, String)]) -> String {
    MACRO_REF
        .replace_all(pattern, |caps: &Captures| {
            let name = &caps[1];
            table
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
