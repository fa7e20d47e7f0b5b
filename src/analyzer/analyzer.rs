use crate::grammar::grammar::{Grammar, Item, Rule};

/// A rule guard, classified once from its raw text.
///
/// A `:`-prefixed guard names a lexical state; the state is exclusive when
/// the character after the marker is uppercase. Any other guard names a
/// zero-argument boolean predicate on the scanner. State names are stored
/// without the marker from this point on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    None,
    State { name: String, exclusive: bool },
    Predicate(String),
}

impl Guard {
    pub fn classify(start: Option<&str>) -> Guard {
        match start {
            None => Guard::None,
            Some(raw) => match raw.strip_prefix(':') {
                Some(name) => {
                    let exclusive = name.chars().next().is_some_and(|c| c.is_uppercase());
                    Guard::State {
                        name: name.to_string(),
                        exclusive,
                    }
                }
                None => Guard::Predicate(raw.to_string()),
            },
        }
    }
}

/// One dispatch case of the generated scanner. The combined group carries
/// the default label (`None`) plus every inclusive state; each exclusive
/// state gets a singleton group of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchGroup {
    pub labels: Vec<Option<String>>,
    pub exclusive: bool,
}

/// The analyzer's output over one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analysis {
    pub inclusives: Vec<String>,
    pub exclusives: Vec<String>,
    pub predicates: Vec<String>,
    pub groups: Vec<DispatchGroup>,
}

/// A candidate visible under one dispatch label, in declaration order.
/// Group members are filtered by the same visibility rule as top-level
/// rules, scoped to their group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate<'g> {
    Rule(&'g Rule),
    Group {
        prefix: &'g str,
        rules: Vec<&'g Rule>,
    },
}

/// Discovers and classifies the guards of a grammar, in first-seen order,
/// and builds its dispatch groups.
pub fn analyze(grammar: &Grammar) -> Analysis {
    let mut analysis = Analysis::default();
    let mut seen: Vec<&str> = Vec::new();

    for item in &grammar.items {
        let rules = match item {
            Item::Rule(rule) => std::slice::from_ref(rule),
            Item::Group(group) => group.rules.as_slice(),
        };
        for rule in rules {
            let Some(raw) = rule.start.as_deref() else {
                continue;
            };
            if seen.contains(&raw) {
                continue;
            }
            seen.push(raw);
            match Guard::classify(Some(raw)) {
                Guard::State { name, exclusive: true } => analysis.exclusives.push(name),
                Guard::State { name, exclusive: false } => analysis.inclusives.push(name),
                Guard::Predicate(name) => analysis.predicates.push(name),
                Guard::None => {}
            }
        }
    }

    let mut labels = vec![None];
    labels.extend(analysis.inclusives.iter().cloned().map(Some));
    analysis.groups.push(DispatchGroup {
        labels,
        exclusive: false,
    });
    for name in &analysis.exclusives {
        analysis.groups.push(DispatchGroup {
            labels: vec![Some(name.clone())],
            exclusive: true,
        });
    }

    analysis
}

impl Analysis {
    /// Whether a rule is visible under a dispatch label.
    ///
    /// Unguarded rules are shared by the default state and every inclusive
    /// state; an exclusive state sees only its own rules; predicate-guarded
    /// rules are active only in the default state.
    pub fn visible(&self, rule: &Rule, label: Option<&str>, exclusive: bool) -> bool {
        match (Guard::classify(rule.start.as_deref()), label) {
            (Guard::None, _) => !exclusive,
            (Guard::State { name, .. }, Some(label)) => name == label,
            (Guard::State { .. }, None) => false,
            (Guard::Predicate(_), None) => true,
            (Guard::Predicate(_), Some(_)) => false,
        }
    }

    /// The predicate names active under a dispatch label.
    pub fn active_predicates(&self, label: Option<&str>) -> &[String] {
        match label {
            None => &self.predicates,
            Some(_) => &[],
        }
    }

    /// The ordered, filtered candidate list for a dispatch label. A group
    /// survives only if at least one member is visible.
    pub fn candidates<'g>(
        &self,
        grammar: &'g Grammar,
        label: Option<&str>,
        exclusive: bool,
    ) -> Vec<Candidate<'g>> {
        let mut candidates = Vec::new();
        for item in &grammar.items {
            match item {
                Item::Rule(rule) => {
                    if self.visible(rule, label, exclusive) {
                        candidates.push(Candidate::Rule(rule));
                    }
                }
                Item::Group(group) => {
                    let rules: Vec<&Rule> = group
                        .rules
                        .iter()
                        .filter(|rule| self.visible(rule, label, exclusive))
                        .collect();
                    if !rules.is_empty() {
                        candidates.push(Candidate::Group {
                            prefix: &group.prefix,
                            rules,
                        });
                    }
                }
            }
        }
        candidates
    }
}
