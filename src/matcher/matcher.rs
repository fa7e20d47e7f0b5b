use lazy_static::lazy_static;
use regex::Regex;

use crate::analyzer::analyzer::{Analysis, Candidate, Guard};
use crate::grammar::grammar::{Grammar, Rule};

lazy_static! {
    static ref TEXT_REF: Regex = Regex::new(r"\btext\b").unwrap();
}

/// What a rule's action does, classified from its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// No action: the rule consumes input and emits nothing.
    None,
    /// An inline code block, passed through verbatim. `uses_text` records
    /// whether the code references the captured `text` binding.
    Block { code: String, uses_text: bool },
    /// A bare state literal: switch to the named state (`None` resets to
    /// the default) and emit the switch as a token.
    Switch(Option<String>),
    /// A callable that receives the captured text.
    Method(String),
}

pub fn classify_action(action: Option<&str>) -> ActionKind {
    match action {
        None => ActionKind::None,
        Some(code) if code.starts_with('{') => ActionKind::Block {
            code: code.to_string(),
            uses_text: TEXT_REF.is_match(code),
        },
        Some("nil") => ActionKind::Switch(None),
        Some(name) if name.starts_with(':') => ActionKind::Switch(Some(name[1..].to_string())),
        Some(name) => ActionKind::Method(name.to_string()),
    }
}

/// One planned rule attempt: an optional predicate precondition, the raw
/// pattern, whether the match must capture its text, and the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleArm {
    pub predicate: Option<String>,
    pub pattern: String,
    pub capture: bool,
    pub action: ActionKind,
}

/// One arm of a dispatch label, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arm {
    Rule(RuleArm),
    /// A prefix-grouped set of member arms. The prefix is tested
    /// non-consumingly; if it succeeds but no member matches, scanning
    /// continues with the enclosing label's next arm.
    Group { prefix: String, arms: Vec<Arm> },
}

fn plan_rule(rule: &Rule) -> RuleArm {
    let action = classify_action(rule.action.as_deref());
    // Capturing allocates the matched substring, so it is reserved for
    // actions that actually look at the text.
    let capture = match &action {
        ActionKind::Method(_) => true,
        ActionKind::Block { uses_text, .. } => *uses_text,
        ActionKind::None | ActionKind::Switch(_) => false,
    };
    let predicate = match Guard::classify(rule.start.as_deref()) {
        Guard::Predicate(name) => Some(name),
        _ => None,
    };
    RuleArm {
        predicate,
        pattern: rule.pattern.clone(),
        capture,
        action,
    }
}

/// Plans the ordered arms for one dispatch label. State-guard equality is
/// already resolved by the per-label dispatch, so only predicate guards
/// survive as runtime preconditions.
pub fn plan_label(
    analysis: &Analysis,
    grammar: &Grammar,
    label: Option<&str>,
    exclusive: bool,
) -> Vec<Arm> {
    analysis
        .candidates(grammar, label, exclusive)
        .into_iter()
        .map(|candidate| match candidate {
            Candidate::Rule(rule) => Arm::Rule(plan_rule(rule)),
            Candidate::Group { prefix, rules } => Arm::Group {
                prefix: prefix.to_string(),
                arms: rules.into_iter().map(|r| Arm::Rule(plan_rule(r))).collect(),
            },
        })
        .collect()
}
