//! Composition checking: may component A contain component B?
//!
//! Conditional rules run first, in declared order, and the first rule whose
//! consequence names the child decides. Otherwise the static checks in
//! [`STATIC_CHECKS`] run in order and the first applicable one decides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stemma_common::types::Provenance;
use stemma_schema::records::{ChildConstraints, ComponentDeclaration, CompositionRule};

/// Looks up component categories by name.
///
/// Implemented by the index so the checker can evaluate category rules
/// without depending on it.
pub trait CategoryLookup {
    /// Returns the declared category of `name`, if the component is known.
    fn category_of(&self, name: &str) -> Option<String>;
}

impl CategoryLookup for BTreeMap<String, String> {
    fn category_of(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// The conditional rule that decided a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRule {
    /// Position of the rule in declared order.
    pub index: usize,
    /// Parent prop the rule tested.
    pub prop: String,
    /// Value the prop had to equal.
    pub equals: Value,
}

/// Outcome of a composition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    /// Whether the child may be contained.
    pub allowed: bool,
    /// Human-readable explanation.
    pub reason: String,
    /// Which part of the definition decided.
    pub provenance: Provenance,
    /// The deciding rule, for conditional decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<MatchedRule>,
}

impl CompositionResult {
    fn decided(allowed: bool, reason: String) -> Self {
        Self {
            allowed,
            reason,
            provenance: Provenance::Static,
            matched_rule: None,
        }
    }
}

/// Outcome of [`validate_requires`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiresCheck {
    /// Whether every required child type is present.
    pub complete: bool,
    /// Required child types that are absent.
    pub missing: Vec<String>,
}

/// Facts a static check may consult.
struct StaticInput<'a> {
    parent: &'a str,
    child: &'a str,
    child_category: Option<&'a str>,
    children: &'a ChildConstraints,
}

type StaticCheck = fn(&StaticInput<'_>) -> Option<CompositionResult>;

/// Static checks in precedence order.
const STATIC_CHECKS: [StaticCheck; 4] = [
    prohibited_child,
    allowed_children,
    prohibited_category,
    allowed_categories,
];

fn prohibited_child(input: &StaticInput<'_>) -> Option<CompositionResult> {
    contains(&input.children.prohibited, input.child).then(|| {
        CompositionResult::decided(
            false,
            format!("{} is explicitly prohibited in {}", input.child, input.parent),
        )
    })
}

fn allowed_children(input: &StaticInput<'_>) -> Option<CompositionResult> {
    if input.children.allowed.is_empty() {
        return None;
    }
    Some(if contains(&input.children.allowed, input.child) {
        CompositionResult::decided(
            true,
            format!("{} is an allowed child of {}", input.child, input.parent),
        )
    } else {
        CompositionResult::decided(
            false,
            format!("{} is not in the allowed children of {}", input.child, input.parent),
        )
    })
}

fn prohibited_category(input: &StaticInput<'_>) -> Option<CompositionResult> {
    let category = input.child_category?;
    contains(&input.children.prohibited_categories, category).then(|| {
        CompositionResult::decided(
            false,
            format!("category '{category}' is prohibited in {}", input.parent),
        )
    })
}

fn allowed_categories(input: &StaticInput<'_>) -> Option<CompositionResult> {
    let category = input.child_category?;
    let allowed = &input.children.allowed_categories;
    (!allowed.is_empty() && !contains(allowed, category)).then(|| {
        CompositionResult::decided(
            false,
            format!("category '{category}' is not an allowed category for {}", input.parent),
        )
    })
}

fn contains(list: &[String], item: &str) -> bool {
    list.iter().any(|x| x == item)
}

/// Evaluates one conditional rule; `None` means no decision.
fn evaluate_rule(
    index: usize,
    rule: &CompositionRule,
    child: &str,
    props: &BTreeMap<String, Value>,
) -> Option<CompositionResult> {
    if props.get(&rule.when.prop) != Some(&rule.when.equals) {
        return None;
    }
    let allowed = if contains(&rule.then.prohibit, child) {
        false
    } else if contains(&rule.then.allow, child) {
        true
    } else {
        return None;
    };
    let verb = if allowed { "allowed" } else { "prohibited" };
    Some(CompositionResult {
        allowed,
        reason: format!("{child} {verb} when {} = {}", rule.when.prop, rule.when.equals),
        provenance: Provenance::Conditional,
        matched_rule: Some(MatchedRule {
            index,
            prop: rule.when.prop.clone(),
            equals: rule.when.equals.clone(),
        }),
    })
}

/// Decides whether `parent` may contain `child_name`.
///
/// Pure: the same inputs always produce the same result.
#[must_use]
pub fn check(
    parent: &ComponentDeclaration,
    child_name: &str,
    lookup: &dyn CategoryLookup,
    parent_props: Option<&BTreeMap<String, Value>>,
) -> CompositionResult {
    let Some(composition) = &parent.composition else {
        return CompositionResult::decided(true, "no composition constraints".into());
    };

    let forbids_self = composition.nesting.is_some_and(|n| !n.allow_self);
    if child_name == parent.name && forbids_self {
        return CompositionResult::decided(false, format!("{child_name} cannot contain itself"));
    }

    if let Some(props) = parent_props {
        let decided = composition
            .rules
            .iter()
            .enumerate()
            .find_map(|(i, rule)| evaluate_rule(i, rule, child_name, props));
        if let Some(result) = decided {
            return result;
        }
    }

    let child_category = lookup.category_of(child_name);
    let input = StaticInput {
        parent: &parent.name,
        child: child_name,
        child_category: child_category.as_deref(),
        children: &composition.children,
    };
    STATIC_CHECKS
        .iter()
        .find_map(|rule| rule(&input))
        .unwrap_or_else(|| CompositionResult::decided(true, "No applicable constraint".into()))
}

/// Checks that every required child type appears at least once.
#[must_use]
pub fn validate_requires(
    parent: &ComponentDeclaration,
    present_child_types: &[String],
) -> RequiresCheck {
    let missing: Vec<String> = parent
        .composition
        .as_ref()
        .map(|c| {
            c.requires
                .iter()
                .filter(|r| !present_child_types.contains(*r))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    RequiresCheck {
        complete: missing.is_empty(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(yaml: &str) -> ComponentDeclaration {
        serde_yaml::from_str(yaml).expect("declaration yaml")
    }

    fn card() -> ComponentDeclaration {
        declaration(
            r"
name: Card
type: container
composition:
  children:
    allowed: [Text, Button]
  rules:
    - when: { prop: role, equals: button }
      then: { prohibit: [Button] }
",
        )
    }

    fn props(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn no_categories() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn no_composition_allows_anything() {
        let parent = declaration("name: Icon\n");
        let result = check(&parent, "Anything", &no_categories(), None);
        assert!(result.allowed);
        assert_eq!(result.provenance, Provenance::Static);
        assert_eq!(result.reason, "no composition constraints");
    }

    #[test]
    fn static_allow_list_without_props() {
        let result = check(&card(), "Button", &no_categories(), Some(&props(&[])));
        assert!(result.allowed);
        assert_eq!(result.provenance, Provenance::Static);
    }

    #[test]
    fn matching_rule_overrides_static_allow() {
        let p = props(&[("role", Value::String("button".into()))]);
        let result = check(&card(), "Button", &no_categories(), Some(&p));
        assert!(!result.allowed);
        assert_eq!(result.provenance, Provenance::Conditional);
        assert_eq!(result.matched_rule.expect("rule").index, 0);
    }

    #[test]
    fn rule_requires_strict_equality() {
        let p = props(&[("role", Value::Bool(true))]);
        let result = check(&card(), "Button", &no_categories(), Some(&p));
        assert!(result.allowed);
        assert_eq!(result.provenance, Provenance::Static);
    }

    #[test]
    fn rule_without_decision_falls_through_to_next_rule() {
        let parent = declaration(
            r"
name: Panel
composition:
  children:
    allowed: [Text]
  rules:
    - when: { prop: dense, equals: true }
      then: { prohibit: [Divider] }
    - when: { prop: dense, equals: true }
      then: { allow: [Icon] }
",
        );
        let p = props(&[("dense", Value::Bool(true))]);
        let result = check(&parent, "Icon", &no_categories(), Some(&p));
        assert!(result.allowed);
        assert_eq!(result.provenance, Provenance::Conditional);
        assert_eq!(result.matched_rule.expect("rule").index, 1);
    }

    #[test]
    fn rule_without_decision_falls_through_to_static() {
        let parent = declaration(
            r"
name: Panel
composition:
  children:
    allowed: [Text]
  rules:
    - when: { prop: dense, equals: true }
      then: { prohibit: [Divider] }
",
        );
        let p = props(&[("dense", Value::Bool(true))]);
        let result = check(&parent, "Icon", &no_categories(), Some(&p));
        assert!(!result.allowed);
        assert_eq!(result.provenance, Provenance::Static);
    }

    #[test]
    fn self_nesting_denied_even_if_allowed() {
        let parent = declaration(
            r"
name: List
composition:
  children:
    allowed: [List, Item]
  nesting:
    self: false
",
        );
        let result = check(&parent, "List", &no_categories(), None);
        assert!(!result.allowed);
        assert!(result.reason.contains("cannot contain itself"));
    }

    #[test]
    fn prohibited_list_beats_allowed_list() {
        let parent = declaration(
            r"
name: Row
composition:
  children:
    allowed: [Chip]
    prohibited: [Chip]
",
        );
        let result = check(&parent, "Chip", &no_categories(), None);
        assert!(!result.allowed);
        assert!(result.reason.contains("explicitly prohibited"));
    }

    #[test]
    fn allowed_list_is_exhaustive() {
        let result = check(&card(), "Avatar", &no_categories(), None);
        assert!(!result.allowed);
        assert!(result.reason.contains("not in the allowed children"));
    }

    #[test]
    fn category_rules_use_lookup() {
        let parent = declaration(
            r"
name: Toolbar
composition:
  children:
    prohibited_categories: [container]
    allowed_categories: [action, primitive]
",
        );
        let mut categories = BTreeMap::new();
        let _ = categories.insert("Card".to_string(), "container".to_string());
        let _ = categories.insert("Button".to_string(), "action".to_string());
        let _ = categories.insert("Chart".to_string(), "visualization".to_string());

        assert!(!check(&parent, "Card", &categories, None).allowed);
        assert!(check(&parent, "Button", &categories, None).allowed);
        let chart = check(&parent, "Chart", &categories, None);
        assert!(!chart.allowed);
        assert!(chart.reason.contains("not an allowed category"));
    }

    #[test]
    fn unknown_child_skips_category_rules() {
        let parent = declaration(
            r"
name: Toolbar
composition:
  children:
    allowed_categories: [action]
",
        );
        let result = check(&parent, "Mystery", &no_categories(), None);
        assert!(result.allowed);
        assert_eq!(result.reason, "No applicable constraint");
    }

    #[test]
    fn check_is_deterministic() {
        let p = props(&[("role", Value::String("button".into()))]);
        let a = check(&card(), "Button", &no_categories(), Some(&p));
        let b = check(&card(), "Button", &no_categories(), Some(&p));
        assert_eq!(a, b);
    }

    #[test]
    fn requires_reports_missing_types() {
        let parent = declaration(
            r"
name: Form
composition:
  requires: [Input, SubmitButton]
",
        );
        let check = validate_requires(&parent, &["Input".to_string(), "Input".to_string()]);
        assert!(!check.complete);
        assert_eq!(check.missing, vec!["SubmitButton"]);

        let all = validate_requires(&parent, &["SubmitButton".to_string(), "Input".to_string()]);
        assert!(all.complete);
    }

    #[test]
    fn requires_absent_is_complete() {
        let check = validate_requires(&declaration("name: Icon\n"), &[]);
        assert!(check.complete);
        assert!(check.missing.is_empty());
    }
}
