//! Rule filters.
//!
//! A filter list is conjunctive: a rule must satisfy every filter. Within a
//! filter the values are disjunctive. Comparisons ignore ASCII case.

use sift_core::{Rule, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleFilter {
    Category(Vec<String>),
    Ruleset(Vec<String>),
    Language(Vec<String>),
    RuleName(Vec<String>),
    Engine(Vec<String>),
    Tag(Vec<String>),
    Severity(Vec<Severity>),
}

fn any_eq(haystack: &[String], needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| haystack.iter().any(|h| h.eq_ignore_ascii_case(n)))
}

fn one_of(value: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| value.eq_ignore_ascii_case(n))
}

impl RuleFilter {
    /// Whether `rule` satisfies this filter.
    pub fn matches(&self, rule: &Rule) -> bool {
        match self {
            RuleFilter::Category(values) => any_eq(&rule.categories, values),
            RuleFilter::Ruleset(values) => any_eq(&rule.rulesets, values),
            RuleFilter::Language(values) => any_eq(&rule.languages, values),
            RuleFilter::RuleName(values) => one_of(&rule.name, values),
            RuleFilter::Engine(values) => one_of(&rule.engine, values),
            RuleFilter::Tag(values) => any_eq(&rule.tags, values),
            RuleFilter::Severity(values) => values.contains(&rule.severity),
        }
    }

    /// Category and ruleset filters also select rule groups.
    pub fn is_group_filter(&self) -> bool {
        matches!(self, RuleFilter::Category(_) | RuleFilter::Ruleset(_))
    }
}

/// True when `rule` satisfies every filter in `filters`.
pub fn matches_all(filters: &[RuleFilter], rule: &Rule) -> bool {
    filters.iter().all(|f| f.matches(rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, engine: &str, categories: &[&str], languages: &[&str]) -> Rule {
        Rule {
            name: name.to_string(),
            engine: engine.to_string(),
            severity: Severity::Moderate,
            tags: vec!["Recommended".to_string()],
            categories: categories.iter().map(|s| s.to_string()).collect(),
            rulesets: vec![],
            languages: languages.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
            resource_urls: vec![],
            is_pilot: false,
            default_enabled: true,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_disjunction_within_filter() {
        let r = rule("R", "apex", &["Security"], &["apex"]);
        assert!(RuleFilter::Category(strings(&["Performance", "security"])).matches(&r));
        assert!(!RuleFilter::Category(strings(&["Performance"])).matches(&r));
    }

    #[test]
    fn test_conjunction_across_filters() {
        let r = rule("R", "apex", &["Security"], &["apex"]);
        let both = vec![
            RuleFilter::Category(strings(&["Security", "Style"])),
            RuleFilter::Language(strings(&["apex"])),
        ];
        assert!(matches_all(&both, &r));

        let wrong_language = vec![
            RuleFilter::Category(strings(&["Security"])),
            RuleFilter::Language(strings(&["javascript"])),
        ];
        assert!(!matches_all(&wrong_language, &r));
    }

    #[test]
    fn test_name_engine_tag_severity() {
        let r = rule("NoEval", "javascript", &[], &["javascript"]);
        assert!(RuleFilter::RuleName(strings(&["noeval"])).matches(&r));
        assert!(RuleFilter::Engine(strings(&["JavaScript"])).matches(&r));
        assert!(RuleFilter::Tag(strings(&["recommended"])).matches(&r));
        assert!(RuleFilter::Severity(vec![Severity::Moderate]).matches(&r));
        assert!(!RuleFilter::Severity(vec![Severity::High]).matches(&r));
    }

    #[test]
    fn test_group_filter_kinds() {
        assert!(RuleFilter::Ruleset(vec![]).is_group_filter());
        assert!(!RuleFilter::Engine(vec![]).is_group_filter());
    }
}
