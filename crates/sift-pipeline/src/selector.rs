//! Rule selector parsing and resolution.
//!
//! A selector is a list of tokens. Tokens are split on whitespace and
//! commas; each resulting term may join several atoms with `:` and then
//! matches only rules that satisfy every atom. A rule is selected when any
//! term matches it.
//!
//! Atoms match, ignoring ASCII case: `all`, `recommended` (default-enabled
//! rules), an engine name, a rule name, a tag, a category, a ruleset, or a
//! severity given by name or number.

use crate::catalog::LocalCatalog;
use crate::filter::{matches_all, RuleFilter};
use sift_core::{EnginePartition, Error, EventHub, Result, Rule, RuleSelection, Severity};

const COMPOUND_DELIMITER: char = ':';

/// Split raw selector arguments on whitespace and commas.
pub fn normalize_tokens<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|token| {
            token
                .as_ref()
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    raw: String,
    atoms: Vec<String>,
}

/// A parsed rule selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    terms: Vec<Term>,
}

impl Selector {
    /// Parse raw selector arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSelector` when a compound term has an empty
    /// atom, such as `apex:` or `a::b`.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let mut terms = Vec::new();
        for token in normalize_tokens(raw) {
            let atoms: Vec<String> = token
                .split(COMPOUND_DELIMITER)
                .map(|atom| atom.trim().to_string())
                .collect();
            if atoms.iter().any(String::is_empty) {
                return Err(Error::InvalidSelector {
                    selector: token,
                    reason: format!("'{}' separates two non-empty names", COMPOUND_DELIMITER),
                });
            }
            terms.push(Term { raw: token, atoms });
        }
        Ok(Self { terms })
    }

    /// Normalized terms, in input order.
    pub fn terms(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.raw.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether any term selects `rule`.
    pub fn matches(&self, rule: &Rule) -> bool {
        self.terms
            .iter()
            .any(|term| term.atoms.iter().all(|atom| atom_matches(atom, rule)))
    }

    fn atoms(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .flat_map(|t| t.atoms.iter().map(String::as_str))
    }
}

fn atom_matches(atom: &str, rule: &Rule) -> bool {
    let eq = |value: &String| value.eq_ignore_ascii_case(atom);
    atom.eq_ignore_ascii_case("all")
        || (atom.eq_ignore_ascii_case("recommended") && rule.default_enabled)
        || rule.engine.eq_ignore_ascii_case(atom)
        || rule.name.eq_ignore_ascii_case(atom)
        || rule.tags.iter().any(eq)
        || rule.categories.iter().any(eq)
        || rule.rulesets.iter().any(eq)
        || atom
            .parse::<Severity>()
            .map(|sev| sev == rule.severity)
            .unwrap_or(false)
}

/// Resolves selectors against a catalog.
pub struct SelectionResolver<'a> {
    catalog: &'a LocalCatalog,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(catalog: &'a LocalCatalog) -> Self {
        Self { catalog }
    }

    /// Produce the rule selection for `selector`, intersected with `filters`.
    ///
    /// Partitions follow engine registration order and rules follow catalog
    /// discovery order, so the same inputs always give the same selection.
    /// Each partition carries the rule groups named by the selector's
    /// category/ruleset atoms and any category/ruleset filters; with none,
    /// every category of the engine is included.
    pub fn resolve(
        &self,
        selector: &Selector,
        filters: &[RuleFilter],
        events: &EventHub,
    ) -> RuleSelection {
        let catalog = self.catalog.catalog();

        let mut partitions: Vec<EnginePartition> = self
            .catalog
            .engine_order()
            .iter()
            .map(|engine| EnginePartition {
                engine: engine.clone(),
                groups: Vec::new(),
                rules: catalog
                    .rules_for_engine(engine)
                    .filter(|rule| selector.matches(rule) && matches_all(filters, rule))
                    .cloned()
                    .collect(),
            })
            .filter(|p| !p.rules.is_empty())
            .collect();

        if partitions.is_empty() {
            return RuleSelection::new(partitions);
        }

        let mut group_filters = self.group_filters(selector, filters);
        group_filters.push(RuleFilter::Engine(
            partitions.iter().map(|p| p.engine.clone()).collect(),
        ));
        let groups = self.catalog.rule_groups_matching(&group_filters, events);

        for partition in &mut partitions {
            partition.groups = groups
                .iter()
                .filter(|g| g.engine == partition.engine)
                .map(|g| (*g).clone())
                .collect();
        }

        RuleSelection::new(partitions)
    }

    fn group_filters(&self, selector: &Selector, filters: &[RuleFilter]) -> Vec<RuleFilter> {
        let catalog = self.catalog.catalog();
        let mut categories = Vec::new();
        let mut rulesets = Vec::new();

        for atom in selector.atoms() {
            let named = |g: &sift_core::RuleGroup| g.name.eq_ignore_ascii_case(atom);
            if catalog.categories.iter().any(named) {
                categories.push(atom.to_string());
            }
            if catalog.rulesets.iter().any(named) {
                rulesets.push(atom.to_string());
            }
        }

        let mut out: Vec<RuleFilter> = filters
            .iter()
            .filter(|f| f.is_group_filter())
            .cloned()
            .collect();
        if !categories.is_empty() {
            out.push(RuleFilter::Category(categories));
        }
        if !rulesets.is_empty() {
            out.push(RuleFilter::Ruleset(rulesets));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{Catalog, RuleGroup};

    fn rule(
        name: &str,
        engine: &str,
        severity: Severity,
        tags: &[&str],
        default_enabled: bool,
    ) -> Rule {
        Rule {
            name: name.to_string(),
            engine: engine.to_string(),
            severity,
            tags: tags.iter().map(|s| s.to_string()).collect(),
            categories: vec!["Security".to_string()],
            rulesets: vec![],
            languages: vec![],
            description: String::new(),
            resource_urls: vec![],
            is_pilot: false,
            default_enabled,
        }
    }

    fn catalog() -> LocalCatalog {
        LocalCatalog::new(
            Catalog {
                rules: vec![
                    rule("NoEval", "javascript", Severity::High, &["Security"], true),
                    rule("SoqlInLoop", "apex", Severity::Critical, &["Performance"], true),
                    rule("Naming", "apex", Severity::Info, &["Style"], false),
                    rule("NoVar", "javascript", Severity::Low, &["Style"], false),
                ],
                categories: vec![
                    RuleGroup {
                        name: "Security".to_string(),
                        engine: "apex".to_string(),
                        paths: vec![],
                    },
                    RuleGroup {
                        name: "Security".to_string(),
                        engine: "javascript".to_string(),
                        paths: vec![],
                    },
                ],
                rulesets: vec![],
            },
            vec!["apex".to_string(), "javascript".to_string()],
            0,
        )
    }

    fn names(selection: &RuleSelection) -> Vec<String> {
        selection.rules().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_normalize_tokens() {
        assert_eq!(
            normalize_tokens(&["  apex,  Style ", "javascript:2"]),
            vec!["apex", "Style", "javascript:2"]
        );
        assert!(normalize_tokens(&[" , "]).is_empty());
    }

    #[test]
    fn test_invalid_compound() {
        assert!(matches!(
            Selector::parse(&["apex:"]),
            Err(Error::InvalidSelector { .. })
        ));
        assert!(Selector::parse(&["a::b"]).is_err());
    }

    #[test]
    fn test_recommended_follows_registration_order() {
        let catalog = catalog();
        let selector = Selector::parse(&["Recommended"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], &EventHub::new());
        assert_eq!(names(&selection), vec!["SoqlInLoop", "NoEval"]);
        assert_eq!(selection.engines(), vec!["apex", "javascript"]);
    }

    #[test]
    fn test_compound_is_conjunctive() {
        let catalog = catalog();
        let selector = Selector::parse(&["javascript:Style"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], &EventHub::new());
        assert_eq!(names(&selection), vec!["NoVar"]);
    }

    #[test]
    fn test_terms_are_disjunctive_and_deduplicated() {
        let catalog = catalog();
        let selector = Selector::parse(&["Style,apex", "1"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], &EventHub::new());
        assert_eq!(names(&selection), vec!["SoqlInLoop", "Naming", "NoVar"]);
    }

    #[test]
    fn test_severity_names_and_numbers() {
        let catalog = catalog();
        let resolver = SelectionResolver::new(&catalog);
        let by_name = resolver.resolve(&Selector::parse(&["high"]).unwrap(), &[], &EventHub::new());
        let by_number = resolver.resolve(&Selector::parse(&["2"]).unwrap(), &[], &EventHub::new());
        assert_eq!(names(&by_name), vec!["NoEval"]);
        assert_eq!(by_name, by_number);
    }

    #[test]
    fn test_unmatched_selector_is_empty_not_error() {
        let catalog = catalog();
        let selector = Selector::parse(&["nothing-here"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], &EventHub::new());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_filters_intersect_selector() {
        let catalog = catalog();
        let selector = Selector::parse(&["all"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(
            &selector,
            &[RuleFilter::Engine(vec!["apex".to_string()])],
            &EventHub::new(),
        );
        assert_eq!(names(&selection), vec!["SoqlInLoop", "Naming"]);
    }

    #[test]
    fn test_category_atom_selects_groups() {
        let catalog = catalog();
        let selector = Selector::parse(&["apex:Security"]).unwrap();
        let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], &EventHub::new());
        let partition = selection.for_engine("apex").unwrap();
        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].engine, "apex");
        assert!(selection.for_engine("javascript").is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = catalog();
        let selector = Selector::parse(&["all"]).unwrap();
        let resolver = SelectionResolver::new(&catalog);
        let first = resolver.resolve(&selector, &[], &EventHub::new());
        let second = resolver.resolve(&selector, &[], &EventHub::new());
        assert_eq!(first, second);
    }
}
