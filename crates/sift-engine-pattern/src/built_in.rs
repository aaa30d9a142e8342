//! Built-in rule packs embedded in the binary
//!
//! Packs are embedded at compile time via `include_str!()` so a fresh
//! install has working engines with no rule files on disk.

/// Apex rules (governor limits, security, error handling)
pub const APEX_RULES: &str = include_str!("built_in/apex.toml");

/// JavaScript/TypeScript rules (security, leftover debugging, style)
pub const JAVASCRIPT_RULES: &str = include_str!("built_in/javascript.toml");

/// Names of every embedded pack.
pub const BUILT_IN_PACKS: &[&str] = &["apex", "javascript"];

/// Source of the named pack, if one exists.
pub fn built_in_rules(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "apex" => Some(APEX_RULES),
        "javascript" => Some(JAVASCRIPT_RULES),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::CompiledRule;
    use crate::rule_file::PatternRuleFile;

    #[test]
    fn test_every_pack_parses_and_compiles() {
        for name in BUILT_IN_PACKS {
            let source = built_in_rules(name).unwrap();
            let file: PatternRuleFile = toml::from_str(source).unwrap();
            assert!(!file.rules.is_empty(), "{name} is empty");
            for rule in file.rules {
                let rule_name = rule.name.clone();
                assert!((1..=5).contains(&rule.severity), "{rule_name}");
                CompiledRule::compile(rule).unwrap_or_else(|e| panic!("{rule_name}: {e}"));
            }
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(built_in_rules("Apex").is_some());
        assert!(built_in_rules("pmd").is_none());
    }

    #[test]
    fn test_javascript_pack_matches_eval() {
        let file: PatternRuleFile = toml::from_str(JAVASCRIPT_RULES).unwrap();
        let rule = file.rules.into_iter().find(|r| r.name == "no-eval").unwrap();
        let compiled = CompiledRule::compile(rule).unwrap();
        assert_eq!(compiled.find_matches("const x = eval(input);").len(), 1);
        assert!(compiled.find_matches("const medieval = 1;").is_empty());
    }
}
