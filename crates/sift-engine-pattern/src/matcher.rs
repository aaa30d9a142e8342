//! Compiled rules and line matching.

use crate::constants::{MAX_REGEX_LENGTH, REGEX_DFA_SIZE_LIMIT, REGEX_SIZE_LIMIT};
use crate::rule_file::PatternRule;
use crate::{Result, RuleError};
use regex::{Regex, RegexBuilder};

/// Compile a regex with size limits to prevent ReDoS attacks
///
/// - Pattern length limit (500 chars)
/// - Compiled regex size limit (10MB)
/// - DFA size limit (2MB)
pub fn compile_regex_safe(rule: &str, pattern: &str) -> Result<Regex> {
    if pattern.len() > MAX_REGEX_LENGTH {
        return Err(RuleError::InvalidPattern {
            rule: rule.to_string(),
            message: format!("pattern exceeds {} characters", MAX_REGEX_LENGTH),
        });
    }

    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            rule: rule.to_string(),
            message: e.to_string(),
        })
}

/// One match, with 1-based positions. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// A rule ready for execution
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: PatternRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn compile(rule: PatternRule) -> Result<Self> {
        let regex = compile_regex_safe(&rule.name, &rule.pattern)?;
        Ok(Self { rule, regex })
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    /// Every non-empty match in `content`, in source order.
    pub fn find_matches(&self, content: &str) -> Vec<LineMatch> {
        let mut matches = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_number = index as u32 + 1;
            for m in self.regex.find_iter(line) {
                if m.as_str().is_empty() {
                    continue;
                }
                let column = line[..m.start()].chars().count() as u32 + 1;
                let width = m.as_str().chars().count() as u32;
                matches.push(LineMatch {
                    line: line_number,
                    column,
                    end_line: line_number,
                    end_column: column + width,
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str) -> PatternRule {
        PatternRule {
            name: "test".to_string(),
            severity: 3,
            description: "test rule".to_string(),
            pattern: pattern.to_string(),
            message: None,
            tags: vec![],
            categories: vec![],
            rulesets: vec![],
            languages: vec![],
            resource_urls: vec![],
            default_enabled: true,
            pilot: false,
        }
    }

    #[test]
    fn test_positions_are_one_based() {
        let compiled = CompiledRule::compile(rule(r"eval\(")).unwrap();
        let matches = compiled.find_matches("let a = 1;\n  eval(x); eval(y)\n");

        assert_eq!(
            matches,
            vec![
                LineMatch { line: 2, column: 3, end_line: 2, end_column: 8 },
                LineMatch { line: 2, column: 12, end_line: 2, end_column: 17 },
            ]
        );
    }

    #[test]
    fn test_columns_count_characters() {
        let compiled = CompiledRule::compile(rule("TODO")).unwrap();
        let matches = compiled.find_matches("// é TODO");
        assert_eq!(matches[0].column, 6);
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let compiled = CompiledRule::compile(rule("x*")).unwrap();
        assert!(compiled.find_matches("abc").is_empty());
    }

    #[test]
    fn test_long_pattern_rejected() {
        let long = "a".repeat(MAX_REGEX_LENGTH + 1);
        assert!(matches!(
            compile_regex_safe("long", &long),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(CompiledRule::compile(rule("(unclosed")).is_err());
    }
}
