//! Engine target patterns.
//!
//! An engine declares glob patterns; a pattern starting with `!` is an
//! exclusion. A path is selected iff it matches at least one inclusion and
//! no exclusion. Paths are compared in forward-slash relative form.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Characters that make a target a glob rather than a literal path.
const GLOB_MAGIC: &[char] = &['*', '?', '['];

/// Returns true if `target` contains glob metacharacters.
pub fn has_magic(target: &str) -> bool {
    target.contains(GLOB_MAGIC)
}

/// Render a path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

fn compile(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Compiled include/exclude sets for one engine.
#[derive(Debug, Clone)]
pub struct TargetPatterns {
    include: GlobSet,
    exclude: GlobSet,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl TargetPatterns {
    /// Compile a pattern list. Empty entries are ignored.
    pub fn new<I>(patterns: I) -> Result<Self, globset::Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut include_patterns = Vec::new();
        let mut exclude_patterns = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if let Some(negated) = pattern.strip_prefix('!') {
                exclude.add(compile(negated)?);
                exclude_patterns.push(negated.to_string());
            } else if !pattern.is_empty() {
                include.add(compile(pattern)?);
                include_patterns.push(pattern.to_string());
            }
        }

        Ok(Self {
            include: include.build()?,
            exclude: exclude.build()?,
            include_patterns,
            exclude_patterns,
        })
    }

    /// True when the engine declared no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.include_patterns.is_empty() && self.exclude_patterns.is_empty()
    }

    /// Whether `path` is selected by these patterns.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    /// The first exclusion pattern that rejects `path`, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        self.exclude
            .matches(normalize(path))
            .into_iter()
            .next()
            .and_then(|idx| self.exclude_patterns.get(idx))
            .map(String::as_str)
    }
}

fn normalize(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn apex_patterns() -> TargetPatterns {
        TargetPatterns::new(["**/*.cls", "!**/node_modules/**"]).unwrap()
    }

    #[test]
    fn test_include_and_exclude() {
        let patterns = apex_patterns();
        assert!(patterns.matches("src/A.cls"));
        assert!(patterns.matches("A.cls"));
        assert!(patterns.matches("./src/A.cls"));
        assert!(!patterns.matches("src/node_modules/B.cls"));
        assert!(!patterns.matches("src/A.js"));
        assert_eq!(
            patterns.excluded_by("src/node_modules/B.cls"),
            Some("**/node_modules/**")
        );
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let patterns = TargetPatterns::new(["*.cls"]).unwrap();
        assert!(patterns.matches("A.cls"));
        assert!(!patterns.matches("src/A.cls"));
    }

    #[test]
    fn test_only_exclusions_match_nothing() {
        let patterns = TargetPatterns::new(["!**/*-meta.xml"]).unwrap();
        assert!(!patterns.is_empty());
        assert!(!patterns.matches("a.xml"));
    }

    #[test]
    fn test_empty_patterns() {
        let patterns = TargetPatterns::new(Vec::<String>::new()).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(TargetPatterns::new(["src/[a"]).is_err());
    }

    #[test]
    fn test_has_magic() {
        assert!(has_magic("src/**/*.cls"));
        assert!(has_magic("file?.js"));
        assert!(has_magic("[ab].js"));
        assert!(!has_magic("src/A.cls"));
    }

    proptest! {
        #[test]
        fn prop_selected_iff_included_and_not_excluded(
            dirs in proptest::collection::vec(
                prop_oneof![Just("src"), Just("node_modules"), Just("lib"), Just("test")],
                0..4,
            ),
            stem in "[a-z]{1,6}",
            ext in prop_oneof![Just("cls"), Just("js"), Just("xml"), Just("ts")],
            meta in any::<bool>(),
        ) {
            let mut path = dirs.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&stem);
            if meta {
                path.push_str("-meta");
            }
            path.push('.');
            path.push_str(ext);

            let inc = ["**/*.cls", "**/*.xml"];
            let exc = ["**/node_modules/**", "**/*-meta.xml"];
            let mut all: Vec<String> = inc.iter().map(|s| s.to_string()).collect();
            all.extend(exc.iter().map(|s| format!("!{}", s)));
            let patterns = TargetPatterns::new(&all).unwrap();

            let hit = |p: &&str| compile(p).unwrap().compile_matcher().is_match(&path);
            let included = inc.iter().any(hit);
            let excluded = exc.iter().any(hit);
            prop_assert_eq!(patterns.matches(&path), included && !excluded);
        }
    }
}
