//! JUnit XML output.

use super::{escape_xml, group_by_engine_and_file, table::location, FormatContext};
use crate::dispatcher::EngineBatch;

/// Renders results as a JUnit XML report.
///
/// The structure is:
/// - `<testsuites>` - root element
/// - `<testsuite>` - one per engine, in dispatch order
/// - `<testcase>` - one per file with violations
/// - `<failure>` - lists the file's violations
pub fn render_junit(batches: &[EngineBatch], ctx: &FormatContext) -> String {
    let groups = group_by_engine_and_file(batches);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\">\n",
        escape_xml(&ctx.tool_name),
        groups.len(),
        groups.len()
    ));

    for batch in batches {
        let files: Vec<_> = groups.iter().filter(|g| g.engine == batch.engine).collect();

        out.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\">\n",
            escape_xml(&batch.engine),
            files.len(),
            files.len()
        ));

        for group in files {
            out.push_str(&format!(
                "    <testcase classname=\"{}\" name=\"{}\">\n",
                escape_xml(group.engine),
                escape_xml(group.file)
            ));
            out.push_str(&format!(
                "      <failure type=\"{}\" message=\"{} violation(s)\">\n",
                group
                    .violations
                    .iter()
                    .map(|v| v.severity)
                    .min()
                    .map(|s| s.cli_name())
                    .unwrap_or_default(),
                group.violations.len()
            ));
            for v in &group.violations {
                out.push_str(&escape_xml(&format!(
                    "{} [{}] {}: {}\n",
                    v.severity.value(),
                    location(v),
                    v.rule,
                    v.message.trim()
                )));
            }
            out.push_str("      </failure>\n");
            out.push_str("    </testcase>\n");
        }

        out.push_str("  </testsuite>\n");
    }

    out.push_str("</testsuites>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::fixtures;

    #[test]
    fn test_suite_per_engine_case_per_file() {
        let xml = render_junit(&fixtures::batches(), &FormatContext::default());
        let doc = roxmltree::Document::parse(&xml).unwrap();

        let suites: Vec<_> = doc.descendants().filter(|n| n.has_tag_name("testsuite")).collect();
        assert_eq!(suites.len(), 2);
        assert_eq!(suites[0].attribute("name"), Some("apex"));
        assert_eq!(suites[0].attribute("tests"), Some("2"));
        assert_eq!(suites[1].attribute("name"), Some("javascript"));

        let cases: Vec<_> = suites[0].children().filter(|n| n.has_tag_name("testcase")).collect();
        assert_eq!(cases[0].attribute("name"), Some("src/A.cls"));

        let failure = cases[0].children().find(|n| n.has_tag_name("failure")).unwrap();
        assert_eq!(failure.attribute("type"), Some("high"));
        assert_eq!(failure.attribute("message"), Some("2 violation(s)"));
        assert!(failure.text().unwrap().contains("2 [10:5] SoqlInLoop: SoqlInLoop triggered"));
    }

    #[test]
    fn test_engine_without_violations_has_empty_suite() {
        let batches = vec![EngineBatch {
            engine: "apex".to_string(),
            violations: vec![],
        }];
        let xml = render_junit(&batches, &FormatContext::default());
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let suite = doc.descendants().find(|n| n.has_tag_name("testsuite")).unwrap();
        assert_eq!(suite.attribute("tests"), Some("0"));
        assert_eq!(doc.root_element().attribute("name"), Some("sift"));
    }
}
