//! XML output.

use super::{escape_xml, group_by_engine_and_file};
use crate::dispatcher::EngineBatch;
use sift_core::Violation;

/// `<results>` of `<result file engine>` elements, one per file.
pub fn render_xml(batches: &[EngineBatch]) -> String {
    let groups = group_by_engine_and_file(batches);
    let total: usize = groups.iter().map(|g| g.violations.len()).sum();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<results total=\"{}\">\n", total));

    for group in &groups {
        out.push_str(&format!(
            "  <result file=\"{}\" engine=\"{}\">\n",
            escape_xml(group.file),
            escape_xml(group.engine)
        ));
        for violation in &group.violations {
            out.push_str(&render_violation(violation));
        }
        out.push_str("  </result>\n");
    }

    out.push_str("</results>\n");
    out
}

fn render_violation(v: &Violation) -> String {
    let mut attrs = format!("severity=\"{}\"", v.severity.value());
    let numbers = [
        ("line", v.line),
        ("column", v.column),
        ("endLine", v.end_line),
        ("endColumn", v.end_column),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            attrs.push_str(&format!(" {}=\"{}\"", name, value));
        }
    }
    attrs.push_str(&format!(" rule=\"{}\"", escape_xml(&v.rule)));
    if let Some(category) = &v.category {
        attrs.push_str(&format!(" category=\"{}\"", escape_xml(category)));
    }
    if let Some(url) = &v.url {
        attrs.push_str(&format!(" url=\"{}\"", escape_xml(url)));
    }

    format!(
        "    <violation {}>{}</violation>\n",
        attrs,
        escape_xml(&v.message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::fixtures;

    #[test]
    fn test_structure() {
        let xml = render_xml(&fixtures::batches());
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();

        assert_eq!(root.tag_name().name(), "results");
        assert_eq!(root.attribute("total"), Some("4"));

        let results: Vec<_> = root.children().filter(|n| n.has_tag_name("result")).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].attribute("file"), Some("src/A.cls"));
        assert_eq!(results[0].attribute("engine"), Some("apex"));

        let first = results[0]
            .children()
            .find(|n| n.has_tag_name("violation"))
            .unwrap();
        assert_eq!(first.attribute("severity"), Some("2"));
        assert_eq!(first.attribute("line"), Some("10"));
        assert_eq!(first.attribute("rule"), Some("SoqlInLoop"));
        assert_eq!(first.text(), Some("SoqlInLoop triggered"));
    }

    #[test]
    fn test_message_is_escaped() {
        let mut v = fixtures::violation("javascript", "a.js", "R", 1, sift_core::Severity::Low);
        v.message = "use <a> & \"b\"".to_string();
        let batch = EngineBatch {
            engine: "javascript".to_string(),
            violations: vec![v],
        };
        let xml = render_xml(&[batch]);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let violation = doc.descendants().find(|n| n.has_tag_name("violation")).unwrap();
        assert_eq!(violation.text(), Some("use <a> & \"b\""));
    }

    #[test]
    fn test_message_whitespace_kept_and_controls_replaced() {
        let mut v = fixtures::violation("javascript", "a.js", "R", 1, sift_core::Severity::Low);
        v.message = "  indented\r\n\tdetail\u{1b}[0m  ".to_string();
        let batch = EngineBatch {
            engine: "javascript".to_string(),
            violations: vec![v],
        };
        let xml = render_xml(&[batch]);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let violation = doc.descendants().find(|n| n.has_tag_name("violation")).unwrap();
        assert_eq!(violation.text(), Some("  indented\r\n\tdetail\u{FFFD}[0m  "));
    }

    #[test]
    fn test_empty() {
        let xml = render_xml(&[]);
        assert!(xml.contains("<results total=\"0\">"));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }
}
