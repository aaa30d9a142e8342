//! Self-contained HTML report.

use super::table::{location, TABLE_COLUMNS};
use super::{all_violations, escape_xml, group_by_engine_and_file, FormatContext};
use crate::dispatcher::EngineBatch;

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#f0f0f0}\
.sev-1,.sev-2{color:#b00020;font-weight:bold}\
.sev-3{color:#b26a00}";

pub fn render_html(batches: &[EngineBatch], ctx: &FormatContext) -> String {
    let total = all_violations(batches).count();
    let files = group_by_engine_and_file(batches).len();

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>{} results</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape_xml(&ctx.tool_name),
        STYLE
    ));
    out.push_str(&format!(
        "<h1>{} {}</h1>\n",
        escape_xml(&ctx.tool_name),
        escape_xml(&ctx.tool_version)
    ));
    out.push_str(&format!(
        "<p class=\"summary\">{} violation(s) in {} file(s) from {} engine(s).</p>\n",
        total,
        files,
        batches.len()
    ));
    if let Some(at) = ctx.generated_at {
        out.push_str(&format!(
            "<p class=\"generated\">Generated {}</p>\n",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    out.push_str("<table>\n<thead><tr>");
    for column in TABLE_COLUMNS {
        out.push_str(&format!("<th>{}</th>", column));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (index, v) in all_violations(batches).enumerate() {
        let rule = match &v.url {
            Some(url) => format!(
                "<a href=\"{}\">{}</a>",
                escape_xml(url),
                escape_xml(&v.rule)
            ),
            None => escape_xml(&v.rule),
        };
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"sev-{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            index + 1,
            v.severity.value(),
            v.severity.detailed(),
            escape_xml(&v.file),
            location(v),
            rule,
            escape_xml(&v.engine),
            escape_xml(&v.message)
        ));
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}
