//! HTML reporter with embedded styles
//!
//! Generates the standalone `index.html` report:
//! - Test info (package, versions, architecture, analyzed subject)
//! - Package-wide result per check kind, tiered
//! - Analyzed packages with file counts
//! - Per-object table with links into the comparator reports

use super::CompatReport;
use crate::models::{format_percent, CheckKind, Tier};
use anyhow::Result;

const TOOL_NAME: &str = "Pkg-ABIdiff";

/// Render report as standalone HTML
pub fn render(report: &CompatReport) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head(report));
    html.push_str("<body>\n");
    html.push_str(&render_header(report));
    html.push_str(&render_test_info(report));
    html.push_str(&render_result(report));
    html.push_str(&render_packages(report));
    html.push_str(&render_objects(report));
    html.push_str(&render_footer());
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

/// (title, keywords, description) for the document head
fn document_labels(report: &CompatReport) -> (String, String, String) {
    let (n1, v1) = (&report.old.name, &report.old.version);
    let (n2, v2) = (&report.new.name, &report.new.version);
    if n1 == n2 {
        (
            format!("{}: API/ABI report between {} and {} versions", n1, v1, v2),
            format!("{}, API, ABI, changes, compatibility, report", n1),
            format!(
                "API/ABI compatibility report between {} and {} versions of the {}",
                v1, v2, n1
            ),
        )
    } else {
        (
            format!("API/ABI report between {}-{} and {}-{} packages", n1, v1, n2, v2),
            format!("{}, {}, API, ABI, changes, compatibility, report", n1, n2),
            format!(
                "API/ABI compatibility report between {}-{} and {}-{} packages",
                n1, v1, n2, v2
            ),
        )
    }
}

fn render_head(report: &CompatReport) -> String {
    let (title, keywords, description) = document_labels(report);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="keywords" content="{}">
    <meta name="description" content="{}">
    <title>{}</title>
    <style>
{CSS}
    </style>
</head>
"#,
        html_escape(&keywords),
        html_escape(&description),
        html_escape(&title)
    )
}

fn render_header(report: &CompatReport) -> String {
    let (n1, v1) = (html_escape(&report.old.name), html_escape(&report.old.version));
    let (n2, v2) = (html_escape(&report.new.name), html_escape(&report.new.version));
    let subject = if n1 == n2 {
        format!(" for {}: <u>{}</u> vs <u>{}</u>", n1, v1, v2)
    } else {
        format!(" for <u>{}-{}</u> vs <u>{}-{}</u>", n1, v1, n2, v2)
    };
    let suffix = if report.selection.binary {
        ""
    } else {
        " (source compatibility)"
    };
    format!("<h1>ABI report{}{}</h1>\n", subject, suffix)
}

fn summary_row(label: &str, value: &str) -> String {
    format!(
        "<tr>\n<th class='left'>{}</th><td class='right'>{}</td>\n</tr>\n",
        label, value
    )
}

fn render_test_info(report: &CompatReport) -> String {
    let subject = if report.public_abi {
        "Public ABI"
    } else {
        "Public ABI +<br/>Private ABI"
    };
    let mut html = String::from("<h2>Test Info</h2>\n<table class='summary'>\n");
    html.push_str(&summary_row("Package", &html_escape(&report.old.name)));
    html.push_str(&summary_row("Old Version", &html_escape(&report.old.version)));
    html.push_str(&summary_row("New Version", &html_escape(&report.new.version)));
    html.push_str(&summary_row("Arch", &html_escape(&report.old.arch)));
    html.push_str(&summary_row("Subject", subject));
    html.push_str("</table>\n");
    html
}

fn render_result(report: &CompatReport) -> String {
    let mut html = String::from("<h2>Test Result</h2>\n<span class='result'>\n");
    for kind in report.selection.kinds() {
        let Some(score) = report.score.get(kind) else {
            continue;
        };
        let label = match kind {
            CheckKind::Binary => "Binary compatibility",
            CheckKind::Source => "Source compatibility",
        };
        html.push_str(&format!(
            "{}: <span class='{}'>{}%</span>\n<br/>\n",
            label,
            score.tier().css_class(),
            format_percent(score.compatibility)
        ));
    }
    html.push_str("</span>\n");
    html
}

fn render_packages(report: &CompatReport) -> String {
    let mut html = String::from(
        "<h2>Analyzed Packages</h2>\n<table class='summary'>\n<tr>\n\
         <th>Old</th><th>New</th><th title='*.so, *.debug and header files'>Files</th>\n</tr>\n",
    );
    for pkg in &report.packages {
        html.push_str(&format!(
            "<tr>\n<td class='object'>{}</td>\n<td class='object'>{}</td>\n<td class='center'>{}</td>\n</tr>\n",
            html_escape(&pkg.old),
            html_escape(&pkg.new),
            pkg.files
        ));
    }
    html.push_str("</table>\n");
    html
}

fn objects_header(report: &CompatReport) -> String {
    let sel = report.selection;
    if sel.binary && sel.source {
        "<tr>\n<th rowspan='2'>Object</th>\n<th colspan='2'>Compatibility</th>\n\
         <th rowspan='2'>Added<br/>Symbols</th>\n<th rowspan='2'>Removed<br/>Symbols</th>\n\
         <th rowspan='2'>Total<br/>Symbols</th>\n</tr>\n\
         <tr>\n<th title='Binary compatibility'>BC</th>\n<th title='Source compatibility'>SC</th>\n</tr>\n"
            .to_string()
    } else {
        let kind = if sel.binary { "Binary" } else { "Source" };
        format!(
            "<tr>\n<th>Object</th>\n<th>{}<br/>Compatibility</th>\n<th>Added<br/>Symbols</th>\n\
             <th>Removed<br/>Symbols</th>\n<th>Total<br/>Symbols</th>\n</tr>\n",
            kind
        )
    }
}

fn change_note(what: &str, from: &str, to: &str) -> String {
    format!(
        "<br/><br/><span class='incompatible'>(changed {} from<br/>\"{}\"<br/>to<br/>\"{}\")</span>",
        what,
        html_escape(from),
        html_escape(to)
    )
}

fn symbol_cell(count: u64, link: &str, anchor: &str, class: &str, noun: &str) -> String {
    if count > 0 {
        format!(
            "<td class='{}'><a class='num' href='{}#{}'>{} {}</a></td>\n",
            class,
            html_escape(link),
            anchor,
            count,
            noun
        )
    } else {
        "<td class='ok'>0</td>\n".to_string()
    }
}

fn render_objects(report: &CompatReport) -> String {
    let kinds = report.selection.kinds();
    let cols = kinds.len() + 3;

    let mut html = String::from("<h2>Shared Objects</h2>\n<table class='summary'>\n");
    html.push_str(&objects_header(report));

    for name in &report.new_objects {
        if report.matches.added.contains(name) {
            html.push_str(&format!(
                "<tr>\n<td class='object'>{}</td>\n<td colspan='{}' class='added'>Added to package</td>\n</tr>\n",
                html_escape(name),
                cols
            ));
        }
    }

    for name in &report.old_objects {
        let mut label = html_escape(name);
        let mapping = report.matches.mapping_for(name);
        if let Some(m) = mapping {
            if let Some((from, to)) = &m.soname_change {
                label.push_str(&change_note("SONAME", from, to));
            } else if m.is_rename() {
                label.push_str(&change_note("file name", &m.old, &m.new));
            }
        }

        html.push_str("<tr>\n");
        html.push_str(&format!("<td class='object'>{}</td>\n", label));

        if mapping.is_some() {
            match report.compared(name) {
                Some(obj) => {
                    for kind in &kinds {
                        match obj.record(*kind) {
                            Some(rec) => {
                                let tier = Tier::classify(rec.compatibility(), rec.problems);
                                html.push_str(&format!(
                                    "<td class='{}'><a href='{}'>{}%</a></td>\n",
                                    tier.css_class(),
                                    html_escape(&rec.report_path),
                                    format_percent(rec.compatibility())
                                ));
                            }
                            None => html.push_str("<td>N/A</td>\n"),
                        }
                    }
                    match obj.record(report.selection.primary()) {
                        Some(rec) => {
                            html.push_str(&symbol_cell(
                                rec.added,
                                &rec.report_path,
                                "Added",
                                "added",
                                "new",
                            ));
                            html.push_str(&symbol_cell(
                                rec.removed,
                                &rec.report_path,
                                "Removed",
                                "removed",
                                "removed",
                            ));
                        }
                        None => html.push_str("<td>N/A</td>\n<td>N/A</td>\n"),
                    }
                    html.push_str(&format!("<td>{}</td>\n", obj.symbols));
                }
                None => {
                    for _ in 0..cols {
                        html.push_str("<td>N/A</td>\n");
                    }
                }
            }
        } else if report.matches.removed.contains(name) {
            html.push_str(&format!(
                "<td colspan='{}' class='removed'>Removed from package</td>\n",
                cols
            ));
        }

        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n<br/>\n<br/>\n");
    html
}

fn render_footer() -> String {
    format!(
        "<hr/>\n<div class='footer' align='right'><i>Generated by {} {} &#160;</i></div>\n",
        TOOL_NAME,
        env!("CARGO_PKG_VERSION")
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Embedded CSS
const CSS: &str = r#"
body {
    font-family: Arial, sans-serif;
    font-size: 0.86em;
    color: #000000;
}
h1 {
    margin-bottom: 0px;
    padding-bottom: 0px;
    font-size: 1.6em;
}
h2 {
    margin-bottom: 0px;
    padding-bottom: 0px;
    font-size: 1.25em;
    white-space: nowrap;
}
span.result {
    font-weight: bold;
    font-size: 1.1em;
}
table.summary {
    border-collapse: collapse;
    border: 1px outset black;
}
table.summary th {
    background-color: #eeeeee;
    font-weight: 100;
    text-align: center;
    font-size: 0.94em;
    white-space: nowrap;
    border: 1px inset gray;
    padding: 3px;
}
table.summary th.left {
    text-align: left;
}
table.summary td {
    text-align: right;
    white-space: nowrap;
    border: 1px inset gray;
    padding: 3px 5px 3px 10px;
}
table.summary td.right {
    text-align: right;
}
table.summary td.center {
    text-align: center;
}
table.summary td.object {
    text-align: left;
}
.ok {
    background-color: #ccffcc;
    font-weight: 100;
}
.warning {
    background-color: #f4f4af;
    font-weight: 100;
}
.incompatible {
    background-color: #ffcccc;
    font-weight: 100;
}
span.ok, span.warning, span.incompatible {
    padding: 0 3px;
}
td.added {
    background-color: #ccffcc;
    text-align: center;
}
td.removed {
    background-color: #ffcccc;
    text-align: center;
}
a.num {
    color: #000000;
}
div.footer {
    font-size: 0.75em;
}
"#;
