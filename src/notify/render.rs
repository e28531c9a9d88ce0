//! HTML rendering of a sanitized row subset.

use crate::types::Table;

/// Render `table` as a single self-contained HTML document.
///
/// One bordered table: header row from the column names, one body row per
/// table row, all text escaped. No external stylesheet, no images.
pub fn render_html(table: &Table) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<body>\n<table border=\"1\">\n<thead>\n<tr>");
    for name in table.column_names() {
        html.push_str("<th>");
        push_escaped(&mut html, name);
        html.push_str("</th>");
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in table.rows() {
        html.push_str("<tr>");
        for value in row {
            html.push_str("<td>");
            push_escaped(&mut html, &value.to_string());
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, Value};

    #[test]
    fn renders_headers_rows_and_escapes_markup() {
        let table = Table::new(vec![
            Column::new(
                "Summary",
                vec![Value::Utf8("<script>alert(1)</script>".to_string())],
            ),
            Column::new("Count", vec![Value::Int64(3)]),
        ]);
        let html = render_html(&table);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<th>Summary</th><th>Count</th>"));
        assert!(html.contains("<td>&lt;script&gt;alert(1)&lt;/script&gt;</td><td>3</td>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn nulls_render_as_empty_cells() {
        let table = Table::new(vec![Column::new("a", vec![Value::Null])]);
        assert!(render_html(&table).contains("<td></td>"));
    }
}
