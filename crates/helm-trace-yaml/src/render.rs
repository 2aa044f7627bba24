use crate::index::{NodeKind, YamlNode};

/// Trailing comment of `line`, searched from character column `from_col`.
///
/// A `#` only starts a comment outside quotes and after whitespace.
#[must_use]
pub fn line_comment(line: &str, from_col: usize) -> Option<&str> {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev_is_space = from_col == 0;
    for (col, (byte, ch)) in line.char_indices().enumerate() {
        if col < from_col {
            prev_is_space = ch.is_whitespace();
            continue;
        }
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && prev_is_space => {
                return Some(line[byte..].trim_end());
            }
            _ => {}
        }
        prev_is_space = ch.is_whitespace();
    }
    None
}

fn skip_cols(line: &str, cols: usize) -> &str {
    line.char_indices().nth(cols).map_or("", |(byte, _)| &line[byte..])
}

fn dedent(line: &str, cols: usize) -> &str {
    let indent = line.chars().take(cols).take_while(|c| *c == ' ').count();
    &line[indent..]
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "\"\"".to_string()
    } else {
        path.join(".")
    }
}

fn render_scalar(node: &YamlNode, comment: Option<&str>, out: &mut String) {
    let value = node.scalar.as_deref().unwrap_or_default();
    if value.contains('\n') {
        // block form, the comment stays on the indicator line
        out.push_str(if value.ends_with('\n') { "|" } else { "|-" });
        if let Some(comment) = comment {
            out.push(' ');
            out.push_str(comment);
        }
        for line in value.trim_end_matches('\n').lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
        out.push('\n');
        return;
    }
    if value.is_empty() && node.tag == "!!null" {
        out.push_str("null");
    } else {
        out.push_str(value);
    }
    if let Some(comment) = comment {
        out.push(' ');
        out.push_str(comment);
    }
    out.push('\n');
}

/// Render `node` as one result element, taking comments and collection
/// bodies from the source `lines`.
#[must_use]
pub fn render_node(node: &YamlNode, lines: &[String]) -> String {
    let mut out = format!("destpath: {}\ntype: '{}'\n", render_path(&node.path), node.tag);
    let first = lines
        .get(node.line.saturating_sub(1))
        .map(String::as_str)
        .unwrap_or_default();

    match node.kind {
        NodeKind::Scalar => {
            out.push_str("value: ");
            render_scalar(node, line_comment(first, node.col), &mut out);
        }
        NodeKind::Mapping | NodeKind::Sequence => {
            let head = skip_cols(first, node.col).trim_end();
            if node.end_line == node.line && (head.starts_with('{') || head.starts_with('[')) {
                out.push_str(&format!("value: {head}\n"));
                return out;
            }
            out.push_str("value:\n");
            let body = lines
                .iter()
                .take(node.end_line)
                .skip(node.line.saturating_sub(1))
                .enumerate()
                .map(|(i, l)| if i == 0 { head } else { dedent(l, node.col).trim_end() });
            for line in body.filter(|l| !l.is_empty()) {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_string()).collect()
    }

    #[test]
    fn comments_outside_quotes() {
        assert_eq!(line_comment("  foo: bar #This is the 5 line", 7), Some("#This is the 5 line"));
        assert_eq!(line_comment("  url: 'http://x#y' # note", 7), Some("# note"));
        assert_eq!(line_comment("  tag: a#b", 7), None);
        assert_eq!(line_comment("# only", 0), Some("# only"));
    }

    #[test]
    fn scalar_element() {
        let node = YamlNode {
            path: vec!["data".into(), "foo".into()],
            kind: NodeKind::Scalar,
            tag: "!!str",
            line: 2,
            col: 7,
            end_line: 2,
            scalar: Some("bar".into()),
        };
        let lines = source(&["data:", "  foo: bar #This is the 5 line"]);
        assert_eq!(
            render_node(&node, &lines),
            "destpath: data.foo\ntype: '!!str'\nvalue: bar #This is the 5 line\n"
        );
    }

    #[test]
    fn mapping_element_carries_body() {
        let node = YamlNode {
            path: vec!["data".into()],
            kind: NodeKind::Mapping,
            tag: "!!map",
            line: 2,
            col: 2,
            end_line: 4,
            scalar: None,
        };
        let lines = source(&["data:", "  foo: bar #This is the 6 line", "  nested:", "    a: b"]);
        assert_eq!(
            render_node(&node, &lines),
            "destpath: data\ntype: '!!map'\nvalue:\n  foo: bar #This is the 6 line\n  nested:\n    a: b\n"
        );
    }

    #[test]
    fn flow_collection_stays_inline() {
        let node = YamlNode {
            path: vec!["args".into()],
            kind: NodeKind::Sequence,
            tag: "!!seq",
            line: 1,
            col: 6,
            end_line: 1,
            scalar: None,
        };
        assert_eq!(
            render_node(&node, &source(&["args: [a, b] #This is the 3 line"])),
            "destpath: args\ntype: '!!seq'\nvalue: [a, b] #This is the 3 line\n"
        );
    }

    #[test]
    fn block_scalar_keeps_comment_on_indicator_line() {
        let node = YamlNode {
            path: vec!["data".into(), "script".into()],
            kind: NodeKind::Scalar,
            tag: "!!str",
            line: 2,
            col: 10,
            end_line: 4,
            scalar: Some("a\nb\n".into()),
        };
        let lines = source(&["data:", "  script: | #This is the 4 line", "    a", "    b"]);
        assert_eq!(
            render_node(&node, &lines),
            "destpath: data.script\ntype: '!!str'\nvalue: | #This is the 4 line\n  a\n  b\n"
        );
    }

    #[test]
    fn root_path_is_quoted() {
        let node = YamlNode {
            path: Vec::new(),
            kind: NodeKind::Scalar,
            tag: "!!null",
            line: 1,
            col: 0,
            end_line: 1,
            scalar: Some(String::new()),
        };
        assert_eq!(render_node(&node, &source(&[""])), "destpath: \"\"\ntype: '!!null'\nvalue: null\n");
    }
}
