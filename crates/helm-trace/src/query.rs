/// Error reported by a [`PathQueryEvaluator`].
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("no matches found")]
    NoMatches,
    #[error("unsupported expression {0:?}")]
    UnsupportedExpression(String),
    #[error("failed to parse document")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A structural path-query engine over a whole rendered document.
///
/// Given a selection expression, returns every selected node serialized as
/// text, one element per node, each starting with `destpath: <path>` and
/// followed by `type: '<tag>'` and `value: <value>`. Comments of the selected
/// nodes are carried through verbatim.
pub trait PathQueryEvaluator {
    /// # Errors
    ///
    /// Returns an error if the expression cannot be evaluated against `document`.
    fn evaluate(&self, expression: &str, document: &str) -> Result<String, EvalError>;
}

impl<T> PathQueryEvaluator for &T
where
    T: PathQueryEvaluator + ?Sized,
{
    fn evaluate(&self, expression: &str, document: &str) -> Result<String, EvalError> {
        (**self).evaluate(expression, document)
    }
}

impl<T> PathQueryEvaluator for Box<T>
where
    T: PathQueryEvaluator + ?Sized,
{
    fn evaluate(&self, expression: &str, document: &str) -> Result<String, EvalError> {
        (**self).evaluate(expression, document)
    }
}

/// Selects every node starting on evaluator line `index`.
#[must_use]
pub fn line_expression(index: usize) -> String {
    format!(r#"..| select(line == {index})| {{"destpath": path | join("."),"type": type,"value": .}}"#)
}

/// Split evaluator output at every line starting with `marker`.
///
/// The first piece is whatever precedes the first marker (usually empty) and
/// the marker itself is dropped, so `"destpath: a\n"` split at `"dest"` yields
/// `["", "path: a\n"]`.
#[must_use]
pub fn split_fragments<'a>(output: &'a str, marker: &str) -> Vec<&'a str> {
    let starts = output
        .match_indices(marker)
        .map(|(i, _)| i)
        .filter(|&i| i == 0 || output.as_bytes()[i - 1] == b'\n');

    let mut pieces = Vec::new();
    let mut piece_start = 0;
    for start in starts {
        pieces.push(&output[piece_start..start]);
        piece_start = start + marker.len();
    }
    pieces.push(&output[piece_start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_embeds_index() {
        assert_eq!(
            line_expression(7),
            r#"..| select(line == 7)| {"destpath": path | join("."),"type": type,"value": .}"#
        );
    }

    #[test]
    fn split_drops_marker_and_keeps_preamble() {
        let output = "destpath: data\ntype: '!!map'\nvalue:\n  foo: bar\ndestpath: data.foo\ntype: '!!str'\nvalue: bar\n";
        let pieces = split_fragments(output, "dest");
        assert_eq!(
            pieces,
            vec![
                "",
                "path: data\ntype: '!!map'\nvalue:\n  foo: bar\n",
                "path: data.foo\ntype: '!!str'\nvalue: bar\n",
            ]
        );
    }

    #[test]
    fn marker_inside_values_does_not_split() {
        let output = "destpath: spec.host\ntype: '!!str'\nvalue: destination.local\n";
        assert_eq!(split_fragments(output, "dest").len(), 2);
    }

    #[test]
    fn no_marker_is_a_single_piece() {
        assert_eq!(split_fragments("", "dest"), vec![""]);
        assert_eq!(split_fragments("null\n", "dest"), vec!["null\n"]);
    }
}
