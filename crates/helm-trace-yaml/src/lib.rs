//! A [`PathQueryEvaluator`] over plain YAML.
//!
//! Only the line-selection expression produced by
//! [`helm_trace::line_expression`] is understood. Output mirrors what `yq`
//! prints for it: one `destpath`/`type`/`value` element per node starting on
//! the selected line, with the node's comments carried along.

pub mod index;
pub mod render;

use helm_trace::{EvalError, PathQueryEvaluator};
use index::NodeIndex;
use regex::Regex;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

static LINE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*\.\.\s*\|\s*select\(\s*line\s*==\s*(?P<line>\d+)\s*\)\s*\|\s*\{\s*"destpath"\s*:\s*path\s*\|\s*join\("\."\)\s*,\s*"type"\s*:\s*type\s*,\s*"value"\s*:\s*\.\s*\}\s*$"#,
    )
    .unwrap()
});

/// The line a selection expression asks for, if it is one this evaluator supports.
#[must_use]
pub fn parse_line_expression(expression: &str) -> Option<usize> {
    LINE_EXPRESSION
        .captures(expression)?
        .name("line")?
        .as_str()
        .parse()
        .ok()
}

/// Evaluates line selections against YAML documents.
///
/// The node index and source lines of the last document are cached, since a
/// scan queries the same document once per line.
#[derive(Debug, Default)]
pub struct YamlLineEvaluator {
    cache: Mutex<Option<(String, Arc<NodeIndex>)>>,
}

impl YamlLineEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, document: &str) -> Result<Arc<NodeIndex>, EvalError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached, index)) = cache.as_ref()
            && cached == document
        {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(NodeIndex::parse(document).map_err(|err| EvalError::Parse(Box::new(err)))?);
        *cache = Some((document.to_string(), Arc::clone(&index)));
        Ok(index)
    }
}

impl PathQueryEvaluator for YamlLineEvaluator {
    fn evaluate(&self, expression: &str, document: &str) -> Result<String, EvalError> {
        let line = parse_line_expression(expression)
            .ok_or_else(|| EvalError::UnsupportedExpression(expression.to_string()))?;
        let index = self.index(document)?;
        if index.documents() == 0 {
            return Err(EvalError::NoMatches);
        }
        let output: String = index
            .starting_at(line)
            .map(|node| render::render_node(node, index.lines()))
            .collect();
        tracing::trace!(line, bytes = output.len(), "evaluated line selection");
        Ok(output)
    }
}
