use crate::error::Error;
use crate::identity::IdentityTracker;
use crate::mapping::{MappingNode, MappingNodes};
use crate::params::Patterns;
use crate::path::{is_root, normalize_path};
use crate::query::{PathQueryEvaluator, line_expression, split_fragments};
use std::sync::Arc;

/// The template line most recently resolved in a scan.
///
/// Fields without their own annotation inherit it, so it is threaded through
/// the scan by value rather than kept as hidden state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastLine(Option<usize>);

impl LastLine {
    pub const UNKNOWN: Self = Self(None);

    #[must_use]
    pub fn get(self) -> Option<usize> {
        self.0
    }
}

impl From<usize> for LastLine {
    fn from(line: usize) -> Self {
        Self(Some(line))
    }
}

/// A fragment reduced to what the mapping records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub path: String,
    pub value: String,
    pub template_line: usize,
    pub is_container: bool,
}

/// Resolve one evaluator element found while scanning rendered line `line`.
///
/// # Errors
///
/// Returns [`Error::MissingAnnotation`] if the fragment has no annotation and
/// nothing was resolved before it, or [`Error::MalformedResult`] for an
/// annotation that is not a usable line number.
pub fn resolve_fragment(
    patterns: &Patterns,
    line: usize,
    fragment: &str,
    last: LastLine,
) -> Result<(ResolvedField, LastLine), Error> {
    let is_container = patterns
        .declared_type
        .extract(fragment)
        .is_some_and(|ty| patterns.is_container_type(ty));
    let path = normalize_path(patterns.path.extract(fragment).unwrap_or_default());

    let value = if is_container {
        String::new()
    } else {
        patterns.value.extract(fragment).unwrap_or_default().to_string()
    };

    let template_line = match patterns.annotation.extract_non_empty(fragment) {
        Some(digits) => {
            let malformed = |reason: String| Error::MalformedResult {
                line,
                reason,
                output: fragment.to_string(),
            };
            let annotated: usize = digits
                .parse()
                .map_err(|_| malformed(format!("annotation {digits:?} of `{path}` is not a line number")))?;
            // containers carry the annotation of their first child, one line below
            if is_container {
                annotated
                    .checked_sub(1)
                    .ok_or_else(|| malformed(format!("container `{path}` annotated with line 0")))?
            } else {
                annotated
            }
        }
        None => last.get().ok_or_else(|| Error::MissingAnnotation {
            line,
            path: path.clone(),
        })?,
    };

    tracing::trace!(line, %path, template_line, is_container, "resolved fragment");
    Ok((
        ResolvedField {
            path,
            value,
            template_line,
            is_container,
        },
        LastLine::from(template_line),
    ))
}

/// Turns the evaluator's view of one rendered line into mapping nodes.
#[derive(Debug)]
pub struct FieldNodeBuilder<'a, E: ?Sized> {
    evaluator: &'a E,
    patterns: &'a Patterns,
    template_file: &'a str,
}

impl<'a, E> FieldNodeBuilder<'a, E>
where
    E: PathQueryEvaluator + ?Sized,
{
    pub fn new(evaluator: &'a E, patterns: &'a Patterns, template_file: &'a str) -> Self {
        Self {
            evaluator,
            patterns,
            template_file,
        }
    }

    /// Record every field the evaluator selects at `query_index`.
    ///
    /// `line` is the 1-based rendered line, used for error context. Returns the
    /// updated last resolved line.
    ///
    /// # Errors
    ///
    /// Fails if the query fails, the identity is incomplete, the output cannot
    /// be split into elements, a fragment cannot be resolved, or a path is
    /// already mapped.
    pub fn build_line(
        &self,
        line: usize,
        query_index: usize,
        document: &str,
        identity: &IdentityTracker,
        store: &mut MappingNodes,
        last: LastLine,
    ) -> Result<LastLine, Error> {
        let expression = line_expression(query_index);
        let output = self
            .evaluator
            .evaluate(&expression, document)
            .map_err(|source| Error::Query {
                line,
                query_index,
                source,
            })?;

        let Some(path) = self.patterns.path.extract(&output) else {
            return Ok(last);
        };
        if is_root(path) {
            tracing::trace!(line, query_index, "skipping document root");
            return Ok(last);
        }
        let object_identity = identity.require(line, path)?;

        let pieces = split_fragments(&output, &self.patterns.fragment_marker);
        if pieces.len() < 2 {
            return Err(Error::MalformedResult {
                line,
                reason: format!(
                    "expected elements starting with {:?}, got {} piece(s)",
                    self.patterns.fragment_marker,
                    pieces.len()
                ),
                output: output.clone(),
            });
        }

        let mut last = last;
        for fragment in &pieces[1..] {
            match self.patterns.path.extract(fragment) {
                Some(path) if is_root(path) => continue,
                Some(_) => {}
                None => {
                    return Err(Error::MalformedResult {
                        line,
                        reason: "element without a path".to_string(),
                        output: (*fragment).to_string(),
                    });
                }
            }
            let (field, next) = resolve_fragment(self.patterns, line, fragment, last)?;
            last = next;
            let node = MappingNode {
                object_identity: Arc::clone(&object_identity),
                field_path: field.path.clone(),
                value: field.value,
                template_file: self.template_file.to_string(),
                template_line: field.template_line,
            };
            store
                .insert(field.path, node)
                .map_err(|source| Error::DuplicatePath { line, source })?;
        }
        Ok(last)
    }
}
