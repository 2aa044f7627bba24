use crate::identity::DeclarationKey;
use crate::mapping::DuplicatePathError;
use crate::query::EvalError;

/// Errors aborting the scan of a rendered document.
///
/// Line numbers are 1-based lines of the rendered document being scanned.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line {line}: `{key}` declaration has no value: {text:?}")]
    MissingValue {
        line: usize,
        key: DeclarationKey,
        text: String,
    },

    #[error("line {line}: field `{path}` precedes a complete object identity (apiVersion: {api_version:?}, kind: {kind:?})")]
    IncompleteIdentity {
        line: usize,
        path: String,
        api_version: Option<String>,
        kind: Option<String>,
    },

    #[error("line {line}: path query for evaluator line {query_index} failed")]
    Query {
        line: usize,
        query_index: usize,
        #[source]
        source: EvalError,
    },

    #[error("line {line}: malformed query result: {reason}")]
    MalformedResult {
        line: usize,
        reason: String,
        output: String,
    },

    #[error("line {line}: field `{path}` has no line annotation and no earlier field to inherit one from")]
    MissingAnnotation { line: usize, path: String },

    #[error("line {line}: duplicate field path")]
    DuplicatePath {
        line: usize,
        #[source]
        source: DuplicatePathError,
    },

    #[error("document `{template_file}` starting at line {start_line}")]
    InDocument {
        template_file: String,
        start_line: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The innermost error, looking through [`Error::InDocument`].
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::InDocument { source, .. } => source.root(),
            other => other,
        }
    }
}
