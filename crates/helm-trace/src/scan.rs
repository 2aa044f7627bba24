use crate::builder::{FieldNodeBuilder, LastLine};
use crate::error::Error;
use crate::identity::{IdentityTracker, LineClass};
use crate::mapping::MappingNodes;
use crate::options::{OptionsError, TraceOptions};
use crate::params::Patterns;
use crate::query::PathQueryEvaluator;
use crate::reconcile::LineIndexReconciler;
use crate::stream::split_documents;

/// Builds [`MappingNodes`] for rendered documents using a path-query evaluator.
#[derive(Debug)]
pub struct Mapper<'e, E: ?Sized> {
    evaluator: &'e E,
    patterns: Patterns,
}

impl<'e, E> Mapper<'e, E>
where
    E: PathQueryEvaluator + ?Sized,
{
    pub fn new(evaluator: &'e E) -> Self {
        Self {
            evaluator,
            patterns: Patterns::default(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the options do not compile.
    pub fn with_options(evaluator: &'e E, options: &TraceOptions) -> Result<Self, OptionsError> {
        Ok(Self {
            evaluator,
            patterns: Patterns::compile(options)?,
        })
    }

    #[must_use]
    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    /// Trace every field of a single rendered document.
    ///
    /// The document is scanned line by line. Lines before the first
    /// `apiVersion:`/`kind:` declaration are ignored, declaration lines are
    /// never queried, and every other line is handed to the evaluator. The
    /// evaluator is given the text from the first declaration on, so its line 1
    /// is that declaration.
    ///
    /// # Errors
    ///
    /// Any error aborts the scan; no partial mapping is returned.
    #[tracing::instrument(level = "debug", skip_all, fields(template_file = %template_file))]
    pub fn map_document(&self, template_file: &str, rendered: &str) -> Result<MappingNodes, Error> {
        let builder = FieldNodeBuilder::new(self.evaluator, &self.patterns, template_file);
        let mut store = MappingNodes::new(template_file);
        let mut identity = IdentityTracker::default();
        let mut reconciler = LineIndexReconciler::default();
        let mut last = LastLine::UNKNOWN;
        // the evaluator sees the document from its first declaration on
        let mut evaluated: Option<&str> = None;
        let mut pos = 0;

        for (offset, raw) in rendered.split_inclusive('\n').enumerate() {
            let line = offset + 1;
            let line_start = pos;
            pos += raw.len();
            let text = raw.trim_end_matches(['\n', '\r']);

            if let LineClass::Declaration(_) = identity.observe(&self.patterns, line, text)? {
                reconciler.observe_declaration(offset);
                if evaluated.is_none() {
                    evaluated = Some(&rendered[line_start..]);
                }
                continue;
            }
            if !identity.has_any() {
                continue;
            }
            let (Some(query_index), Some(document)) = (reconciler.query_index(offset), evaluated) else {
                continue;
            };
            last = builder.build_line(line, query_index, document, &identity, &mut store, last)?;
        }

        tracing::debug!(fields = store.len(), "mapped document");
        Ok(store)
    }

    /// Trace every manifest of a multi-document stream such as `helm template` output.
    ///
    /// Each document is mapped on its own. The template file of a document is
    /// taken from its `# Source:` comment, falling back to `fallback_file`.
    /// Documents without any declaration line are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first document error, wrapped in [`Error::InDocument`].
    pub fn map_stream(&self, fallback_file: &str, rendered: &str) -> Result<Vec<MappingNodes>, Error> {
        let mut out = Vec::new();
        for doc in split_documents(rendered) {
            let has_declaration = doc
                .text
                .lines()
                .any(|l| self.patterns.api_version.is_match(l) || self.patterns.kind.is_match(l));
            if !has_declaration {
                tracing::debug!(start_line = doc.start_line, "skipping document without declarations");
                continue;
            }
            let template_file = doc.source.unwrap_or(fallback_file);
            let nodes = self
                .map_document(template_file, doc.text)
                .map_err(|source| Error::InDocument {
                    template_file: template_file.to_string(),
                    start_line: doc.start_line,
                    source: Box::new(source),
                })?;
            out.push(nodes);
        }
        Ok(out)
    }
}

/// Trace a single rendered document with default options.
///
/// # Errors
///
/// See [`Mapper::map_document`].
pub fn get_mapping<E>(template_file: &str, rendered: &str, evaluator: &E) -> Result<MappingNodes, Error>
where
    E: PathQueryEvaluator + ?Sized,
{
    Mapper::new(evaluator).map_document(template_file, rendered)
}
