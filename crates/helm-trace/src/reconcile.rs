/// Maps rendered-text line offsets to the line indices of the path-query evaluator.
///
/// The evaluator counts lines from 1, starting at the document's first
/// declaration line. The offset is fixed by the first declaration seen and never
/// recomputed: `query_index = text_offset - offset` where `offset` is the
/// 0-based text offset of that declaration minus one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineIndexReconciler {
    offset: Option<isize>,
}

impl LineIndexReconciler {
    /// Record a declaration line at 0-based `text_offset`.
    ///
    /// Only the first call has an effect.
    pub fn observe_declaration(&mut self, text_offset: usize) {
        if self.offset.is_none() {
            let offset = offset_as_isize(text_offset) - 1;
            tracing::trace!(text_offset, offset, "line offset fixed");
            self.offset = Some(offset);
        }
    }

    #[must_use]
    pub fn offset(&self) -> Option<isize> {
        self.offset
    }

    /// Evaluator line index for the line at 0-based `text_offset`.
    ///
    /// `None` until a declaration has been observed, or for lines before it.
    #[must_use]
    pub fn query_index(&self, text_offset: usize) -> Option<usize> {
        let offset = self.offset?;
        let index = offset_as_isize(text_offset) - offset;
        usize::try_from(index).ok().filter(|i| *i > 0)
    }
}

fn offset_as_isize(text_offset: usize) -> isize {
    isize::try_from(text_offset).unwrap_or(isize::MAX)
}
