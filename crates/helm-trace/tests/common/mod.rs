#![allow(dead_code)]

use helm_trace::{EvalError, PathQueryEvaluator, line_expression};
use std::cell::RefCell;

enum Canned {
    Output(String),
    Fail,
}

/// Replays scripted evaluator output per line index and records every query.
///
/// Indices without a script select nothing. Scripts registered with
/// [`CannedEvaluator::at_in`] only apply to documents containing the given text.
#[derive(Default)]
pub struct CannedEvaluator {
    outputs: Vec<(Option<String>, usize, Canned)>,
    queried: RefCell<Vec<usize>>,
    documents: RefCell<Vec<String>>,
}

impl CannedEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn at(mut self, index: usize, output: impl Into<String>) -> Self {
        self.outputs.push((None, index, Canned::Output(output.into())));
        self
    }

    #[must_use]
    pub fn at_in(mut self, document_text: &str, index: usize, output: impl Into<String>) -> Self {
        self.outputs.push((
            Some(document_text.to_string()),
            index,
            Canned::Output(output.into()),
        ));
        self
    }

    #[must_use]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.outputs.push((None, index, Canned::Fail));
        self
    }

    /// Line indices queried so far, in order.
    pub fn queried(&self) -> Vec<usize> {
        self.queried.borrow().clone()
    }

    /// Distinct documents handed to the evaluator, in order of first use.
    pub fn documents(&self) -> Vec<String> {
        self.documents.borrow().clone()
    }
}

impl PathQueryEvaluator for CannedEvaluator {
    fn evaluate(&self, expression: &str, document: &str) -> Result<String, EvalError> {
        let index = (0..=1024)
            .find(|i| line_expression(*i) == expression)
            .ok_or_else(|| EvalError::UnsupportedExpression(expression.to_string()))?;
        self.queried.borrow_mut().push(index);
        let mut documents = self.documents.borrow_mut();
        if !documents.iter().any(|d| d == document) {
            documents.push(document.to_string());
        }
        drop(documents);
        let script = self.outputs.iter().find(|(scope, i, _)| {
            *i == index && scope.as_deref().is_none_or(|text| document.contains(text))
        });
        match script.map(|(_, _, canned)| canned) {
            Some(Canned::Output(output)) => Ok(output.clone()),
            Some(Canned::Fail) => Err(EvalError::NoMatches),
            None => Ok(String::new()),
        }
    }
}

/// One evaluator element as the path-query engine prints it.
#[must_use]
pub fn element(path: &str, ty: &str, value: &str) -> String {
    if value.starts_with('\n') {
        format!("destpath: {path}\ntype: '{ty}'\nvalue:{value}\n")
    } else {
        format!("destpath: {path}\ntype: '{ty}'\nvalue: {value}\n")
    }
}
