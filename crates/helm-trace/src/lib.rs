//! Traces the fields of rendered helm manifests back to the template lines that
//! produced them.
//!
//! The rendered output is expected to carry `#This is the <N> line` annotations
//! written by the template annotator. A [`PathQueryEvaluator`] supplies the
//! structural view (path, type and value of the nodes starting on a line) that
//! the plain text lacks.

pub mod builder;
pub mod error;
pub mod identity;
pub mod mapping;
pub mod options;
pub mod params;
pub mod path;
pub mod query;
pub mod reconcile;
pub mod scan;
pub mod stream;

pub use builder::LastLine;
pub use error::Error;
pub use identity::ObjectIdentity;
pub use mapping::{DuplicatePathError, MappingNode, MappingNodes};
pub use options::{OptionsError, TraceOptions};
pub use query::{EvalError, PathQueryEvaluator, line_expression};
pub use scan::{Mapper, get_mapping};
pub use stream::{RenderedDocument, split_documents};
