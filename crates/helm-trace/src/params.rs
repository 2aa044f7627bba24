use crate::options::{OptionsError, TraceOptions};
use regex::Regex;
use std::sync::LazyLock;

pub const API_VERSION_PATTERN: &str = r"^apiVersion:(?:[ \t]+(?P<apiVersion>\S*))?";
pub const KIND_PATTERN: &str = r"^kind:(?:[ \t]+(?P<kind>\S*))?";
pub const PATH_PATTERN: &str = r"path: (?P<path>\S*)";
pub const TYPE_PATTERN: &str = r"(?m)^type: '(?P<type>\S*)'";
pub const VALUE_PATTERN: &str = r"(?m)^value: (?P<value>\[.+\]|\S*)";

/// Pulls a single named capture out of a piece of text.
#[derive(Debug, Clone)]
pub struct Extractor {
    re: Regex,
    group: &'static str,
}

impl Extractor {
    /// Compile `pattern`, which must contain a capture group called `group`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile or lacks the group.
    pub fn new(pattern: &str, group: &'static str) -> Result<Self, OptionsError> {
        let re = Regex::new(pattern).map_err(|source| OptionsError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        if !re.capture_names().flatten().any(|name| name == group) {
            return Err(OptionsError::MissingGroup {
                pattern: pattern.to_string(),
                group,
            });
        }
        Ok(Self { re, group })
    }

    #[must_use]
    pub fn group(&self) -> &'static str {
        self.group
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Capture of the first match in `text`.
    ///
    /// `None` means the pattern did not match at all. A match whose group did
    /// not participate (or captured nothing) yields `Some("")`.
    #[must_use]
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = self.re.captures(text)?;
        Some(caps.name(self.group).map_or("", |m| m.as_str()))
    }

    /// Like [`Extractor::extract`], but treats an empty capture as absent.
    #[must_use]
    pub fn extract_non_empty<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.extract(text).filter(|s| !s.is_empty())
    }
}

/// The compiled set of extractors used during a scan.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub api_version: Extractor,
    pub kind: Extractor,
    pub path: Extractor,
    pub declared_type: Extractor,
    pub value: Extractor,
    pub annotation: Extractor,
    pub container_type: String,
    pub fragment_marker: String,
}

static DEFAULT_PATTERNS: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::compile(&TraceOptions::default()).expect("default patterns compile")
});

impl Default for Patterns {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

impl Patterns {
    /// # Errors
    ///
    /// Returns an error if the configured annotation pattern is invalid or the
    /// fragment marker is empty.
    pub fn compile(options: &TraceOptions) -> Result<Self, OptionsError> {
        if options.fragment_marker.is_empty() {
            return Err(OptionsError::EmptyMarker);
        }
        Ok(Self {
            api_version: Extractor::new(API_VERSION_PATTERN, "apiVersion")?,
            kind: Extractor::new(KIND_PATTERN, "kind")?,
            path: Extractor::new(PATH_PATTERN, "path")?,
            declared_type: Extractor::new(TYPE_PATTERN, "type")?,
            value: Extractor::new(VALUE_PATTERN, "value")?,
            annotation: Extractor::new(&options.annotation_pattern, "line")?,
            container_type: options.container_type.clone(),
            fragment_marker: options.fragment_marker.clone(),
        })
    }

    #[must_use]
    pub fn is_container_type(&self, declared_type: &str) -> bool {
        declared_type == self.container_type
    }
}
