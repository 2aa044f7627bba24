use serde::Deserialize;

pub const DEFAULT_ANNOTATION_PATTERN: &str = r"#This is the (?P<line>\d*) line";
pub const DEFAULT_CONTAINER_TYPE: &str = "!!map";
pub const DEFAULT_FRAGMENT_MARKER: &str = "dest";

#[derive(thiserror::Error, Debug)]
pub enum OptionsError {
    #[error("invalid pattern {pattern:?}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("pattern {pattern:?} has no `{group}` capture group")]
    MissingGroup {
        pattern: String,
        group: &'static str,
    },
    #[error("fragment marker must not be empty")]
    EmptyMarker,
    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Tunables for how rendered output and evaluator results are read.
///
/// Every field has a default, so a partial YAML document is enough:
///
/// ```yaml
/// annotationPattern: '# tpl:(?P<line>\d+)'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TraceOptions {
    /// Regex locating the template line annotation; needs a `line` group.
    pub annotation_pattern: String,
    /// Declared type of container nodes, which carry no scalar value.
    pub container_type: String,
    /// Literal marker the evaluator writes at the start of each element.
    pub fragment_marker: String,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            annotation_pattern: DEFAULT_ANNOTATION_PATTERN.to_string(),
            container_type: DEFAULT_CONTAINER_TYPE.to_string(),
            fragment_marker: DEFAULT_FRAGMENT_MARKER.to_string(),
        }
    }
}

impl TraceOptions {
    /// # Errors
    ///
    /// Returns an error if `src` is not a valid options document.
    pub fn from_yaml_str(src: &str) -> Result<Self, OptionsError> {
        if src.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(src)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Patterns;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<(), OptionsError> {
        let options = TraceOptions::from_yaml_str("containerType: '!!omap'\n")?;
        assert_eq!(options.container_type, "!!omap");
        assert_eq!(options.annotation_pattern, DEFAULT_ANNOTATION_PATTERN);
        assert_eq!(options.fragment_marker, DEFAULT_FRAGMENT_MARKER);
        Ok(())
    }

    #[test]
    fn empty_yaml_is_default() -> Result<(), OptionsError> {
        assert_eq!(TraceOptions::from_yaml_str("")?, TraceOptions::default());
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            TraceOptions::from_yaml_str("marker: x\n"),
            Err(OptionsError::Yaml(_))
        ));
    }

    #[test]
    fn custom_annotation_compiles() -> Result<(), OptionsError> {
        let options = TraceOptions {
            annotation_pattern: r"# tpl:(?P<line>\d+)".to_string(),
            ..TraceOptions::default()
        };
        let patterns = Patterns::compile(&options)?;
        assert_eq!(patterns.annotation.extract("value: x # tpl:12"), Some("12"));
        Ok(())
    }

    #[test]
    fn empty_marker_is_rejected() {
        let options = TraceOptions {
            fragment_marker: String::new(),
            ..TraceOptions::default()
        };
        assert!(matches!(
            Patterns::compile(&options),
            Err(OptionsError::EmptyMarker)
        ));
    }
}
