use crate::error::Error;
use crate::params::Patterns;
use serde::Serialize;
use std::sync::Arc;

/// The Kubernetes resource (apiVersion + kind) a field belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentity {
    pub api_version: String,
    pub kind: String,
}

impl ObjectIdentity {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

impl std::fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKey {
    ApiVersion,
    Kind,
}

impl std::fmt::Display for DeclarationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiVersion => f.write_str("apiVersion"),
            Self::Kind => f.write_str("kind"),
        }
    }
}

/// How the tracker classified a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// An `apiVersion:` or `kind:` line; never queried for fields.
    Declaration(DeclarationKey),
    Field,
}

/// Follows `apiVersion:`/`kind:` declarations through a rendered document.
///
/// Once both parts are known the identity is frozen into an [`Arc`] shared by
/// every node recorded for that object. A declaration arriving for a part that
/// is already set while the identity is complete starts a new object: the
/// other part becomes unknown until it is declared again.
#[derive(Debug, Default, Clone)]
pub struct IdentityTracker {
    api_version: Option<String>,
    kind: Option<String>,
    current: Option<Arc<ObjectIdentity>>,
}

impl IdentityTracker {
    /// Classify `text` (rendered line `line`, 1-based) and absorb declarations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] if a declaration carries no value.
    pub fn observe(&mut self, patterns: &Patterns, line: usize, text: &str) -> Result<LineClass, Error> {
        let (key, captured) = if let Some(v) = patterns.api_version.extract(text) {
            (DeclarationKey::ApiVersion, v)
        } else if let Some(v) = patterns.kind.extract(text) {
            (DeclarationKey::Kind, v)
        } else {
            return Ok(LineClass::Field);
        };

        let value = captured.trim_matches('"').trim_matches('\'');
        if value.is_empty() {
            return Err(Error::MissingValue {
                line,
                key,
                text: text.to_string(),
            });
        }
        self.declare(key, value.to_string());
        Ok(LineClass::Declaration(key))
    }

    fn declare(&mut self, key: DeclarationKey, value: String) {
        if let Some(previous) = self.current.take() {
            tracing::debug!(%previous, line_key = %key, "starting new object scope");
            match key {
                DeclarationKey::ApiVersion => self.kind = None,
                DeclarationKey::Kind => self.api_version = None,
            }
        }
        match key {
            DeclarationKey::ApiVersion => self.api_version = Some(value),
            DeclarationKey::Kind => self.kind = Some(value),
        }
        if let (Some(api_version), Some(kind)) = (&self.api_version, &self.kind) {
            let identity = Arc::new(ObjectIdentity::new(api_version.clone(), kind.clone()));
            tracing::debug!(%identity, "object identity established");
            self.current = Some(identity);
        }
    }

    /// Whether at least one of apiVersion/kind has been seen.
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.api_version.is_some() || self.kind.is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Arc<ObjectIdentity>> {
        self.current.as_ref()
    }

    /// The complete identity, for a field at `path` on rendered line `line`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteIdentity`] if either part is still unknown.
    pub fn require(&self, line: usize, path: &str) -> Result<Arc<ObjectIdentity>, Error> {
        self.current.clone().ok_or_else(|| Error::IncompleteIdentity {
            line,
            path: path.to_string(),
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(tracker: &mut IdentityTracker, lines: &[&str]) -> Result<Vec<LineClass>, Error> {
        let patterns = Patterns::default();
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| tracker.observe(&patterns, i + 1, l))
            .collect()
    }

    #[test]
    fn identity_completes_after_both_declarations() -> Result<(), Error> {
        let mut tracker = IdentityTracker::default();
        let classes = observe_all(&mut tracker, &["apiVersion: apps/v1", "kind: Deployment", "metadata:"])?;
        assert_eq!(
            classes,
            vec![
                LineClass::Declaration(DeclarationKey::ApiVersion),
                LineClass::Declaration(DeclarationKey::Kind),
                LineClass::Field,
            ]
        );
        assert_eq!(
            tracker.current().map(|id| id.as_ref().clone()),
            Some(ObjectIdentity::new("apps/v1", "Deployment"))
        );
        Ok(())
    }

    #[test]
    fn half_identity_is_incomplete() -> Result<(), Error> {
        let mut tracker = IdentityTracker::default();
        observe_all(&mut tracker, &["apiVersion: v1"])?;
        assert!(tracker.has_any());
        assert!(!tracker.is_complete());
        let err = tracker.require(2, "data.foo").unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteIdentity { line: 2, ref api_version, kind: None, .. }
                if api_version.as_deref() == Some("v1")
        ));
        Ok(())
    }

    #[test]
    fn empty_declaration_is_missing_value() {
        let mut tracker = IdentityTracker::default();
        let err = observe_all(&mut tracker, &["apiVersion: v1", "kind:"]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingValue { line: 2, key: DeclarationKey::Kind, .. }
        ));
    }

    #[test]
    fn quoted_values_are_unquoted() -> Result<(), Error> {
        let mut tracker = IdentityTracker::default();
        observe_all(&mut tracker, &["apiVersion: \"v1\"", "kind: 'Secret'"])?;
        assert_eq!(
            tracker.current().map(|id| id.to_string()),
            Some("v1/Secret".to_string())
        );
        Ok(())
    }

    #[test]
    fn redeclaration_starts_new_scope() -> Result<(), Error> {
        let mut tracker = IdentityTracker::default();
        observe_all(&mut tracker, &["apiVersion: v1", "kind: Service"])?;
        let first = tracker.current().cloned();

        observe_all(&mut tracker, &["apiVersion: apps/v1"])?;
        assert!(!tracker.is_complete());
        assert!(tracker.require(4, "spec").is_err());

        observe_all(&mut tracker, &["kind: Deployment"])?;
        let second = tracker.current().cloned();
        assert_eq!(
            second.as_deref(),
            Some(&ObjectIdentity::new("apps/v1", "Deployment"))
        );
        assert_eq!(first.as_deref(), Some(&ObjectIdentity::new("v1", "Service")));
        Ok(())
    }
}
