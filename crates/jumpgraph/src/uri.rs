//! Relocatable document URIs.
//!
//! A graph saved inside a workspace refers to documents by URIs rooted at
//! that workspace. When there is exactly one workspace root, the root prefix
//! is swapped for [`WORKSPACE_MARKER`] before a location is stored and
//! swapped back before it is opened, so a graph keeps working after the
//! workspace is moved or cloned elsewhere.

use crate::types::SourceLocation;

/// Stands in for the workspace root in stored URIs.
pub const WORKSPACE_MARKER: &str = "workspace://";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriNormalizer {
    root: Option<String>,
}

impl UriNormalizer {
    /// A normalizer for a single known root. Trailing slashes are ignored.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let trimmed = root.trim_end_matches('/');
        Self {
            root: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    /// A normalizer that stores URIs verbatim.
    pub fn verbatim() -> Self {
        Self { root: None }
    }

    /// Pick the root from the workspace's open folders. Anything other than
    /// exactly one folder is ambiguous and yields a verbatim normalizer.
    pub fn from_roots<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roots = roots.into_iter();
        match (roots.next(), roots.next()) {
            (Some(root), None) => Self::new(root),
            _ => Self::verbatim(),
        }
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Rewrite a URI under the root to its relocatable form.
    ///
    /// ```
    /// use jumpgraph::v1::UriNormalizer;
    ///
    /// let n = UriNormalizer::new("file:///home/alex/project");
    /// assert_eq!(n.normalize("file:///home/alex/project/src/main.rs"), "workspace:///src/main.rs");
    /// assert_eq!(n.normalize("file:///etc/hosts"), "file:///etc/hosts");
    /// assert_eq!(n.denormalize("workspace:///src/main.rs"), "file:///home/alex/project/src/main.rs");
    /// ```
    pub fn normalize(&self, uri: &str) -> String {
        if let Some(root) = &self.root
            && let Some(rest) = uri.strip_prefix(root.as_str())
            && (rest.is_empty() || rest.starts_with('/'))
        {
            return format!("{WORKSPACE_MARKER}{rest}");
        }
        uri.to_string()
    }

    /// Restore a URI stored by [`normalize`](Self::normalize).
    pub fn denormalize(&self, uri: &str) -> String {
        if let Some(root) = &self.root
            && let Some(rest) = uri.strip_prefix(WORKSPACE_MARKER)
        {
            return format!("{root}{rest}");
        }
        uri.to_string()
    }

    pub fn normalize_location(&self, location: &SourceLocation) -> SourceLocation {
        SourceLocation {
            uri: self.normalize(&location.uri),
            ..location.clone()
        }
    }

    pub fn denormalize_location(&self, location: &SourceLocation) -> SourceLocation {
        SourceLocation {
            uri: self.denormalize(&location.uri),
            ..location.clone()
        }
    }
}
