use serde::{Deserialize, Serialize};

use crate::SubcommandSpec;

/// Serializable bundle wrapping a finished command tree.
///
/// A package carries the root [`SubcommandSpec`] together with the metadata
/// a consumer needs to judge freshness: when the tree was generated and which
/// documentation index it was read from.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let root = SubcommandSpec::new("az", "Azure CLI")
///     .with_subcommand(SubcommandSpec::new("login", "Log in to Azure."));
/// let mut package = TreePackage::new(root, "2024-01-15T10:30:00Z");
/// package.source_url = Some("https://learn.microsoft.com/en-us/cli/azure/reference-index".into());
///
/// assert_eq!(package.node_count(), 2);
/// assert_eq!(package.format_version.as_deref(), Some(TREE_FORMAT_VERSION));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePackage {
    /// Output contract version (populated from
    /// [`TREE_FORMAT_VERSION`](crate::TREE_FORMAT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// ISO-8601 timestamp for package creation.
    pub generated_at: String,
    /// Documentation index the tree was discovered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Root node, named after the tool's invocation name.
    pub root: SubcommandSpec,
}

impl TreePackage {
    /// Creates a package around `root`.
    pub fn new(root: SubcommandSpec, generated_at: impl Into<String>) -> Self {
        Self {
            format_version: Some(crate::TREE_FORMAT_VERSION.to_string()),
            generated_at: generated_at.into(),
            source_url: None,
            root,
        }
    }

    /// Returns the number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}
