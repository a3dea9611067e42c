//! Command tree type definitions.
//!
//! This module defines the data model produced by documentation discovery.
//! A tree is made of [`SubcommandSpec`] nodes; leaves carry [`OptionSpec`]
//! and [`ArgSpec`] lists, groups carry child nodes. The types are designed
//! for serialization with [`serde`] so the finished tree can be handed to a
//! completion generator as JSON or YAML.

use serde::{Deserialize, Serialize};

/// Version of the tree output contract (semver).
///
/// Embedded in every [`TreePackage`](crate::TreePackage) to track
/// compatibility across releases.
pub const TREE_FORMAT_VERSION: &str = "1.0.0";

/// A value slot, either attached to an option or standing alone as a
/// positional argument.
///
/// # Examples
///
/// ```
/// use cmdtree_core::ArgSpec;
///
/// let arg = ArgSpec::required("output")
///     .with_suggestions(vec!["json".into(), "table".into()]);
/// assert!(!arg.is_optional);
/// assert_eq!(arg.suggestions.as_deref().map(<[String]>::len), Some(2));
///
/// let positional = ArgSpec::optional("<name>").with_description("Name of the item.");
/// assert!(positional.is_optional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    /// Argument name (`resource-group`, or a `<placeholder>` for positionals)
    pub name: String,
    /// Description from the documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the argument may be omitted
    pub is_optional: bool,
    /// Literal accepted values, in documentation order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ArgSpec {
    /// Creates an argument that must be supplied.
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            is_optional: false,
            suggestions: None,
        }
    }

    /// Creates an argument that may be omitted.
    pub fn optional(name: &str) -> Self {
        Self {
            is_optional: true,
            ..Self::required(name)
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the accepted values. An empty list is stored as absent.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = if suggestions.is_empty() {
            None
        } else {
            Some(suggestions)
        };
        self
    }
}

/// An option (`--resource-group -g`) with its aliases and optional value.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ArgSpec, OptionSpec};
///
/// let group = OptionSpec::with_arg(&["--resource-group", "-g"], ArgSpec::required("resource-group"))
///     .with_description("Name of resource group.");
/// assert!(group.takes_value());
/// assert!(group.matches("-g"));
/// assert_eq!(group.canonical_name(), "--resource-group");
///
/// let debug = OptionSpec::flag(&["--debug"]).persistent();
/// assert!(!debug.takes_value());
/// assert!(debug.is_persistent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Alias spellings in documentation order (e.g., `--name`, `-n`)
    pub names: Vec<String>,
    /// Description with value annotations removed
    pub description: String,
    /// True for options valid on every command (the global block)
    pub is_persistent: bool,
    /// Value taken by the option; absent for boolean flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ArgSpec>,
}

impl OptionSpec {
    /// Creates a boolean flag (no value).
    pub fn flag(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            description: String::new(),
            is_persistent: false,
            args: None,
        }
    }

    /// Creates an option that takes a value.
    pub fn with_arg(names: &[&str], arg: ArgSpec) -> Self {
        Self {
            args: Some(arg),
            ..Self::flag(names)
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Marks as a persistent (global) option.
    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    /// Returns `true` if the option expects a value.
    pub fn takes_value(&self) -> bool {
        self.args.is_some()
    }

    /// Returns the longest alias, earliest first on ties.
    pub fn canonical_name(&self) -> &str {
        longest_alias(&self.names).unwrap_or("unknown")
    }

    /// Checks if any alias equals `alias`.
    pub fn matches(&self, alias: &str) -> bool {
        self.names.iter().any(|name| name == alias)
    }
}

/// Returns the longest alias in `names`, keeping the earliest one on ties.
///
/// ```
/// let names = vec!["-n".to_string(), "--name".to_string(), "--nick".to_string()];
/// assert_eq!(cmdtree_core::longest_alias(&names), Some("--name"));
/// ```
pub fn longest_alias(names: &[String]) -> Option<&str> {
    let mut best: Option<&str> = None;
    for name in names {
        if best.is_none_or(|current| name.len() > current.len()) {
            best = Some(name);
        }
    }
    best
}

/// A node of the command tree.
///
/// A node is exactly one of:
///
/// - a **group**: non-empty `subcommands`, no `options`/`args`;
/// - a **leaf**: `options` and/or `args` present, no `subcommands`;
/// - a **stub**: neither (an index entry without a detail page).
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ArgSpec, OptionSpec, SubcommandSpec};
///
/// let create = SubcommandSpec::leaf(
///     "create",
///     "Create a VM.",
///     Some(vec![OptionSpec::with_arg(&["--name", "-n"], ArgSpec::required("name"))]),
///     None,
/// );
/// let vm = SubcommandSpec::new("vm", "Manage virtual machines.").with_subcommand(create);
///
/// assert!(vm.is_group());
/// assert!(vm.find_path(&["create"]).is_some_and(SubcommandSpec::is_leaf));
/// assert!(SubcommandSpec::new("login", "Log in.").is_stub());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandSpec {
    /// Name of this node (one path segment, or the base command text)
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Child nodes in documentation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandSpec>,
    /// Options of a leaf, or the global options of the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionSpec>>,
    /// Positional arguments of a leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<ArgSpec>>,
}

impl SubcommandSpec {
    /// Creates a node with only a name and description.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Creates a leaf node. Empty lists are stored as absent.
    pub fn leaf(
        name: &str,
        description: &str,
        options: Option<Vec<OptionSpec>>,
        args: Option<Vec<ArgSpec>>,
    ) -> Self {
        Self {
            options: options.filter(|list| !list.is_empty()),
            args: args.filter(|list| !list.is_empty()),
            ..Self::new(name, description)
        }
    }

    /// Adds a child node.
    pub fn with_subcommand(mut self, sub: SubcommandSpec) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Returns `true` if this node has children.
    pub fn is_group(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Returns `true` if this node carries options or args.
    pub fn is_leaf(&self) -> bool {
        self.options.is_some() || self.args.is_some()
    }

    /// Returns `true` if this node has neither children nor parameters.
    pub fn is_stub(&self) -> bool {
        !self.is_group() && !self.is_leaf()
    }

    /// Finds a direct child by name.
    pub fn find_subcommand(&self, name: &str) -> Option<&SubcommandSpec> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }

    /// Follows `path` from this node through child names.
    pub fn find_path(&self, path: &[&str]) -> Option<&SubcommandSpec> {
        path.iter()
            .try_fold(self, |node, segment| node.find_subcommand(segment))
    }

    /// Gets all child names.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }

    /// Counts this node and all its descendants.
    pub fn node_count(&self) -> usize {
        1 + self
            .subcommands
            .iter()
            .map(SubcommandSpec::node_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_alias_prefers_first_on_ties() {
        let names = vec!["--abc".to_string(), "--xyz".to_string(), "-a".to_string()];
        assert_eq!(longest_alias(&names), Some("--abc"));
        assert_eq!(longest_alias(&[]), None);
    }

    #[test]
    fn test_leaf_drops_empty_lists() {
        let leaf = SubcommandSpec::leaf("show", "Show it.", Some(Vec::new()), Some(Vec::new()));
        assert!(leaf.options.is_none());
        assert!(leaf.args.is_none());
        assert!(leaf.is_stub());
    }

    #[test]
    fn test_find_path_walks_nested_groups() {
        let tree = SubcommandSpec::new("az", "Azure CLI").with_subcommand(
            SubcommandSpec::new("vm", "").with_subcommand(
                SubcommandSpec::new("disk", "")
                    .with_subcommand(SubcommandSpec::new("attach", "Attach a disk.")),
            ),
        );

        let attach = tree.find_path(&["vm", "disk", "attach"]);
        assert_eq!(attach.map(|s| s.description.as_str()), Some("Attach a disk."));
        assert!(tree.find_path(&["vm", "nic"]).is_none());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let stub = SubcommandSpec::new("login", "Log in to Azure.");
        let json = serde_json::to_value(&stub).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "login", "description": "Log in to Azure."})
        );

        let parsed: SubcommandSpec = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, stub);
    }

    #[test]
    fn test_option_matches_any_alias() {
        let option = OptionSpec::with_arg(&["--output", "-o"], ArgSpec::required("output"));
        assert!(option.matches("--output"));
        assert!(option.matches("-o"));
        assert!(!option.matches("--out"));
    }
}
