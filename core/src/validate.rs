//! Command tree validation.
//!
//! Validates structural invariants of a discovered command tree, catching
//! errors such as duplicate sibling names, nodes that are both a group and a
//! leaf, and malformed option aliases before the tree is handed to a
//! completion generator.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = SubcommandSpec::new("az", "Azure CLI")
//!     .with_subcommand(SubcommandSpec::new("login", "Log in."));
//! assert!(validate_tree(&root).is_empty());
//!
//! // Invalid: option alias missing its leading dash
//! let mut bad = SubcommandSpec::new("az", "Azure CLI");
//! bad.options = Some(vec![OptionSpec::flag(&["debug"])]);
//! assert!(!validate_tree(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{OptionSpec, SubcommandSpec, TreePackage};

/// Tree validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. Paths are space-joined node names from the root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package generation timestamp is empty.
    #[error("package generated_at cannot be empty")]
    EmptyGeneratedAt,
    /// A node name is empty or whitespace-only.
    #[error("empty node name under: {0}")]
    EmptyNodeName(String),
    /// Two children of the same node share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// A node has children and also carries options or args.
    #[error("node is both a group and a leaf: {0}")]
    GroupWithParameters(String),
    /// An option has no aliases.
    #[error("option without names at: {0}")]
    MissingOptionName(String),
    /// An option alias does not start with `-`.
    #[error("invalid option alias at {path}: {alias}")]
    InvalidOptionAlias {
        /// Node path holding the option.
        path: String,
        /// Offending alias.
        alias: String,
    },
    /// Two options of the same node share an alias.
    #[error("duplicate option alias at {path}: {alias}")]
    DuplicateOptionAlias {
        /// Node path holding the options.
        path: String,
        /// Repeated alias.
        alias: String,
    },
}

/// Validates a full tree package.
///
/// Checks the package metadata, then validates the root tree.
pub fn validate_package(package: &TreePackage) -> Vec<ValidationError> {
    if package.generated_at.trim().is_empty() {
        return vec![ValidationError::EmptyGeneratedAt];
    }
    validate_tree(&package.root)
}

/// Validates a command tree rooted at `root`.
///
/// Returns every problem found, in depth-first order. The root itself may
/// carry options alongside children: those are the global options.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let leaf = SubcommandSpec::leaf("list", "", Some(vec![OptionSpec::flag(&["--all"])]), None);
/// let group = SubcommandSpec::new("vm", "")
///     .with_subcommand(leaf.clone())
///     .with_subcommand(leaf);
/// let root = SubcommandSpec::new("az", "").with_subcommand(group);
///
/// let errors = validate_tree(&root);
/// assert_eq!(errors, vec![ValidationError::DuplicateSubcommand("az vm list".into())]);
/// ```
pub fn validate_tree(root: &SubcommandSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut path = vec![root.name.clone()];

    if root.name.trim().is_empty() {
        errors.push(ValidationError::EmptyNodeName(String::new()));
    }
    if let Some(options) = &root.options {
        errors.extend(validate_options(options, &path));
    }
    validate_children(&root.subcommands, &mut path, &mut errors);

    errors
}

fn validate_children(
    subcommands: &[SubcommandSpec],
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for sub in subcommands {
        let name = sub.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyNodeName(path.join(" ")));
            continue;
        }

        path.push(name.to_string());
        let joined = path.join(" ");

        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateSubcommand(joined.clone()));
        }
        if sub.is_group() && sub.is_leaf() {
            errors.push(ValidationError::GroupWithParameters(joined));
        }
        if let Some(options) = &sub.options {
            errors.extend(validate_options(options, path));
        }

        validate_children(&sub.subcommands, path, errors);
        path.pop();
    }
}

fn validate_options(options: &[OptionSpec], path: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let joined = path.join(" ");

    for option in options {
        if option.names.is_empty() {
            errors.push(ValidationError::MissingOptionName(joined.clone()));
            continue;
        }

        for alias in &option.names {
            if !alias.starts_with('-') || alias.trim_start_matches('-').is_empty() {
                errors.push(ValidationError::InvalidOptionAlias {
                    path: joined.clone(),
                    alias: alias.clone(),
                });
            } else if !seen.insert(alias.as_str()) {
                errors.push(ValidationError::DuplicateOptionAlias {
                    path: joined.clone(),
                    alias: alias.clone(),
                });
            }
        }
    }

    errors
}
