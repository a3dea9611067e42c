//! Core command tree types and shared package primitives.
//!
//! This crate defines the foundational types for modeling a CLI command
//! surface discovered from reference documentation:
//!
//! - [`SubcommandSpec`]: a tree node, which is a group with children, a leaf with
//!   options and positional args, or a stub with neither.
//! - [`OptionSpec`]: an option with its alias spellings and optional value.
//! - [`ArgSpec`]: a value slot, either an option's value or a positional
//!   argument, with optional accepted-value suggestions.
//! - [`TreePackage`]: a finished tree bundled with generation metadata.
//!
//! Validation ([`validate_tree`], [`validate_package`]) catches structural
//! errors such as duplicate siblings, nodes that are both group and leaf, and
//! malformed option aliases.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let mut root = SubcommandSpec::new("az", "Azure CLI");
//! root.options = Some(vec![
//!     OptionSpec::flag(&["--debug"]).with_description("Increase logging verbosity.").persistent(),
//! ]);
//! root.subcommands.push(
//!     SubcommandSpec::new("vm", "Manage virtual machines.").with_subcommand(SubcommandSpec::leaf(
//!         "create",
//!         "Create a VM.",
//!         Some(vec![OptionSpec::with_arg(&["--name", "-n"], ArgSpec::required("name"))]),
//!         None,
//!     )),
//! );
//!
//! assert!(root.find_path(&["vm", "create"]).is_some());
//! assert!(validate_tree(&root).is_empty());
//! ```

mod package;
mod types;
mod validate;

pub use package::TreePackage;
pub use types::*;
pub use validate::{ValidationError, validate_package, validate_tree};
