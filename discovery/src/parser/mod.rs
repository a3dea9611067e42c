//! Reference-page reader for the heading/table/parameter convention.
//!
//! Documentation pages carry no nesting markup for commands. Hierarchy is
//! implied by multi-token headings (`az vm disk attach`) and parameters are
//! attached to a command only by where they appear in the page. This module
//! turns such pages into flat records:
//!
//! - [`outline`] flattens a page into an ordered list of markers (command
//!   headings, section headings, parameter names with their descriptions).
//! - [`scan`] walks those markers forward from a command heading and stops
//!   at the first marker that belongs to something else.
//! - [`classify`] turns each raw (name, description) pair into an
//!   [`OptionSpec`](cmdtree_core::OptionSpec) or
//!   [`ArgSpec`](cmdtree_core::ArgSpec).
//! - [`page`] reads a command-group page into a [`PageRecord`].
//! - [`index`] reads the root index table, a detail page's group links, and
//!   the global parameter block.

pub mod classify;
pub mod index;
pub mod outline;
pub mod page;
pub mod scan;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

pub use classify::{Parameter, ParameterClassifier};
pub use index::{BaseCommand, IndexRow};
pub use outline::{CommandHeading, DocumentOutline, ParameterMarker};
pub use page::{CommandRecord, PageReader, PageRecord};
pub use scan::{ParameterSection, ScanStop};

/// A (name, description) pair exactly as it appears in a document.
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::parser::RawParameter;
///
/// let raw = RawParameter::new("--name -n", "Name of the VM.");
/// assert!(raw.is_option());
/// assert!(!raw.is_arg());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameter {
    /// Name text (`--name -n`, `<vm-name>`)
    pub name: String,
    /// Description text, annotations included
    pub description: String,
}

impl RawParameter {
    /// Creates a raw parameter.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns `true` if the name text denotes an option (`-x`, `--long`).
    pub fn is_option(&self) -> bool {
        self.name.trim().starts_with('-')
    }

    /// Returns `true` if the name text denotes a positional (`<name>`).
    pub fn is_arg(&self) -> bool {
        self.name.trim().starts_with('<')
    }
}

/// Regex patterns shared by the page readers.
static PATTERNS: LazyLock<DocPatterns> = LazyLock::new(DocPatterns::new);

struct DocPatterns {
    // "(Preview)", "(Experimental)" badges in headings
    parenthesized: Regex,
    accepted_values: Regex,
    accepted_values_clause: Regex,
    default_value_clause: Regex,
    default_value_marker: Regex,
}

impl DocPatterns {
    fn new() -> Self {
        Self {
            parenthesized: Regex::new(r"\(.*\)").expect("static regex must compile"),
            accepted_values: Regex::new(r"(?i)accepted values:([^\n]+)")
                .expect("static regex must compile"),
            accepted_values_clause: Regex::new(r"(?i)accepted values:[^\n]+")
                .expect("static regex must compile"),
            default_value_clause: Regex::new(r"(?i)default value:[^\n]+")
                .expect("static regex must compile"),
            default_value_marker: Regex::new(r"(?i)default value:")
                .expect("static regex must compile"),
        }
    }
}

/// CSS selectors shared by the page readers.
static SELECTORS: LazyLock<DocSelectors> = LazyLock::new(DocSelectors::new);

struct DocSelectors {
    any: Selector,
    table: Selector,
    body_row: Selector,
    cell: Selector,
    link: Selector,
    h2: Selector,
    parameter_name: Selector,
    parameter_info: Selector,
}

impl DocSelectors {
    fn new() -> Self {
        let parse = |css: &str| Selector::parse(css).expect("static selector must parse");
        Self {
            any: parse("*"),
            table: parse("table"),
            body_row: parse("tbody > tr"),
            cell: parse("td"),
            link: parse("a[href]"),
            h2: parse("h2"),
            parameter_name: parse(".parameterName"),
            parameter_info: parse(".parameterInfo"),
        }
    }
}

/// Removes parenthesised badges and surrounding whitespace from a heading.
///
/// ```
/// use cmdtree_discovery::parser::clean_command_name;
///
/// assert_eq!(clean_command_name(" az vm list (Preview) "), "az vm list");
/// assert_eq!(clean_command_name("az vm"), "az vm");
/// ```
pub fn clean_command_name(text: &str) -> String {
    PATTERNS.parenthesized.replace_all(text, "").trim().to_string()
}

/// Splits a heading into path segments, dropping `prefix_tokens` leading
/// tokens (tool name and base command).
///
/// ```
/// use cmdtree_discovery::parser::command_path;
///
/// assert_eq!(command_path("az vm disk attach", 2), vec!["disk", "attach"]);
/// assert!(command_path("az vm", 2).is_empty());
/// ```
pub fn command_path(heading: &str, prefix_tokens: usize) -> Vec<String> {
    clean_command_name(heading)
        .split_whitespace()
        .skip(prefix_tokens)
        .map(str::to_string)
        .collect()
}

/// Concatenated text of an element and its descendants.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|candidate| candidate == class)
}

fn has_ancestor(element: ElementRef<'_>, name: &str) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|ancestor| ancestor.name() == name)
}
