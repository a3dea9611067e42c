//! Parameter classification.
//!
//! Turns one [`RawParameter`] into an [`OptionSpec`] (name starts with `-`)
//! or an [`ArgSpec`] (name starts with `<`). Anything else is dropped: the
//! predicates are deliberately narrow gates, and a parameter matching
//! neither is an accepted loss rather than an error.

use cmdtree_core::{ArgSpec, OptionSpec, longest_alias};
use tracing::trace;

use super::{PATTERNS, RawParameter};
use crate::config::DEFAULT_NO_ARG_GLOBAL_FLAGS;

/// Case-insensitive marker of a boolean option.
const DEFAULT_FALSE_MARKER: &str = "default value: false";

/// A classified parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// A `-x` / `--long` option.
    Option(OptionSpec),
    /// A `<placeholder>` positional argument.
    Arg(ArgSpec),
}

/// Classifies raw parameters into options and positional arguments.
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::parser::{Parameter, ParameterClassifier, RawParameter};
///
/// let classifier = ParameterClassifier::default();
/// let raw = RawParameter::new("--resource-group -g", "Name of resource group.");
///
/// let Some(Parameter::Option(option)) = classifier.classify(&raw, false) else {
///     panic!("expected an option");
/// };
/// assert_eq!(option.names, vec!["--resource-group", "-g"]);
/// assert_eq!(option.args.unwrap().name, "resource-group");
/// ```
#[derive(Debug, Clone)]
pub struct ParameterClassifier {
    no_arg_global_flags: Vec<String>,
}

impl Default for ParameterClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NO_ARG_GLOBAL_FLAGS.iter().map(|flag| flag.to_string()))
    }
}

impl ParameterClassifier {
    /// Creates a classifier treating `no_arg_global_flags` as boolean when
    /// they appear in the persistent block.
    pub fn new(no_arg_global_flags: impl IntoIterator<Item = String>) -> Self {
        Self {
            no_arg_global_flags: no_arg_global_flags.into_iter().collect(),
        }
    }

    /// Classifies `raw`, returning `None` when it is neither an option nor a
    /// positional argument.
    pub fn classify(&self, raw: &RawParameter, is_persistent: bool) -> Option<Parameter> {
        if raw.is_option() {
            Some(Parameter::Option(self.to_option(raw, is_persistent)))
        } else if raw.is_arg() {
            Some(Parameter::Arg(to_arg(raw)))
        } else {
            trace!(name = %raw.name, "Dropping parameter that is neither option nor arg");
            None
        }
    }

    /// Builds an option from `raw`. Callers filter with
    /// [`RawParameter::is_option`] first.
    pub fn to_option(&self, raw: &RawParameter, is_persistent: bool) -> OptionSpec {
        let names: Vec<String> = raw.name.split_whitespace().map(str::to_string).collect();
        let arg_name = canonical_arg_name(&names);

        let is_flag = raw
            .description
            .to_lowercase()
            .contains(DEFAULT_FALSE_MARKER)
            || (is_persistent && names.iter().any(|name| self.is_no_arg_global_flag(name)));

        let without_default = PATTERNS
            .default_value_clause
            .replace_all(&raw.description, "");

        let args = (!is_flag).then(|| {
            ArgSpec::required(&arg_name).with_suggestions(accepted_values(&raw.description))
        });

        let description = PATTERNS
            .accepted_values_clause
            .replace_all(&without_default, "")
            .trim()
            .to_string();

        OptionSpec {
            names,
            description,
            is_persistent,
            args,
        }
    }

    fn is_no_arg_global_flag(&self, name: &str) -> bool {
        self.no_arg_global_flags.iter().any(|flag| flag == name)
    }
}

/// Builds a positional argument from `raw`. Table-derived positionals are
/// always optional.
pub fn to_arg(raw: &RawParameter) -> ArgSpec {
    ArgSpec::optional(raw.name.trim()).with_description(raw.description.trim())
}

/// Longest alias with one leading `--` or `-` removed.
fn canonical_arg_name(names: &[String]) -> String {
    let longest = longest_alias(names).unwrap_or_default();
    longest
        .strip_prefix("--")
        .or_else(|| longest.strip_prefix('-'))
        .unwrap_or(longest)
        .to_string()
}

/// Values listed after the first `accepted values:` annotation, up to a
/// `default value:` clause on the same line.
fn accepted_values(description: &str) -> Vec<String> {
    let Some(captures) = PATTERNS.accepted_values.captures(description) else {
        return Vec::new();
    };
    let listed = &captures[1];
    let listed = match PATTERNS.default_value_marker.find(listed) {
        Some(clause) => &listed[..clause.start()],
        None => listed,
    };
    listed
        .trim()
        .trim_end_matches('.')
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
