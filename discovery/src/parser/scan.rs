//! Boundary-scanning parameter extraction.
//!
//! Parameters belong to a command only by position: they follow the command's
//! "Required Parameters" or "Optional Parameters" section heading and run
//! until something that clearly belongs elsewhere appears. The stop
//! conditions are collected in [`boundary`] so each one is visible and
//! testable on its own.

use serde::Serialize;
use tracing::trace;

use super::RawParameter;
use super::outline::{CommandHeading, DocumentOutline, ParameterMarker};

/// Which parameter section of a command to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSection {
    /// `<command-id>-required-parameters`
    Required,
    /// `<command-id>-optional-parameters`
    Optional,
}

impl ParameterSection {
    /// Suffix appended to a command id to form the section anchor.
    pub fn anchor_suffix(self) -> &'static str {
        match self {
            ParameterSection::Required => "-required-parameters",
            ParameterSection::Optional => "-optional-parameters",
        }
    }

    /// Section anchor id for the command with id `command_id`.
    pub fn anchor_id(self, command_id: &str) -> String {
        format!("{command_id}{}", self.anchor_suffix())
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStop {
    /// No markers left in the document.
    Exhausted,
    /// The marker sits inside the global-options block.
    GlobalBlock,
    /// The nearest command heading before the marker is another command.
    ForeignCommand,
    /// The nearest section heading before the marker is not the requested
    /// section.
    SectionMismatch,
    /// The marker has no description element after it.
    MissingDescription,
}

/// Returns the reason `marker` ends a scan for `heading`'s `section`, or
/// `None` if the marker belongs to it.
pub fn boundary(
    marker: &ParameterMarker,
    heading: &CommandHeading,
    section: ParameterSection,
) -> Option<ScanStop> {
    if marker.in_global_block {
        return Some(ScanStop::GlobalBlock);
    }
    if marker.owner.as_deref() != Some(heading.id.as_str()) {
        return Some(ScanStop::ForeignCommand);
    }
    let in_section = marker
        .section
        .as_deref()
        .is_some_and(|id| id.ends_with(section.anchor_suffix()));
    if !in_section {
        return Some(ScanStop::SectionMismatch);
    }
    if marker.description.is_none() {
        return Some(ScanStop::MissingDescription);
    }
    None
}

/// Collects the parameters of one section of one command.
///
/// Returns an empty list if the page has no anchor for the section. The scan
/// starts at the heading, so only the first section after it can match: when
/// required parameters come first, the optional scan stops on them.
pub fn extract_parameters(
    outline: &DocumentOutline,
    heading: &CommandHeading,
    section: ParameterSection,
) -> Vec<RawParameter> {
    let anchor = section.anchor_id(&heading.id);
    if !outline.has_anchor(&anchor) {
        trace!(command = %heading.id, anchor = %anchor, "Section anchor absent");
        return Vec::new();
    }

    let mut parameters = Vec::new();
    let mut stop = ScanStop::Exhausted;
    for marker in outline.parameters_after(heading.position) {
        if let Some(reason) = boundary(marker, heading, section) {
            stop = reason;
            break;
        }
        let description = marker.description.as_deref().unwrap_or_default();
        parameters.push(RawParameter::new(marker.name.trim(), description.trim()));
    }

    trace!(
        command = %heading.id,
        ?section,
        ?stop,
        count = parameters.len(),
        "Parameter scan finished"
    );
    parameters
}
