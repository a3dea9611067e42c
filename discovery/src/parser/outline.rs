//! Flat, ordered view of a reference page.
//!
//! The page is walked once in document order and every element the readers
//! care about is recorded with its position. Relationships that the scan
//! needs ("nearest preceding command heading", "nearest preceding section
//! heading", "next description after this name") are resolved during that
//! walk, so the scan itself never goes back to the HTML tree.

use std::collections::HashSet;

use scraper::Html;
use serde::Serialize;

use super::{SELECTORS, element_text, has_ancestor, has_class};

/// Class of a parameter-name element.
const PARAMETER_NAME_CLASS: &str = "parameterName";
/// Class of the element describing the preceding parameter name.
const PARAMETER_INFO_CLASS: &str = "parameterInfo";
/// Class of the group summary element.
const SUMMARY_CLASS: &str = "summary";
/// Disclosure element wrapping the global parameter block.
const GLOBAL_BLOCK_ELEMENT: &str = "details";

/// A heading that introduces one command (`<h2 id="az-vm-create">`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandHeading {
    /// Document-order position of the heading element.
    pub position: usize,
    /// Heading id (`az-vm-create`).
    pub id: String,
    /// Raw heading text (`az vm create (Preview)`).
    pub text: String,
    /// Trimmed text of the first paragraph after the heading.
    pub description: Option<String>,
}

/// A parameter-name element and everything the scan checks about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterMarker {
    /// Document-order position of the name element.
    pub position: usize,
    /// Raw name text.
    pub name: String,
    /// Text of the next parameter-info element, if any follows.
    pub description: Option<String>,
    /// Whether the marker sits inside a global-options disclosure block.
    pub in_global_block: bool,
    /// Id of the nearest preceding command heading.
    pub owner: Option<String>,
    /// Id of the nearest preceding section (`h3`) heading.
    pub section: Option<String>,
}

/// Ordered markers of one page.
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::parser::DocumentOutline;
///
/// let html = r#"
///   <h1>az vm</h1>
///   <h2 id="az-vm-list">az vm list</h2><p>List VMs.</p>
///   <h3 id="az-vm-list-optional-parameters">Optional Parameters</h3>
///   <div class="parameterName">--all</div><div class="parameterInfo">Show all.</div>
/// "#;
/// let outline = DocumentOutline::parse(html, "az-");
///
/// assert_eq!(outline.title(), Some("az vm"));
/// assert_eq!(outline.commands()[0].description.as_deref(), Some("List VMs."));
/// assert_eq!(outline.parameters()[0].owner.as_deref(), Some("az-vm-list"));
/// assert!(outline.has_anchor("az-vm-list-optional-parameters"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentOutline {
    title: Option<String>,
    summary: Option<String>,
    anchors: HashSet<String>,
    commands: Vec<CommandHeading>,
    parameters: Vec<ParameterMarker>,
}

impl DocumentOutline {
    /// Parses `html` and builds its outline. Command headings are `h2`
    /// elements whose id starts with `command_id_prefix`.
    pub fn parse(html: &str, command_id_prefix: &str) -> Self {
        Self::from_document(&Html::parse_document(html), command_id_prefix)
    }

    /// Builds the outline of an already parsed document.
    pub fn from_document(document: &Html, command_id_prefix: &str) -> Self {
        let mut outline = Self::default();
        let mut owner: Option<String> = None;
        let mut section: Option<String> = None;
        let mut awaiting_paragraph: Vec<usize> = Vec::new();
        let mut awaiting_info: Vec<usize> = Vec::new();

        for (position, element) in document.select(&SELECTORS.any).enumerate() {
            let name = element.value().name();
            let id = element.value().id();

            if let Some(id) = id {
                outline.anchors.insert(id.to_string());
            }

            match name {
                "h1" if outline.title.is_none() => {
                    outline.title = Some(element_text(element).trim().to_string());
                }
                "h2" => {
                    if let Some(id) = id.filter(|id| id.starts_with(command_id_prefix)) {
                        awaiting_paragraph.push(outline.commands.len());
                        outline.commands.push(CommandHeading {
                            position,
                            id: id.to_string(),
                            text: element_text(element),
                            description: None,
                        });
                        owner = Some(id.to_string());
                    }
                }
                "h3" => section = id.map(str::to_string),
                "p" if !awaiting_paragraph.is_empty() => {
                    let text = element_text(element).trim().to_string();
                    for index in awaiting_paragraph.drain(..) {
                        outline.commands[index].description = Some(text.clone());
                    }
                }
                _ => {}
            }

            if outline.summary.is_none() && has_class(element, SUMMARY_CLASS) {
                outline.summary = Some(element_text(element).trim().to_string());
            }

            if has_class(element, PARAMETER_NAME_CLASS) {
                awaiting_info.push(outline.parameters.len());
                outline.parameters.push(ParameterMarker {
                    position,
                    name: element_text(element),
                    description: None,
                    in_global_block: has_ancestor(element, GLOBAL_BLOCK_ELEMENT),
                    owner: owner.clone(),
                    section: section.clone(),
                });
            } else if has_class(element, PARAMETER_INFO_CLASS) {
                let text = element_text(element);
                for index in awaiting_info.drain(..) {
                    outline.parameters[index].description = Some(text.clone());
                }
            }
        }

        outline
    }

    /// Trimmed text of the first `h1`.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Trimmed text of the first summary element.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Command headings in document order.
    pub fn commands(&self) -> &[CommandHeading] {
        &self.commands
    }

    /// Parameter-name markers in document order.
    pub fn parameters(&self) -> &[ParameterMarker] {
        &self.parameters
    }

    /// Returns `true` if any element carries `id`.
    pub fn has_anchor(&self, id: &str) -> bool {
        self.anchors.contains(id)
    }

    /// Parameter markers strictly after `position`, in document order.
    pub fn parameters_after(&self, position: usize) -> impl Iterator<Item = &ParameterMarker> {
        let start = self
            .parameters
            .partition_point(|marker| marker.position <= position);
        self.parameters[start..].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <h1>az vm (Preview)</h1>
        <div class="summary">
            Manage virtual machines.
        </div>
        <h2 id="az-vm-create">az vm create</h2>
        <div class="badge">Preview</div>
        <p>Create a VM.</p>
        <h3 id="az-vm-create-required-parameters">Required Parameters</h3>
        <div class="parameterName">--name -n</div>
        <div class="parameterInfo"><p>Name of the VM.</p></div>
        <details><summary>Global Parameters</summary>
            <div class="parameterName">--debug</div>
            <div class="parameterInfo"><p>Debug.</p></div>
        </details>
        <h2 id="not-a-command">Feedback</h2>
        <h2 id="az-vm-list">az vm list</h2>
        <h3>Examples</h3>
        <div class="parameterName">--all</div>
        </body></html>
    "#;

    #[test]
    fn test_outline_records_title_summary_and_commands() {
        let outline = DocumentOutline::parse(PAGE, "az-");

        assert_eq!(outline.title(), Some("az vm (Preview)"));
        assert_eq!(outline.summary(), Some("Manage virtual machines."));

        let ids: Vec<&str> = outline.commands().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["az-vm-create", "az-vm-list"]);
        assert_eq!(
            outline.commands()[0].description.as_deref(),
            Some("Create a VM.")
        );
        assert_eq!(outline.commands()[1].description, None);
    }

    #[test]
    fn test_outline_resolves_marker_context() {
        let outline = DocumentOutline::parse(PAGE, "az-");
        let markers = outline.parameters();
        assert_eq!(markers.len(), 3);

        assert_eq!(markers[0].name, "--name -n");
        assert_eq!(markers[0].description.as_deref(), Some("Name of the VM."));
        assert_eq!(markers[0].owner.as_deref(), Some("az-vm-create"));
        assert_eq!(
            markers[0].section.as_deref(),
            Some("az-vm-create-required-parameters")
        );
        assert!(!markers[0].in_global_block);

        assert!(markers[1].in_global_block);

        assert_eq!(markers[2].owner.as_deref(), Some("az-vm-list"));
        assert_eq!(markers[2].section, None);
        assert_eq!(markers[2].description, None);
    }

    #[test]
    fn test_parameters_after_skips_earlier_markers() {
        let outline = DocumentOutline::parse(PAGE, "az-");
        let list_heading = &outline.commands()[1];

        let after: Vec<&str> = outline
            .parameters_after(list_heading.position)
            .map(|marker| marker.name.as_str())
            .collect();
        assert_eq!(after, vec!["--all"]);
        assert!(outline.has_anchor("az-vm-create"));
        assert!(!outline.has_anchor("az-vm-list-optional-parameters"));
    }
}
