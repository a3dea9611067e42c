//! Command-group page reader.
//!
//! One page documents one command group and every command in it. The page
//! yields a [`PageRecord`]: the group's own path and summary, and one flat
//! [`CommandRecord`] per command heading.

use cmdtree_core::{ArgSpec, OptionSpec, SubcommandSpec};
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::classify::{ParameterClassifier, to_arg};
use super::outline::{CommandHeading, DocumentOutline};
use super::scan::{ParameterSection, extract_parameters};
use super::{RawParameter, command_path};
use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};

/// One command read from a page, before it is placed in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// Path below the base command (`["disk", "attach"]`).
    pub path: Vec<String>,
    /// Text of the paragraph after the heading, empty when absent.
    pub description: String,
    /// Options, optional section first; `None` when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionSpec>>,
    /// Positional arguments; `None` when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<ArgSpec>>,
}

impl CommandRecord {
    /// Last path segment, the name of the leaf node.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Path of the group that contains this command.
    pub fn parent_path(&self) -> &[String] {
        self.path.split_last().map(|(_, parent)| parent).unwrap_or_default()
    }

    /// Converts the record into a leaf node named after its last segment.
    pub fn into_leaf(self) -> SubcommandSpec {
        let name = self.name().to_string();
        SubcommandSpec::leaf(&name, &self.description, self.options, self.args)
    }
}

/// Everything one group page contributes to a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// Path of the group the page documents; empty for the base command page.
    pub group_path: Vec<String>,
    /// Group summary, empty when the page has none.
    pub group_description: String,
    /// Commands in heading order.
    pub commands: Vec<CommandRecord>,
}

/// Reads group pages following the `<tool>-<dash-joined-path>` heading
/// convention.
#[derive(Debug, Clone)]
pub struct PageReader {
    command_id_prefix: String,
    path_prefix_tokens: usize,
    classifier: ParameterClassifier,
}

impl PageReader {
    pub fn new(
        command_id_prefix: impl Into<String>,
        path_prefix_tokens: usize,
        classifier: ParameterClassifier,
    ) -> Self {
        Self {
            command_id_prefix: command_id_prefix.into(),
            path_prefix_tokens,
            classifier,
        }
    }

    /// Creates a reader using the heading convention and global flags of
    /// `config`.
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.command_id_prefix(),
            config.path_prefix_tokens,
            ParameterClassifier::new(config.no_arg_global_flags.iter().cloned()),
        )
    }

    /// Id prefix that marks command headings.
    pub fn command_id_prefix(&self) -> &str {
        &self.command_id_prefix
    }

    /// Reads one page.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedDocument`](DiscoveryError::MalformedDocument) if
    /// the page has no `h1` heading.
    pub fn read_page(&self, html: &str) -> Result<PageRecord> {
        let outline = DocumentOutline::parse(html, &self.command_id_prefix);
        self.read_outline(&outline)
    }

    /// Reads a page that has already been outlined.
    pub fn read_outline(&self, outline: &DocumentOutline) -> Result<PageRecord> {
        let title = outline.title().ok_or_else(|| {
            DiscoveryError::MalformedDocument("page has no h1 heading".to_string())
        })?;

        let group_path = command_path(title, self.path_prefix_tokens);
        let commands: Vec<CommandRecord> = outline
            .commands()
            .iter()
            .filter_map(|heading| self.read_command(outline, heading))
            .collect();

        debug!(
            group = %group_path.join(" "),
            commands = commands.len(),
            "Read group page"
        );

        Ok(PageRecord {
            group_path,
            group_description: outline.summary().unwrap_or_default().to_string(),
            commands,
        })
    }

    fn read_command(
        &self,
        outline: &DocumentOutline,
        heading: &CommandHeading,
    ) -> Option<CommandRecord> {
        let path = command_path(&heading.text, self.path_prefix_tokens);
        if path.is_empty() {
            warn!(
                id = %heading.id,
                heading = %heading.text.trim(),
                "Skipping command heading without path"
            );
            return None;
        }

        let mut raw = extract_parameters(outline, heading, ParameterSection::Optional);
        raw.extend(extract_parameters(outline, heading, ParameterSection::Required));

        let options: Vec<OptionSpec> = raw
            .iter()
            .filter(|param| param.is_option())
            .map(|param| self.classifier.to_option(param, false))
            .collect();
        let args: Vec<ArgSpec> = raw
            .iter()
            .filter(|param| param.is_arg())
            .map(to_arg)
            .collect();
        log_dropped(heading, &raw);

        Some(CommandRecord {
            path,
            description: heading.description.clone().unwrap_or_default(),
            options: (!options.is_empty()).then_some(options),
            args: (!args.is_empty()).then_some(args),
        })
    }
}

fn log_dropped(heading: &CommandHeading, raw: &[RawParameter]) {
    for param in raw.iter().filter(|p| !p.is_option() && !p.is_arg()) {
        trace!(command = %heading.id, name = %param.name, "Dropping unclassified parameter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> PageReader {
        PageReader::from_config(&DiscoveryConfig::default())
    }

    const DISK_PAGE: &str = r#"
        <html><body>
        <h1>az vm disk (Preview)</h1>
        <div class="summary">Manage the managed data disks attached to a VM.</div>

        <h2 id="az-vm-disk-attach">az vm disk attach</h2>
        <p>Attach a managed persistent disk to a VM.</p>
        <h3 id="az-vm-disk-attach-optional-parameters">Optional Parameters</h3>
        <div class="parameterName">--caching</div>
        <div class="parameterInfo"><p>Disk caching policy.</p>
            <p>Accepted values: None, ReadOnly, ReadWrite</p></div>
        <div class="parameterName">--new</div>
        <div class="parameterInfo"><p>Create a new disk.</p><p>Default value: False</p></div>
        <div class="parameterName">&lt;disk-name&gt;</div>
        <div class="parameterInfo"><p>Name of the disk.</p></div>
        <div class="parameterName">unclassified</div>
        <div class="parameterInfo"><p>Neither option nor arg.</p></div>

        <h2 id="az-vm-disk-detach">az vm disk detach (Experimental)</h2>
        <p>Detach a managed disk from a VM.</p>

        <details><summary>Global Parameters</summary>
            <div class="parameterName">--debug</div>
            <div class="parameterInfo"><p>Increase logging verbosity.</p></div>
        </details>
        </body></html>
    "#;

    #[test]
    fn test_read_page_group_path_and_summary() {
        let page = reader().read_page(DISK_PAGE).unwrap();
        assert_eq!(page.group_path, vec!["disk"]);
        assert_eq!(
            page.group_description,
            "Manage the managed data disks attached to a VM."
        );
    }

    #[test]
    fn test_read_page_classifies_optional_parameters() {
        let page = reader().read_page(DISK_PAGE).unwrap();
        let attach = &page.commands[0];
        assert_eq!(attach.path, vec!["disk", "attach"]);
        assert_eq!(attach.description, "Attach a managed persistent disk to a VM.");

        let options = attach.options.as_ref().unwrap();
        let names: Vec<&str> = options.iter().map(|o| o.names[0].as_str()).collect();
        assert_eq!(names, vec!["--caching", "--new"]);

        let caching = options[0].args.as_ref().unwrap();
        assert_eq!(
            caching.suggestions,
            Some(vec!["None".to_string(), "ReadOnly".to_string(), "ReadWrite".to_string()])
        );
        assert_eq!(options[1].args, None);
        assert!(options.iter().all(|o| !o.is_persistent));

        let args = attach.args.as_ref().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "<disk-name>");
        assert!(args[0].is_optional);
    }

    #[test]
    fn test_read_page_reads_first_section_after_heading() {
        let html = r#"
            <h1>az vm</h1>
            <h2 id="az-vm-create">az vm create</h2><p>Create a VM.</p>
            <h3 id="az-vm-create-required-parameters">Required Parameters</h3>
            <div class="parameterName">--name -n</div>
            <div class="parameterInfo"><p>Name of the VM.</p></div>
            <h3 id="az-vm-create-optional-parameters">Optional Parameters</h3>
            <div class="parameterName">--size</div>
            <div class="parameterInfo"><p>The VM size.</p></div>
            <div class="parameterName">&lt;image&gt;</div>
            <div class="parameterInfo"><p>Image to boot.</p></div>
        "#;
        let page = reader().read_page(html).unwrap();
        let create = &page.commands[0];
        let options = create.options.as_ref().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].names, vec!["--name", "-n"]);
        assert_eq!(create.args, None);
    }

    #[test]
    fn test_read_page_command_without_parameters() {
        let page = reader().read_page(DISK_PAGE).unwrap();
        let detach = &page.commands[1];
        assert_eq!(detach.path, vec!["disk", "detach"]);
        assert_eq!(detach.options, None);
        assert_eq!(detach.args, None);

        let leaf = detach.clone().into_leaf();
        assert_eq!(leaf.name, "detach");
        assert!(leaf.is_stub());
    }

    #[test]
    fn test_read_page_base_command_page() {
        let html = r#"
            <h1>az vm</h1>
            <h2 id="az-vm">az vm</h2><p>The base command itself.</p>
            <h2 id="az-vm-list">az vm list</h2><p>List VMs.</p>
        "#;
        let page = reader().read_page(html).unwrap();
        assert!(page.group_path.is_empty());
        assert_eq!(page.group_description, "");
        assert_eq!(page.commands.len(), 1);
        assert_eq!(page.commands[0].name(), "list");
        assert!(page.commands[0].parent_path().is_empty());
    }

    #[test]
    fn test_read_page_without_title_is_malformed() {
        let err = reader().read_page("<p>nothing here</p>").unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedDocument(_)));
    }

    #[test]
    fn test_read_page_respects_custom_prefix() {
        let html = r#"
            <h1>tool group</h1>
            <h2 id="tool-group-run">tool group run</h2><p>Run.</p>
            <h2 id="az-group-ignored">az group ignored</h2><p>Not ours.</p>
        "#;
        let reader = PageReader::new("tool-", 2, ParameterClassifier::default());
        let page = reader.read_page(html).unwrap();
        assert_eq!(page.commands.len(), 1);
        assert_eq!(page.commands[0].path, vec!["run"]);
    }
}
