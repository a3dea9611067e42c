//! Discovery orchestration and file workflows for command trees.
//!
//! [`Discoverer`] reads the index page, builds one subtree per base command
//! and attaches the global options to the root. Base commands are
//! independent units: their futures are polled together on the caller's
//! task and only suspend while a document is being fetched. Within one unit
//! the group pages are fetched together and folded into the trie one after
//! another, in the order the detail page lists them.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use cmdtree_core::{OptionSpec, SubcommandSpec, TreePackage, validate_package};
use futures::future::{join_all, try_join_all};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result, parse_url};
use crate::fetch::DocumentFetcher;
use crate::parser::index::{read_global_parameters, read_group_urls, read_index_rows};
use crate::parser::{BaseCommand, Parameter, PageReader, ParameterClassifier};
use crate::report::{BaseCommandReport, BaseCommandStatus, DiscoveryReport};
use crate::tree::PathTrie;

/// Aggregated output from a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    /// Package wrapping the finished tree.
    pub package: TreePackage,
    /// Per-base-command report.
    pub report: DiscoveryReport,
}

/// Drives one discovery run over a [`DocumentFetcher`].
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::config::DiscoveryConfig;
/// use cmdtree_discovery::discover::Discoverer;
/// use cmdtree_discovery::fetch::StaticFetcher;
///
/// let config = DiscoveryConfig {
///     index_url: "https://docs.example.test/cli/index".into(),
///     reference_base_url: "https://docs.example.test/cli/".into(),
///     ..DiscoveryConfig::default()
/// };
/// let index = r#"
///   <table><tbody>
///     <tr><td><a href="index#az-login">az login</a></td><td>Log in.</td></tr>
///   </tbody></table>
///   <h2 id="az-login">az login</h2>
///   <details>
///     <div class="parameterName">--debug</div><div class="parameterInfo">Debug.</div>
///   </details>
/// "#;
/// let fetcher = StaticFetcher::new().with_document("https://docs.example.test/cli/index", index);
///
/// let discoverer = Discoverer::new(config, fetcher).unwrap();
/// let outcome = futures::executor::block_on(discoverer.discover()).unwrap();
///
/// let root = &outcome.package.root;
/// assert_eq!(root.name, "az");
/// assert_eq!(root.subcommand_names(), vec!["az login"]);
/// assert!(root.options.as_ref().unwrap()[0].is_persistent);
/// ```
#[derive(Debug)]
pub struct Discoverer<F> {
    config: DiscoveryConfig,
    fetcher: F,
    reader: PageReader,
    classifier: ParameterClassifier,
    index_url: Url,
    reference_base: Url,
}

/// Completion counter shared by the unit futures of one run, all polled on
/// the same task.
struct Progress {
    completed: Cell<usize>,
    total: usize,
}

impl Progress {
    fn finish(&self, command: &str) -> usize {
        let completed = self.completed.get() + 1;
        self.completed.set(completed);
        info!(completed, total = self.total, command, "Finished base command");
        completed
    }
}

impl<F: DocumentFetcher> Discoverer<F> {
    /// Creates a discoverer for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrl`](DiscoveryError::InvalidUrl) if the index or
    /// reference base URL does not parse.
    pub fn new(config: DiscoveryConfig, fetcher: F) -> Result<Self> {
        let index_url = parse_url(&config.index_url)?;
        let reference_base = parse_url(&config.reference_base_url)?;
        Ok(Self {
            reader: PageReader::from_config(&config),
            classifier: ParameterClassifier::new(config.no_arg_global_flags.iter().cloned()),
            config,
            fetcher,
            index_url,
            reference_base,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Runs discovery and returns the finished tree with its report.
    ///
    /// # Errors
    ///
    /// Fails if the index page cannot be fetched or read, if the global
    /// parameter block is missing, or, with `fail_fast`, on the first base
    /// command that fails. Other base command failures are reported and the
    /// base command is left out of the tree.
    pub async fn discover(&self) -> Result<DiscoveryOutcome> {
        let index_html = self.fetcher.fetch(&self.index_url).await?;
        let base_commands: Vec<BaseCommand> =
            read_index_rows(&index_html, &self.reference_base, &self.index_url)?
                .into_iter()
                .map(BaseCommand::from)
                .collect();
        info!(
            url = %self.index_url,
            total = base_commands.len(),
            "Loaded base commands"
        );

        let progress = Progress {
            completed: Cell::new(0),
            total: base_commands.len(),
        };
        let progress = &progress;
        let units = base_commands.iter().map(|base| async move {
            let result = self.build_base_command(base).await;
            progress.finish(base.command());
            result
        });
        let results: Vec<Result<(SubcommandSpec, BaseCommandReport)>> = if self.config.fail_fast {
            try_join_all(units).await?.into_iter().map(Ok).collect()
        } else {
            join_all(units).await
        };

        let mut subcommands = Vec::with_capacity(base_commands.len());
        let mut reports = Vec::with_capacity(base_commands.len());
        for (base, result) in base_commands.iter().zip(results) {
            match result {
                Ok((node, report)) => {
                    subcommands.push(node);
                    reports.push(report);
                }
                Err(err) => {
                    warn!(command = base.command(), error = %err, "Omitting base command");
                    reports.push(BaseCommandReport::failed(base.command(), &err));
                }
            }
        }

        let options = self.global_options(&index_html)?;
        debug!(count = options.len(), "Read global options");

        let root = SubcommandSpec {
            subcommands,
            options: (!options.is_empty()).then_some(options),
            ..SubcommandSpec::new(&self.config.tool_name, &self.config.tool_description)
        };

        let generated_at = Utc::now().to_rfc3339();
        let mut package = TreePackage::new(root, generated_at.clone());
        package.source_url = Some(self.index_url.to_string());
        let report = DiscoveryReport::new(generated_at, self.index_url.as_str(), reports);

        info!(
            nodes = package.node_count(),
            failed = report.failures.len(),
            "Discovery finished"
        );
        Ok(DiscoveryOutcome { package, report })
    }

    async fn build_base_command(
        &self,
        base: &BaseCommand,
    ) -> Result<(SubcommandSpec, BaseCommandReport)> {
        let command = base.command();
        let Some(detail_url) = base.detail_url() else {
            debug!(command, "Index-only base command");
            return Ok((base.to_stub_node(), BaseCommandReport::stub(command)));
        };

        let detail_html = self.fetcher.fetch(detail_url).await?;
        let group_urls = read_group_urls(&detail_html, detail_url)?;
        debug!(command, pages = group_urls.len(), "Listed group pages");

        let documents = try_join_all(group_urls.iter().map(|url| self.fetcher.fetch(url))).await?;

        let mut report = BaseCommandReport {
            status: BaseCommandStatus::Extracted,
            ..BaseCommandReport::stub(command)
        };
        let mut trie = PathTrie::new();
        let mut last_error = None;

        for (url, html) in group_urls.iter().zip(documents) {
            let page = match self.reader.read_page(&html) {
                Ok(page) => page,
                Err(err) => {
                    warn!(command, %url, error = %err, "Skipping group page");
                    report.pages_skipped += 1;
                    report.warnings.push(format!("{url}: {err}"));
                    last_error = Some(err);
                    continue;
                }
            };
            report.pages_read += 1;
            for conflict in trie.insert_page(page) {
                warn!(command, %url, error = %conflict, "Skipping conflicting record");
                report.warnings.push(format!("{url}: {conflict}"));
            }
        }

        if let Some(err) = last_error.filter(|_| report.pages_read == 0) {
            return Err(err);
        }

        let node = trie.materialize_root(command, base.description());
        report.commands_extracted = count_commands(&node);
        Ok((node, report))
    }

    fn global_options(&self, index_html: &str) -> Result<Vec<OptionSpec>> {
        let options = read_global_parameters(index_html)?
            .iter()
            .filter_map(|raw| match self.classifier.classify(raw, true) {
                Some(Parameter::Option(option)) => Some(option),
                _ => {
                    trace!(name = %raw.name, "Dropping global parameter");
                    None
                }
            })
            .collect();
        Ok(options)
    }
}

/// Counts command nodes below `node`: every descendant without children.
fn count_commands(node: &SubcommandSpec) -> usize {
    node.subcommands
        .iter()
        .map(|sub| {
            if sub.subcommands.is_empty() {
                1
            } else {
                count_commands(sub)
            }
        })
        .sum()
}

/// Collects JSON tree package paths from input files and/or directories.
pub fn collect_package_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "No package paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                let is_json = path.extension() == Some(OsStr::new("json"));
                let is_report = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with("report.json"));
                if is_json && !is_report {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if input.extension() != Some(OsStr::new("json")) {
                return Err(DiscoveryError::InvalidInput(format!(
                    "Package file '{}' must end in .json",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(DiscoveryError::InvalidInput(format!(
            "Package path '{}' does not exist",
            input.display(),
        )));
    }

    if paths.is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "No package JSON files found in provided paths".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

/// Loads and validates tree packages from files.
pub fn load_and_validate_packages(paths: &[PathBuf]) -> Result<Vec<TreePackage>> {
    let mut packages = Vec::with_capacity(paths.len());

    for path in paths {
        let raw = fs::read_to_string(path)?;
        let package: TreePackage = serde_json::from_str(&raw)?;

        let errors = validate_package(&package);
        if let Some(first) = errors.first() {
            return Err(DiscoveryError::Validation(format!(
                "Package validation failed for '{}': {first}",
                path.display()
            )));
        }

        packages.push(package);
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use crate::report::FailureCode;

    const BASE: &str = "https://docs.example.test/cli/";
    const INDEX: &str = "https://docs.example.test/cli/index";

    fn config() -> DiscoveryConfig {
        DiscoveryConfig {
            index_url: INDEX.to_string(),
            reference_base_url: BASE.to_string(),
            ..DiscoveryConfig::default()
        }
    }

    fn index_page(rows: &[(&str, &str)]) -> String {
        let rows: String = rows
            .iter()
            .map(|(name, href)| {
                format!("<tr><td><a href=\"{href}\">{name}</a></td><td>{name} docs.</td></tr>")
            })
            .collect();
        format!(
            r#"<table><tbody>{rows}</tbody></table>
            <h2 id="global">Global Parameters</h2>
            <details>
              <div class="parameterName">--debug</div>
              <div class="parameterInfo"><p>Increase logging verbosity. Accepted values: x</p></div>
              <div class="parameterName">--subscription</div>
              <div class="parameterInfo"><p>Name or ID of subscription.</p></div>
            </details>"#
        )
    }

    fn detail_page(hrefs: &[&str]) -> String {
        let rows: String = hrefs
            .iter()
            .map(|href| format!("<tr><td><a href=\"{href}\">cmd</a></td><td>d</td></tr>"))
            .collect();
        format!("<table><tbody>{rows}</tbody></table>")
    }

    const GROUP_PAGE: &str = r#"
        <h1>az group</h1>
        <h2 id="az-group-list">az group list</h2><p>List groups.</p>
        <h3 id="az-group-list-optional-parameters">Optional Parameters</h3>
        <div class="parameterName">--tag</div><div class="parameterInfo">Tag filter.</div>
    "#;

    fn fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_document(
                INDEX,
                index_page(&[("az login", "index#az-login"), ("az group", "group"), ("az vm", "vm")]),
            )
            .with_document(
                "https://docs.example.test/cli/group",
                format!("{}{GROUP_PAGE}", detail_page(&["group#az-group-list"])),
            )
            .with_document("https://docs.example.test/cli/vm", detail_page(&["vm/missing"]))
    }

    #[test]
    fn test_progress_counts_finished_units() {
        let progress = Progress {
            completed: Cell::new(0),
            total: 2,
        };
        assert_eq!(progress.finish("az vm"), 1);
        assert_eq!(progress.finish("az login"), 2);
        assert_eq!(progress.completed.get(), progress.total);
    }

    #[tokio::test]
    async fn test_discover_isolates_failed_base_commands() {
        let discoverer = Discoverer::new(config(), fetcher()).unwrap();
        let outcome = discoverer.discover().await.unwrap();
        let root = &outcome.package.root;

        assert_eq!(root.name, "az");
        assert_eq!(root.description, "Azure CLI");
        assert_eq!(root.subcommand_names(), vec!["az login", "az group"]);

        let login = &root.subcommands[0];
        assert!(login.subcommands.is_empty());
        assert_eq!(login.options, None);
        assert_eq!(login.args, None);

        let group = &root.subcommands[1];
        assert_eq!(group.description, "az group docs.");
        assert_eq!(group.subcommand_names(), vec!["list"]);

        let report = &outcome.report;
        assert_eq!(report.failures, vec!["az vm"]);
        assert_eq!(report.base_commands[0].status, BaseCommandStatus::Stub);
        assert_eq!(report.base_commands[1].commands_extracted, 1);
        assert_eq!(
            report.base_commands[2].failure_code,
            Some(FailureCode::FetchFailed)
        );
        assert_eq!(outcome.package.source_url.as_deref(), Some(INDEX));
    }

    #[tokio::test]
    async fn test_discover_attaches_persistent_global_options() {
        let discoverer = Discoverer::new(config(), fetcher()).unwrap();
        let outcome = discoverer.discover().await.unwrap();
        let options = outcome.package.root.options.unwrap();

        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.is_persistent));
        assert_eq!(options[0].names, vec!["--debug"]);
        assert_eq!(options[0].args, None);
        assert_eq!(options[1].args.as_ref().unwrap().name, "subscription");
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_run() {
        let config = DiscoveryConfig {
            fail_fast: true,
            ..config()
        };
        let discoverer = Discoverer::new(config, fetcher()).unwrap();
        let err = discoverer.discover().await.unwrap_err();
        assert!(matches!(err, DiscoveryError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_index_is_fatal() {
        let discoverer = Discoverer::new(config(), StaticFetcher::new()).unwrap();
        assert!(discoverer.discover().await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_pages_are_skipped_unless_all_fail() {
        let fetcher = StaticFetcher::new()
            .with_document(INDEX, index_page(&[("az group", "group"), ("az vm", "vm")]))
            .with_document(
                "https://docs.example.test/cli/group",
                detail_page(&["group/list", "group/broken"]),
            )
            .with_document("https://docs.example.test/cli/group/list", GROUP_PAGE)
            .with_document("https://docs.example.test/cli/group/broken", "<p>no heading</p>")
            .with_document("https://docs.example.test/cli/vm", detail_page(&["vm/broken"]))
            .with_document("https://docs.example.test/cli/vm/broken", "<p>no heading</p>");

        let discoverer = Discoverer::new(config(), fetcher).unwrap();
        let outcome = discoverer.discover().await.unwrap();

        let group = &outcome.report.base_commands[0];
        assert_eq!(group.status, BaseCommandStatus::Extracted);
        assert_eq!(group.pages_read, 1);
        assert_eq!(group.pages_skipped, 1);
        assert_eq!(group.commands_extracted, 1);
        assert_eq!(group.warnings.len(), 1);

        let vm = &outcome.report.base_commands[1];
        assert_eq!(vm.status, BaseCommandStatus::Failed);
        assert_eq!(vm.failure_code, Some(FailureCode::MalformedDocument));
        assert_eq!(outcome.package.root.subcommand_names(), vec!["az group"]);
    }

    #[test]
    fn test_invalid_index_url_is_rejected() {
        let config = DiscoveryConfig {
            index_url: "not a url".to_string(),
            ..config()
        };
        let err = Discoverer::new(config, StaticFetcher::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidUrl { .. }));
    }

    #[test]
    fn test_count_commands_counts_childless_nodes() {
        let tree = SubcommandSpec::new("vm", "")
            .with_subcommand(
                SubcommandSpec::new("disk", "")
                    .with_subcommand(SubcommandSpec::new("attach", ""))
                    .with_subcommand(SubcommandSpec::new("detach", "")),
            )
            .with_subcommand(SubcommandSpec::new("list", ""));
        assert_eq!(count_commands(&tree), 3);
    }

    #[test]
    fn test_collect_package_paths_from_dir_filters_non_json() {
        let dir = tempfile::tempdir().unwrap();
        let tree_path = dir.path().join("az.json");
        fs::write(&tree_path, "{}").unwrap();
        fs::write(dir.path().join("discovery-report.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore").unwrap();

        let paths = collect_package_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(paths, vec![tree_path]);
    }

    #[test]
    fn test_collect_package_paths_rejects_missing_and_empty() {
        assert!(collect_package_paths(&[]).is_err());
        let missing = PathBuf::from("/definitely/not/here.json");
        assert!(matches!(
            collect_package_paths(&[missing]),
            Err(DiscoveryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_and_validate_packages_rejects_invalid_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = SubcommandSpec::new("az", "Azure CLI")
            .with_subcommand(SubcommandSpec::new("vm", ""))
            .with_subcommand(SubcommandSpec::new("vm", ""));
        let package = TreePackage::new(root, "2026-01-01T00:00:00Z");
        let path = dir.path().join("az.json");
        fs::write(&path, serde_json::to_string(&package).unwrap()).unwrap();

        let err = load_and_validate_packages(&[path]).unwrap_err();
        assert!(matches!(err, DiscoveryError::Validation(_)));
    }

    #[test]
    fn test_load_and_validate_packages_accepts_valid_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = SubcommandSpec::new("az", "Azure CLI")
            .with_subcommand(SubcommandSpec::new("login", "Log in."));
        let package = TreePackage::new(root, "2026-01-01T00:00:00Z");
        let path = dir.path().join("az.json");
        fs::write(&path, serde_json::to_string(&package).unwrap()).unwrap();

        let loaded = load_and_validate_packages(&[path]).unwrap();
        assert_eq!(loaded, vec![package]);
    }
}
