//! Command tree discovery from reference documentation.
//!
//! This crate reads a CLI tool's published reference pages and assembles a
//! [`SubcommandSpec`] tree of its command groups, commands, options and
//! positional arguments. The pages carry no nesting markup: hierarchy comes
//! from multi-token headings (`az vm disk attach`), and parameters belong to
//! whichever command heading precedes them.
//!
//! # Main entry points
//!
//! - [`parser::PageReader::read_page`]: read one already-fetched group page
//!   into flat command records, without any network access.
//! - [`tree::PathTrie`]: fold records from many pages into one subtree.
//! - [`discover::Discoverer`]: run the whole pipeline over a
//!   [`fetch::DocumentFetcher`].
//! - [`discover_command_tree`]: the same, fetching over HTTP.
//!
//! # Example
//!
//! ```
//! use cmdtree_discovery::parser::PageReader;
//! use cmdtree_discovery::config::DiscoveryConfig;
//!
//! let html = r#"
//!   <h1>az vm disk</h1>
//!   <div class="summary">Manage VM disks.</div>
//!   <h2 id="az-vm-disk-attach">az vm disk attach</h2>
//!   <p>Attach a disk.</p>
//!   <h3 id="az-vm-disk-attach-required-parameters">Required Parameters</h3>
//!   <div class="parameterName">--vm-name</div>
//!   <div class="parameterInfo">The name of the VM.</div>
//! "#;
//!
//! let reader = PageReader::from_config(&DiscoveryConfig::default());
//! let page = reader.read_page(html).unwrap();
//!
//! assert_eq!(page.group_path, vec!["disk"]);
//! assert_eq!(page.commands[0].path, vec!["disk", "attach"]);
//! let options = page.commands[0].options.as_ref().unwrap();
//! assert_eq!(options[0].names, vec!["--vm-name"]);
//! ```
//!
//! [`SubcommandSpec`]: cmdtree_core::SubcommandSpec

pub mod config;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod report;
pub mod tree;

pub use error::{DiscoveryError, Result};

use config::DiscoveryConfig;
use discover::{DiscoveryOutcome, Discoverer};
use fetch::HttpFetcher;

/// Discovers the command tree described by `config`, fetching pages over
/// HTTP.
///
/// # Errors
///
/// See [`Discoverer::discover`].
pub async fn discover_command_tree(config: DiscoveryConfig) -> Result<DiscoveryOutcome> {
    let fetcher = HttpFetcher::new(&config.user_agent)?;
    Discoverer::new(config, fetcher)?.discover().await
}
