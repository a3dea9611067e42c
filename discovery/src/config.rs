//! Discovery configuration.
//!
//! Defines the YAML-serializable settings that tell the pipeline where the
//! documentation lives and how its headings are named. Every field has a
//! default targeting the Azure CLI reference, so a config file only needs to
//! list what differs.
//!
//! # Example YAML
//!
//! ```yaml
//! tool_name: az
//! tool_description: Azure CLI
//! index_url: https://learn.microsoft.com/en-us/cli/azure/reference-index?view=azure-cli-latest
//! reference_base_url: https://learn.microsoft.com/en-us/cli/azure/
//! path_prefix_tokens: 2
//! no_arg_global_flags:
//!   - --debug
//!   - --help
//!   - --verbose
//! fail_fast: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reference index of the Azure CLI documentation.
pub const DEFAULT_INDEX_URL: &str =
    "https://learn.microsoft.com/en-us/cli/azure/reference-index?view=azure-cli-latest";

/// Base URL that relative index links are resolved against.
pub const DEFAULT_REFERENCE_BASE_URL: &str = "https://learn.microsoft.com/en-us/cli/azure/";

/// Global flags that never take a value, whatever their description says.
pub const DEFAULT_NO_ARG_GLOBAL_FLAGS: &[&str] = &["--debug", "--help", "--verbose"];

/// Settings for one discovery run.
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::config::DiscoveryConfig;
///
/// let config: DiscoveryConfig = serde_yaml::from_str("tool_name: mytool\n").unwrap();
/// assert_eq!(config.tool_name, "mytool");
/// assert_eq!(config.command_id_prefix(), "mytool-");
/// assert_eq!(config.path_prefix_tokens, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Invocation name of the documented tool; also the root node name.
    pub tool_name: String,
    /// Description attached to the root node.
    pub tool_description: String,
    /// Page holding the base command table and the global parameter block.
    pub index_url: String,
    /// Base URL for relative links in the index table.
    pub reference_base_url: String,
    /// Leading heading tokens that are not part of a trie path
    /// (tool name plus base command).
    pub path_prefix_tokens: usize,
    /// Persistent aliases that are always boolean flags.
    pub no_arg_global_flags: Vec<String>,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Abort the whole run on the first base command failure.
    pub fail_fast: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            tool_name: "az".to_string(),
            tool_description: "Azure CLI".to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            reference_base_url: DEFAULT_REFERENCE_BASE_URL.to_string(),
            path_prefix_tokens: 2,
            no_arg_global_flags: DEFAULT_NO_ARG_GLOBAL_FLAGS
                .iter()
                .map(|flag| flag.to_string())
                .collect(),
            user_agent: concat!("cmdtree/", env!("CARGO_PKG_VERSION")).to_string(),
            fail_fast: false,
        }
    }
}

impl DiscoveryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::DiscoveryError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::DiscoveryError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Id prefix of command headings (`az-` for `az vm create`).
    pub fn command_id_prefix(&self) -> String {
        format!("{}-", self.tool_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_azure_reference() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.tool_name, "az");
        assert_eq!(config.index_url, DEFAULT_INDEX_URL);
        assert_eq!(
            config.no_arg_global_flags,
            vec!["--debug", "--help", "--verbose"]
        );
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "fail_fast: true\npath_prefix_tokens: 3\n";
        let config: DiscoveryConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.fail_fast);
        assert_eq!(config.path_prefix_tokens, 3);
        assert_eq!(config.tool_description, "Azure CLI");
    }

    #[test]
    fn test_save_then_load_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdtree.yaml");

        let config = DiscoveryConfig {
            tool_name: "gh".to_string(),
            no_arg_global_flags: vec!["--help".to_string()],
            ..DiscoveryConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(DiscoveryConfig::load(&path).unwrap(), config);
    }
}
