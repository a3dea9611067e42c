//! Structured per-run reporting for command tree discovery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Structured failure code for a base command that produced no subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// A document of the base command could not be fetched.
    FetchFailed,
    /// The documents broke the page convention.
    MalformedDocument,
    /// Records of the base command could not be placed in one tree.
    PathConflict,
}

impl FailureCode {
    /// Failure code for an error raised while building one base command.
    pub fn for_error(err: &DiscoveryError) -> Self {
        match err {
            DiscoveryError::Fetch { .. }
            | DiscoveryError::HttpClient(_)
            | DiscoveryError::HttpStatus { .. }
            | DiscoveryError::DocumentNotFound(_) => Self::FetchFailed,
            DiscoveryError::PathConflict(_) => Self::PathConflict,
            _ => Self::MalformedDocument,
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed => write!(f, "fetch_failed"),
            Self::MalformedDocument => write!(f, "malformed_document"),
            Self::PathConflict => write!(f, "path_conflict"),
        }
    }
}

/// How a base command ended up in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseCommandStatus {
    /// Index-only entry, emitted as a bare node.
    Stub,
    /// Subtree built from its group pages.
    Extracted,
    /// Omitted from the tree.
    Failed,
}

/// Per-base-command report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCommandReport {
    pub command: String,
    pub status: BaseCommandStatus,
    /// Group pages read successfully.
    pub pages_read: usize,
    /// Group pages skipped because they broke the page convention.
    pub pages_skipped: usize,
    /// Leaf commands placed in the subtree.
    pub commands_extracted: usize,
    /// Structured failure code when the base command failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<FailureCode>,
    /// Human-readable detail about the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BaseCommandReport {
    /// Report for an index-only base command.
    pub fn stub(command: &str) -> Self {
        Self {
            command: command.to_string(),
            status: BaseCommandStatus::Stub,
            pages_read: 0,
            pages_skipped: 0,
            commands_extracted: 0,
            failure_code: None,
            failure_detail: None,
            warnings: Vec::new(),
        }
    }

    /// Report for a base command whose subtree could not be built.
    pub fn failed(command: &str, err: &DiscoveryError) -> Self {
        Self {
            status: BaseCommandStatus::Failed,
            failure_code: Some(FailureCode::for_error(err)),
            failure_detail: Some(err.to_string()),
            ..Self::stub(command)
        }
    }
}

/// Report for one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub generated_at: String,
    pub index_url: String,
    /// One entry per base command, in index order.
    pub base_commands: Vec<BaseCommandReport>,
    /// Base commands omitted from the tree.
    pub failures: Vec<String>,
}

impl DiscoveryReport {
    /// Builds a report, collecting failed base commands from `base_commands`.
    pub fn new(
        generated_at: impl Into<String>,
        index_url: impl Into<String>,
        base_commands: Vec<BaseCommandReport>,
    ) -> Self {
        let failures = base_commands
            .iter()
            .filter(|report| report.status == BaseCommandStatus::Failed)
            .map(|report| report.command.clone())
            .collect();
        Self {
            generated_at: generated_at.into(),
            index_url: index_url.into(),
            base_commands,
            failures,
        }
    }

    /// Number of base commands with `status`.
    pub fn count(&self, status: BaseCommandStatus) -> usize {
        self.base_commands
            .iter()
            .filter(|report| report.status == status)
            .count()
    }

    /// Failure code distribution, ordered by code name.
    pub fn failure_code_summary(&self) -> Vec<(FailureCode, usize)> {
        let mut counts: BTreeMap<String, (FailureCode, usize)> = BTreeMap::new();
        for code in self.base_commands.iter().filter_map(|r| r.failure_code) {
            counts
                .entry(code.to_string())
                .and_modify(|(_, count)| *count += 1)
                .or_insert((code, 1));
        }
        counts.into_values().collect()
    }
}
