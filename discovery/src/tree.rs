//! Path trie assembly and materialization.
//!
//! Pages arrive as flat records keyed by path segments. [`PathTrie`] folds
//! them into one nested structure per base command, and
//! [`PathTrie::materialize`] turns that structure into [`SubcommandSpec`]
//! nodes. Entries keep first-insertion order, which is the order children
//! appear in the final tree.

use cmdtree_core::SubcommandSpec;

use crate::error::{DiscoveryError, Result};
use crate::parser::PageRecord;

/// What a trie key maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieEntry {
    /// A group with its own children and description.
    Node(PathTrie),
    /// A finished command.
    Leaf(SubcommandSpec),
}

/// A value to place in the trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieValue {
    /// Description of the group at the path.
    Description(String),
    /// Command at the path; the last segment is its key.
    Leaf(SubcommandSpec),
}

/// Ordered trie of command groups and leaves.
///
/// # Examples
///
/// ```
/// use cmdtree_core::SubcommandSpec;
/// use cmdtree_discovery::tree::{PathTrie, TrieValue};
///
/// let path = |segments: &[&str]| segments.iter().map(|s| s.to_string()).collect::<Vec<_>>();
///
/// let mut trie = PathTrie::new();
/// trie.insert(&path(&["disk"]), TrieValue::Description("Manage disks.".into())).unwrap();
/// let attach = SubcommandSpec::new("attach", "Attach a disk.");
/// trie.insert(&path(&["disk", "attach"]), TrieValue::Leaf(attach)).unwrap();
///
/// let vm = trie.materialize_root("vm", "Manage VMs.");
/// let disk = vm.find_subcommand("disk").unwrap();
/// assert_eq!(disk.description, "Manage disks.");
/// assert_eq!(disk.subcommand_names(), vec!["attach"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTrie {
    description: Option<String>,
    entries: Vec<(String, TrieEntry)>,
}

impl PathTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing has been inserted below this node.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group description, if one was inserted.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&TrieEntry> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, entry)| entry)
    }

    /// Keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Places `value` at `path`, creating missing groups along the way.
    ///
    /// A description replaces any earlier one at the same path. A leaf is
    /// stored in the group at `path` minus its last segment and replaces an
    /// earlier leaf with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`PathConflict`](DiscoveryError::PathConflict) if the path
    /// runs through a leaf or a leaf would replace a group. The trie is left
    /// unchanged in that case.
    pub fn insert(&mut self, path: &[String], value: TrieValue) -> Result<()> {
        match value {
            TrieValue::Description(description) => {
                self.node_mut(path)?.description = Some(description);
            }
            TrieValue::Leaf(leaf) => {
                let Some((key, parent)) = path.split_last() else {
                    return Err(DiscoveryError::MalformedDocument(
                        "command record has an empty path".to_string(),
                    ));
                };
                // Missing segments are only created past the last existing
                // one, so a conflict is always found before anything is added.
                let node = self.node_mut(parent)?;
                match node.entries.iter_mut().find(|(candidate, _)| candidate == key) {
                    Some((_, TrieEntry::Node(_))) => {
                        return Err(DiscoveryError::PathConflict(path.join(" ")));
                    }
                    Some((_, entry)) => *entry = TrieEntry::Leaf(leaf),
                    None => node.entries.push((key.clone(), TrieEntry::Leaf(leaf))),
                }
            }
        }
        Ok(())
    }

    /// Folds one page: its group description first, then every command.
    /// Records that conflict are skipped and their errors returned.
    pub fn insert_page(&mut self, page: PageRecord) -> Vec<DiscoveryError> {
        let mut conflicts = Vec::new();
        if let Err(err) = self.insert(
            &page.group_path,
            TrieValue::Description(page.group_description),
        ) {
            conflicts.push(err);
        }
        for command in page.commands {
            let path = command.path.clone();
            if let Err(err) = self.insert(&path, TrieValue::Leaf(command.into_leaf())) {
                conflicts.push(err);
            }
        }
        conflicts
    }

    /// Materializes this node as a group named `name`.
    pub fn materialize(&self, name: &str) -> SubcommandSpec {
        SubcommandSpec {
            subcommands: self.materialize_children(),
            ..SubcommandSpec::new(name, self.description().unwrap_or_default())
        }
    }

    /// Materializes a base command's trie. The base command keeps its own
    /// index description; a description stored at the root is ignored.
    pub fn materialize_root(&self, name: &str, description: &str) -> SubcommandSpec {
        SubcommandSpec {
            subcommands: self.materialize_children(),
            ..SubcommandSpec::new(name, description)
        }
    }

    /// Materializes every entry in first-insertion order.
    pub fn materialize_children(&self) -> Vec<SubcommandSpec> {
        self.entries
            .iter()
            .map(|(key, entry)| match entry {
                TrieEntry::Node(child) => child.materialize(key),
                TrieEntry::Leaf(leaf) => leaf.clone(),
            })
            .collect()
    }

    fn node_mut(&mut self, path: &[String]) -> Result<&mut PathTrie> {
        let mut node = self;
        for (depth, segment) in path.iter().enumerate() {
            let index = match node.entries.iter().position(|(key, _)| key == segment) {
                Some(index) => index,
                None => {
                    node.entries
                        .push((segment.clone(), TrieEntry::Node(PathTrie::default())));
                    node.entries.len() - 1
                }
            };
            node = match &mut node.entries[index].1 {
                TrieEntry::Node(child) => child,
                TrieEntry::Leaf(_) => {
                    return Err(DiscoveryError::PathConflict(path[..=depth].join(" ")));
                }
            };
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use cmdtree_core::{ArgSpec, OptionSpec};

    use super::*;
    use crate::parser::CommandRecord;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn page_a() -> PageRecord {
        PageRecord {
            group_path: path(&["foo"]),
            group_description: "Foo things.".to_string(),
            commands: vec![CommandRecord {
                path: path(&["foo", "bar"]),
                description: "Bar it.".to_string(),
                options: Some(vec![OptionSpec::flag(&["--all"])]),
                args: None,
            }],
        }
    }

    fn page_b() -> PageRecord {
        PageRecord {
            group_path: path(&["foo"]),
            group_description: "Foo things.".to_string(),
            commands: vec![CommandRecord {
                path: path(&["foo", "baz"]),
                description: "Baz it.".to_string(),
                options: None,
                args: Some(vec![ArgSpec::optional("<target>")]),
            }],
        }
    }

    #[test]
    fn test_two_pages_fold_into_one_group() {
        let mut trie = PathTrie::new();
        assert!(trie.insert_page(page_a()).is_empty());
        assert!(trie.insert_page(page_b()).is_empty());

        let children = trie.materialize_children();
        assert_eq!(children.len(), 1);
        let foo = &children[0];
        assert_eq!(foo.name, "foo");
        assert_eq!(foo.description, "Foo things.");
        assert_eq!(foo.subcommand_names(), vec!["bar", "baz"]);

        let bar = &foo.subcommands[0];
        assert_eq!(bar.options.as_ref().map(Vec::len), Some(1));
        assert_eq!(bar.args, None);
        let baz = &foo.subcommands[1];
        assert_eq!(baz.options, None);
        assert_eq!(baz.args.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_materialize_is_repeatable() {
        let mut trie = PathTrie::new();
        trie.insert_page(page_a());
        trie.insert_page(page_b());
        assert_eq!(trie.materialize("vm"), trie.materialize("vm"));
    }

    #[test]
    fn test_group_without_description_materializes_empty() {
        let mut trie = PathTrie::new();
        let leaf = SubcommandSpec::new("attach", "Attach.");
        trie.insert(&path(&["disk", "attach"]), TrieValue::Leaf(leaf))
            .unwrap();

        let disk = trie.materialize("vm").subcommands.remove(0);
        assert_eq!(disk.name, "disk");
        assert_eq!(disk.description, "");
        assert!(disk.is_group());
    }

    #[test]
    fn test_description_is_last_write_wins() {
        let mut trie = PathTrie::new();
        let group = path(&["disk"]);
        trie.insert(&group, TrieValue::Description("First.".into())).unwrap();
        trie.insert(&group, TrieValue::Description("First.".into())).unwrap();
        trie.insert(&group, TrieValue::Description("Second.".into())).unwrap();

        let Some(TrieEntry::Node(disk)) = trie.get("disk") else {
            panic!("expected a group");
        };
        assert_eq!(disk.description(), Some("Second."));
    }

    #[test]
    fn test_root_keeps_index_description() {
        let mut trie = PathTrie::new();
        trie.insert(&[], TrieValue::Description("From the page.".into()))
            .unwrap();
        let vm = trie.materialize_root("vm", "From the index.");
        assert_eq!(vm.description, "From the index.");
        assert!(vm.subcommands.is_empty());
    }

    #[test]
    fn test_leaf_replaces_leaf() {
        let mut trie = PathTrie::new();
        let key = path(&["list"]);
        trie.insert(&key, TrieValue::Leaf(SubcommandSpec::new("list", "Old.")))
            .unwrap();
        trie.insert(&key, TrieValue::Leaf(SubcommandSpec::new("list", "New.")))
            .unwrap();

        assert_eq!(trie.keys().collect::<Vec<_>>(), vec!["list"]);
        assert_eq!(trie.materialize_children()[0].description, "New.");
    }

    #[test]
    fn test_conflicts_leave_trie_unchanged() {
        let mut trie = PathTrie::new();
        trie.insert(&path(&["disk", "attach"]), TrieValue::Leaf(SubcommandSpec::new("attach", "")))
            .unwrap();
        trie.insert(&path(&["list"]), TrieValue::Leaf(SubcommandSpec::new("list", "")))
            .unwrap();
        let before = trie.clone();

        let through_leaf = trie.insert(
            &path(&["list", "deep", "leaf"]),
            TrieValue::Leaf(SubcommandSpec::new("leaf", "")),
        );
        assert!(matches!(through_leaf, Err(DiscoveryError::PathConflict(p)) if p == "list"));

        let over_group = trie.insert(&path(&["disk"]), TrieValue::Leaf(SubcommandSpec::new("disk", "")));
        assert!(matches!(over_group, Err(DiscoveryError::PathConflict(p)) if p == "disk"));

        let description_under_leaf =
            trie.insert(&path(&["list", "sub"]), TrieValue::Description("x".into()));
        assert!(description_under_leaf.is_err());

        assert_eq!(trie, before);
    }

    #[test]
    fn test_empty_leaf_path_is_rejected() {
        let mut trie = PathTrie::new();
        let err = trie
            .insert(&[], TrieValue::Leaf(SubcommandSpec::new("", "")))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedDocument(_)));
        assert!(trie.is_empty());
    }
}
