/// Tree filtering by file name.
///
/// A [`SearchQuery`] holds an optional substring test and an optional regex
/// test. [`filter_tree`] keeps every file that passes both, plus the
/// directories needed to reach it, in a fresh tree. The input is never
/// modified.
use crate::error::SearchError;
use crate::model::{FileTree, NodeIndex};
use regex::Regex;

/// A compiled name query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    contains: Option<String>,
    regex: Option<Regex>,
    case_insensitive: bool,
    invert: bool,
}

impl SearchQuery {
    /// Build a query. Empty strings count as "no test".
    ///
    /// With `case_insensitive`, the substring test compares lowercased text
    /// and the regex is compiled with the `(?i)` flag. With `invert`, each
    /// test's outcome is flipped before the two are combined.
    pub fn new(
        contains: Option<&str>,
        regex: Option<&str>,
        case_insensitive: bool,
        invert: bool,
    ) -> Result<Self, SearchError> {
        let contains = contains
            .filter(|s| !s.is_empty())
            .map(|s| if case_insensitive { s.to_lowercase() } else { s.to_string() });

        let regex = match regex.filter(|s| !s.is_empty()) {
            None => None,
            Some(pattern) => {
                let source = if case_insensitive {
                    format!("(?i){pattern}")
                } else {
                    pattern.to_string()
                };
                let compiled = Regex::new(&source).map_err(|source| SearchError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })?;
                Some(compiled)
            }
        };

        Ok(Self {
            contains,
            regex,
            case_insensitive,
            invert,
        })
    }

    /// Substring-only query.
    pub fn containing(text: &str, case_insensitive: bool, invert: bool) -> Self {
        Self {
            contains: Some(text)
                .filter(|s| !s.is_empty())
                .map(|s| if case_insensitive { s.to_lowercase() } else { s.to_string() }),
            regex: None,
            case_insensitive,
            invert,
        }
    }

    /// `true` when neither test is set; filtering then returns a plain clone.
    pub fn is_noop(&self) -> bool {
        self.contains.is_none() && self.regex.is_none()
    }

    /// Both tests, each XOR `invert`, combined with AND.
    pub fn matches_name(&self, name: &str) -> bool {
        self.check_contains(name) && self.check_regex(name)
    }

    fn check_contains(&self, name: &str) -> bool {
        let Some(needle) = &self.contains else {
            return true;
        };
        let found = if self.case_insensitive {
            name.to_lowercase().contains(needle.as_str())
        } else {
            name.contains(needle.as_str())
        };
        found != self.invert
    }

    fn check_regex(&self, name: &str) -> bool {
        let Some(re) = &self.regex else {
            return true;
        };
        let found = if self.case_insensitive {
            re.is_match(&name.to_lowercase())
        } else {
            re.is_match(name)
        };
        found != self.invert
    }
}

/// Produce a filtered copy of `tree`.
///
/// Files are weighted 1 when they match, directories sum their children, and
/// every zero-weight subtree is pruned. The root always survives, even with
/// nothing left under it.
pub fn filter_tree(tree: &FileTree, query: &SearchQuery) -> FileTree {
    filter_tree_mapped(tree, query).0
}

/// [`filter_tree`] plus, for each node of the result, its index in `tree`.
pub(crate) fn filter_tree_mapped(tree: &FileTree, query: &SearchQuery) -> (FileTree, Vec<NodeIndex>) {
    if query.is_noop() {
        return tree.extract_mapped(|_, _| true);
    }

    // Detached slots are never visited and keep weight 0.
    let weights = compute_weights(tree, query);
    tree.extract_mapped(|idx, _| weights[idx.idx()] > 0)
}

/// Post-order weights, indexed by arena slot.
fn compute_weights(tree: &FileTree, query: &SearchQuery) -> Vec<u32> {
    let order: Vec<NodeIndex> = tree.descendants(tree.root()).map(|(idx, _)| idx).collect();
    let mut weights = vec![0u32; tree.len()];

    // Reverse pre-order visits every child before its parent.
    for &idx in order.iter().rev() {
        let node = tree.node(idx);
        weights[idx.idx()] = if node.is_dir {
            node.children.iter().map(|c| weights[c.idx()]).sum()
        } else {
            u32::from(query.matches_name(&node.name))
        };
    }
    weights
}
