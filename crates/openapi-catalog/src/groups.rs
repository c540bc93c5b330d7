//! Tag index for browsing operations

use crate::parser::Specification;
use crate::types::{HttpMethod, OperationDefinition};
use std::collections::BTreeMap;
use std::sync::Arc;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Tag used for operations that declare no tags
pub const UNTAGGED: &str = "untagged";

/// Operations grouped by tag.
///
/// An operation with several tags is a member of every one of their groups.
/// Tags iterate in lexical order; members of a group are ordered by display
/// summary in case-insensitive collation order, with ties kept in discovery
/// order.
#[derive(Debug, Clone, Default)]
pub struct OperationGroups {
    groups: BTreeMap<String, Vec<Arc<OperationDefinition>>>,
}

impl OperationGroups {
    /// Build the tag index of a specification
    pub fn build(spec: &Specification) -> Self {
        let mut groups: BTreeMap<String, Vec<Arc<OperationDefinition>>> = BTreeMap::new();

        for op in spec.operations() {
            let op = Arc::new(op.clone());
            for tag in &op.tags {
                groups.entry(tag.clone()).or_default().push(op.clone());
            }
        }

        // sort_by_cached_key is stable, equal summaries keep discovery order
        for members in groups.values_mut() {
            members.sort_by_cached_key(|op| collation_key(&op.summary));
        }

        Self { groups }
    }

    /// Tag names in lexical order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// The tag a browser expands initially
    pub fn first_tag(&self) -> Option<&str> {
        self.tags().next()
    }

    /// Members of a tag group
    pub fn get(&self, tag: &str) -> Option<&[Arc<OperationDefinition>]> {
        self.groups.get(tag).map(Vec::as_slice)
    }

    /// Iterate over (tag, members)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<OperationDefinition>])> {
        self.groups
            .iter()
            .map(|(tag, members)| (tag.as_str(), members.as_slice()))
    }

    /// Find an operation by identity in any group
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<Arc<OperationDefinition>> {
        self.groups
            .values()
            .flatten()
            .find(|op| op.matches(method, path))
            .cloned()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Primary weight class: punctuation and symbols, then digits, then letters
fn weight_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

/// Collation key for display summaries, compared at secondary strength.
///
/// The primary level ignores accents and case; the decomposed lower-cased
/// text then breaks ties between accented and plain spellings.
fn collation_key(summary: &str) -> (Vec<(u8, char)>, Vec<char>) {
    let folded: Vec<char> = summary.nfd().flat_map(char::to_lowercase).collect();
    let primary = folded
        .iter()
        .copied()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| (weight_class(c), c))
        .collect();
    (primary, folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summaries(groups: &OperationGroups, tag: &str) -> Vec<String> {
        groups
            .get(tag)
            .unwrap()
            .iter()
            .map(|op| op.summary.clone())
            .collect()
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let spec = Specification::from_value(&json!({
            "paths": {
                "/users": {
                    "get": {"summary": "list users", "tags": ["users"]},
                    "post": {"summary": "Create user", "tags": ["users"]}
                },
                "/users/{id}": {
                    "delete": {"summary": "delete user", "tags": ["users"]}
                }
            }
        }));

        let groups = OperationGroups::build(&spec);
        assert_eq!(
            summaries(&groups, "users"),
            ["Create user", "delete user", "list users"]
        );
    }

    #[test]
    fn test_sorted_in_collation_order() {
        let spec = Specification::from_value(&json!({
            "paths": {
                "/z": {"get": {"summary": "zebra", "tags": ["t"]}},
                "/e": {"get": {"summary": "Éclair", "tags": ["t"]}},
                "/a": {"get": {"summary": "apple", "tags": ["t"]}},
                "/b": {"get": {"summary": "~beta", "tags": ["t"]}},
                "/n": {"get": {"summary": "2 numbers", "tags": ["t"]}}
            }
        }));

        let groups = OperationGroups::build(&spec);
        assert_eq!(
            summaries(&groups, "t"),
            ["~beta", "2 numbers", "apple", "Éclair", "zebra"]
        );
    }

    #[test]
    fn test_accents_break_ties_but_case_does_not() {
        let spec = Specification::from_value(&json!({
            "paths": {
                "/1": {"get": {"summary": "résumé"}},
                "/2": {"get": {"summary": "Resume"}},
                "/3": {"get": {"summary": "resume"}},
                "/4": {"get": {"summary": "Ökonomie"}},
                "/5": {"get": {"summary": "offers"}}
            }
        }));

        let groups = OperationGroups::build(&spec);
        assert_eq!(
            summaries(&groups, UNTAGGED),
            ["offers", "Ökonomie", "Resume", "resume", "résumé"]
        );
    }

    #[test]
    fn test_multi_tag_fan_out() {
        let spec = Specification::from_value(&json!({
            "paths": {
                "/a": {"get": {"summary": "both", "tags": ["a", "b"]}},
                "/b": {"get": {"summary": "none"}}
            }
        }));

        let groups = OperationGroups::build(&spec);
        let tags: Vec<&str> = groups.tags().collect();
        assert_eq!(tags, ["a", "b", UNTAGGED]);

        assert_eq!(summaries(&groups, "a"), ["both"]);
        assert_eq!(summaries(&groups, "b"), ["both"]);
        assert_eq!(summaries(&groups, UNTAGGED), ["none"]);
        assert_eq!(groups.first_tag(), Some("a"));
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let spec = Specification::from_value(&json!({
            "paths": {
                "/first": {"get": {"summary": "Ping"}},
                "/second": {"get": {"summary": "ping"}},
                "/third": {"get": {"summary": "PING"}}
            }
        }));

        let groups = OperationGroups::build(&spec);
        let paths: Vec<&str> = groups
            .get(UNTAGGED)
            .unwrap()
            .iter()
            .map(|op| op.path.as_str())
            .collect();
        assert_eq!(paths, ["/first", "/second", "/third"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let doc = json!({
            "paths": {
                "/z": {"get": {"summary": "Zed", "tags": ["x", "y"]}},
                "/y": {"post": {"operationId": "alpha", "tags": ["y"]}},
                "/x": {"put": {"tags": ["x"]}}
            }
        });

        let first = OperationGroups::build(&Specification::from_value(&doc));
        let second = OperationGroups::build(&Specification::from_value(&doc));

        let flatten = |g: &OperationGroups| -> Vec<(String, Vec<String>)> {
            g.iter()
                .map(|(tag, ops)| {
                    (
                        tag.to_string(),
                        ops.iter().map(|op| format!("{} {}", op.method, op.path)).collect(),
                    )
                })
                .collect()
        };
        assert_eq!(flatten(&first), flatten(&second));
        assert_eq!(summaries(&first, "x"), ["PUT /x", "Zed"]);
    }

    #[test]
    fn test_find_and_empty_catalog() {
        let spec = Specification::from_value(&json!({
            "paths": {"/a": {"get": {"tags": ["one", "two"]}}}
        }));
        let groups = OperationGroups::build(&spec);

        let op = groups.find(HttpMethod::Get, "/a").unwrap();
        assert_eq!(op.summary, "GET /a");
        assert!(groups.find(HttpMethod::Post, "/a").is_none());

        let empty = OperationGroups::build(&Specification::from_value(&json!({})));
        assert!(empty.is_empty());
        assert_eq!(empty.first_tag(), None);
    }
}
