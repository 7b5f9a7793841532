use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{Entry, EntryId};

/// Tag token to the ids of the entries carrying it, in first-seen order
pub type TagDict = IndexMap<String, Vec<EntryId>>;

/// Turns a tag string as typed by a user into tokens
///
/// Both whitespace and commas separate tokens, empty tokens are dropped.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Turns tokens back into an editable tag string
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_tag_dict(entries: &[Entry]) -> TagDict {
    let mut res = TagDict::new();
    for e in entries {
        let mut seen = HashSet::new();
        for tag in e.tags.iter().filter(|t| seen.insert(t.as_str())) {
            res.entry(tag.clone()).or_insert_with(Vec::new).push(e.id.clone());
        }
    }
    res
}
