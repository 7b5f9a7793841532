use std::{collections::HashSet, sync::Arc};

use crate::{
    api::{Entry, EntryId, TagDict},
    EntryStore,
};

/// Tag to entries mapping, exactly as computed by the service
///
/// This is never derived from `Entry::tags` locally: it is only ever loaded
/// together with the `EntryStore` from the same snapshot.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagIndex {
    tags: TagDict,
}

impl TagIndex {
    pub fn new() -> TagIndex {
        TagIndex::default()
    }

    pub fn load(&mut self, mut tags: TagDict) {
        for ids in tags.values_mut() {
            let mut seen = HashSet::new();
            ids.retain(|id| seen.insert(id.clone()));
        }
        self.tags = tags;
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.count(tag) > 0
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags.get(tag).map(|ids| ids.len()).unwrap_or(0)
    }

    pub fn ids_for(&self, tag: &str) -> &[EntryId] {
        self.tags.get(tag).map(|ids| &ids[..]).unwrap_or(&[])
    }

    /// All known tags with the number of entries carrying them
    pub fn tags(&self) -> Vec<(&str, usize)> {
        self.tags
            .iter()
            .map(|(tag, ids)| (tag.as_str(), ids.len()))
            .collect()
    }

    /// Entries carrying `tag`, in the order of `store`
    pub fn entries_for(&self, tag: &str, store: &EntryStore) -> Vec<Arc<Entry>> {
        let ids = self.ids_for(tag).iter().collect::<HashSet<_>>();
        if ids.is_empty() {
            return Vec::new();
        }
        let res = store
            .all()
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect::<Vec<_>>();
        if res.len() != ids.len() {
            tracing::warn!(
                tag,
                missing = ids.len() - res.len(),
                "tag index references entries absent from the store"
            );
        }
        res
    }
}
