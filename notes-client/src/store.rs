use std::{
    collections::{hash_map, HashMap, HashSet},
    sync::Arc,
};

use crate::api::{Entry, EntryId};

/// All entries of the last snapshot, in the order the service sent them
#[derive(Clone, Debug, Default)]
pub struct EntryStore {
    entries: Vec<Arc<Entry>>,
    by_id: HashMap<EntryId, Arc<Entry>>,
    parents: HashMap<EntryId, Arc<Entry>>,
    children: HashMap<EntryId, Vec<Arc<Entry>>>,
}

impl EntryStore {
    pub fn new() -> EntryStore {
        EntryStore::default()
    }

    /// Replaces the whole collection
    ///
    /// Should the snapshot contain the same id twice, only the first entry
    /// with this id is kept.
    pub fn load(&mut self, entries: Vec<Entry>) {
        let mut kept = Vec::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());
        for e in entries {
            match by_id.entry(e.id.clone()) {
                hash_map::Entry::Occupied(_) => {
                    tracing::warn!(id = %e.id, "dropping entry with duplicate id from snapshot")
                }
                hash_map::Entry::Vacant(slot) => {
                    let e = Arc::new(e);
                    slot.insert(e.clone());
                    kept.push(e);
                }
            }
        }
        let mut parents = HashMap::new();
        let mut children = HashMap::<EntryId, Vec<Arc<Entry>>>::new();
        for e in kept.iter() {
            let p = match &e.parent_id {
                Some(p) if *p != e.id => p,
                _ => continue,
            };
            let parent = match by_id.get(p) {
                Some(parent) => parent,
                None => {
                    tracing::debug!(id = %e.id, parent = %p, "reply to missing entry, treating as top-level");
                    continue;
                }
            };
            if in_parent_cycle(e, &by_id) {
                tracing::warn!(id = %e.id, parent = %p, "entry is its own ancestor, treating as top-level");
                continue;
            }
            parents.insert(e.id.clone(), parent.clone());
            children.entry(p.clone()).or_default().push(e.clone());
        }
        self.entries = kept;
        self.by_id = by_id;
        self.parents = parents;
        self.children = children;
    }

    pub fn all(&self) -> &[Arc<Entry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_id(&self, id: &EntryId) -> Option<&Arc<Entry>> {
        self.by_id.get(id)
    }

    /// Direct replies to `id`, in snapshot order
    pub fn children_of(&self, id: &EntryId) -> &[Arc<Entry>] {
        self.children.get(id).map(|c| &c[..]).unwrap_or(&[])
    }

    /// Returns None both for top-level entries and for replies whose parent
    /// is not in the store
    pub fn parent_of(&self, id: &EntryId) -> Option<&Arc<Entry>> {
        self.parents.get(id)
    }

    /// Replies to a missing entry, to themselves or to one of their own
    /// replies are all top-level
    pub fn is_top_level(&self, e: &Entry) -> bool {
        !self.parents.contains_key(&e.id)
    }

    /// Entries to render at the root, replies to missing entries included
    pub fn top_level(&self) -> Vec<Arc<Entry>> {
        self.entries
            .iter()
            .filter(|e| self.is_top_level(e))
            .cloned()
            .collect()
    }

    /// Depth-first walk of `id` and all replies below it, with their depth
    ///
    /// Returns an empty list if `id` is unknown. Each entry is visited at most
    /// once even if the service sent a parent cycle.
    pub fn thread(&self, id: &EntryId) -> Vec<(usize, Arc<Entry>)> {
        let mut res = Vec::new();
        let root = match self.by_id.get(id) {
            Some(root) => root,
            None => return res,
        };
        let mut seen = HashSet::new();
        let mut stack = vec![(0, root.clone())];
        while let Some((depth, e)) = stack.pop() {
            if !seen.insert(e.id.clone()) {
                continue;
            }
            for c in self.children_of(&e.id).iter().rev() {
                stack.push((depth + 1, c.clone()));
            }
            res.push((depth, e));
        }
        res
    }
}

fn in_parent_cycle(e: &Entry, by_id: &HashMap<EntryId, Arc<Entry>>) -> bool {
    let mut seen = HashSet::new();
    let mut cur = e.parent_id.as_ref();
    while let Some(id) = cur {
        if *id == e.id {
            return true;
        }
        if !seen.insert(id) {
            // cycle above us, not through us
            return false;
        }
        cur = by_id.get(id).and_then(|p| p.parent_id.as_ref());
    }
    false
}
