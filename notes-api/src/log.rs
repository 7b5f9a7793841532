use std::collections::HashSet;

use crate::{split_tags, Entry, EntryId, Error, NewEntry, Snapshot, Time};

/// Append-only list of entries as kept by a service
///
/// Both the real server and the mock server keep their data in one of these,
/// so that they agree on tokenization, tag dict building and deletion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntryLog {
    entries: Vec<Entry>,
}

impl EntryLog {
    pub fn new() -> EntryLog {
        EntryLog::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> EntryLog {
        EntryLog { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_entries(self.entries.clone())
    }

    /// Validates and appends a submitted entry, returning the stored version
    pub fn append(&mut self, e: NewEntry, id: EntryId, now: Time) -> Result<&Entry, Error> {
        e.validate()?;
        self.entries.push(Entry {
            id,
            title: e.title,
            text: e.text,
            tags: split_tags(&e.tags),
            parent_id: e.parent_id,
            timestamp: Some(now),
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Removes an entry, and with `cascade` all the replies below it
    ///
    /// Returns the ids of all removed entries.
    pub fn remove(&mut self, id: &EntryId, cascade: bool) -> Result<Vec<EntryId>, Error> {
        if !self.entries.iter().any(|e| e.id == *id) {
            return Err(Error::UnknownEntry(id.clone()));
        }
        let mut doomed = HashSet::new();
        doomed.insert(id.clone());
        if cascade {
            self.collect_replies(&mut doomed);
        }
        Ok(self.remove_set(&doomed))
    }

    /// Removes all entries created strictly before `cutoff`
    ///
    /// Entries without a timestamp are kept.
    pub fn remove_before(&mut self, cutoff: Time, cascade: bool) -> Vec<EntryId> {
        let mut doomed = self
            .entries
            .iter()
            .filter(|e| matches!(e.timestamp, Some(t) if t < cutoff))
            .map(|e| e.id.clone())
            .collect::<HashSet<_>>();
        if cascade {
            self.collect_replies(&mut doomed);
        }
        self.remove_set(&doomed)
    }

    fn collect_replies(&self, doomed: &mut HashSet<EntryId>) {
        loop {
            let before = doomed.len();
            for e in &self.entries {
                if let Some(parent) = &e.parent_id {
                    if doomed.contains(parent) {
                        doomed.insert(e.id.clone());
                    }
                }
            }
            if doomed.len() == before {
                return;
            }
        }
    }

    fn remove_set(&mut self, doomed: &HashSet<EntryId>) -> Vec<EntryId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            let keep = !doomed.contains(&e.id);
            if !keep {
                removed.push(e.id.clone());
            }
            keep
        });
        removed
    }
}
