use std::sync::Arc;

use crate::{
    api::{Entry, EntryId, SubmitResponse},
    Draft, DraftState, EntryStore, FetchError, Service, SessionError, TagIndex,
};

/// Everything a front end needs to show: last snapshot, draft and selection
///
/// The store and the tag index are only ever replaced together, from one
/// snapshot. The snapshot is marked stale after each accepted submission and
/// re-fetched before the submission returns.
pub struct Session<S> {
    service: S,
    store: EntryStore,
    index: TagIndex,
    stale: bool,

    draft: Draft,
    state: DraftState,

    selected_tag: Option<String>,

    message: Option<String>,
    last_error: Option<String>,
}

impl<S: Service> Session<S> {
    /// Creates an empty session, stale until the first `refresh`
    pub fn new(service: S) -> Session<S> {
        Session {
            service,
            store: EntryStore::new(),
            index: TagIndex::new(),
            stale: true,
            draft: Draft::new(),
            state: DraftState::Idle,
            selected_tag: None,
            message: None,
            last_error: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.index
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn replying_to(&self) -> Option<&Arc<Entry>> {
        self.draft.reply_target.as_ref()
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    /// Status message of the last accepted submission
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetches a snapshot and replaces store and tag index with it
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&mut self) -> Result<(), FetchError> {
        match self.service.fetch_snapshot().await {
            Ok(snap) => {
                tracing::info!(
                    entries = snap.entries.len(),
                    tags = snap.tag_dict.len(),
                    "fetched stored data"
                );
                self.store.load(snap.entries);
                self.index.load(snap.tag_dict);
                self.stale = false;
                self.last_error = None;
                if let Some(tag) = &self.selected_tag {
                    if !self.index.contains(tag) {
                        tracing::debug!(tag, "selected tag vanished, clearing selection");
                        self.selected_tag = None;
                    }
                }
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "cannot fetch stored data");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub async fn refresh_if_stale(&mut self) -> Result<(), FetchError> {
        if !self.stale {
            return Ok(());
        }
        self.refresh().await
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
        self.draft_edited();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
        self.draft_edited();
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.draft.tags = tags.into();
        self.draft_edited();
    }

    fn draft_edited(&mut self) {
        self.state = match self.draft.is_empty() {
            true => DraftState::Idle,
            false => DraftState::Composing,
        };
    }

    /// Replaces the current draft with a reply to `target`
    ///
    /// Returns None, leaving the draft untouched, if `target` is not in the
    /// store.
    pub fn start_reply(&mut self, target: &EntryId) -> Option<&Draft> {
        let target = match self.store.by_id(target) {
            Some(t) => t.clone(),
            None => {
                tracing::warn!(%target, "cannot reply to entry missing from the store");
                return None;
            }
        };
        tracing::debug!(id = %target.id, "starting reply");
        self.draft = Draft::start_reply(target);
        self.draft_edited();
        Some(&self.draft)
    }

    pub fn clear_draft(&mut self) {
        self.draft = Draft::new();
        self.state = DraftState::Idle;
    }

    /// Sends the draft, then re-fetches the snapshot
    ///
    /// On failure, or if the returned future is dropped before completion,
    /// the draft is kept for the user to retry. A failure of the
    /// follow-up fetch does not fail the submission: it is logged and the
    /// session stays stale.
    pub async fn submit(&mut self) -> Result<SubmitResponse, SessionError> {
        if let Err(err) = self.draft.validate() {
            tracing::warn!(%err, "refusing to submit draft");
            self.last_error = Some(err.to_string());
            return Err(err.into());
        }
        let entry = self.draft.to_new_entry();
        tracing::debug!(?entry, "submitting entry");
        let res = {
            let _submitting = SubmitGuard::enter(&mut self.state);
            self.service.submit(&entry).await
        };
        match res {
            Ok(resp) => {
                tracing::info!(message = %resp.message, "entry submitted");
                self.clear_draft();
                self.message = Some(resp.message.clone());
                self.last_error = None;
                self.invalidate();
                // already logged, and the previous snapshot is kept
                let _ = self.refresh_if_stale().await;
                Ok(resp)
            }
            Err(err) => {
                tracing::error!(%err, "error adding entry");
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Selects `tag` and returns its entries
    ///
    /// Selecting a tag without entries is ignored and returns nothing.
    pub fn select_tag(&mut self, tag: &str) -> Vec<Arc<Entry>> {
        if !self.index.contains(tag) {
            tracing::debug!(tag, "ignoring selection of unknown tag");
            return Vec::new();
        }
        tracing::debug!(tag, "highlighting entries for tag");
        self.selected_tag = Some(String::from(tag));
        self.index.entries_for(tag, &self.store)
    }

    pub fn clear_selection(&mut self) {
        self.selected_tag = None;
    }

    /// Entries of the selected tag, recomputed from the current snapshot
    pub fn filtered_entries(&self) -> Vec<Arc<Entry>> {
        match &self.selected_tag {
            Some(tag) => self.index.entries_for(tag, &self.store),
            None => Vec::new(),
        }
    }
}

/// Holds the draft state at `Submitting` while a submission is in flight
///
/// Falls back to `Composing` when dropped, so that a cancelled submission
/// leaves an editable draft behind.
struct SubmitGuard<'a>(&'a mut DraftState);

impl<'a> SubmitGuard<'a> {
    fn enter(state: &'a mut DraftState) -> SubmitGuard<'a> {
        *state = DraftState::Submitting;
        SubmitGuard(state)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.0 = DraftState::Composing;
    }
}
