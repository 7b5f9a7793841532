use std::sync::Arc;

use crate::{
    api::{join_tags, Entry, NewEntry},
    ValidationError,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DraftState {
    Idle,
    Composing,
    Submitting,
}

/// Entry being written, not yet sent to the service
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Draft {
    pub title: String,
    pub text: String,

    /// Raw, untokenized, as typed
    pub tags: String,

    pub reply_target: Option<Arc<Entry>>,
}

impl Draft {
    pub fn new() -> Draft {
        Draft::default()
    }

    /// Seeds a reply: the title marks the thread and tags are inherited
    pub fn start_reply(target: Arc<Entry>) -> Draft {
        Draft {
            title: format!("Re: {}", target.title),
            text: String::new(),
            tags: join_tags(&target.tags),
            reply_target: Some(target),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.text.is_empty()
            && self.tags.is_empty()
            && self.reply_target.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }

    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            title: self.title.clone(),
            text: self.text.clone(),
            tags: self.tags.clone(),
            parent_id: self.reply_target.as_ref().map(|t| t.id.clone()),
        }
    }
}
