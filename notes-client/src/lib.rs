mod draft;
pub use draft::{Draft, DraftState};

mod error;
pub use error::{FetchError, SessionError, SubmitError, ValidationError};

mod service;
pub use service::{HttpService, Service};

mod session;
pub use session::Session;

mod store;
pub use store::EntryStore;

mod tag_index;
pub use tag_index::TagIndex;

pub mod api {
    pub use notes_api::*;
}
