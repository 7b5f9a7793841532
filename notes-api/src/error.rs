use anyhow::{anyhow, Context};
use serde_json::json;

use crate::EntryId;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Both title and text required")]
    MissingTitleOrText,

    #[error("No entry with id {0}")]
    UnknownEntry(EntryId),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MissingTitleOrText => StatusCode::BAD_REQUEST,
            Error::UnknownEntry(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "error": msg,
                "type": "unknown",
            }),
            Error::MissingTitleOrText => json!({
                "error": "no text or title was sent",
                "type": "missing-title-or-text",
            }),
            Error::UnknownEntry(id) => json!({
                "error": "no such entry",
                "type": "unknown-entry",
                "id": id,
            }),
        })
        .expect("serializing error contents")
    }

    /// Services that predate the `type` field only send `{"error": ...}`,
    /// which is parsed as `Error::Unknown`
    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("error")
                    .or_else(|| data.get("message"))
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(match data.get("type").and_then(|t| t.as_str()) {
            None if data.get("error").is_some() => Error::Unknown(message()),
            None => return Err(anyhow!("error contents has neither type nor message")),
            Some("unknown") => Error::Unknown(message()),
            Some("missing-title-or-text") => Error::MissingTitleOrText,
            Some("unknown-entry") => Error::UnknownEntry(
                data.get("id")
                    .cloned()
                    .and_then(|id| serde_json::from_value(id).ok())
                    .ok_or_else(|| anyhow!("error is an unknown entry without an id"))?,
            ),
            Some(_) => return Err(anyhow!("error contents has unknown type")),
        })
    }
}
