use std::{convert::Infallible, fmt, str::FromStr};

use chrono::Utc;
use serde::{de::Error as _, Deserialize, Deserializer};

mod error;
pub use error::Error;

mod log;
pub use log::EntryLog;

mod tags;
pub use tags::{build_tag_dict, join_tags, split_tags, TagDict};

pub use uuid::Uuid;
pub type Time = chrono::DateTime<Utc>;

/// Identifier of an entry, as handed out by the service
///
/// The service is free to pick numbers or strings, the client only ever
/// compares them. Fractional and boolean ids are kept as their JSON text.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize)]
#[serde(untagged)]
pub enum EntryId {
    Num(u64),
    Neg(i64),
    Text(String),
}

impl EntryId {
    pub fn new_v4() -> EntryId {
        EntryId::Text(Uuid::new_v4().to_string())
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<EntryId, D::Error> {
        use serde_json::Value;
        match Value::deserialize(d)? {
            Value::Number(n) => Ok(match (n.as_u64(), n.as_i64()) {
                (Some(n), _) => EntryId::Num(n),
                (None, Some(n)) => EntryId::Neg(n),
                (None, None) => EntryId::Text(n.to_string()),
            }),
            Value::String(s) => Ok(EntryId::Text(s)),
            Value::Bool(b) => Ok(EntryId::Text(b.to_string())),
            other => Err(D::Error::custom(format!("invalid entry id {other}"))),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Num(n) => write!(f, "{n}"),
            EntryId::Neg(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntryId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<EntryId, Infallible> {
        if let Ok(n) = s.parse::<u64>() {
            return Ok(EntryId::Num(n));
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => EntryId::Neg(n),
            Err(_) => EntryId::Text(String::from(s)),
        })
    }
}

impl From<u64> for EntryId {
    fn from(n: u64) -> EntryId {
        EntryId::Num(n)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> EntryId {
        EntryId::Text(String::from(s))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub text: String,

    /// Already tokenized by the service
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, alias = "parentId")]
    pub parent_id: Option<EntryId>,

    #[serde(
        default,
        deserialize_with = "lenient_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<Time>,
}

impl Entry {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Full answer to `GET /get-data`
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<Entry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_dict: TagDict,
}

impl Snapshot {
    pub fn from_entries(entries: Vec<Entry>) -> Snapshot {
        let tag_dict = build_tag_dict(&entries);
        Snapshot { entries, tag_dict }
    }
}

/// Body of `POST /submit`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    /// Raw string as typed by the user, tokenized by the service
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: String,

    #[serde(default)]
    pub parent_id: Option<EntryId>,
}

impl NewEntry {
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() || self.text.trim().is_empty() {
            return Err(Error::MissingTitleOrText);
        }
        Ok(())
    }
}

/// Answer to `POST /submit`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SubmitResponse {
    pub message: String,
}

impl SubmitResponse {
    pub fn saved() -> SubmitResponse {
        SubmitResponse {
            message: String::from("Entry saved."),
        }
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// Older data files carry naive local timestamps, and some none at all
fn lenient_time<'de, D>(d: D) -> Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<String>::deserialize(d)? {
        None => return Ok(None),
        Some(raw) => raw,
    };
    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(t.with_timezone(&Utc)));
    }
    match chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(t) => Ok(Some(chrono::DateTime::from_naive_utc_and_offset(t, Utc))),
        Err(err) => {
            tracing::warn!(?err, raw, "ignoring unparseable entry timestamp");
            Ok(None)
        }
    }
}
