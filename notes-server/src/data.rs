use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use chrono::Utc;
use notes_api::{Entry, EntryId, EntryLog, NewEntry, Snapshot, SubmitResponse, Time};
use tokio::sync::Mutex;

use crate::Error;

/// Entries kept in memory and written through to a JSON file
///
/// The file holds the same `{entries, tag_dict}` document as served by
/// `/get-data`, the tag dict being rebuilt on each write.
#[derive(Clone, Debug)]
pub struct DataFile(Arc<Mutex<Inner>>);

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    log: EntryLog,
}

impl DataFile {
    /// A missing or malformed file opens as an empty one
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<DataFile> {
        let path = path.into();
        let entries = read_entries(&path).await?;
        tracing::info!(path = %path.display(), entries = entries.len(), "opened data file");
        Ok(DataFile(Arc::new(Mutex::new(Inner {
            path,
            log: EntryLog::from_entries(entries),
        }))))
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.0.lock().await.log.snapshot()
    }

    pub async fn submit(&self, e: NewEntry) -> Result<SubmitResponse, Error> {
        let mut inner = self.0.lock().await;
        let entry = inner.log.append(e, EntryId::new_v4(), Utc::now())?;
        tracing::info!(id = %entry.id, parent = ?entry.parent_id, "entry saved");
        inner.persist().await?;
        Ok(SubmitResponse::saved())
    }

    pub async fn delete(&self, id: &EntryId, cascade: bool) -> Result<Vec<EntryId>, Error> {
        let mut inner = self.0.lock().await;
        let removed = inner.log.remove(id, cascade)?;
        tracing::info!(%id, removed = removed.len(), "deleted entry");
        inner.persist().await?;
        Ok(removed)
    }

    pub async fn delete_before(&self, cutoff: Time, cascade: bool) -> Result<Vec<EntryId>, Error> {
        let mut inner = self.0.lock().await;
        let removed = inner.log.remove_before(cutoff, cascade);
        tracing::info!(%cutoff, removed = removed.len(), "deleted entries before cutoff");
        if !removed.is_empty() {
            inner.persist().await?;
        }
        Ok(removed)
    }
}

impl Inner {
    async fn persist(&self) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(&self.log.snapshot())
            .context("serializing data file contents")?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))
    }
}

async fn read_entries(path: &Path) -> anyhow::Result<Vec<Entry>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    match serde_json::from_slice::<Snapshot>(&data) {
        Ok(snap) => Ok(snap.entries),
        Err(err) => {
            tracing::warn!(?err, path = %path.display(), "malformed data file, starting empty");
            Ok(Vec::new())
        }
    }
}
