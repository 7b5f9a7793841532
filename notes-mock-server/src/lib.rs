use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use notes_client::{
    api::{Entry, EntryId, EntryLog, Error, NewEntry, Snapshot, SubmitResponse, Time},
    FetchError, Service, SubmitError,
};
use parking_lot::Mutex;

/// In-memory notes service
///
/// Hands out sequential numeric ids, starting after the largest numeric id
/// already present.
#[derive(Debug)]
pub struct MockServer {
    log: EntryLog,
    next_id: u64,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::with_entries(Vec::new())
    }

    pub fn with_entries(entries: Vec<Entry>) -> MockServer {
        let next_id = entries
            .iter()
            .filter_map(|e| match e.id {
                EntryId::Num(n) => Some(n),
                _ => None,
            })
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);
        MockServer {
            log: EntryLog::from_entries(entries),
            next_id,
        }
    }

    /// Return the current number of entries
    pub fn test_num_entries(&self) -> usize {
        self.log.len()
    }

    /// Return the id of entry number `idx`
    pub fn test_get_entry_id(&self, idx: usize) -> &EntryId {
        &self
            .log
            .entries()
            .get(idx)
            .unwrap_or_else(|| panic!("getting entry {idx} among {}", self.log.len()))
            .id
    }

    pub fn get_data(&self) -> Snapshot {
        self.log.snapshot()
    }

    pub fn submit(&mut self, e: NewEntry) -> Result<SubmitResponse, Error> {
        self.submit_at(e, Utc::now())
    }

    pub fn submit_at(&mut self, e: NewEntry, now: Time) -> Result<SubmitResponse, Error> {
        let id = EntryId::Num(self.next_id);
        self.log.append(e, id, now)?;
        self.next_id += 1;
        Ok(SubmitResponse::saved())
    }

    pub fn delete_entry(&mut self, id: &EntryId, cascade: bool) -> Result<Vec<EntryId>, Error> {
        self.log.remove(id, cascade)
    }

    pub fn delete_before(&mut self, cutoff: Time, cascade: bool) -> Vec<EntryId> {
        self.log.remove_before(cutoff, cascade)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[derive(Debug, Default)]
struct Faults {
    fetch_failures: Vec<FetchError>,
    submit_failures: Vec<SubmitError>,
    fetches: usize,
    submitted: Vec<NewEntry>,
}

/// `Service` backed by a `MockServer`, with injectable failures
///
/// Clones share the same server, so a test can keep a handle while a
/// `Session` owns another one.
#[derive(Clone, Debug, Default)]
pub struct MockService {
    server: Arc<Mutex<MockServer>>,
    faults: Arc<Mutex<Faults>>,
}

impl MockService {
    pub fn new(server: MockServer) -> MockService {
        MockService {
            server: Arc::new(Mutex::new(server)),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Runs `f` on the server, eg. to simulate another client's writes
    pub fn with_server<R>(&self, f: impl FnOnce(&mut MockServer) -> R) -> R {
        f(&mut self.server.lock())
    }

    /// The next fetch fails with `err` instead of reaching the server
    pub fn fail_next_fetch(&self, err: FetchError) {
        self.faults.lock().fetch_failures.push(err);
    }

    /// The next submission fails with `err` instead of reaching the server
    pub fn fail_next_submit(&self, err: SubmitError) {
        self.faults.lock().submit_failures.push(err);
    }

    /// Number of fetches, failed ones included
    pub fn num_fetches(&self) -> usize {
        self.faults.lock().fetches
    }

    /// Every submission received, failed ones included
    pub fn submitted(&self) -> Vec<NewEntry> {
        self.faults.lock().submitted.clone()
    }
}

#[async_trait]
impl Service for MockService {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        {
            let mut faults = self.faults.lock();
            faults.fetches += 1;
            if !faults.fetch_failures.is_empty() {
                return Err(faults.fetch_failures.remove(0));
            }
        }
        Ok(self.server.lock().get_data())
    }

    async fn submit(&self, entry: &NewEntry) -> Result<SubmitResponse, SubmitError> {
        {
            let mut faults = self.faults.lock();
            faults.submitted.push(entry.clone());
            if !faults.submit_failures.is_empty() {
                return Err(faults.submit_failures.remove(0));
            }
        }
        let res = self.server.lock().submit(entry.clone());
        if let Err(err) = &res {
            tracing::debug!(%err, "mock server rejected entry");
        }
        Ok(res?)
    }
}
