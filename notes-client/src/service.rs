use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{self, NewEntry, Snapshot, SubmitResponse},
    FetchError, SubmitError,
};

/// The remote side of a session
#[async_trait]
pub trait Service {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;
    async fn submit(&self, entry: &NewEntry) -> Result<SubmitResponse, SubmitError>;
}

#[async_trait]
impl<S: Service + Send + Sync + ?Sized> Service for Arc<S> {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        (**self).fetch_snapshot().await
    }

    async fn submit(&self, entry: &NewEntry) -> Result<SubmitResponse, SubmitError> {
        (**self).submit(entry).await
    }
}

/// Talks to a notes service over HTTP
///
/// No retry, no timeout: a hung request hangs the caller.
#[derive(Clone, Debug)]
pub struct HttpService {
    client: reqwest::Client,
    host: String,
}

impl HttpService {
    pub fn new(host: impl Into<String>) -> HttpService {
        HttpService::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: impl Into<String>) -> HttpService {
        let mut host = host.into();
        while host.ends_with('/') {
            host.pop();
        }
        HttpService { client, host }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl Service for HttpService {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let resp = self
            .client
            .get(format!("{}/get-data", self.host))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn submit(&self, entry: &NewEntry) -> Result<SubmitResponse, SubmitError> {
        let resp = self
            .client
            .post(format!("{}/submit", self.host))
            .json(entry)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(SubmitError::Rejected(api::Error::parse(&body).unwrap_or_else(
                |err| {
                    tracing::debug!(?err, "unparseable error body from notes service");
                    api::Error::Unknown(format!("HTTP status {status}"))
                },
            )));
        }
        serde_json::from_slice(&body).map_err(|e| SubmitError::Decode(e.to_string()))
    }
}
