use axum::{extract::State, Json};
use notes_api::{NewEntry, Snapshot, SubmitResponse};

use crate::{DataFile, Error};

pub async fn get_data(State(data): State<DataFile>) -> Json<Snapshot> {
    Json(data.snapshot().await)
}

pub async fn submit(
    State(data): State<DataFile>,
    Json(e): Json<NewEntry>,
) -> Result<Json<SubmitResponse>, Error> {
    tracing::debug!(title = %e.title, tags = %e.tags, parent = ?e.parent_id, "received entry");
    Ok(Json(data.submit(e).await?))
}
