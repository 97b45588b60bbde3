//! HTTP handlers for the file and line endpoints.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ApiError;
use super::AppState;
use crate::error::{FilelinesError, ValidationErrors};
use crate::files::upload::{FILE_FIELD, MSG_MISSING};
use crate::files::{
    longest_lines, negotiate, pick_random_file, pick_random_line, read_lines, save_upload,
    LineRecord, Payload, Upload, UploadedFile, LONGEST_ALL, LONGEST_PER_FILE,
};

/// Query string of `/random-line`; `accept` overrides the `Accept` header.
#[derive(Debug, Default, Deserialize)]
pub struct AcceptQuery {
    pub accept: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineBackwards {
    pub line_backwards: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /upload`: store a `.txt` file sent as multipart field `file`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadedFile>), ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await?.to_vec();
        upload = Some(Upload {
            filename,
            content_type,
            data,
        });
        break;
    }

    let Some(upload) = upload else {
        return Err(ValidationErrors::single(FILE_FIELD, MSG_MISSING).into());
    };
    let stored = save_upload(&state.storage, &state.index, upload)
        .await
        .inspect_err(|e| warn!("Upload rejected: {}", e))?;
    Ok((StatusCode::CREATED, Json(UploadedFile::from(&stored))))
}

/// `GET /random-line`: a random line in the representation the client asked for.
pub async fn random_line(
    State(state): State<AppState>,
    Query(query): Query<AcceptQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let record = pick_line(&state).await?;
    let implicit = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
    debug!(
        explicit = ?query.accept,
        implicit = ?implicit,
        file = %record.file_name,
        line_number = record.line_number,
        "Serving random line"
    );

    let summary = Payload::scalar("random_line", record.text.as_str());
    let rendered = negotiate(&summary, &full_payload(&record), query.accept.as_deref(), implicit)?;
    Ok(([(CONTENT_TYPE, rendered.media_type.as_str())], rendered.body).into_response())
}

/// `GET /random-line-backwards`: a random line with its characters reversed.
pub async fn random_line_backwards(
    State(state): State<AppState>,
) -> Result<Json<LineBackwards>, ApiError> {
    let record = pick_line(&state).await?;
    Ok(Json(LineBackwards {
        line_backwards: record.text.chars().rev().collect(),
    }))
}

/// `GET /longest-100`: the longest lines across every stored file.
pub async fn longest_100(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let files = state.index.list()?;
    let lines = longest_lines(&state.storage, &files, LONGEST_ALL).await?;
    Ok(Json(lines))
}

/// `GET /longest-20/{file_id}`: the longest lines of one file.
pub async fn longest_20(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let not_found = || FilelinesError::NotFound(format!("No file with id {}", file_id));
    let id: i64 = file_id.parse().map_err(|_| not_found())?;
    let file = state.index.get(id)?.ok_or_else(not_found)?;
    let lines = longest_lines(&state.storage, std::slice::from_ref(&file), LONGEST_PER_FILE).await?;
    Ok(Json(lines))
}

/// Pick a random file, then a random line in it.
async fn pick_line(state: &AppState) -> Result<LineRecord, FilelinesError> {
    let files = state.index.list()?;
    let file = {
        let mut rng = state.rng.lock();
        pick_random_file(&files, &mut *rng)?.clone()
    };
    let lines = read_lines(&state.storage, &file).await?;
    let mut rng = state.rng.lock();
    pick_random_line(&file, &lines, &mut *rng)
}

fn full_payload(record: &LineRecord) -> Payload {
    Payload::Record(vec![
        ("line_number", (record.line_number as i64).into()),
        ("file_name", record.file_name.as_str().into()),
        ("line", record.text.as_str().into()),
        (
            "most_common_letter",
            record.most_common_letter.map(String::from).into(),
        ),
    ])
}
