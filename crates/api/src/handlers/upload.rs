//! Bulk poster upload.
//!
//! Accepts a multipart form of `<basename>_poster|logo|info.<ext>` files,
//! groups them into records and adds every complete record concurrently.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::future::join_all;
use poster_core::bulk_upload::{group_uploads, RejectedGroup, UploadedFile};
use poster_core::error::CoreError;
use poster_core::poster::PosterRecord;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A grouped record the store refused.
#[derive(Debug, Serialize)]
pub struct FailedRecord {
    pub name: String,
    pub error: String,
}

/// Outcome of one bulk upload.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub created: Vec<PosterRecord>,
    pub failed: Vec<FailedRecord>,
    pub rejected: Vec<RejectedGroup>,
    pub ignored_files: Vec<String>,
}

/// POST /api/v1/posters/upload
///
/// Responds 201 when at least one poster was created and 200 when no group
/// was complete enough to submit. When the store refused every submitted
/// record the upload fails with `PARTIAL_BATCH_FAILURE`. The report lists
/// created records, records the store rejected, incomplete groups (per the
/// configured missing-file policy) and unrecognised files.
pub async fn upload_posters(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read '{file_name}': {e}")))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("Upload contained no files".into()));
    }

    let file_count = files.len();
    let policy = state.config.upload_missing_policy;
    let outcome = tokio::task::spawn_blocking(move || group_uploads(files, policy))
        .await
        .map_err(|e| AppError::InternalError(format!("Upload grouping task failed: {e}")))?;

    if outcome.posters.is_empty() && outcome.rejected.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No complete poster groups found. Expected <name>_poster and <name>_info files"
                .into(),
        )));
    }

    let store = &state.store;
    let results = join_all(outcome.posters.into_iter().map(|poster| async move {
        let name = poster.name.clone();
        (name, store.add_poster(poster).await)
    }))
    .await;

    let total = results.len();
    let mut created = Vec::new();
    let mut failed = Vec::new();
    for (name, result) in results {
        match result {
            Ok(record) => created.push(record),
            Err(e) => failed.push(FailedRecord {
                name,
                error: e.to_string(),
            }),
        }
    }

    if !failed.is_empty() {
        let partial = CoreError::PartialBatch {
            failed: failed.len(),
            total,
        };
        if created.is_empty() {
            tracing::warn!(
                error = %partial,
                first_failure = %failed[0].error,
                "Bulk upload failed for every record",
            );
            return Err(AppError::Core(partial));
        }
        tracing::warn!(error = %partial, "Bulk upload partially failed");
    }

    tracing::info!(
        files = file_count,
        created = created.len(),
        failed = failed.len(),
        rejected = outcome.rejected.len(),
        "Bulk upload processed",
    );

    let status = if created.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(DataResponse {
            data: UploadReport {
                created,
                failed,
                rejected: outcome.rejected,
                ignored_files: outcome.ignored_files,
            },
        }),
    ))
}
