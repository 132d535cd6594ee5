use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
};
use std::sync::Arc;

use super::protocol::{ErrorResponse, GetResponse, PutRequest, PutResponse, SyncSnapshot};
use super::table::FragmentTable;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(status: StatusCode, error: impl ToString) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub async fn handle_put(
    Extension(table): Extension<Arc<FragmentTable>>,
    Json(req): Json<PutRequest>,
) -> (StatusCode, Json<PutResponse>) {
    if req.key.is_empty() {
        tracing::warn!("PUT rejected: empty key");
        return (
            StatusCode::BAD_REQUEST,
            Json(PutResponse { success: false }),
        );
    }

    match table.put(&req.key, req.value.as_bytes()).await {
        Ok(()) => (StatusCode::OK, Json(PutResponse { success: true })),
        Err(e) => {
            tracing::error!("Failed to put {}: {}", req.key, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PutResponse { success: false }),
            )
        }
    }
}

pub async fn handle_get(
    Extension(table): Extension<Arc<FragmentTable>>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>, ErrorReply> {
    if key.is_empty() {
        return Err(error_reply(StatusCode::BAD_REQUEST, "Key not provided"));
    }

    match table.get(&key).await {
        Ok(Some(value)) => Ok(Json(GetResponse {
            value: String::from_utf8_lossy(&value).into_owned(),
            key,
        })),
        Ok(None) => Err(error_reply(StatusCode::NOT_FOUND, "Key not found")),
        Err(e) => {
            tracing::error!("Failed to get {}: {}", key, e);
            Err(error_reply(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// `GET /get/` with no key segment.
pub async fn handle_get_missing_key() -> ErrorReply {
    error_reply(StatusCode::BAD_REQUEST, "Key not provided")
}

/// Serves the sealed table to a peer; nothing is decrypted.
pub async fn handle_sync(Extension(table): Extension<Arc<FragmentTable>>) -> Json<SyncSnapshot> {
    let snapshot = table.snapshot().await;
    tracing::debug!("SYNC: serving {} entries", snapshot.len());
    Json(SyncSnapshot::from(snapshot))
}
