//! Record REST API Routes
//!
//! The browser client's endpoints: one bulk read and add/update/delete
//! for each table. All writes are `POST` with a JSON body.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use sheetbook_core::{DeleteRequest, NewRecord, TableId, UpdateRequest};

use crate::error::ApiResult;
use crate::services::{TableService, WriteOutcome};
use crate::types::{AllDataResponse, WriteResponse};

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct RecordsState {
    pub service: TableService,
}

type Body<T> = Result<Json<T>, JsonRejection>;

fn respond(message: String, outcome: WriteOutcome) -> Json<WriteResponse> {
    Json(WriteResponse::new(message, outcome.updates, outcome.warnings))
}

async fn add_record(
    state: &RecordsState,
    table: TableId,
    payload: Body<NewRecord>,
) -> ApiResult<Json<WriteResponse>> {
    let Json(record) = payload?;
    let outcome = state.service.add(table, record).await?;
    tracing::info!(table = %table, warnings = outcome.warnings.len(), "Record added");
    Ok(respond(format!("Record added to {}", table), outcome))
}

async fn update_record(
    state: &RecordsState,
    table: TableId,
    payload: Body<UpdateRequest>,
) -> ApiResult<Json<WriteResponse>> {
    let Json(request) = payload?;
    let outcome = state.service.update(table, request).await?;
    tracing::info!(table = %table, warnings = outcome.warnings.len(), "Record updated");
    Ok(respond(format!("Record updated in {}", table), outcome))
}

async fn delete_record(
    state: &RecordsState,
    table: TableId,
    payload: Body<DeleteRequest>,
) -> ApiResult<Json<WriteResponse>> {
    let Json(request) = payload?;
    let outcome = state.service.delete(table, request).await?;
    tracing::info!(table = %table, "Record deleted");
    Ok(respond(format!("Record deleted from {}", table), outcome))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/get-all-data - Every record of every table
pub async fn get_all_data(
    State(state): State<Arc<RecordsState>>,
) -> ApiResult<Json<AllDataResponse>> {
    let data = state.service.load_all().await?;
    Ok(Json(data))
}

/// POST /api/add-registro - Append a transaction
pub async fn add_registro(
    State(state): State<Arc<RecordsState>>,
    payload: Body<NewRecord>,
) -> ApiResult<Json<WriteResponse>> {
    add_record(&state, TableId::Transactions, payload).await
}

/// POST /api/update-registro - Overwrite one field of a transaction
pub async fn update_registro(
    State(state): State<Arc<RecordsState>>,
    payload: Body<UpdateRequest>,
) -> ApiResult<Json<WriteResponse>> {
    update_record(&state, TableId::Transactions, payload).await
}

/// POST /api/delete-registro - Remove a transaction row
pub async fn delete_registro(
    State(state): State<Arc<RecordsState>>,
    payload: Body<DeleteRequest>,
) -> ApiResult<Json<WriteResponse>> {
    delete_record(&state, TableId::Transactions, payload).await
}

/// POST /api/add-meta
pub async fn add_meta(
    State(state): State<Arc<RecordsState>>,
    payload: Body<NewRecord>,
) -> ApiResult<Json<WriteResponse>> {
    add_record(&state, TableId::Targets, payload).await
}

/// POST /api/update-meta
pub async fn update_meta(
    State(state): State<Arc<RecordsState>>,
    payload: Body<UpdateRequest>,
) -> ApiResult<Json<WriteResponse>> {
    update_record(&state, TableId::Targets, payload).await
}

/// POST /api/delete-meta
pub async fn delete_meta(
    State(state): State<Arc<RecordsState>>,
    payload: Body<DeleteRequest>,
) -> ApiResult<Json<WriteResponse>> {
    delete_record(&state, TableId::Targets, payload).await
}

/// POST /api/add-organizador - Append a tag; `Cor` is mirrored as the
/// cell background
pub async fn add_organizador(
    State(state): State<Arc<RecordsState>>,
    payload: Body<NewRecord>,
) -> ApiResult<Json<WriteResponse>> {
    add_record(&state, TableId::Organizers, payload).await
}

/// POST /api/update-organizador
pub async fn update_organizador(
    State(state): State<Arc<RecordsState>>,
    payload: Body<UpdateRequest>,
) -> ApiResult<Json<WriteResponse>> {
    update_record(&state, TableId::Organizers, payload).await
}

/// POST /api/delete-organizador
pub async fn delete_organizador(
    State(state): State<Arc<RecordsState>>,
    payload: Body<DeleteRequest>,
) -> ApiResult<Json<WriteResponse>> {
    delete_record(&state, TableId::Organizers, payload).await
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the record routes, mounted under `/api`.
pub fn create_router(service: TableService) -> Router {
    let state = Arc::new(RecordsState { service });

    Router::new()
        .route("/get-all-data", get(get_all_data))
        .route("/add-registro", post(add_registro))
        .route("/update-registro", post(update_registro))
        .route("/delete-registro", post(delete_registro))
        .route("/add-meta", post(add_meta))
        .route("/update-meta", post(update_meta))
        .route("/delete-meta", post(delete_meta))
        .route("/add-organizador", post(add_organizador))
        .route("/update-organizador", post(update_organizador))
        .route("/delete-organizador", post(delete_organizador))
        .with_state(state)
}
