use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::models::{NewRun, OwnerId, PlacementCategory, Run, RunId};
use crate::storage::RunQuery;

// ── Run History ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    pub season: Option<i32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// A run as shown in the history list.
#[derive(Debug, Serialize)]
pub struct RunItem {
    #[serde(flatten)]
    pub run: Run,
    pub category: PlacementCategory,
    /// "Perfect Game" or "wins/finished"
    pub result: String,
}

impl RunItem {
    pub fn new(run: Run, state: &AppState) -> Self {
        Self {
            category: run.category_with(state.tracker.tiering),
            result: run.result_label(),
            run,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub season: i32,
    pub runs: Vec<RunItem>,
    pub pagination: PaginationMeta,
}

pub async fn list_runs(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(params): Query<ListRunsParams>,
) -> Result<Json<RunsResponse>, ApiError> {
    let season = params.season.unwrap_or(state.tracker.default_season);
    let query = RunQuery::new(owner, season);

    let total = state.store.count(&query)? as u32;
    let pagination =
        Pagination::new(params.page, params.page_size, state.tracker.page_size).clamp_to(total);

    let runs = state
        .store
        .list(
            &query,
            pagination.offset() as usize,
            pagination.page_size as usize,
        )?
        .into_iter()
        .map(|run| RunItem::new(run, &state))
        .collect();

    Ok(Json(RunsResponse {
        season,
        runs,
        pagination: PaginationMeta::new(&pagination, total),
    }))
}

// ── Create / Delete ─────────────────────────────────────────────

pub async fn create_run(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Json(input): Json<NewRun>,
) -> Result<(StatusCode, Json<RunItem>), ApiError> {
    let run = input.into_run(
        owner,
        state.tracker.default_season,
        &state.tracker.current_patch,
        Utc::now(),
    )?;
    let stored = state.store.insert(run)?;

    Ok((StatusCode::CREATED, Json(RunItem::new(stored, &state))))
}

pub async fn delete_run(
    State(state): State<AppState>,
    Path((owner, id)): Path<(OwnerId, String)>,
) -> Result<StatusCode, ApiError> {
    let run_id = RunId::from(id);
    if state.store.delete(owner, &run_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Run not found: {}", run_id)))
    }
}

// ── Seasons ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SeasonsResponse {
    pub seasons: Vec<i32>,
    pub default_season: i32,
}

pub async fn list_seasons(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
) -> Result<Json<SeasonsResponse>, ApiError> {
    Ok(Json(SeasonsResponse {
        seasons: state.store.seasons(owner)?,
        default_season: state.tracker.default_season,
    }))
}
