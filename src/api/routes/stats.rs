use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{
    HeroRunCounts, HeroShare, OwnerId, PlacementPercentages, Run, SeasonReport, StatsTable,
};
use crate::storage::RunQuery;

#[derive(Debug, Deserialize)]
pub struct SeasonParams {
    pub season: Option<i32>,
}

fn season_runs(
    state: &AppState,
    owner: OwnerId,
    season: Option<i32>,
) -> Result<(i32, Vec<Run>), ApiError> {
    let season = season.unwrap_or(state.tracker.default_season);
    let runs = state.store.all(&RunQuery::new(owner, season))?;
    Ok((season, runs))
}

// ── Placement Distribution ──────────────────────────────────────

pub async fn percentages(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<PlacementPercentages>, ApiError> {
    let (_, runs) = season_runs(&state, owner, params.season)?;
    Ok(Json(calculate::placement_percentages_with(
        &runs,
        state.tracker.tiering,
    )))
}

// ── Heroes ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HeroesResponse {
    pub season: i32,
    pub runs_per_hero: HeroRunCounts,
    pub share: HeroShare,
}

pub async fn heroes(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<HeroesResponse>, ApiError> {
    let (season, runs) = season_runs(&state, owner, params.season)?;
    Ok(Json(HeroesResponse {
        season,
        runs_per_hero: calculate::runs_per_hero(&runs),
        share: calculate::hero_share(&runs, &state.tracker.roster),
    }))
}

// ── Hero × Placement Tables ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TablesParams {
    pub season: Option<i32>,
    pub ranked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub season: i32,
    /// Absent when not requested or when the season has no runs
    pub ranked: Option<StatsTable>,
    pub unranked: Option<StatsTable>,
}

pub async fn tables(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(params): Query<TablesParams>,
) -> Result<Json<TablesResponse>, ApiError> {
    let (season, runs) = season_runs(&state, owner, params.season)?;

    let build = |ranked: bool| {
        if runs.is_empty() || params.ranked.is_some_and(|wanted| wanted != ranked) {
            return None;
        }
        let partition: Vec<Run> = runs
            .iter()
            .filter(|r| r.ranked == ranked)
            .cloned()
            .collect();
        Some(calculate::build_stats_table_with(
            &partition,
            &state.tracker.roster,
            state.tracker.tiering,
        ))
    };

    Ok(Json(TablesResponse {
        season,
        ranked: build(true),
        unranked: build(false),
    }))
}

// ── Full Report ─────────────────────────────────────────────────

pub async fn report(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<SeasonReport>, ApiError> {
    let (season, runs) = season_runs(&state, owner, params.season)?;
    Ok(Json(calculate::season_report(
        season,
        &runs,
        &state.tracker.roster,
        state.tracker.tiering,
    )))
}
