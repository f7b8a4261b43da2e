use crate::errors::AppResult;
use crate::mmm::saturation::{curve_points, DEFAULT_CURVE_STEPS};
use crate::mmm::simulator;
use crate::mmm::types::{MmmResult, SimulationResult};
use crate::state::{AppState, PerfCounters};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Upper bound on curve sampling resolution.
const MAX_CURVE_STEPS: usize = 500;

#[derive(serde::Deserialize)]
pub struct SaturationQuery {
    pub steps: Option<usize>,
}

#[derive(serde::Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub budgets: BTreeMap<String, f64>,
}

#[derive(serde::Deserialize)]
pub struct OptimizeQuery {
    pub budget: Option<f64>,
}

/// Count failed requests before handing the error to axum.
pub(crate) fn track<T>(state: &AppState, result: AppResult<T>) -> AppResult<T> {
    if result.is_err() {
        PerfCounters::bump(&state.counters.errors_returned);
    }
    result
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to the Meridian MMM App Backend" }))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/sample-data/{scenario} -- pre-built result for a quality tier
pub async fn get_sample_data(
    State(state): State<Arc<AppState>>,
    Path(scenario): Path<String>,
) -> AppResult<Json<MmmResult>> {
    let result = track(&state, state.assembler.assemble_named(&scenario))?;
    PerfCounters::bump(&state.counters.samples_served);
    tracing::info!(scenario = %scenario, "sample scenario served");
    Ok(Json(result))
}

/// GET /api/saturation/{scenario} -- sampled Hill curves for charting
pub async fn get_saturation(
    State(state): State<Arc<AppState>>,
    Path(scenario): Path<String>,
    Query(params): Query<SaturationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let result = track(&state, state.assembler.assemble_named(&scenario))?;
    let steps = params.steps.unwrap_or(DEFAULT_CURVE_STEPS).clamp(1, MAX_CURVE_STEPS);
    let curves: Vec<_> = result
        .saturation_curves
        .iter()
        .map(|c| curve_points(c, steps))
        .collect();
    Ok(Json(serde_json::json!({
        "scenario_quality": result.scenario_quality,
        "curves": curves,
    })))
}

/// POST /api/simulate/{scenario} -- project revenue for a new allocation
pub async fn simulate_budget(
    State(state): State<Arc<AppState>>,
    Path(scenario): Path<String>,
    Json(body): Json<SimulateRequest>,
) -> AppResult<Json<SimulationResult>> {
    let simulation = track(
        &state,
        state
            .assembler
            .assemble_named(&scenario)
            .and_then(|r| simulator::simulate(&r, &body.budgets)),
    )?;
    PerfCounters::bump(&state.counters.simulations_run);
    Ok(Json(simulation))
}

/// GET /api/optimize/{scenario} -- mROAS-weighted allocation and its projection
pub async fn optimize_budget(
    State(state): State<Arc<AppState>>,
    Path(scenario): Path<String>,
    Query(params): Query<OptimizeQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = state.assembler.assemble_named(&scenario).and_then(|r| {
        let budget = params.budget.unwrap_or(r.total_budget);
        let allocation = simulator::optimize_allocation(&r, budget)?;
        let simulation = simulator::simulate(&r, &allocation)?;
        Ok((allocation, simulation))
    });
    let (allocation, simulation) = track(&state, outcome)?;
    PerfCounters::bump(&state.counters.simulations_run);
    Ok(Json(serde_json::json!({
        "allocation": allocation,
        "simulation": simulation,
    })))
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.counters.snapshot())
}
