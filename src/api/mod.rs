use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::core::{
    Debt, DebtType, SimulationOptions, Strategy, compare_strategies, debt_stats, simulate_with,
    validate_debt, validate_monthly_budget,
};

mod cli;

pub use cli::{Cli, run_cli};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "Snowball", alias = "SNOWBALL")]
    Snowball,
    #[serde(alias = "Avalanche", alias = "AVALANCHE")]
    Avalanche,
}

impl From<ApiStrategy> for Strategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Snowball => Strategy::Snowball,
            ApiStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

/// A debt as posted by a client. Bookkeeping fields are optional and filled in
/// when missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtPayload {
    id: Option<String>,
    name: String,
    #[serde(default)]
    debt_type: DebtType,
    balance: f64,
    original_balance: Option<f64>,
    interest_rate: f64,
    minimum_payment: f64,
    created_at: Option<DateTime<Utc>>,
}

impl From<DebtPayload> for Debt {
    fn from(value: DebtPayload) -> Self {
        Debt {
            id: value.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: value.name,
            debt_type: value.debt_type,
            balance: value.balance,
            original_balance: value.original_balance.unwrap_or(value.balance),
            interest_rate: value.interest_rate,
            minimum_payment: value.minimum_payment,
            created_at: value.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulatePayload {
    #[serde(default)]
    debts: Vec<DebtPayload>,
    #[serde(default)]
    monthly_budget: f64,
    strategy: ApiStrategy,
    #[serde(default)]
    redistribute_freed_minimums: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComparePayload {
    #[serde(default)]
    debts: Vec<DebtPayload>,
    #[serde(default)]
    monthly_budget: f64,
    #[serde(default)]
    redistribute_freed_minimums: bool,
}

#[derive(Debug, Deserialize)]
struct StatsPayload {
    #[serde(default)]
    debts: Vec<DebtPayload>,
}

#[derive(Debug)]
struct Snapshot {
    debts: Vec<Debt>,
    monthly_budget: f64,
    options: SimulationOptions,
}

#[derive(Debug)]
struct SimulateRequest {
    snapshot: Snapshot,
    strategy: Strategy,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/stats", post(stats_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("debtplan HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    let request = match payload
        .map_err(|e| e.body_text())
        .and_then(|Json(p)| simulate_request_from_payload(p))
    {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let snapshot = &request.snapshot;
    let result = simulate_with(
        &snapshot.debts,
        snapshot.monthly_budget,
        request.strategy,
        snapshot.options,
    );
    log::debug!(
        "simulate {:?}: {} debt(s), {} month(s)",
        request.strategy,
        snapshot.debts.len(),
        result.months_to_payoff
    );
    json_response(StatusCode::OK, result)
}

async fn compare_handler(payload: Result<Json<ComparePayload>, JsonRejection>) -> Response {
    let snapshot = match payload
        .map_err(|e| e.body_text())
        .and_then(|Json(p)| compare_snapshot_from_payload(p))
    {
        Ok(snapshot) => snapshot,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let comparison = compare_strategies(&snapshot.debts, snapshot.monthly_budget, snapshot.options);
    json_response(StatusCode::OK, comparison)
}

async fn stats_handler(payload: Result<Json<StatsPayload>, JsonRejection>) -> Response {
    let debts = match payload
        .map_err(|e| e.body_text())
        .and_then(|Json(p)| debts_from_payload(p.debts))
    {
        Ok(debts) => debts,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, debt_stats(&debts))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn debts_from_payload(payloads: Vec<DebtPayload>) -> Result<Vec<Debt>, String> {
    payloads
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            let debt = Debt::from(payload);
            validate_debt(&debt).map_err(|e| format!("debts[{index}]: {e}"))?;
            Ok(debt)
        })
        .collect()
}

fn snapshot_from_parts(
    debts: Vec<DebtPayload>,
    monthly_budget: f64,
    redistribute_freed_minimums: bool,
) -> Result<Snapshot, String> {
    validate_monthly_budget(monthly_budget).map_err(|e| e.to_string())?;
    Ok(Snapshot {
        debts: debts_from_payload(debts)?,
        monthly_budget,
        options: SimulationOptions {
            redistribute_freed_minimums,
        },
    })
}

fn simulate_request_from_payload(payload: SimulatePayload) -> Result<SimulateRequest, String> {
    let snapshot = snapshot_from_parts(
        payload.debts,
        payload.monthly_budget,
        payload.redistribute_freed_minimums,
    )?;
    Ok(SimulateRequest {
        snapshot,
        strategy: payload.strategy.into(),
    })
}

fn compare_snapshot_from_payload(payload: ComparePayload) -> Result<Snapshot, String> {
    snapshot_from_parts(
        payload.debts,
        payload.monthly_budget,
        payload.redistribute_freed_minimums,
    )
}

#[cfg(test)]
fn simulate_request_from_json(json: &str) -> Result<SimulateRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    simulate_request_from_payload(payload)
}
