// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP front for cert-manager webhook calls.
//!
//! cert-manager reaches a webhook solver at
//! `POST /apis/{group}/v1alpha1/{solverName}` with a `ChallengePayload`. This
//! module decodes the payload, dispatches it to the matching [`Solver`] and
//! echoes the payload back with its `response` filled in. Solver failures are
//! reported inside the response (`success: false`), not as HTTP errors, so
//! cert-manager records the message on the Challenge.
//!
//! TLS termination is left to the aggregated API server or proxy in front of
//! this process.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::challenge::{ChallengeAction, ChallengePayload, ChallengeRequest, ChallengeResponse};
use crate::constants::WEBHOOK_API_VERSION;
use crate::metrics;
use crate::solver::Solver;

/// Router state: the configured group and the registered solvers by name.
#[derive(Clone)]
pub struct WebhookState {
    group_name: Arc<str>,
    solvers: Arc<HashMap<String, Arc<dyn Solver>>>,
}

impl WebhookState {
    #[must_use]
    pub fn new(group_name: &str, solvers: Vec<Arc<dyn Solver>>) -> Self {
        let solvers = solvers
            .into_iter()
            .map(|solver| (solver.name().to_string(), solver))
            .collect();
        Self {
            group_name: Arc::from(group_name),
            solvers: Arc::new(solvers),
        }
    }
}

/// Build the webhook router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/apis/{group}/{version}/{solver}", post(solve))
        .with_state(state)
}

/// Serve the webhook on `addr` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_webhook_server(
    addr: SocketAddr,
    state: WebhookState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, group = %state.group_name, "Webhook server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

/// Run `request` through `solver` and build the response for cert-manager.
pub async fn dispatch(solver: &dyn Solver, request: &ChallengeRequest) -> ChallengeResponse {
    let start = Instant::now();
    let result = match request.action {
        ChallengeAction::Present => solver.present(request).await,
        ChallengeAction::CleanUp => solver.cleanup(request).await,
    };
    metrics::record_challenge(
        solver.name(),
        request.action.as_str(),
        result.is_ok(),
        start.elapsed(),
    );

    match result {
        Ok(()) => {
            info!(
                uid = %request.uid,
                action = request.action.as_str(),
                fqdn = %request.resolved_fqdn,
                elapsed = ?start.elapsed(),
                "Challenge request handled"
            );
            ChallengeResponse::success(&request.uid)
        }
        Err(e) => {
            error!(
                uid = %request.uid,
                action = request.action.as_str(),
                fqdn = %request.resolved_fqdn,
                error = %e,
                "Challenge request failed"
            );
            ChallengeResponse::failure(&request.uid, e.to_string())
        }
    }
}

async fn solve(
    State(state): State<WebhookState>,
    Path((group, version, solver_name)): Path<(String, String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Result<Json<ChallengePayload>, (StatusCode, String)> {
    if group != *state.group_name || version != WEBHOOK_API_VERSION {
        warn!(group = %group, version = %version, "Request for unknown API group");
        return Err((
            StatusCode::NOT_FOUND,
            format!("unknown API group {group}/{version}"),
        ));
    }

    let Some(solver) = state.solvers.get(&solver_name) else {
        warn!(solver = %solver_name, "Request for unknown solver");
        return Err((
            StatusCode::NOT_FOUND,
            format!("unknown solver {solver_name}"),
        ));
    };

    let Some(request) = payload.request.clone() else {
        return Err((
            StatusCode::BAD_REQUEST,
            "challenge payload has no request".to_string(),
        ));
    };

    let response = dispatch(solver.as_ref(), &request).await;
    Ok(Json(payload.respond(response)))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod webhook_tests;
