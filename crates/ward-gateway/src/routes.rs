//! Router assembly and `/v1` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use ward_approvals::{ApprovalStatus, CreateRequest, DecideRequest, Verdict};
use ward_policy::{EvalRequest, EvalResult, normalize_repo};
use ward_runlog::{RunEvent, new_run_id};

use crate::error::{GatewayError, GatewayResult};
use crate::security;
use crate::state::AppState;

/// Build the gateway router with security and tracing layers applied.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/policy/evaluate", post(evaluate_policy))
        .route("/approvals", post(create_approval).get(list_approvals))
        .route("/approvals/:id/decision", post(decide_approval))
        .route("/runs/:id/audit", get(run_audit));

    Router::new()
        .nest("/v1", v1)
        .layer(middleware::from_fn_with_state(state.clone(), security::guard))
        .layer(TraceLayer::new_for_http())
        .layer(security::cors_layer())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EvaluateBody {
    #[serde(default)]
    agent: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    requested_by: String,
}

async fn evaluate_policy(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> GatewayResult<Json<EvalResult>> {
    if body.command.trim().is_empty() && body.args.is_empty() {
        return Err(GatewayError::BadRequest("command is required".to_string()));
    }

    let repo = normalize_repo(&or_default(body.repo, state.work_dir()));
    let req = EvalRequest::new(body.command)
        .with_agent(body.agent.trim())
        .with_repo(repo)
        .with_args(body.args)
        .with_requested_by(body.requested_by.trim());

    Ok(Json(state.evaluator().evaluate(&req)))
}

#[derive(Debug, Deserialize)]
struct CreateApprovalBody {
    #[serde(default)]
    run_id: String,
    #[serde(default)]
    command: String,
    #[serde(default)]
    requested_by: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    ttl_seconds: u64,
}

async fn create_approval(
    State(state): State<AppState>,
    Json(body): Json<CreateApprovalBody>,
) -> GatewayResult<Response> {
    let command = body.command.trim().to_string();
    if command.is_empty() {
        return Err(GatewayError::BadRequest("command is required".to_string()));
    }

    let repo = normalize_repo(&or_default(body.repo, state.work_dir()));
    let eval = state.evaluator().evaluate(
        &EvalRequest::new(&command)
            .with_agent("dashboard")
            .with_repo(repo.clone())
            .with_requested_by(body.requested_by.trim()),
    );

    let mut input = CreateRequest::new(&command, eval.class, eval.decision)
        .with_requested_by(or_default(body.requested_by, "dashboard"))
        .with_repo(repo)
        .with_reason(or_default(body.reason, &eval.reason));
    let run_id = body.run_id.trim();
    if !run_id.is_empty() {
        input = input.with_run_id(run_id);
    }
    if body.ttl_seconds > 0 {
        input = input.with_ttl(Duration::from_secs(body.ttl_seconds));
    }

    let approval = state.approvals().create(input)?;

    // Best effort: a failed audit append must not fail the create.
    let event_run = approval.run_id.clone().unwrap_or_else(new_run_id);
    let event = RunEvent::new(event_run, "approval_requested")
        .with_state("awaiting_approval")
        .with_policy_decision(eval.decision.as_str())
        .with_payload_entry("approval_id", approval.id.clone())
        .with_payload_entry("command", approval.command.clone())
        .with_payload_entry("class", approval.class.as_str());
    if let Err(e) = state.run_log().append(event) {
        tracing::debug!(error = %e, "failed to record approval_requested event");
    }

    Ok((StatusCode::CREATED, Json(approval)).into_response())
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: String,
}

async fn list_approvals(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Json<Vec<ward_approvals::ApprovalRequest>>> {
    let filter = match query.status.trim() {
        "" => None,
        raw => Some(ApprovalStatus::from_str(raw).map_err(GatewayError::BadRequest)?),
    };
    Ok(Json(state.approvals().list(filter)?))
}

#[derive(Debug, Deserialize)]
struct DecisionBody {
    #[serde(default)]
    decision: String,
    #[serde(default)]
    approver: String,
    #[serde(default)]
    rationale: String,
}

async fn decide_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> GatewayResult<Json<ward_approvals::ApprovalRequest>> {
    let verdict = Verdict::from_str(&body.decision).map_err(GatewayError::BadRequest)?;

    let updated = state.approvals().decide(
        DecideRequest::new(id, verdict)
            .with_approver(or_default(body.approver, "dashboard"))
            .with_rationale(body.rationale.trim()),
    )?;

    let event_run = updated.run_id.clone().unwrap_or_else(new_run_id);
    let event = RunEvent::new(event_run, "approval_decided")
        .with_state("approval_decided")
        .with_policy_decision(updated.policy_decision.as_str())
        .with_payload_entry("approval_id", updated.id.clone())
        .with_payload_entry("status", updated.status.as_str())
        .with_payload_entry("approver", updated.decided_by.clone())
        .with_payload_entry("rationale", updated.decision_rationale.clone());
    if let Err(e) = state.run_log().append(event) {
        tracing::debug!(error = %e, "failed to record approval_decided event");
    }

    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
struct AuditResponse {
    run_id: String,
    events: Vec<RunEvent>,
}

async fn run_audit(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> GatewayResult<Json<AuditResponse>> {
    let run_id = run_id.trim().to_string();
    let events = state.run_log().read_run(&run_id)?;
    Ok(Json(AuditResponse { run_id, events }))
}

fn or_default(value: String, fallback: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        fallback.to_string()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use ward_core::WorkspaceRoot;

    fn workspace(dir: &std::path::Path) -> WorkspaceRoot {
        let ws = WorkspaceRoot::from_path(dir);
        ws.ensure().unwrap();
        ws
    }

    fn app(ws: &WorkspaceRoot) -> Router {
        router(AppState::for_workspace(ws).with_token(None))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_evaluate_safe_command() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());
        let (status, body) = send(
            app(&ws),
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "allow");
        assert_eq!(body["class"], "class0_safe");
    }

    #[tokio::test]
    async fn test_evaluate_requires_command() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());
        let (status, body) =
            send(app(&ws), json_request("POST", "/v1/policy/evaluate", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("command"));
    }

    #[tokio::test]
    async fn test_create_approval_created_and_audited() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());

        let (status, body) = send(
            app(&ws),
            json_request(
                "POST",
                "/v1/approvals",
                json!({"command": "git push origin main", "run_id": "run-77"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert!(body["id"].as_str().unwrap().starts_with("apr-"));
        assert_eq!(body["requested_by"], "dashboard");

        let (status, audit) = send(
            app(&ws),
            Request::builder()
                .uri("/v1/runs/run-77/audit")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audit["events"][0]["event_type"], "approval_requested");
    }

    #[tokio::test]
    async fn test_decide_unknown_approval_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());
        let (status, _) = send(
            app(&ws),
            json_request(
                "POST",
                "/v1/approvals/apr-missing/decision",
                json!({"decision": "approve"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_decide_then_redecide_conflicts() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());

        let (_, created) = send(
            app(&ws),
            json_request("POST", "/v1/approvals", json!({"command": "git push"})),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, decided) = send(
            app(&ws),
            json_request(
                "POST",
                &format!("/v1/approvals/{id}/decision"),
                json!({"decision": "approve", "rationale": "release window"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decided["status"], "approved");
        assert_eq!(decided["decided_by"], "dashboard");

        let (status, _) = send(
            app(&ws),
            json_request(
                "POST",
                &format!("/v1/approvals/{id}/decision"),
                json!({"decision": "deny"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_decision_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());
        let (status, _) = send(
            app(&ws),
            json_request(
                "POST",
                "/v1/approvals/apr-x/decision",
                json!({"decision": "maybe"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());

        send(
            app(&ws),
            json_request("POST", "/v1/approvals", json!({"command": "git push"})),
        )
        .await;

        let (status, body) = send(
            app(&ws),
            Request::builder()
                .uri("/v1/approvals?status=pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(
            app(&ws),
            Request::builder()
                .uri("/v1/approvals?status=denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = send(
            app(&ws),
            Request::builder()
                .uri("/v1/approvals?status=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_gating() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());
        let guarded = || {
            router(AppState::for_workspace(&ws).with_token(Some("sesame".to_string())))
        };

        let (status, _) = send(
            guarded(),
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request =
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"}));
        request.headers_mut().insert(
            "x-ward-dashboard-token",
            header::HeaderValue::from_static("sesame"),
        );
        let (status, _) = send(guarded(), request).await;
        assert_eq!(status, StatusCode::OK);

        let mut request =
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"}));
        request.headers_mut().insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_static("Bearer sesame"),
        );
        let (status, _) = send(guarded(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_foreign_origin_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path());

        let mut request =
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"}));
        request.headers_mut().insert(
            header::ORIGIN,
            header::HeaderValue::from_static("https://example.com"),
        );
        let (status, _) = send(app(&ws), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mut request =
            json_request("POST", "/v1/policy/evaluate", json!({"command": "git status"}));
        request.headers_mut().insert(
            header::ORIGIN,
            header::HeaderValue::from_static("http://localhost:5173"),
        );
        let (status, _) = send(app(&ws), request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
