//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::{ScenarioInput, ScenarioPatch};
use crate::error::AppError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, storage: state.store.backend(), draft_providers: state.draft_providers() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_template(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ApiOk::new(base_template(&state)))
}

#[instrument(level = "info", skip(state), fields(total = q.total_minutes))]
pub async fn http_get_scaled_template(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScaledQuery>,
) -> Result<impl IntoResponse, AppError> {
  let preview = preview_template(&state, q.total_minutes)?;
  info!(target: "scenario", target_minutes = preview.target_minutes, scaled = preview.total_minutes, "HTTP template preview served");
  Ok(Json(ApiOk::new(preview)))
}

#[instrument(level = "info")]
pub async fn http_get_topics() -> impl IntoResponse {
  Json(ApiOk::new(topics()))
}

#[instrument(level = "info")]
pub async fn http_list_resources() -> impl IntoResponse {
  Json(ApiOk::new(resources()))
}

#[instrument(level = "info", fields(%id))]
pub async fn http_get_resource(Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
  Ok(Json(ApiOk::new(resource(&id)?)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_scenarios(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
  let list = list_scenarios(&state, &q).await?;
  Ok(Json(ApiOk::new(list)))
}

#[instrument(level = "info", skip(state, body), fields(title_len = body.title.len(), total = body.total_duration_minutes))]
pub async fn http_create_scenario(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ScenarioInput>,
) -> Result<impl IntoResponse, AppError> {
  let created = create_scenario(&state, body).await?;
  Ok((StatusCode::CREATED, Json(ApiOk::new(created))))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_scenario(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(ApiOk::new(get_scenario(&state, &id).await?)))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_update_scenario(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ScenarioPatch>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(ApiOk::new(update_scenario(&state, &id, body).await?)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_scenario(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  delete_scenario(&state, &id).await?;
  Ok(Json(ApiOk::new(json!({ "id": id }))))
}

#[instrument(level = "info", skip(state, body), fields(provider = ?body.provider))]
pub async fn http_post_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftIn>,
) -> Result<impl IntoResponse, AppError> {
  let out = generate_draft(&state, body).await?;
  info!(target: "scenario", provider = out.provider.as_str(), "HTTP draft served");
  Ok(Json(ApiOk::new(out)))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{body::{to_bytes, Body}, http::{Method, Request}, Router};
  use serde_json::Value;
  use tower::ServiceExt;

  use super::*;
  use crate::draft::Drafters;
  use crate::logic::tests::{test_state, EchoDrafter};
  use crate::routes::build_router;

  fn app(drafters: Drafters) -> Router {
    build_router(Arc::new(test_state(drafters)))
  }

  async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        req = req.header("content-type", "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, json)
  }

  #[tokio::test]
  async fn health_and_static_data() {
    let app = app(Drafters::default());
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["storage"], "memory");

    let (_, body) = call(&app, Method::GET, "/api/v1/template", None).await;
    assert_eq!(body["data"]["totalMinutes"], 120);
    assert_eq!(body["data"]["stages"]["stage2"]["activities"].as_array().map(Vec::len), Some(5));

    let (status, body) = call(&app, Method::GET, "/api/v1/template/scaled?totalMinutes=90", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMinutes"], 93);
    assert_eq!(body["data"]["stages"]["stage1"]["activities"][0]["durationMinutes"], 8);

    let (status, body) = call(&app, Method::GET, "/api/v1/template/scaled?totalMinutes=3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = call(&app, Method::GET, "/api/v1/topics", None).await;
    assert!(body["data"]["topics"].as_array().is_some_and(|t| !t.is_empty()));
  }

  #[tokio::test]
  async fn scenario_crud_round_trip() {
    let app = app(Drafters::default());
    let (status, created) = call(
      &app,
      Method::POST,
      "/api/v1/scenarios",
      Some(json!({ "title": "교복 토론", "totalDurationMinutes": 60, "grade": "5-6학년", "groupCount": 4 })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let created_at = created["data"]["createdAt"].clone();

    let (status, fetched) = call(&app, Method::GET, &format!("/api/v1/scenarios/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["title"], "교복 토론");

    let (status, updated) = call(
      &app,
      Method::PUT,
      &format!("/api/v1/scenarios/{id}"),
      Some(json!({ "title": "교복 자율화 토론" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "교복 자율화 토론");
    assert_eq!(updated["data"]["createdAt"], created_at);
    assert_eq!(updated["data"]["groupCount"], 4);

    let (_, listed) = call(&app, Method::GET, "/api/v1/scenarios?search=%EC%9E%90%EC%9C%A8", None).await;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/scenarios/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/scenarios/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn create_validation_errors() {
    let app = app(Drafters::default());
    let (status, body) = call(&app, Method::POST, "/api/v1/scenarios", Some(json!({ "title": "  ", "totalDurationMinutes": 60 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::POST, "/api/v1/scenarios", Some(json!({ "title": "제목", "totalDurationMinutes": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::POST, "/api/v1/scenarios", Some(json!({ "title": "제목", "totalDurationMinutes": 4294967295u64 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, listed) = call(&app, Method::GET, "/api/v1/scenarios", None).await;
    assert_eq!(listed["data"], json!([]));
  }

  #[tokio::test]
  async fn missing_scenarios_are_404() {
    let app = app(Drafters::default());
    let (status, _) = call(&app, Method::PUT, "/api/v1/scenarios/missing", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, "/api/v1/scenarios/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn drafts_need_a_provider() {
    let (status, body) = call(&app(Drafters::default()), Method::POST, "/api/v1/drafts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let with_openai = app(Drafters { openai: Some(Arc::new(EchoDrafter)), ..Default::default() });
    let (status, body) = call(&with_openai, Method::POST, "/api/v1/drafts", Some(json!({ "topic": "급식" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["provider"], "openai");
    assert_eq!(body["data"]["draft"]["title"], "급식");

    let (status, _) = call(&with_openai, Method::POST, "/api/v1/drafts", Some(json!({ "provider": "gemini" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test]
  async fn resources_library() {
    let app = app(Drafters::default());
    let (status, body) = call(&app, Method::GET, "/api/v1/resources", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"].as_array().unwrap().iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["rules", "argument-template", "reflection-questions", "follow-up-activities"]);
    assert_eq!(body["data"][0]["title"], "토론 규칙 및 예절");
    assert!(body["data"][0].get("sections").is_none());

    let (status, body) = call(&app, Method::GET, "/api/v1/resources/argument-template", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "입론서 양식");
    assert_eq!(body["data"]["sections"][0]["items"][1], "나의 입장: □ 찬성 □ 반대");
    assert!(body["data"]["note"].is_string());

    let (status, body) = call(&app, Method::GET, "/api/v1/resources/reflection-questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sections"][0]["ordered"], true);
    assert!(body["data"].get("note").is_none());

    let (status, body) = call(&app, Method::GET, "/api/v1/resources/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "자료를 찾을 수 없습니다.");
  }

  #[tokio::test]
  async fn draft_saves_as_scenario() {
    let app = app(Drafters { openai: Some(Arc::new(EchoDrafter)), ..Default::default() });
    let (status, drafted) = call(&app, Method::POST, "/api/v1/drafts", Some(json!({ "topic": "급식 잔반" }))).await;
    assert_eq!(status, StatusCode::OK);
    let d = &drafted["data"];
    assert_eq!(d["scenarioDetails"]["background"], d["draft"]["background"]);
    assert_eq!(d["scenarioDetails"]["keyQuestions"], d["draft"]["keyQuestions"]);

    let (status, created) = call(
      &app,
      Method::POST,
      "/api/v1/scenarios",
      Some(json!({
        "title": d["draft"]["title"],
        "topic": d["draft"]["topic"],
        "keywords": d["draft"]["keywords"],
        "totalDurationMinutes": d["suggestedDurationMinutes"],
        "groupCount": d["suggestedGroupCount"],
        "aiGenerated": true,
        "scenarioDetails": d["scenarioDetails"],
      })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, fetched) = call(&app, Method::GET, &format!("/api/v1/scenarios/{id}"), None).await;
    assert_eq!(fetched["data"]["title"], "급식 잔반");
    assert_eq!(fetched["data"]["aiGenerated"], true);
    assert_eq!(fetched["data"]["scenarioDetails"], d["scenarioDetails"]);
  }
}
