//! Service-level error and its HTTP rendering.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::draft::DraftError;
use crate::protocol::ApiErr;
use crate::scaler::ScaleError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),
  #[error("scenario `{0}` not found")]
  NotFound(String),
  #[error("resource `{0}` not found")]
  ResourceNotFound(String),
  #[error(transparent)]
  Scale(#[from] ScaleError),
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error(transparent)]
  Draft(#[from] DraftError),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::Scale(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
      AppError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
      AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Draft(DraftError::Incomplete { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Draft(DraftError::Disabled(_)) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Draft(_) => StatusCode::BAD_GATEWAY,
    }
  }

  /// User-facing message (Korean, like the rest of the UI) plus optional details.
  fn body(&self) -> ApiErr {
    let (message, details) = match self {
      AppError::Validation(msg) => (msg.clone(), None),
      AppError::NotFound(_) => ("시나리오를 찾을 수 없습니다.".to_string(), None),
      AppError::ResourceNotFound(_) => ("자료를 찾을 수 없습니다.".to_string(), None),
      AppError::Scale(e) => ("시간 배분을 계산할 수 없습니다.".to_string(), Some(json!(e.to_string()))),
      AppError::Store(e) => ("시나리오 저장소 처리 중 오류가 발생했습니다.".to_string(), Some(json!(e.to_string()))),
      AppError::Draft(DraftError::Incomplete { missing, partial }) => (
        "시나리오 생성이 불완전합니다. 누락된 필드가 있습니다.".to_string(),
        Some(json!({ "missingFields": missing, "partialData": partial })),
      ),
      AppError::Draft(DraftError::Disabled(_)) => ("API 키가 설정되지 않았습니다.".to_string(), Some(json!(self.to_string()))),
      AppError::Draft(DraftError::Unavailable(_)) => ("AI 응답을 파싱하는 중 오류가 발생했습니다.".to_string(), Some(json!(self.to_string()))),
      AppError::Draft(_) => ("AI 시나리오 생성 중 오류가 발생했습니다.".to_string(), Some(json!(self.to_string()))),
    };
    ApiErr { success: false, error: message, details }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "debate_tutor", %status, error = %self, "Request failed");
    } else {
      warn!(target: "debate_tutor", %status, error = %self, "Request rejected");
    }
    (status, Json(self.body())).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::NotFound("id".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::ResourceNotFound("id".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::from(ScaleError::InvalidTarget(0)).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::from(DraftError::Disabled("openai")).status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(AppError::from(DraftError::Unavailable("x".into())).status(), StatusCode::BAD_GATEWAY);
    let incomplete = DraftError::Incomplete { missing: vec!["topic".into()], partial: json!({}) };
    assert_eq!(AppError::from(incomplete).status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[test]
  fn incomplete_draft_lists_missing_fields() {
    let err = AppError::from(DraftError::Incomplete { missing: vec!["background".into()], partial: json!({"title": "t"}) });
    let body = serde_json::to_value(err.body()).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["details"]["missingFields"][0], "background");
    assert_eq!(body["details"]["partialData"]["title"], "t");
  }
}
