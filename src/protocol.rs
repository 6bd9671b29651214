//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::config::DraftProvider;
use crate::domain::{Activity, ScenarioDetails, Stages};
use crate::draft::ScenarioDraft;
use crate::timer::TimerSnapshot;
use crate::walker::Progress;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Open {
        #[serde(rename = "scenarioId")]
        scenario_id: String,
    },
    Next,
    Previous,
    TimerToggle,
    TimerReset,
    CloseSession,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Activity {
        #[serde(rename = "scenarioId")]
        scenario_id: String,
        stage: StageOut,
        activity: Activity,
        progress: Progress,
        timer: TimerSnapshot,
    },
    Timer {
        timer: TimerSnapshot,
    },
    TimerExpired {
        #[serde(rename = "activityId")]
        activity_id: String,
    },
    SessionComplete {
        #[serde(rename = "scenarioId")]
        scenario_id: String,
    },
    Error {
        message: String,
    },
}

/// Stage header shown above the current activity.
#[derive(Debug, Serialize)]
pub struct StageOut {
    pub id: String,
    pub title: String,
}

//
// HTTP envelope
//

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiOk<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiOk<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ "success": false, "error": ..., "details": ... }`
#[derive(Debug, Serialize)]
pub struct ApiErr {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub grade: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScaledQuery {
    #[serde(rename = "totalMinutes")]
    pub total_minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOut {
    pub total_minutes: u32,
    pub activity_count: usize,
    pub stages: Stages,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledTemplateOut {
    pub target_minutes: u32,
    pub total_minutes: u32,
    pub drift_minutes: i64,
    pub max_drift_minutes: f64,
    pub stages: Stages,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsOut {
    pub topics: Vec<&'static str>,
    pub grades: Vec<&'static str>,
    pub subjects: Vec<&'static str>,
}

/// Library listing entry; the full document is served by id.
#[derive(Debug, Serialize)]
pub struct ResourceSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftIn {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub provider: Option<DraftProvider>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOut {
    pub provider: DraftProvider,
    pub draft: ScenarioDraft,
    /// Ready to send back as `scenarioDetails` when the draft is saved.
    pub scenario_details: ScenarioDetails,
    pub suggested_duration_minutes: u32,
    pub suggested_group_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub storage: &'static str,
    pub draft_providers: Vec<&'static str>,
}
