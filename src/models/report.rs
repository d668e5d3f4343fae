use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub analysis: JsonValue,
    pub recommendations: JsonValue,
    pub conclusion: String,
    pub test_id: Uuid,
    pub test_result_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub included_graphs: bool,
}
