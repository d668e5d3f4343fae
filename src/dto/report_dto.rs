use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::report::Report;

fn default_true() -> bool {
    true
}

/// Wire shape of a report as served by `GET /api/reports/{id}`.
///
/// `content` holds the report body (literal HTML or `{"html": ...}`) and
/// `metadata` the typed analysis document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: JsonValue,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_result_id: Option<String>,
    #[serde(default)]
    pub recommendations: JsonValue,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default = "default_true")]
    pub included_graphs: bool,
}

impl From<Report> for ReportPayload {
    fn from(report: Report) -> Self {
        Self {
            id: report.id.to_string(),
            title: report.title,
            content: report.summary,
            metadata: report.analysis,
            created_at: Some(report.created_at),
            test_result_id: Some(report.test_result_id.to_string()),
            recommendations: report.recommendations,
            conclusion: report.conclusion,
            included_graphs: report.included_graphs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report: ReportPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub summary: String,
    pub analysis: JsonValue,
    pub recommendations: Option<JsonValue>,
    pub conclusion: Option<String>,
    pub test_result_id: Uuid,
    pub included_graphs: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub test_result_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfQuery {
    pub report_id: Uuid,
}
