use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::report_metadata::TestKind;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::services::interpretation::{ColorClass, Severity};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub test_type: Option<String>,
    pub body: ReportBody,
    /// Sanitized HTML of the report content.
    pub content_html: String,
    /// PDF endpoint for typed reports, absent when export is unsupported.
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportBody {
    Sas(SasView),
    Pid5(Pid5View),
    Generic,
}

impl ReportBody {
    pub fn kind(&self) -> Option<TestKind> {
        match self {
            ReportBody::Sas(_) => Some(TestKind::Sas),
            ReportBody::Pid5(_) => Some(TestKind::Pid5),
            ReportBody::Generic => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SasView {
    pub factors: Vec<FactorRow>,
    pub orientation: Option<OrientationSummary>,
    pub bar_chart: Option<JsonValue>,
    pub pie_chart: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorRow {
    pub id: u8,
    pub name: String,
    pub description: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationSummary {
    pub scopi: f64,
    pub antiscopi: f64,
    pub scopi_percentage: String,
    pub antiscopi_percentage: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pid5View {
    pub domains: Vec<DomainCard>,
    pub top_facets: Vec<FacetRow>,
    pub radar_chart: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCard {
    pub key: String,
    pub label: String,
    pub mean: f64,
    /// Mean formatted with two decimals.
    pub value: String,
    pub severity: Severity,
    pub badge: String,
    pub color: ColorClass,
    pub border_class: String,
    pub text_class: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetRow {
    pub key: String,
    pub label: String,
    pub mean: f64,
    pub value: String,
    pub badge: String,
    pub color: ColorClass,
}

/// Confirmation page shown after a test is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub message: String,
    pub test: TestSummary,
    pub result: Option<TestResult>,
    pub report: Option<ReportPreview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
}

impl From<&Test> for TestSummary {
    fn from(test: &Test) -> Self {
        Self {
            id: test.id.to_string(),
            title: test.title.clone(),
            description: test.description.clone(),
            category: test.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPreview {
    pub id: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub url: String,
}

/// What the caller shows when a view cannot be produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPanel {
    pub message: String,
    pub action_label: String,
    pub action_url: String,
}

impl ErrorPanel {
    pub fn back_to_tests(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action_label: "Torna ai test".to_string(),
            action_url: "/tests".to_string(),
        }
    }
}
