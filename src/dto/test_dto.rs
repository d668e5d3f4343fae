use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::question::QuestionType;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(email)]
    pub email: String,
    pub name: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, serde::Deserialize, Default)]
#[serde(default)]
pub struct ListTestsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub published: Option<bool>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Option<JsonValue>,
    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerPayload {
    pub question_id: uuid::Uuid,
    #[validate(length(max = 10000))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteResultPayload {
    #[validate(range(min = 0.0))]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResultStats {
    pub count: i64,
    pub completed: i64,
    pub average_score: Option<f64>,
}

/// Admin dashboard totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub users: i64,
    pub tests: i64,
    pub reports: i64,
}
