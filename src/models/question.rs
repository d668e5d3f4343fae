use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "question_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    Scale,
    Text,
    TrueFalse,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Option<JsonValue>,
    pub order: i32,
    pub test_id: Uuid,
}

impl Question {
    /// Checks a raw answer value against the question's shape.
    ///
    /// Scale answers must be integers; multiple choice answers must name one of
    /// the listed options when options are present.
    pub fn accepts(&self, value: &str) -> bool {
        match self.question_type {
            QuestionType::Text => true,
            QuestionType::TrueFalse => matches!(value, "true" | "false"),
            QuestionType::Scale => value.trim().parse::<i64>().is_ok(),
            QuestionType::MultipleChoice => match self.options.as_ref().and_then(|o| o.as_array()) {
                Some(options) => options.iter().any(|o| match o {
                    JsonValue::String(s) => s == value,
                    other => other.to_string() == value,
                }),
                None => true,
            },
        }
    }
}
