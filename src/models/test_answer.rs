use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TestAnswer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub test_result_id: Uuid,
    pub value: String,
}
