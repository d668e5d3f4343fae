use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::test_dto::CreateQuestionPayload;
use crate::error::{Error, Result};
use crate::models::question::Question;

const QUESTION_COLUMNS: &str = r#"id, text, type, options, "order", test_id"#;

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds a question to a test. Without an explicit `order` the question is
    /// appended after the current last one.
    pub async fn create_question(
        &self,
        test_id: Uuid,
        payload: CreateQuestionPayload,
    ) -> Result<Question> {
        let order = match payload.order {
            Some(order) => order,
            None => {
                sqlx::query_scalar::<_, i32>(
                    r#"SELECT COALESCE(MAX("order"), 0) + 1 FROM questions WHERE test_id = $1"#,
                )
                .bind(test_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (text, type, options, "order", test_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(payload.text)
        .bind(payload.question_type)
        .bind(payload.options)
        .bind(order)
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn get_question(&self, id: Uuid) -> Result<Question> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Domanda non trovata".to_string()))
    }

    pub async fn list_for_test(&self, test_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            r#"SELECT {} FROM questions WHERE test_id = $1 ORDER BY "order" ASC, id ASC"#,
            QUESTION_COLUMNS
        ))
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn delete_question(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
