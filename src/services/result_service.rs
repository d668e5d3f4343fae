use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::test_dto::ResultStats;
use crate::error::{Error, Result};
use crate::models::test_answer::TestAnswer;
use crate::models::test_result::TestResult;
use crate::services::question_service::QuestionService;

const RESULT_COLUMNS: &str = "id, test_id, user_id, score, completed, started_at, completed_at";

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn start_result(&self, test_id: Uuid, user_id: Uuid) -> Result<TestResult> {
        let result = sqlx::query_as::<_, TestResult>(&format!(
            "INSERT INTO test_results (test_id, user_id) VALUES ($1, $2) RETURNING {}",
            RESULT_COLUMNS
        ))
        .bind(test_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(result_id = %result.id, test_id = %test_id, user_id = %user_id, "test started");
        Ok(result)
    }

    pub async fn get_result(&self, id: Uuid) -> Result<TestResult> {
        sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {} FROM test_results WHERE id = $1",
            RESULT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Risultato non trovato".to_string()))
    }

    /// Marks a result completed. Completing twice is rejected so the
    /// completion time stays the first one.
    pub async fn complete_result(&self, id: Uuid, score: Option<f64>) -> Result<TestResult> {
        let updated = sqlx::query_as::<_, TestResult>(&format!(
            r#"
            UPDATE test_results
            SET completed = TRUE, completed_at = NOW(), score = COALESCE($1, score)
            WHERE id = $2 AND completed = FALSE
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(score)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(result) => {
                tracing::info!(result_id = %id, score = ?result.score, "test completed");
                Ok(result)
            }
            None => {
                // Distinguish a missing result from one that is already closed.
                self.get_result(id).await?;
                Err(Error::Conflict("Test già completato".to_string()))
            }
        }
    }

    /// Results for one user on one test, most recent first.
    pub async fn list_for_test_and_user(&self, test_id: Uuid, user_id: Uuid) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(&format!(
            r#"
            SELECT {}
            FROM test_results
            WHERE test_id = $1 AND user_id = $2
            ORDER BY started_at DESC, id DESC
            "#,
            RESULT_COLUMNS
        ))
        .bind(test_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    pub async fn latest_for_test_and_user(
        &self,
        test_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TestResult>> {
        Ok(self
            .list_for_test_and_user(test_id, user_id)
            .await?
            .into_iter()
            .next())
    }

    /// Stores the answer to one question, replacing an earlier answer to the
    /// same question. The question must belong to the result's test and the
    /// value must fit the question type.
    pub async fn save_answer(
        &self,
        result_id: Uuid,
        question_id: Uuid,
        value: String,
    ) -> Result<TestAnswer> {
        let result = self.get_result(result_id).await?;
        if result.completed {
            return Err(Error::Conflict("Test già completato".to_string()));
        }

        let question = QuestionService::new(self.pool.clone())
            .get_question(question_id)
            .await?;
        if question.test_id != result.test_id {
            return Err(Error::BadRequest(
                "Question does not belong to this test".to_string(),
            ));
        }
        if !question.accepts(&value) {
            return Err(Error::BadRequest(format!(
                "Value '{}' is not valid for question {}",
                value, question.id
            )));
        }

        let answer = sqlx::query_as::<_, TestAnswer>(
            r#"
            INSERT INTO test_answers (question_id, test_result_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (test_result_id, question_id) DO UPDATE SET value = EXCLUDED.value
            RETURNING id, question_id, test_result_id, value
            "#,
        )
        .bind(question_id)
        .bind(result_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(answer)
    }

    pub async fn list_answers(&self, result_id: Uuid) -> Result<Vec<TestAnswer>> {
        let answers = sqlx::query_as::<_, TestAnswer>(
            r#"
            SELECT a.id, a.question_id, a.test_result_id, a.value
            FROM test_answers a
            JOIN questions q ON q.id = a.question_id
            WHERE a.test_result_id = $1
            ORDER BY q."order" ASC
            "#,
        )
        .bind(result_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    pub async fn stats_for_test(&self, test_id: Uuid) -> Result<ResultStats> {
        let stats = sqlx::query_as::<_, ResultStats>(
            r#"
            SELECT
                COUNT(*) AS count,
                COUNT(*) FILTER (WHERE completed) AS completed,
                AVG(score) FILTER (WHERE completed) AS average_score
            FROM test_results
            WHERE test_id = $1
            "#,
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
