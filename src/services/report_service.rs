use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::report_dto::CreateReportPayload;
use crate::error::{Error, Result};
use crate::models::report::Report;
use crate::models::report_metadata::ReportMetadata;
use crate::services::result_service::ResultService;

const REPORT_COLUMNS: &str = "id, title, summary, analysis, recommendations, conclusion, \
     test_id, test_result_id, user_id, created_at, included_graphs";

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores the report for a completed result. The analysis document must
    /// validate as report metadata and a result can carry one report only.
    pub async fn create_report(&self, payload: CreateReportPayload) -> Result<Report> {
        let metadata = ReportMetadata::parse_strict(&payload.analysis)
            .map_err(|e| Error::InvalidMetadata(e.to_string()))?;

        let result = ResultService::new(self.pool.clone())
            .get_result(payload.test_result_id)
            .await?;
        if !result.completed {
            return Err(Error::BadRequest(
                "Reports can only be created for completed results".to_string(),
            ));
        }

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (
                title, summary, analysis, recommendations, conclusion,
                test_id, test_result_id, user_id, included_graphs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(payload.title)
        .bind(payload.summary)
        .bind(payload.analysis)
        .bind(payload.recommendations.unwrap_or_else(|| serde_json::json!([])))
        .bind(payload.conclusion.unwrap_or_default())
        .bind(result.test_id)
        .bind(result.id)
        .bind(result.user_id)
        .bind(payload.included_graphs.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("A report already exists for this result".to_string())
            }
            other => other,
        })?;

        tracing::info!(
            report_id = %report.id,
            test_result_id = %report.test_result_id,
            test_type = ?metadata.test_type(),
            "report created"
        );
        Ok(report)
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Report non trovato".to_string()))
    }

    /// Reports linked to a result. The unique key keeps this at zero or one
    /// entry; the list shape matches `GET /api/reports?testResultId=`.
    pub async fn list_by_result(&self, test_result_id: Uuid) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE test_result_id = $1",
            REPORT_COLUMNS
        ))
        .bind(test_result_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE user_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn count_reports(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete_report(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
