use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::report_dto::ReportPayload;
use crate::dto::view_dto::{ReportPreview, ResultSummary, TestSummary};
use crate::error::Result;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::services::report_service::ReportService;
use crate::services::result_service::ResultService;
use crate::services::test_service::TestService;

pub const COMPLETION_MESSAGE: &str = "Grazie per aver completato il test";

/// Assembles the confirmation page once the test, the latest result and the
/// linked report have been looked up.
pub fn assemble_summary(
    test: &Test,
    result: Option<TestResult>,
    report: Option<&ReportPayload>,
) -> ResultSummary {
    let report = report.map(|r| ReportPreview {
        id: r.id.clone(),
        title: r.title.clone(),
        created_at: r.created_at,
        url: format!("/api/reports/{}/view", r.id),
    });
    ResultSummary {
        message: COMPLETION_MESSAGE.to_string(),
        test: TestSummary::from(test),
        result,
        report,
    }
}

#[derive(Clone)]
pub struct SummaryService {
    tests: TestService,
    results: ResultService,
    reports: ReportService,
}

impl SummaryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tests: TestService::new(pool.clone()),
            results: ResultService::new(pool.clone()),
            reports: ReportService::new(pool),
        }
    }

    /// Test, then latest result, then its report. Each lookup depends on the
    /// previous one so they run in order.
    pub async fn result_summary(&self, test_id: Uuid, user_id: Uuid) -> Result<ResultSummary> {
        let test = self.tests.get_test_by_id(test_id).await?;
        let result = self
            .results
            .latest_for_test_and_user(test_id, user_id)
            .await?;

        let report = match &result {
            Some(result) => self
                .reports
                .list_by_result(result.id)
                .await?
                .into_iter()
                .next()
                .map(ReportPayload::from),
            None => None,
        };

        tracing::debug!(
            test_id = %test_id,
            user_id = %user_id,
            has_result = result.is_some(),
            has_report = report.is_some(),
            "result summary assembled"
        );
        Ok(assemble_summary(&test, result, report.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_test() -> Test {
        Test {
            id: Uuid::new_v4(),
            title: "PID-5".into(),
            description: "Inventario di personalità".into(),
            instructions: String::new(),
            category: "personalita".into(),
            published: true,
            creator_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn summary_without_report_omits_section() {
        let test = sample_test();
        let summary = assemble_summary(&test, None, None);
        assert_eq!(summary.message, COMPLETION_MESSAGE);
        assert_eq!(summary.test.id, test.id.to_string());
        assert!(summary.result.is_none());
        assert!(summary.report.is_none());
    }

    #[test]
    fn summary_links_report_view() {
        let test = sample_test();
        let report: ReportPayload = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "title": "Profilo PID-5"
        }))
        .unwrap();
        let summary = assemble_summary(&test, None, Some(&report));
        let preview = summary.report.unwrap();
        assert_eq!(preview.title, "Profilo PID-5");
        assert_eq!(preview.url, "/api/reports/r1/view");
    }
}
