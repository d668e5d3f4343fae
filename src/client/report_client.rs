use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::Url;

use crate::client::error::{ClientError, ClientResult};
use crate::dto::report_dto::{ReportEnvelope, ReportPayload};
use crate::dto::view_dto::{ReportView, ResultSummary};
use crate::models::report_metadata::TestKind;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::services::pdf_service::pdf_filename;
use crate::services::report_view_service::{pdf_path, ReportViewService};
use crate::services::summary_service::assemble_summary;

/// A downloaded report PDF, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct PdfDownload {
    pub filename: String,
    pub bytes: Bytes,
}

impl PdfDownload {
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> ClientResult<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!(path = %path.display(), size = self.bytes.len(), "report PDF saved");
        Ok(path)
    }
}

/// PDF export kind from the raw `metadata.testType`, independent of whether
/// the rest of the metadata is well formed.
pub fn export_kind(report: &ReportPayload) -> Option<TestKind> {
    report
        .metadata
        .get("testType")
        .and_then(JsonValue::as_str)
        .and_then(TestKind::from_test_type)
}

/// HTTP consumer of the report API.
#[derive(Clone)]
pub struct ReportClient {
    base_url: Url,
    http: Client,
    token: Option<String>,
}

impl ReportClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            base_url: Url::parse(base_url)?,
            http,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn get(&self, path_and_query: &str) -> ClientResult<RequestBuilder> {
        let url = self.base_url.join(path_and_query)?;
        let request = self.http.get(url);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// Sends a GET and turns non-OK statuses into errors. With `what` set, 404
    /// maps to `NotFound`; every other failure keeps the body text.
    async fn fetch(
        &self,
        path_and_query: &str,
        what: Option<&'static str>,
    ) -> ClientResult<Response> {
        let response = self.get(path_and_query)?.send().await.map_err(|e| {
            tracing::error!(error = %e, path = path_and_query, "request failed");
            ClientError::Http(e)
        })?;

        let status = response.status();
        if let (StatusCode::NOT_FOUND, Some(what)) = (status, what) {
            return Err(ClientError::NotFound { what });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, path = path_and_query, "request rejected");
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        what: &'static str,
    ) -> ClientResult<T> {
        let response = self.fetch(path_and_query, Some(what)).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!(error = %e, path = path_and_query, "response could not be decoded");
            ClientError::Http(e)
        })
    }

    pub async fn fetch_report(&self, report_id: &str) -> ClientResult<ReportPayload> {
        let envelope: ReportEnvelope = self
            .fetch_json(&format!("/api/reports/{}", report_id), "Report")
            .await?;
        Ok(envelope.report)
    }

    pub async fn report_view(&self, report_id: &str) -> ClientResult<ReportView> {
        let report = self.fetch_report(report_id).await?;
        Ok(ReportViewService::build(&report))
    }

    /// Downloads the PDF for a typed report. Reports whose type has no PDF
    /// endpoint are rejected before any request is sent. Failures, 404
    /// included, carry the server's message.
    pub async fn download_pdf(&self, report: &ReportPayload) -> ClientResult<PdfDownload> {
        let Some(kind) = export_kind(report) else {
            let test_type = report
                .metadata
                .get("testType")
                .and_then(JsonValue::as_str)
                .map(str::to_string);
            tracing::warn!(report_id = %report.id, test_type = ?test_type, "PDF export not supported");
            return Err(ClientError::UnsupportedTestType(test_type));
        };

        let response = self.fetch(&pdf_path(kind, &report.id), None).await?;
        let bytes = response.bytes().await?;

        let filename = pdf_filename(kind, crate::utils::time::today());
        tracing::info!(report_id = %report.id, filename = %filename, size = bytes.len(), "report PDF downloaded");
        Ok(PdfDownload { filename, bytes })
    }

    /// Test, latest result for the caller, then that result's report. The
    /// calls are sequential since each needs the previous answer.
    pub async fn fetch_result_summary(&self, test_id: &str) -> ClientResult<ResultSummary> {
        let test: Test = self
            .fetch_json(&format!("/api/tests/{}", test_id), "Test")
            .await?;
        let results: Vec<TestResult> = self
            .fetch_json(&format!("/api/tests/{}/results", test_id), "Risultato")
            .await?;
        let latest = results.into_iter().next();

        let report = match &latest {
            Some(result) => {
                let reports: Vec<ReportPayload> = self
                    .fetch_json(
                        &format!("/api/reports?testResultId={}", result.id),
                        "Report",
                    )
                    .await?;
                reports.into_iter().next()
            }
            None => None,
        };

        Ok(assemble_summary(&test, latest, report.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_with(metadata: JsonValue) -> ReportPayload {
        serde_json::from_value(json!({ "id": "r1", "metadata": metadata })).unwrap()
    }

    #[test]
    fn export_kind_reads_raw_test_type() {
        assert_eq!(export_kind(&report_with(json!({"testType": "sas"}))), Some(TestKind::Sas));
        assert_eq!(
            export_kind(&report_with(json!({"testType": "pid5", "domainScores": 3}))),
            Some(TestKind::Pid5)
        );
        assert_eq!(export_kind(&report_with(json!({"testType": "mmpi"}))), None);
        assert_eq!(export_kind(&report_with(JsonValue::Null)), None);
    }

    #[tokio::test]
    async fn unsupported_type_fails_without_network() {
        // Nothing listens on port 9; reaching the network would yield Http.
        let client = ReportClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .download_pdf(&report_with(json!({"testType": "other"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedTestType(Some(ref t)) if t == "other"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ReportClient::new("not a url"),
            Err(ClientError::Url(_))
        ));
    }
}
