use std::sync::{Arc, Mutex};

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use psytest_backend::client::{ClientError, ReportClient};
use psytest_backend::dto::view_dto::ReportBody;
use psytest_backend::services::interpretation::ColorClass;
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;

type Calls = Arc<Mutex<Vec<String>>>;

/// Serves a fixed report API on an ephemeral port and records every
/// request target it receives.
async fn spawn_api(reports: JsonValue) -> (String, Calls) {
    let calls: Calls = Arc::default();

    async fn report(
        State((reports, calls)): State<(JsonValue, Calls)>,
        OriginalUri(uri): OriginalUri,
        Path(id): Path<String>,
    ) -> impl IntoResponse {
        calls.lock().unwrap().push(uri.to_string());
        match reports.get(&id) {
            Some(report) => (StatusCode::OK, Json(json!({ "report": report }))).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({"error": "Report non trovato"})))
                .into_response(),
        }
    }

    async fn sas_pdf(
        State((_, calls)): State<(JsonValue, Calls)>,
        OriginalUri(uri): OriginalUri,
    ) -> impl IntoResponse {
        calls.lock().unwrap().push(uri.to_string());
        if uri.query() == Some("reportId=pending") {
            return (
                StatusCode::NOT_FOUND,
                "PDF non ancora generato per questo risultato",
            )
                .into_response();
        }
        (
            [(header::CONTENT_TYPE, "application/pdf")],
            b"%PDF-1.4 test".to_vec(),
        )
            .into_response()
    }

    async fn pid5_pdf(
        State((_, calls)): State<(JsonValue, Calls)>,
        OriginalUri(uri): OriginalUri,
    ) -> impl IntoResponse {
        calls.lock().unwrap().push(uri.to_string());
        (StatusCode::BAD_REQUEST, "Il report non è di tipo PID5")
    }

    let app = Router::new()
        .route("/api/reports/sas/pdf", get(sas_pdf))
        .route("/api/reports/pid5/pdf", get(pid5_pdf))
        .route("/api/reports/:id", get(report))
        .with_state((reports, calls.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), calls)
}

#[tokio::test]
async fn pid5_report_renders_one_domain_card() {
    let (base, calls) = spawn_api(json!({
        "abc": {
            "id": "abc",
            "metadata": {
                "testType": "pid5",
                "domainScores": { "distacco": { "mean": 1.8 } }
            }
        }
    }))
    .await;

    let client = ReportClient::new(&base).unwrap();
    let view = client.report_view("abc").await.unwrap();

    assert_eq!(calls.lock().unwrap().as_slice(), ["/api/reports/abc"]);
    let ReportBody::Pid5(pid5) = view.body else {
        panic!("expected a PID-5 body");
    };
    assert_eq!(pid5.domains.len(), 1);
    let card = &pid5.domains[0];
    assert_eq!(card.label, "Distacco");
    assert_eq!(card.value, "1.80");
    assert_eq!(card.badge, "Elevato");
    assert_eq!(card.color, ColorClass::Danger);
    assert_eq!(card.color.as_str(), "danger");
    assert!(pid5.top_facets.is_empty());
    assert_eq!(view.pdf_url.as_deref(), Some("/api/reports/pid5/pdf?reportId=abc"));
}

#[tokio::test]
async fn content_html_is_unwrapped_and_sanitized() {
    let (base, _) = spawn_api(json!({
        "wrapped": {
            "id": "wrapped",
            "content": "{\"html\":\"<p>x</p><script>alert(1)</script>\"}",
            "metadata": { "testType": "other" }
        },
        "literal": { "id": "literal", "content": "<p>y</p>" }
    }))
    .await;

    let client = ReportClient::new(&base).unwrap();
    let wrapped = client.report_view("wrapped").await.unwrap();
    assert!(matches!(wrapped.body, ReportBody::Generic));
    assert_eq!(wrapped.content_html, "<p>x</p>");
    assert!(wrapped.pdf_url.is_none());

    let literal = client.report_view("literal").await.unwrap();
    assert_eq!(literal.content_html, "<p>y</p>");
}

#[tokio::test]
async fn missing_report_maps_to_not_found_panel() {
    let (base, _) = spawn_api(json!({})).await;
    let client = ReportClient::new(&base).unwrap();

    let err = client.fetch_report("nope").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    let panel = err.error_panel();
    assert_eq!(panel.message, "Report non trovato");
    assert_eq!(panel.action_label, "Torna ai test");
}

#[tokio::test]
async fn sas_pdf_hits_exact_endpoint_and_names_download() {
    let (base, calls) = spawn_api(json!({
        "r7": { "id": "r7", "metadata": { "testType": "sas" } }
    }))
    .await;
    let client = ReportClient::new(&base).unwrap();

    let report = client.fetch_report("r7").await.unwrap();
    let download = client.download_pdf(&report).await.unwrap();

    assert_eq!(
        calls.lock().unwrap().as_slice(),
        ["/api/reports/r7", "/api/reports/sas/pdf?reportId=r7"]
    );
    assert_eq!(&download.bytes[..], b"%PDF-1.4 test");
    assert!(download.filename.starts_with("Report_SAS_"));
    assert!(download.filename.ends_with(".pdf"));
    // Report_SAS_YYYY-MM-DD.pdf
    assert_eq!(download.filename.len(), "Report_SAS_".len() + 10 + ".pdf".len());

    let dir = std::env::temp_dir().join(format!("psytest-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = download.save_to(&dir).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4 test");
    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn pdf_error_body_is_surfaced() {
    let (base, calls) = spawn_api(json!({
        "r8": { "id": "r8", "metadata": { "testType": "pid5" } }
    }))
    .await;
    let client = ReportClient::new(&base).unwrap();

    let report = client.fetch_report("r8").await.unwrap();
    let err = client.download_pdf(&report).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { status: 400, .. }));
    assert_eq!(err.user_message(), "Il report non è di tipo PID5");
    assert_eq!(
        calls.lock().unwrap().last().map(String::as_str),
        Some("/api/reports/pid5/pdf?reportId=r8")
    );
}

#[tokio::test]
async fn pdf_not_found_keeps_the_server_message() {
    let (base, calls) = spawn_api(json!({
        "pending": { "id": "pending", "metadata": { "testType": "sas" } }
    }))
    .await;
    let client = ReportClient::new(&base).unwrap();

    let report = client.fetch_report("pending").await.unwrap();
    let err = client.download_pdf(&report).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { status: 404, .. }));
    assert_eq!(
        err.user_message(),
        "PDF non ancora generato per questo risultato"
    );
    assert_eq!(
        err.error_panel().message,
        "PDF non ancora generato per questo risultato"
    );
    assert_eq!(
        calls.lock().unwrap().last().map(String::as_str),
        Some("/api/reports/sas/pdf?reportId=pending")
    );
}

#[tokio::test]
async fn unknown_type_never_reaches_the_server() {
    let (base, calls) = spawn_api(json!({
        "r9": { "id": "r9", "metadata": { "testType": "mmpi" } }
    }))
    .await;
    let client = ReportClient::new(&base).unwrap();

    let report = client.fetch_report("r9").await.unwrap();
    let err = client.download_pdf(&report).await.unwrap_err();

    assert!(matches!(err, ClientError::UnsupportedTestType(_)));
    assert_eq!(
        err.user_message(),
        "Esportazione PDF non disponibile per questo tipo di test"
    );
    assert_eq!(calls.lock().unwrap().as_slice(), ["/api/reports/r9"]);
}

async fn spawn_summary_api(results: JsonValue, reports: JsonValue) -> (String, Calls) {
    let calls: Calls = Arc::default();
    let test_id = "6f1c2d1e-0000-4000-8000-000000000001";

    let record = |calls: &Calls, uri: &axum::http::Uri| calls.lock().unwrap().push(uri.to_string());

    let app = Router::new()
        .route(
            "/api/tests/:id",
            get({
                let calls = calls.clone();
                move |OriginalUri(uri): OriginalUri| async move {
                    record(&calls, &uri);
                    Json(json!({
                        "id": test_id,
                        "title": "PID-5",
                        "description": "Inventario di personalità",
                        "instructions": "",
                        "category": "personalita",
                        "published": true,
                        "creatorId": "6f1c2d1e-0000-4000-8000-0000000000aa",
                        "createdAt": "2026-03-01T10:00:00Z",
                        "updatedAt": "2026-03-01T10:00:00Z"
                    }))
                }
            }),
        )
        .route(
            "/api/tests/:id/results",
            get({
                let calls = calls.clone();
                move |OriginalUri(uri): OriginalUri| async move {
                    record(&calls, &uri);
                    Json(results)
                }
            }),
        )
        .route(
            "/api/reports",
            get({
                let calls = calls.clone();
                move |OriginalUri(uri): OriginalUri| async move {
                    record(&calls, &uri);
                    Json(reports)
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), calls)
}

#[tokio::test]
async fn summary_fetches_test_result_then_report() {
    let result_id = "6f1c2d1e-0000-4000-8000-0000000000b1";
    let (base, calls) = spawn_summary_api(
        json!([
            {
                "id": result_id,
                "testId": "6f1c2d1e-0000-4000-8000-000000000001",
                "userId": "6f1c2d1e-0000-4000-8000-0000000000cc",
                "score": 1.4,
                "completed": true,
                "startedAt": "2026-03-09T09:00:00Z",
                "completedAt": "2026-03-09T09:20:00Z"
            },
            {
                "id": "6f1c2d1e-0000-4000-8000-0000000000b0",
                "testId": "6f1c2d1e-0000-4000-8000-000000000001",
                "userId": "6f1c2d1e-0000-4000-8000-0000000000cc",
                "score": null,
                "completed": false,
                "startedAt": "2026-03-08T09:00:00Z",
                "completedAt": null
            }
        ]),
        json!([{ "id": "rep-1", "title": "Profilo PID-5", "metadata": { "testType": "pid5" } }]),
    )
    .await;

    let client = ReportClient::new(&base).unwrap().with_token("token");
    let summary = client
        .fetch_result_summary("6f1c2d1e-0000-4000-8000-000000000001")
        .await
        .unwrap();

    assert_eq!(
        calls.lock().unwrap().as_slice(),
        [
            "/api/tests/6f1c2d1e-0000-4000-8000-000000000001".to_string(),
            "/api/tests/6f1c2d1e-0000-4000-8000-000000000001/results".to_string(),
            format!("/api/reports?testResultId={}", result_id),
        ]
    );
    assert_eq!(summary.message, "Grazie per aver completato il test");
    assert_eq!(summary.test.title, "PID-5");
    assert_eq!(summary.result.unwrap().id.to_string(), result_id);
    let report = summary.report.unwrap();
    assert_eq!(report.title, "Profilo PID-5");
    assert_eq!(report.url, "/api/reports/rep-1/view");
}

#[tokio::test]
async fn summary_without_results_skips_report_lookup() {
    let (base, calls) = spawn_summary_api(json!([]), json!([])).await;

    let client = ReportClient::new(&base).unwrap();
    let summary = client
        .fetch_result_summary("6f1c2d1e-0000-4000-8000-000000000001")
        .await
        .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 2);
    assert!(summary.result.is_none());
    assert!(summary.report.is_none());
}

#[tokio::test]
async fn summary_with_result_but_no_report() {
    let result_id = "6f1c2d1e-0000-4000-8000-0000000000b2";
    let (base, calls) = spawn_summary_api(
        json!([{
            "id": result_id,
            "testId": "6f1c2d1e-0000-4000-8000-000000000001",
            "userId": "6f1c2d1e-0000-4000-8000-0000000000cc",
            "score": 2.1,
            "completed": true,
            "startedAt": "2026-03-10T09:00:00Z",
            "completedAt": "2026-03-10T09:30:00Z"
        }]),
        json!([]),
    )
    .await;

    let client = ReportClient::new(&base).unwrap();
    let summary = client
        .fetch_result_summary("6f1c2d1e-0000-4000-8000-000000000001")
        .await
        .unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], format!("/api/reports?testResultId={}", result_id));
    assert_eq!(summary.result.unwrap().id.to_string(), result_id);
    assert!(summary.report.is_none());
    assert_eq!(summary.message, "Grazie per aver completato il test");
}
