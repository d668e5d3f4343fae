use crate::dto::report_dto::ReportPayload;
use crate::dto::view_dto::{
    DomainCard, FacetRow, FactorRow, OrientationSummary, Pid5View, ReportBody, ReportView, SasView,
};
use crate::models::report_metadata::{
    MeanScore, OrientationData, Pid5Metadata, ReportMetadata, SasMetadata, TestKind,
};
use crate::services::chart_service::ChartService;
use crate::services::content_service::ContentService;
use crate::services::interpretation::{self, Severity, PID5_DOMAINS};

pub const TOP_FACETS: usize = 5;

/// Turns a report into the structure a page renders: type-specific tables,
/// chart configurations and the sanitized content block.
pub struct ReportViewService;

impl ReportViewService {
    pub fn build(report: &ReportPayload) -> ReportView {
        let metadata = ReportMetadata::parse_lenient(&report.metadata);
        let charts = report.included_graphs;

        let body = match &metadata {
            ReportMetadata::Sas(sas) => ReportBody::Sas(Self::sas_view(sas, charts)),
            ReportMetadata::Pid5(pid5) => ReportBody::Pid5(Self::pid5_view(pid5, charts)),
            ReportMetadata::Other { .. } => ReportBody::Generic,
        };

        ReportView {
            id: report.id.clone(),
            title: report.title.clone(),
            created_at: report.created_at,
            test_type: metadata.test_type().map(str::to_string),
            pdf_url: metadata.kind().map(|kind| pdf_path(kind, &report.id)),
            body,
            content_html: ContentService::render(&report.content),
        }
    }

    pub fn sas_view(sas: &SasMetadata, charts: bool) -> SasView {
        let mut factors: Vec<FactorRow> = sas
            .factor_scores
            .iter()
            .filter_map(|f| {
                interpretation::sas_factor(f.id).map(|(name, description)| FactorRow {
                    id: f.id,
                    name: name.to_string(),
                    description: description.to_string(),
                    score: f.score,
                })
            })
            .collect();
        factors.sort_by_key(|f| f.id);

        let orientation = sas.orientation_data.as_ref().map(orientation_summary);

        SasView {
            bar_chart: charts
                .then(|| ChartService::factor_bar_chart(&factors))
                .flatten(),
            pie_chart: charts
                .then(|| orientation.as_ref().and_then(ChartService::orientation_pie_chart))
                .flatten(),
            factors,
            orientation,
        }
    }

    pub fn pid5_view(pid5: &Pid5Metadata, charts: bool) -> Pid5View {
        let domains: Vec<DomainCard> = PID5_DOMAINS
            .iter()
            .filter_map(|(key, label)| {
                pid5.domain_scores
                    .iter()
                    .find(|d| d.key == *key)
                    .map(|d| domain_card(key, label, d.mean))
            })
            .collect();

        let mut ranked = domains.clone();
        interpretation::sort_by_mean_desc(&mut ranked, |d| d.mean);

        let top_facets = interpretation::top_n(pid5.facet_scores.clone(), TOP_FACETS, |f| f.mean)
            .into_iter()
            .map(facet_row)
            .collect();

        Pid5View {
            radar_chart: charts
                .then(|| ChartService::domain_radar_chart(&ranked))
                .flatten(),
            domains,
            top_facets,
        }
    }
}

pub fn pdf_path(kind: TestKind, report_id: &str) -> String {
    format!("/api/reports/{}/pdf?reportId={}", kind.as_str(), report_id)
}

fn orientation_summary(data: &OrientationData) -> OrientationSummary {
    let total = data.scopi + data.antiscopi;
    OrientationSummary {
        scopi: data.scopi,
        antiscopi: data.antiscopi,
        scopi_percentage: interpretation::format_percentage(data.scopi, total),
        antiscopi_percentage: interpretation::format_percentage(data.antiscopi, total),
    }
}

fn domain_card(key: &str, label: &str, mean: f64) -> DomainCard {
    let severity = Severity::from_mean(mean);
    let color = severity.color();
    DomainCard {
        key: key.to_string(),
        label: label.to_string(),
        mean,
        value: interpretation::format_mean(mean),
        severity,
        badge: severity.label().to_string(),
        border_class: color.border_class(),
        text_class: color.text_class(),
        color,
    }
}

fn facet_row(facet: MeanScore) -> FacetRow {
    let severity = Severity::from_mean(facet.mean);
    FacetRow {
        label: interpretation::facet_label(&facet.key),
        value: interpretation::format_mean(facet.mean),
        badge: severity.label().to_string(),
        color: severity.color(),
        mean: facet.mean,
        key: facet.key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::interpretation::ColorClass;
    use serde_json::json;

    fn payload(metadata: serde_json::Value, content: &str) -> ReportPayload {
        serde_json::from_value(json!({
            "id": "r1",
            "title": "Report",
            "content": content,
            "metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn sas_factors_are_sorted_by_id_with_orientation_split() {
        let view = ReportViewService::build(&payload(
            json!({
                "testType": "sas",
                "factorScores": { "5": 3.0, "2": 1.5, "8": 0.5 },
                "orientationData": { "scopi": 7, "antiscopi": 3 }
            }),
            "",
        ));
        let ReportBody::Sas(sas) = view.body else { panic!("expected sas body") };
        assert_eq!(sas.factors.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 5, 8]);
        assert_eq!(sas.factors[0].name, "Autonomia e controllo");
        let orientation = sas.orientation.unwrap();
        assert_eq!(orientation.scopi_percentage, "70%");
        assert_eq!(orientation.antiscopi_percentage, "30%");
        assert!(sas.bar_chart.is_some());
        assert!(sas.pie_chart.is_some());
        assert_eq!(view.pdf_url.as_deref(), Some("/api/reports/sas/pdf?reportId=r1"));
    }

    #[test]
    fn pid5_cards_follow_fixed_order_and_radar_sorts_desc() {
        let view = ReportViewService::build(&payload(
            json!({
                "testType": "pid5",
                "domainScores": {
                    "psicoticismo": { "mean": 2.4 },
                    "affettivita_negativa": { "mean": 0.3 },
                    "antagonismo": { "mean": 1.2 }
                },
                "facetScores": {
                    "anedonia": 0.2, "ansia": 2.9, "ostilita": 1.1,
                    "ritiro": 1.7, "inganno": 0.6, "grandiosita": 2.0
                }
            }),
            "",
        ));
        let ReportBody::Pid5(pid5) = view.body else { panic!("expected pid5 body") };
        assert_eq!(
            pid5.domains.iter().map(|d| d.key.as_str()).collect::<Vec<_>>(),
            vec!["affettivita_negativa", "antagonismo", "psicoticismo"]
        );
        assert_eq!(pid5.domains[0].badge, "Molto Basso");
        assert_eq!(pid5.domains[0].color, ColorClass::Success);
        assert_eq!(pid5.domains[2].badge, "Molto Elevato");

        let radar = pid5.radar_chart.unwrap();
        assert_eq!(radar["data"]["labels"][0], "Psicoticismo");
        assert_eq!(radar["data"]["labels"][2], "Affettività Negativa");

        assert_eq!(pid5.top_facets.len(), 5);
        assert_eq!(pid5.top_facets[0].label, "Ansia");
        assert_eq!(pid5.top_facets[4].label, "Inganno");
        assert_eq!(pid5.top_facets[3].badge, "Medio");
    }

    #[test]
    fn graphs_can_be_switched_off() {
        let mut report = payload(
            json!({ "testType": "pid5", "domainScores": { "distacco": 1.0 } }),
            "",
        );
        report.included_graphs = false;
        let ReportBody::Pid5(pid5) = ReportViewService::build(&report).body else {
            panic!("expected pid5 body")
        };
        assert!(pid5.radar_chart.is_none());
        assert_eq!(pid5.domains.len(), 1);
    }

    #[test]
    fn other_types_render_only_content() {
        let view = ReportViewService::build(&payload(
            json!({ "testType": "mmpi" }),
            r#"{"html":"<p>x</p>"}"#,
        ));
        assert!(matches!(view.body, ReportBody::Generic));
        assert_eq!(view.content_html, "<p>x</p>");
        assert_eq!(view.test_type.as_deref(), Some("mmpi"));
        assert!(view.pdf_url.is_none());
    }

    #[test]
    fn malformed_metadata_degrades_to_generic() {
        let view = ReportViewService::build(&payload(
            json!({ "testType": "sas", "factorScores": [ { "id": 12, "score": 1 } ] }),
            "<p>y</p>",
        ));
        assert!(matches!(view.body, ReportBody::Generic));
        assert_eq!(view.content_html, "<p>y</p>");
    }
}
