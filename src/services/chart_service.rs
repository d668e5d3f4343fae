use serde_json::{json, Value as JsonValue};

use crate::dto::view_dto::{DomainCard, FactorRow, OrientationSummary};

/// Highest value on the PID-5 answer scale.
const PID5_SCALE_MAX: f64 = 3.0;

const BLUE: &str = "rgba(54, 162, 235, 0.6)";
const BLUE_BORDER: &str = "rgba(54, 162, 235, 1)";
const GREEN: &str = "rgba(75, 192, 192, 0.7)";
const RED: &str = "rgba(255, 99, 132, 0.7)";

/// Chart configurations in the shape Chart.js consumes.
pub struct ChartService;

impl ChartService {
    pub fn factor_bar_chart(factors: &[FactorRow]) -> Option<JsonValue> {
        if factors.is_empty() {
            return None;
        }
        let labels: Vec<String> = factors
            .iter()
            .map(|f| format!("F{} {}", f.id, f.name))
            .collect();
        let data: Vec<f64> = factors.iter().map(|f| f.score).collect();

        Some(json!({
            "type": "bar",
            "data": {
                "labels": labels,
                "datasets": [{
                    "label": "Punteggio fattore",
                    "data": data,
                    "backgroundColor": BLUE,
                    "borderColor": BLUE_BORDER,
                    "borderWidth": 1
                }]
            },
            "options": {
                "responsive": true,
                "scales": { "y": { "beginAtZero": true } },
                "plugins": { "legend": { "display": false } }
            }
        }))
    }

    /// Pie of the scopi/antiscopi split. Tooltip labels carry the rounded
    /// percentages since callbacks cannot travel as JSON.
    pub fn orientation_pie_chart(orientation: &OrientationSummary) -> Option<JsonValue> {
        if orientation.scopi + orientation.antiscopi <= 0.0 {
            return None;
        }
        Some(json!({
            "type": "pie",
            "data": {
                "labels": ["Scopi", "Antiscopi"],
                "datasets": [{
                    "data": [orientation.scopi, orientation.antiscopi],
                    "backgroundColor": [GREEN, RED]
                }]
            },
            "options": {
                "responsive": true,
                "plugins": {
                    "legend": { "position": "bottom" },
                    "tooltip": {
                        "labels": [
                            format!("Scopi: {} ({})", orientation.scopi, orientation.scopi_percentage),
                            format!("Antiscopi: {} ({})", orientation.antiscopi, orientation.antiscopi_percentage)
                        ]
                    }
                }
            }
        }))
    }

    /// Radar over the domains in the order given (callers pass them sorted by
    /// mean, highest first).
    pub fn domain_radar_chart(domains: &[DomainCard]) -> Option<JsonValue> {
        if domains.is_empty() {
            return None;
        }
        let labels: Vec<&str> = domains.iter().map(|d| d.label.as_str()).collect();
        let data: Vec<f64> = domains.iter().map(|d| d.mean).collect();

        Some(json!({
            "type": "radar",
            "data": {
                "labels": labels,
                "datasets": [{
                    "label": "Media del dominio",
                    "data": data,
                    "backgroundColor": "rgba(54, 162, 235, 0.2)",
                    "borderColor": BLUE_BORDER,
                    "pointBackgroundColor": BLUE_BORDER
                }]
            },
            "options": {
                "responsive": true,
                "scales": {
                    "r": { "min": 0, "max": PID5_SCALE_MAX, "ticks": { "stepSize": 0.5 } }
                }
            }
        }))
    }
}
