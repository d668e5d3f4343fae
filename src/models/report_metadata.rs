//! Typed contract for the JSON document stored in `reports.analysis`.
//!
//! The document is tagged by `testType`. `"sas"` carries factor scores and the
//! scopi/antiscopi orientation split, `"pid5"` carries domain and facet means.
//! Anything else is kept as [`ReportMetadata::Other`] and only gets the plain
//! content block when rendered.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};

use crate::services::interpretation::PID5_DOMAINS;

pub const SAS_FACTOR_COUNT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Sas,
    Pid5,
}

impl TestKind {
    pub fn from_test_type(test_type: &str) -> Option<Self> {
        match test_type {
            "sas" => Some(TestKind::Sas),
            "pid5" => Some(TestKind::Pid5),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Sas => "sas",
            TestKind::Pid5 => "pid5",
        }
    }

    /// Upper-case tag used in exported file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            TestKind::Sas => "SAS",
            TestKind::Pid5 => "PID5",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MetadataError {
    #[error("metadata must be a JSON object")]
    NotAnObject,
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
    #[error("factor id {0} is outside 1..=8")]
    FactorOutOfRange(u32),
    #[error("factor id {0} appears more than once")]
    DuplicateFactor(u8),
    #[error("unknown PID-5 domain '{0}'")]
    UnknownDomain(String),
    #[error("score for '{0}' must be a finite, non-negative number")]
    InvalidScore(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    pub id: u8,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationData {
    #[serde(default)]
    pub scopi: f64,
    #[serde(default)]
    pub antiscopi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SasMetadata {
    pub factor_scores: Vec<FactorScore>,
    pub orientation_data: Option<OrientationData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanScore {
    pub key: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pid5Metadata {
    pub domain_scores: Vec<MeanScore>,
    pub facet_scores: Vec<MeanScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportMetadata {
    Sas(SasMetadata),
    Pid5(Pid5Metadata),
    Other { test_type: Option<String> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSas {
    #[serde(default)]
    factor_scores: Option<RawFactorScores>,
    #[serde(default)]
    orientation_data: Option<OrientationData>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFactorScores {
    Keyed(BTreeMap<String, RawScore>),
    List(Vec<RawFactorEntry>),
}

#[derive(Deserialize)]
struct RawFactorEntry {
    id: u32,
    #[serde(alias = "mean", alias = "value")]
    score: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Detailed(ScoreDetail),
}

#[derive(Deserialize)]
struct ScoreDetail {
    #[serde(alias = "score", alias = "value")]
    mean: f64,
}

impl RawScore {
    fn value(&self) -> f64 {
        match self {
            RawScore::Number(v) => *v,
            RawScore::Detailed(d) => d.mean,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPid5 {
    #[serde(default)]
    domain_scores: BTreeMap<String, RawScore>,
    #[serde(default)]
    facet_scores: BTreeMap<String, RawScore>,
}

impl ReportMetadata {
    /// Parses the metadata document. Structural problems (wrong JSON types,
    /// factor ids that are not numbers) are errors; missing sections default
    /// to empty.
    pub fn parse(value: &JsonValue) -> Result<Self, MetadataError> {
        if value.is_null() {
            return Ok(ReportMetadata::Other { test_type: None });
        }
        let object = value.as_object().ok_or(MetadataError::NotAnObject)?;
        let test_type = object.get("testType").and_then(|t| t.as_str());

        match test_type.and_then(TestKind::from_test_type) {
            Some(TestKind::Sas) => {
                let raw: RawSas = serde_json::from_value(value.clone()).map_err(|e| {
                    MetadataError::Malformed {
                        field: "factorScores",
                        reason: e.to_string(),
                    }
                })?;
                Ok(ReportMetadata::Sas(SasMetadata {
                    factor_scores: factor_scores(raw.factor_scores)?,
                    orientation_data: raw.orientation_data,
                }))
            }
            Some(TestKind::Pid5) => {
                let raw: RawPid5 = serde_json::from_value(value.clone()).map_err(|e| {
                    MetadataError::Malformed {
                        field: "domainScores",
                        reason: e.to_string(),
                    }
                })?;
                Ok(ReportMetadata::Pid5(Pid5Metadata {
                    domain_scores: mean_scores(raw.domain_scores),
                    facet_scores: mean_scores(raw.facet_scores),
                }))
            }
            None => Ok(ReportMetadata::Other {
                test_type: test_type.map(str::to_string),
            }),
        }
    }

    /// Parse for documents that are already stored. A document that fails to
    /// parse is logged and treated as an untyped report.
    pub fn parse_lenient(value: &JsonValue) -> Self {
        match Self::parse(value) {
            Ok(metadata) => metadata,
            Err(err) => {
                let test_type = value
                    .get("testType")
                    .and_then(|t| t.as_str())
                    .map(str::to_string);
                tracing::warn!(error = %err, test_type = ?test_type, "report metadata failed to parse, rendering content only");
                ReportMetadata::Other { test_type }
            }
        }
    }

    /// Parse and apply the checks enforced when a report is written.
    pub fn parse_strict(value: &JsonValue) -> Result<Self, MetadataError> {
        let metadata = Self::parse(value)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn validate(&self) -> Result<(), MetadataError> {
        match self {
            ReportMetadata::Sas(sas) => {
                for factor in &sas.factor_scores {
                    check_score(&format!("factor {}", factor.id), factor.score)?;
                }
                if let Some(orientation) = &sas.orientation_data {
                    check_score("scopi", orientation.scopi)?;
                    check_score("antiscopi", orientation.antiscopi)?;
                }
                Ok(())
            }
            ReportMetadata::Pid5(pid5) => {
                for domain in &pid5.domain_scores {
                    if !PID5_DOMAINS.iter().any(|(key, _)| *key == domain.key) {
                        return Err(MetadataError::UnknownDomain(domain.key.clone()));
                    }
                    check_score(&domain.key, domain.mean)?;
                }
                for facet in &pid5.facet_scores {
                    check_score(&facet.key, facet.mean)?;
                }
                Ok(())
            }
            ReportMetadata::Other { .. } => Ok(()),
        }
    }

    pub fn kind(&self) -> Option<TestKind> {
        match self {
            ReportMetadata::Sas(_) => Some(TestKind::Sas),
            ReportMetadata::Pid5(_) => Some(TestKind::Pid5),
            ReportMetadata::Other { .. } => None,
        }
    }

    pub fn test_type(&self) -> Option<&str> {
        match self {
            ReportMetadata::Other { test_type } => test_type.as_deref(),
            typed => typed.kind().map(|k| k.as_str()),
        }
    }
}

fn factor_scores(raw: Option<RawFactorScores>) -> Result<Vec<FactorScore>, MetadataError> {
    let entries: Vec<(u32, f64)> = match raw {
        None => Vec::new(),
        Some(RawFactorScores::List(list)) => list.into_iter().map(|e| (e.id, e.score)).collect(),
        Some(RawFactorScores::Keyed(map)) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, score) in map {
                let digits = key.trim_start_matches(|c: char| !c.is_ascii_digit());
                let id = digits.parse::<u32>().map_err(|_| MetadataError::Malformed {
                    field: "factorScores",
                    reason: format!("key '{}' is not a factor number", key),
                })?;
                entries.push((id, score.value()));
            }
            entries
        }
    };

    let mut seen = HashSet::new();
    let mut scores = Vec::with_capacity(entries.len());
    for (id, score) in entries {
        if id == 0 || id > SAS_FACTOR_COUNT as u32 {
            return Err(MetadataError::FactorOutOfRange(id));
        }
        let id = id as u8;
        if !seen.insert(id) {
            return Err(MetadataError::DuplicateFactor(id));
        }
        scores.push(FactorScore { id, score });
    }
    scores.sort_by_key(|f| f.id);
    Ok(scores)
}

fn mean_scores(raw: BTreeMap<String, RawScore>) -> Vec<MeanScore> {
    raw.into_iter()
        .map(|(key, score)| MeanScore {
            mean: score.value(),
            key,
        })
        .collect()
}

fn check_score(name: &str, value: f64) -> Result<(), MetadataError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MetadataError::InvalidScore(name.to_string()))
    }
}
