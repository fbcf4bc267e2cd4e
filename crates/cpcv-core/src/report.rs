//! Structured validation report returned by the reasoning model.
//!
//! Field names follow the JSON contract given to the model (camelCase).
//! Anything the model may leave out is optional or defaults to empty, so a
//! sparse answer still parses; an unknown status value does not. Text
//! fields accept `null`, and compared values accept bare numbers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Verdict for the whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    /// Every cross-reference holds
    Valid,
    /// At least one substantive mismatch
    Invalid,
    /// A human needs to look at it
    ReviewNeeded,
}

/// Summary verdict for one entity group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    /// Contract agrees with the evidence
    Match,
    /// Contract disagrees with the evidence
    Mismatch,
    /// No evidence for this entity
    Missing,
}

/// Severity of a discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Blocks signing
    Critical,
    /// Should be fixed
    Warning,
    /// Informational
    Info,
}

/// Outcome of comparing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    /// Values agree
    Match,
    /// Values differ
    Mismatch,
    /// Only the contract states the value
    MissingSource,
    /// Only the evidence states the value
    MissingCpcv,
}

/// Entity summary (status plus free-text notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Summary verdict
    pub status: EntityStatus,
    /// Model commentary
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

/// Summaries for the three entity groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    /// Owners (sellers)
    pub owners: EntitySummary,
    /// Buyers
    pub buyers: EntitySummary,
    /// The property
    pub property: EntitySummary,
}

/// A flagged difference between evidence and contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    /// How serious it is
    pub severity: Severity,
    /// Field name as reported by the model
    pub field: String,
    /// Value read from the source documents
    #[serde(default, deserialize_with = "text_or_number")]
    pub source_doc_value: Option<String>,
    /// Value read from the contract
    #[serde(default, deserialize_with = "text_or_number")]
    pub cpcv_value: Option<String>,
    /// Explanation in Portuguese
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// One compared field in a detailed comparison list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    /// Field name
    pub field: String,
    /// Value read from the source documents
    #[serde(default, deserialize_with = "text_or_number")]
    pub source_value: Option<String>,
    /// Value read from the contract
    #[serde(default, deserialize_with = "text_or_number")]
    pub cpcv_value: Option<String>,
    /// Comparison outcome
    pub status: ComparisonStatus,
}

/// Per-entity field comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedComparison {
    /// Owner fields
    #[serde(default)]
    pub owners: Vec<ComparisonItem>,
    /// Buyer fields
    #[serde(default)]
    pub buyers: Vec<ComparisonItem>,
    /// Property fields
    #[serde(default)]
    pub property: Vec<ComparisonItem>,
}

/// The model's structured answer for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Verdict for the whole contract
    pub overall_status: OverallStatus,
    /// Summary in Portuguese
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    /// Contract facts lacking corroborating evidence
    #[serde(default)]
    pub missing_documents_data: Vec<String>,
    /// Entity summaries
    pub entities: Entities,
    /// Flat discrepancy list, in the order the model reported them
    #[serde(default)]
    pub discrepancies: Vec<Discrepancy>,
    /// Field-by-field comparisons, absent if the model skipped them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_comparison: Option<DetailedComparison>,
}

impl ValidationReport {
    /// Parse a report from the model's JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a report of the
    /// agreed shape.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Compared values arrive as strings, but areas and prices sometimes come
/// back as JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "overallStatus": "REVIEW_NEEDED",
        "summary": "NIF do comprador com espaços.",
        "missingDocumentsData": ["IBAN PT50... no CPCV sem comprovativo"],
        "entities": {
            "owners": { "status": "MATCH", "notes": "" },
            "buyers": { "status": "MISMATCH", "notes": "NIF" },
            "property": { "status": "MISSING", "notes": "Sem caderneta" }
        },
        "discrepancies": [
            { "severity": "WARNING", "field": "NIF", "sourceDocValue": "123 456 789",
              "cpcvValue": "123456789", "description": "Formato diferente" }
        ],
        "detailedComparison": {
            "owners": [
                { "field": "Nome", "sourceValue": "Maria Silva", "cpcvValue": "Maria Silva", "status": "MATCH" }
            ],
            "buyers": [
                { "field": "IBAN", "sourceValue": null, "cpcvValue": "PT50 0000", "status": "MISSING_SOURCE" }
            ]
        }
    }"#;

    #[test]
    fn test_parse_sample_report() {
        let report = ValidationReport::from_json(SAMPLE).unwrap();
        assert_eq!(report.overall_status, OverallStatus::ReviewNeeded);
        assert_eq!(report.entities.buyers.status, EntityStatus::Mismatch);
        assert_eq!(report.entities.property.status, EntityStatus::Missing);
        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].severity, Severity::Warning);

        let detailed = report.detailed_comparison.unwrap();
        assert_eq!(detailed.owners.len(), 1);
        assert_eq!(detailed.buyers[0].source_value, None);
        assert_eq!(detailed.buyers[0].status, ComparisonStatus::MissingSource);
        // absent list defaults to empty
        assert!(detailed.property.is_empty());
    }

    #[test]
    fn test_minimal_report() {
        let json = r#"{
            "overallStatus": "VALID",
            "entities": {
                "owners": { "status": "MATCH" },
                "buyers": { "status": "MATCH" },
                "property": { "status": "MATCH" }
            }
        }"#;
        let report = ValidationReport::from_json(json).unwrap();
        assert!(report.discrepancies.is_empty());
        assert!(report.missing_documents_data.is_empty());
        assert!(report.detailed_comparison.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = SAMPLE.replace("\"MISSING_SOURCE\"", "\"MAYBE\"");
        assert!(ValidationReport::from_json(&json).is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let report = ValidationReport::from_json(SAMPLE).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["overallStatus"], "REVIEW_NEEDED");
        assert_eq!(value["discrepancies"][0]["sourceDocValue"], "123 456 789");
        assert_eq!(value["detailedComparison"]["buyers"][0]["status"], "MISSING_SOURCE");
    }

    #[test]
    fn test_null_text_fields_become_empty() {
        let json = r#"{
            "overallStatus": "INVALID",
            "summary": null,
            "entities": {
                "owners": { "status": "MATCH", "notes": null },
                "buyers": { "status": "MATCH" },
                "property": { "status": "MATCH" }
            },
            "discrepancies": [
                { "severity": "INFO", "field": "Área", "sourceDocValue": "85", "cpcvValue": "90",
                  "description": null }
            ]
        }"#;
        let report = ValidationReport::from_json(json).unwrap();
        assert_eq!(report.summary, "");
        assert_eq!(report.entities.owners.notes, "");
        assert_eq!(report.discrepancies[0].description, "");
    }

    #[test]
    fn test_numeric_values_are_read_as_text() {
        let json = r#"{
            "overallStatus": "REVIEW_NEEDED",
            "entities": {
                "owners": { "status": "MATCH" },
                "buyers": { "status": "MATCH" },
                "property": { "status": "MISMATCH" }
            },
            "discrepancies": [
                { "severity": "WARNING", "field": "Área", "sourceDocValue": 85.5, "cpcvValue": "85,5 m2" }
            ],
            "detailedComparison": {
                "property": [
                    { "field": "Artigo", "sourceValue": 1234, "cpcvValue": null, "status": "MISSING_CPCV" }
                ]
            }
        }"#;
        let report = ValidationReport::from_json(json).unwrap();
        assert_eq!(report.discrepancies[0].source_doc_value.as_deref(), Some("85.5"));
        assert_eq!(report.discrepancies[0].cpcv_value.as_deref(), Some("85,5 m2"));

        let property = report.detailed_comparison.unwrap().property;
        assert_eq!(property[0].source_value.as_deref(), Some("1234"));
        assert_eq!(property[0].cpcv_value, None);
    }
}
