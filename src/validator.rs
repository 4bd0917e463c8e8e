use chrono::NaiveDate;

use crate::record::Record;
use crate::schema::{FieldDef, FieldType, SchemaDef};

/// Date formats accepted on input; canonical output form is always %Y-%m-%d.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Validation outcome for a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Record passed all checks; carries the normalized record
    /// (every schema field present, canonical number/date forms).
    Valid(Record),
    /// First failing check across all fields, in schema declaration order.
    Invalid { reason: String },
}

/// Check one record against one schema definition.
///
/// Per field, checks run in a fixed order: required-presence, then type
/// coercion, then allowed-values. Fields are checked in schema declaration
/// order and the first failure wins, so every quarantined row carries exactly
/// one reason. Pure function; no side effects.
pub fn validate_record(record: &Record, schema: &SchemaDef) -> Outcome {
    let mut normalized = Record::new();

    for field in &schema.fields {
        let raw = record.get(&field.name).map(|v| {
            if schema.trim_values {
                v.trim()
            } else {
                v.as_str()
            }
        });

        let value = match raw {
            Some(v) if !v.is_empty() => v,
            _ => {
                if field.required {
                    return Outcome::Invalid {
                        reason: format!("missing required field: {}", field.name),
                    };
                }
                // Missing optionals default to an empty representation so
                // every valid row has the full schema column set.
                normalized.insert(field.name.clone(), String::new());
                continue;
            }
        };

        match coerce_field(value, field, schema) {
            Ok(canonical) => {
                normalized.insert(field.name.clone(), canonical);
            }
            Err(reason) => return Outcome::Invalid { reason },
        }
    }

    Outcome::Valid(normalized)
}

/// Coerce a non-empty value to its canonical form, then apply the
/// allowed-values rule if the field declares one.
fn coerce_field(value: &str, field: &FieldDef, schema: &SchemaDef) -> Result<String, String> {
    let canonical = match field.field_type {
        FieldType::String | FieldType::Enum => value.to_string(),
        FieldType::Number => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => format_number(n),
            _ => {
                return Err(format!(
                    "invalid type for field {}: expected {}",
                    field.name,
                    field.field_type.as_str()
                ))
            }
        },
        FieldType::Date => match parse_date(value) {
            Some(day) => day.format("%Y-%m-%d").to_string(),
            None => {
                return Err(format!(
                    "invalid type for field {}: expected {}",
                    field.name,
                    field.field_type.as_str()
                ))
            }
        },
    };

    let allowed = match &field.allowed {
        Some(allowed) => allowed,
        None => return Ok(canonical),
    };

    let matched = allowed.iter().find(|candidate| {
        if schema.case_insensitive_enums {
            candidate.eq_ignore_ascii_case(&canonical)
        } else {
            canonical == **candidate
        }
    });

    match matched {
        // Emit the schema-cased variant so output stays canonical
        Some(candidate) => Ok(candidate.clone()),
        None => Err(format!(
            "invalid value for field {}: {} not in allowed set",
            field.name, canonical
        )),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Stable number formatting: integral values print without a fractional
/// part so re-runs stay byte-identical regardless of the input spelling.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDef;

    fn tracker_schema() -> SchemaDef {
        serde_json::from_str(
            r#"{
                "name": "kitchen_tracker",
                "fields": [
                    {"name": "record_id", "required": true},
                    {"name": "report_date", "required": true, "type": "date"},
                    {"name": "region", "required": true, "type": "enum",
                     "allowed": ["KSA", "UAE", "KWT"]},
                    {"name": "value", "type": "number"},
                    {"name": "notes"}
                ]
            }"#,
        )
        .unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_record_is_normalized() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025/08/01"),
            ("region", "KSA"),
            ("value", "12.0"),
        ]);

        match validate_record(&row, &schema) {
            Outcome::Valid(normalized) => {
                assert_eq!(normalized["report_date"], "2025-08-01");
                assert_eq!(normalized["value"], "12");
                // missing optional defaults to empty
                assert_eq!(normalized["notes"], "");
            }
            Outcome::Invalid { reason } => panic!("expected valid, got: {reason}"),
        }
    }

    #[test]
    fn test_missing_required_field_names_the_field() {
        let schema = tracker_schema();
        let row = record(&[("record_id", "r-001"), ("region", "KSA")]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "missing required field: report_date".to_string()
            }
        );
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "   "),
            ("report_date", "2025-08-01"),
            ("region", "KSA"),
        ]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "missing required field: record_id".to_string()
            }
        );
    }

    #[test]
    fn test_type_failure_reports_expected_type() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "not-a-date"),
            ("region", "KSA"),
        ]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "invalid type for field report_date: expected date".to_string()
            }
        );
    }

    #[test]
    fn test_number_coercion_failure() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025-08-01"),
            ("region", "KSA"),
            ("value", "twelve"),
        ]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "invalid type for field value: expected number".to_string()
            }
        );
    }

    #[test]
    fn test_enum_failure_names_field_and_value() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025-08-01"),
            ("region", "MARS"),
        ]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "invalid value for field region: MARS not in allowed set".to_string()
            }
        );
    }

    #[test]
    fn test_enum_comparison_is_case_sensitive_by_default() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025-08-01"),
            ("region", "ksa"),
        ]);

        assert!(matches!(
            validate_record(&row, &schema),
            Outcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_case_insensitive_enums_emit_schema_casing() {
        let mut schema = tracker_schema();
        schema.case_insensitive_enums = true;
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025-08-01"),
            ("region", "ksa"),
        ]);

        match validate_record(&row, &schema) {
            Outcome::Valid(normalized) => assert_eq!(normalized["region"], "KSA"),
            Outcome::Invalid { reason } => panic!("expected valid, got: {reason}"),
        }
    }

    #[test]
    fn test_values_are_trimmed_before_checks() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", " r-001 "),
            ("report_date", " 2025-08-01 "),
            ("region", " KSA "),
        ]);

        match validate_record(&row, &schema) {
            Outcome::Valid(normalized) => {
                assert_eq!(normalized["record_id"], "r-001");
                assert_eq!(normalized["region"], "KSA");
            }
            Outcome::Invalid { reason } => panic!("expected valid, got: {reason}"),
        }
    }

    #[test]
    fn test_first_failure_wins_in_schema_order() {
        let schema = tracker_schema();
        // Both record_id and region are bad; record_id is declared first
        let row = record(&[("region", "MARS"), ("report_date", "2025-08-01")]);

        assert_eq!(
            validate_record(&row, &schema),
            Outcome::Invalid {
                reason: "missing required field: record_id".to_string()
            }
        );
    }

    #[test]
    fn test_fractional_numbers_keep_their_fraction() {
        let schema = tracker_schema();
        let row = record(&[
            ("record_id", "r-001"),
            ("report_date", "2025-08-01"),
            ("region", "KSA"),
            ("value", "3.25"),
        ]);

        match validate_record(&row, &schema) {
            Outcome::Valid(normalized) => assert_eq!(normalized["value"], "3.25"),
            Outcome::Invalid { reason } => panic!("expected valid, got: {reason}"),
        }
    }
}
