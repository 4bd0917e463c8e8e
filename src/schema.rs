use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{EtlError, Result};

/// Expected primitive type for a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Enum,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
        }
    }
}

fn default_string_type() -> FieldType {
    FieldType::String
}

fn default_true() -> bool {
    true
}

/// Declarative rule list for one field: presence, type, allowed-set.
/// Adding a new dataset means new declarative data, not new control flow.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default = "default_string_type")]
    pub field_type: FieldType,
    /// Allowed-value vocabulary for categorical fields
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

/// Declarative description of a record shape for one dataset kind.
/// Immutable once loaded; fields are checked in declaration order.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    /// Trim surrounding whitespace before presence and value checks
    #[serde(default = "default_true")]
    pub trim_values: bool,
    /// Match allowed-value vocabularies ignoring case; the schema-cased
    /// variant is what gets written to the validated output
    #[serde(default)]
    pub case_insensitive_enums: bool,
}

impl SchemaDef {
    /// Resolve a schema reference name to `<schemas_dir>/<reference>.json`
    /// and load it. An unresolvable reference is a run-level error.
    pub fn load(reference: &str, schemas_dir: &Path) -> Result<Self> {
        let path = schemas_dir.join(format!("{reference}.json"));
        let content = fs::read_to_string(&path).map_err(|e| EtlError::SchemaNotFound {
            reference: reference.to_string(),
            dir: schemas_dir.to_path_buf(),
            source: e,
        })?;
        let schema: SchemaDef = serde_json::from_str(&content)?;
        Ok(schema)
    }

    /// Full declared field list, in schema order. This is the validated
    /// output's column order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
