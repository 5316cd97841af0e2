//! Structural validation of inbound documents.
//!
//! Every document accepted for ingestion must first pass its collection's
//! [`DocumentSchema`]: all declared fields present and well-typed, no
//! undeclared fields, date-time fields in RFC 3339 form. Validation stops at
//! the first violation and its message is surfaced to the caller verbatim;
//! nothing is ever partially ingested.

use serde_json::Value;
use std::fmt;

/// A structural violation found in an inbound document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Expected shape of a single document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Bool,
    /// Array of strings
    StrList,
    /// RFC 3339 date-time string
    DateTime,
    /// RFC 3339 date-time string or null
    NullableDateTime,
    /// Array of section sub-documents, each validated against [`SECTION`]
    Sections,
}

/// One declared field of a document schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty }
}

/// Closed structural contract for one document kind.
///
/// Every declared field is required; fields outside the declared set are
/// rejected.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema {
    pub fields: &'static [FieldSpec],
}

/// Section sub-document schema, shared by courses and timetables.
pub static SECTION: DocumentSchema = DocumentSchema {
    fields: &[
        field("id", FieldType::Str),
        field("courseId", FieldType::Str),
        field("type", FieldType::Str),
        field("number", FieldType::Int),
        field("instructors", FieldType::StrList),
        field("roomTime", FieldType::StrList),
        field("createdAt", FieldType::DateTime),
    ],
};

/// Inbound course contract.
pub static COURSE: DocumentSchema = DocumentSchema {
    fields: &[
        field("id", FieldType::Str),
        field("code", FieldType::Str),
        field("name", FieldType::Str),
        field("sections", FieldType::Sections),
        field("midsemStartTime", FieldType::NullableDateTime),
        field("midsemEndTime", FieldType::NullableDateTime),
        field("compreStartTime", FieldType::NullableDateTime),
        field("compreEndTime", FieldType::NullableDateTime),
        field("archived", FieldType::Bool),
        field("acadYear", FieldType::Int),
        field("semester", FieldType::Int),
        field("createdAt", FieldType::DateTime),
    ],
};

/// Inbound timetable contract.
pub static TIMETABLE: DocumentSchema = DocumentSchema {
    fields: &[
        field("id", FieldType::Str),
        field("authorId", FieldType::Str),
        field("name", FieldType::Str),
        field("degrees", FieldType::StrList),
        field("private", FieldType::Bool),
        field("draft", FieldType::Bool),
        field("archived", FieldType::Bool),
        field("year", FieldType::Int),
        field("acadYear", FieldType::Int),
        field("semester", FieldType::Int),
        field("sections", FieldType::Sections),
        field("timings", FieldType::StrList),
        field("examTimes", FieldType::StrList),
        field("warnings", FieldType::StrList),
        field("createdAt", FieldType::DateTime),
        field("lastUpdated", FieldType::DateTime),
    ],
};

impl DocumentSchema {
    /// Validate a document against this schema, stopping at the first
    /// violation.
    pub fn validate(&self, doc: &Value) -> Result<(), ValidationError> {
        let map = doc
            .as_object()
            .ok_or_else(|| ValidationError::new("document must be a JSON object"))?;

        for key in map.keys() {
            if !self.fields.iter().any(|f| f.name == key) {
                return Err(ValidationError::new(format!("unexpected field '{key}'")));
            }
        }

        for spec in self.fields {
            let value = map.get(spec.name).ok_or_else(|| {
                ValidationError::new(format!("missing required field '{}'", spec.name))
            })?;
            check_field(spec, value)?;
        }

        Ok(())
    }
}

fn check_field(spec: &FieldSpec, value: &Value) -> Result<(), ValidationError> {
    let name = spec.name;
    match spec.ty {
        FieldType::Str => {
            if !value.is_string() {
                return Err(ValidationError::new(format!("'{name}' must be a string")));
            }
        }
        FieldType::Int => {
            if !value.is_i64() && !value.is_u64() {
                return Err(ValidationError::new(format!("'{name}' must be an integer")));
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                return Err(ValidationError::new(format!("'{name}' must be a boolean")));
            }
        }
        FieldType::StrList => {
            let items = value.as_array().ok_or_else(|| {
                ValidationError::new(format!("'{name}' must be an array of strings"))
            })?;
            if items.iter().any(|item| !item.is_string()) {
                return Err(ValidationError::new(format!(
                    "'{name}' must be an array of strings"
                )));
            }
        }
        FieldType::DateTime => check_date_time(name, value)?,
        FieldType::NullableDateTime => {
            if !value.is_null() {
                check_date_time(name, value)?;
            }
        }
        FieldType::Sections => {
            let items = value
                .as_array()
                .ok_or_else(|| ValidationError::new(format!("'{name}' must be an array")))?;
            for (index, item) in items.iter().enumerate() {
                SECTION.validate(item).map_err(|e| {
                    ValidationError::new(format!("{name}[{index}]: {}", e.message))
                })?;
            }
        }
    }
    Ok(())
}

fn check_date_time(name: &str, value: &Value) -> Result<(), ValidationError> {
    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::new(format!("'{name}' must be a date-time string")))?;
    chrono::DateTime::parse_from_rfc3339(text).map_err(|_| {
        ValidationError::new(format!("'{name}' must be an RFC 3339 date-time"))
    })?;
    Ok(())
}
