//! Per-collection index schemas and document mapping.
//!
//! Stored documents are semi-structured JSON; each collection indexes its
//! searchable fields and additionally stores the full JSON source, which is
//! what search hits return. Embedded lists (section instructors, time slots,
//! course summaries) are flattened into multi-valued fields, giving the
//! "at least one element matches" semantics the query tree relies on.

use serde_json::Value;
use tantivy::schema::{Field, Schema, INDEXED, STORED, STRING, TEXT};
use tantivy::TantivyDocument;

/// Index-side shape of a searchable field, used when lowering query nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Untokenized term: exact comparison and set containment
    Raw,
    /// Tokenized text: fuzzy matching
    Text,
    /// Integer term
    Int,
}

/// Mapping between stored JSON documents and one collection's engine schema.
pub trait CollectionMapping: Send + Sync {
    /// The engine schema for this collection.
    fn schema(&self) -> Schema;

    /// Field carrying the logical document id.
    fn id_field(&self) -> Field;

    /// Stored-only field holding the full JSON source.
    fn source_field(&self) -> Field;

    /// Resolve a query-tree field name to its engine field and kind.
    fn resolve(&self, name: &str) -> Option<(Field, FieldKind)>;

    /// Build an engine document from a stored JSON document.
    fn to_doc(&self, doc: &Value) -> TantivyDocument;
}

/// Course collection mapping.
pub struct CourseMapping {
    schema: Schema,
    id: Field,
    code: Field,
    dept: Field,
    name: Field,
    instructors: Field,
    time: Field,
    acad_year: Field,
    semester: Field,
    source: Field,
}

impl CourseMapping {
    pub fn new() -> Self {
        let mut builder = Schema::builder();
        let id = builder.add_text_field("id", STRING | STORED);
        let code = builder.add_text_field("code", STRING);
        let dept = builder.add_text_field("dept", STRING);
        let name = builder.add_text_field("name", TEXT);
        let instructors = builder.add_text_field("instructors", TEXT);
        let time = builder.add_text_field("time", STRING);
        let acad_year = builder.add_i64_field("acad_year", INDEXED);
        let semester = builder.add_i64_field("semester", INDEXED);
        let source = builder.add_text_field("source", STORED);
        Self {
            schema: builder.build(),
            id,
            code,
            dept,
            name,
            instructors,
            time,
            acad_year,
            semester,
            source,
        }
    }
}

impl Default for CourseMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionMapping for CourseMapping {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn id_field(&self) -> Field {
        self.id
    }

    fn source_field(&self) -> Field {
        self.source
    }

    fn resolve(&self, name: &str) -> Option<(Field, FieldKind)> {
        match name {
            "id" => Some((self.id, FieldKind::Raw)),
            "code" => Some((self.code, FieldKind::Raw)),
            "dept" => Some((self.dept, FieldKind::Raw)),
            "name" => Some((self.name, FieldKind::Text)),
            "sections.instructors" => Some((self.instructors, FieldKind::Text)),
            "sections.time" => Some((self.time, FieldKind::Raw)),
            "acadYear" => Some((self.acad_year, FieldKind::Int)),
            "semester" => Some((self.semester, FieldKind::Int)),
            _ => None,
        }
    }

    fn to_doc(&self, doc: &Value) -> TantivyDocument {
        let mut out = TantivyDocument::new();
        add_str(&mut out, self.id, doc, "id");
        add_str(&mut out, self.code, doc, "code");
        add_str(&mut out, self.dept, doc, "dept");
        add_str(&mut out, self.name, doc, "name");
        for section in array(doc, "sections") {
            for instructor in str_items(section, "instructors") {
                out.add_text(self.instructors, instructor);
            }
            for slot in str_items(section, "time") {
                out.add_text(self.time, slot);
            }
        }
        add_int(&mut out, self.acad_year, doc, "acadYear");
        add_int(&mut out, self.semester, doc, "semester");
        out.add_text(self.source, doc.to_string());
        out
    }
}

/// Timetable collection mapping.
pub struct TimetableMapping {
    schema: Schema,
    id: Field,
    author_id: Field,
    name: Field,
    degrees: Field,
    year: Field,
    acad_year: Field,
    semester: Field,
    instructors: Field,
    courses_code: Field,
    courses_name: Field,
    source: Field,
}

impl TimetableMapping {
    pub fn new() -> Self {
        let mut builder = Schema::builder();
        let id = builder.add_text_field("id", STRING | STORED);
        let author_id = builder.add_text_field("author_id", STRING);
        let name = builder.add_text_field("name", TEXT);
        let degrees = builder.add_text_field("degrees", STRING);
        let year = builder.add_i64_field("year", INDEXED);
        let acad_year = builder.add_i64_field("acad_year", INDEXED);
        let semester = builder.add_i64_field("semester", INDEXED);
        let instructors = builder.add_text_field("instructors", TEXT);
        let courses_code = builder.add_text_field("courses_code", TEXT);
        let courses_name = builder.add_text_field("courses_name", TEXT);
        let source = builder.add_text_field("source", STORED);
        Self {
            schema: builder.build(),
            id,
            author_id,
            name,
            degrees,
            year,
            acad_year,
            semester,
            instructors,
            courses_code,
            courses_name,
            source,
        }
    }
}

impl Default for TimetableMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionMapping for TimetableMapping {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn id_field(&self) -> Field {
        self.id
    }

    fn source_field(&self) -> Field {
        self.source
    }

    fn resolve(&self, name: &str) -> Option<(Field, FieldKind)> {
        match name {
            "id" => Some((self.id, FieldKind::Raw)),
            "authorId" => Some((self.author_id, FieldKind::Raw)),
            "name" => Some((self.name, FieldKind::Text)),
            "degrees" => Some((self.degrees, FieldKind::Raw)),
            "year" => Some((self.year, FieldKind::Int)),
            "acadYear" => Some((self.acad_year, FieldKind::Int)),
            "semester" => Some((self.semester, FieldKind::Int)),
            "sections.instructors" => Some((self.instructors, FieldKind::Text)),
            "courses.code" => Some((self.courses_code, FieldKind::Text)),
            "courses.name" => Some((self.courses_name, FieldKind::Text)),
            _ => None,
        }
    }

    fn to_doc(&self, doc: &Value) -> TantivyDocument {
        let mut out = TantivyDocument::new();
        add_str(&mut out, self.id, doc, "id");
        add_str(&mut out, self.author_id, doc, "authorId");
        add_str(&mut out, self.name, doc, "name");
        for degree in str_items(doc, "degrees") {
            out.add_text(self.degrees, degree);
        }
        add_int(&mut out, self.year, doc, "year");
        add_int(&mut out, self.acad_year, doc, "acadYear");
        add_int(&mut out, self.semester, doc, "semester");
        for section in array(doc, "sections") {
            for instructor in str_items(section, "instructors") {
                out.add_text(self.instructors, instructor);
            }
        }
        for course in array(doc, "courses") {
            if let Some(code) = course.get("code").and_then(Value::as_str) {
                out.add_text(self.courses_code, code);
            }
            if let Some(name) = course.get("name").and_then(Value::as_str) {
                out.add_text(self.courses_name, name);
            }
        }
        out.add_text(self.source, doc.to_string());
        out
    }
}

fn add_str(out: &mut TantivyDocument, field: Field, doc: &Value, key: &str) {
    if let Some(v) = doc.get(key).and_then(Value::as_str) {
        out.add_text(field, v);
    }
}

fn add_int(out: &mut TantivyDocument, field: Field, doc: &Value, key: &str) {
    if let Some(v) = doc.get(key).and_then(Value::as_i64) {
        out.add_i64(field, v);
    }
}

fn array<'a>(doc: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    doc.get(key)
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or(&[])
        .iter()
}

fn str_items<'a>(doc: &'a Value, key: &str) -> impl Iterator<Item = &'a str> {
    array(doc, key).filter_map(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_resolve_covers_searchable_fields() {
        let mapping = CourseMapping::new();
        for name in [
            "id",
            "code",
            "dept",
            "name",
            "sections.instructors",
            "sections.time",
            "acadYear",
            "semester",
        ] {
            assert!(mapping.resolve(name).is_some(), "unresolved field {name}");
        }
        assert!(mapping.resolve("roomTime").is_none());
    }

    #[test]
    fn test_course_doc_flattens_sections() {
        let mapping = CourseMapping::new();
        let doc = json!({
            "id": "c1",
            "code": "CS F111",
            "dept": "CS",
            "name": "Computer Programming",
            "sections": [
                {"instructors": ["John Doe"], "time": ["08:09"]},
                {"instructors": ["Jane Roe"], "time": ["10:11"]}
            ],
            "acadYear": 2024,
            "semester": 1
        });
        let engine_doc = mapping.to_doc(&doc);

        let times: Vec<_> = engine_doc
            .get_all(mapping.resolve("sections.time").unwrap().0)
            .collect();
        assert_eq!(times.len(), 2);

        let instructors: Vec<_> = engine_doc
            .get_all(mapping.resolve("sections.instructors").unwrap().0)
            .collect();
        assert_eq!(instructors.len(), 2);
    }

    #[test]
    fn test_timetable_doc_carries_course_summaries() {
        let mapping = TimetableMapping::new();
        let doc = json!({
            "id": "t1",
            "authorId": "user-1",
            "name": "Draft",
            "degrees": ["A7"],
            "year": 2,
            "acadYear": 2024,
            "semester": 1,
            "sections": [],
            "courses": [
                {"code": "CS F111", "name": "Computer Programming"},
                {"code": "CS F211", "name": "Data Structures"}
            ]
        });
        let engine_doc = mapping.to_doc(&doc);
        let codes: Vec<_> = engine_doc
            .get_all(mapping.resolve("courses.code").unwrap().0)
            .collect();
        assert_eq!(codes.len(), 2);
    }
}
