use serde::{Deserialize, Serialize};

/// A section as submitted by the client, before enrichment.
///
/// `roomTime` entries carry a room/day prefix ("L1:MON:08:09") that is
/// dropped at ingestion; only the normalized `time` form is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    pub id: String,
    pub course_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub number: i64,
    pub instructors: Vec<String>,
    pub room_time: Vec<String>,
    pub created_at: String,
}

/// A stored section, embedded in a course or timetable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    /// Back-reference to the owning course; many timetables may carry
    /// sections referencing the same course.
    pub course_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub number: i64,
    pub instructors: Vec<String>,
    /// Normalized "HH:HH" slots derived from `roomTime`.
    pub time: Vec<String>,
    pub created_at: String,
}

/// A course as submitted by the client, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub id: String,
    pub code: String,
    pub name: String,
    pub sections: Vec<SectionInput>,
    pub midsem_start_time: Option<String>,
    pub midsem_end_time: Option<String>,
    pub compre_start_time: Option<String>,
    pub compre_end_time: Option<String>,
    pub archived: bool,
    pub acad_year: i64,
    pub semester: i64,
    pub created_at: String,
}

/// A stored course document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    /// First whitespace-delimited token of `code`, derived at ingestion.
    pub dept: String,
    pub name: String,
    pub sections: Vec<Section>,
    pub midsem_start_time: Option<String>,
    pub midsem_end_time: Option<String>,
    pub compre_start_time: Option<String>,
    pub compre_end_time: Option<String>,
    pub archived: bool,
    pub acad_year: i64,
    pub semester: i64,
    pub created_at: String,
}
