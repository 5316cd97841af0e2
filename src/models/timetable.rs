use crate::models::{Section, SectionInput};
use serde::{Deserialize, Serialize};

/// Point-in-time summary of a referenced course, copied into the timetable
/// at write time and never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub code: String,
    pub name: String,
}

/// A timetable as submitted by the client, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub degrees: Vec<String>,
    pub private: bool,
    pub draft: bool,
    pub archived: bool,
    pub year: i64,
    pub acad_year: i64,
    pub semester: i64,
    pub sections: Vec<SectionInput>,
    pub timings: Vec<String>,
    pub exam_times: Vec<String>,
    pub warnings: Vec<String>,
    pub created_at: String,
    pub last_updated: String,
}

/// A stored timetable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub degrees: Vec<String>,
    pub private: bool,
    pub draft: bool,
    pub archived: bool,
    pub year: i64,
    pub acad_year: i64,
    pub semester: i64,
    pub sections: Vec<Section>,
    pub timings: Vec<String>,
    pub exam_times: Vec<String>,
    pub warnings: Vec<String>,
    /// One entry per distinct `courseId` referenced by `sections`.
    pub courses: Vec<CourseSummary>,
    pub created_at: String,
    pub last_updated: String,
}
