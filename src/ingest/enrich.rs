//! Derived-field computation at ingestion time.

use crate::models::{
    Course, CourseInput, CourseSummary, Section, SectionInput, Timetable, TimetableInput,
};
use serde_json::Value;

/// Enrich an inbound course: derive the department code and normalize every
/// section's room-time entries.
pub fn enrich_course(input: CourseInput) -> Course {
    Course {
        dept: department_of(&input.code),
        id: input.id,
        code: input.code,
        name: input.name,
        sections: input.sections.into_iter().map(enrich_section).collect(),
        midsem_start_time: input.midsem_start_time,
        midsem_end_time: input.midsem_end_time,
        compre_start_time: input.compre_start_time,
        compre_end_time: input.compre_end_time,
        archived: input.archived,
        acad_year: input.acad_year,
        semester: input.semester,
        created_at: input.created_at,
    }
}

/// Enrich an inbound timetable with the course summaries resolved by the
/// caller (one per distinct referenced course).
pub fn enrich_timetable(input: TimetableInput, courses: Vec<CourseSummary>) -> Timetable {
    Timetable {
        id: input.id,
        author_id: input.author_id,
        name: input.name,
        degrees: input.degrees,
        private: input.private,
        draft: input.draft,
        archived: input.archived,
        year: input.year,
        acad_year: input.acad_year,
        semester: input.semester,
        sections: input.sections.into_iter().map(enrich_section).collect(),
        timings: input.timings,
        exam_times: input.exam_times,
        warnings: input.warnings,
        courses,
        created_at: input.created_at,
        last_updated: input.last_updated,
    }
}

fn enrich_section(input: SectionInput) -> Section {
    Section {
        id: input.id,
        course_id: input.course_id,
        kind: input.kind,
        number: input.number,
        instructors: input.instructors,
        time: input.room_time.iter().map(|raw| normalize_slot(raw)).collect(),
        created_at: input.created_at,
    }
}

/// First whitespace-delimited token of the course code.
fn department_of(code: &str) -> String {
    code.split_whitespace().next().unwrap_or_default().to_string()
}

/// Keep only the final two colon-delimited components of a raw room-time
/// entry, discarding the room/day prefix: "L1:MON:08:09" becomes "08:09".
fn normalize_slot(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(':').collect();
    parts[parts.len().saturating_sub(2)..].join(":")
}

/// Distinct `courseId`s referenced by the sections, in first-appearance
/// order.
pub fn referenced_course_ids(sections: &[SectionInput]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for section in sections {
        if !ids.contains(&section.course_id) {
            ids.push(section.course_id.clone());
        }
    }
    ids
}

/// Replace newline characters with spaces in every string of the document,
/// recursively through nested arrays and objects, so serialized text stays
/// single-line.
pub fn strip_newlines(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains('\n') {
                *s = s.replace('\n', " ");
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_newlines),
        Value::Object(map) => map.values_mut().for_each(strip_newlines),
        _ => {}
    }
}
