//! Catalog service: the write state machine and search orchestration.

use crate::error::{AppError, Result};
use crate::ingest::enrich::{
    enrich_course, enrich_timetable, referenced_course_ids, strip_newlines,
};
use crate::models::{Course, CourseInput, CourseSummary, TimetableInput};
use crate::schema;
use crate::search::{
    compile_course, compile_timetable, Collection, CourseSearchParams, Hit, IndexGateway, Page,
    TimetableSearchParams, PAGE_SIZE,
};
use serde_json::Value;
use std::sync::Arc;

/// Request-scoped orchestration over the shared engine handle.
///
/// The service holds no state of its own beyond the gateway; each call is
/// independent and duplicate/reference checks are plain read-then-write
/// sequences. That is acceptable only because each logical id is expected to
/// be written by a single owning client (accepted race, not a solved one).
pub struct CatalogService {
    gateway: Arc<dyn IndexGateway>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn IndexGateway>) -> Self {
        Self { gateway }
    }

    /// Search courses. Rejects a request with no usable parameter.
    pub async fn search_courses(&self, params: &CourseSearchParams) -> Result<Vec<Hit>> {
        let query = compile_course(params)?;
        self.gateway
            .search(Collection::Courses, &query, Page::first(PAGE_SIZE))
            .await
    }

    /// Search timetables. With no usable parameter this returns an
    /// unranked match-everything page.
    pub async fn search_timetables(&self, params: &TimetableSearchParams) -> Result<Vec<Hit>> {
        let query = compile_timetable(params);
        self.gateway
            .search(
                Collection::Timetables,
                &query,
                Page {
                    limit: PAGE_SIZE,
                    offset: params.offset,
                },
            )
            .await
    }

    /// Ingest a course: validate, reject duplicates, enrich, write.
    pub async fn add_course(&self, raw: Value) -> Result<Value> {
        schema::COURSE
            .validate(&raw)
            .map_err(|e| AppError::Validation(format!("Invalid course data: {e}")))?;
        let input: CourseInput = serde_json::from_value(raw)
            .map_err(|e| AppError::Validation(format!("Invalid course data: {e}")))?;

        if self
            .gateway
            .find_by_id(Collection::Courses, &input.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Course already exists".to_string()));
        }

        let course = enrich_course(input);
        let mut doc = to_document(&course)?;
        strip_newlines(&mut doc);
        self.gateway
            .index_document(Collection::Courses, &doc)
            .await?;

        tracing::info!(id = %course.id, code = %course.code, "Course added");
        Ok(doc)
    }

    /// Ingest a timetable: validate, reject duplicates, resolve every
    /// referenced course, enrich, write.
    pub async fn add_timetable(&self, raw: Value) -> Result<Value> {
        schema::TIMETABLE
            .validate(&raw)
            .map_err(|e| AppError::Validation(format!("Invalid timetable data: {e}")))?;
        let input: TimetableInput = serde_json::from_value(raw)
            .map_err(|e| AppError::Validation(format!("Invalid timetable data: {e}")))?;

        if self
            .gateway
            .find_by_id(Collection::Timetables, &input.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Timetable already exists".to_string()));
        }

        // A missing reference aborts before anything is written. The copied
        // summaries are point-in-time: they are never refreshed if the
        // course changes later.
        let mut summaries = Vec::new();
        for course_id in referenced_course_ids(&input.sections) {
            let Some(found) = self
                .gateway
                .find_by_id(Collection::Courses, &course_id)
                .await?
            else {
                return Err(AppError::NotFound(format!("Course {course_id} not found")));
            };
            let course: Course = serde_json::from_value(found)
                .map_err(|e| AppError::Backend(format!("stored course is malformed: {e}")))?;
            summaries.push(CourseSummary {
                code: course.code,
                name: course.name,
            });
        }

        let timetable = enrich_timetable(input, summaries);
        let mut doc = to_document(&timetable)?;
        strip_newlines(&mut doc);
        self.gateway
            .index_document(Collection::Timetables, &doc)
            .await?;

        tracing::info!(id = %timetable.id, author = %timetable.author_id, "Timetable added");
        Ok(doc)
    }

    /// Remove a course by its logical id.
    pub async fn remove_course(&self, id: &str) -> Result<()> {
        self.remove(Collection::Courses, id, "Course not found").await
    }

    /// Remove a timetable by its logical id.
    pub async fn remove_timetable(&self, id: &str) -> Result<()> {
        self.remove(Collection::Timetables, id, "Timetable not found")
            .await
    }

    /// Locate-then-delete. Absence at either step reports the same
    /// NotFound as a target that never existed.
    async fn remove(&self, collection: Collection, id: &str, missing: &str) -> Result<()> {
        if self.gateway.find_by_id(collection, id).await?.is_none() {
            return Err(AppError::NotFound(missing.to_string()));
        }
        if !self.gateway.delete_by_id(collection, id).await? {
            return Err(AppError::NotFound(missing.to_string()));
        }
        Ok(())
    }
}

fn to_document<T: serde::Serialize>(entity: &T) -> Result<Value> {
    serde_json::to_value(entity)
        .map_err(|e| AppError::Backend(format!("failed to serialize document: {e}")))
}
