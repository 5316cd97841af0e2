use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::search::{CourseSearchParams, TimetableSearchParams};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct CourseSearchResult {
    pub course: Value,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct TimetableSearchResult {
    pub timetable: Value,
    pub score: f32,
}

/// Search courses
pub async fn search_courses(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<CourseSearchResult>>> {
    let params = course_params(pairs);
    let hits = state.catalog.search_courses(&params).await?;
    Ok(Json(
        hits.into_iter()
            .map(|hit| CourseSearchResult {
                course: hit.document,
                score: hit.score,
            })
            .collect(),
    ))
}

/// Search timetables
pub async fn search_timetables(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<TimetableSearchResult>>> {
    let params = timetable_params(pairs);
    let hits = state.catalog.search_timetables(&params).await?;
    Ok(Json(
        hits.into_iter()
            .map(|hit| TimetableSearchResult {
                timetable: hit.document,
                score: hit.score,
            })
            .collect(),
    ))
}

/// Ingest a course
pub async fn add_course(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let stored = state.catalog.add_course(raw).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Ingest a timetable
pub async fn add_timetable(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let stored = state.catalog.add_timetable(raw).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Remove a course by logical id
pub async fn remove_course(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let id = require_id(&body, "Invalid course id")?;
    state.catalog.remove_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a timetable by logical id
pub async fn remove_timetable(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let id = require_id(&body, "Invalid timetable id")?;
    state.catalog.remove_timetable(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_id<'a>(body: &'a Value, message: &str) -> Result<&'a str> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

fn course_params(pairs: Vec<(String, String)>) -> CourseSearchParams {
    let mut params = CourseSearchParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            "query" => params.query = Some(value),
            "name" => params.name = Some(value),
            "code" => params.code = Some(value),
            "dept" => params.dept = Some(value),
            "instructor" => params.instructors.push(value),
            "time" => params.time.push(value),
            // Unrecognized parameters are ignored.
            _ => {}
        }
    }
    params
}

fn timetable_params(pairs: Vec<(String, String)>) -> TimetableSearchParams {
    let mut params = TimetableSearchParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            "query" => params.query = Some(value),
            "name" => params.name = Some(value),
            "authorId" => params.author_id = Some(value),
            // Non-numeric values are ignored, not errors.
            "year" => params.year = value.parse().ok(),
            "acadYear" => params.acad_year = value.parse().ok(),
            "semester" => params.semester = value.parse().ok(),
            "degree" => params.degrees.push(value),
            "instructor" => params.instructors.push(value),
            "course" => params.courses.push(value),
            "offset" => {
                if let Ok(offset) = value.parse() {
                    params.offset = offset;
                }
            }
            _ => {}
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_parameters_collect_into_lists() {
        let params = course_params(pairs(&[
            ("query", "programming"),
            ("instructor", "Rahul"),
            ("instructor", "Meera"),
            ("time", "08:09"),
        ]));
        assert_eq!(params.query.as_deref(), Some("programming"));
        assert_eq!(params.instructors, vec!["Rahul", "Meera"]);
        assert_eq!(params.time, vec!["08:09"]);
    }

    #[test]
    fn test_unrecognized_and_malformed_parameters_are_ignored() {
        let params = timetable_params(pairs(&[
            ("year", "two"),
            ("offset", "abc"),
            ("units", "3"),
            ("degree", "CS"),
        ]));
        assert_eq!(params.year, None);
        assert_eq!(params.offset, 0);
        assert_eq!(params.degrees, vec!["CS"]);
    }
}
