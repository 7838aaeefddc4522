//! Course endpoints

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::response::{created, ok, ApiError, ApiResponse};
use crate::api::routes::AppState;
use crate::lms::models::{Course, CourseRequest};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

fn require_title(request: &CourseRequest) -> Result<&str, ApiError> {
    request
        .validated_title()
        .ok_or_else(|| ApiError::BadRequest("Course title is required".to_string()))
}

/// POST /api/courses/add
pub async fn add_course(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    let title = require_title(&payload)?;
    let course = state.courses.create_course(
        title,
        payload.description.as_deref(),
        payload.instructor_name.as_deref(),
        payload.photo_url.as_deref(),
    )?;

    Ok(created("Course created successfully", course))
}

/// GET /api/courses/all
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Course>>>), ApiError> {
    let courses = state.courses.list_courses()?;
    Ok(ok("Courses retrieved successfully", courses))
}

/// GET /api/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    state
        .courses
        .get_course(id)?
        .map(|course| ok("Course retrieved successfully", course))
        .ok_or(ApiError::not_found("Course", id))
}

/// PUT /api/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    let title = require_title(&payload)?;
    state
        .courses
        .update_course(
            id,
            title,
            payload.description.as_deref(),
            payload.instructor_name.as_deref(),
        )?
        .map(|course| ok("Course updated successfully", course))
        .ok_or(ApiError::not_found("Course", id))
}

/// DELETE /api/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    if !state.courses.delete_course(id)? {
        return Err(ApiError::not_found("Course", id));
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("Course deleted successfully")),
    ))
}
