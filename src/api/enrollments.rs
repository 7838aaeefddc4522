//! Enrollment endpoints

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::response::{created, ok, ApiError, ApiResponse};
use crate::api::routes::AppState;
use crate::lms::models::{Course, Enrollment, EnrollmentRequest};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

const ALREADY_ENROLLED: &str = "User is already enrolled in this course";

/// POST /api/enrollments/enroll
pub async fn enroll(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EnrollmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), ApiError> {
    let EnrollmentRequest { user_id, course_id } = payload;

    if state.users.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::not_found("User", user_id));
    }
    if state.courses.get_course(course_id)?.is_none() {
        return Err(ApiError::not_found("Course", course_id));
    }
    if state.courses.find_enrollment(user_id, course_id)?.is_some() {
        return Err(ApiError::Conflict(ALREADY_ENROLLED.to_string()));
    }

    let enrollment = state
        .courses
        .create_enrollment(user_id, course_id)
        .map_err(|e| ApiError::conflict_on_unique(e, ALREADY_ENROLLED))?;
    Ok(created("Enrolled successfully", enrollment))
}

/// GET /api/enrollments/user/{userId}
pub async fn user_courses(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Course>>>), ApiError> {
    if state.users.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::not_found("User", user_id));
    }

    let courses = state.courses.courses_for_user(user_id)?;
    Ok(ok("Enrolled courses retrieved successfully", courses))
}
