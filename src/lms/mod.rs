//! Learning Resources
//! Mission: Courses and the enrollments that link students to them

pub mod course_store;
pub mod models;

pub use course_store::CourseStore;
pub use models::{Course, CourseRequest, Enrollment, EnrollmentRequest};
