pub mod courses;
pub mod enrollments;
pub mod extract;
pub mod response;
pub mod routes;
pub mod users;

pub use extract::{ApiJson, ApiPath};
pub use response::{ApiError, ApiResponse};
pub use routes::{create_router, AppState};
