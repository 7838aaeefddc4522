//! Course Storage
//! Mission: Persist courses and enrollments next to the user table

use crate::lms::models::{Course, Enrollment};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

/// Course and enrollment storage with SQLite backend
pub struct CourseStore {
    db_path: String,
}

impl CourseStore {
    /// Open the store. The `users` table is expected to live in the same file.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {}", self.db_path))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                instructor_name TEXT,
                photo_url TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS enrollments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                course_id INTEGER NOT NULL,
                enrolled_at TEXT NOT NULL,
                UNIQUE (user_id, course_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            )",
            [],
        )?;

        Ok(())
    }

    pub fn create_course(
        &self,
        title: &str,
        description: Option<&str>,
        instructor_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Course> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO courses (title, description, instructor_name, photo_url)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, description, instructor_name, photo_url],
        )
        .context("Failed to insert course")?;

        let course = Course {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.map(str::to_string),
            instructor_name: instructor_name.map(str::to_string),
            photo_url: photo_url.map(str::to_string),
        };

        info!("Created course {}: {}", course.id, course.title);
        Ok(course)
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, instructor_name, photo_url FROM courses ORDER BY id",
        )?;

        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    pub fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let conn = self.connect()?;
        let course = conn
            .query_row(
                "SELECT id, title, description, instructor_name, photo_url FROM courses WHERE id = ?1",
                params![id],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    /// Update title, description and instructor. The photo is left as is.
    pub fn update_course(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        instructor_name: Option<&str>,
    ) -> Result<Option<Course>> {
        let conn = self.connect()?;
        let rows = conn.execute(
            "UPDATE courses SET title = ?1, description = ?2, instructor_name = ?3 WHERE id = ?4",
            params![title, description, instructor_name, id],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        info!("Updated course {}", id);
        self.get_course(id)
    }

    /// Delete a course and its enrollments. Returns false if it did not exist.
    pub fn delete_course(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let rows = conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;

        if rows > 0 {
            info!("Deleted course {}", id);
        }
        Ok(rows > 0)
    }

    pub fn find_enrollment(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        let conn = self.connect()?;
        let enrollment = conn
            .query_row(
                "SELECT id, user_id, course_id, enrolled_at FROM enrollments
                 WHERE user_id = ?1 AND course_id = ?2",
                params![user_id, course_id],
                enrollment_from_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    pub fn create_enrollment(&self, user_id: i64, course_id: i64) -> Result<Enrollment> {
        let enrolled_at = Utc::now().to_rfc3339();

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO enrollments (user_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)",
            params![user_id, course_id, enrolled_at],
        )
        .context("Failed to insert enrollment")?;

        let enrollment = Enrollment {
            id: conn.last_insert_rowid(),
            user_id,
            course_id,
            enrolled_at,
        };

        info!("User {} enrolled in course {}", user_id, course_id);
        Ok(enrollment)
    }

    pub fn courses_for_user(&self, user_id: i64) -> Result<Vec<Course>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.title, c.description, c.instructor_name, c.photo_url
             FROM enrollments e JOIN courses c ON c.id = e.course_id
             WHERE e.user_id = ?1
             ORDER BY e.id",
        )?;

        let courses = stmt
            .query_map(params![user_id], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        instructor_name: row.get(3)?,
        photo_url: row.get(4)?,
    })
}

fn enrollment_from_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        enrolled_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::ApiError;
    use crate::auth::models::Role;
    use crate::auth::user_store::UserStore;
    use tempfile::NamedTempFile;

    struct Fixture {
        users: UserStore,
        courses: CourseStore,
        _temp: NamedTempFile,
    }

    fn fixture() -> Fixture {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap();
        let users = UserStore::new(path).unwrap();
        let courses = CourseStore::new(path).unwrap();
        Fixture {
            users,
            courses,
            _temp: temp,
        }
    }

    #[test]
    fn test_course_crud() {
        let f = fixture();

        let course = f
            .courses
            .create_course("Rust 101", Some("Ownership"), Some("Ferris"), Some("http://img/rust.png"))
            .unwrap();
        assert_eq!(f.courses.get_course(course.id).unwrap(), Some(course.clone()));

        let updated = f
            .courses
            .update_course(course.id, "Rust 102", None, Some("Corro"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Rust 102");
        assert_eq!(updated.description, None);
        assert_eq!(updated.instructor_name.as_deref(), Some("Corro"));
        assert_eq!(updated.photo_url.as_deref(), Some("http://img/rust.png"));

        assert!(f.courses.delete_course(course.id).unwrap());
        assert!(!f.courses.delete_course(course.id).unwrap());
        assert!(f.courses.get_course(course.id).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_course() {
        let f = fixture();
        assert!(f.courses.update_course(99, "x", None, None).unwrap().is_none());
    }

    #[test]
    fn test_list_courses_in_insert_order() {
        let f = fixture();
        f.courses.create_course("A", None, None, None).unwrap();
        f.courses.create_course("B", None, None, None).unwrap();

        let titles: Vec<String> = f
            .courses
            .list_courses()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_enrollment_lifecycle() {
        let f = fixture();
        let student = f
            .users
            .create_user("Sam", "sam@example.com", "h", Role::Student)
            .unwrap();
        let rust = f.courses.create_course("Rust", None, None, None).unwrap();
        let go = f.courses.create_course("Go", None, None, None).unwrap();

        assert!(f.courses.find_enrollment(student.id, rust.id).unwrap().is_none());
        let enrollment = f.courses.create_enrollment(student.id, rust.id).unwrap();
        assert_eq!(enrollment.user_id, student.id);
        assert_eq!(
            f.courses.find_enrollment(student.id, rust.id).unwrap(),
            Some(enrollment)
        );

        // Duplicate is refused by the table constraint as well
        let err = f.courses.create_enrollment(student.id, rust.id).unwrap_err();
        let mapped = ApiError::conflict_on_unique(err, "already enrolled");
        assert_eq!(mapped.status_code(), axum::http::StatusCode::CONFLICT);

        f.courses.create_enrollment(student.id, go.id).unwrap();
        let titles: Vec<String> = f
            .courses
            .courses_for_user(student.id)
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_deleting_course_removes_enrollments() {
        let f = fixture();
        let student = f
            .users
            .create_user("Sam", "sam@example.com", "h", Role::Student)
            .unwrap();
        let course = f.courses.create_course("Rust", None, None, None).unwrap();
        f.courses.create_enrollment(student.id, course.id).unwrap();

        f.courses.delete_course(course.id).unwrap();
        assert!(f.courses.courses_for_user(student.id).unwrap().is_empty());
    }

    #[test]
    fn test_enrollment_requires_existing_rows() {
        let f = fixture();
        let course = f.courses.create_course("Rust", None, None, None).unwrap();
        let err = f.courses.create_enrollment(12345, course.id).unwrap_err();

        // Foreign key failures are not conflicts
        let mapped = ApiError::conflict_on_unique(err, "already enrolled");
        assert_eq!(mapped.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
