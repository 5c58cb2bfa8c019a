//! In-memory lookup stores seeded from a fixtures document.
//!
//! The chat core treats user, course and enrollment data as external
//! services. These implementations stand in for them in a single-process
//! deployment; a fixtures file (or the built-in demo dataset) provides the
//! records.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    CourseCatalog, CourseId, EnrollmentLedger, LookupError, UserDirectory, UserId,
};

/// Seed data for the in-memory stores
#[derive(Debug, Clone, Deserialize)]
pub struct Fixtures {
    pub users: Vec<UserFixture>,
    pub courses: Vec<CourseFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseFixture {
    pub id: String,
    pub instructor: String,
    #[serde(default)]
    pub enrolled: Vec<String>,
}

impl Fixtures {
    /// Parse a fixtures document from JSON
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Built-in demo dataset used when no fixtures file is given
    pub fn demo() -> Self {
        Self {
            users: vec![
                UserFixture {
                    id: "u-ada".to_string(),
                    name: "Ada".to_string(),
                },
                UserFixture {
                    id: "u-grace".to_string(),
                    name: "Grace".to_string(),
                },
                UserFixture {
                    id: "u-linus".to_string(),
                    name: "Linus".to_string(),
                },
            ],
            courses: vec![
                CourseFixture {
                    id: "rust-101".to_string(),
                    instructor: "u-ada".to_string(),
                    enrolled: vec!["u-grace".to_string()],
                },
                CourseFixture {
                    id: "algo-201".to_string(),
                    instructor: "u-grace".to_string(),
                    enrolled: vec!["u-linus".to_string()],
                },
            ],
        }
    }
}

/// User-by-id lookup backed by a map
pub struct InMemoryUserDirectory {
    names: HashMap<String, String>,
}

impl InMemoryUserDirectory {
    pub fn new(fixtures: &Fixtures) -> Self {
        Self {
            names: fixtures
                .users
                .iter()
                .map(|u| (u.id.clone(), u.name.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, LookupError> {
        Ok(self.names.get(user_id.as_str()).cloned())
    }
}

/// Course-by-id lookup backed by a map
pub struct InMemoryCourseCatalog {
    instructors: HashMap<String, String>,
}

impl InMemoryCourseCatalog {
    pub fn new(fixtures: &Fixtures) -> Self {
        Self {
            instructors: fixtures
                .courses
                .iter()
                .map(|c| (c.id.clone(), c.instructor.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn instructor_of(&self, course_id: &CourseId) -> Result<Option<UserId>, LookupError> {
        match self.instructors.get(course_id.as_str()) {
            Some(instructor) => {
                let id = UserId::new(instructor.clone())
                    .map_err(|_| LookupError::MalformedId(instructor.clone()))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}

/// Enrollment lookup backed by a set of (user, course) pairs
pub struct InMemoryEnrollmentLedger {
    enrollments: HashSet<(String, String)>,
}

impl InMemoryEnrollmentLedger {
    pub fn new(fixtures: &Fixtures) -> Self {
        let mut enrollments = HashSet::new();
        for course in &fixtures.courses {
            for user in &course.enrolled {
                enrollments.insert((user.clone(), course.id.clone()));
            }
        }
        Self { enrollments }
    }
}

#[async_trait]
impl EnrollmentLedger for InMemoryEnrollmentLedger {
    async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, LookupError> {
        Ok(self
            .enrollments
            .contains(&(user_id.as_str().to_string(), course_id.as_str().to_string())))
    }
}
