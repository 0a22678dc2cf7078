use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of account roles. Every dispatch site matches exhaustively, so
/// there is no "unknown role" fallback path at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Letter used when assigning ids like `S-001`.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Role::Admin => "A",
            Role::Teacher => "T",
            Role::Student => "S",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Admin" => Some(Role::Admin),
            "Teacher" => Some(Role::Teacher),
            "Student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<AttendanceStatus> {
        match s {
            "P" => Some(AttendanceStatus::Present),
            "A" => Some(AttendanceStatus::Absent),
            "L" => Some(AttendanceStatus::Late),
            "E" => Some(AttendanceStatus::Excused),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "P",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::Late => "L",
            AttendanceStatus::Excused => "E",
        }
    }
}

fn default_active() -> bool {
    true
}

/// One account. On-disk keys keep the underscore-prefixed names the legacy
/// users.json was written with; records seeded without `_user_id` or
/// `_is_active` load with an empty id / active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_user_id", default)]
    pub user_id: String,
    #[serde(rename = "_username")]
    pub username: String,
    #[serde(rename = "_password_hash")]
    pub password: String,
    #[serde(rename = "_role")]
    pub role: Role,
    #[serde(rename = "_is_active", default = "default_active")]
    pub is_active: bool,
    #[serde(
        rename = "_enrolled_courses",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub enrolled_courses: Vec<String>,
}

impl UserRecord {
    /// Plain equality comparison is the authentication contract; there is no
    /// real hashing in this system.
    pub fn authenticate(&self, password: &str) -> bool {
        self.password == password
    }
}

/// One attendance event. Append-only; duplicates for the same
/// (student, course, date) are kept as recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub course_id: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub recorded_by: String,
}

/// One grade event. `score > max_score` is accepted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub student_id: String,
    pub course_id: String,
    pub score: f64,
    pub max_score: f64,
    pub weight: f64,
}

impl GradeRecord {
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0.0 {
            self.score / self.max_score * 100.0
        } else {
            0.0
        }
    }

    pub fn letter(&self) -> char {
        let p = self.percentage();
        if p >= 90.0 {
            'A'
        } else if p >= 80.0 {
            'B'
        } else if p >= 70.0 {
            'C'
        } else if p >= 60.0 {
            'D'
        } else {
            'F'
        }
    }
}
