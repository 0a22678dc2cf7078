//! Flat-file store. Owns the data directory and is the sole writer of
//! `users.json`, `attendance.csv` and `grades.csv`. Collections handed out
//! are copies; callers mutate their copy and call the matching save to
//! persist. Public loads never fail and public saves return a bool; the
//! richer failure taxonomy from the codec stays internal and is logged.

use crate::codec::{self, CodecError, Tabular};
use crate::model::{AttendanceRecord, AttendanceStatus, GradeRecord, Role, UserRecord};
use anyhow::Context;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const USERS_FILE: &str = "users.json";
pub const ATTENDANCE_FILE: &str = "attendance.csv";
pub const GRADES_FILE: &str = "grades.csv";
pub const BACKUP_DIR: &str = "backups";

pub const ATTENDANCE_FIELDS: &[&str] = &["student_id", "course_id", "date", "status", "recorded_by"];
pub const GRADE_FIELDS: &[&str] = &["student_id", "course_id", "score", "max_score", "weight"];

/// Field name older producers used in place of `recorded_by`. Renamed to the
/// canonical name once at load; never accepted alongside it.
const LEGACY_RECORDED_BY: &str = "marked_by";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserOpError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("no such user")]
    UnknownUser,
    #[error("failed to persist the user collection")]
    Persist,
}

pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Creates the data directory if absent.
    pub fn new(data_dir: impl Into<PathBuf>) -> anyhow::Result<Store> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        Ok(Store { data_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    // Users

    pub fn load_users(&self) -> Vec<UserRecord> {
        match codec::read_json_array(&self.file_path(USERS_FILE)) {
            Ok(users) => users,
            Err(CodecError::NotFound) => Vec::new(),
            Err(e) => {
                warn!(file = USERS_FILE, error = %e, "load degraded to empty collection");
                Vec::new()
            }
        }
    }

    pub fn save_users(&self, users: &[UserRecord]) -> bool {
        match codec::write_json_array(&self.file_path(USERS_FILE), users) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = USERS_FILE, error = %e, "save failed");
                false
            }
        }
    }

    /// Derived view: users with role Student. Not independently persisted.
    pub fn load_students(&self) -> Vec<UserRecord> {
        self.load_users()
            .into_iter()
            .filter(|u| u.role == Role::Student)
            .collect()
    }

    /// Rejects duplicate usernames without touching the collection, assigns
    /// the next `{prefix}-{NNN}` id for the role, appends and persists. On a
    /// persistence failure the in-memory collection is rolled back.
    pub fn add_user(
        &self,
        users: &mut Vec<UserRecord>,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserRecord, UserOpError> {
        if users.iter().any(|u| u.username == username) {
            return Err(UserOpError::DuplicateUsername);
        }
        let user = UserRecord {
            user_id: next_user_id(users, role),
            username: username.to_string(),
            password: password.to_string(),
            role,
            is_active: true,
            enrolled_courses: Vec::new(),
        };
        users.push(user.clone());
        if !self.save_users(users) {
            users.pop();
            return Err(UserOpError::Persist);
        }
        Ok(user)
    }

    /// Mutates username and is_active only, then persists. A new username
    /// colliding with another account is rejected before anything changes.
    pub fn update_user(
        &self,
        users: &mut [UserRecord],
        user_id: &str,
        new_username: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<(), UserOpError> {
        if let Some(name) = new_username {
            if users
                .iter()
                .any(|u| u.username == name && u.user_id != user_id)
            {
                return Err(UserOpError::DuplicateUsername);
            }
        }
        let idx = users
            .iter()
            .position(|u| u.user_id == user_id)
            .ok_or(UserOpError::UnknownUser)?;
        let previous = users[idx].clone();
        if let Some(name) = new_username {
            users[idx].username = name.to_string();
        }
        if let Some(active) = is_active {
            users[idx].is_active = active;
        }
        if !self.save_users(users) {
            users[idx] = previous;
            return Err(UserOpError::Persist);
        }
        Ok(())
    }

    pub fn delete_user(
        &self,
        users: &mut Vec<UserRecord>,
        user_id: &str,
    ) -> Result<(), UserOpError> {
        let idx = users
            .iter()
            .position(|u| u.user_id == user_id)
            .ok_or(UserOpError::UnknownUser)?;
        let removed = users.remove(idx);
        if !self.save_users(users) {
            users.insert(idx, removed);
            return Err(UserOpError::Persist);
        }
        Ok(())
    }

    // Attendance

    pub fn load_attendance(&self) -> Vec<AttendanceRecord> {
        let tab = self.read_tabular_degraded(ATTENDANCE_FILE);
        let recorded_by_key = if !tab.has_column("recorded_by") && tab.has_column(LEGACY_RECORDED_BY)
        {
            info!(
                file = ATTENDANCE_FILE,
                "renaming legacy {} field to recorded_by", LEGACY_RECORDED_BY
            );
            LEGACY_RECORDED_BY
        } else {
            "recorded_by"
        };

        let mut records = Vec::with_capacity(tab.rows.len());
        for row in &tab.rows {
            let parsed = (|| {
                Some(AttendanceRecord {
                    student_id: tab.field(row, "student_id")?.to_string(),
                    course_id: tab.field(row, "course_id")?.to_string(),
                    date: tab.field(row, "date")?.to_string(),
                    status: AttendanceStatus::parse(tab.field(row, "status")?)?,
                    recorded_by: tab.field(row, recorded_by_key).unwrap_or_default().to_string(),
                })
            })();
            match parsed {
                Some(r) => records.push(r),
                None => warn!(file = ATTENDANCE_FILE, ?row, "dropping unreadable row"),
            }
        }
        records
    }

    pub fn save_attendance(&self, records: &[AttendanceRecord]) -> bool {
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|r| {
                vec![
                    r.student_id.clone(),
                    r.course_id.clone(),
                    r.date.clone(),
                    r.status.code().to_string(),
                    r.recorded_by.clone(),
                ]
            })
            .collect();
        self.write_tabular_logged(ATTENDANCE_FILE, ATTENDANCE_FIELDS, &rows)
    }

    // Grades

    pub fn load_grades(&self) -> Vec<GradeRecord> {
        let tab = self.read_tabular_degraded(GRADES_FILE);
        let mut records = Vec::with_capacity(tab.rows.len());
        for row in &tab.rows {
            let parsed = (|| {
                Some(GradeRecord {
                    student_id: tab.field(row, "student_id")?.to_string(),
                    course_id: tab.field(row, "course_id")?.to_string(),
                    score: tab.field(row, "score")?.parse().ok()?,
                    max_score: tab.field(row, "max_score")?.parse().ok()?,
                    // Older producers omit the weight column; load as 0 so
                    // those rows take the unweighted-average path.
                    weight: tab
                        .field(row, "weight")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0.0),
                })
            })();
            match parsed {
                Some(r) => records.push(r),
                None => warn!(file = GRADES_FILE, ?row, "dropping unreadable row"),
            }
        }
        records
    }

    pub fn save_grades(&self, records: &[GradeRecord]) -> bool {
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|g| {
                vec![
                    g.student_id.clone(),
                    g.course_id.clone(),
                    g.score.to_string(),
                    g.max_score.to_string(),
                    g.weight.to_string(),
                ]
            })
            .collect();
        self.write_tabular_logged(GRADES_FILE, GRADE_FIELDS, &rows)
    }

    // Backup

    /// Copies every existing data file into `backups/` with a
    /// `YYYYMMDD_HHMMSS` stamp. True only if at least one file was copied.
    /// Old backups are never rotated or deleted.
    pub fn backup_data(&self) -> bool {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.backup_data_at(&stamp)
    }

    /// Backup with a caller-supplied stamp. Two backups sharing a stamp
    /// collide on filename and the later copy overwrites the earlier.
    pub fn backup_data_at(&self, stamp: &str) -> bool {
        let backup_dir = self.data_dir.join(BACKUP_DIR);
        if let Err(e) = std::fs::create_dir_all(&backup_dir) {
            warn!(error = %e, "failed to create backup directory");
            return false;
        }
        let mut copied = false;
        for name in [USERS_FILE, ATTENDANCE_FILE, GRADES_FILE] {
            let src = self.file_path(name);
            if !src.is_file() {
                continue;
            }
            let dst = backup_dir.join(format!("{}.{}.bak", name, stamp));
            match std::fs::copy(&src, &dst) {
                Ok(_) => copied = true,
                Err(e) => {
                    warn!(file = name, error = %e, "backup copy failed");
                    return false;
                }
            }
        }
        copied
    }

    // Integrity

    /// Startup gate: conjunction of the three per-file checks. Absent files
    /// are vacuously valid. The caller must abort on false.
    pub fn validate_integrity(&self) -> bool {
        self.users_file_valid() && self.attendance_file_valid() && self.grades_file_valid()
    }

    fn users_file_valid(&self) -> bool {
        let path = self.file_path(USERS_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return true,
            Err(e) => {
                warn!(file = USERS_FILE, error = %e, "integrity check cannot read file");
                return false;
            }
        };
        if text.is_empty() {
            // Zero-byte file: self-heal to an empty collection.
            info!(file = USERS_FILE, "empty users file; initializing to an empty collection");
            return codec::write_json_array::<UserRecord>(&path, &[]).is_ok();
        }
        match serde_json::from_str::<Vec<UserRecord>>(&text) {
            Ok(_) => true,
            Err(e) => {
                warn!(file = USERS_FILE, error = %e, "integrity check failed");
                false
            }
        }
    }

    fn attendance_file_valid(&self) -> bool {
        let Some(tab) = self.read_tabular_for_check(ATTENDANCE_FILE) else {
            return false;
        };
        let Some(tab) = tab else {
            return true; // absent
        };
        for row in &tab.rows {
            for name in ["student_id", "course_id", "date"] {
                if tab.field(row, name).is_none() {
                    warn!(file = ATTENDANCE_FILE, ?row, "row missing {}", name);
                    return false;
                }
            }
            let status = tab.field(row, "status");
            if status.and_then(AttendanceStatus::parse).is_none() {
                warn!(file = ATTENDANCE_FILE, ?row, "row has invalid status");
                return false;
            }
        }
        true
    }

    fn grades_file_valid(&self) -> bool {
        let Some(tab) = self.read_tabular_for_check(GRADES_FILE) else {
            return false;
        };
        let Some(tab) = tab else {
            return true; // absent
        };
        for row in &tab.rows {
            for name in ["student_id", "course_id"] {
                if tab.field(row, name).is_none() {
                    warn!(file = GRADES_FILE, ?row, "row missing {}", name);
                    return false;
                }
            }
            for name in ["score", "max_score"] {
                let numeric = tab
                    .field(row, name)
                    .map(|v| v.parse::<f64>().is_ok())
                    .unwrap_or(false);
                if !numeric {
                    warn!(file = GRADES_FILE, ?row, "row has non-numeric {}", name);
                    return false;
                }
            }
        }
        true
    }

    /// Ok(Some) = parsed, Ok(None) = absent, outer None = unreadable.
    fn read_tabular_for_check(&self, name: &str) -> Option<Option<Tabular>> {
        match codec::read_tabular(&self.file_path(name)) {
            Ok(tab) => Some(Some(tab)),
            Err(CodecError::NotFound) => Some(None),
            Err(e) => {
                warn!(file = name, error = %e, "integrity check cannot read file");
                None
            }
        }
    }

    fn read_tabular_degraded(&self, name: &str) -> Tabular {
        match codec::read_tabular(&self.file_path(name)) {
            Ok(tab) => tab,
            Err(CodecError::NotFound) => Tabular::default(),
            Err(e) => {
                warn!(file = name, error = %e, "load degraded to empty collection");
                Tabular::default()
            }
        }
    }

    fn write_tabular_logged(&self, name: &str, header: &[&str], rows: &[Vec<String>]) -> bool {
        if rows.is_empty() {
            debug!(file = name, "nothing to save");
            return true;
        }
        match codec::write_tabular(&self.file_path(name), header, rows) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = name, error = %e, "save failed");
                false
            }
        }
    }
}

fn next_user_id(users: &[UserRecord], role: Role) -> String {
    let prefix = role.id_prefix();
    let mut max_seq = 0u32;
    for u in users {
        if let Some((p, n)) = u.user_id.split_once('-') {
            if p == prefix {
                if let Ok(v) = n.parse::<u32>() {
                    max_seq = max_seq.max(v);
                }
            }
        }
    }
    format!("{}-{:03}", prefix, max_seq + 1)
}
