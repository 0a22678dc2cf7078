//! Session control: login loop and one dashboard per role. Every role
//! dispatch is an exhaustive match on [`Role`]; action handlers return
//! `None` when the input stream closed mid-action so the loop can fall
//! through to the shutdown path.

use crate::calc;
use crate::model::{AttendanceRecord, GradeRecord, Role, UserRecord};
use crate::report;
use crate::store::{Store, UserOpError};
use crate::ui;
use std::path::Path;
use tracing::{info, warn};

pub const ATTENDANCE_REPORT_FILE: &str = "attendance_report.txt";
pub const PROGRESS_REPORT_FILE: &str = "progress_report.csv";

enum SessionEnd {
    Logout,
    Exit,
    Interrupted,
}

/// Login/dispatch loop. Returns once the user exits or the input stream
/// closes; either way a best-effort backup runs first.
pub fn run(store: &Store, reports_dir: &Path) {
    loop {
        let Some((username, password)) = ui::prompt_login() else {
            return shutdown(store, true);
        };
        let users = store.load_users();
        match users.iter().find(|u| u.username == username) {
            Some(user) if user.authenticate(&password) && user.is_active => {
                info!(user_id = %user.user_id, role = %user.role, "login accepted");
                println!("Welcome, {}!", user.username);
                match run_session(store, reports_dir, user.clone()) {
                    SessionEnd::Logout => continue,
                    SessionEnd::Exit => return shutdown(store, false),
                    SessionEnd::Interrupted => return shutdown(store, true),
                }
            }
            Some(user) if user.authenticate(&password) => {
                warn!(target: "security", user = %username, "login rejected: inactive account");
                println!("Login failed. Account is inactive.");
            }
            _ => {
                warn!(target: "security", user = %username, "login rejected: bad credentials");
                println!("Login failed. Invalid credentials.");
            }
        }
    }
}

fn shutdown(store: &Store, interrupted: bool) {
    if interrupted {
        info!("input stream closed; shutting down");
    }
    if store.backup_data() {
        info!("shutdown backup written");
    } else {
        warn!("shutdown backup wrote nothing");
    }
    println!("Goodbye!");
}

fn run_session(store: &Store, reports_dir: &Path, user: UserRecord) -> SessionEnd {
    match user.role {
        Role::Admin => admin_session(store, reports_dir, &user),
        Role::Teacher => teacher_session(store, &user),
        Role::Student => student_session(store, user),
    }
}

fn prompt_exit() -> Option<bool> {
    ui::prompt_confirmation("Are you sure you want to exit?")
}

// Admin

const ADMIN_MENU: &[(&str, &str)] = &[
    ("1", "Add User"),
    ("2", "Update User"),
    ("3", "Delete User"),
    ("4", "System Reports"),
    ("5", "Logout"),
    ("6", "Exit"),
];

fn admin_session(store: &Store, reports_dir: &Path, admin: &UserRecord) -> SessionEnd {
    loop {
        println!("\n[ADMIN DASHBOARD]");
        let Some(choice) = ui::prompt_menu(ADMIN_MENU) else {
            return SessionEnd::Interrupted;
        };
        let outcome = match choice.as_str() {
            "1" => admin_add_user(store, admin),
            "2" => admin_update_user(store, admin),
            "3" => admin_delete_user(store, admin),
            "4" => {
                admin_reports(store, reports_dir, admin);
                Some(())
            }
            "5" => return SessionEnd::Logout,
            "6" => match prompt_exit() {
                None => return SessionEnd::Interrupted,
                Some(true) => return SessionEnd::Exit,
                Some(false) => Some(()),
            },
            _ => unreachable!("menu validates the selection"),
        };
        if outcome.is_none() {
            return SessionEnd::Interrupted;
        }
    }
}

fn admin_add_user(store: &Store, admin: &UserRecord) -> Option<()> {
    let username = ui::prompt_nonempty("Username")?;
    let password = ui::prompt_nonempty("Password")?;
    let role = ui::prompt_role("Role")?;
    let mut users = store.load_users();
    match store.add_user(&mut users, &username, &password, role) {
        Ok(user) => {
            info!(actor = %admin.user_id, new_user = %user.user_id, "user created");
            println!("User {} created successfully.", user.username);
        }
        Err(UserOpError::DuplicateUsername) => println!("Username already exists."),
        Err(e) => {
            warn!(actor = %admin.user_id, error = %e, "add user failed");
            println!("Failed to save user data.");
        }
    }
    Some(())
}

fn admin_update_user(store: &Store, admin: &UserRecord) -> Option<()> {
    let user_id = ui::prompt_nonempty("User ID")?;
    let username = ui::prompt_nonempty("New username")?;
    let active = ui::prompt_confirmation("Should the account be active?")?;
    let mut users = store.load_users();
    match store.update_user(&mut users, &user_id, Some(&username), Some(active)) {
        Ok(()) => {
            info!(actor = %admin.user_id, user_id = %user_id, "user updated");
            println!("User updated successfully.");
        }
        Err(UserOpError::UnknownUser) => println!("User not found."),
        Err(UserOpError::DuplicateUsername) => println!("Username already exists."),
        Err(e) => {
            warn!(actor = %admin.user_id, error = %e, "update user failed");
            println!("Failed to save user data.");
        }
    }
    Some(())
}

fn admin_delete_user(store: &Store, admin: &UserRecord) -> Option<()> {
    let user_id = ui::prompt_nonempty("User ID")?;
    if !ui::prompt_confirmation("Delete this user?")? {
        return Some(());
    }
    let mut users = store.load_users();
    match store.delete_user(&mut users, &user_id) {
        Ok(()) => {
            info!(actor = %admin.user_id, user_id = %user_id, "user deleted");
            println!("User deleted successfully.");
        }
        Err(UserOpError::UnknownUser) => println!("User not found."),
        Err(e) => {
            warn!(actor = %admin.user_id, error = %e, "delete user failed");
            println!("Failed to save user data.");
        }
    }
    Some(())
}

fn admin_reports(store: &Store, reports_dir: &Path, admin: &UserRecord) {
    let attendance = store.load_attendance();
    let grades = store.load_grades();
    let attendance_path = reports_dir.join(ATTENDANCE_REPORT_FILE);
    let progress_path = reports_dir.join(PROGRESS_REPORT_FILE);
    let attendance_ok = report::write_attendance_report(&attendance, &attendance_path);
    let progress_ok = report::write_progress_report(&grades, &progress_path);
    if attendance_ok && progress_ok {
        info!(actor = %admin.user_id, "reports generated");
        println!("Reports generated.");
        println!("  {}", attendance_path.display());
        println!("  {}", progress_path.display());
    } else {
        warn!(actor = %admin.user_id, "report generation failed");
        println!("Failed to generate reports.");
    }
}

// Teacher

const TEACHER_MENU: &[(&str, &str)] = &[
    ("1", "Mark Attendance"),
    ("2", "Assign Grade"),
    ("3", "View Students"),
    ("4", "View Student Progress"),
    ("5", "Logout"),
    ("6", "Exit"),
];

fn teacher_session(store: &Store, teacher: &UserRecord) -> SessionEnd {
    loop {
        println!("\n[TEACHER DASHBOARD]");
        let Some(choice) = ui::prompt_menu(TEACHER_MENU) else {
            return SessionEnd::Interrupted;
        };
        let outcome = match choice.as_str() {
            "1" => teacher_mark_attendance(store, teacher),
            "2" => teacher_assign_grade(store, teacher),
            "3" => {
                teacher_view_students(store);
                Some(())
            }
            "4" => teacher_view_progress(store),
            "5" => return SessionEnd::Logout,
            "6" => match prompt_exit() {
                None => return SessionEnd::Interrupted,
                Some(true) => return SessionEnd::Exit,
                Some(false) => Some(()),
            },
            _ => unreachable!("menu validates the selection"),
        };
        if outcome.is_none() {
            return SessionEnd::Interrupted;
        }
    }
}

fn teacher_mark_attendance(store: &Store, teacher: &UserRecord) -> Option<()> {
    let student_id = ui::prompt_nonempty("Student ID")?;
    let course_id = ui::prompt_nonempty("Course ID")?;
    let date = ui::prompt_date("Date")?;
    let status = ui::prompt_status("Status (P/A/L/E)")?;

    let mut records = store.load_attendance();
    records.push(AttendanceRecord {
        student_id: student_id.clone(),
        course_id,
        date,
        status,
        recorded_by: teacher.username.clone(),
    });
    if store.save_attendance(&records) {
        info!(actor = %teacher.user_id, student_id = %student_id, "attendance recorded");
        println!("Attendance marked successfully.");
    } else {
        println!("Failed to save attendance data.");
    }
    Some(())
}

fn teacher_assign_grade(store: &Store, teacher: &UserRecord) -> Option<()> {
    let student_id = ui::prompt_nonempty("Student ID")?;
    let course_id = ui::prompt_nonempty("Course ID")?;
    let score = ui::prompt_f64("Score", 0.0, None)?;
    let max_score = ui::prompt_positive_f64("Max Score")?;
    let weight = ui::prompt_f64("Weight", 0.0, Some(1.0))?;

    let mut grades = store.load_grades();
    grades.push(GradeRecord {
        student_id: student_id.clone(),
        course_id,
        score,
        max_score,
        weight,
    });
    if store.save_grades(&grades) {
        info!(actor = %teacher.user_id, student_id = %student_id, "grade recorded");
        println!("Grade assigned successfully.");
    } else {
        println!("Failed to save grade data.");
    }
    Some(())
}

fn teacher_view_students(store: &Store) {
    let students = store.load_students();
    if students.is_empty() {
        println!("No students found.");
        return;
    }
    println!("\n{:<10} {:<20} {:<8}", "ID", "Username", "Active");
    for s in &students {
        println!(
            "{:<10} {:<20} {:<8}",
            s.user_id,
            s.username,
            if s.is_active { "yes" } else { "no" }
        );
    }
}

fn teacher_view_progress(store: &Store) -> Option<()> {
    let student_id = ui::prompt_nonempty("Student ID")?;
    let grades: Vec<GradeRecord> = store
        .load_grades()
        .into_iter()
        .filter(|g| g.student_id == student_id)
        .collect();
    if grades.is_empty() {
        println!("No grades recorded for {}.", student_id);
        return Some(());
    }
    for g in &grades {
        println!(
            "{}: {}/{} ({:.1}%)",
            g.course_id,
            g.score,
            g.max_score,
            g.percentage()
        );
    }
    if let Some(summary) = calc::progress_summaries(&grades).first() {
        println!(
            "Average: {:.2}% (risk level: {})",
            summary.average,
            summary.risk.label()
        );
    }
    Some(())
}

// Student

const STUDENT_MENU: &[(&str, &str)] = &[
    ("1", "Check Attendance"),
    ("2", "Check Progress"),
    ("3", "View Courses"),
    ("4", "Enroll in Course"),
    ("5", "Change Password"),
    ("6", "Logout"),
    ("7", "Exit"),
];

fn student_session(store: &Store, mut student: UserRecord) -> SessionEnd {
    loop {
        println!("\n[STUDENT DASHBOARD]");
        let Some(choice) = ui::prompt_menu(STUDENT_MENU) else {
            return SessionEnd::Interrupted;
        };
        let outcome = match choice.as_str() {
            "1" => {
                student_check_attendance(store, &student);
                Some(())
            }
            "2" => {
                student_check_progress(store, &student);
                Some(())
            }
            "3" => {
                student_view_courses(&student);
                Some(())
            }
            "4" => student_enroll(store, &mut student),
            "5" => student_change_password(store, &mut student),
            "6" => return SessionEnd::Logout,
            "7" => match prompt_exit() {
                None => return SessionEnd::Interrupted,
                Some(true) => return SessionEnd::Exit,
                Some(false) => Some(()),
            },
            _ => unreachable!("menu validates the selection"),
        };
        if outcome.is_none() {
            return SessionEnd::Interrupted;
        }
    }
}

fn student_check_attendance(store: &Store, student: &UserRecord) {
    let records: Vec<AttendanceRecord> = store
        .load_attendance()
        .into_iter()
        .filter(|r| r.student_id == student.user_id)
        .collect();
    if records.is_empty() {
        println!("No attendance records found.");
        return;
    }
    println!("\n{:<12} {:<10} {:<6}", "Date", "Course", "Status");
    for r in &records {
        println!("{:<12} {:<10} {:<6}", r.date, r.course_id, r.status.code());
    }
    if let Some(summary) = calc::attendance_summaries(&records).first() {
        println!(
            "Present {} of {} ({:.1}%)",
            summary.present, summary.total, summary.percentage
        );
    }
}

fn student_check_progress(store: &Store, student: &UserRecord) {
    let grades: Vec<GradeRecord> = store
        .load_grades()
        .into_iter()
        .filter(|g| g.student_id == student.user_id)
        .collect();
    if grades.is_empty() {
        println!("No grades recorded.");
        return;
    }
    for g in &grades {
        println!(
            "{}: {}/{} ({:.1}%) [{}]",
            g.course_id,
            g.score,
            g.max_score,
            g.percentage(),
            g.letter()
        );
    }
    if let Some(summary) = calc::progress_summaries(&grades).first() {
        println!(
            "Average: {:.2}% ({})",
            summary.average,
            calc::standing_label(summary.average)
        );
    }
    println!("GPA: {:.2}", calc::gpa(&grades));
}

fn student_view_courses(student: &UserRecord) {
    if student.enrolled_courses.is_empty() {
        println!("No enrolled courses.");
        return;
    }
    println!("Enrolled courses:");
    for course in &student.enrolled_courses {
        println!("  {}", course);
    }
}

fn student_enroll(store: &Store, student: &mut UserRecord) -> Option<()> {
    let course_id = ui::prompt_nonempty("Course ID")?;
    if student.enrolled_courses.contains(&course_id) {
        println!("Already enrolled in {}.", course_id);
        return Some(());
    }

    let mut users = store.load_users();
    let Some(record) = users.iter_mut().find(|u| u.user_id == student.user_id) else {
        println!("Failed to save user data.");
        return Some(());
    };
    record.enrolled_courses.push(course_id.clone());
    if store.save_users(&users) {
        student.enrolled_courses.push(course_id.clone());
        info!(actor = %student.user_id, course = %course_id, "course enrolled");
        println!("Enrolled in {}.", course_id);
    } else {
        println!("Failed to save user data.");
    }
    Some(())
}

fn student_change_password(store: &Store, student: &mut UserRecord) -> Option<()> {
    let password = ui::prompt_nonempty("New password")?;
    let mut users = store.load_users();
    let Some(record) = users.iter_mut().find(|u| u.user_id == student.user_id) else {
        println!("Failed to save user data.");
        return Some(());
    };
    record.password = password.clone();
    if store.save_users(&users) {
        student.password = password;
        info!(actor = %student.user_id, "password changed");
        println!("Password changed successfully.");
    } else {
        println!("Failed to save user data.");
    }
    Some(())
}
