//! Report emission. Both writers recompute from the raw collections on every
//! call, create their output directory if missing, and collapse any I/O
//! failure to `false`.

use crate::calc::{attendance_summaries, progress_summaries};
use crate::model::{AttendanceRecord, GradeRecord};
use std::fmt::Write as _;
use std::path::Path;
use tracing::warn;

/// Fixed-width text table of per-student attendance totals.
pub fn write_attendance_report(records: &[AttendanceRecord], output_path: &Path) -> bool {
    if !ensure_parent(output_path) {
        return false;
    }

    let mut out = String::new();
    out.push_str("ATTENDANCE REPORT\n");
    out.push_str("=================\n\n");
    let _ = writeln!(
        out,
        "{:<15} | {:<15} | {:<10} | {:<10}",
        "Student ID", "Total Classes", "Present", "Percentage"
    );
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for s in attendance_summaries(records) {
        let _ = writeln!(
            out,
            "{:<15} | {:<15} | {:<10} | {:.1}%",
            s.student_id, s.total, s.present, s.percentage
        );
    }

    write_file(output_path, &out)
}

/// Tabular progress report: `Student ID,Average Grade,Risk Level`.
pub fn write_progress_report(grades: &[GradeRecord], output_path: &Path) -> bool {
    if !ensure_parent(output_path) {
        return false;
    }

    let mut out = String::from("Student ID,Average Grade,Risk Level\n");
    for s in progress_summaries(grades) {
        let _ = writeln!(out, "{},{:.2},{}", s.student_id, s.average, s.risk.label());
    }

    write_file(output_path, &out)
}

fn ensure_parent(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return true;
    };
    if parent.as_os_str().is_empty() {
        return true;
    }
    match std::fs::create_dir_all(parent) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %parent.display(), error = %e, "failed to create report directory");
            false
        }
    }
}

fn write_file(path: &Path, contents: &str) -> bool {
    match std::fs::write(path, contents) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to write report");
            false
        }
    }
}
