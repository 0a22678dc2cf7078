//! Pure aggregation over already-loaded collections. No I/O here; the report
//! writers and the console views both consume these.

use crate::model::{AttendanceRecord, AttendanceStatus, GradeRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSummary {
    pub student_id: String,
    pub total: usize,
    pub present: usize,
    pub percentage: f64,
}

/// Per-student attendance totals, in first-appearance order.
pub fn attendance_summaries(records: &[AttendanceRecord]) -> Vec<AttendanceSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, (usize, usize)> = HashMap::new();
    for r in records {
        let entry = stats.entry(r.student_id.clone()).or_insert_with(|| {
            order.push(r.student_id.clone());
            (0, 0)
        });
        entry.0 += 1;
        if r.status == AttendanceStatus::Present {
            entry.1 += 1;
        }
    }
    order
        .into_iter()
        .map(|student_id| {
            let (total, present) = stats[&student_id];
            let percentage = if total > 0 {
                present as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            AttendanceSummary {
                student_id,
                total,
                present,
                percentage,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Ok,
    Moderate,
    Critical,
}

impl RiskLevel {
    pub fn classify(average: f64) -> RiskLevel {
        if average < 60.0 {
            RiskLevel::Critical
        } else if average < 75.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Ok
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Ok => "OK",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub student_id: String,
    pub average: f64,
    pub risk: RiskLevel,
}

/// Per-student grade averages, in first-appearance order. When a student has
/// any positive-weight row the average is the weight-normalized sum over
/// those rows; otherwise it falls back to the plain mean of all percentages.
pub fn progress_summaries(grades: &[GradeRecord]) -> Vec<ProgressSummary> {
    struct Acc {
        weighted_sum: f64,
        total_weight: f64,
        percentages: Vec<f64>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut accs: HashMap<String, Acc> = HashMap::new();
    for g in grades {
        let acc = accs.entry(g.student_id.clone()).or_insert_with(|| {
            order.push(g.student_id.clone());
            Acc {
                weighted_sum: 0.0,
                total_weight: 0.0,
                percentages: Vec::new(),
            }
        });
        let percentage = g.percentage();
        acc.percentages.push(percentage);
        if g.weight > 0.0 {
            acc.weighted_sum += percentage * g.weight;
            acc.total_weight += g.weight;
        }
    }

    order
        .into_iter()
        .map(|student_id| {
            let acc = &accs[&student_id];
            let average = if acc.total_weight > 0.0 {
                acc.weighted_sum / acc.total_weight
            } else if !acc.percentages.is_empty() {
                acc.percentages.iter().sum::<f64>() / acc.percentages.len() as f64
            } else {
                0.0
            };
            ProgressSummary {
                student_id,
                average,
                risk: RiskLevel::classify(average),
            }
        })
        .collect()
}

/// 4-point scale for one percentage.
pub fn grade_points(percentage: f64) -> f64 {
    if percentage >= 90.0 {
        4.0
    } else if percentage >= 80.0 {
        3.0
    } else if percentage >= 70.0 {
        2.0
    } else if percentage >= 60.0 {
        1.0
    } else {
        0.0
    }
}

/// Arithmetic mean of per-row points, rounded to two decimals. 0.0 with no
/// grades.
pub fn gpa(grades: &[GradeRecord]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: f64 = grades.iter().map(|g| grade_points(g.percentage())).sum();
    round2(total / grades.len() as f64)
}

/// Standing shown in the student progress view. Keeps the asymmetric
/// thresholds of the legacy display path (84 is Strong, 70 is At Risk),
/// distinct from the letter/point bands.
pub fn standing_label(average: f64) -> &'static str {
    if average >= 84.0 {
        "Strong"
    } else if average > 70.0 {
        "Moderate"
    } else {
        "At Risk"
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
