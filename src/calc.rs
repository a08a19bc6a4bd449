use crate::model::{AttendanceRecord, AttendanceStatus, GradeBook, GradeEntry, Subject};
use indexmap::IndexMap;
use serde::Serialize;

/// Two-decimal rounding used for every reported average.
pub fn round_2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut n: usize = 0;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpaSummary {
    pub gpa: f64,
    pub subjects: IndexMap<Subject, f64>,
    #[serde(rename = "totalSubjects")]
    pub total_subjects: usize,
}

impl GpaSummary {
    pub fn empty() -> Self {
        GpaSummary {
            gpa: 0.0,
            subjects: IndexMap::new(),
            total_subjects: 0,
        }
    }
}

/// Mean of per-subject means. Subjects without entries are left out of
/// both the subject map and the overall figure; the overall value uses
/// the unrounded subject means.
pub fn student_gpa(book: &GradeBook) -> GpaSummary {
    let mut subjects = IndexMap::new();
    let mut total = 0.0;
    for (subject, entries) in &book.subjects {
        let Some(avg) = mean(entries.iter().map(|g| g.grade)) else {
            continue;
        };
        subjects.insert(*subject, round_2(avg));
        total += avg;
    }
    let total_subjects = subjects.len();
    let gpa = if total_subjects > 0 {
        round_2(total / total_subjects as f64)
    } else {
        0.0
    };
    GpaSummary {
        gpa,
        subjects,
        total_subjects,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAverage {
    pub average: f64,
    pub count: usize,
}

/// Flat mean over every entry in `subject`, whoever it belongs to.
pub fn class_average<'a, I>(books: I, subject: Subject) -> ClassAverage
where
    I: IntoIterator<Item = &'a GradeBook>,
{
    let grades: Vec<f64> = books
        .into_iter()
        .filter_map(|book| book.subjects.get(&subject))
        .flat_map(|entries: &Vec<GradeEntry>| entries.iter().map(|g| g.grade))
        .collect();
    match mean(grades.iter().copied()) {
        Some(avg) => ClassAverage {
            average: round_2(avg),
            count: grades.len(),
        },
        None => ClassAverage {
            average: 0.0,
            count: 0,
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total: usize,
    pub percentage: f64,
}

pub fn attendance_stats(records: &[AttendanceRecord], subject: Option<Subject>) -> AttendanceStats {
    let mut stats = AttendanceStats::default();
    for r in records
        .iter()
        .filter(|r| subject.map_or(true, |s| r.subject == s))
    {
        match r.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
        }
        stats.total += 1;
    }
    if stats.total > 0 {
        stats.percentage = round_2(stats.present as f64 / stats.total as f64 * 100.0);
    }
    stats
}
