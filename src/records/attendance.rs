use crate::calc::{self, AttendanceStats};
use crate::model::{now_iso, AttendanceRecord, AttendanceStatus, Document, Subject};

/// Appends a record stamped with the current time.
pub fn add_record(
    doc: &mut Document,
    student_id: &str,
    status: AttendanceStatus,
    subject: Subject,
    teacher: &str,
    notes: &str,
) -> AttendanceRecord {
    let record = AttendanceRecord {
        date: now_iso(),
        status,
        subject,
        teacher: teacher.to_string(),
        notes: notes.to_string(),
    };
    doc.attendance
        .get_or_insert_with(Default::default)
        .entry(student_id.to_string())
        .or_default()
        .push(record.clone());
    record
}

pub fn records(doc: &Document, student_id: &str) -> Vec<AttendanceRecord> {
    doc.attendance
        .as_ref()
        .and_then(|a| a.get(student_id))
        .cloned()
        .unwrap_or_default()
}

pub fn stats(doc: &Document, student_id: &str, subject: Option<Subject>) -> AttendanceStats {
    let records = doc
        .attendance
        .as_ref()
        .and_then(|a| a.get(student_id))
        .map(Vec::as_slice)
        .unwrap_or_default();
    calc::attendance_stats(records, subject)
}
