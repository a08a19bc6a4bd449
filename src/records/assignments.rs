use crate::model::{now_iso, Assignment, Document, Submission, SubmissionStatus, Subject};
use chrono::Utc;
use uuid::Uuid;

/// `assignment_<epoch-seconds>_<random suffix>`
fn new_assignment_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("assignment_{}_{}", Utc::now().timestamp(), &suffix[..12])
}

pub fn create(
    doc: &mut Document,
    title: &str,
    description: &str,
    subject: Subject,
    due_date: &str,
    created_by: &str,
) -> Assignment {
    let assignment = Assignment {
        id: new_assignment_id(),
        title: title.to_string(),
        description: description.to_string(),
        subject,
        due_date: due_date.to_string(),
        created_by: created_by.to_string(),
        created_at: now_iso(),
    };
    doc.assignments
        .get_or_insert_with(Default::default)
        .insert(assignment.id.clone(), assignment.clone());
    assignment
}

pub fn list_all(doc: &Document) -> Vec<Assignment> {
    doc.assignments
        .as_ref()
        .map(|a| a.values().cloned().collect())
        .unwrap_or_default()
}

pub fn list_by_subject(doc: &Document, subject: Subject) -> Vec<Assignment> {
    list_all(doc)
        .into_iter()
        .filter(|a| a.subject == subject)
        .collect()
}

/// Removes the assignment and every submission that points at it.
pub fn delete(doc: &mut Document, id: &str) -> bool {
    let removed = doc
        .assignments
        .as_mut()
        .and_then(|a| a.shift_remove(id))
        .is_some();
    if removed {
        if let Some(subs) = doc.submissions.as_mut() {
            for list in subs.values_mut() {
                list.retain(|s| s.assignment_id != id);
            }
        }
    }
    removed
}

/// Find-or-create the `(student, assignment)` submission, then apply the
/// update to it in place.
///
/// `submittedAt` is restamped whenever the status is `submitted` or `late`.
/// `grade` only overwrites when given, and `feedback` only when non-empty,
/// so an earlier value cannot be cleared through this call.
pub fn upsert_submission(
    doc: &mut Document,
    student_id: &str,
    assignment_id: &str,
    status: SubmissionStatus,
    grade: Option<f64>,
    feedback: &str,
) -> Submission {
    let list = doc
        .submissions
        .get_or_insert_with(Default::default)
        .entry(student_id.to_string())
        .or_default();

    let idx = match list.iter().position(|s| s.assignment_id == assignment_id) {
        Some(i) => i,
        None => {
            list.push(Submission {
                assignment_id: assignment_id.to_string(),
                student_id: student_id.to_string(),
                status,
                submitted_at: None,
                grade: None,
                feedback: String::new(),
            });
            list.len() - 1
        }
    };

    let sub = &mut list[idx];
    sub.status = status;
    if status.marks_handed_in() {
        sub.submitted_at = Some(now_iso());
    }
    if let Some(g) = grade {
        sub.grade = Some(g);
    }
    if !feedback.is_empty() {
        sub.feedback = feedback.to_string();
    }
    sub.clone()
}

pub fn submissions_for(doc: &Document, student_id: &str) -> Vec<Submission> {
    doc.submissions
        .as_ref()
        .and_then(|s| s.get(student_id))
        .cloned()
        .unwrap_or_default()
}
