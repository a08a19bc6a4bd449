use super::stamped_id;
use crate::model::{now_iso, Document, Exam, Subject};

pub struct NewExam<'a> {
    pub title: &'a str,
    pub subject: Subject,
    pub date: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub created_by: &'a str,
}

pub fn create(doc: &mut Document, new: NewExam<'_>) -> Exam {
    let exam = Exam {
        id: stamped_id("exam"),
        title: new.title.to_string(),
        subject: new.subject,
        date: new.date.to_string(),
        start_time: new.start_time.to_string(),
        end_time: new.end_time.to_string(),
        created_by: new.created_by.to_string(),
        created_at: now_iso(),
    };
    doc.exams
        .get_or_insert_with(Default::default)
        .insert(exam.id.clone(), exam.clone());
    exam
}

pub fn list_all(doc: &Document) -> Vec<Exam> {
    doc.exams
        .as_ref()
        .map(|e| e.values().cloned().collect())
        .unwrap_or_default()
}

pub fn list_by_subject(doc: &Document, subject: Subject) -> Vec<Exam> {
    list_all(doc)
        .into_iter()
        .filter(|e| e.subject == subject)
        .collect()
}

pub fn delete(doc: &mut Document, id: &str) -> bool {
    doc.exams
        .as_mut()
        .and_then(|e| e.shift_remove(id))
        .is_some()
}
