use crate::model::{now_iso, Document, GradeBook, GradeEntry, Student, Subject};

/// Adds a student with the next free `student_<n>` ID and an empty grade
/// map covering every subject.
pub fn create(
    doc: &mut Document,
    name: &str,
    surname: &str,
    age: u32,
    parent_id: Option<&str>,
) -> Student {
    let id = doc.next_student_id();
    let student = Student {
        id: id.clone(),
        name: name.to_string(),
        surname: surname.to_string(),
        age,
        created_at: now_iso(),
        parent_id: parent_id.map(str::to_string),
        username: None,
        extra: serde_json::Map::new(),
    };
    doc.students.insert(id.clone(), student.clone());
    doc.grades.insert(id, GradeBook::empty());
    student
}

pub fn list(doc: &Document) -> Vec<Student> {
    doc.students.values().cloned().collect()
}

pub fn by_parent(doc: &Document, parent: &str) -> Vec<Student> {
    doc.students
        .values()
        .filter(|s| s.parent_id.as_deref() == Some(parent))
        .cloned()
        .collect()
}

pub fn get(doc: &Document, id: &str) -> Option<Student> {
    doc.students.get(id).cloned()
}

/// Removes the student together with everything keyed by their ID and
/// their login, if one was created. Returns whether the student existed.
pub fn delete(doc: &mut Document, id: &str) -> bool {
    let Some(student) = doc.students.shift_remove(id) else {
        return false;
    };
    if let Some(username) = student.username.as_deref() {
        let linked = doc
            .users
            .get(username)
            .is_some_and(|u| u.student_id.as_deref() == Some(id));
        if linked {
            doc.users.shift_remove(username);
        }
    }
    doc.grades.shift_remove(id);
    if let Some(attendance) = doc.attendance.as_mut() {
        attendance.shift_remove(id);
    }
    if let Some(submissions) = doc.submissions.as_mut() {
        submissions.shift_remove(id);
    }
    true
}

/// Appends to `grades[id][subject]`. `None` when the student has no
/// grade map.
pub fn add_grade(
    doc: &mut Document,
    id: &str,
    subject: Subject,
    grade: f64,
    teacher: &str,
    comment: Option<&str>,
) -> Option<GradeEntry> {
    let book = doc.grades.get_mut(id)?;
    let entry = GradeEntry {
        grade,
        teacher: teacher.to_string(),
        date: now_iso(),
        comment: comment.map(str::to_string),
    };
    book.subjects.entry(subject).or_default().push(entry.clone());
    Some(entry)
}

pub fn grades<'a>(doc: &'a Document, id: &str) -> Option<&'a GradeBook> {
    doc.grades.get(id)
}

/// Drops every student and grade map. The ID counter is left alone so
/// earlier IDs are never handed out again.
pub fn reset(doc: &mut Document) {
    doc.students.clear();
    doc.grades.clear();
}
