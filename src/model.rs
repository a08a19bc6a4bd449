use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The closed set of subjects taught. Serialized by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    English,
    Math,
    Biology,
    Chemistry,
    Physics,
    History,
    Geography,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Art,
    #[serde(rename = "Physical Education")]
    PhysicalEducation,
}

impl Subject {
    pub const ALL: [Subject; 10] = [
        Subject::English,
        Subject::Math,
        Subject::Biology,
        Subject::Chemistry,
        Subject::Physics,
        Subject::History,
        Subject::Geography,
        Subject::ComputerScience,
        Subject::Art,
        Subject::PhysicalEducation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Subject::English => "English",
            Subject::Math => "Math",
            Subject::Biology => "Biology",
            Subject::Chemistry => "Chemistry",
            Subject::Physics => "Physics",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::ComputerScience => "Computer Science",
            Subject::Art => "Art",
            Subject::PhysicalEducation => "Physical Education",
        }
    }

    /// Exact display-name match, as stored in grade books.
    fn from_name(name: &str) -> Option<Subject> {
        Subject::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Seeded teacher login for this subject, e.g. `ComputerScienceTeacher`.
    fn teacher_username(self) -> String {
        format!("{}Teacher", self.name().replace(' ', ""))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Subject {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let want = squash(s);
        Subject::ALL
            .into_iter()
            .find(|subj| squash(subj.name()) == want)
            .ok_or_else(|| UnknownVariant {
                kind: "subject",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Parent,
    Student,
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            "student" => Ok(Role::Student),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl FromStr for AttendanceStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(UnknownVariant {
                kind: "attendance status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Late,
    Graded,
}

impl SubmissionStatus {
    /// Statuses that stamp `submittedAt` when applied.
    pub fn marks_handed_in(self) -> bool {
        matches!(self, SubmissionStatus::Submitted | SubmissionStatus::Late)
    }
}

impl FromStr for SubmissionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "submitted" => Ok(SubmissionStatus::Submitted),
            "late" => Ok(SubmissionStatus::Late),
            "graded" => Ok(SubmissionStatus::Graded),
            _ => Err(UnknownVariant {
                kind: "submission status",
                value: s.to_string(),
            }),
        }
    }
}

/// Stored account. Passwords are kept and compared in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    /// Set on student accounts: the record this login belongs to.
    #[serde(rename = "studentId", default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Fields other clients store on an account (e.g. `profilePicture`).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What callers get back from a login: the account without its password.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub role: Role,
    pub name: String,
    pub subject: Option<Subject>,
    #[serde(rename = "studentId", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        PublicUser {
            username: u.username.clone(),
            role: u.role,
            name: u.name.clone(),
            subject: u.subject,
            student_id: u.student_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: u32,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Login linked through `auth.create_student_account`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub grade: f64,
    pub teacher: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One student's grades by subject.
///
/// Keys that are not one of the ten subjects (older files took any name)
/// are kept verbatim in `other`; they are written back unchanged and take
/// no part in averages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeBook {
    pub subjects: IndexMap<Subject, Vec<GradeEntry>>,
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl GradeBook {
    /// Grade map for a newly created student: every subject, no entries.
    pub fn empty() -> Self {
        GradeBook {
            subjects: Subject::ALL.into_iter().map(|s| (s, Vec::new())).collect(),
            other: serde_json::Map::new(),
        }
    }
}

impl Serialize for GradeBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.subjects.len() + self.other.len()))?;
        for (subject, entries) in &self.subjects {
            map.serialize_entry(subject, entries)?;
        }
        for (key, value) in &self.other {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GradeBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut book = GradeBook::default();
        for (key, value) in raw {
            match Subject::from_name(&key) {
                Some(subject) => {
                    let entries = serde_json::from_value(value).map_err(D::Error::custom)?;
                    book.subjects.insert(subject, entries);
                }
                None => {
                    book.other.insert(key, value);
                }
            }
        }
        Ok(book)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: Subject,
    pub due_date: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub assignment_id: String,
    pub student_id: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<String>,
    pub grade: Option<f64>,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub status: AttendanceStatus,
    pub subject: Subject,
    pub teacher: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReply {
    pub id: String,
    pub from: String,
    pub from_role: Role,
    pub content: String,
    pub timestamp: String,
}

/// A note between two accounts. `subject` is the free-text title line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from: String,
    pub from_role: Role,
    pub to: String,
    pub to_role: Role,
    pub subject: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub replies: Vec<MessageReply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub subject: Subject,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub created_by: String,
    pub created_at: String,
}

/// The whole persisted state. `assignments`, `submissions`, `attendance`,
/// `exams` and `messages` only appear once something has been written to
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: IndexMap<String, User>,
    #[serde(default)]
    pub students: IndexMap<String, Student>,
    #[serde(default)]
    pub grades: IndexMap<String, GradeBook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<IndexMap<String, Assignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submissions: Option<IndexMap<String, Vec<Submission>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<IndexMap<String, Vec<AttendanceRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exams: Option<IndexMap<String, Exam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<IndexMap<String, Message>>,
    /// Last issued student number. Never decreases.
    #[serde(rename = "studentSeq", default)]
    pub student_seq: u64,
    /// Top-level keys written by other tools, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Fresh document: the ten subject teachers and nothing else.
    pub fn seed() -> Self {
        Document {
            users: seed_teachers(),
            students: IndexMap::new(),
            grades: IndexMap::new(),
            assignments: None,
            submissions: None,
            attendance: None,
            exams: None,
            messages: None,
            student_seq: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Allocates `student_<n>`. Documents written before `studentSeq`
    /// existed are reconciled against the live IDs first.
    pub fn next_student_id(&mut self) -> String {
        let live_max = self
            .students
            .keys()
            .filter_map(|id| id.strip_prefix("student_"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.student_seq = self.student_seq.max(live_max) + 1;
        format!("student_{}", self.student_seq)
    }
}

pub fn seed_teachers() -> IndexMap<String, User> {
    Subject::ALL
        .into_iter()
        .map(|subject| {
            let username = subject.teacher_username();
            let user = User {
                username: username.clone(),
                password: subject.name().replace(' ', ""),
                role: Role::Teacher,
                name: format!("{} Teacher", subject.name()),
                subject: Some(subject),
                student_id: None,
                extra: serde_json::Map::new(),
            };
            (username, user)
        })
        .collect()
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
