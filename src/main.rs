mod backup;
mod calc;
mod config;
mod error;
mod ipc;
mod model;
mod records;
mod store;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// School records (accounts, students, grades, assignments, exams,
/// attendance and messages) kept in one JSON document.
#[derive(Parser, Debug)]
#[command(name = "schoolbookd", version, about)]
struct Cli {
    #[command(flatten)]
    config: config::Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer newline-delimited JSON requests on stdin until EOF.
    Serve,
    /// Overwrite the document with the seed data.
    Init,
    #[command(subcommand)]
    Auth(AuthCmd),
    #[command(subcommand)]
    Students(StudentsCmd),
    #[command(subcommand)]
    Gpa(GpaCmd),
    #[command(subcommand)]
    Assignments(AssignmentsCmd),
    #[command(subcommand)]
    Exams(ExamsCmd),
    #[command(subcommand)]
    Attendance(AttendanceCmd),
    #[command(subcommand)]
    Messages(MessagesCmd),
    #[command(subcommand)]
    Backup(BackupCmd),
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum AuthCmd {
    /// Reset accounts to the seeded teachers.
    Init,
    Login { username: String, password: String },
    /// Register a parent account.
    Register {
        username: String,
        password: String,
        name: String,
    },
    Teachers,
    Parents,
    Students,
    /// Give a student record its own login.
    CreateStudentAccount {
        student_id: String,
        username: String,
        password: String,
    },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum StudentsCmd {
    /// Remove every student and grade map.
    Init,
    Add {
        name: String,
        surname: String,
        age: u32,
        parent_id: Option<String>,
    },
    List,
    ByParent { parent_id: String },
    Get { student_id: String },
    Delete { student_id: String },
    AddGrade {
        student_id: String,
        subject: String,
        grade: f64,
        teacher: String,
        comment: Option<String>,
    },
    GetGrades { student_id: String },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum GpaCmd {
    Calculate { student_id: String },
    ClassAverage { subject: String },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum AssignmentsCmd {
    Create {
        title: String,
        description: String,
        subject: String,
        due_date: String,
        created_by: String,
    },
    GetBySubject { subject: String },
    GetAll,
    Delete { assignment_id: String },
    UpdateSubmission {
        student_id: String,
        assignment_id: String,
        status: String,
        /// Left unchanged when omitted or empty.
        grade: Option<String>,
        feedback: Option<String>,
    },
    GetSubmissions { student_id: String },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum ExamsCmd {
    Create {
        title: String,
        subject: String,
        date: String,
        start_time: String,
        end_time: String,
        created_by: String,
    },
    GetBySubject { subject: String },
    GetAll,
    Delete { exam_id: String },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum AttendanceCmd {
    Add {
        student_id: String,
        status: String,
        subject: String,
        teacher: String,
        notes: Option<String>,
    },
    Get { student_id: String },
    Stats {
        student_id: String,
        subject: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum MessagesCmd {
    Send {
        from: String,
        from_role: String,
        to: String,
        to_role: String,
        subject: String,
        content: String,
    },
    Reply {
        message_id: String,
        from: String,
        from_role: String,
        content: String,
    },
    ListForUser { username: String },
    MarkRead { message_id: String },
    Delete { message_id: String },
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum BackupCmd {
    /// Write the document into a zip bundle.
    Export { path: PathBuf },
    /// Replace the document with the one inside a bundle.
    Import { path: PathBuf },
}

impl Command {
    /// The request a one-shot invocation stands for. `None` for `serve`.
    fn into_request(self) -> Option<(&'static str, Value)> {
        let call = match self {
            Command::Serve => return None,
            Command::Init => ("store.init", json!({})),
            Command::Auth(cmd) => match cmd {
                AuthCmd::Init => ("auth.init", json!({})),
                AuthCmd::Login { username, password } => (
                    "auth.login",
                    json!({ "username": username, "password": password }),
                ),
                AuthCmd::Register {
                    username,
                    password,
                    name,
                } => (
                    "auth.register",
                    json!({ "username": username, "password": password, "name": name }),
                ),
                AuthCmd::Teachers => ("auth.teachers", json!({})),
                AuthCmd::Parents => ("auth.parents", json!({})),
                AuthCmd::Students => ("auth.students", json!({})),
                AuthCmd::CreateStudentAccount {
                    student_id,
                    username,
                    password,
                } => (
                    "auth.create_student_account",
                    json!({ "studentId": student_id, "username": username, "password": password }),
                ),
            },
            Command::Students(cmd) => match cmd {
                StudentsCmd::Init => ("students.init", json!({})),
                StudentsCmd::Add {
                    name,
                    surname,
                    age,
                    parent_id,
                } => (
                    "students.add",
                    json!({ "name": name, "surname": surname, "age": age, "parentId": parent_id }),
                ),
                StudentsCmd::List => ("students.list", json!({})),
                StudentsCmd::ByParent { parent_id } => {
                    ("students.by_parent", json!({ "parentId": parent_id }))
                }
                StudentsCmd::Get { student_id } => {
                    ("students.get", json!({ "studentId": student_id }))
                }
                StudentsCmd::Delete { student_id } => {
                    ("students.delete", json!({ "studentId": student_id }))
                }
                StudentsCmd::AddGrade {
                    student_id,
                    subject,
                    grade,
                    teacher,
                    comment,
                } => (
                    "students.add_grade",
                    json!({
                        "studentId": student_id,
                        "subject": subject,
                        "grade": grade,
                        "teacher": teacher,
                        "comment": comment,
                    }),
                ),
                StudentsCmd::GetGrades { student_id } => {
                    ("students.get_grades", json!({ "studentId": student_id }))
                }
            },
            Command::Gpa(cmd) => match cmd {
                GpaCmd::Calculate { student_id } => {
                    ("gpa.calculate", json!({ "studentId": student_id }))
                }
                GpaCmd::ClassAverage { subject } => {
                    ("gpa.class_average", json!({ "subject": subject }))
                }
            },
            Command::Assignments(cmd) => match cmd {
                AssignmentsCmd::Create {
                    title,
                    description,
                    subject,
                    due_date,
                    created_by,
                } => (
                    "assignments.create",
                    json!({
                        "title": title,
                        "description": description,
                        "subject": subject,
                        "dueDate": due_date,
                        "createdBy": created_by,
                    }),
                ),
                AssignmentsCmd::GetBySubject { subject } => {
                    ("assignments.get_by_subject", json!({ "subject": subject }))
                }
                AssignmentsCmd::GetAll => ("assignments.get_all", json!({})),
                AssignmentsCmd::Delete { assignment_id } => {
                    ("assignments.delete", json!({ "assignmentId": assignment_id }))
                }
                AssignmentsCmd::UpdateSubmission {
                    student_id,
                    assignment_id,
                    status,
                    grade,
                    feedback,
                } => (
                    "assignments.update_submission",
                    json!({
                        "studentId": student_id,
                        "assignmentId": assignment_id,
                        "status": status,
                        "grade": grade,
                        "feedback": feedback,
                    }),
                ),
                AssignmentsCmd::GetSubmissions { student_id } => (
                    "assignments.get_submissions",
                    json!({ "studentId": student_id }),
                ),
            },
            Command::Exams(cmd) => match cmd {
                ExamsCmd::Create {
                    title,
                    subject,
                    date,
                    start_time,
                    end_time,
                    created_by,
                } => (
                    "exams.create",
                    json!({
                        "title": title,
                        "subject": subject,
                        "date": date,
                        "startTime": start_time,
                        "endTime": end_time,
                        "createdBy": created_by,
                    }),
                ),
                ExamsCmd::GetBySubject { subject } => {
                    ("exams.get_by_subject", json!({ "subject": subject }))
                }
                ExamsCmd::GetAll => ("exams.get_all", json!({})),
                ExamsCmd::Delete { exam_id } => ("exams.delete", json!({ "examId": exam_id })),
            },
            Command::Attendance(cmd) => match cmd {
                AttendanceCmd::Add {
                    student_id,
                    status,
                    subject,
                    teacher,
                    notes,
                } => (
                    "attendance.add",
                    json!({
                        "studentId": student_id,
                        "status": status,
                        "subject": subject,
                        "teacher": teacher,
                        "notes": notes,
                    }),
                ),
                AttendanceCmd::Get { student_id } => {
                    ("attendance.get", json!({ "studentId": student_id }))
                }
                AttendanceCmd::Stats {
                    student_id,
                    subject,
                } => (
                    "attendance.stats",
                    json!({ "studentId": student_id, "subject": subject }),
                ),
            },
            Command::Messages(cmd) => match cmd {
                MessagesCmd::Send {
                    from,
                    from_role,
                    to,
                    to_role,
                    subject,
                    content,
                } => (
                    "messages.send",
                    json!({
                        "from": from,
                        "fromRole": from_role,
                        "to": to,
                        "toRole": to_role,
                        "subject": subject,
                        "content": content,
                    }),
                ),
                MessagesCmd::Reply {
                    message_id,
                    from,
                    from_role,
                    content,
                } => (
                    "messages.reply",
                    json!({
                        "messageId": message_id,
                        "from": from,
                        "fromRole": from_role,
                        "content": content,
                    }),
                ),
                MessagesCmd::ListForUser { username } => {
                    ("messages.list_for_user", json!({ "username": username }))
                }
                MessagesCmd::MarkRead { message_id } => {
                    ("messages.mark_read", json!({ "messageId": message_id }))
                }
                MessagesCmd::Delete { message_id } => {
                    ("messages.delete", json!({ "messageId": message_id }))
                }
            },
            Command::Backup(cmd) => match cmd {
                BackupCmd::Export { path } => {
                    ("backup.export", json!({ "path": path.to_string_lossy() }))
                }
                BackupCmd::Import { path } => {
                    ("backup.import", json!({ "path": path.to_string_lossy() }))
                }
            },
        };
        Some(call)
    }
}

fn init_logging() {
    // stdout carries the JSON results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config::log_filter()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Prints the result on success, `{"error": ...}` otherwise.
fn run_once(state: &mut ipc::AppState, method: &str, params: Value) -> ExitCode {
    let resp = ipc::handle_request(
        state,
        ipc::Request {
            id: "cli".to_string(),
            method: method.to_string(),
            params,
        },
    );

    let succeeded = resp.get("ok").and_then(Value::as_bool).unwrap_or(false);
    let output = if succeeded {
        resp.get("result").cloned().unwrap_or(Value::Null)
    } else {
        let message = resp
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        json!({ "error": message })
    };

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output);
    let _ = stdout.flush();

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn serve(state: &mut ipc::AppState) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let mut state = ipc::AppState {
        store: cli.config.store(),
    };

    match cli.command.into_request() {
        Some((method, params)) => run_once(&mut state, method, params),
        None => {
            serve(&mut state);
            ExitCode::SUCCESS
        }
    }
}
