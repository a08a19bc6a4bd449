use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Runs one invocation and returns its exit code and the single JSON value
/// it printed (`Null` when stdout was empty).
fn run(data_file: &Path, args: &[&str]) -> (i32, Value) {
    let out = Command::new(env!("CARGO_BIN_EXE_schoolbookd"))
        .arg("--data-file")
        .arg(data_file)
        .args(args)
        .output()
        .expect("run schoolbookd");
    let stdout = String::from_utf8(out.stdout).expect("utf8 stdout");
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(lines.len() <= 1, "expected one JSON value, got {:?}", lines);
    let value = lines
        .first()
        .map(|l| serde_json::from_str(l).expect("stdout is json"))
        .unwrap_or(Value::Null);
    (out.status.code().unwrap_or(-1), value)
}

fn run_ok(data_file: &Path, args: &[&str]) -> Value {
    let (code, value) = run(data_file, args);
    assert_eq!(code, 0, "{:?} failed: {}", args, value);
    value
}

#[test]
fn login_and_parent_registration() {
    let dir = temp_dir("schoolbook-cli-auth");
    let db = dir.join("database.json");

    let ok = run_ok(&db, &["auth", "login", "ComputerScienceTeacher", "ComputerScience"]);
    assert_eq!(ok["success"], true);
    assert_eq!(
        ok["user"],
        json!({
            "username": "ComputerScienceTeacher",
            "role": "teacher",
            "name": "Computer Science Teacher",
            "subject": "Computer Science"
        })
    );
    assert!(ok["user"].get("password").is_none());

    let wrong = run_ok(&db, &["auth", "login", "MathTeacher", "nope"]);
    assert_eq!(wrong, json!({ "success": false, "error": "Invalid credentials" }));
    let ghost = run_ok(&db, &["auth", "login", "ghost", "Math"]);
    assert_eq!(ghost["success"], false);

    let reg = run_ok(&db, &["auth", "register", "john_parent", "secret", "John Johnson"]);
    assert_eq!(reg["user"]["role"], "parent");
    let dup = run_ok(&db, &["auth", "register", "john_parent", "x", "Someone"]);
    assert_eq!(dup, json!({ "success": false, "error": "Username already exists" }));
    let clash = run_ok(&db, &["auth", "register", "ArtTeacher", "x", "Someone"]);
    assert_eq!(clash["success"], false);

    let parent_login = run_ok(&db, &["auth", "login", "john_parent", "secret"]);
    assert_eq!(parent_login["user"]["subject"], Value::Null);

    let parents = run_ok(&db, &["auth", "parents"]);
    assert_eq!(parents["users"].as_array().map(Vec::len), Some(1));
    let teachers = run_ok(&db, &["auth", "teachers"]);
    assert_eq!(teachers["users"].as_array().map(Vec::len), Some(10));

    run_ok(&db, &["auth", "init"]);
    let gone = run_ok(&db, &["auth", "login", "john_parent", "secret"]);
    assert_eq!(gone["success"], false);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn submission_upsert_mutates_one_record() {
    let dir = temp_dir("schoolbook-cli-submissions");
    let db = dir.join("database.json");

    let a = run_ok(
        &db,
        &[
            "assignments",
            "create",
            "Essay",
            "Five paragraphs",
            "English",
            "2026-11-01",
            "EnglishTeacher",
        ],
    );
    let aid = a["id"].as_str().expect("assignment id").to_string();
    assert!(aid.starts_with("assignment_"));
    assert_eq!(a["dueDate"], "2026-11-01");
    assert_eq!(a["createdBy"], "EnglishTeacher");

    let first = run_ok(&db, &["assignments", "update_submission", "student_1", &aid, "submitted"]);
    assert_eq!(first["status"], "submitted");
    assert!(first["submittedAt"].is_string());
    assert_eq!(first["grade"], Value::Null);
    assert_eq!(first["feedback"], "");

    let second = run_ok(
        &db,
        &["assignments", "update_submission", "student_1", &aid, "late", "88.5", "Nice work"],
    );
    assert_eq!(second["status"], "late");
    assert!(second["submittedAt"].is_string());
    assert_eq!(second["grade"], 88.5);
    assert_eq!(second["feedback"], "Nice work");

    // Empty grade and feedback leave earlier values alone.
    let third = run_ok(
        &db,
        &["assignments", "update_submission", "student_1", &aid, "graded", "", ""],
    );
    assert_eq!(third["grade"], 88.5);
    assert_eq!(third["feedback"], "Nice work");

    let subs = run_ok(&db, &["assignments", "get_submissions", "student_1"]);
    assert_eq!(subs.as_array().map(Vec::len), Some(1));
    assert_eq!(subs[0], third);

    let empty = run_ok(&db, &["assignments", "get_submissions", "student_2"]);
    assert_eq!(empty, json!([]));

    let (code, bad) = run(&db, &["assignments", "update_submission", "student_1", &aid, "lost"]);
    assert_eq!(code, 1);
    assert!(bad["error"].is_string());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn assignments_filter_and_delete() {
    let dir = temp_dir("schoolbook-cli-assignments");
    let db = dir.join("database.json");

    assert_eq!(run_ok(&db, &["assignments", "get_all"]), json!([]));
    let a = run_ok(
        &db,
        &["assignments", "create", "Lab", "Titration", "Chemistry", "d1", "ChemistryTeacher"],
    );
    run_ok(&db, &["assignments", "create", "Sketch", "Still life", "Art", "d2", "ArtTeacher"]);

    let chem = run_ok(&db, &["assignments", "get_by_subject", "Chemistry"]);
    assert_eq!(chem, json!([a.clone()]));
    assert_eq!(run_ok(&db, &["assignments", "get_all"]).as_array().map(Vec::len), Some(2));

    let aid = a["id"].as_str().expect("id");
    run_ok(&db, &["assignments", "update_submission", "student_1", aid, "pending"]);
    assert_eq!(run_ok(&db, &["assignments", "delete", aid]), json!({ "deleted": true }));
    assert_eq!(run_ok(&db, &["assignments", "delete", aid]), json!({ "deleted": false }));
    assert_eq!(run_ok(&db, &["assignments", "get_submissions", "student_1"]), json!([]));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn attendance_records_and_stats() {
    let dir = temp_dir("schoolbook-cli-attendance");
    let db = dir.join("database.json");

    for status in ["present", "present", "absent", "late"] {
        run_ok(&db, &["attendance", "add", "student_1", status, "Math", "MathTeacher"]);
    }
    let rec = run_ok(
        &db,
        &["attendance", "add", "student_1", "absent", "Art", "ArtTeacher", "dentist"],
    );
    assert_eq!(rec["notes"], "dentist");
    assert_eq!(rec["subject"], "Art");

    let stats = run_ok(&db, &["attendance", "stats", "student_1", "Math"]);
    assert_eq!(
        stats,
        json!({ "present": 2, "absent": 1, "late": 1, "total": 4, "percentage": 50.0 })
    );
    let all = run_ok(&db, &["attendance", "stats", "student_1"]);
    assert_eq!(all["total"], 5);
    assert_eq!(all["percentage"], 40.0);

    let records = run_ok(&db, &["attendance", "get", "student_1"]);
    assert_eq!(records.as_array().map(Vec::len), Some(5));
    assert_eq!(run_ok(&db, &["attendance", "get", "student_2"]), json!([]));

    let nobody = run_ok(&db, &["attendance", "stats", "student_2"]);
    assert_eq!(nobody["total"], 0);
    assert_eq!(nobody["percentage"], 0.0);

    let (code, _) = run(
        &db,
        &["attendance", "add", "student_1", "sleeping", "Math", "MathTeacher"],
    );
    assert_eq!(code, 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn exams_lifecycle() {
    let dir = temp_dir("schoolbook-cli-exams");
    let db = dir.join("database.json");

    let exam = run_ok(
        &db,
        &[
            "exams",
            "create",
            "Midterm",
            "Physics",
            "2026-12-01",
            "09:00",
            "10:30",
            "PhysicsTeacher",
        ],
    );
    let id = exam["id"].as_str().expect("exam id").to_string();
    assert!(id.starts_with("exam_"));
    assert_eq!(exam["startTime"], "09:00");

    assert_eq!(run_ok(&db, &["exams", "get_by_subject", "Physics"]), json!([exam]));
    assert_eq!(run_ok(&db, &["exams", "get_by_subject", "Math"]), json!([]));
    assert_eq!(run_ok(&db, &["exams", "delete", &id]), json!({ "deleted": true }));
    assert_eq!(run_ok(&db, &["exams", "get_all"]), json!([]));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn student_account_login_and_cascading_delete() {
    let dir = temp_dir("schoolbook-cli-student-account");
    let db = dir.join("database.json");

    let added = run_ok(&db, &["students", "add", "Emma", "Johnson", "14", "john_parent"]);
    let id = added["student"]["id"].as_str().expect("id").to_string();

    let created = run_ok(&db, &["auth", "create_student_account", &id, "emma", "pw"]);
    assert_eq!(created["success"], true);
    assert_eq!(created["user"]["name"], "Emma Johnson");
    assert_eq!(created["user"]["studentId"], id.as_str());

    let taken = run_ok(&db, &["auth", "create_student_account", &id, "ArtTeacher", "pw"]);
    assert_eq!(
        taken,
        json!({ "success": false, "error": "Username already exists" })
    );
    let missing = run_ok(&db, &["auth", "create_student_account", "student_99", "x", "pw"]);
    assert_eq!(missing["error"], "Student not found");

    let login = run_ok(&db, &["auth", "login", "emma", "pw"]);
    assert_eq!(login["user"]["role"], "student");
    let got = run_ok(&db, &["students", "get", &id]);
    assert_eq!(got["student"]["username"], "emma");

    run_ok(&db, &["students", "delete", &id]);
    let login = run_ok(&db, &["auth", "login", "emma", "pw"]);
    assert_eq!(login["success"], false);
    let listed = run_ok(&db, &["auth", "students"]);
    assert_eq!(listed["users"], json!([]));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn messages_thread_lifecycle() {
    let dir = temp_dir("schoolbook-cli-messages");
    let db = dir.join("database.json");

    let sent = run_ok(
        &db,
        &[
            "messages",
            "send",
            "john_parent",
            "parent",
            "MathTeacher",
            "teacher",
            "Homework",
            "Is chapter 4 on the test?",
        ],
    );
    let id = sent["id"].as_str().expect("message id").to_string();
    assert_eq!(sent["read"], false);
    assert_eq!(sent["replies"], json!([]));

    let reply = run_ok(
        &db,
        &["messages", "reply", &id, "MathTeacher", "teacher", "Yes, all of it."],
    );
    assert_eq!(reply["fromRole"], "teacher");
    let none = run_ok(&db, &["messages", "reply", "message_0", "x", "parent", "hi"]);
    assert_eq!(none, Value::Null);

    assert_eq!(run_ok(&db, &["messages", "mark_read", &id])["updated"], true);
    assert_eq!(
        run_ok(&db, &["messages", "mark_read", "message_0"])["updated"],
        false
    );

    let inbox = run_ok(&db, &["messages", "list_for_user", "john_parent"]);
    assert_eq!(inbox.as_array().map(|m| m.len()), Some(1));
    assert_eq!(inbox[0]["read"], true);
    assert_eq!(inbox[0]["replies"][0]["content"], "Yes, all of it.");
    assert_eq!(
        run_ok(&db, &["messages", "list_for_user", "ArtTeacher"]),
        json!([])
    );

    let (code, bad) = run(
        &db,
        &["messages", "send", "a", "janitor", "b", "teacher", "s", "c"],
    );
    assert_eq!(code, 1);
    assert!(bad["error"].as_str().expect("error").contains("janitor"));

    assert_eq!(run_ok(&db, &["messages", "delete", &id])["deleted"], true);
    assert_eq!(run_ok(&db, &["messages", "delete", &id])["deleted"], false);

    let _ = std::fs::remove_dir_all(dir);
}
