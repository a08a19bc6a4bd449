use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
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

fn spawn_sidecar(data_file: &Path) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoolbookd");
    let mut child = Command::new(exe)
        .arg("--data-file")
        .arg(data_file)
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoolbookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

/// Writes one request and reads its response line, whatever it says.
fn send(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

/// Like [`send`], but the method must be routed somewhere.
fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = send(stdin, reader, id, method, params);
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

fn result_of(resp: &serde_json::Value) -> &serde_json::Value {
    assert_eq!(resp["ok"], true, "request failed: {}", resp);
    &resp["result"]
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("schoolbook-router-smoke");
    let data_file = workspace.join("data").join("database.json");
    let bundle_out = workspace.join("smoke-backup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&data_file);

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        result_of(&health)["dataFile"].as_str(),
        Some(data_file.to_string_lossy().as_ref())
    );

    let login = request(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "username": "HistoryTeacher", "password": "History" }),
    );
    assert_eq!(result_of(&login)["user"]["subject"], "History");

    let created = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.add",
        json!({ "name": "Smoke", "surname": "Student", "age": "11" }),
    );
    let student_id = result_of(&created)["student"]["id"]
        .as_str()
        .expect("student id")
        .to_string();

    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.add_grade",
        json!({
            "studentId": student_id,
            "subject": "History",
            "grade": 64,
            "teacher": "HistoryTeacher",
        }),
    );
    let gpa = request(
        &mut stdin,
        &mut reader,
        "5",
        "gpa.calculate",
        json!({ "studentId": student_id }),
    );
    assert_eq!(result_of(&gpa)["gpa"], 64.0);

    let assignment = request(
        &mut stdin,
        &mut reader,
        "6",
        "assignments.create",
        json!({
            "title": "Timeline",
            "description": "Draw it",
            "subject": "History",
            "dueDate": "2026-11-20",
            "createdBy": "HistoryTeacher"
        }),
    );
    let assignment_id = result_of(&assignment)["id"]
        .as_str()
        .expect("assignment id")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "assignments.update_submission",
        json!({ "studentId": student_id, "assignmentId": assignment_id, "status": "submitted" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "exams.create",
        json!({
            "title": "Final",
            "subject": "History",
            "date": "2026-12-15",
            "startTime": "09:00",
            "endTime": "11:00",
            "createdBy": "HistoryTeacher"
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "attendance.add",
        json!({
            "studentId": student_id,
            "status": "present",
            "subject": "History",
            "teacher": "HistoryTeacher",
        }),
    );
    let stats = request(
        &mut stdin,
        &mut reader,
        "10",
        "attendance.stats",
        json!({ "studentId": student_id }),
    );
    assert_eq!(result_of(&stats)["percentage"], 100.0);

    let export = request(
        &mut stdin,
        &mut reader,
        "11",
        "backup.export",
        json!({ "path": bundle_out.to_string_lossy() }),
    );
    assert_eq!(result_of(&export)["entryCount"], 2);

    let account = request(
        &mut stdin,
        &mut reader,
        "11a",
        "auth.create_student_account",
        json!({ "studentId": student_id, "username": "smoke_kid", "password": "pw" }),
    );
    assert_eq!(result_of(&account)["user"]["role"], "student");

    let sent = request(
        &mut stdin,
        &mut reader,
        "11b",
        "messages.send",
        json!({
            "from": "smoke_kid",
            "fromRole": "student",
            "to": "HistoryTeacher",
            "toRole": "teacher",
            "subject": "Project",
            "content": "Can I have more time?",
        }),
    );
    let message_id = result_of(&sent)["id"].as_str().expect("message id").to_string();
    let replied = request(
        &mut stdin,
        &mut reader,
        "11c",
        "messages.reply",
        json!({
            "messageId": message_id,
            "from": "HistoryTeacher",
            "fromRole": "teacher",
            "content": "Until Monday.",
        }),
    );
    assert_eq!(result_of(&replied)["from"], "HistoryTeacher");
    let marked = request(
        &mut stdin,
        &mut reader,
        "11d",
        "messages.mark_read",
        json!({ "messageId": message_id }),
    );
    assert_eq!(result_of(&marked)["updated"], true);
    let inbox = request(
        &mut stdin,
        &mut reader,
        "11e",
        "messages.list_for_user",
        json!({ "username": "HistoryTeacher" }),
    );
    assert_eq!(result_of(&inbox)[0]["read"], true);
    assert_eq!(result_of(&inbox)[0]["replies"][0]["content"], "Until Monday.");
    let removed = request(
        &mut stdin,
        &mut reader,
        "11f",
        "messages.delete",
        json!({ "messageId": message_id }),
    );
    assert_eq!(result_of(&removed)["deleted"], true);

    let unknown = send(&mut stdin, &mut reader, "12", "students.frobnicate", json!({}));
    assert_eq!(unknown["ok"], false);
    assert_eq!(unknown["error"]["code"], "not_implemented");

    let bad = request(
        &mut stdin,
        &mut reader,
        "13",
        "gpa.class_average",
        json!({ "subject": "Alchemy" }),
    );
    assert_eq!(bad["error"]["code"], "bad_params");

    let gone = request(
        &mut stdin,
        &mut reader,
        "14",
        "students.delete",
        json!({ "studentId": student_id }),
    );
    assert_eq!(result_of(&gone)["deleted"], true);
    let student_logins = request(&mut stdin, &mut reader, "15", "auth.students", json!({}));
    assert_eq!(result_of(&student_logins)["users"], json!([]));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn bad_json_line_gets_error_and_session_continues() {
    let workspace = temp_dir("schoolbook-bad-json");
    let data_file = workspace.join("database.json");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&data_file);

    writeln!(stdin, "{{ this is not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read error line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("error is json");
    assert_eq!(value["ok"], false);
    assert_eq!(value["error"]["code"], "bad_json");

    let health = request(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health["ok"], true);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn store_select_switches_documents() {
    let workspace = temp_dir("schoolbook-store-select");
    let first = workspace.join("first.json");
    let second = workspace.join("second").join("db.json");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&first);

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.add",
        json!({ "name": "Only", "surname": "First", "age": 9 }),
    );
    let selected = request(
        &mut stdin,
        &mut reader,
        "2",
        "store.select",
        json!({ "path": second.to_string_lossy() }),
    );
    assert_eq!(selected["ok"], true);
    assert!(second.exists(), "selected document is seeded on select");

    let listed = request(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(result_of(&listed)["students"], json!([]));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
