//! Router tests driven with `tower::ServiceExt::oneshot` against an
//! in-memory `SqliteStore`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use roster_core::{
  Entity,
  attendance::{StaffAttendance, StudentAttendance},
  event::Event,
  school::{SchoolClass, Student, Subject, Teacher},
};
use roster_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn arjun() -> Value {
  json!({
    "firstName": "Arjun",
    "lastName": "Sharma",
    "email": "arjun@example.com",
    "enrollmentNo": "ENR001",
    "class": "10-A"
  })
}

// ─── Generic CRUD, every entity ──────────────────────────────────────────────

/// Create from `body`, read it back by id and in the list, then check that
/// an empty body, or one lacking any single required field, is rejected
/// without persisting anything.
async fn crud_round_trip<E: Entity>(body: Value) {
  let app = app().await;
  let base = format!("/{}", E::PATH);

  let (status, created) = send(&app, "POST", &base, Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED, "{}: {created}", E::PATH);
  let id = created["id"].as_str().expect("generated id").to_owned();
  assert!(created["createdAt"].is_string());
  for (key, value) in body.as_object().unwrap() {
    assert_eq!(&created[key], value, "{}: field {key}", E::PATH);
  }

  let (status, fetched) = send(&app, "GET", &format!("{base}/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);

  let (status, list) = send(&app, "GET", &base, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list.as_array().unwrap().len(), 1);

  let (status, err) = send(&app, "POST", &base, Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "Please fill all required fields");
  let details = err["details"].as_str().unwrap();
  for spec in E::FIELDS.iter().filter(|f| f.required) {
    assert!(details.contains(spec.key), "{}: details {details:?}", E::PATH);
  }

  // Each required field on its own, whether absent or null.
  for spec in E::FIELDS.iter().filter(|f| f.required) {
    for blank in [None, Some(Value::Null)] {
      let mut partial = body.as_object().unwrap().clone();
      partial.remove(spec.key);
      if let Some(value) = blank {
        partial.insert(spec.key.to_owned(), value);
      }
      let (status, err) = send(&app, "POST", &base, Some(Value::Object(partial))).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{}: without {}", E::PATH, spec.key);
      assert_eq!(err["error"], "Please fill all required fields");
      assert!(err["details"].as_str().unwrap().contains(spec.key));
    }
  }

  let (_, list) = send(&app, "GET", &base, None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn students_crud() {
  crud_round_trip::<Student>(arjun()).await;
}

#[tokio::test]
async fn teachers_crud() {
  crud_round_trip::<Teacher>(json!({
    "firstName": "Raj",
    "lastName": "Patel",
    "email": "raj@example.com",
    "employeeId": "EMP001",
    "subject": "Physics"
  }))
  .await;
}

#[tokio::test]
async fn classes_crud() {
  crud_round_trip::<SchoolClass>(json!({
    "className": "10-A",
    "classTeacher": "Raj Patel",
    "roomNumber": "R101",
    "totalStudents": 32,
    "capacity": 40
  }))
  .await;
}

#[tokio::test]
async fn subjects_crud() {
  crud_round_trip::<Subject>(json!({
    "subjectName": "Physics",
    "subjectCode": "PHY101",
    "passingMarks": 35,
    "totalMarks": 100
  }))
  .await;
}

#[tokio::test]
async fn student_attendance_crud() {
  crud_round_trip::<StudentAttendance>(json!({
    "studentName": "Arjun Sharma",
    "enrollmentNo": "ENR001",
    "className": "10-A",
    "date": "2026-02-15",
    "status": "absent"
  }))
  .await;
}

#[tokio::test]
async fn staff_attendance_crud() {
  crud_round_trip::<StaffAttendance>(json!({
    "staffName": "Raj Patel",
    "employeeId": "EMP001",
    "role": "Teacher",
    "date": "2026-02-15",
    "status": "on-duty"
  }))
  .await;
}

#[tokio::test]
async fn events_crud() {
  crud_round_trip::<Event>(json!({
    "eventName": "Annual Day",
    "date": "2026-03-01",
    "category": "school-event"
  }))
  .await;
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn student_attendance_rejects_staff_only_status() {
  let app = app().await;
  let body = json!({
    "studentName": "Aarav Singh",
    "enrollmentNo": "STU001",
    "className": "10-A",
    "date": "2026-02-15",
    "status": "on-duty"
  });
  let (status, err) = send(&app, "POST", "/attendance/students", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "Status must be one of: present, absent, leave");

  let (_, list) = send(&app, "GET", "/attendance/students", None).await;
  assert!(list.as_array().unwrap().is_empty());

  // Nor can an existing record be moved there.
  let body = json!({
    "studentName": "Aarav Singh",
    "enrollmentNo": "STU001",
    "date": "2026-02-15",
    "status": "leave"
  });
  let (_, created) = send(&app, "POST", "/attendance/students", Some(body)).await;
  let uri = format!("/attendance/students/{}", created["id"].as_str().unwrap());
  let (status, _) = send(&app, "PUT", &uri, Some(json!({ "status": "on-duty" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (_, fetched) = send(&app, "GET", &uri, None).await;
  assert_eq!(fetched["status"], "leave");
}

#[tokio::test]
async fn unknown_routes_use_error_shape() {
  let app = app().await;
  let (status, err) = send(&app, "GET", "/nothing/here", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["error"], "Not found");

  let (status, err) = send(&app, "PATCH", "/students", Some(json!({}))).await;
  assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
  assert_eq!(err["error"], "Method not allowed");
}

#[tokio::test]
async fn create_fills_optional_defaults() {
  let app = app().await;
  let (status, created) = send(&app, "POST", "/students", Some(arjun())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["status"], "active");
  assert_eq!(created["address"], "");
}

#[tokio::test]
async fn non_object_body_is_rejected() {
  let app = app().await;
  let (status, err) = send(&app, "POST", "/students", Some(json!(["Arjun"]))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "Invalid request body");
}

#[tokio::test]
async fn malformed_json_uses_error_shape() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/students")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let err: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(err["error"], "Invalid request body");
  assert!(err["details"].is_string());
}

#[tokio::test]
async fn duplicate_unique_field_is_rejected() {
  let app = app().await;
  send(&app, "POST", "/students", Some(arjun())).await;

  let mut other = arjun();
  other["firstName"] = json!("Someone");
  let (status, err) = send(&app, "POST", "/students", Some(other)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], r#"enrollmentNo "ENR001" is already registered"#);

  let (_, list) = send(&app, "GET", "/students", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["firstName"], "Arjun");
}

#[tokio::test]
async fn partial_update_merges_and_keeps_identity() {
  let app = app().await;
  let (_, created) = send(&app, "POST", "/students", Some(arjun())).await;
  let id = created["id"].as_str().unwrap();

  let patch = json!({ "status": "inactive", "id": Uuid::new_v4(), "createdAt": "1999-01-01T00:00:00Z" });
  let (status, updated) = send(&app, "PUT", &format!("/students/{id}"), Some(patch)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "inactive");
  assert_eq!(updated["firstName"], "Arjun");
  assert_eq!(updated["id"], created["id"]);
  assert_eq!(updated["createdAt"], created["createdAt"]);

  let (_, fetched) = send(&app, "GET", &format!("/students/{id}"), None).await;
  assert_eq!(fetched["status"], "inactive");
}

#[tokio::test]
async fn update_cannot_blank_a_required_field() {
  let app = app().await;
  let (_, created) = send(&app, "POST", "/students", Some(arjun())).await;
  let id = created["id"].as_str().unwrap();

  let (status, err) =
    send(&app, "PUT", &format!("/students/{id}"), Some(json!({ "firstName": " " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["details"], "missing: firstName");
}

#[tokio::test]
async fn update_with_wrong_type_is_rejected() {
  let app = app().await;
  let (_, created) = send(&app, "POST", "/subjects", Some(json!({
    "subjectName": "Physics",
    "subjectCode": "PHY101"
  })))
  .await;
  let id = created["id"].as_str().unwrap();

  let (status, _) =
    send(&app, "PUT", &format!("/subjects/{id}"), Some(json!({ "totalMarks": "lots" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
  let app = app().await;
  let uri = format!("/students/{}", Uuid::new_v4());
  let (status, err) = send(&app, "PUT", &uri, Some(json!({ "status": "inactive" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["error"], "Student not found");
}

#[tokio::test]
async fn delete_then_list_excludes_record() {
  let app = app().await;
  let (_, created) = send(&app, "POST", "/students", Some(arjun())).await;
  let id = created["id"].as_str().unwrap();

  let (status, body) = send(&app, "DELETE", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Student deleted");

  let (_, list) = send(&app, "GET", "/students", None).await;
  assert!(list.as_array().unwrap().is_empty());

  let (status, _) = send(&app, "GET", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_nonexistent_is_not_found() {
  let app = app().await;
  let (status, err) = send(&app, "DELETE", &format!("/classes/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["error"], "Class not found");

  let (status, _) = send(&app, "DELETE", "/classes/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, "GET", "/health", None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ids_do_not_cross_collections() {
  let app = app().await;
  let (_, created) = send(&app, "POST", "/students", Some(arjun())).await;
  let id = created["id"].as_str().unwrap();

  let (status, _) = send(&app, "DELETE", &format!("/teachers/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (_, list) = send(&app, "GET", "/students", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn server_does_not_enforce_client_only_checks() {
  let app = app().await;
  let (status, _) = send(&app, "POST", "/subjects", Some(json!({
    "subjectName": "Physics",
    "subjectCode": "PHY101",
    "passingMarks": 120,
    "totalMarks": 100
  })))
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

// ─── Accounts ────────────────────────────────────────────────────────────────

fn signup_body() -> Value {
  json!({
    "fullName": "Meera Iyer",
    "organizationName": "Celestial High School",
    "email": "Meera@Celestial.edu",
    "mobileNo": "9876543210",
    "password": "secret1"
  })
}

#[tokio::test]
async fn signup_returns_user_without_password() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/auth/signup", Some(signup_body())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "Account created successfully");
  assert_eq!(body["user"]["email"], "meera@celestial.edu");
  assert!(body["user"].get("password").is_none());
  assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn signup_validation_messages() {
  let app = app().await;
  let cases = [
    ("fullName", json!(""), "Please fill in all fields"),
    ("email", json!("meera.celestial.edu"), "Please enter a valid email"),
    ("mobileNo", json!("12345"), "Please enter a valid mobile number"),
    ("mobileNo", json!("123456789 "), "Please enter a valid mobile number"),
    ("password", json!("abc"), "Password must be at least 6 characters"),
  ];
  for (key, value, message) in cases {
    let mut body = signup_body();
    body[key] = value;
    let (status, err) = send(&app, "POST", "/auth/signup", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{key}");
    assert_eq!(err["error"], message);
  }
}

#[tokio::test]
async fn duplicate_signup_keeps_original() {
  let app = app().await;
  send(&app, "POST", "/auth/signup", Some(signup_body())).await;

  let mut again = signup_body();
  again["email"] = json!("meera@celestial.edu");
  again["fullName"] = json!("Impostor");
  again["password"] = json!("other-pass");
  let (status, err) = send(&app, "POST", "/auth/signup", Some(again)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "Email already registered");

  let (status, body) = send(&app, "GET", "/users/meera@celestial.edu", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["fullName"], "Meera Iyer");

  let login = json!({ "email": "meera@celestial.edu", "password": "secret1" });
  let (status, _) = send(&app, "POST", "/auth/login", Some(login)).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_distinct() {
  let app = app().await;
  send(&app, "POST", "/auth/signup", Some(signup_body())).await;

  let unknown = json!({ "email": "ghost@celestial.edu", "password": "secret1" });
  let (status, err) = send(&app, "POST", "/auth/login", Some(unknown)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(err["error"], "Email not found. Please sign up first");

  let wrong = json!({ "email": "meera@celestial.edu", "password": "secret2" });
  let (status, err) = send(&app, "POST", "/auth/login", Some(wrong)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(err["error"], "Incorrect password");
}

#[tokio::test]
async fn login_is_case_insensitive_on_email() {
  let app = app().await;
  send(&app, "POST", "/auth/signup", Some(signup_body())).await;

  let login = json!({ "email": "MEERA@celestial.edu", "password": "secret1" });
  let (status, body) = send(&app, "POST", "/auth/login", Some(login)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Login successful");
  assert_eq!(body["user"]["organizationName"], "Celestial High School");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
  let app = app().await;
  let (status, err) = send(&app, "GET", "/users/ghost@celestial.edu", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["error"], "User not found");
}

#[tokio::test]
async fn change_password_flow() {
  let app = app().await;
  send(&app, "POST", "/auth/signup", Some(signup_body())).await;
  let uri = "/users/meera@celestial.edu/password";

  let wrong = json!({ "currentPassword": "nope-nope", "newPassword": "secret2" });
  let (status, err) = send(&app, "PUT", uri, Some(wrong)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(err["error"], "Incorrect password");

  let short = json!({ "currentPassword": "secret1", "newPassword": "abc" });
  let (status, _) = send(&app, "PUT", uri, Some(short)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let ok = json!({ "currentPassword": "secret1", "newPassword": "secret2" });
  let (status, body) = send(&app, "PUT", uri, Some(ok)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Password changed successfully");

  let old = json!({ "email": "meera@celestial.edu", "password": "secret1" });
  let (status, _) = send(&app, "POST", "/auth/login", Some(old)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let new = json!({ "email": "meera@celestial.edu", "password": "secret2" });
  let (status, _) = send(&app, "POST", "/auth/login", Some(new)).await;
  assert_eq!(status, StatusCode::OK);

  let ghost = json!({ "currentPassword": "secret1", "newPassword": "secret2" });
  let (status, _) = send(&app, "PUT", "/users/ghost@celestial.edu/password", Some(ghost)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_connected_store() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "Server is running");
  assert_eq!(body["database"], "connected");
}
