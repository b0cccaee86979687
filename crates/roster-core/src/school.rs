//! Master-data entities: students, teachers, classes, and subjects.
//!
//! Cross-entity references (`Student::class`, `Teacher::subject`,
//! `SchoolClass::class_teacher`) are denormalised free text, not ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  entity::{Entity, FieldSpec},
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether a master-data record is currently in use.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
  #[default]
  Active,
  Inactive,
}

impl RecordStatus {
  pub const OPTIONS: &'static [&'static str] = &["active", "inactive"];

  pub fn toggled(self) -> Self {
    match self {
      Self::Active => Self::Inactive,
      Self::Inactive => Self::Active,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }
}

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub mobile_no:     String,
  pub enrollment_no: String,
  /// Class name, e.g. `"10-A"`.
  pub class:         String,
  pub date_of_birth: String,
  pub address:       String,
  pub status:        RecordStatus,
}

impl Entity for Student {
  const COLLECTION: &'static str = "students";
  const PATH: &'static str = "students";
  const LABEL: &'static str = "student";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("firstName", "First name").required(),
    FieldSpec::text("lastName", "Last name").required(),
    FieldSpec::text("email", "Email").required(),
    FieldSpec::text("mobileNo", "Mobile no."),
    FieldSpec::text("enrollmentNo", "Enrollment no.").required(),
    FieldSpec::text("class", "Class"),
    FieldSpec::text("dateOfBirth", "Date of birth"),
    FieldSpec::text("address", "Address"),
    FieldSpec::choice("status", "Status", RecordStatus::OPTIONS),
  ];
  const UNIQUE: Option<&'static str> = Some("enrollmentNo");
  const SEARCH: &'static [&'static str] = &["firstName", "lastName", "enrollmentNo"];
  const FACET: Option<&'static str> = Some("class");
  const COLUMNS: &'static [&'static str] =
    &["enrollmentNo", "firstName", "lastName", "class", "email", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.toggled().as_str().into())
  }
}

// ─── Teacher ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Teacher {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub mobile_no:     String,
  pub employee_id:   String,
  /// Subject taught, free text.
  pub subject:       String,
  pub qualification: String,
  pub date_of_birth: String,
  pub address:       String,
  pub status:        RecordStatus,
}

impl Entity for Teacher {
  const COLLECTION: &'static str = "teachers";
  const PATH: &'static str = "teachers";
  const LABEL: &'static str = "teacher";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("firstName", "First name").required(),
    FieldSpec::text("lastName", "Last name").required(),
    FieldSpec::text("email", "Email").required(),
    FieldSpec::text("mobileNo", "Mobile no."),
    FieldSpec::text("employeeId", "Employee id").required(),
    FieldSpec::text("subject", "Subject"),
    FieldSpec::text("qualification", "Qualification"),
    FieldSpec::text("dateOfBirth", "Date of birth"),
    FieldSpec::text("address", "Address"),
    FieldSpec::choice("status", "Status", RecordStatus::OPTIONS),
  ];
  const UNIQUE: Option<&'static str> = Some("employeeId");
  const SEARCH: &'static [&'static str] = &["firstName", "lastName", "employeeId"];
  const FACET: Option<&'static str> = Some("subject");
  const COLUMNS: &'static [&'static str] =
    &["employeeId", "firstName", "lastName", "subject", "email", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.toggled().as_str().into())
  }
}

// ─── Class ───────────────────────────────────────────────────────────────────

/// A class (form/grade section). Named `SchoolClass` to stay clear of the
/// `class` field on [`Student`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolClass {
  pub class_name:     String,
  pub class_teacher:  String,
  pub section:        String,
  pub room_number:    String,
  pub total_students: u32,
  pub start_time:     String,
  pub end_time:       String,
  pub capacity:       u32,
  pub description:    String,
  pub status:         RecordStatus,
}

impl Entity for SchoolClass {
  const COLLECTION: &'static str = "classes";
  const PATH: &'static str = "classes";
  const LABEL: &'static str = "class";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("className", "Class name").required(),
    FieldSpec::text("classTeacher", "Class teacher").required(),
    FieldSpec::text("section", "Section"),
    FieldSpec::text("roomNumber", "Room").required(),
    FieldSpec::number("totalStudents", "Total students"),
    FieldSpec::number("capacity", "Capacity"),
    FieldSpec::text("startTime", "Start time"),
    FieldSpec::text("endTime", "End time"),
    FieldSpec::text("description", "Description"),
    FieldSpec::choice("status", "Status", RecordStatus::OPTIONS),
  ];
  const SEARCH: &'static [&'static str] = &["className", "classTeacher", "roomNumber"];
  const FACET: Option<&'static str> = Some("status");
  const COLUMNS: &'static [&'static str] =
    &["className", "classTeacher", "roomNumber", "totalStudents", "capacity", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.toggled().as_str().into())
  }

  fn check(&self) -> Result<()> {
    if self.total_students > self.capacity {
      return Err(Error::Invalid(
        "Total students cannot exceed class capacity".into(),
      ));
    }
    Ok(())
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
  pub subject_name:  String,
  pub subject_code:  String,
  /// Free-text grouping, e.g. `"Science"`.
  pub category:      String,
  pub credit_hours:  u32,
  pub passing_marks: u32,
  pub total_marks:   u32,
  pub description:   String,
  pub status:        RecordStatus,
}

impl Entity for Subject {
  const COLLECTION: &'static str = "subjects";
  const PATH: &'static str = "subjects";
  const LABEL: &'static str = "subject";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("subjectName", "Subject name").required(),
    FieldSpec::text("subjectCode", "Subject code").required(),
    FieldSpec::text("category", "Category"),
    FieldSpec::number("creditHours", "Credit hours"),
    FieldSpec::number("passingMarks", "Passing marks"),
    FieldSpec::number("totalMarks", "Total marks"),
    FieldSpec::text("description", "Description"),
    FieldSpec::choice("status", "Status", RecordStatus::OPTIONS),
  ];
  const UNIQUE: Option<&'static str> = Some("subjectCode");
  const SEARCH: &'static [&'static str] = &["subjectName", "subjectCode"];
  const FACET: Option<&'static str> = Some("category");
  const COLUMNS: &'static [&'static str] =
    &["subjectCode", "subjectName", "category", "passingMarks", "totalMarks", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.toggled().as_str().into())
  }

  fn check(&self) -> Result<()> {
    if self.passing_marks > self.total_marks {
      return Err(Error::Invalid(
        "Passing marks cannot exceed total marks".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subject_passing_marks_bounded_by_total() {
    let mut s = Subject { passing_marks: 40, total_marks: 100, ..Subject::default() };
    assert!(s.check().is_ok());
    s.passing_marks = 101;
    assert!(matches!(s.check(), Err(Error::Invalid(_))));
  }

  #[test]
  fn class_roster_bounded_by_capacity() {
    let c = SchoolClass { total_students: 41, capacity: 40, ..SchoolClass::default() };
    assert_eq!(
      c.check().unwrap_err().to_string(),
      "Total students cannot exceed class capacity"
    );
  }

  #[test]
  fn status_toggle_flips() {
    let t = Teacher { status: RecordStatus::Inactive, ..Teacher::default() };
    assert_eq!(t.next_status(), Some(Value::from("active")));
  }
}
