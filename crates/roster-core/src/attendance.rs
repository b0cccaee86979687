//! Daily attendance records for students and staff.
//!
//! Each record copies the person's name and identifier as text; nothing links
//! it to a [`crate::school::Student`] or [`crate::school::Teacher`] record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, FieldSpec};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
  #[default]
  Present,
  Absent,
  Leave,
  /// Staff only: away from the premises on official work.
  OnDuty,
}

impl AttendanceStatus {
  pub const STUDENT_OPTIONS: &'static [&'static str] = &["present", "absent", "leave"];
  pub const STAFF_OPTIONS: &'static [&'static str] =
    &["present", "absent", "leave", "on-duty"];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Present => "present",
      Self::Absent => "absent",
      Self::Leave => "leave",
      Self::OnDuty => "on-duty",
    }
  }

  /// The status after this one in `options`, wrapping around.
  fn cycle(self, options: &'static [&'static str]) -> &'static str {
    let current = self.as_str();
    let next = options
      .iter()
      .position(|o| *o == current)
      .map(|i| (i + 1) % options.len())
      .unwrap_or(0);
    options[next]
  }
}

// ─── Student attendance ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentAttendance {
  pub student_name:  String,
  pub enrollment_no: String,
  pub class_name:    String,
  /// `YYYY-MM-DD`.
  pub date:          String,
  pub status:        AttendanceStatus,
}

impl Entity for StudentAttendance {
  const COLLECTION: &'static str = "student_attendance";
  const PATH: &'static str = "attendance/students";
  const LABEL: &'static str = "attendance record";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("studentName", "Student name").required(),
    FieldSpec::text("enrollmentNo", "Enrollment no.").required(),
    FieldSpec::text("className", "Class"),
    FieldSpec::text("date", "Date").required(),
    FieldSpec::choice("status", "Status", AttendanceStatus::STUDENT_OPTIONS),
  ];
  const SEARCH: &'static [&'static str] = &["studentName", "enrollmentNo"];
  const FACET: Option<&'static str> = Some("className");
  const DATE: Option<&'static str> = Some("date");
  const COLUMNS: &'static [&'static str] =
    &["date", "enrollmentNo", "studentName", "className", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.cycle(AttendanceStatus::STUDENT_OPTIONS).into())
  }
}

// ─── Staff attendance ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffAttendance {
  pub staff_name:  String,
  pub employee_id: String,
  /// Free text, e.g. `"Teacher"` or `"Administrator"`.
  pub role:        String,
  pub date:        String,
  pub status:      AttendanceStatus,
}

impl Entity for StaffAttendance {
  const COLLECTION: &'static str = "staff_attendance";
  const PATH: &'static str = "attendance/staff";
  const LABEL: &'static str = "attendance record";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("staffName", "Staff name").required(),
    FieldSpec::text("employeeId", "Employee id").required(),
    FieldSpec::text("role", "Role"),
    FieldSpec::text("date", "Date").required(),
    FieldSpec::choice("status", "Status", AttendanceStatus::STAFF_OPTIONS),
  ];
  const SEARCH: &'static [&'static str] = &["staffName", "employeeId"];
  const FACET: Option<&'static str> = Some("role");
  const DATE: Option<&'static str> = Some("date");
  const COLUMNS: &'static [&'static str] =
    &["date", "employeeId", "staffName", "role", "status"];

  fn next_status(&self) -> Option<Value> {
    Some(self.status.cycle(AttendanceStatus::STAFF_OPTIONS).into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn student_status_cycles_without_on_duty() {
    let mut a = StudentAttendance { status: AttendanceStatus::Leave, ..Default::default() };
    assert_eq!(a.next_status(), Some(Value::from("present")));
    a.status = AttendanceStatus::Present;
    assert_eq!(a.next_status(), Some(Value::from("absent")));
  }

  #[test]
  fn staff_status_cycles_through_on_duty() {
    let a = StaffAttendance { status: AttendanceStatus::Leave, ..Default::default() };
    assert_eq!(a.next_status(), Some(Value::from("on-duty")));
    let a = StaffAttendance { status: AttendanceStatus::OnDuty, ..Default::default() };
    assert_eq!(a.next_status(), Some(Value::from("present")));
  }

  #[test]
  fn on_duty_uses_kebab_case() {
    let json = serde_json::to_value(AttendanceStatus::OnDuty).unwrap();
    assert_eq!(json, Value::from("on-duty"));
  }
}
