//! School calendar events.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, FieldSpec};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
  Holiday,
  SchoolEvent,
  Exam,
  Meeting,
  #[default]
  Other,
}

impl EventCategory {
  pub const OPTIONS: &'static [&'static str] =
    &["holiday", "school-event", "exam", "meeting", "other"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
  pub event_name:  String,
  /// `YYYY-MM-DD`.
  pub date:        String,
  pub category:    EventCategory,
  pub description: String,
  pub start_time:  String,
  pub end_time:    String,
  pub location:    String,
}

impl Entity for Event {
  const COLLECTION: &'static str = "events";
  const PATH: &'static str = "events";
  const LABEL: &'static str = "event";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("eventName", "Event name").required(),
    FieldSpec::text("date", "Date").required(),
    FieldSpec::choice("category", "Category", EventCategory::OPTIONS),
    FieldSpec::text("startTime", "Start time"),
    FieldSpec::text("endTime", "End time"),
    FieldSpec::text("location", "Location"),
    FieldSpec::text("description", "Description"),
  ];
  const SEARCH: &'static [&'static str] = &["eventName"];
  const FACET: Option<&'static str> = Some("category");
  const COLUMNS: &'static [&'static str] =
    &["date", "eventName", "category", "startTime", "location"];
}
