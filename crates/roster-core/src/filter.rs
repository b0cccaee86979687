//! Client-side list filtering.
//!
//! A [`ListFilter`] combines up to three predicates, all of which must hold:
//! a case-insensitive substring match over the entity's [`Entity::SEARCH`]
//! fields, an exact match on its [`Entity::FACET`] field, and an exact match
//! on its [`Entity::DATE`] field. Unset predicates match everything.

use crate::entity::{Entity, Record, display_value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
  /// Free text; empty matches every record.
  pub text:  String,
  /// Exact facet value; `None` means "all".
  pub facet: Option<String>,
  /// Exact date (`YYYY-MM-DD`); `None` means any date.
  pub date:  Option<String>,
}

impl ListFilter {
  pub fn is_active(&self) -> bool {
    !self.text.is_empty() || self.facet.is_some() || self.date.is_some()
  }

  pub fn matches<E: Entity>(&self, entity: &E) -> bool {
    let Ok(fields) = entity.to_fields() else {
      return false;
    };
    let field = |key: &str| fields.get(key).map(display_value).unwrap_or_default();

    let needle = self.text.to_lowercase();
    let text_ok = needle.is_empty()
      || E::SEARCH
        .iter()
        .any(|&key| field(key).to_lowercase().contains(&needle));

    let facet_ok = match (E::FACET, &self.facet) {
      (Some(key), Some(want)) => field(key) == *want,
      _ => true,
    };

    let date_ok = match (E::DATE, &self.date) {
      (Some(key), Some(want)) => field(key) == *want,
      _ => true,
    };

    text_ok && facet_ok && date_ok
  }

  /// The records that pass this filter, in their original order.
  pub fn apply<'a, E: Entity>(&self, records: &'a [Record<E>]) -> Vec<&'a Record<E>> {
    records.iter().filter(|r| self.matches(&r.entity)).collect()
  }
}

/// Distinct non-empty values of the facet field, in first-seen order.
pub fn facet_options<E: Entity>(records: &[Record<E>]) -> Vec<String> {
  let Some(key) = E::FACET else {
    return Vec::new();
  };
  let mut seen: Vec<String> = Vec::new();
  for record in records {
    let value = record.entity.field_text(key);
    if !value.is_empty() && !seen.contains(&value) {
      seen.push(value);
    }
  }
  seen
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    attendance::StudentAttendance,
    event::{Event, EventCategory},
    school::Student,
  };

  fn student(first: &str, class: &str) -> Record<Student> {
    Record::new(Student {
      first_name: first.into(),
      class: class.into(),
      ..Student::default()
    })
  }

  fn names(records: Vec<&Record<Student>>) -> Vec<&str> {
    records.iter().map(|r| r.entity.first_name.as_str()).collect()
  }

  #[test]
  fn text_and_facet_are_anded() {
    let list = vec![student("Arjun", "10-A"), student("Priya", "10-B")];
    let filter = ListFilter {
      text:  "a".into(),
      facet: Some("10-A".into()),
      date:  None,
    };
    assert_eq!(names(filter.apply(&list)), vec!["Arjun"]);
  }

  #[test]
  fn text_match_is_case_insensitive() {
    let list = vec![student("Arjun", "10-A"), student("Priya", "10-B")];
    let filter = ListFilter { text: "PRI".into(), ..ListFilter::default() };
    assert_eq!(names(filter.apply(&list)), vec!["Priya"]);
  }

  #[test]
  fn empty_filter_keeps_everything_in_order() {
    let list = vec![student("Arjun", "10-A"), student("Priya", "10-B")];
    let filter = ListFilter::default();
    assert!(!filter.is_active());
    assert_eq!(names(filter.apply(&list)), vec!["Arjun", "Priya"]);
  }

  #[test]
  fn facet_is_exact_not_substring() {
    let list = vec![student("Arjun", "10-A"), student("Kiran", "10-AB")];
    let filter = ListFilter { facet: Some("10-A".into()), ..ListFilter::default() };
    assert_eq!(names(filter.apply(&list)), vec!["Arjun"]);
  }

  #[test]
  fn date_filter_applies_to_attendance() {
    let rec = |name: &str, date: &str| {
      Record::new(StudentAttendance {
        student_name: name.into(),
        enrollment_no: "STU".into(),
        class_name: "10-A".into(),
        date: date.into(),
        ..Default::default()
      })
    };
    let list = vec![rec("Aarav", "2026-02-15"), rec("Rohan", "2026-02-16")];
    let filter = ListFilter {
      text:  "stu".into(),
      facet: Some("10-A".into()),
      date:  Some("2026-02-16".into()),
    };
    let hits = filter.apply(&list);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entity.student_name, "Rohan");
  }

  #[test]
  fn enum_facets_compare_on_wire_value() {
    let list = vec![
      Record::new(Event { event_name: "Diwali".into(), category: EventCategory::Holiday, ..Event::default() }),
      Record::new(Event { event_name: "Finals".into(), category: EventCategory::Exam, ..Event::default() }),
    ];
    let filter = ListFilter { facet: Some("holiday".into()), ..ListFilter::default() };
    let hits = filter.apply(&list);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entity.event_name, "Diwali");
  }

  #[test]
  fn facet_options_are_distinct_in_first_seen_order() {
    let list = vec![
      student("A", "10-B"),
      student("B", "10-A"),
      student("C", "10-B"),
      student("D", ""),
    ];
    assert_eq!(facet_options(&list), vec!["10-B", "10-A"]);
  }
}
