//! The [`Entity`] schema trait and the [`Record`] envelope.
//!
//! An entity is a flat record type. Everything the other layers need to know
//! about it (where it lives, which fields are required, which one is unique,
//! how the client searches it) is declared through associated constants, so
//! the CRUD handlers, the store, and the client list view are each written
//! once and instantiated per entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Field schema ────────────────────────────────────────────────────────────

/// How a field is entered and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Free text, stored as a JSON string.
  Text,
  /// Unsigned integer, stored as a JSON number.
  Number,
  /// One of a fixed set of string values.
  Choice(&'static [&'static str]),
}

/// Describes one field of an entity, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  /// The camelCase JSON key.
  pub key:      &'static str,
  pub label:    &'static str,
  pub kind:     FieldKind,
  pub required: bool,
}

impl FieldSpec {
  pub const fn text(key: &'static str, label: &'static str) -> Self {
    Self { key, label, kind: FieldKind::Text, required: false }
  }

  pub const fn number(key: &'static str, label: &'static str) -> Self {
    Self { key, label, kind: FieldKind::Number, required: false }
  }

  pub const fn choice(
    key: &'static str,
    label: &'static str,
    options: &'static [&'static str],
  ) -> Self {
    Self { key, label, kind: FieldKind::Choice(options), required: false }
  }

  pub const fn required(mut self) -> Self {
    self.required = true;
    self
  }
}

/// Render a stored JSON value the way a form or table shows it.
pub fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A record type managed by the store.
///
/// Implementors must be `#[serde(default)]` so that absent optional fields
/// decode to their defaults; required fields are checked afterwards by
/// [`Entity::validate`].
pub trait Entity:
  Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static
{
  /// Storage collection name.
  const COLLECTION: &'static str;
  /// Resource path under `/api`, without leading slash.
  const PATH: &'static str;
  /// Singular, lowercase, human-readable name.
  const LABEL: &'static str;
  const FIELDS: &'static [FieldSpec];
  /// Key of the field that must be unique within the collection.
  const UNIQUE: Option<&'static str> = None;
  /// Keys matched by the client's free-text filter.
  const SEARCH: &'static [&'static str];
  /// Key of the field offered as an exact-match dropdown filter.
  const FACET: Option<&'static str> = None;
  /// Key of the field offered as a date-equality filter.
  const DATE: Option<&'static str> = None;
  /// Keys shown as table columns by the client.
  const COLUMNS: &'static [&'static str];

  /// The status value a toggle moves this record to, if the entity has one.
  fn next_status(&self) -> Option<Value> { None }

  /// Cross-field invariants the client enforces before submitting.
  fn check(&self) -> Result<()> { Ok(()) }

  // ── Provided ────────────────────────────────────────────────────────────

  /// The entity as a JSON object keyed by field name.
  fn to_fields(&self) -> Result<Map<String, Value>> {
    match serde_json::to_value(self)? {
      Value::Object(map) => Ok(map),
      _ => Err(Error::NotAnObject),
    }
  }

  /// Decode from a field map. `null` values count as absent, so a required
  /// field sent as `null` is reported by [`Entity::validate`].
  fn from_fields(mut fields: Map<String, Value>) -> Result<Self> {
    fields.retain(|_, value| !value.is_null());
    Ok(serde_json::from_value(Value::Object(fields))?)
  }

  /// Decode a request body, which must be a JSON object.
  fn from_json(body: Value) -> Result<Self> {
    match body {
      Value::Object(map) => Self::from_fields(map),
      _ => Err(Error::NotAnObject),
    }
  }

  /// Required fields that are absent or blank.
  fn missing_fields(&self) -> Vec<&'static str> {
    let Ok(fields) = self.to_fields() else {
      return Self::FIELDS.iter().filter(|f| f.required).map(|f| f.key).collect();
    };
    Self::FIELDS
      .iter()
      .filter(|spec| spec.required)
      .filter(|spec| match fields.get(spec.key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
      })
      .map(|spec| spec.key)
      .collect()
  }

  /// Fails with [`Error::MissingFields`] if any required field is blank, or
  /// with [`Error::Invalid`] if a choice field holds a value outside its
  /// options.
  fn validate(&self) -> Result<()> {
    let missing = self.missing_fields();
    if !missing.is_empty() {
      return Err(Error::MissingFields(missing));
    }
    for spec in Self::FIELDS {
      let FieldKind::Choice(options) = spec.kind else {
        continue;
      };
      let value = self.field_text(spec.key);
      if !options.contains(&value.as_str()) {
        return Err(Error::Invalid(format!(
          "{} must be one of: {}",
          spec.label,
          options.join(", ")
        )));
      }
    }
    Ok(())
  }

  /// The current value of the [`Entity::UNIQUE`] field, if any.
  fn unique_value(&self) -> Option<String> {
    let key = Self::UNIQUE?;
    let fields = self.to_fields().ok()?;
    fields.get(key).map(display_value).filter(|v| !v.is_empty())
  }

  /// The display string of one field, empty when absent.
  fn field_text(&self, key: &str) -> String {
    self
      .to_fields()
      .ok()
      .and_then(|fields| fields.get(key).map(display_value))
      .unwrap_or_default()
  }

  /// Label of a field key, falling back to the key itself.
  fn field_label(key: &str) -> &str {
    Self::FIELDS
      .iter()
      .find(|spec| spec.key == key)
      .map(|spec| spec.label)
      .unwrap_or(key)
  }

  /// [`Entity::LABEL`] with its first letter capitalised, for messages.
  fn title() -> String {
    let mut chars = Self::LABEL.chars();
    match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Keys owned by the store; ignored when merging a partial update.
pub const RESERVED_KEYS: &[&str] = &["id", "createdAt", "updatedAt", "_id"];

/// A persisted entity together with its store-assigned metadata.
///
/// Serialises flat: `{"id": ..., "createdAt": ..., "updatedAt": ..., <fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<E> {
  pub id:         Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(flatten)]
  pub entity:     E,
}

impl<E: Entity> Record<E> {
  /// Wrap a freshly created entity with a new id and timestamps.
  pub fn new(entity: E) -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(), created_at: now, updated_at: now, entity }
  }

  /// Apply a partial update: keys present in `patch` overwrite the stored
  /// fields, everything else is kept. Reserved keys are ignored.
  pub fn merged(&self, patch: &Map<String, Value>) -> Result<E> {
    let mut fields = self.entity.to_fields()?;
    for (key, value) in patch {
      if RESERVED_KEYS.contains(&key.as_str()) {
        continue;
      }
      fields.insert(key.clone(), value.clone());
    }
    E::from_fields(fields)
  }
}
