//! Per-module list, filter, and form state.
//!
//! Every screen of the client (students, teachers, classes, ...) is a
//! [`ModuleState`] over one entity type. It owns the locally loaded records
//! and only changes them in response to a successful server reply.

use anyhow::Result;
use chrono::Utc;
use roster_core::{
  Error as CoreError,
  entity::{Entity, FieldKind, Record},
  filter::{ListFilter, facet_options},
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::client::ApiClient;

// ─── Backend ──────────────────────────────────────────────────────────────────

/// The record operations a module needs from the server.
pub trait Backend {
  async fn list<E: Entity>(&self) -> Result<Vec<Record<E>>>;

  async fn create<E: Entity>(&self, entity: &E) -> Result<Record<E>>;

  async fn update<E: Entity>(&self, id: Uuid, patch: &Map<String, Value>) -> Result<Record<E>>;

  async fn delete<E: Entity>(&self, id: Uuid) -> Result<()>;
}

impl Backend for ApiClient {
  async fn list<E: Entity>(&self) -> Result<Vec<Record<E>>> {
    ApiClient::list::<E>(self).await
  }

  async fn create<E: Entity>(&self, entity: &E) -> Result<Record<E>> {
    ApiClient::create(self, entity).await
  }

  async fn update<E: Entity>(&self, id: Uuid, patch: &Map<String, Value>) -> Result<Record<E>> {
    ApiClient::update::<E>(self, id, patch).await
  }

  async fn delete<E: Entity>(&self, id: Uuid) -> Result<()> {
    ApiClient::delete::<E>(self, id).await
  }
}

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
  Loading,
  Loaded,
  /// The last list request failed; records from any earlier load are kept.
  Failed(String),
}

/// An open create or edit form. `values` holds one string per entry of
/// [`Entity::FIELDS`], in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
  pub editing:    Option<Uuid>,
  pub values:     Vec<String>,
  pub focus:      usize,
  pub error:      Option<String>,
  pub submitting: bool,
}

pub struct ModuleState<E> {
  pub phase:          Phase,
  pub records:        Vec<Record<E>>,
  pub filter:         ListFilter,
  /// Index into [`ModuleState::visible`].
  pub cursor:         usize,
  pub form:           Option<FormState>,
  /// Id awaiting a yes/no confirmation before it is deleted.
  pub confirm_delete: Option<Uuid>,
  /// One-line outcome of the last action.
  pub alert:          Option<String>,
}

impl<E: Entity> Default for ModuleState<E> {
  fn default() -> Self {
    Self {
      phase:          Phase::Loading,
      records:        Vec::new(),
      filter:         ListFilter::default(),
      cursor:         0,
      form:           None,
      confirm_delete: None,
      alert:          None,
    }
  }
}

impl<E: Entity> ModuleState<E> {
  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch the whole collection, replacing the local list on success.
  pub async fn load<B: Backend>(&mut self, backend: &B) {
    self.phase = Phase::Loading;
    match backend.list::<E>().await {
      Ok(records) => {
        self.records = records;
        self.phase = Phase::Loaded;
        self.clamp_cursor();
      }
      Err(e) => {
        tracing::warn!(collection = E::COLLECTION, error = %e, "load failed");
        self.phase = Phase::Failed(format!("Error loading {}: {e}", E::COLLECTION));
      }
    }
  }

  // ── Listing ───────────────────────────────────────────────────────────────

  /// Records passing the current filter, in load order.
  pub fn visible(&self) -> Vec<&Record<E>> { self.filter.apply(&self.records) }

  pub fn selected(&self) -> Option<&Record<E>> {
    self.visible().get(self.cursor).copied()
  }

  pub fn move_cursor(&mut self, delta: isize) {
    let len = self.visible().len();
    if len == 0 {
      self.cursor = 0;
      return;
    }
    self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  // ── Filtering ─────────────────────────────────────────────────────────────

  pub fn push_search(&mut self, c: char) {
    self.filter.text.push(c);
    self.cursor = 0;
  }

  pub fn pop_search(&mut self) {
    self.filter.text.pop();
    self.cursor = 0;
  }

  /// Step the facet filter through "all" and each distinct value present in
  /// the loaded list.
  pub fn cycle_facet(&mut self) {
    let options = facet_options(&self.records);
    self.filter.facet = match self.filter.facet.take() {
      None => options.into_iter().next(),
      Some(current) => options
        .iter()
        .position(|o| *o == current)
        .and_then(|i| options.get(i + 1).cloned()),
    };
    self.cursor = 0;
  }

  /// Set the date filter; blank input clears it. Ignored for entities
  /// without a date field.
  pub fn set_date(&mut self, date: &str) {
    let date = date.trim();
    self.filter.date = (E::DATE.is_some() && !date.is_empty()).then(|| date.to_owned());
    self.cursor = 0;
  }

  pub fn clear_filter(&mut self) {
    self.filter = ListFilter::default();
    self.cursor = 0;
  }

  // ── Forms ─────────────────────────────────────────────────────────────────

  pub fn open_create(&mut self) {
    let defaults = E::default();
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let values = E::FIELDS
      .iter()
      .map(|spec| match spec.kind {
        FieldKind::Number => String::new(),
        _ if Some(spec.key) == E::DATE => today.clone(),
        _ => defaults.field_text(spec.key),
      })
      .collect();
    self.form = Some(FormState {
      editing: None,
      values,
      focus: 0,
      error: None,
      submitting: false,
    });
  }

  /// Open the form pre-filled from the record under the cursor.
  pub fn open_edit(&mut self) {
    let Some(record) = self.selected() else {
      return;
    };
    let id = record.id;
    let values = E::FIELDS
      .iter()
      .map(|spec| record.entity.field_text(spec.key))
      .collect();
    self.form = Some(FormState {
      editing: Some(id),
      values,
      focus: 0,
      error: None,
      submitting: false,
    });
  }

  pub fn cancel_form(&mut self) { self.form = None; }

  pub fn form_focus(&mut self, delta: isize) {
    if let Some(form) = self.form.as_mut() {
      let len = E::FIELDS.len() as isize;
      form.focus = (form.focus as isize + delta).rem_euclid(len) as usize;
    }
  }

  /// Type into the focused field. Choice fields ignore typing and number
  /// fields accept digits only.
  pub fn form_input(&mut self, c: char) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    let spec = E::FIELDS[form.focus];
    match spec.kind {
      FieldKind::Choice(_) => {}
      FieldKind::Number if !c.is_ascii_digit() => {}
      FieldKind::Number | FieldKind::Text => form.values[form.focus].push(c),
    }
  }

  pub fn form_backspace(&mut self) {
    if let Some(form) = self.form.as_mut()
      && !matches!(E::FIELDS[form.focus].kind, FieldKind::Choice(_))
    {
      form.values[form.focus].pop();
    }
  }

  pub fn is_choice_focused(&self) -> bool {
    self
      .form
      .as_ref()
      .is_some_and(|form| matches!(E::FIELDS[form.focus].kind, FieldKind::Choice(_)))
  }

  /// Move the focused choice field to its next (or previous) option.
  pub fn form_cycle_choice(&mut self, forward: bool) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    let FieldKind::Choice(options) = E::FIELDS[form.focus].kind else {
      return;
    };
    let current = &form.values[form.focus];
    let len = options.len();
    let next = match options.iter().position(|o| *o == current.as_str()) {
      Some(i) if forward => (i + 1) % len,
      Some(i) => (i + len - 1) % len,
      None => 0,
    };
    form.values[form.focus] = options[next].to_owned();
  }

  /// Build and check an entity from the form's raw values.
  fn form_entity(form: &FormState) -> Result<E, String> {
    let mut fields = Map::new();
    for (spec, raw) in E::FIELDS.iter().zip(&form.values) {
      let raw = raw.trim();
      let value = match spec.kind {
        FieldKind::Number if raw.is_empty() => Value::from(0u32),
        FieldKind::Number => raw
          .parse::<u32>()
          .map(Value::from)
          .map_err(|_| format!("{} must be a whole number", spec.label))?,
        FieldKind::Text | FieldKind::Choice(_) => Value::String(raw.to_owned()),
      };
      fields.insert(spec.key.to_owned(), value);
    }

    let entity = E::from_fields(fields).map_err(|e| e.to_string())?;
    entity.validate().map_err(|e| match e {
      CoreError::MissingFields(keys) => {
        let labels: Vec<&str> = keys.iter().map(|k| E::field_label(k)).collect();
        format!("Please fill all required fields ({})", labels.join(", "))
      }
      other => other.to_string(),
    })?;
    entity.check().map_err(|e| e.to_string())?;
    Ok(entity)
  }

  /// Validate locally, then create or update on the server. On failure the
  /// form stays open with an inline error and the list is untouched.
  pub async fn submit<B: Backend>(&mut self, backend: &B) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    if form.submitting {
      return;
    }
    let entity = match Self::form_entity(form) {
      Ok(entity) => entity,
      Err(message) => {
        form.error = Some(message);
        return;
      }
    };
    form.submitting = true;
    form.error = None;
    let editing = form.editing;

    let result = match editing {
      Some(id) => match entity.to_fields() {
        Ok(patch) => backend.update::<E>(id, &patch).await,
        Err(e) => Err(e.into()),
      },
      None => backend.create(&entity).await,
    };

    match result {
      Ok(record) => {
        let verb = if editing.is_some() { "updated" } else { "added" };
        self.upsert(record);
        self.form = None;
        self.alert = Some(format!("{} {verb} successfully", E::title()));
      }
      Err(e) => {
        if let Some(form) = self.form.as_mut() {
          form.submitting = false;
          form.error = Some(e.to_string());
        }
      }
    }
  }

  // ── Row actions ───────────────────────────────────────────────────────────

  /// Send only the next status value for the selected record.
  pub async fn toggle_status<B: Backend>(&mut self, backend: &B) {
    let Some(record) = self.selected() else {
      return;
    };
    let Some(next) = record.entity.next_status() else {
      return;
    };
    let id = record.id;

    let mut patch = Map::new();
    patch.insert("status".to_owned(), next);
    match backend.update::<E>(id, &patch).await {
      Ok(updated) => self.upsert(updated),
      Err(e) => self.alert = Some(format!("Error updating status: {e}")),
    }
  }

  pub fn request_delete(&mut self) {
    self.confirm_delete = self.selected().map(|r| r.id);
  }

  pub fn cancel_delete(&mut self) { self.confirm_delete = None; }

  /// Delete the record awaiting confirmation. It leaves the local list only
  /// once the server has confirmed.
  pub async fn confirm_delete<B: Backend>(&mut self, backend: &B) {
    let Some(id) = self.confirm_delete.take() else {
      return;
    };
    match backend.delete::<E>(id).await {
      Ok(()) => {
        self.records.retain(|r| r.id != id);
        self.clamp_cursor();
        self.alert = Some(format!("{} deleted", E::title()));
      }
      Err(e) => self.alert = Some(format!("Error deleting {}: {e}", E::LABEL)),
    }
  }

  /// Replace the local copy of `record`, or append it if new.
  fn upsert(&mut self, record: Record<E>) {
    match self.records.iter_mut().find(|r| r.id == record.id) {
      Some(existing) => *existing = record,
      None => self.records.push(record),
    }
  }
}
