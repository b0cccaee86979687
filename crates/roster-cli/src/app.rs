//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::{
  attendance::{StaffAttendance, StudentAttendance},
  event::Event,
  school::{SchoolClass, Student, Subject, Teacher},
  user::{Credentials, normalize_email},
};

use crate::{
  client::ApiClient,
  module::{ModuleState, Phase},
  session::Session,
};

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Students,
  Teachers,
  Classes,
  Subjects,
  StudentAttendance,
  StaffAttendance,
  Events,
}

impl Tab {
  pub const ALL: [Tab; 7] = [
    Tab::Students,
    Tab::Teachers,
    Tab::Classes,
    Tab::Subjects,
    Tab::StudentAttendance,
    Tab::StaffAttendance,
    Tab::Events,
  ];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Students => "Students",
      Tab::Teachers => "Teachers",
      Tab::Classes => "Classes",
      Tab::Subjects => "Subjects",
      Tab::StudentAttendance => "Student attendance",
      Tab::StaffAttendance => "Staff attendance",
      Tab::Events => "Events",
    }
  }

  fn index(self) -> usize {
    Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
  }

  fn offset(self, delta: isize) -> Tab {
    let len = Tab::ALL.len() as isize;
    Tab::ALL[(self.index() as isize + delta).rem_euclid(len) as usize]
  }
}

/// One [`ModuleState`] per tab.
#[derive(Default)]
pub struct Modules {
  pub students:           ModuleState<Student>,
  pub teachers:           ModuleState<Teacher>,
  pub classes:            ModuleState<SchoolClass>,
  pub subjects:           ModuleState<Subject>,
  pub student_attendance: ModuleState<StudentAttendance>,
  pub staff_attendance:   ModuleState<StaffAttendance>,
  pub events:             ModuleState<Event>,
}

/// Run `$body` with `$m` bound to the module of `$tab`, borrowed as written
/// (`&modules` or `&mut modules`). Each arm is monomorphised for its entity.
#[macro_export]
macro_rules! with_module {
  ($tab:expr, &mut $modules:expr, |$m:ident| $body:expr) => {
    match $tab {
      $crate::app::Tab::Students => { let $m = &mut $modules.students; $body }
      $crate::app::Tab::Teachers => { let $m = &mut $modules.teachers; $body }
      $crate::app::Tab::Classes => { let $m = &mut $modules.classes; $body }
      $crate::app::Tab::Subjects => { let $m = &mut $modules.subjects; $body }
      $crate::app::Tab::StudentAttendance => { let $m = &mut $modules.student_attendance; $body }
      $crate::app::Tab::StaffAttendance => { let $m = &mut $modules.staff_attendance; $body }
      $crate::app::Tab::Events => { let $m = &mut $modules.events; $body }
    }
  };
  ($tab:expr, &$modules:expr, |$m:ident| $body:expr) => {
    match $tab {
      $crate::app::Tab::Students => { let $m = &$modules.students; $body }
      $crate::app::Tab::Teachers => { let $m = &$modules.teachers; $body }
      $crate::app::Tab::Classes => { let $m = &$modules.classes; $body }
      $crate::app::Tab::Subjects => { let $m = &$modules.subjects; $body }
      $crate::app::Tab::StudentAttendance => { let $m = &$modules.student_attendance; $body }
      $crate::app::Tab::StaffAttendance => { let $m = &$modules.staff_attendance; $body }
      $crate::app::Tab::Events => { let $m = &$modules.events; $body }
    }
  };
}

// ─── Screens & input modes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Modules,
}

/// Where printable keys go on the modules screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
  Normal,
  /// Typing into the free-text filter.
  Search,
  /// Typing a `YYYY-MM-DD` date filter; applied on Enter.
  Date(String),
}

/// The login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
  pub email:       String,
  pub password:    String,
  /// `false` → email field, `true` → password field.
  pub on_password: bool,
  pub error:       Option<String>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen:  Screen,
  pub session: Option<Session>,
  pub login:   LoginForm,
  pub tab:     Tab,
  pub input:   Input,
  pub modules: Modules,
  pub client:  ApiClient,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Login,
      session: None,
      login: LoginForm::default(),
      tab: Tab::Students,
      input: Input::Normal,
      modules: Modules::default(),
      client,
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Authenticate with the login form's contents. On success a session is
  /// opened and the current tab is loaded.
  pub async fn sign_in(&mut self) {
    let credentials = Credentials {
      email:    normalize_email(&self.login.email),
      password: self.login.password.clone(),
    };
    if let Err(e) = credentials.validate() {
      self.login.error = Some(e.to_string());
      return;
    }
    match self.client.login(&credentials).await {
      Ok(user) => {
        tracing::info!(email = %user.email, "signed in");
        self.session = Some(Session::new(user));
        self.login = LoginForm::default();
        self.screen = Screen::Modules;
        self.load_current().await;
      }
      Err(e) => self.login.error = Some(e.to_string()),
    }
  }

  /// Drop the session and every loaded record.
  pub fn logout(&mut self) {
    if let Some(session) = self.session.take() {
      tracing::info!(email = %session.email(), "signed out");
    }
    self.modules = Modules::default();
    self.input = Input::Normal;
    self.tab = Tab::Students;
    self.screen = Screen::Login;
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  async fn load_current(&mut self) {
    let client = &self.client;
    with_module!(self.tab, &mut self.modules, |m| m.load(client).await);
  }

  async fn switch_tab(&mut self, tab: Tab) {
    self.tab = tab;
    self.input = Input::Normal;
    let pending = with_module!(self.tab, &self.modules, |m| {
      m.phase == Phase::Loading && m.records.is_empty()
    });
    if pending {
      self.load_current().await;
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Modules => self.handle_module_key(key).await,
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> bool {
    let form = &mut self.login;
    let field = if form.on_password { &mut form.password } else { &mut form.email };
    match key.code {
      KeyCode::Esc => return false,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        form.on_password = !form.on_password;
      }
      KeyCode::Backspace => {
        field.pop();
      }
      KeyCode::Char(c) => field.push(c),
      KeyCode::Enter => self.sign_in().await,
      _ => {}
    }
    true
  }

  async fn handle_module_key(&mut self, key: KeyEvent) -> bool {
    // Alerts last until the next key press.
    with_module!(self.tab, &mut self.modules, |m| m.alert = None);
    let has_form = with_module!(self.tab, &self.modules, |m| m.form.is_some());
    let confirming = with_module!(self.tab, &self.modules, |m| m.confirm_delete.is_some());

    if has_form {
      self.handle_form_key(key).await;
      return true;
    }
    if confirming {
      self.handle_confirm_key(key).await;
      return true;
    }
    match self.input.clone() {
      Input::Search => {
        self.handle_search_key(key);
        true
      }
      Input::Date(buffer) => {
        self.handle_date_key(key, buffer);
        true
      }
      Input::Normal => self.handle_normal_key(key).await,
    }
  }

  async fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
    let client = &self.client;
    let tab = self.tab;
    let modules = &mut self.modules;
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('L') => self.logout(),

      // Tabs
      KeyCode::Tab | KeyCode::Right => self.switch_tab(tab.offset(1)).await,
      KeyCode::BackTab | KeyCode::Left => self.switch_tab(tab.offset(-1)).await,
      KeyCode::Char(c @ '1'..='7') => {
        let index = c as usize - '1' as usize;
        self.switch_tab(Tab::ALL[index]).await;
      }
      KeyCode::Char('r') => self.load_current().await,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => with_module!(tab, &mut modules, |m| m.move_cursor(1)),
      KeyCode::Up | KeyCode::Char('k') => with_module!(tab, &mut modules, |m| m.move_cursor(-1)),

      // Filters
      KeyCode::Char('/') => self.input = Input::Search,
      KeyCode::Char('f') => with_module!(tab, &mut modules, |m| m.cycle_facet()),
      KeyCode::Char('d') => {
        let current = with_module!(tab, &modules, |m| m.filter.date.clone());
        self.input = Input::Date(current.unwrap_or_default());
      }
      KeyCode::Char('c') => with_module!(tab, &mut modules, |m| m.clear_filter()),

      // Records
      KeyCode::Char('a') | KeyCode::Char('n') => {
        with_module!(tab, &mut modules, |m| m.open_create())
      }
      KeyCode::Enter | KeyCode::Char('e') => with_module!(tab, &mut modules, |m| m.open_edit()),
      KeyCode::Char('s') => with_module!(tab, &mut modules, |m| m.toggle_status(client).await),
      KeyCode::Char('x') | KeyCode::Delete => {
        with_module!(tab, &mut modules, |m| m.request_delete())
      }

      _ => {}
    }
    true
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    let tab = self.tab;
    let modules = &mut self.modules;
    match key.code {
      KeyCode::Esc => {
        with_module!(tab, &mut modules, |m| {
          m.filter.text.clear();
          m.cursor = 0;
        });
        self.input = Input::Normal;
      }
      KeyCode::Enter => self.input = Input::Normal,
      KeyCode::Backspace => with_module!(tab, &mut modules, |m| m.pop_search()),
      KeyCode::Char(c) => with_module!(tab, &mut modules, |m| m.push_search(c)),
      _ => {}
    }
  }

  fn handle_date_key(&mut self, key: KeyEvent, mut buffer: String) {
    let tab = self.tab;
    let modules = &mut self.modules;
    match key.code {
      KeyCode::Esc => self.input = Input::Normal,
      KeyCode::Enter => {
        with_module!(tab, &mut modules, |m| m.set_date(&buffer));
        self.input = Input::Normal;
      }
      KeyCode::Backspace => {
        buffer.pop();
        self.input = Input::Date(buffer);
      }
      KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
        buffer.push(c);
        self.input = Input::Date(buffer);
      }
      _ => {}
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let on_choice = with_module!(self.tab, &self.modules, |m| m.is_choice_focused());
    let client = &self.client;
    let tab = self.tab;
    let modules = &mut self.modules;
    match key.code {
      KeyCode::Esc => with_module!(tab, &mut modules, |m| m.cancel_form()),
      KeyCode::Enter => with_module!(tab, &mut modules, |m| m.submit(client).await),
      KeyCode::Tab | KeyCode::Down => with_module!(tab, &mut modules, |m| m.form_focus(1)),
      KeyCode::BackTab | KeyCode::Up => with_module!(tab, &mut modules, |m| m.form_focus(-1)),
      KeyCode::Left => with_module!(tab, &mut modules, |m| m.form_cycle_choice(false)),
      KeyCode::Right | KeyCode::Char(' ') if on_choice => {
        with_module!(tab, &mut modules, |m| m.form_cycle_choice(true))
      }
      KeyCode::Backspace => with_module!(tab, &mut modules, |m| m.form_backspace()),
      KeyCode::Char(c) => with_module!(tab, &mut modules, |m| m.form_input(c)),
      _ => {}
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    let client = &self.client;
    let tab = self.tab;
    let modules = &mut self.modules;
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        with_module!(tab, &mut modules, |m| m.confirm_delete(client).await)
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        with_module!(tab, &mut modules, |m| m.cancel_delete())
      }
      _ => {}
    }
  }

  /// The alert of the current tab, if any.
  pub fn alert(&self) -> Option<String> {
    with_module!(self.tab, &self.modules, |m| m.alert.clone())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use crossterm::event::KeyEvent;
  use roster_core::user::User;
  use uuid::Uuid;

  use super::*;
  use crate::client::ApiConfig;

  fn app() -> App {
    let client = ApiClient::new(ApiConfig { base_url: "http://127.0.0.1:9".into() }).unwrap();
    App::new(client)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  #[test]
  fn tabs_wrap_in_both_directions() {
    assert_eq!(Tab::Students.offset(-1), Tab::Events);
    assert_eq!(Tab::Events.offset(1), Tab::Students);
    assert_eq!(Tab::Classes.offset(2), Tab::StudentAttendance);
  }

  #[tokio::test]
  async fn login_form_validates_before_any_request() {
    let mut app = app();
    for c in "meera".chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
    app.handle_key(key(KeyCode::Tab)).await;
    for c in "secret1".chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
    app.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(app.login.email, "meera");
    assert_eq!(app.login.password, "secret1");
    assert_eq!(app.login.error.as_deref(), Some("Please enter a valid email"));
    assert!(app.session.is_none());
    assert_eq!(app.screen, Screen::Login);
  }

  #[tokio::test]
  async fn logout_drops_session_and_records() {
    let mut app = app();
    let now = Utc::now();
    app.session = Some(Session::new(User {
      id:                Uuid::new_v4(),
      full_name:         "Meera Iyer".into(),
      organization_name: "Celestial High School".into(),
      email:             "meera@celestial.edu".into(),
      mobile_no:         "9876543210".into(),
      created_at:        now,
      updated_at:        now,
    }));
    app.screen = Screen::Modules;
    app.tab = Tab::Events;
    app.modules.students.filter.text = "arj".into();

    let keep_going = app.handle_key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)).await;
    assert!(keep_going);
    assert!(app.session.is_none());
    assert_eq!(app.screen, Screen::Login);
    assert_eq!(app.tab, Tab::Students);
    assert!(app.modules.students.filter.text.is_empty());
  }

  #[tokio::test]
  async fn ctrl_c_quits_from_any_screen() {
    let mut app = app();
    let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(quit).await);
  }
}
