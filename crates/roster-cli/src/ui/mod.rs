//! TUI rendering entry point.

pub mod form;
pub mod login;
pub mod table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};

use crate::{
  app::{App, Input, Screen, Tab},
  module::Phase,
  with_module,
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  if app.screen == Screen::Login {
    let area = f.area();
    login::draw(f, area, &app.login);
    return;
  }

  // Vertical stack: header, tabs, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_tabs(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

/// A `width` x `height` rectangle centred in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
    .flex(Flex::Center)
    .areas(area);
  let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
    .flex(Flex::Center)
    .areas(row);
  rect
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let who = app
    .session
    .as_ref()
    .map(|s| format!("  {}", s.banner()))
    .unwrap_or_default();
  let since = app
    .session
    .as_ref()
    .map(|s| format!("signed in {}  ", s.signed_in_since()))
    .unwrap_or_default();

  let left = Span::styled(
    format!(" roster{who}"),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{since}{date} "),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let titles = Tab::ALL
    .iter()
    .enumerate()
    .map(|(i, tab)| format!("{} {}", i + 1, tab.title()));
  let selected = Tab::ALL.iter().position(|t| *t == app.tab);
  let tabs = Tabs::new(titles)
    .select(selected.unwrap_or(0))
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );
  f.render_widget(tabs, area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let title = app.tab.title();
  with_module!(app.tab, &app.modules, |m| {
    table::draw(f, area, m, &app.input, title);
    if m.form.is_some() {
      form::draw(f, area, m);
    } else if m.confirm_delete.is_some() {
      form::draw_confirm(f, area, m);
    }
  });
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (has_form, confirming, failure) = with_module!(app.tab, &app.modules, |m| {
    let failure = match &m.phase {
      Phase::Failed(message) => Some(message.clone()),
      _ => None,
    };
    (m.form.is_some(), m.confirm_delete.is_some(), failure)
  });

  let (mode_label, hints) = if has_form {
    (
      "FORM",
      "Tab/↑↓ field  ←→/space choose  Enter save  Esc cancel",
    )
  } else if confirming {
    ("CONFIRM", "y delete  n/Esc keep")
  } else {
    match &app.input {
      Input::Search => ("SEARCH", "Type to filter  Enter keep  Esc clear"),
      Input::Date(_) => ("DATE", "YYYY-MM-DD  Enter apply (blank clears)  Esc cancel"),
      Input::Normal => (
        "NORMAL",
        "1-7/Tab module  jk move  / search  f facet  d date  c clear  a add  e edit  s status  x delete  r reload  L logout  q quit",
      ),
    }
  };

  let (message, color) = match (app.alert(), failure) {
    (Some(alert), _) => (alert, Color::Yellow),
    (None, Some(failure)) => (failure, Color::Red),
    (None, None) => (hints.to_string(), Color::Gray),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {message}"), Style::default().fg(color));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
