//! Login screen.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered;
use crate::app::LoginForm;

pub fn draw(f: &mut Frame, area: Rect, form: &LoginForm) {
  let masked = "*".repeat(form.password.chars().count());

  let mut lines = vec![
    Line::from(Span::styled(
      "School administration",
      Style::default().fg(Color::Gray),
    )),
    Line::from(""),
    field("Email    ", &form.email, !form.on_password),
    field("Password ", &masked, form.on_password),
    Line::from(""),
  ];

  match &form.error {
    Some(error) => lines.push(Line::from(Span::styled(
      error.clone(),
      Style::default().fg(Color::Red),
    ))),
    None => lines.push(Line::from("")),
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "Tab switch field  Enter sign in  Esc quit",
    Style::default().fg(Color::DarkGray),
  )));
  lines.push(Line::from(Span::styled(
    "No account? roster signup --help",
    Style::default().fg(Color::DarkGray),
  )));

  let block = Block::default()
    .title(" roster · sign in ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let popup = centered(area, 56, lines.len() as u16 + 2);
  f.render_widget(Clear, popup);
  f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn field(label: &'static str, value: &str, focused: bool) -> Line<'static> {
  let (label_style, value_style, cursor) = if focused {
    (
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
      Style::default().fg(Color::White).bg(Color::DarkGray),
      "_",
    )
  } else {
    (Style::default().fg(Color::Gray), Style::default().fg(Color::White), "")
  };
  Line::from(vec![
    Span::styled(label, label_style),
    Span::styled(format!("{value}{cursor}"), value_style),
  ])
}
