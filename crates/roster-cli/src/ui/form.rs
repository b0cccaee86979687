//! Create/edit popup and the delete confirmation.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use roster_core::entity::{Entity, FieldKind};

use super::centered;
use crate::module::ModuleState;

// ─── Form ─────────────────────────────────────────────────────────────────────

/// Render the module's open form as a popup over `area`.
pub fn draw<E: Entity>(f: &mut Frame, area: Rect, module: &ModuleState<E>) {
  let Some(form) = &module.form else {
    return;
  };
  let label_width = E::FIELDS
    .iter()
    .map(|spec| spec.label.chars().count() + 2)
    .max()
    .unwrap_or(0);

  let mut lines: Vec<Line> = Vec::with_capacity(E::FIELDS.len() + 3);
  for (i, (spec, value)) in E::FIELDS.iter().zip(&form.values).enumerate() {
    let focused = i == form.focus;
    let marker = if spec.required { "*" } else { " " };
    let label = format!("{:<label_width$}", format!("{}{marker}", spec.label));

    let shown = match spec.kind {
      FieldKind::Choice(_) if focused => format!("< {value} >"),
      FieldKind::Choice(_) => format!("  {value}"),
      _ if focused => format!("{value}_"),
      _ => value.clone(),
    };

    let (label_style, value_style) = if focused {
      (
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
        Style::default().fg(Color::White).bg(Color::DarkGray),
      )
    } else {
      (Style::default().fg(Color::Gray), Style::default().fg(Color::White))
    };

    lines.push(Line::from(vec![
      Span::styled(label, label_style),
      Span::raw(" "),
      Span::styled(shown, value_style),
    ]));
  }

  lines.push(Line::from(""));
  if form.submitting {
    lines.push(Line::from(Span::styled(
      "Saving…",
      Style::default().fg(Color::Yellow),
    )));
  } else if let Some(error) = &form.error {
    lines.push(Line::from(Span::styled(
      error.clone(),
      Style::default().fg(Color::Red),
    )));
  } else {
    lines.push(Line::from(Span::styled(
      "* required",
      Style::default().fg(Color::DarkGray),
    )));
  }

  let verb = if form.editing.is_some() { "Edit" } else { "Add" };
  let block = Block::default()
    .title(format!(" {verb} {} ", E::LABEL))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let height = lines.len() as u16 + 2;
  let popup = centered(area, 64, height);
  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    popup,
  );
}

// ─── Delete confirmation ──────────────────────────────────────────────────────

pub fn draw_confirm<E: Entity>(f: &mut Frame, area: Rect, module: &ModuleState<E>) {
  let name = module
    .confirm_delete
    .and_then(|id| module.records.iter().find(|r| r.id == id))
    .map(|record| {
      E::COLUMNS
        .iter()
        .take(2)
        .map(|key| record.entity.field_text(key))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    })
    .unwrap_or_default();

  let lines = vec![
    Line::from(format!("Delete this {}?", E::LABEL)),
    Line::from(Span::styled(name, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("y delete   n keep", Style::default().fg(Color::DarkGray))),
  ];

  let block = Block::default()
    .title(" Confirm ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));

  let popup = centered(area, 48, lines.len() as u16 + 2);
  f.render_widget(Clear, popup);
  f.render_widget(Paragraph::new(lines).block(block), popup);
}
