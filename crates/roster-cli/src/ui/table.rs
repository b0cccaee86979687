//! Record table, the main pane of every module.

use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use roster_core::entity::{Entity, Record};

use crate::{
  app::Input,
  module::{ModuleState, Phase},
};

/// Render the module's filtered records into `area`.
pub fn draw<E: Entity>(
  f: &mut Frame,
  area: Rect,
  module: &ModuleState<E>,
  input: &Input,
  title: &str,
) {
  let visible = module.visible();
  let total = module.records.len();

  // Title with count.
  let title = if module.filter.is_active() {
    format!(" {title} ({}/{total}) ", visible.len())
  } else {
    format!(" {title} ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let [filter_area, table_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
  f.render_widget(Paragraph::new(filter_line::<E>(module, input)), filter_area);

  if module.phase == Phase::Loading {
    let loading = Paragraph::new("Loading…").style(Style::default().fg(Color::DarkGray));
    f.render_widget(loading, table_area);
    return;
  }

  if visible.is_empty() {
    let text = if total == 0 {
      format!("No {} yet. Press a to add one.", E::COLLECTION.replace('_', " "))
    } else {
      "Nothing matches the current filter.".to_string()
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
      table_area,
    );
    return;
  }

  let header = Row::new(E::COLUMNS.iter().map(|key| Cell::from(E::field_label(key))))
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );
  let rows: Vec<Row> = visible.iter().map(|record| row::<E>(record)).collect();
  let widths = E::COLUMNS.iter().map(|_| Constraint::Fill(1));

  let mut state = TableState::default();
  state.select(Some(module.cursor));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    table_area,
    &mut state,
  );
}

fn row<E: Entity>(record: &Record<E>) -> Row<'static> {
  let cells = E::COLUMNS.iter().map(|key| {
    let text = record.entity.field_text(key);
    let style = match text.as_str() {
      "inactive" | "absent" => Style::default().fg(Color::Red),
      "leave" | "on-duty" => Style::default().fg(Color::Yellow),
      _ => Style::default(),
    };
    Cell::from(text).style(style)
  });
  Row::new(cells)
}

/// `/text  class: 10-A  date: 2026-02-15`, with the field being edited
/// marked by a trailing cursor.
fn filter_line<E: Entity>(module: &ModuleState<E>, input: &Input) -> Line<'static> {
  let filter = &module.filter;
  let active = Style::default().fg(Color::Yellow);
  let dim = Style::default().fg(Color::DarkGray);

  let mut spans = Vec::new();
  let search = match input {
    Input::Search => format!("/{}_", filter.text),
    _ if filter.text.is_empty() => "/ search".to_string(),
    _ => format!("/{}", filter.text),
  };
  let search_style = if matches!(input, Input::Search) || !filter.text.is_empty() {
    active
  } else {
    dim
  };
  spans.push(Span::styled(search, search_style));

  if let Some(key) = E::FACET {
    let value = filter.facet.as_deref().unwrap_or("all");
    let style = if filter.facet.is_some() { active } else { dim };
    spans.push(Span::styled(
      format!("   {}: {value}", E::field_label(key).to_lowercase()),
      style,
    ));
  }

  if E::DATE.is_some() {
    let (text, style) = match (input, &filter.date) {
      (Input::Date(buffer), _) => (format!("date: {buffer}_"), active),
      (_, Some(date)) => (format!("date: {date}"), active),
      (_, None) => ("date: any".to_string(), dim),
    };
    spans.push(Span::styled(format!("   {text}"), style));
  }

  Line::from(spans)
}
