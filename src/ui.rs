use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Gauge, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode, MessageKind, UploadState};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn prompt_title(mode: AppMode) -> &'static str {
  match mode {
    AppMode::GotoPage => " Go to page ",
    AppMode::UploadPath => " Video file to upload ",
    AppMode::UploadTitle => " Upload title ",
    AppMode::BatchPath => " Directory to batch-upload ",
    _ => " Input ",
  }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, bottom_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_bottom(frame, app, bottom_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ vidhub ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.player.is_playing() {
    let [list_area, player_area] =
      Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(area);
    render_catalog(frame, app, list_area);
    render_player(frame, app, player_area);
  } else {
    render_catalog(frame, app, area);
  }
}

fn render_catalog(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();

  if app.videos.is_empty() {
    // The empty catalog is its own state, distinct from "still loading".
    let text = if app.loaded_once {
      vec![
        Line::from(""),
        Line::from(Span::styled("No videos yet", Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Press u to upload one, or b for a whole folder.", Style::default().fg(theme.muted))),
      ]
    } else {
      vec![Line::from(""), Line::from(Span::styled("Loading catalog…", Style::default().fg(theme.muted)))]
    };
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
      Block::bordered()
        .title(" Videos ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .videos
    .iter()
    .enumerate()
    .map(|(i, video)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let duration = video.duration.as_deref().unwrap_or("unknown");
      let right = format!("⏱ {}", duration);
      let right_w = right.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&video.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let nav = app.nav_state();
  let title = format!(" Videos — page {}/{} ", nav.page, nav.total_pages);
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_player(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let state_label = if app.player.paused { "paused" } else { "playing" };
  let info_title = Line::from(vec![
    Span::styled(" Now Playing ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("[{}] ", state_label), Style::default().fg(theme.muted)),
  ]);
  let info_block = Block::bordered()
    .title(info_title)
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  if let Some(session) = &app.player.now_playing {
    let inner_w = area.width.saturating_sub(4) as usize;
    let url = app.catalog.media_url(&session.filename);
    let lines = vec![
      Line::from(""),
      Line::from(Span::styled(
        truncate_str(&session.title, inner_w),
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
      )),
      Line::from(""),
      Line::from(vec![
        Span::styled("File  ", Style::default().fg(theme.muted)),
        Span::styled(truncate_str(&session.filename, inner_w.saturating_sub(6)), Style::default().fg(theme.fg)),
      ]),
      Line::from(""),
      Line::from(Span::styled(
        truncate_str(&url, inner_w),
        Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
      )),
    ];
    frame.render_widget(Paragraph::new(lines).block(info_block), area);
  } else {
    frame.render_widget(info_block, area);
  }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(status) = &app.status_message {
    (format!(" ⏳ {}", status), Style::default().fg(theme.status))
  } else if let Some(msg) = &app.message {
    match msg.kind {
      MessageKind::Error => (format!(" ⚠  {}", msg.text), Style::default().fg(theme.error)),
      MessageKind::Success => (format!(" ✓ {}", msg.text), Style::default().fg(theme.success)),
      MessageKind::Info => (format!(" · {}", msg.text), Style::default().fg(theme.status)),
    }
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Bottom slot: a text prompt while one is open, a confirmation question,
/// an upload progress bar while a transfer runs, or the pagination bar.
fn render_bottom(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.mode {
    AppMode::GotoPage | AppMode::UploadPath | AppMode::UploadTitle | AppMode::BatchPath => {
      render_prompt(frame, app, area);
    }
    AppMode::ConfirmBatch => {
      let count = app.pending_batch.as_ref().map_or(0, |f| f.len());
      render_confirm(frame, app.theme(), area, &format!("Upload {} files from this folder? (y/n)", count));
    }
    AppMode::ConfirmDelete => {
      let title = app.player.now_playing.as_ref().map(|s| s.title.as_str()).unwrap_or("this video");
      render_confirm(frame, app.theme(), area, &format!("Delete \"{}\"? (y/n)", title));
    }
    AppMode::Browse => match app.upload {
      UploadState::Single { percent, .. } => render_upload_gauge(frame, app.theme(), area, percent),
      UploadState::Batch { completed, total, .. } => render_batch_gauge(frame, app.theme(), area, completed, total),
      UploadState::Idle => render_pagination_bar(frame, app, area),
    },
  }
}

fn render_prompt(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let input_block = Block::bordered()
    .title(prompt_title(app.mode))
    .title_style(Style::default().fg(theme.accent))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.accent))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
  frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_confirm(frame: &mut Frame, theme: &Theme, area: Rect, question: &str) {
  let block = Block::bordered()
    .title(" Confirm ")
    .title_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.error))
    .padding(Padding::horizontal(1));
  let inner_w = area.width.saturating_sub(4) as usize;
  let paragraph =
    Paragraph::new(Span::styled(truncate_str(question, inner_w), Style::default().fg(theme.fg))).block(block);
  frame.render_widget(paragraph, area);
}

fn render_upload_gauge(frame: &mut Frame, theme: &Theme, area: Rect, percent: u16) {
  let gauge = Gauge::default()
    .block(
      Block::bordered()
        .title(" Uploading ")
        .title_style(Style::default().fg(theme.accent))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .gauge_style(Style::default().fg(theme.accent).bg(theme.stripe_bg))
    .percent(percent.min(100))
    .label(format!("{}%", percent.min(100)));
  frame.render_widget(gauge, area);
}

fn render_batch_gauge(frame: &mut Frame, theme: &Theme, area: Rect, completed: u64, total: u64) {
  let ratio = if total > 0 { (completed as f64 / total as f64).clamp(0.0, 1.0) } else { 0.0 };
  let gauge = Gauge::default()
    .block(
      Block::bordered()
        .title(" Batch upload ")
        .title_style(Style::default().fg(theme.accent))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .gauge_style(Style::default().fg(theme.accent).bg(theme.stripe_bg))
    .ratio(ratio)
    .label(format!("{}/{}", completed, total));
  frame.render_widget(gauge, area);
}

fn render_pagination_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let nav = app.nav_state();

  let dir_style = |enabled: bool| {
    if enabled { Style::default().fg(theme.fg) } else { Style::default().fg(theme.muted).add_modifier(Modifier::DIM) }
  };

  let line = Line::from(vec![
    Span::styled("◀ prev [p]", dir_style(nav.prev_enabled)),
    Span::styled(format!("   page {} of {}   ", nav.page, nav.total_pages), Style::default().fg(theme.accent)),
    Span::styled("[n] next ▶", dir_style(nav.next_enabled)),
  ]);
  let paragraph = Paragraph::new(line).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Browse => {
      let mut k = vec![("Enter", "Play"), ("j/k", "Navigate"), ("p/n", "Page"), ("g", "Goto")];
      k.push(("u", "Upload"));
      k.push(("b", "Batch"));
      if is_playing {
        let pause_label = if app.player.paused { "Resume" } else { "Pause" };
        k.push(("Space", pause_label));
        k.push(("s", "Stop"));
        k.push(("d", "Delete"));
      }
      k.push(("q", "Quit"));
      k
    }
    AppMode::ConfirmBatch | AppMode::ConfirmDelete => {
      vec![("y", "Confirm"), ("n", "Cancel")]
    }
    _ => vec![("Enter", "Submit"), ("Esc", "Cancel")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
