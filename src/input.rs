use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Outcome of a key press inside a text prompt.
enum PromptOutcome {
  Submitted,
  Cancelled,
  Editing,
}

/// Shared line-editing for every prompt mode: insert, delete, and cursor
/// movement on the app's input buffer.
fn edit_prompt(app: &mut App, key: event::KeyEvent) -> PromptOutcome {
  match key.code {
    KeyCode::Enter => return PromptOutcome::Submitted,
    KeyCode::Esc => return PromptOutcome::Cancelled,
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    _ => {}
  }
  PromptOutcome::Editing
}

fn open_prompt(app: &mut App, mode: AppMode, seed: &str) {
  app.mode = mode;
  app.input = seed.to_string();
  app.cursor_position = app.input.chars().count();
  app.input_scroll = 0;
}

fn close_prompt(app: &mut App) {
  app.mode = AppMode::Browse;
  app.input.clear();
  app.cursor_position = 0;
  app.input_scroll = 0;
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key).await,
    AppMode::GotoPage | AppMode::UploadPath | AppMode::UploadTitle | AppMode::BatchPath => {
      handle_prompt_key(app, key);
    }
    AppMode::ConfirmBatch => handle_confirm_batch_key(app, key),
    AppMode::ConfirmDelete => handle_confirm_delete_key(app, key).await,
  }
  Ok(())
}

async fn handle_browse_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('q') => {
      app.should_quit = true;
    }
    KeyCode::Enter => {
      app.play_selected().await;
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.videos.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.videos.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Right | KeyCode::Char('n') => {
      app.change_page(1);
    }
    KeyCode::Left | KeyCode::Char('p') => {
      app.change_page(-1);
    }
    KeyCode::Char('r') => {
      app.trigger_load_page(app.page);
    }
    KeyCode::Char('g') => {
      open_prompt(app, AppMode::GotoPage, "");
    }
    KeyCode::Char('u') => {
      let seed = app.upload_path.clone();
      open_prompt(app, AppMode::UploadPath, &seed);
    }
    KeyCode::Char('b') => {
      open_prompt(app, AppMode::BatchPath, "");
    }
    KeyCode::Char('d') => {
      if app.player.is_playing() {
        app.mode = AppMode::ConfirmDelete;
      }
    }
    KeyCode::Char(' ') => {
      if app.player.is_playing()
        && let Err(e) = app.player.toggle_pause().await
      {
        app.report_error(format!("Pause error: {e}"));
      }
    }
    KeyCode::Char('s') | KeyCode::Esc => {
      if app.player.is_playing() {
        app.close_player().await;
      } else if key.code == KeyCode::Esc {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

fn handle_prompt_key(app: &mut App, key: event::KeyEvent) {
  match edit_prompt(app, key) {
    PromptOutcome::Editing => {}
    PromptOutcome::Cancelled => close_prompt(app),
    PromptOutcome::Submitted => {
      let text = app.input.clone();
      match app.mode {
        AppMode::GotoPage => {
          close_prompt(app);
          app.goto_page(&text);
        }
        AppMode::UploadPath => {
          app.upload_path = text;
          let seed = app.upload_title.clone();
          open_prompt(app, AppMode::UploadTitle, &seed);
        }
        AppMode::UploadTitle => {
          app.upload_title = text;
          close_prompt(app);
          app.trigger_upload();
        }
        AppMode::BatchPath => {
          close_prompt(app);
          // May switch into ConfirmBatch when the directory has files.
          app.request_batch(&text);
        }
        _ => close_prompt(app),
      }
    }
  }
}

fn handle_confirm_batch_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
      app.mode = AppMode::Browse;
      app.confirm_batch();
    }
    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
      app.mode = AppMode::Browse;
      app.decline_batch();
    }
    _ => {}
  }
}

async fn handle_confirm_delete_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('y') | KeyCode::Char('Y') => {
      app.mode = AppMode::Browse;
      app.confirm_delete().await;
    }
    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
      // Declining is a no-op: playback continues untouched.
      app.mode = AppMode::Browse;
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn char_to_byte_index_handles_multibyte() {
    let s = "a中b";
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 4);
    assert_eq!(char_to_byte_index(s, 3), 5);
    assert_eq!(char_to_byte_index(s, 99), 5);
  }
}
