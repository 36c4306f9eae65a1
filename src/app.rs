use anyhow::Result;
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::catalog::{CatalogClient, CatalogError, VideoPage, VideoSummary, total_pages};
use crate::config::Config;
use crate::constants::constants;
use crate::player::{NowPlaying, Player};
use crate::theme::THEMES;
use crate::upload::{self, UploadEvent};

// --- Modes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Browse,
  /// Entering a page number to jump to.
  GotoPage,
  /// Entering the path of a single file to upload.
  UploadPath,
  /// Entering the title for a single upload.
  UploadTitle,
  /// Entering a directory to batch-upload from.
  BatchPath,
  /// Confirming a collected batch before it starts.
  ConfirmBatch,
  /// Confirming deletion of the currently playing video.
  ConfirmDelete,
}

// --- Messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
  Info,
  Success,
  Error,
}

/// A transient user notification; auto-dismissed after `message_secs`.
pub struct Message {
  pub text: String,
  pub kind: MessageKind,
  pub(crate) shown_at: Instant,
}

// --- Upload state ---

pub enum UploadState {
  Idle,
  /// One file in flight; `percent` is rounded for display.
  Single { percent: u16 },
  /// A sequential batch run; `completed`/`total` is the visible counter.
  Batch { completed: u64, total: u64 },
}

impl UploadState {
  pub fn is_idle(&self) -> bool {
    matches!(self, UploadState::Idle)
  }
}

// --- View model ---

/// Navigation affordances derived from pagination state. Pure projection —
/// recomputed after every mutation, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
  pub page: u64,
  pub total_pages: u64,
  pub prev_enabled: bool,
  pub next_enabled: bool,
}

// --- Async task plumbing ---

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) page_rx: Option<oneshot::Receiver<Result<VideoPage, CatalogError>>>,
  pub(crate) delete_rx: Option<oneshot::Receiver<Result<(), CatalogError>>>,
  pub(crate) upload_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
}

// --- App ---

pub struct App {
  pub mode: AppMode,
  pub theme_index: usize,
  pub catalog: CatalogClient,

  // Pagination state
  pub page: u64,
  pub page_size: u64,
  pub total_pages: u64,
  pub videos: Vec<VideoSummary>,
  /// False until the first fetch resolves, so "loading" and "no videos"
  /// render differently.
  pub loaded_once: bool,
  pub list_state: ListState,
  pub(crate) pending_page: Option<u64>,

  // Upload state
  pub upload: UploadState,
  /// Persistent form fields. Cleared on upload success, kept on failure
  /// so the user can retry.
  pub upload_path: String,
  pub upload_title: String,
  pub(crate) pending_batch: Option<Vec<PathBuf>>,

  pub player: Player,
  pub message: Option<Message>,
  pub status_message: Option<String>,
  pub should_quit: bool,

  // Shared prompt input buffer
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,

  pub(crate) tasks: AsyncTasks,
}

impl App {
  pub fn new(base_url: &str, page_size: u64, config: &Config) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    Self {
      mode: AppMode::Browse,
      theme_index,
      catalog: CatalogClient::new(base_url),
      page: 1,
      page_size: page_size.max(1),
      total_pages: 1,
      videos: Vec::new(),
      loaded_once: false,
      list_state: ListState::default(),
      pending_page: None,
      upload: UploadState::Idle,
      upload_path: String::new(),
      upload_title: String::new(),
      pending_batch: None,
      player: Player::new(),
      message: None,
      status_message: None,
      should_quit: false,
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      tasks: AsyncTasks::default(),
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    // Only the theme is a runtime preference; URL and page size stay
    // wherever the user put them (flag or hand-edited file).
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  // --- Message Reporter ---

  pub fn report(&mut self, kind: MessageKind, text: String) {
    self.message = Some(Message { text, kind, shown_at: Instant::now() });
  }

  pub fn report_error(&mut self, text: String) {
    self.report(MessageKind::Error, text);
  }

  /// Auto-dismiss the current message once it has been visible long enough.
  pub fn expire_message(&mut self) {
    if let Some(ref msg) = self.message
      && msg.shown_at.elapsed() >= Duration::from_secs(constants().message_secs)
    {
      self.message = None;
    }
  }

  // --- Pagination Controller ---

  pub fn nav_state(&self) -> NavState {
    NavState {
      page: self.page,
      total_pages: self.total_pages,
      prev_enabled: self.page > 1,
      next_enabled: self.page < self.total_pages,
    }
  }

  /// Start an async fetch of `target`. State is committed only when the
  /// result arrives; until then the previous page stays rendered.
  pub fn trigger_load_page(&mut self, target: u64) {
    let client = self.catalog.clone();
    let page_size = self.page_size;
    self.status_message = Some(format!("Loading page {}…", target));
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.fetch_page(target, page_size).await);
    });
    self.tasks.page_rx = Some(rx);
    self.pending_page = Some(target);
  }

  /// Validate user-typed page input. Anything non-numeric or outside
  /// `[1, total_pages]` is rejected without a network call.
  pub fn goto_page(&mut self, raw: &str) {
    match raw.trim().parse::<u64>() {
      Ok(n) if (1..=self.total_pages).contains(&n) => self.trigger_load_page(n),
      _ => self.report_error(format!("Enter a page number between 1 and {}", self.total_pages)),
    }
  }

  /// Relative navigation. Out-of-range targets are a boundary no-op, not
  /// an error.
  pub fn change_page(&mut self, delta: i64) {
    let next = self.page as i64 + delta;
    if next < 1 || next > self.total_pages as i64 {
      return;
    }
    self.trigger_load_page(next as u64);
  }

  /// Commit a successfully fetched page: list replaced wholesale, totals
  /// recomputed, selection clamped.
  fn commit_page(&mut self, target: u64, result: VideoPage) {
    let new_total_pages = total_pages(result.total, self.page_size);
    // The catalog may have shrunk between choosing the target and the
    // response arriving. A stale target past the new last page comes back
    // as an empty list for a non-empty catalog; refetch the last real
    // page instead of rendering that.
    if result.videos.is_empty() && result.total > 0 && target > new_total_pages {
      info!(target, total_pages = new_total_pages, "stale page target, refetching last page");
      self.trigger_load_page(new_total_pages);
      return;
    }
    self.total_pages = new_total_pages;
    self.page = target.clamp(1, self.total_pages);
    self.videos = result.videos;
    self.loaded_once = true;
    if self.videos.is_empty() {
      self.list_state.select(None);
    } else {
      let selected = self.list_state.selected().unwrap_or(0).min(self.videos.len() - 1);
      self.list_state.select(Some(selected));
    }
    info!(page = self.page, total_pages = self.total_pages, count = self.videos.len(), "page loaded");
  }

  // --- Upload Pipeline ---

  /// Validate the form fields and start a single upload. Missing file or
  /// title is an immediate local error; no network call is issued.
  pub fn trigger_upload(&mut self) {
    if !self.upload.is_idle() {
      self.report_error("An upload is already running.".to_string());
      return;
    }
    let path_raw = self.upload_path.trim().to_string();
    let title = self.upload_title.trim().to_string();
    if path_raw.is_empty() || title.is_empty() {
      self.report_error("Select a video file and enter a title.".to_string());
      return;
    }
    let path = PathBuf::from(&path_raw);
    if !path.is_file() {
      self.report_error(format!("No such file: {}", path.display()));
      return;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    upload::spawn_single_upload(self.catalog.clone(), path, title, tx);
    self.tasks.upload_rx = Some(rx);
    self.upload = UploadState::Single { percent: 0 };
  }

  /// Collect the batch selection and ask for confirmation before starting.
  pub fn request_batch(&mut self, dir_raw: &str) {
    if !self.upload.is_idle() {
      self.report_error("An upload is already running.".to_string());
      return;
    }
    let dir = PathBuf::from(dir_raw.trim());
    if !dir.is_dir() {
      self.report_error(format!("No such directory: {}", dir.display()));
      return;
    }
    let files = upload::collect_batch_files(&dir);
    if files.is_empty() {
      self.report_error(format!("No files found under {}", dir.display()));
      return;
    }
    self.pending_batch = Some(files);
    self.mode = AppMode::ConfirmBatch;
  }

  pub fn confirm_batch(&mut self) {
    let Some(files) = self.pending_batch.take() else { return };
    let total = files.len() as u64;
    let (tx, rx) = mpsc::unbounded_channel();
    upload::spawn_batch_upload(self.catalog.clone(), files, tx);
    self.tasks.upload_rx = Some(rx);
    self.upload = UploadState::Batch { completed: 0, total };
  }

  /// Declining the confirmation is a no-op: nothing was started.
  pub fn decline_batch(&mut self) {
    self.pending_batch = None;
  }

  /// Apply one upload event. Returns true on a terminal event, after which
  /// the channel can be dropped.
  fn on_upload_event(&mut self, event: UploadEvent) -> bool {
    match event {
      UploadEvent::Progress(sent, total) => {
        if let UploadState::Single { ref mut percent, .. } = self.upload
          && total > 0
        {
          *percent = ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u16;
        }
        false
      }
      UploadEvent::FileDone { completed } => {
        if let UploadState::Batch { completed: ref mut c, .. } = self.upload {
          *c = completed;
        }
        false
      }
      UploadEvent::SingleDone => {
        self.upload = UploadState::Idle;
        self.upload_path.clear();
        self.upload_title.clear();
        self.report(MessageKind::Success, "Video uploaded.".to_string());
        self.trigger_load_page(self.page);
        true
      }
      UploadEvent::SingleFailed(msg) => {
        // Form fields are kept so the user can retry.
        self.upload = UploadState::Idle;
        self.report_error(format!("Upload failed: {msg}"));
        true
      }
      UploadEvent::BatchDone { completed, total } => {
        self.upload = UploadState::Idle;
        self.report(MessageKind::Success, format!("Batch finished: uploaded {completed} of {total} files."));
        self.trigger_load_page(self.page);
        true
      }
    }
  }

  // --- Playback Session ---

  pub async fn play_selected(&mut self) {
    let Some(selected) = self.list_state.selected() else { return };
    let Some(video) = self.videos.get(selected) else { return };
    let session =
      NowPlaying { video_id: video.id.clone(), title: video.title.clone(), filename: video.filename.clone() };
    let url = self.catalog.media_url(&video.filename);
    if let Err(e) = self.player.play(&url, session).await {
      self.report_error(format!("Playback error: {e}"));
      let _ = self.player.close().await;
    }
  }

  pub async fn close_player(&mut self) {
    if let Err(e) = self.player.close().await {
      self.report_error(format!("Failed to stop playback: {e}"));
    }
  }

  // --- Deletion Workflow ---

  /// Confirmed delete: capture the target id, force the media handle to be
  /// released, drop to Idle, and only then issue the DELETE.
  pub async fn confirm_delete(&mut self) {
    let Some(session) = self.player.now_playing.clone() else { return };
    let target_id = session.video_id;
    info!(id = %target_id, "delete: releasing media before server call");
    if let Err(e) = self.player.release().await {
      warn!(err = %e, "delete: media release failed, continuing");
    }
    let client = self.catalog.clone();
    self.status_message = Some("Deleting…".to_string());
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.delete_video(&target_id).await);
    });
    self.tasks.delete_rx = Some(rx);
  }

  // --- Async completion polling ---

  /// Drain every in-flight task channel and commit outcomes. Called once
  /// per event-loop tick; all state mutation happens here, on the one
  /// logical control thread.
  pub async fn check_pending(&mut self) -> Result<()> {
    if let Some(mut rx) = self.tasks.page_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          let target = self.pending_page.take().unwrap_or(self.page);
          match result {
            Ok(page) => self.commit_page(target, page),
            // Prior page/list state stays untouched on failure.
            Err(e) => self.report_error(format!("Failed to load videos: {e}")),
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.page_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.pending_page = None;
          self.report_error("Load task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.delete_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok(()) => {
              self.report(MessageKind::Success, "Video deleted.".to_string());
              // The session was already torn down before the call; make
              // sure nothing got rebound in the meantime, then refresh.
              let _ = self.player.release().await;
              self.trigger_load_page(self.page);
            }
            Err(e) => {
              self.report_error(format!("Failed to delete video: {e}"));
              // Best-effort recovery: re-release whatever is still bound.
              // The session is not restored to Playing.
              let _ = self.player.release().await;
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.delete_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.report_error("Delete task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.upload_rx.take() {
      let mut open = true;
      loop {
        match rx.try_recv() {
          Ok(event) => {
            if self.on_upload_event(event) {
              open = false;
              break;
            }
          }
          Err(mpsc::error::TryRecvError::Empty) => break,
          Err(mpsc::error::TryRecvError::Disconnected) => {
            // Task ended without a terminal event (panicked).
            if !self.upload.is_idle() {
              self.upload = UploadState::Idle;
              self.report_error("Upload task failed.".to_string());
            }
            open = false;
            break;
          }
        }
      }
      if open {
        self.tasks.upload_rx = Some(rx);
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_app() -> App {
    App::new("http://127.0.0.1:1", 8, &Config::default())
  }

  fn page(videos: Vec<VideoSummary>, total: u64) -> VideoPage {
    VideoPage { videos, total }
  }

  fn summary(id: &str) -> VideoSummary {
    VideoSummary { id: id.to_string(), title: format!("video {id}"), filename: format!("{id}.mp4"), duration: None }
  }

  // --- goto_page / change_page guards ---

  #[test]
  fn goto_page_rejects_non_numeric_without_fetching() {
    let mut app = test_app();
    app.total_pages = 5;
    app.page = 2;
    app.goto_page("abc");
    assert!(app.tasks.page_rx.is_none());
    assert_eq!(app.page, 2);
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Error));
  }

  #[test]
  fn goto_page_rejects_out_of_range_without_fetching() {
    let mut app = test_app();
    app.total_pages = 5;
    app.page = 2;
    for raw in ["0", "6", "-1", ""] {
      app.goto_page(raw);
      assert!(app.tasks.page_rx.is_none(), "input {raw:?} must not fetch");
      assert_eq!(app.page, 2);
    }
  }

  #[tokio::test]
  async fn goto_page_accepts_in_range_input() {
    let mut app = test_app();
    app.total_pages = 5;
    app.goto_page(" 3 ");
    assert!(app.tasks.page_rx.is_some());
    assert_eq!(app.pending_page, Some(3));
  }

  #[test]
  fn change_page_is_noop_at_boundaries() {
    let mut app = test_app();
    app.page = 1;
    app.total_pages = 3;
    app.change_page(-1);
    assert!(app.tasks.page_rx.is_none());
    assert!(app.message.is_none(), "boundary no-op must not report an error");

    app.page = 3;
    app.change_page(1);
    assert!(app.tasks.page_rx.is_none());
  }

  #[tokio::test]
  async fn change_page_moves_within_range() {
    let mut app = test_app();
    app.page = 2;
    app.total_pages = 3;
    app.change_page(1);
    assert_eq!(app.pending_page, Some(3));
  }

  // --- page commits ---

  #[test]
  fn commit_empty_catalog_settles_on_page_one() {
    let mut app = test_app();
    app.commit_page(1, page(vec![], 0));
    assert!(app.videos.is_empty());
    assert!(app.loaded_once);
    assert_eq!(app.total_pages, 1);
    assert_eq!(app.page, 1);
    let nav = app.nav_state();
    assert!(!nav.prev_enabled);
    assert!(!nav.next_enabled);
    assert_eq!(app.list_state.selected(), None);
  }

  #[test]
  fn commit_bare_array_page_infers_totals() {
    let mut app = test_app();
    // A bare-array response normalizes to total == videos.len().
    app.commit_page(1, page(vec![summary("a"), summary("b"), summary("c")], 3));
    assert_eq!(app.total_pages, 1);
    assert_eq!(app.page, 1);
    assert_eq!(app.videos.len(), 3);
  }

  #[test]
  fn commit_clamps_target_when_catalog_shrank() {
    let mut app = test_app();
    app.page = 4;
    app.total_pages = 4;
    // Target page 4 no longer exists: 9 items over page size 8 is 2 pages.
    app.commit_page(4, page(vec![summary("a")], 9));
    assert_eq!(app.total_pages, 2);
    assert_eq!(app.page, 2);
  }

  #[tokio::test]
  async fn stale_empty_page_refetches_the_last_page() {
    let mut app = test_app();
    app.page = 2;
    app.total_pages = 2;
    app.videos = vec![summary("a")];
    // Page 2 vanished under us: the remaining 8 items fit on one page, so
    // the stale fetch came back empty even though the catalog is not.
    app.commit_page(2, page(vec![], 8));
    assert_eq!(app.pending_page, Some(1), "must refetch the last real page");
    assert!(app.tasks.page_rx.is_some());
    // The previous list stays rendered until the refetch commits.
    assert_eq!(app.videos.len(), 1);
    assert_eq!(app.page, 2);
  }

  #[test]
  fn nav_state_reflects_middle_page() {
    let mut app = test_app();
    app.page = 2;
    app.total_pages = 5;
    let nav = app.nav_state();
    assert!(nav.prev_enabled);
    assert!(nav.next_enabled);
  }

  // --- upload validation and events ---

  #[test]
  fn upload_requires_path_and_title() {
    let mut app = test_app();
    app.upload_path = "  ".to_string();
    app.upload_title = "My clip".to_string();
    app.trigger_upload();
    assert!(app.upload.is_idle());
    assert!(app.tasks.upload_rx.is_none());

    app.upload_path = "/tmp/definitely-missing.mp4".to_string();
    app.upload_title = String::new();
    app.trigger_upload();
    assert!(app.upload.is_idle());
    assert!(app.tasks.upload_rx.is_none());
  }

  #[test]
  fn upload_rejects_missing_file_locally() {
    let mut app = test_app();
    app.upload_path = "/definitely/not/a/real/file.mp4".to_string();
    app.upload_title = "clip".to_string();
    app.trigger_upload();
    assert!(app.upload.is_idle());
    assert!(app.tasks.upload_rx.is_none());
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Error));
  }

  #[tokio::test]
  async fn single_failure_keeps_inputs_for_retry() {
    let mut app = test_app();
    app.upload_path = "/tmp/clip.mp4".to_string();
    app.upload_title = "clip".to_string();
    app.upload = UploadState::Single { percent: 40 };

    let done = app.on_upload_event(UploadEvent::SingleFailed("server returned 500".to_string()));
    assert!(done);
    assert!(app.upload.is_idle());
    assert_eq!(app.upload_path, "/tmp/clip.mp4");
    assert_eq!(app.upload_title, "clip");
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Error));
  }

  #[tokio::test]
  async fn single_success_clears_inputs_and_reloads() {
    let mut app = test_app();
    app.upload_path = "/tmp/clip.mp4".to_string();
    app.upload_title = "clip".to_string();
    app.upload = UploadState::Single { percent: 100 };

    let done = app.on_upload_event(UploadEvent::SingleDone);
    assert!(done);
    assert!(app.upload_path.is_empty());
    assert!(app.upload_title.is_empty());
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Success));
    assert!(app.tasks.page_rx.is_some(), "success must trigger a reload");
  }

  #[tokio::test]
  async fn batch_counter_updates_are_applied() {
    let mut app = test_app();
    app.upload = UploadState::Batch { completed: 0, total: 5 };

    assert!(!app.on_upload_event(UploadEvent::FileDone { completed: 2 }));
    match app.upload {
      UploadState::Batch { completed, total, .. } => {
        assert_eq!(completed, 2);
        assert_eq!(total, 5);
      }
      _ => panic!("expected batch state"),
    }

    assert!(app.on_upload_event(UploadEvent::BatchDone { completed: 4, total: 5 }));
    assert!(app.upload.is_idle());
    assert!(app.tasks.page_rx.is_some(), "batch completion must trigger one reload");
  }

  #[tokio::test]
  async fn progress_percent_is_rounded_for_display() {
    let mut app = test_app();
    app.upload = UploadState::Single { percent: 0 };
    app.on_upload_event(UploadEvent::Progress(333, 1000));
    match app.upload {
      UploadState::Single { percent, .. } => assert_eq!(percent, 33),
      _ => panic!("expected single state"),
    }
  }

  // --- message reporter ---

  #[test]
  fn messages_expire_after_the_display_window() {
    let mut app = test_app();
    app.report(MessageKind::Info, "hello".to_string());
    app.expire_message();
    assert!(app.message.is_some(), "fresh message must survive");

    if let Some(ref mut msg) = app.message {
      msg.shown_at = Instant::now()
        .checked_sub(Duration::from_secs(constants().message_secs + 1))
        .expect("monotonic clock far enough from zero");
    }
    app.expire_message();
    assert!(app.message.is_none());
  }

  // --- batch confirmation ---

  #[test]
  fn declining_batch_discards_the_selection() {
    let mut app = test_app();
    app.pending_batch = Some(vec![PathBuf::from("a.mp4")]);
    app.decline_batch();
    assert!(app.pending_batch.is_none());
    assert!(app.upload.is_idle());
    assert!(app.tasks.upload_rx.is_none());
  }

  #[tokio::test]
  async fn confirming_batch_starts_the_run() {
    let mut app = test_app();
    app.pending_batch = Some(vec![PathBuf::from("/nonexistent/a.mp4"), PathBuf::from("/nonexistent/b.txt")]);
    app.confirm_batch();
    match app.upload {
      UploadState::Batch { completed, total, .. } => {
        assert_eq!(completed, 0);
        assert_eq!(total, 2, "total counts filtered entries too");
      }
      _ => panic!("expected batch state"),
    }
    assert!(app.tasks.upload_rx.is_some());
  }

  // --- deletion workflow ---

  fn playing_session() -> NowPlaying {
    NowPlaying { video_id: "v1".to_string(), title: "clip one".to_string(), filename: "v1.mp4".to_string() }
  }

  #[tokio::test]
  async fn delete_failure_ends_idle_with_an_error_message() {
    let mut app = test_app();
    // Simulate a session still bound when the delete result lands; the
    // failure path must release it, never restore it to playing.
    app.player.now_playing = Some(playing_session());
    let (tx, rx) = oneshot::channel();
    app.tasks.delete_rx = Some(rx);
    tx.send(Err(CatalogError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))).expect("receiver alive");

    app.check_pending().await.expect("check_pending");

    assert!(!app.player.is_playing(), "session must not survive a failed delete");
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Error));
    assert!(app.tasks.page_rx.is_none(), "no reload after a failed delete");
  }

  #[tokio::test]
  async fn delete_success_stays_idle_and_reloads() {
    let mut app = test_app();
    app.page = 2;
    let (tx, rx) = oneshot::channel();
    app.tasks.delete_rx = Some(rx);
    tx.send(Ok(())).expect("receiver alive");

    app.check_pending().await.expect("check_pending");

    assert!(!app.player.is_playing());
    assert_eq!(app.message.as_ref().map(|m| m.kind), Some(MessageKind::Success));
    assert_eq!(app.pending_page, Some(2), "current page reloads after delete");
  }
}
