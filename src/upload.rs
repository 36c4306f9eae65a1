//! Upload pipeline: single-file uploads with byte progress, and sequential
//! directory batch runs that tolerate per-file failures.

use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::catalog::{CatalogClient, CatalogError};
use crate::constants::constants;

/// Events emitted by upload tasks, drained by `App::check_pending`.
pub enum UploadEvent {
  /// Byte progress for a single-file upload (sent, total).
  Progress(u64, u64),
  /// A batch entry reached its terminal outcome; `completed` counts every
  /// attempted (non-filtered) file so far, successes and failures alike.
  FileDone { completed: u64 },
  /// Single upload finished; the caller clears its inputs and reloads.
  SingleDone,
  /// Single upload failed; inputs are kept for retry.
  SingleFailed(String),
  /// Batch run finished: `completed` files attempted out of `total` selected.
  BatchDone { completed: u64, total: u64 },
}

/// True when the path's extension is one the catalog accepts as video.
pub fn is_video_file(path: &Path) -> bool {
  path.extension().and_then(|e| e.to_str()).is_some_and(|ext| {
    let lower = ext.to_ascii_lowercase();
    constants().video_extensions.iter().any(|v| v == &lower)
  })
}

/// Upload title for a batch entry: the file name with its extension stripped.
pub fn title_from_filename(path: &Path) -> String {
  path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Collect regular files under `dir`, recursively, in a stable order.
/// Unreadable entries are skipped rather than failing the whole selection.
pub fn collect_batch_files(dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(dir)
    .follow_links(false)
    .into_iter()
    .filter_map(|entry| entry.ok())
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| entry.into_path())
    .collect();
  files.sort();
  files
}

/// Run a batch strictly sequentially: filter non-video entries, derive each
/// title from the file name, and keep going past individual failures. File
/// N+1 does not start until file N's outcome is observed.
///
/// Returns `(completed, total)` — `completed` counts attempted files
/// regardless of their outcome, `total` is the original selection size
/// including filtered entries.
pub async fn run_batch<F, Fut>(
  files: Vec<PathBuf>,
  mut upload_one: F,
  mut on_file_done: impl FnMut(u64),
) -> (u64, u64)
where
  F: FnMut(PathBuf, String) -> Fut,
  Fut: Future<Output = Result<(), CatalogError>>,
{
  let total = files.len() as u64;
  let mut completed: u64 = 0;
  for path in files {
    if !is_video_file(&path) {
      debug!(path = %path.display(), "batch: skipping non-video entry");
      continue;
    }
    let title = title_from_filename(&path);
    match upload_one(path.clone(), title).await {
      Ok(()) => info!(path = %path.display(), "batch: uploaded"),
      Err(e) => warn!(err = %e, path = %path.display(), "batch: upload failed, continuing"),
    }
    completed += 1;
    on_file_done(completed);
  }
  (completed, total)
}

pub fn spawn_single_upload(
  client: CatalogClient,
  path: PathBuf,
  title: String,
  tx: mpsc::UnboundedSender<UploadEvent>,
) {
  tokio::spawn(async move {
    info!(path = %path.display(), title = %title, "upload: starting");
    let progress_tx = tx.clone();
    let result = client
      .upload_video(&path, &title, move |sent, total| {
        let _ = progress_tx.send(UploadEvent::Progress(sent, total));
      })
      .await;
    match result {
      Ok(()) => {
        info!(path = %path.display(), "upload: finished");
        let _ = tx.send(UploadEvent::SingleDone);
      }
      Err(e) => {
        warn!(err = %e, path = %path.display(), "upload: failed");
        let _ = tx.send(UploadEvent::SingleFailed(e.to_string()));
      }
    }
  });
}

pub fn spawn_batch_upload(
  client: CatalogClient,
  files: Vec<PathBuf>,
  tx: mpsc::UnboundedSender<UploadEvent>,
) {
  tokio::spawn(async move {
    info!(total = files.len(), "batch: starting run");
    let progress_tx = tx.clone();
    let (completed, total) = run_batch(
      files,
      |path, title| {
        let client = client.clone();
        async move { client.upload_video(&path, &title, |_, _| {}).await }
      },
      |completed| {
        let _ = progress_tx.send(UploadEvent::FileDone { completed });
      },
    )
    .await;
    info!(completed, total, "batch: run finished");
    let _ = tx.send(UploadEvent::BatchDone { completed, total });
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;

  // --- filtering and titles ---

  #[test]
  fn is_video_file_matches_known_extensions() {
    assert!(is_video_file(Path::new("a.mp4")));
    assert!(is_video_file(Path::new("b.MKV")));
    assert!(is_video_file(Path::new("dir/c.webm")));
  }

  #[test]
  fn is_video_file_rejects_other_entries() {
    assert!(!is_video_file(Path::new("notes.txt")));
    assert!(!is_video_file(Path::new("cover.jpg")));
    assert!(!is_video_file(Path::new("noextension")));
  }

  #[test]
  fn title_strips_extension_only() {
    assert_eq!(title_from_filename(Path::new("holiday.clip.mp4")), "holiday.clip");
    assert_eq!(title_from_filename(Path::new("dir/talk.webm")), "talk");
    assert_eq!(title_from_filename(Path::new("noext")), "noext");
  }

  // --- batch runner ---

  fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
  }

  #[tokio::test]
  async fn batch_filters_non_video_without_counting_them() {
    let files = paths(&["a.mp4", "notes.txt", "b.mkv", "cover.jpg", "c.webm"]);
    let mut attempted = Vec::new();
    let (completed, total) = run_batch(
      files,
      |path, _title| {
        attempted.push(path);
        async { Ok(()) }
      },
      |_| {},
    )
    .await;
    assert_eq!(attempted, paths(&["a.mp4", "b.mkv", "c.webm"]));
    assert_eq!(completed, 3);
    assert_eq!(total, 5);
  }

  #[tokio::test]
  async fn batch_continues_past_a_failing_file() {
    let files: Vec<PathBuf> = (1..=5).map(|i| PathBuf::from(format!("clip{i}.mp4"))).collect();
    let mut attempted = Vec::new();
    let (completed, total) = run_batch(
      files,
      |path, _title| {
        attempted.push(path.clone());
        let fail = path == Path::new("clip3.mp4");
        async move {
          if fail { Err(CatalogError::Status(StatusCode::INTERNAL_SERVER_ERROR)) } else { Ok(()) }
        }
      },
      |_| {},
    )
    .await;
    // Files 4 and 5 are still attempted after 3 fails, in order.
    assert_eq!(attempted.len(), 5);
    assert_eq!(attempted[3], Path::new("clip4.mp4"));
    assert_eq!(attempted[4], Path::new("clip5.mp4"));
    // The counter includes the failed file.
    assert_eq!(completed, 5);
    assert_eq!(total, 5);
  }

  #[tokio::test]
  async fn batch_counter_is_monotonic_and_derives_titles() {
    let files = paths(&["first.mp4", "second.take2.mkv"]);
    let mut titles = Vec::new();
    let mut counts = Vec::new();
    run_batch(
      files,
      |_path, title| {
        titles.push(title);
        async { Ok(()) }
      },
      |completed| counts.push(completed),
    )
    .await;
    assert_eq!(titles, vec!["first", "second.take2"]);
    assert_eq!(counts, vec![1, 2]);
  }

  #[tokio::test]
  async fn batch_of_only_filtered_files_attempts_nothing() {
    let files = paths(&["a.txt", "b.png"]);
    let (completed, total) = run_batch(files, |_p, _t| async { Ok(()) }, |_| {}).await;
    assert_eq!(completed, 0);
    assert_eq!(total, 2);
  }

  // --- directory collection ---

  #[test]
  fn collect_batch_files_is_recursive_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("sub");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(dir.path().join("b.mp4"), b"x").unwrap();
    std::fs::write(dir.path().join("a.txt"), b"x").unwrap();
    std::fs::write(nested.join("c.mkv"), b"x").unwrap();

    let files = collect_batch_files(dir.path());
    let names: Vec<String> =
      files.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned()).collect();
    // Non-video files are collected too — they count toward the batch total
    // and are filtered later by the runner.
    assert_eq!(names, vec!["a.txt", "b.mp4", "sub/c.mkv"]);
  }
}
