//! HTTP client for the catalog API: paginated metadata listing, multipart
//! uploads with byte-level progress, deletes, and media-stream URLs.

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::constants::constants;

/// One catalog entry as returned by the server. Superseded wholesale on
/// every page fetch — there are no partial updates.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoSummary {
  pub id: String,
  pub title: String,
  /// Server-side media file name; opaque to the client, used only to build
  /// the streaming URL.
  pub filename: String,
  #[serde(default)]
  pub duration: Option<String>,
}

/// A normalized page of results.
#[derive(Debug, Clone)]
pub struct VideoPage {
  pub videos: Vec<VideoSummary>,
  pub total: u64,
}

/// The server has grown two list-response shapes over time: a paged
/// envelope and a bare array from older deployments. Both are accepted;
/// the bare form infers `total` from the array length. Likely an
/// API-evolution artifact rather than an intentional dual contract.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
  Envelope {
    videos: Vec<VideoSummary>,
    #[serde(default)]
    total: Option<u64>,
  },
  Bare(Vec<VideoSummary>),
}

impl From<ListResponse> for VideoPage {
  fn from(raw: ListResponse) -> Self {
    match raw {
      ListResponse::Envelope { videos, total } => {
        let total = total.unwrap_or(videos.len() as u64);
        VideoPage { videos, total }
      }
      ListResponse::Bare(videos) => {
        let total = videos.len() as u64;
        VideoPage { videos, total }
      }
    }
  }
}

/// Total page count for a catalog of `total` items, floored to 1 so an
/// empty catalog still has a valid page to sit on.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
  total.div_ceil(page_size).max(1)
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  /// Connection-level failure: DNS, refused, timeout.
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),
  /// The server answered with a non-success status.
  #[error("server returned {0}")]
  Status(StatusCode),
  /// The body was not a recognizable list shape.
  #[error("malformed response: {0}")]
  Parse(#[source] reqwest::Error),
  /// A local file could not be read for upload.
  #[error("cannot read {path}: {source}")]
  File {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// MIME type sent for an upload, guessed from the extension. The server
/// rejects anything that is not `video/*`.
fn video_mime(path: &Path) -> &'static str {
  match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
    Some("mkv") => "video/x-matroska",
    Some("mov") => "video/quicktime",
    Some("avi") => "video/x-msvideo",
    Some("webm") => "video/webm",
    Some("wmv") => "video/x-ms-wmv",
    Some("flv") => "video/x-flv",
    Some("ts") => "video/mp2t",
    Some("mpg") | Some("mpeg") => "video/mpeg",
    Some("3gp") => "video/3gpp",
    _ => "video/mp4",
  }
}

#[derive(Clone)]
pub struct CatalogClient {
  http: Client,
  base_url: String,
}

impl CatalogClient {
  pub fn new(base_url: &str) -> Self {
    Self { http: Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
  }

  /// URL the player streams from. The server serves transcoded media under
  /// the same `/videos/` prefix as the metadata routes, keyed by filename.
  pub fn media_url(&self, filename: &str) -> String {
    format!("{}/videos/{}", self.base_url, filename)
  }

  pub async fn fetch_page(&self, page: u64, page_size: u64) -> Result<VideoPage, CatalogError> {
    debug!(page, page_size, "catalog: fetching page");
    let resp = self
      .http
      .get(format!("{}/videos", self.base_url))
      .query(&[("page", page), ("pageSize", page_size)])
      .header(reqwest::header::ACCEPT, "application/json")
      .send()
      .await
      .map_err(CatalogError::Transport)?;
    if !resp.status().is_success() {
      return Err(CatalogError::Status(resp.status()));
    }
    let raw: ListResponse = resp.json().await.map_err(CatalogError::Parse)?;
    Ok(raw.into())
  }

  pub async fn delete_video(&self, id: &str) -> Result<(), CatalogError> {
    info!(id, "catalog: deleting video");
    let resp = self
      .http
      .delete(format!("{}/videos/{}", self.base_url, id))
      .send()
      .await
      .map_err(CatalogError::Transport)?;
    if !resp.status().is_success() {
      return Err(CatalogError::Status(resp.status()));
    }
    Ok(())
  }

  /// Multipart upload (`file`, `title`) with byte-level progress.
  ///
  /// The file streams through a `ReaderStream` whose chunks bump a byte
  /// counter; `on_progress(sent, total)` fires as the transfer proceeds,
  /// throttled so fast links don't flood the channel behind it. When the
  /// total is unknown (zero-length metadata), progress is skipped entirely.
  pub async fn upload_video(
    &self,
    path: &Path,
    title: &str,
    mut on_progress: impl FnMut(u64, u64) + Send + 'static,
  ) -> Result<(), CatalogError> {
    let file = tokio::fs::File::open(path)
      .await
      .map_err(|e| CatalogError::File { path: path.to_path_buf(), source: e })?;
    let total = file
      .metadata()
      .await
      .map_err(|e| CatalogError::File { path: path.to_path_buf(), source: e })?
      .len();

    let throttle = Duration::from_millis(constants().progress_interval_ms);
    let mut sent: u64 = 0;
    let mut last_report: Option<Instant> = None;
    let counted = ReaderStream::new(file).inspect(move |chunk| {
      if let Ok(chunk) = chunk {
        sent += chunk.len() as u64;
        if total == 0 {
          return;
        }
        if last_report.is_none_or(|t| t.elapsed() >= throttle) || sent >= total {
          on_progress(sent, total);
          last_report = Some(Instant::now());
        }
      }
    });

    let file_name =
      path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "upload.mp4".to_string());
    let part = reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(counted), total)
      .file_name(file_name)
      .mime_str(video_mime(path))
      .map_err(CatalogError::Transport)?;
    let form = reqwest::multipart::Form::new().text("title", title.to_string()).part("file", part);

    info!(path = %path.display(), title, bytes = total, "catalog: uploading");
    let resp = self
      .http
      .post(format!("{}/upload", self.base_url))
      .multipart(form)
      .send()
      .await
      .map_err(CatalogError::Transport)?;
    if !resp.status().is_success() {
      return Err(CatalogError::Status(resp.status()));
    }
    Ok(())
  }
}
