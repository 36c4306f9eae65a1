use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child as TokioChild, Command};
use tracing::info;

/// The single in-memory record of which video is bound to the player.
#[derive(Debug, Clone)]
pub struct NowPlaying {
  pub video_id: String,
  pub title: String,
  pub filename: String,
}

/// External-player session backed by an mpv subprocess. At most one process
/// is alive at a time; starting a new session always tears the previous one
/// down first, so every transition passes through Idle.
pub struct Player {
  current_process: Option<TokioChild>,
  pub now_playing: Option<NowPlaying>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl Player {
  pub fn new() -> Self {
    Self { current_process: None, now_playing: None, ipc_socket_path: None, paused: false }
  }

  pub fn is_playing(&self) -> bool {
    self.now_playing.is_some()
  }

  pub async fn play(&mut self, media_url: &str, session: NowPlaying) -> Result<()> {
    // Exactly one intermediate Idle transition: the old source is fully
    // released before the new one is bound.
    self.close().await.context("Failed to stop previous playback")?;

    let socket_path = std::env::temp_dir().join(format!("vidhub-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args(["--really-quiet", &format!("--input-ipc-server={}", socket_path_str), media_url]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    info!(id = %session.video_id, url = %media_url, "player: session started");
    self.current_process = Some(child);
    self.now_playing = Some(session);
    self.ipc_socket_path = Some(socket_path_str);
    self.paused = false;
    Ok(())
  }

  async fn send_ipc(&self, cmd: &[u8]) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let mut stream =
      tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.write_all(cmd).await.context("Failed to send command to mpv")?;
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    if self.current_process.is_none() {
      return Ok(());
    }
    self.send_ipc(b"{\"command\":[\"cycle\",\"pause\"]}\n").await?;
    self.paused = !self.paused;
    Ok(())
  }

  /// Pause without toggling. Used as the first teardown step.
  async fn pause(&mut self) -> Result<()> {
    self.send_ipc(b"{\"command\":[\"set_property\",\"pause\",true]}\n").await?;
    self.paused = true;
    Ok(())
  }

  /// Tear the session down, in order: pause playback, clear the bound
  /// source (kill and reap the process), reset the session fields.
  /// Clearing the source before pausing can race on some backends, so
  /// pause comes first; it is best effort since the process may already
  /// have exited on its own.
  pub async fn close(&mut self) -> Result<()> {
    if self.current_process.is_some() {
      let _ = self.pause().await;
    }
    if let Some(mut child) = self.current_process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }
    if self.now_playing.take().is_some() {
      info!("player: session closed");
    }
    self.paused = false;
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
    Ok(())
  }

  /// Strong release ahead of a server-side delete: beyond a plain close,
  /// the child must be reaped so the OS has dropped every handle on the
  /// stream before the backing file is removed. `close` already kills and
  /// waits, so this is the same teardown made idempotent — safe to invoke
  /// again as best-effort recovery when the delete call fails.
  pub async fn release(&mut self) -> Result<()> {
    self.close().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn session() -> NowPlaying {
    NowPlaying { video_id: "v1".to_string(), title: "clip one".to_string(), filename: "v1.mp4".to_string() }
  }

  // `play` always routes through `close` before binding a new source, so
  // this is the Idle transition every session change passes through.
  #[tokio::test]
  async fn close_tears_the_session_down_to_idle() {
    let mut player = Player::new();
    player.now_playing = Some(session());
    player.paused = true;

    player.close().await.expect("close");

    assert!(!player.is_playing());
    assert!(!player.paused);
  }

  #[tokio::test]
  async fn release_is_idempotent_when_already_idle() {
    let mut player = Player::new();
    player.now_playing = Some(session());
    player.release().await.expect("first release");
    // The failed-delete recovery path releases again.
    player.release().await.expect("repeat release");
    assert!(!player.is_playing());
  }
}
