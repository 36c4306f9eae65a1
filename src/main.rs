mod app;
mod catalog;
mod config;
mod constants;
mod input;
mod player;
mod theme;
mod ui;
mod upload;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::info;

use app::App;
use config::Config;
use constants::constants;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Base URL of the catalog API (overrides the config file).
  #[arg(short, long)]
  api_base_url: Option<String>,

  /// Videos per page (overrides the config file).
  #[arg(short, long)]
  page_size: Option<u64>,
}

// --- Logging ---

/// Log to a file: the terminal itself belongs to the TUI.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = directories::ProjectDirs::from("", "", "vidhub")
    .map(|dirs| dirs.data_dir().to_path_buf())
    .unwrap_or_else(std::env::temp_dir);
  std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
  let appender = tracing_appender::rolling::never(&log_dir, "vidhub.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vidhub=info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Ok(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging()?;

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let config = Config::load();
  let base_url =
    args.api_base_url.or_else(|| config.api_base_url.clone()).unwrap_or_else(|| constants().api_base_url.clone());
  let page_size = args.page_size.or(config.page_size).unwrap_or(constants().page_size).max(1);
  info!(base_url = %base_url, page_size, "vidhub starting");

  let mut app = App::new(&base_url, page_size, &config);

  // Initial catalog load.
  app.trigger_load_page(1);

  loop {
    app.check_pending().await?;
    app.expire_message();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.player.close().await?;
  Ok(())
}
