use ratatui::style::Color;

/// A complete UI palette. Every renderable surface takes its colors from
/// here so themes can be cycled at runtime.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub success: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: &[Theme] = &[
  Theme {
    name: "dusk",
    bg: Color::Rgb(24, 24, 32),
    fg: Color::Rgb(220, 218, 230),
    accent: Color::Rgb(137, 180, 250),
    muted: Color::Rgb(120, 120, 140),
    border: Color::Rgb(70, 70, 90),
    status: Color::Rgb(166, 218, 149),
    error: Color::Rgb(237, 135, 150),
    success: Color::Rgb(166, 218, 149),
    highlight_fg: Color::Rgb(24, 24, 32),
    highlight_bg: Color::Rgb(137, 180, 250),
    stripe_bg: Color::Rgb(30, 30, 40),
    key_fg: Color::Rgb(24, 24, 32),
    key_bg: Color::Rgb(120, 120, 140),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(248, 246, 240),
    fg: Color::Rgb(50, 48, 46),
    accent: Color::Rgb(20, 105, 176),
    muted: Color::Rgb(140, 134, 126),
    border: Color::Rgb(190, 184, 176),
    status: Color::Rgb(64, 130, 60),
    error: Color::Rgb(190, 48, 60),
    success: Color::Rgb(64, 130, 60),
    highlight_fg: Color::Rgb(248, 246, 240),
    highlight_bg: Color::Rgb(20, 105, 176),
    stripe_bg: Color::Rgb(238, 235, 228),
    key_fg: Color::Rgb(248, 246, 240),
    key_bg: Color::Rgb(140, 134, 126),
  },
];
