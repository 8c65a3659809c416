use std::io::IsTerminal;

use clap::{ValueEnum, builder::styling::Ansi256Color};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;
use http::Method;
use strum::EnumIter;

use crate::generator::metrics::GenerationWarning;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// What a piece of terminal output stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Role {
  Timestamp,
  Progress,
  Label,
  Value,
  Tag,
  Path,
  OperationId,
  Excluded,
  Query,
  Mutation,
  Removal,
  Degraded,
  Skipped,
  Failure,
  Success,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
  Color::Rgb { r, g, b }
}

const fn shade(theme: Theme, role: Role) -> Color {
  match (theme, role) {
    (Theme::Dark, Role::Timestamp) => rgb(122, 139, 153),
    (Theme::Dark, Role::Progress) => rgb(190, 214, 236),
    (Theme::Dark, Role::Label) => rgb(95, 165, 230),
    (Theme::Dark, Role::Value) => rgb(235, 238, 242),
    (Theme::Dark, Role::Tag) => rgb(120, 200, 210),
    (Theme::Dark, Role::Path) => rgb(205, 215, 225),
    (Theme::Dark, Role::OperationId) => rgb(180, 160, 230),
    (Theme::Dark, Role::Excluded) => rgb(110, 118, 128),
    (Theme::Dark, Role::Query) => rgb(110, 200, 140),
    (Theme::Dark, Role::Mutation) => rgb(235, 185, 90),
    (Theme::Dark, Role::Removal) => rgb(235, 110, 100),
    (Theme::Dark, Role::Degraded) => rgb(225, 195, 110),
    (Theme::Dark, Role::Skipped) => rgb(240, 150, 80),
    (Theme::Dark, Role::Failure) => rgb(240, 95, 95),
    (Theme::Dark, Role::Success) => rgb(110, 200, 140),
    (Theme::Light, Role::Timestamp) => rgb(96, 108, 120),
    (Theme::Light, Role::Progress) => rgb(30, 60, 95),
    (Theme::Light, Role::Label) => rgb(49, 120, 198),
    (Theme::Light, Role::Value) => rgb(25, 30, 38),
    (Theme::Light, Role::Tag) => rgb(20, 120, 130),
    (Theme::Light, Role::Path) => rgb(45, 55, 70),
    (Theme::Light, Role::OperationId) => rgb(100, 70, 170),
    (Theme::Light, Role::Excluded) => rgb(140, 146, 155),
    (Theme::Light, Role::Query) => rgb(30, 130, 70),
    (Theme::Light, Role::Mutation) => rgb(170, 110, 10),
    (Theme::Light, Role::Removal) => rgb(185, 45, 40),
    (Theme::Light, Role::Degraded) => rgb(150, 115, 20),
    (Theme::Light, Role::Skipped) => rgb(190, 90, 20),
    (Theme::Light, Role::Failure) => rgb(190, 35, 35),
    (Theme::Light, Role::Success) => rgb(30, 130, 70),
  }
}

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

pub trait IntoComfyColor {
  fn into(self) -> ComfyColor;
}

impl IntoComfyColor for Color {
  fn into(self) -> ComfyColor {
    match self {
      Color::Reset => ComfyColor::Reset,
      Color::Black => ComfyColor::Black,
      Color::DarkGrey => ComfyColor::DarkGrey,
      Color::Red => ComfyColor::Red,
      Color::DarkRed => ComfyColor::DarkRed,
      Color::Green => ComfyColor::Green,
      Color::DarkGreen => ComfyColor::DarkGreen,
      Color::Yellow => ComfyColor::Yellow,
      Color::DarkYellow => ComfyColor::DarkYellow,
      Color::Blue => ComfyColor::Blue,
      Color::DarkBlue => ComfyColor::DarkBlue,
      Color::Magenta => ComfyColor::Magenta,
      Color::DarkMagenta => ComfyColor::DarkMagenta,
      Color::Cyan => ComfyColor::Cyan,
      Color::DarkCyan => ComfyColor::DarkCyan,
      Color::White => ComfyColor::White,
      Color::Grey => ComfyColor::Grey,
      Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
      Color::AnsiValue(val) => ComfyColor::AnsiValue(val),
    }
  }
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  pub const fn role(&self, role: Role) -> Color {
    if self.enabled { shade(self.theme, role) } else { Color::Reset }
  }

  /// Reads as the kind of hook the method turns into: GET is a query, DELETE
  /// removes, everything else mutates.
  pub fn method(&self, method: &Method) -> Color {
    self.role(if *method == Method::GET || *method == Method::HEAD {
      Role::Query
    } else if *method == Method::DELETE {
      Role::Removal
    } else {
      Role::Mutation
    })
  }

  pub fn warning(&self, warning: &GenerationWarning) -> Color {
    self.role(match warning {
      GenerationWarning::StepFailed { .. } => Role::Failure,
      GenerationWarning::MissingCollaboratorOutput { .. } => Role::Skipped,
      _ => Role::Degraded,
    })
  }

  pub fn comfy(&self, role: Role) -> ComfyColor {
    IntoComfyColor::into(self.role(role))
  }

  const fn to_clap(color: Color) -> Option<clap::builder::styling::Color> {
    use clap::builder::styling::{AnsiColor, Color as ClapColor, RgbColor};

    match color {
      Color::Black => Some(ClapColor::Ansi(AnsiColor::Black)),
      Color::Blue | Color::DarkBlue => Some(ClapColor::Ansi(AnsiColor::Blue)),
      Color::Cyan | Color::DarkCyan => Some(ClapColor::Ansi(AnsiColor::Cyan)),
      Color::DarkGreen | Color::Green => Some(ClapColor::Ansi(AnsiColor::Green)),
      Color::DarkGrey | Color::Grey => Some(ClapColor::Ansi(AnsiColor::BrightBlack)),
      Color::DarkMagenta | Color::Magenta => Some(ClapColor::Ansi(AnsiColor::Magenta)),
      Color::DarkRed | Color::Red => Some(ClapColor::Ansi(AnsiColor::Red)),
      Color::DarkYellow | Color::Yellow => Some(ClapColor::Ansi(AnsiColor::Yellow)),
      Color::White => Some(ClapColor::Ansi(AnsiColor::White)),
      Color::AnsiValue(val) => Some(ClapColor::Ansi256(Ansi256Color(val))),
      Color::Rgb { r, g, b } => Some(ClapColor::Rgb(RgbColor(r, g, b))),
      Color::Reset => None,
    }
  }

  pub const fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{Style, Styles};

    let colors = Self::new(true, Theme::Dark);

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(Self::to_clap(colors.role(Role::Label))))
      .usage(Style::new().bold().fg_color(Self::to_clap(colors.role(Role::Label))))
      .literal(Style::new().fg_color(Self::to_clap(colors.role(Role::Tag))))
      .placeholder(Style::new().fg_color(Self::to_clap(colors.role(Role::OperationId))))
      .error(Style::new().bold().fg_color(Self::to_clap(colors.role(Role::Failure))))
      .valid(Style::new().fg_color(Self::to_clap(colors.role(Role::Success))))
      .invalid(Style::new().bold().fg_color(Self::to_clap(colors.role(Role::Failure))))
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()).unwrap_or(Theme::Dark),
  }
}

/// `COLORFGBG` is `fg;bg`; background indexes 8 and up are light.
fn theme_from_colorfgbg(value: Option<&str>) -> Option<Theme> {
  let background = value?.split(';').next_back()?.parse::<u8>().ok()?;
  Some(if background >= 8 { Theme::Light } else { Theme::Dark })
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn test_disabled_colors_reset() {
    let colors = Colors::new(false, Theme::Light);
    assert!(Role::iter().all(|role| colors.role(role) == Color::Reset));
    assert_eq!(colors.method(&Method::DELETE), Color::Reset);
  }

  #[test]
  fn test_methods_follow_hook_kind() {
    let colors = Colors::new(true, Theme::Dark);
    assert_eq!(colors.method(&Method::GET), colors.role(Role::Query));
    assert_eq!(colors.method(&Method::PATCH), colors.role(Role::Mutation));
    assert_eq!(colors.method(&Method::POST), colors.role(Role::Mutation));
    assert_eq!(colors.method(&Method::DELETE), colors.role(Role::Removal));
  }

  #[test]
  fn test_warning_severity() {
    let colors = Colors::new(true, Theme::Light);
    let failed = GenerationWarning::StepFailed {
      step: "domain-api".to_string(),
      error: "boom".to_string(),
    };
    assert_eq!(colors.warning(&failed), rgb(190, 35, 35));
    assert_eq!(
      colors.warning(&GenerationWarning::malformed("paths", "oops")),
      colors.role(Role::Degraded)
    );
  }

  #[test]
  fn test_themes_differ_for_every_role() {
    assert!(Role::iter().all(|role| shade(Theme::Dark, role) != shade(Theme::Light, role)));
  }

  #[test]
  fn test_theme_from_colorfgbg() {
    assert_eq!(theme_from_colorfgbg(Some("0;15")), Some(Theme::Light));
    assert_eq!(theme_from_colorfgbg(Some("15;0")), Some(Theme::Dark));
    assert_eq!(theme_from_colorfgbg(Some("default")), None);
    assert_eq!(theme_from_colorfgbg(None), None);
  }
}
