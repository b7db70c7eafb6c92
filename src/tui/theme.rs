// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::{env, error::Error, fmt};

use ratatui::style::{Color, Modifier, Style};

/// Color scheme of the editor. Initialized from `THALIA_THEME` (or the
/// `--theme` flag) and toggleable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn parse(value: &str) -> Result<Self, ThemeError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ThemeError::InvalidMode {
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TuiTheme {
    mode: ThemeMode,
}

impl Default for TuiTheme {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Dark,
        }
    }
}

impl TuiTheme {
    pub(crate) fn with_mode(mode: ThemeMode) -> Self {
        Self { mode }
    }

    pub(crate) fn from_env() -> Result<Self, ThemeError> {
        match env::var("THALIA_THEME") {
            Ok(value) if value.trim().is_empty() => Ok(Self::default()),
            Ok(value) => Ok(Self::with_mode(ThemeMode::parse(&value)?)),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(env::VarError::NotUnicode(_)) => Err(ThemeError::InvalidEnv {
                name: "THALIA_THEME",
                value: "<non-unicode>".to_owned(),
            }),
        }
    }

    pub(crate) fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub(crate) fn toggle(&mut self) {
        self.mode = match self.mode {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        };
    }

    pub(crate) fn base_style(&self) -> Style {
        match self.mode {
            ThemeMode::Dark => Style::default().fg(Color::Gray).bg(Color::Reset),
            ThemeMode::Light => Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    pub(crate) fn panel_border_style(&self) -> Style {
        match self.mode {
            ThemeMode::Dark => self.base_style().fg(Color::DarkGray),
            ThemeMode::Light => self.base_style().fg(Color::Gray),
        }
    }

    pub(crate) fn dialogue_node_style(&self, selected: bool) -> Style {
        let base = match self.mode {
            ThemeMode::Dark => self.base_style().fg(Color::White),
            ThemeMode::Light => self.base_style().fg(Color::Black),
        };
        if selected {
            base.fg(Color::LightGreen).add_modifier(Modifier::BOLD)
        } else {
            base
        }
    }

    pub(crate) fn choice_node_style(&self, selected: bool) -> Style {
        let base = match self.mode {
            ThemeMode::Dark => self.base_style().fg(Color::LightBlue),
            ThemeMode::Light => self.base_style().fg(Color::Blue),
        };
        if selected {
            base.fg(Color::LightGreen).add_modifier(Modifier::BOLD)
        } else {
            base
        }
    }

    pub(crate) fn edge_style(&self) -> Style {
        self.base_style().fg(match self.mode {
            ThemeMode::Dark => Color::DarkGray,
            ThemeMode::Light => Color::Gray,
        })
    }

    pub(crate) fn port_style(&self) -> Style {
        self.base_style().fg(Color::Cyan)
    }

    pub(crate) fn tab_style(&self, active: bool) -> Style {
        if active {
            self.base_style()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            self.base_style().fg(match self.mode {
                ThemeMode::Dark => Color::DarkGray,
                ThemeMode::Light => Color::Gray,
            })
        }
    }

    pub(crate) fn menu_style(&self) -> Style {
        match self.mode {
            ThemeMode::Dark => Style::default().fg(Color::White).bg(Color::Black),
            ThemeMode::Light => Style::default().fg(Color::Black).bg(Color::Gray),
        }
    }

    pub(crate) fn menu_selected_style(&self) -> Style {
        self.menu_style().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn field_label_style(&self) -> Style {
        self.base_style().fg(Color::Cyan)
    }

    pub(crate) fn field_active_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::REVERSED)
    }

    pub(crate) fn toast_style(&self) -> Style {
        self.base_style().fg(Color::Yellow)
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(Color::Red)
    }

    pub(crate) fn footer_key_style(&self) -> Style {
        self.base_style().fg(Color::Cyan)
    }

    pub(crate) fn footer_label_style(&self) -> Style {
        self.base_style().fg(match self.mode {
            ThemeMode::Dark => Color::Gray,
            ThemeMode::Light => Color::DarkGray,
        })
    }
}

#[derive(Debug, Clone)]
pub enum ThemeError {
    InvalidMode { value: String },
    InvalidEnv { name: &'static str, value: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMode { value } => {
                write!(f, "invalid theme '{value}' (expected 'dark' or 'light')")
            }
            Self::InvalidEnv { name, value } => write!(f, "invalid env {name}={value}"),
        }
    }
}

impl Error for ThemeError {}

#[cfg(test)]
mod tests {
    use super::{ThemeMode, TuiTheme};

    #[test]
    fn theme_mode_parses_case_insensitively() {
        assert_eq!(ThemeMode::parse("dark").unwrap(), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse(" Light ").unwrap(), ThemeMode::Light);
        assert!(ThemeMode::parse("solarized").is_err());
    }

    #[test]
    fn toggling_flips_between_modes() {
        let mut theme = TuiTheme::with_mode(ThemeMode::Dark);
        theme.toggle();
        assert_eq!(theme.mode(), ThemeMode::Light);
        theme.toggle();
        assert_eq!(theme.mode(), ThemeMode::Dark);
    }
}
