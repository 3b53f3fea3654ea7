//! Colors for the terminal wizard.

use ratatui::style::Color;

use crate::core::TaskStatus;
use crate::wizard::UploadState;

/// A complete color theme for the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Theme name for display
    pub name: String,
    /// Active step pill, focused borders
    pub primary: Color,
    /// Selected integrations, cursor
    pub accent: Color,
    /// Main text color
    pub text: Color,
    /// Hints and placeholders
    pub text_dim: Color,
    /// Selected item background
    pub selected_bg: Color,
    /// Border color
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    /// Default theme - works well on both light and dark terminals.
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            primary: Color::Rgb(99, 102, 241),    // Indigo
            accent: Color::Rgb(251, 146, 60),     // Orange
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),  // Gray-400
            selected_bg: Color::Rgb(55, 65, 81),  // Gray-700
            border: Color::Rgb(75, 85, 99),       // Gray-600
            success: Color::Rgb(34, 197, 94),     // Green
            warning: Color::Rgb(234, 179, 8),     // Yellow
            error: Color::Rgb(239, 68, 68),       // Red
        }
    }

    /// Plain ANSI colors for terminals without truecolor.
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            primary: Color::Cyan,
            accent: Color::Yellow,
            text: Color::Reset,
            text_dim: Color::DarkGray,
            selected_bg: Color::DarkGray,
            border: Color::Gray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Pick a theme from the terminal's advertised color support.
    pub fn detect() -> Self {
        match std::env::var("COLORTERM") {
            Ok(v) if v == "truecolor" || v == "24bit" => Self::default_theme(),
            _ => Self::basic(),
        }
    }

    /// Heading color for a task board column.
    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::InProgress => self.warning,
            TaskStatus::Pending => self.primary,
            TaskStatus::Completed => self.success,
        }
    }

    /// Color of the upload indicator on a file step.
    pub fn upload_color(&self, state: UploadState) -> Color {
        match state {
            UploadState::Idle => self.text_dim,
            UploadState::Uploading => self.warning,
            UploadState::Success => self.success,
            UploadState::Error => self.error,
        }
    }
}
