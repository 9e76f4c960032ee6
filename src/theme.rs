//! Color theme for the status table.
//!
//! Supports light and dark themes with automatic terminal detection.

use crossterm::style::Color;

use crate::state::TargetStatus;

/// Colors applied by the renderer.
///
/// Use [`Theme::auto_detect()`] for automatic selection based on the
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for the spinner, phase word, and rank marks.
    pub highlight: Color,
    /// Color for relays that answered.
    pub up: Color,
    /// Color for retries, timeouts, and the slow marker.
    pub warning: Color,
    /// Color for definitive failures.
    pub critical: Color,
    /// Color for placeholders and zero counts.
    pub muted: Color,
}

impl Theme {
    /// Dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            up: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            muted: Color::DarkGrey,
        }
    }

    /// Light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            up: Color::DarkGreen,
            warning: Color::DarkYellow,
            critical: Color::Red,
            muted: Color::Grey,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a target status cell.
    pub fn status_color(&self, status: TargetStatus) -> Color {
        match status {
            TargetStatus::Pending => self.muted,
            TargetStatus::Retrying => self.warning,
            TargetStatus::Up => self.up,
            TargetStatus::Timeout => self.warning,
            TargetStatus::Down => self.critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_and_light_use_distinct_accents() {
        assert_ne!(Theme::dark().highlight, Theme::light().highlight);
    }

    #[test]
    fn terminal_statuses_map_to_their_severity() {
        let theme = Theme::dark();
        assert_eq!(theme.status_color(TargetStatus::Up), theme.up);
        assert_eq!(theme.status_color(TargetStatus::Timeout), theme.warning);
        assert_eq!(theme.status_color(TargetStatus::Down), theme.critical);
        assert_eq!(theme.status_color(TargetStatus::Pending), theme.muted);
    }
}
