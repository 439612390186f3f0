use ratatui::style::Color;

/// Palette picked from the dark-mode flag and handed to every render function.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub focus: Color,
    pub highlight_bg: Color,
    pub ok: Color,
    pub error: Color,
    pub warning: Color,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                focus: Color::Yellow,
                highlight_bg: Color::DarkGray,
                ok: Color::Green,
                error: Color::LightRed,
                warning: Color::LightYellow,
            }
        } else {
            Self {
                text: Color::Reset,
                muted: Color::Gray,
                accent: Color::Blue,
                focus: Color::Magenta,
                highlight_bg: Color::Gray,
                ok: Color::Green,
                error: Color::Red,
                warning: Color::Yellow,
            }
        }
    }
}
