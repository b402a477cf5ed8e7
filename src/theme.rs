use ratatui::style::Color;

pub const THEME_KEY: &str = "user-theme";
pub const DEFAULT_THEME: &str = "cosmic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub text: Color,
    pub accent: Color,
    pub border: Color,
    pub known_fg: Color,
    pub known_bg: Color,
    pub focus: Color,
    pub muted: Color,
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "cosmic",
        text: Color::White,
        accent: Color::Magenta,
        border: Color::Blue,
        known_fg: Color::Black,
        known_bg: Color::LightMagenta,
        focus: Color::Cyan,
        muted: Color::DarkGray,
    },
    Theme {
        name: "sakura",
        text: Color::White,
        accent: Color::LightRed,
        border: Color::Red,
        known_fg: Color::Black,
        known_bg: Color::LightRed,
        focus: Color::Yellow,
        muted: Color::DarkGray,
    },
    Theme {
        name: "matcha",
        text: Color::White,
        accent: Color::LightGreen,
        border: Color::Green,
        known_fg: Color::Black,
        known_bg: Color::LightGreen,
        focus: Color::Yellow,
        muted: Color::DarkGray,
    },
    Theme {
        name: "paper",
        text: Color::Black,
        accent: Color::Blue,
        border: Color::Gray,
        known_fg: Color::White,
        known_bg: Color::Blue,
        focus: Color::Red,
        muted: Color::Gray,
    },
];

impl Theme {
    /// Unknown names fall back to the default palette.
    pub fn by_name(name: &str) -> &'static Theme {
        THEMES
            .iter()
            .find(|t| t.name == name)
            .unwrap_or(&THEMES[0])
    }

    pub fn next(&self) -> &'static Theme {
        let pos = THEMES.iter().position(|t| t.name == self.name).unwrap_or(0);
        &THEMES[(pos + 1) % THEMES.len()]
    }

    pub fn prev(&self) -> &'static Theme {
        let pos = THEMES.iter().position(|t| t.name == self.name).unwrap_or(0);
        &THEMES[(pos + THEMES.len() - 1) % THEMES.len()]
    }
}
