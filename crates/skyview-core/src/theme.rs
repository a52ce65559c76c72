//! Light/dark color themes.

use serde::{Deserialize, Serialize};

/// Theme preference stored in the `[ui]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

impl ThemeName {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette::LIGHT,
            Self::Dark => Palette::DARK,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colors applied to each visible element when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub entry_background: &'static str,
    pub button_background: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        background: "#d0e7f9",
        foreground: "black",
        entry_background: "white",
        button_background: "#e6f2ff",
    };

    pub const DARK: Palette = Palette {
        background: "#222222",
        foreground: "white",
        entry_background: "#555555",
        button_background: "#444444",
    };
}
