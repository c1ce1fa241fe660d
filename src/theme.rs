use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_FAMILY: &str =
    "Montserrat, system-ui, -apple-system, \"Segoe UI\", Roboto, Arial, sans-serif";

/// Style id assigned to freshly created sessions.
pub const DEFAULT_STYLE_ID: &str = "style-1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub font_family: String,
    pub background: String,
    pub word_colors: Vec<String>,
    pub text_color: String,
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|value| value.to_string()).collect()
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            id: "classic".to_string(),
            name: "Classic".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#FFFFFF".to_string(),
            word_colors: palette(&[
                "#ff8a3a", "#f6ad55", "#2ec4b6", "#2bb68a", "#c56cf0", "#475569", "#fbd38d",
                "#94a3b8",
            ]),
            text_color: "#2C3E50".to_string(),
        }
    }

    pub fn deep_sea() -> Self {
        Self {
            id: "style-1".to_string(),
            name: "Deep Sea".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#0B0C29".to_string(),
            word_colors: palette(&["#3498db", "#f1c40f", "#e74c3c", "#9b59b6", "#ecf0f1"]),
            text_color: "#FFFFFF".to_string(),
        }
    }

    pub fn sunshine() -> Self {
        Self {
            id: "style-2".to_string(),
            name: "Sunshine".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#F1C40F".to_string(),
            word_colors: palette(&["#2c3e50", "#e74c3c", "#2980b9", "#27ae60", "#ffffff"]),
            text_color: "#2C3E50".to_string(),
        }
    }

    pub fn dark_elegance() -> Self {
        Self {
            id: "style-3".to_string(),
            name: "Dark Elegance".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#2C3E50".to_string(),
            word_colors: palette(&["#1abc9c", "#f39c12", "#d35400", "#ecf0f1", "#3498db"]),
            text_color: "#FFFFFF".to_string(),
        }
    }

    pub fn forest() -> Self {
        Self {
            id: "style-4".to_string(),
            name: "Forest".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#006400".to_string(),
            word_colors: palette(&["#f1c40f", "#2ecc71", "#ecf0f1", "#e74c3c", "#1abc9c"]),
            text_color: "#FFFFFF".to_string(),
        }
    }

    pub fn wildflower() -> Self {
        Self {
            id: "style-5".to_string(),
            name: "Wildflower".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#9B59B6".to_string(),
            word_colors: palette(&["#f1c40f", "#2ecc71", "#ecf0f1", "#e74c3c", "#1abc9c"]),
            text_color: "#FFFFFF".to_string(),
        }
    }

    pub fn fire_and_ice() -> Self {
        Self {
            id: "style-6".to_string(),
            name: "Fire and Ice".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#E74C3C".to_string(),
            word_colors: palette(&["#ecf0f1", "#3498db", "#2c3e50", "#f1c40f", "#2980b9"]),
            text_color: "#FFFFFF".to_string(),
        }
    }

    pub fn presets() -> Vec<Theme> {
        vec![
            Self::classic(),
            Self::deep_sea(),
            Self::sunshine(),
            Self::dark_elegance(),
            Self::forest(),
            Self::wildflower(),
            Self::fire_and_ice(),
        ]
    }

    /// Looks up a preset by id (`style-1`) or by its lowercase display name
    /// with dashes (`deep-sea`).
    pub fn by_id(id: &str) -> Option<Theme> {
        let key = id.trim().to_ascii_lowercase();
        Self::presets().into_iter().find(|theme| {
            theme.id == key || theme.name.to_ascii_lowercase().replace(' ', "-") == key
        })
    }

    /// Theme for a session: unknown style ids fall back to the default
    /// style, a non-empty session font replaces the preset font.
    pub fn for_session(style_id: Option<&str>, font_family: Option<&str>) -> Theme {
        let mut theme = style_id
            .and_then(Self::by_id)
            .unwrap_or_else(|| Self::by_id(DEFAULT_STYLE_ID).unwrap_or_else(Self::deep_sea));
        if let Some(font) = font_family.map(str::trim).filter(|font| !font.is_empty()) {
            theme.font_family = font.to_string();
        }
        theme
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
