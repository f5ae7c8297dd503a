use serde::{Deserialize, Serialize};

const CLASSIC_RING_PALETTE: [&str; 4] = ["#5ba300", "#009eb0", "#c7ba00", "#e09b96"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_font_size: f32,
    pub ring_label_font_size: f32,
    pub blip_font_size: f32,
    pub background: String,
    pub grid_color: String,
    pub inactive_color: String,
    pub text_color: String,
    pub blip_text_color: String,
    pub highlight_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 11.0,
            title_font_size: 34.0,
            ring_label_font_size: 12.0,
            blip_font_size: 8.0,
            background: "#FFFFFF".to_string(),
            grid_color: "#BBBBBB".to_string(),
            inactive_color: "#DDDDDD".to_string(),
            text_color: "#000000".to_string(),
            blip_text_color: "#FFFFFF".to_string(),
            highlight_color: "#333333".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            title_font_size: 28.0,
            ring_label_font_size: 12.0,
            blip_font_size: 8.0,
            background: "#FFFFFF".to_string(),
            grid_color: "#C7D2E5".to_string(),
            inactive_color: "#E3E8F0".to_string(),
            text_color: "#1C2430".to_string(),
            blip_text_color: "#FFFFFF".to_string(),
            highlight_color: "#7A8AA6".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }

    /// Colors handed out to rings that are created without an explicit one.
    pub fn ring_palette() -> Vec<String> {
        CLASSIC_RING_PALETTE
            .iter()
            .map(|value| value.to_string())
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(Theme::by_name("modern"), Some(Theme::modern()));
        assert_eq!(Theme::by_name("default"), Some(Theme::classic()));
        assert!(Theme::by_name("neon").is_none());
    }

    #[test]
    fn partial_theme_fills_defaults() {
        let theme: Theme = serde_json::from_str(r##"{"gridColor":"#000"}"##).unwrap();
        assert_eq!(theme.grid_color, "#000");
        assert_eq!(theme.font_family, Theme::classic().font_family);
    }
}
