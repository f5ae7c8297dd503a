use crate::model::DisplayOptions;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Pixel density multiplier for PNG output.
    pub png_scale: f32,
    pub format: OutputFormat,
    /// Emit hover/click wiring into SVG output.
    pub interactive: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            png_scale: 1.0,
            format: OutputFormat::Svg,
            interactive: true,
        }
    }
}

/// Settings that sit outside a radar document: look and output.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Set only when the settings file names a theme or overrides variables;
    /// otherwise the radar's own `displayOptions.theme` is left alone.
    pub theme: Option<Theme>,
    pub render: RenderConfig,
}

impl Config {
    pub fn apply(&self, options: &mut DisplayOptions) {
        if let Some(theme) = &self.theme {
            options.theme = theme.clone();
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    title_font_size: Option<f32>,
    ring_label_font_size: Option<f32>,
    blip_font_size: Option<f32>,
    background: Option<String>,
    grid_color: Option<String>,
    inactive_color: Option<String>,
    text_color: Option<String>,
    blip_text_color: Option<String>,
    highlight_color: Option<String>,
}

impl ThemeVariables {
    fn apply(self, theme: &mut Theme) {
        if let Some(v) = self.font_family {
            theme.font_family = v;
        }
        if let Some(v) = self.font_size {
            theme.font_size = v;
        }
        if let Some(v) = self.title_font_size {
            theme.title_font_size = v;
        }
        if let Some(v) = self.ring_label_font_size {
            theme.ring_label_font_size = v;
        }
        if let Some(v) = self.blip_font_size {
            theme.blip_font_size = v;
        }
        if let Some(v) = self.background {
            theme.background = v;
        }
        if let Some(v) = self.grid_color {
            theme.grid_color = v;
        }
        if let Some(v) = self.inactive_color {
            theme.inactive_color = v;
        }
        if let Some(v) = self.text_color {
            theme.text_color = v;
        }
        if let Some(v) = self.blip_text_color {
            theme.blip_text_color = v;
        }
        if let Some(v) = self.highlight_color {
            theme.highlight_color = v;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Settings files are JSON5, so comments and trailing commas are fine.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    let mut theme = match parsed.theme.as_deref() {
        Some(name) => Some(
            Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme preset '{name}'"))?,
        ),
        None => None,
    };
    if let Some(vars) = parsed.theme_variables {
        vars.apply(theme.get_or_insert_with(Theme::classic));
    }
    config.theme = theme;

    if let Some(render) = parsed.render {
        if !(render.png_scale.is_finite() && render.png_scale > 0.0) {
            anyhow::bail!("render.pngScale must be positive, got {}", render.png_scale);
        }
        config.render = render;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert!(config.theme.is_none());
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert_eq!(config.render.png_scale, 1.0);
    }

    #[test]
    fn json5_settings_parse() {
        let config = parse_config(
            r##"{
                // look
                theme: "modern",
                themeVariables: { fontSize: 13, highlightColor: "#ff0000", },
                render: { pngScale: 2, format: "png" },
            }"##,
        )
        .unwrap();
        let theme = config.theme.unwrap();
        assert_eq!(theme.font_family, Theme::modern().font_family);
        assert_eq!(theme.font_size, 13.0);
        assert_eq!(theme.highlight_color, "#ff0000");
        assert_eq!(config.render.format, OutputFormat::Png);
        assert_eq!(config.render.png_scale, 2.0);
        assert!(config.render.interactive);
    }

    #[test]
    fn variables_alone_start_from_classic() {
        let config = parse_config(r##"{ themeVariables: { gridColor: "#000" } }"##).unwrap();
        let theme = config.theme.unwrap();
        assert_eq!(theme.grid_color, "#000");
        assert_eq!(theme.font_family, Theme::classic().font_family);
    }

    #[test]
    fn apply_overrides_display_theme() {
        let config = parse_config(r#"{ theme: "modern" }"#).unwrap();
        let mut options = DisplayOptions::default();
        config.apply(&mut options);
        assert_eq!(options.theme, Theme::modern());

        let mut untouched = DisplayOptions::default();
        Config::default().apply(&mut untouched);
        assert_eq!(untouched.theme, Theme::classic());
    }

    #[test]
    fn bad_settings_are_errors() {
        assert!(parse_config(r#"{ theme: "neon" }"#).is_err());
        assert!(parse_config(r#"{ render: { pngScale: 0 } }"#).is_err());
        assert!(parse_config("{ theme: ").is_err());
    }
}
