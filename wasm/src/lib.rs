use radar_rs::{
    ChartHandle, RadarConfig, SvgSurface, Theme, export_config, import_config, merge_configs,
    parse_patch,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    interactive: Option<bool>,
}

impl ChartOptions {
    fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw {
            Some(raw) => serde_json::from_str(raw).map_err(|error| error.to_string()),
            None => Ok(Self::default()),
        }
    }

    fn apply(&self, config: &mut RadarConfig) -> Result<(), String> {
        let options = &mut config.display_options;
        if let Some(name) = &self.theme {
            options.theme =
                Theme::by_name(name).ok_or_else(|| format!("unknown theme preset '{name}'"))?;
        }
        if let Some(font_family) = &self.font_family {
            options.theme.font_family = font_family.clone();
        }
        if let Some(font_size) = self.font_size {
            options.theme.font_size = font_size;
        }
        // Without a font database, measuring falls back to the estimate.
        if let Some(fast_text) = self.fast_text {
            options.fast_text_metrics = fast_text;
        }
        Ok(())
    }

    fn surface(&self) -> SvgSurface {
        if self.interactive.unwrap_or(true) {
            SvgSurface::new()
        } else {
            SvgSurface::new().without_interaction()
        }
    }
}

struct Inner {
    chart: ChartHandle<SvgSurface>,
    options: ChartOptions,
}

impl Inner {
    fn new(config_json: &str, options_json: Option<&str>) -> Result<Self, String> {
        let options = ChartOptions::parse(options_json)?;
        let mut config = import_config(config_json).map_err(|error| error.to_string())?;
        options.apply(&mut config)?;
        let chart =
            ChartHandle::init(config, options.surface()).map_err(|error| error.to_string())?;
        Ok(Self { chart, options })
    }

    fn render(&mut self, config_json: &str) -> Result<(), String> {
        let mut config = import_config(config_json).map_err(|error| error.to_string())?;
        self.options.apply(&mut config)?;
        self.chart.render(config).map_err(|error| error.to_string())
    }

    fn config_json(&self) -> Result<String, String> {
        export_config(self.chart.config()).map_err(|error| error.to_string())
    }
}

/// A radar chart that renders into an SVG string the host inserts into the page.
#[wasm_bindgen]
pub struct RadarChart {
    inner: Inner,
}

#[wasm_bindgen]
impl RadarChart {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, options_json: Option<String>) -> Result<RadarChart, JsValue> {
        let inner = Inner::new(config_json, options_json.as_deref()).map_err(to_js)?;
        Ok(RadarChart { inner })
    }

    pub fn svg(&self) -> String {
        self.inner.chart.surface().to_svg()
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<String, JsValue> {
        self.inner.config_json().map_err(to_js)
    }

    pub fn render(&mut self, config_json: &str) -> Result<(), JsValue> {
        self.inner.render(config_json).map_err(to_js)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner
            .chart
            .reset()
            .map_err(|error| to_js(error.to_string()))
    }

    #[wasm_bindgen(js_name = importAndMerge)]
    pub fn import_and_merge(&mut self, text: &str) -> Result<(), JsValue> {
        self.inner
            .chart
            .import_and_merge(text)
            .map_err(|error| to_js(error.to_string()))
    }
}

fn canonical_import(text: &str) -> Result<String, String> {
    let config = import_config(text).map_err(|error| error.to_string())?;
    export_config(&config).map_err(|error| error.to_string())
}

fn merge_json(base_json: &str, patch_json: &str) -> Result<String, String> {
    let base = import_config(base_json).map_err(|error| error.to_string())?;
    let patch = parse_patch(patch_json).map_err(|error| error.to_string())?;
    let merged = merge_configs(&base, &patch).map_err(|error| error.to_string())?;
    export_config(&merged).map_err(|error| error.to_string())
}

/// Validates a config document and returns it in canonical form.
#[wasm_bindgen(js_name = importConfig)]
pub fn import_config_js(text: &str) -> Result<String, JsValue> {
    canonical_import(text).map_err(to_js)
}

#[wasm_bindgen(js_name = exportConfig)]
pub fn export_config_js(config_json: &str) -> Result<String, JsValue> {
    canonical_import(config_json).map_err(to_js)
}

#[wasm_bindgen(js_name = mergeConfigs)]
pub fn merge_configs_js(base_json: &str, patch_json: &str) -> Result<String, JsValue> {
    merge_json(base_json, patch_json).map_err(to_js)
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        export_config(&RadarConfig::sample()).unwrap()
    }

    #[test]
    fn chart_renders_and_resets() {
        let mut inner = Inner::new(&sample_json(), None).unwrap();
        assert!(inner.chart.surface().to_svg().contains("<svg"));

        inner
            .chart
            .import_and_merge(r#"{"title": "Imported"}"#)
            .unwrap();
        assert!(inner.config_json().unwrap().contains("Imported"));

        inner.chart.reset().unwrap();
        assert!(inner.config_json().unwrap().contains("Tech Radar"));
    }

    #[test]
    fn options_select_theme_and_interaction() {
        let inner = Inner::new(
            &sample_json(),
            Some(r#"{"theme": "modern", "interactive": false}"#),
        )
        .unwrap();
        assert_eq!(
            inner.chart.config().display_options.theme.font_family,
            Theme::modern().font_family
        );
        assert!(!inner.chart.surface().to_svg().contains("<script"));
        assert!(Inner::new(&sample_json(), Some(r#"{"theme": "neon"}"#)).is_err());
    }

    #[test]
    fn config_round_trips_without_fast_text_option() {
        let mut config = RadarConfig::sample();
        config.display_options.fast_text_metrics = false;
        let json = export_config(&config).unwrap();
        let mut inner = Inner::new(&json, None).unwrap();
        assert_eq!(import_config(&inner.config_json().unwrap()).unwrap(), config);

        inner.render(&json).unwrap();
        assert!(!inner.chart.config().display_options.fast_text_metrics);

        let inner = Inner::new(&json, Some(r#"{"fastText": true}"#)).unwrap();
        assert!(inner.chart.config().display_options.fast_text_metrics);
    }

    #[test]
    fn merge_keeps_base_entries() {
        let merged = merge_json(&sample_json(), r#"{"title": "Q3"}"#).unwrap();
        let config = import_config(&merged).unwrap();
        assert_eq!(config.title, "Q3");
        assert_eq!(config.entries.len(), RadarConfig::sample().entries.len());
        assert!(canonical_import("{").is_err());
    }
}
