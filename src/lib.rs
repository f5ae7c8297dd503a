pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod json_io;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod text_metrics;
pub mod theme;

pub use chart::ChartHandle;
#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{ConfigValidationError, LayoutError, ParseError, RadarError};
pub use json_io::{ConfigPatch, export_config, import_config, merge_configs, parse_patch};
pub use layout::{Geometry, compute_layout};
pub use model::{DisplayOptions, Entry, EntryId, Moved, Quadrant, RadarConfig, Ring};
pub use render::{RecordingSurface, RenderOptions, Surface, SvgSurface, render_geometry};
pub use theme::Theme;

/// Lays out `config` and renders it as a standalone interactive SVG.
pub fn render_radar_svg(config: &RadarConfig) -> Result<String, RadarError> {
    let geometry = compute_layout(config)?;
    Ok(render::render_svg(
        &geometry,
        &RenderOptions::from(&config.display_options),
    ))
}
