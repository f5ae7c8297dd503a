//! A live chart bound to a host surface.

use tracing::debug;

use crate::error::RadarError;
use crate::json_io::{merge_configs, parse_patch};
use crate::layout::{Geometry, compute_layout};
use crate::model::RadarConfig;
use crate::render::{RenderOptions, Surface, render_geometry};

/// Owns the current config, its geometry and the surface it is painted on.
///
/// The config passed to [`ChartHandle::init`] is kept as the baseline that
/// [`ChartHandle::reset`] returns to. Handles are independent of each other.
pub struct ChartHandle<S: Surface> {
    surface: S,
    baseline: RadarConfig,
    current: RadarConfig,
    geometry: Geometry,
}

impl<S: Surface> ChartHandle<S> {
    pub fn init(config: RadarConfig, mut surface: S) -> Result<Self, RadarError> {
        let geometry = paint(&config, &mut surface)?;
        Ok(Self {
            surface,
            baseline: config.clone(),
            current: config,
            geometry,
        })
    }

    pub fn get_config(&self) -> RadarConfig {
        self.current.clone()
    }

    pub fn config(&self) -> &RadarConfig {
        &self.current
    }

    pub fn baseline(&self) -> &RadarConfig {
        &self.baseline
    }

    /// Lays out and repaints `config`. On error nothing changes: the previous
    /// config, geometry and drawing stay as they were.
    pub fn render(&mut self, config: RadarConfig) -> Result<(), RadarError> {
        let geometry = paint(&config, &mut self.surface)?;
        self.current = config;
        self.geometry = geometry;
        Ok(())
    }

    /// Re-renders the baseline, discarding any imported changes.
    pub fn reset(&mut self) -> Result<(), RadarError> {
        debug!("resetting chart to its baseline config");
        self.render(self.baseline.clone())
    }

    /// Merges a partial JSON document into the current config and renders it.
    pub fn import_and_merge(&mut self, text: &str) -> Result<(), RadarError> {
        let patch = parse_patch(text)?;
        let merged = merge_configs(&self.current, &patch)?;
        self.render(merged)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

fn paint<S: Surface>(config: &RadarConfig, surface: &mut S) -> Result<Geometry, RadarError> {
    let geometry = compute_layout(config)?;
    render_geometry(&geometry, surface, &RenderOptions::from(&config.display_options));
    Ok(geometry)
}
