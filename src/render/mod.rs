//! Painting a [`Geometry`] through the [`Surface`] capability.
//!
//! The renderer never owns a drawing target. Hosts pass any `Surface`
//! (or `&mut` to one) and the renderer issues primitive draw calls plus
//! hover/click bindings between blips and their legend rows.

mod recording;
mod svg;

pub use recording::{DrawOp, RecordingSurface};
pub use svg::SvgSurface;

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::layout::{Geometry, MarkerKind, TextAnchor, ViewBox};
use crate::model::DisplayOptions;
use crate::theme::Theme;

/// Identity of an interactive element. Bindings always pair the two kinds
/// for one sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    Blip(usize),
    Legend(usize),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Blip(number) => write!(f, "blip-{number}"),
            ElementId::Legend(number) => write!(f, "legend-{number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub view_box: ViewBox,
    pub background: String,
    pub font_family: String,
    pub highlight_color: String,
}

/// Annulus segment between two radii and two math angles (y up).
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub center: (f32, f32),
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub fill: String,
    pub fill_opacity: f32,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingCircle {
    pub center: (f32, f32),
    pub radius: f32,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub new_tab: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: ElementId,
    pub number: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub kind: MarkerKind,
    pub fill: String,
    pub text_color: String,
    pub font_size: f32,
    pub tooltip: String,
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: Option<ElementId>,
    pub anchor: TextAnchor,
    pub color: String,
}

pub trait Surface {
    /// Drops every element and binding and starts a fresh drawing.
    fn clear(&mut self, viewport: &Viewport);
    fn draw_wedge(&mut self, wedge: &Wedge);
    fn draw_ring(&mut self, ring: &RingCircle);
    fn draw_marker(&mut self, marker: &Marker);
    fn draw_label(&mut self, label: &Label);
    fn bind_hover(&mut self, source: ElementId, targets: &[ElementId]);
    fn bind_click(&mut self, source: ElementId, targets: &[ElementId]);
}

impl<T: Surface + ?Sized> Surface for &mut T {
    fn clear(&mut self, viewport: &Viewport) {
        (**self).clear(viewport)
    }

    fn draw_wedge(&mut self, wedge: &Wedge) {
        (**self).draw_wedge(wedge)
    }

    fn draw_ring(&mut self, ring: &RingCircle) {
        (**self).draw_ring(ring)
    }

    fn draw_marker(&mut self, marker: &Marker) {
        (**self).draw_marker(marker)
    }

    fn draw_label(&mut self, label: &Label) {
        (**self).draw_label(label)
    }

    fn bind_hover(&mut self, source: ElementId, targets: &[ElementId]) {
        (**self).bind_hover(source, targets)
    }

    fn bind_click(&mut self, source: ElementId, targets: &[ElementId]) {
        (**self).bind_click(source, targets)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub theme: Theme,
    pub links_in_new_tabs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&DisplayOptions::default())
    }
}

impl From<&DisplayOptions> for RenderOptions {
    fn from(options: &DisplayOptions) -> Self {
        Self {
            theme: options.theme.clone(),
            links_in_new_tabs: options.links_in_new_tabs,
        }
    }
}

const SEGMENT_TINT: f32 = 0.12;

pub fn render_geometry<S: Surface + ?Sized>(
    geometry: &Geometry,
    surface: &mut S,
    options: &RenderOptions,
) {
    let theme = &options.theme;
    surface.clear(&Viewport {
        width: geometry.width,
        height: geometry.height,
        view_box: geometry.view_box,
        background: theme.background.clone(),
        font_family: theme.font_family.clone(),
        highlight_color: theme.highlight_color.clone(),
    });

    for sector in &geometry.sectors {
        for band in &geometry.bands {
            surface.draw_wedge(&Wedge {
                center: geometry.center,
                inner_radius: band.inner_radius,
                outer_radius: band.outer_radius,
                start_angle: sector.start_angle,
                end_angle: sector.end_angle,
                fill: band.color.clone(),
                fill_opacity: SEGMENT_TINT,
                stroke: theme.grid_color.clone(),
            });
        }
    }

    for band in &geometry.bands {
        surface.draw_ring(&RingCircle {
            center: geometry.center,
            radius: band.outer_radius,
            stroke: theme.grid_color.clone(),
        });
    }
    for band in &geometry.bands {
        surface.draw_label(&Label {
            id: None,
            anchor: band.label.clone(),
            color: band.color.clone(),
        });
    }

    if !geometry.print_layout {
        for sector in &geometry.sectors {
            surface.draw_label(&Label {
                id: None,
                anchor: sector.label.clone(),
                color: theme.text_color.clone(),
            });
        }
    }

    for blip in &geometry.blips {
        let tooltip = if blip.description.trim().is_empty() {
            blip.label.clone()
        } else {
            format!("{}\n{}", blip.label, blip.description.trim())
        };
        surface.draw_marker(&Marker {
            id: ElementId::Blip(blip.number),
            number: blip.number,
            x: blip.x,
            y: blip.y,
            radius: geometry.blip_radius,
            kind: blip.marker,
            fill: blip.color.clone(),
            text_color: theme.blip_text_color.clone(),
            font_size: theme.blip_font_size,
            tooltip,
            link: blip.link.as_ref().map(|href| Link {
                href: href.clone(),
                new_tab: options.links_in_new_tabs,
            }),
        });
    }

    for block in &geometry.legend {
        surface.draw_label(&Label {
            id: None,
            anchor: block.heading.clone(),
            color: theme.text_color.clone(),
        });
        for group in &block.groups {
            surface.draw_label(&Label {
                id: None,
                anchor: group.heading.clone(),
                color: group.color.clone(),
            });
            for row in &group.rows {
                surface.draw_label(&Label {
                    id: Some(ElementId::Legend(row.number)),
                    anchor: row.text.clone(),
                    color: theme.text_color.clone(),
                });
            }
        }
    }

    for anchor in geometry
        .title
        .iter()
        .chain(geometry.date.iter())
        .chain(geometry.footer.iter())
    {
        surface.draw_label(&Label {
            id: None,
            anchor: anchor.clone(),
            color: theme.text_color.clone(),
        });
    }

    let listed: BTreeSet<usize> = geometry.legend_rows().map(|row| row.number).collect();
    let mut bound = 0usize;
    for blip in &geometry.blips {
        let marker = ElementId::Blip(blip.number);
        if !listed.contains(&blip.number) {
            // No legend row: the marker only highlights itself.
            surface.bind_hover(marker, &[]);
            surface.bind_click(marker, &[]);
            continue;
        }
        let legend = ElementId::Legend(blip.number);
        surface.bind_hover(marker, &[legend]);
        surface.bind_click(marker, &[legend]);
        surface.bind_hover(legend, &[marker]);
        surface.bind_click(legend, &[marker]);
        bound += 1;
    }
    debug!(
        blips = geometry.blips.len(),
        bound, "painted radar geometry"
    );
}

/// Renders into a fresh [`SvgSurface`] and returns the document.
pub fn render_svg(geometry: &Geometry, options: &RenderOptions) -> String {
    let mut surface = SvgSurface::new();
    render_geometry(geometry, &mut surface, options);
    surface.into_svg()
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, scale: f32) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let size = tree.size().to_int_size().scale_by(scale).ok_or_else(|| {
        anyhow::anyhow!("PNG scale {scale} produces an empty image")
    })?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}
