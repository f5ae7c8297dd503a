//! Radar layout: turns a validated [`RadarConfig`] into concrete geometry.
//!
//! The plane is split into four quarter-plane sectors and `R` concentric
//! bands. Every entry gets a point inside its sector/band segment, drawn from
//! a generator seeded by the entry id, so unchanged input always produces the
//! same picture. Candidates too close to an already placed blip of the same
//! sector are resampled a bounded number of times.

mod legend;
mod placement;
mod rings;
pub(crate) mod text;
pub(crate) mod types;

pub use types::*;

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::model::{Entry, Moved, RadarConfig, QUADRANT_COUNT};

use legend::{LEGEND_GAP, compute_legend, legend_block_width};
use placement::{Placer, Segment, seed_for};
use rings::{band_radii, polar_to_screen, sector_angles, sector_signs};
use text::split_lines;

const MARGIN: f32 = 30.0;
const SECTOR_LABEL_OFFSET: f32 = 24.0;

pub fn compute_layout(config: &RadarConfig) -> Result<Geometry, LayoutError> {
    config.validate()?;
    if config.rings.is_empty() {
        return Err(LayoutError::NoRings);
    }

    let options = &config.display_options;
    let theme = &options.theme;
    let radii = band_radii(options, config.rings.len());
    let radius = radii.last().copied().unwrap_or(options.radius);

    let legend_width = if options.print_layout {
        LEGEND_GAP + legend_block_width(options)
    } else {
        0.0
    };
    let title_space = if options.print_layout {
        theme.title_font_size * 2.5
    } else {
        0.0
    };
    let width = options
        .width
        .max(2.0 * (radius + MARGIN + legend_width));
    let height = options
        .height
        .max(2.0 * (radius + MARGIN + title_space));
    let center = (width / 2.0, height / 2.0);

    let sectors = sector_geometry(config, center, radius, theme.font_size * 1.6);
    let bands = band_geometry(config, center, &radii);

    let ordered = numbering_order(config);
    let mut placer = Placer::new(
        center,
        options.segment_padding,
        options.min_clearance,
        options.max_attempts,
    );
    let mut segment_counts: HashMap<(usize, usize), usize> = HashMap::new();
    let mut blips = Vec::with_capacity(ordered.len());
    for (position, entry) in ordered.into_iter().enumerate() {
        let sector = config.quadrants[entry.quadrant_index].display_order;
        let band = config.rings[entry.ring_index].display_order;
        let segment = segment_for(sector, band, &bands);
        let seed = seed_for(&entry.id);
        let placement = placer.place(&segment, seed);
        *segment_counts.entry((sector, band)).or_default() += 1;

        let color = if entry.active {
            config.rings[entry.ring_index].color.clone()
        } else {
            theme.inactive_color.clone()
        };
        blips.push(BlipGeometry {
            id: entry.id.clone(),
            number: position + 1,
            label: entry.label.clone(),
            description: entry.description.clone(),
            link: entry.link.clone(),
            quadrant_index: entry.quadrant_index,
            ring_index: entry.ring_index,
            sector,
            band,
            x: placement.x,
            y: placement.y,
            seed,
            attempts: placement.attempts,
            crowded: placement.crowded,
            marker: marker_for(entry),
            color,
            active: entry.active,
        });
    }

    let mut crowded_segments = Vec::new();
    let mut keys: Vec<&(usize, usize)> = segment_counts.keys().collect();
    keys.sort();
    for &(sector, band) in keys {
        let count = segment_counts[&(sector, band)];
        let capacity = segment_for(sector, band, &bands)
            .capacity(options.segment_padding, options.min_clearance);
        if count > capacity {
            warn!(
                sector,
                band, count, capacity, "segment is above its density threshold"
            );
            crowded_segments.push(SegmentKey { sector, band });
        }
    }

    let mut legend = if options.print_layout {
        compute_legend(config, &blips, center, radius)
    } else {
        Vec::new()
    };

    let (title, date, footer) = if options.print_layout {
        header_and_footer(config, height)
    } else {
        (None, None, Vec::new())
    };

    let view_box = match options.zoomed_quadrant {
        Some(sector) => {
            blips.retain(|blip| blip.sector == sector);
            legend.retain(|block| block.sector == sector);
            zoomed_view_box(sector, center, radius, legend_width)
        }
        None => ViewBox {
            x: 0.0,
            y: 0.0,
            width,
            height,
        },
    };

    let crowded = blips.iter().filter(|blip| blip.crowded).count();
    if crowded > 0 {
        warn!(crowded, "blips placed without full clearance");
    }
    debug!(
        blips = blips.len(),
        bands = bands.len(),
        width,
        height,
        "computed radar layout"
    );

    Ok(Geometry {
        width,
        height,
        center,
        radius,
        view_box,
        print_layout: options.print_layout,
        blip_radius: options.blip_radius,
        sectors,
        bands,
        blips,
        legend,
        title,
        date,
        footer,
        crowded_segments,
    })
}

/// Entries in display order: by sector, band, label (case-insensitive), id.
fn numbering_order(config: &RadarConfig) -> Vec<&Entry> {
    let mut ordered: Vec<(usize, usize, String, String, &Entry)> = config
        .entries
        .iter()
        .map(|entry| {
            (
                config.quadrants[entry.quadrant_index].display_order,
                config.rings[entry.ring_index].display_order,
                entry.label.to_lowercase(),
                entry.id.to_string(),
                entry,
            )
        })
        .collect();
    ordered.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
            .then_with(|| a.3.cmp(&b.3))
    });
    ordered.into_iter().map(|(_, _, _, _, entry)| entry).collect()
}

fn marker_for(entry: &Entry) -> MarkerKind {
    if entry.is_new {
        return MarkerKind::Star;
    }
    match entry.moved {
        Moved::Up => MarkerKind::TriangleUp,
        Moved::Down => MarkerKind::TriangleDown,
        Moved::None | Moved::Flat => MarkerKind::Circle,
    }
}

fn segment_for(sector: usize, band: usize, bands: &[BandGeometry]) -> Segment {
    let (start_angle, end_angle) = sector_angles(sector);
    let ring = &bands[band];
    Segment {
        sector,
        band,
        inner: ring.inner_radius,
        outer: ring.outer_radius,
        start_angle,
        end_angle,
    }
}

fn sector_geometry(
    config: &RadarConfig,
    center: (f32, f32),
    radius: f32,
    font_size: f32,
) -> Vec<SectorGeometry> {
    let mut sectors: Vec<SectorGeometry> = config
        .quadrants
        .iter()
        .enumerate()
        .map(|(quadrant_index, quadrant)| {
            let sector = quadrant.display_order;
            let (start_angle, end_angle) = sector_angles(sector);
            let mid = start_angle + FRAC_PI_2 / 2.0;
            let (x, y) = polar_to_screen(center, radius + SECTOR_LABEL_OFFSET, mid);
            let (sign_x, _) = sector_signs(sector);
            SectorGeometry {
                sector,
                quadrant_index,
                name: quadrant.name.clone(),
                start_angle,
                end_angle,
                label: TextAnchor {
                    x,
                    y,
                    text: quadrant.name.clone(),
                    font_size,
                    align: if sign_x > 0.0 {
                        TextAlign::Start
                    } else {
                        TextAlign::End
                    },
                    bold: true,
                },
            }
        })
        .collect();
    sectors.sort_by_key(|sector| sector.sector);
    debug_assert_eq!(sectors.len(), QUADRANT_COUNT);
    sectors
}

fn band_geometry(config: &RadarConfig, center: (f32, f32), radii: &[f32]) -> Vec<BandGeometry> {
    let theme = &config.display_options.theme;
    let mut bands: Vec<BandGeometry> = config
        .rings
        .iter()
        .enumerate()
        .map(|(ring_index, ring)| {
            let band = ring.display_order;
            let inner_radius = if band == 0 { 0.0 } else { radii[band - 1] };
            let outer_radius = radii[band];
            BandGeometry {
                band,
                ring_index,
                name: ring.name.clone(),
                color: ring.color.clone(),
                inner_radius,
                outer_radius,
                label: TextAnchor {
                    x: center.0,
                    y: center.1 - (inner_radius + outer_radius) / 2.0
                        + theme.ring_label_font_size / 3.0,
                    text: ring.name.clone(),
                    font_size: theme.ring_label_font_size,
                    align: TextAlign::Middle,
                    bold: true,
                },
            }
        })
        .collect();
    bands.sort_by_key(|band| band.band);
    bands
}

fn header_and_footer(
    config: &RadarConfig,
    height: f32,
) -> (Option<TextAnchor>, Option<TextAnchor>, Vec<TextAnchor>) {
    let options = &config.display_options;
    let theme = &options.theme;
    let title_y = MARGIN + theme.title_font_size;
    let title = (!config.title.trim().is_empty()).then(|| TextAnchor {
        x: MARGIN,
        y: title_y,
        text: config.title.clone(),
        font_size: theme.title_font_size,
        align: TextAlign::Start,
        bold: true,
    });
    let date = options.date.as_ref().map(|date| TextAnchor {
        x: MARGIN,
        y: title_y + theme.font_size * 2.0,
        text: date.clone(),
        font_size: theme.font_size,
        align: TextAlign::Start,
        bold: false,
    });
    let footer_lines = options
        .footer
        .as_deref()
        .map(split_lines)
        .unwrap_or_default();
    let line_height = options.legend_line_height;
    let first_y = height - MARGIN - line_height * footer_lines.len().saturating_sub(1) as f32;
    let footer = footer_lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| TextAnchor {
            x: MARGIN,
            y: first_y + idx as f32 * line_height,
            text: line,
            font_size: theme.font_size,
            align: TextAlign::Start,
            bold: false,
        })
        .collect();
    (title, date, footer)
}

fn zoomed_view_box(sector: usize, center: (f32, f32), radius: f32, legend_width: f32) -> ViewBox {
    let (sign_x, sign_y) = sector_signs(sector);
    let reach_x = radius + legend_width;
    let far_x = center.0 + sign_x * reach_x;
    let far_y = center.1 + sign_y * radius;
    ViewBox {
        x: center.0.min(far_x) - MARGIN,
        y: center.1.min(far_y) - MARGIN,
        width: reach_x + 2.0 * MARGIN,
        height: radius + 2.0 * MARGIN,
    }
}
