use crate::model::{DisplayOptions, RadarConfig};

use super::rings::sector_signs;
use super::text::truncate_to_width;
use super::types::{BlipGeometry, LegendBlock, LegendGroup, LegendRow, TextAlign, TextAnchor};

pub(super) const LEGEND_GAP: f32 = 40.0;
const HEADING_SCALE: f32 = 1.6;
const GROUP_GAP: f32 = 6.0;

pub(super) fn legend_block_width(options: &DisplayOptions) -> f32 {
    options.legend_columns as f32 * options.legend_column_width
}

/// Lays out one legend block per sector. Top blocks start level with the
/// top of the radar; bottom blocks start just below the horizontal axis.
pub(super) fn compute_legend(
    config: &RadarConfig,
    blips: &[BlipGeometry],
    center: (f32, f32),
    radius: f32,
) -> Vec<LegendBlock> {
    let options = &config.display_options;
    let theme = &options.theme;
    let block_width = legend_block_width(options);
    let line_height = options.legend_line_height;
    let heading_size = theme.font_size * HEADING_SCALE;
    let band_count = config.rings.len();
    let bands_per_column = band_count.div_ceil(options.legend_columns).max(1);

    let mut blocks = Vec::with_capacity(config.quadrants.len());
    for (quadrant_index, quadrant) in config.quadrants.iter().enumerate() {
        let sector = quadrant.display_order;
        let (sign_x, sign_y) = sector_signs(sector);
        let x = if sign_x > 0.0 {
            center.0 + radius + LEGEND_GAP
        } else {
            center.0 - radius - LEGEND_GAP - block_width
        };
        let top = if sign_y < 0.0 {
            center.1 - radius + heading_size
        } else {
            center.1 + LEGEND_GAP
        };

        let heading = TextAnchor {
            x,
            y: top,
            text: quadrant.name.clone(),
            font_size: heading_size,
            align: TextAlign::Start,
            bold: true,
        };

        let mut groups = Vec::with_capacity(band_count);
        for band in 0..band_count {
            let Some((ring_index, ring)) = config
                .rings
                .iter()
                .enumerate()
                .find(|(_, ring)| ring.display_order == band)
            else {
                continue;
            };
            let column = band / bands_per_column;
            let column_x = x + column as f32 * options.legend_column_width;
            let group_top = if band % bands_per_column == 0 {
                top + heading_size
            } else {
                groups
                    .last()
                    .map(group_bottom)
                    .unwrap_or(top + heading_size)
            };
            let mut y = group_top + GROUP_GAP;

            let group_heading = TextAnchor {
                x: column_x,
                y: y + line_height,
                text: ring.name.clone(),
                font_size: theme.font_size,
                align: TextAlign::Start,
                bold: true,
            };
            y += line_height;

            let mut rows = Vec::new();
            for blip in blips
                .iter()
                .filter(|blip| blip.quadrant_index == quadrant_index && blip.ring_index == ring_index)
            {
                y += line_height;
                let full = format!("{}. {}", blip.number, blip.label);
                let text = truncate_to_width(
                    &full,
                    options.legend_column_width - GROUP_GAP,
                    theme.font_size,
                    &theme.font_family,
                    options.fast_text_metrics,
                );
                rows.push(LegendRow {
                    number: blip.number,
                    id: blip.id.clone(),
                    text: TextAnchor {
                        x: column_x,
                        y,
                        text,
                        font_size: theme.font_size,
                        align: TextAlign::Start,
                        bold: false,
                    },
                    width: options.legend_column_width - GROUP_GAP,
                    height: line_height,
                });
            }

            groups.push(LegendGroup {
                band,
                color: ring.color.clone(),
                heading: group_heading,
                rows,
            });
        }

        blocks.push(LegendBlock {
            sector,
            quadrant_index,
            heading,
            groups,
        });
    }
    blocks.sort_by_key(|block| block.sector);
    blocks
}

fn group_bottom(group: &LegendGroup) -> f32 {
    group
        .rows
        .last()
        .map(|row| row.text.y)
        .unwrap_or(group.heading.y)
}
