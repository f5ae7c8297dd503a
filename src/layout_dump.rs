use crate::layout::Geometry;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryDump {
    pub width: f32,
    pub height: f32,
    pub center: [f32; 2],
    pub radius: f32,
    pub view_box: [f32; 4],
    pub sectors: Vec<SectorDump>,
    pub bands: Vec<BandDump>,
    pub blips: Vec<BlipDump>,
    pub legend_rows: Vec<LegendRowDump>,
    pub crowded_segments: Vec<[usize; 2]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDump {
    pub sector: usize,
    pub quadrant_index: usize,
    pub name: String,
    pub start_angle: f32,
    pub end_angle: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandDump {
    pub band: usize,
    pub ring_index: usize,
    pub name: String,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlipDump {
    pub number: usize,
    pub id: String,
    pub label: String,
    pub sector: usize,
    pub band: usize,
    pub x: f32,
    pub y: f32,
    pub seed: String,
    pub attempts: u32,
    pub crowded: bool,
    pub marker: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendRowDump {
    pub number: usize,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl GeometryDump {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let sectors = geometry
            .sectors
            .iter()
            .map(|sector| SectorDump {
                sector: sector.sector,
                quadrant_index: sector.quadrant_index,
                name: sector.name.clone(),
                start_angle: sector.start_angle,
                end_angle: sector.end_angle,
            })
            .collect();

        let bands = geometry
            .bands
            .iter()
            .map(|band| BandDump {
                band: band.band,
                ring_index: band.ring_index,
                name: band.name.clone(),
                inner_radius: band.inner_radius,
                outer_radius: band.outer_radius,
            })
            .collect();

        let blips = geometry
            .blips
            .iter()
            .map(|blip| BlipDump {
                number: blip.number,
                id: blip.id.to_string(),
                label: blip.label.clone(),
                sector: blip.sector,
                band: blip.band,
                x: blip.x,
                y: blip.y,
                // u64 does not survive a trip through JS numbers.
                seed: format!("{:016x}", blip.seed),
                attempts: blip.attempts,
                crowded: blip.crowded,
                marker: format!("{:?}", blip.marker),
            })
            .collect();

        let legend_rows = geometry
            .legend_rows()
            .map(|row| LegendRowDump {
                number: row.number,
                text: row.text.text.clone(),
                x: row.text.x,
                y: row.text.y,
            })
            .collect();

        let view_box = &geometry.view_box;
        GeometryDump {
            width: geometry.width,
            height: geometry.height,
            center: [geometry.center.0, geometry.center.1],
            radius: geometry.radius,
            view_box: [view_box.x, view_box.y, view_box.width, view_box.height],
            sectors,
            bands,
            blips,
            legend_rows,
            crowded_segments: geometry
                .crowded_segments
                .iter()
                .map(|key| [key.sector, key.band])
                .collect(),
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when `None`.
pub fn write_layout_dump(path: Option<&Path>, geometry: &Geometry) -> anyhow::Result<()> {
    let dump = GeometryDump::from_geometry(geometry);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
