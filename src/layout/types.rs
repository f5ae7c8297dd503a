use crate::model::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Middle,
    End,
}

impl TextAlign {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::Middle => "middle",
            TextAlign::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAnchor {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
    pub align: TextAlign,
    pub bold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Circle,
    TriangleUp,
    TriangleDown,
    Star,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorGeometry {
    pub sector: usize,
    pub quadrant_index: usize,
    pub name: String,
    /// Math angles (counter-clockwise from +x, y up), radians.
    pub start_angle: f32,
    pub end_angle: f32,
    pub label: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandGeometry {
    pub band: usize,
    pub ring_index: usize,
    pub name: String,
    pub color: String,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub label: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlipGeometry {
    pub id: EntryId,
    pub number: usize,
    pub label: String,
    pub description: String,
    pub link: Option<String>,
    pub quadrant_index: usize,
    pub ring_index: usize,
    pub sector: usize,
    pub band: usize,
    pub x: f32,
    pub y: f32,
    pub seed: u64,
    pub attempts: u32,
    /// Placed without meeting the clearance distance.
    pub crowded: bool,
    pub marker: MarkerKind,
    pub color: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub number: usize,
    pub id: EntryId,
    pub text: TextAnchor,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendGroup {
    pub band: usize,
    pub color: String,
    pub heading: TextAnchor,
    pub rows: Vec<LegendRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendBlock {
    pub sector: usize,
    pub quadrant_index: usize,
    pub heading: TextAnchor,
    pub groups: Vec<LegendGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentKey {
    pub sector: usize,
    pub band: usize,
}

/// Everything needed to paint one radar. Coordinates are absolute canvas
/// pixels with y growing downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub center: (f32, f32),
    pub radius: f32,
    pub view_box: ViewBox,
    pub print_layout: bool,
    pub blip_radius: f32,
    pub sectors: Vec<SectorGeometry>,
    pub bands: Vec<BandGeometry>,
    pub blips: Vec<BlipGeometry>,
    pub legend: Vec<LegendBlock>,
    pub title: Option<TextAnchor>,
    pub date: Option<TextAnchor>,
    pub footer: Vec<TextAnchor>,
    pub crowded_segments: Vec<SegmentKey>,
}

impl Geometry {
    pub fn blip(&self, number: usize) -> Option<&BlipGeometry> {
        self.blips.iter().find(|blip| blip.number == number)
    }

    pub fn blip_by_id(&self, id: &EntryId) -> Option<&BlipGeometry> {
        self.blips.iter().find(|blip| &blip.id == id)
    }

    pub fn blips_in_sector(&self, sector: usize) -> impl Iterator<Item = &BlipGeometry> {
        self.blips.iter().filter(move |blip| blip.sector == sector)
    }

    pub fn legend_rows(&self) -> impl Iterator<Item = &LegendRow> {
        self.legend
            .iter()
            .flat_map(|block| block.groups.iter())
            .flat_map(|group| group.rows.iter())
    }

    /// Smallest distance between two blips of one sector, if it has two.
    pub fn min_distance_in_sector(&self, sector: usize) -> Option<f32> {
        let points: Vec<(f32, f32)> = self.blips_in_sector(sector).map(|b| (b.x, b.y)).collect();
        let mut best: Option<f32> = None;
        for (idx, a) in points.iter().enumerate() {
            for b in points.iter().skip(idx + 1) {
                let dist = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                best = Some(best.map_or(dist, |current| current.min(dist)));
            }
        }
        best
    }
}
