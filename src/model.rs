//! The validated radar dataset.
//!
//! A [`RadarConfig`] is what hosts construct and what [`crate::json_io`]
//! produces from exchange text. Field names follow the camelCase exchange
//! format; unknown top-level keys are carried in [`RadarConfig::extra`] so
//! they survive an import/export round trip.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigValidationError;
use crate::theme::Theme;

pub const QUADRANT_COUNT: usize = 4;

/// Top-level keys owned by [`RadarConfig`]; `extra` may not repeat them.
const RESERVED_KEYS: [&str; 5] = ["title", "quadrants", "rings", "entries", "displayOptions"];

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|(rgb|rgba|hsl|hsla)\([0-9a-zA-Z.,%\s/+-]*\)|[a-zA-Z]+)$",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quadrant {
    pub name: String,
    pub display_order: usize,
}

impl Quadrant {
    pub fn new(name: impl Into<String>, display_order: usize) -> Self {
        Self {
            name: name.into(),
            display_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ring {
    pub name: String,
    pub display_order: usize,
    pub color: String,
}

impl Ring {
    pub fn new(name: impl Into<String>, display_order: usize, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_order,
            color: color.into(),
        }
    }
}

/// Entry identifier: the exchange format allows either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(value) => write!(f, "{value}"),
            EntryId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        EntryId::Number(value)
    }
}

impl From<i32> for EntryId {
    fn from(value: i32) -> Self {
        EntryId::Number(value.into())
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId::Text(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Moved {
    #[default]
    None,
    Up,
    Down,
    Flat,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MovedRepr {
    Name(String),
    Legacy(i64),
}

impl<'de> Deserialize<'de> for Moved {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match MovedRepr::deserialize(deserializer)? {
            MovedRepr::Name(name) => match name.as_str() {
                "none" => Ok(Moved::None),
                "up" => Ok(Moved::Up),
                "down" => Ok(Moved::Down),
                "flat" => Ok(Moved::Flat),
                _ => Err(de::Error::unknown_variant(
                    &name,
                    &["none", "up", "down", "flat"],
                )),
            },
            // Older radar files encode movement as -1/0/1.
            MovedRepr::Legacy(value) => match value {
                -1 => Ok(Moved::Down),
                0 => Ok(Moved::Flat),
                1 => Ok(Moved::Up),
                other => Err(de::Error::invalid_value(
                    Unexpected::Signed(other),
                    &"-1, 0 or 1",
                )),
            },
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub label: String,
    pub quadrant_index: usize,
    pub ring_index: usize,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub moved: Moved,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Entry {
    pub fn new(
        id: impl Into<EntryId>,
        label: impl Into<String>,
        quadrant_index: usize,
        ring_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            quadrant_index,
            ring_index,
            is_new: false,
            moved: Moved::None,
            description: String::new(),
            link: None,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_radii: Option<Vec<f32>>,
    pub blip_radius: f32,
    pub min_clearance: f32,
    pub segment_padding: f32,
    pub max_attempts: u32,
    pub print_layout: bool,
    pub links_in_new_tabs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoomed_quadrant: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub legend_column_width: f32,
    pub legend_line_height: f32,
    pub legend_columns: usize,
    pub fast_text_metrics: bool,
    pub theme: Theme,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: 1450.0,
            height: 1000.0,
            radius: 400.0,
            ring_radii: None,
            blip_radius: 9.0,
            min_clearance: 15.0,
            segment_padding: 15.0,
            max_attempts: 64,
            print_layout: true,
            links_in_new_tabs: true,
            zoomed_quadrant: None,
            date: None,
            footer: None,
            legend_column_width: 140.0,
            legend_line_height: 12.0,
            legend_columns: 2,
            fast_text_metrics: false,
            theme: Theme::classic(),
        }
    }
}

impl DisplayOptions {
    fn validate(&self, ring_count: usize) -> Result<(), ConfigValidationError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("radius", self.radius)?;
        positive("blipRadius", self.blip_radius)?;
        non_negative("minClearance", self.min_clearance)?;
        non_negative("segmentPadding", self.segment_padding)?;
        if self.max_attempts == 0 {
            return Err(invalid_option("maxAttempts", "must be at least 1"));
        }
        if self.legend_columns == 0 {
            return Err(invalid_option("legendColumns", "must be at least 1"));
        }
        positive("legendColumnWidth", self.legend_column_width)?;
        positive("legendLineHeight", self.legend_line_height)?;
        if let Some(zoomed) = self.zoomed_quadrant
            && zoomed >= QUADRANT_COUNT
        {
            return Err(invalid_option(
                "zoomedQuadrant",
                format!("{zoomed} is not a sector in 0..=3"),
            ));
        }
        let theme = &self.theme;
        for (field, color) in [
            ("theme.background", &theme.background),
            ("theme.gridColor", &theme.grid_color),
            ("theme.inactiveColor", &theme.inactive_color),
            ("theme.textColor", &theme.text_color),
            ("theme.blipTextColor", &theme.blip_text_color),
            ("theme.highlightColor", &theme.highlight_color),
        ] {
            if !COLOR_RE.is_match(color.trim()) {
                return Err(invalid_option(field, format!("{color:?} is not a color")));
            }
        }
        if let Some(radii) = &self.ring_radii {
            if radii.len() != ring_count {
                return Err(ConfigValidationError::RingRadiiCount {
                    expected: ring_count,
                    found: radii.len(),
                });
            }
            let mut previous = 0.0_f32;
            for (band, radius) in radii.iter().enumerate() {
                if !radius.is_finite() || *radius <= previous {
                    return Err(ConfigValidationError::ZeroWidthRing { band });
                }
                previous = *radius;
            }
        }
        Ok(())
    }
}

fn invalid_option(field: &'static str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidDisplayOption {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid_option(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid_option(field, format!("must not be negative, got {value}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarConfig {
    pub title: String,
    pub quadrants: Vec<Quadrant>,
    pub rings: Vec<Ring>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub display_options: DisplayOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RadarConfig {
    /// Checks every data model invariant, reporting the first violation.
    ///
    /// An empty ring list passes here; layout rejects it separately.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.quadrants.len() != QUADRANT_COUNT {
            return Err(ConfigValidationError::QuadrantCount {
                found: self.quadrants.len(),
            });
        }
        let quadrant_orders: Vec<usize> = self.quadrants.iter().map(|q| q.display_order).collect();
        if !is_permutation(&quadrant_orders) {
            return Err(ConfigValidationError::QuadrantOrder {
                orders: quadrant_orders,
            });
        }
        let ring_orders: Vec<usize> = self.rings.iter().map(|r| r.display_order).collect();
        if !is_permutation(&ring_orders) {
            return Err(ConfigValidationError::RingOrder {
                count: self.rings.len(),
                orders: ring_orders,
            });
        }
        for (idx, ring) in self.rings.iter().enumerate() {
            if !COLOR_RE.is_match(ring.color.trim()) {
                return Err(ConfigValidationError::InvalidColor {
                    ring: idx,
                    color: ring.color.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.quadrant_index >= self.quadrants.len() {
                return Err(ConfigValidationError::QuadrantIndexOutOfRange {
                    id: entry.id.clone(),
                    index: entry.quadrant_index,
                    count: self.quadrants.len(),
                });
            }
            if entry.ring_index >= self.rings.len() {
                return Err(ConfigValidationError::RingIndexOutOfRange {
                    id: entry.id.clone(),
                    index: entry.ring_index,
                    count: self.rings.len(),
                });
            }
            if !seen.insert(&entry.id) {
                return Err(ConfigValidationError::DuplicateEntryId {
                    id: entry.id.clone(),
                });
            }
        }

        if let Some(key) = self
            .extra
            .keys()
            .find(|key| RESERVED_KEYS.contains(&key.as_str()))
        {
            return Err(ConfigValidationError::ReservedExtraField { key: key.clone() });
        }

        self.display_options.validate(self.rings.len())
    }

    /// Sector (0 top-right, counter-clockwise) a quadrant is drawn in.
    pub fn sector_of(&self, quadrant_index: usize) -> Option<usize> {
        self.quadrants.get(quadrant_index).map(|q| q.display_order)
    }

    /// Band (0 innermost) a ring is drawn as.
    pub fn band_of(&self, ring_index: usize) -> Option<usize> {
        self.rings.get(ring_index).map(|r| r.display_order)
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// A small, valid radar used by the CLI `sample` command, benches and tests.
    pub fn sample() -> Self {
        let palette = Theme::ring_palette();
        let quadrants = ["Languages", "Infrastructure", "Datastores", "Data Management"]
            .iter()
            .enumerate()
            .map(|(idx, name)| Quadrant::new(*name, idx))
            .collect();
        let rings = ["ADOPT", "TRIAL", "ASSESS", "HOLD"]
            .iter()
            .enumerate()
            .map(|(idx, name)| Ring::new(*name, idx, palette[idx % palette.len()].clone()))
            .collect();
        let labels = [
            ("Rust", 0, 0, Moved::Up),
            ("Kotlin", 0, 1, Moved::Flat),
            ("Elm", 0, 3, Moved::Down),
            ("Kubernetes", 1, 0, Moved::None),
            ("Nix", 1, 2, Moved::Up),
            ("PostgreSQL", 2, 0, Moved::Flat),
            ("DuckDB", 2, 1, Moved::None),
            ("Cassandra", 2, 3, Moved::Down),
            ("dbt", 3, 1, Moved::None),
            ("Apache Iceberg", 3, 2, Moved::None),
        ];
        let entries = labels
            .iter()
            .enumerate()
            .map(|(idx, (label, quadrant, ring, moved))| {
                let mut entry = Entry::new(idx as i64 + 1, *label, *quadrant, *ring);
                entry.moved = *moved;
                entry.is_new = idx % 4 == 1;
                entry
            })
            .collect();
        Self {
            title: "Tech Radar".to_string(),
            quadrants,
            rings,
            entries,
            display_options: DisplayOptions::default(),
            extra: Map::new(),
        }
    }
}

fn is_permutation(orders: &[usize]) -> bool {
    let mut seen = vec![false; orders.len()];
    for order in orders {
        match seen.get_mut(*order) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_valid() {
        assert_eq!(RadarConfig::sample().validate(), Ok(()));
    }

    #[test]
    fn rejects_wrong_quadrant_count() {
        let mut config = RadarConfig::sample();
        config.quadrants.pop();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::QuadrantCount { found: 3 })
        );
    }

    #[test]
    fn rejects_repeated_quadrant_order() {
        let mut config = RadarConfig::sample();
        config.quadrants[3].display_order = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::QuadrantOrder { .. })
        ));
    }

    #[test]
    fn rejects_gap_in_ring_order() {
        let mut config = RadarConfig::sample();
        config.rings[2].display_order = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::RingOrder { count: 4, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut config = RadarConfig::sample();
        config.entries[0].ring_index = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::RingIndexOutOfRange { index: 4, count: 4, .. })
        ));

        let mut config = RadarConfig::sample();
        config.entries[0].quadrant_index = 9;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::QuadrantIndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut config = RadarConfig::sample();
        config.entries[3].id = config.entries[0].id.clone();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicateEntryId {
                id: EntryId::Number(1)
            })
        );
    }

    #[test]
    fn numeric_and_text_ids_are_distinct() {
        let mut config = RadarConfig::sample();
        config.entries[1].id = EntryId::Text("1".to_string());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn color_forms() {
        let mut config = RadarConfig::sample();
        for color in ["#abc", "#A1B2C3", "rgb(1, 2, 3)", "hsla(10, 50%, 50%, 0.4)", "teal"] {
            config.rings[0].color = color.to_string();
            assert_eq!(config.validate(), Ok(()), "{color}");
        }
        config.rings[0].color = "#12".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidColor { ring: 0, .. })
        ));
    }

    #[test]
    fn zero_width_ring_radii_rejected() {
        let mut config = RadarConfig::sample();
        config.display_options.ring_radii = Some(vec![100.0, 200.0, 200.0, 400.0]);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroWidthRing { band: 2 })
        );

        config.display_options.ring_radii = Some(vec![0.0, 200.0, 300.0, 400.0]);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroWidthRing { band: 0 })
        );

        config.display_options.ring_radii = Some(vec![100.0, 200.0]);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::RingRadiiCount {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn display_option_bounds() {
        let mut config = RadarConfig::sample();
        config.display_options.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDisplayOption { field: "maxAttempts", .. })
        ));

        let mut config = RadarConfig::sample();
        config.display_options.zoomed_quadrant = Some(4);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDisplayOption { field: "zoomedQuadrant", .. })
        ));
    }

    #[test]
    fn rejects_extra_fields_that_shadow_radar_fields() {
        let mut config = RadarConfig::sample();
        config
            .extra
            .insert("owner".to_string(), Value::from("platform"));
        assert_eq!(config.validate(), Ok(()));

        config
            .extra
            .insert("title".to_string(), Value::from("shadow"));
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ReservedExtraField {
                key: "title".to_string()
            })
        );
    }

    #[test]
    fn rejects_theme_colors_that_are_not_colors() {
        let mut config = RadarConfig::sample();
        config.display_options.theme.highlight_color =
            "red}</style><script>alert(1)</script><style>".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDisplayOption {
                field: "theme.highlightColor",
                ..
            })
        ));

        let mut config = RadarConfig::sample();
        config.display_options.theme.background = "rgb(</style>)".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDisplayOption {
                field: "theme.background",
                ..
            })
        ));

        let mut config = RadarConfig::sample();
        config.display_options.theme.grid_color = "rgba(0, 0, 0, 50%)".to_string();
        config.display_options.theme.text_color = "hsl(210deg 20% 15%)".to_string();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn empty_ring_list_passes_validation() {
        let mut config = RadarConfig::sample();
        config.rings.clear();
        config.entries.clear();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn moved_accepts_legacy_numbers() {
        let moved: Vec<Moved> = serde_json::from_str(r#"["up", -1, 0, 1, "none"]"#).unwrap();
        assert_eq!(
            moved,
            vec![Moved::Up, Moved::Down, Moved::Flat, Moved::Up, Moved::None]
        );
        assert!(serde_json::from_str::<Moved>("2").is_err());
        assert!(serde_json::from_str::<Moved>(r#""sideways""#).is_err());
    }

    #[test]
    fn sector_and_band_follow_display_order() {
        let mut config = RadarConfig::sample();
        config.quadrants[0].display_order = 2;
        config.quadrants[2].display_order = 0;
        assert_eq!(config.sector_of(0), Some(2));
        assert_eq!(config.band_of(3), Some(3));
        assert_eq!(config.sector_of(4), None);
    }
}
