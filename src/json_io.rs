//! Config exchange: JSON export, validating import and field-level merge.
//!
//! Import is the validation boundary. Anything that is not well-formed JSON
//! is a [`ParseError`]; well-formed JSON with the wrong shape or broken
//! invariants is a [`ConfigValidationError`]. Nothing is coerced.
//!
//! Unknown top-level keys are preserved through a round trip. Unknown keys
//! nested inside quadrants, rings, entries or `displayOptions` are dropped.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigValidationError, ParseError, RadarError};
use crate::model::{Entry, EntryId, Quadrant, RadarConfig, Ring};

/// A partial config document, as produced by an import that only carries
/// some of the fields (for example entries only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrants: Option<Vec<Quadrant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rings: Option<Vec<Ring>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.quadrants.is_none()
            && self.rings.is_none()
            && self.entries.is_none()
            && self.display_options.is_none()
            && self.extra.is_empty()
    }
}

impl From<&RadarConfig> for ConfigPatch {
    fn from(config: &RadarConfig) -> Self {
        Self {
            title: Some(config.title.clone()),
            quadrants: Some(config.quadrants.clone()),
            rings: Some(config.rings.clone()),
            entries: Some(config.entries.clone()),
            display_options: serde_json::to_value(&config.display_options).ok(),
            extra: config.extra.clone(),
        }
    }
}

pub fn export_config(config: &RadarConfig) -> Result<String, RadarError> {
    serde_json::to_string_pretty(config).map_err(|err| RadarError::Export(err.to_string()))
}

pub fn import_config(text: &str) -> Result<RadarConfig, RadarError> {
    let config: RadarConfig = serde_json::from_str(text).map_err(|err| classify(err, text))?;
    config.validate()?;
    debug!(
        entries = config.entries.len(),
        rings = config.rings.len(),
        "imported radar config"
    );
    Ok(config)
}

/// Parses a partial document. Invariants are checked once it is merged.
pub fn parse_patch(text: &str) -> Result<ConfigPatch, RadarError> {
    let patch: ConfigPatch = serde_json::from_str(text).map_err(|err| classify(err, text))?;
    if let Some(display) = &patch.display_options
        && !display.is_object()
    {
        return Err(ConfigValidationError::InvalidDisplayOption {
            field: "displayOptions",
            reason: "must be an object".to_string(),
        }
        .into());
    }
    Ok(patch)
}

/// Builds a new config from `base` with every field present in `patch`
/// taking precedence.
///
/// Entries merge by id: a patch entry replaces the base entry with the same
/// id in place, new ids are appended in patch order, base-only ids stay.
/// `displayOptions` and unknown top-level keys merge deeply: objects recurse,
/// arrays and scalars replace. `quadrants` and `rings` replace wholesale.
pub fn merge_configs(
    base: &RadarConfig,
    patch: &ConfigPatch,
) -> Result<RadarConfig, ConfigValidationError> {
    let mut merged = base.clone();

    if let Some(title) = &patch.title {
        merged.title = title.clone();
    }
    if let Some(quadrants) = &patch.quadrants {
        merged.quadrants = quadrants.clone();
    }
    if let Some(rings) = &patch.rings {
        merged.rings = rings.clone();
    }
    if let Some(entries) = &patch.entries {
        merged.entries = merge_entries(&base.entries, entries)?;
    }
    if let Some(display) = &patch.display_options {
        let mut value = serde_json::to_value(&base.display_options).map_err(shape_error)?;
        deep_merge(&mut value, display);
        merged.display_options = serde_json::from_value(value).map_err(shape_error)?;
    }
    for (key, value) in &patch.extra {
        match merged.extra.get_mut(key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                merged.extra.insert(key.clone(), value.clone());
            }
        }
    }

    merged.validate()?;
    debug!(
        base_entries = base.entries.len(),
        merged_entries = merged.entries.len(),
        "merged radar config"
    );
    Ok(merged)
}

fn merge_entries(base: &[Entry], imported: &[Entry]) -> Result<Vec<Entry>, ConfigValidationError> {
    let mut seen = HashSet::new();
    for entry in imported {
        if !seen.insert(&entry.id) {
            return Err(ConfigValidationError::DuplicateEntryId {
                id: entry.id.clone(),
            });
        }
    }

    let mut pending: HashMap<&EntryId, &Entry> =
        imported.iter().map(|entry| (&entry.id, entry)).collect();
    let mut merged: Vec<Entry> = base
        .iter()
        .map(|entry| match pending.remove(&entry.id) {
            Some(replacement) => replacement.clone(),
            None => entry.clone(),
        })
        .collect();
    merged.extend(
        imported
            .iter()
            .filter(|entry| pending.contains_key(&entry.id))
            .cloned(),
    );
    Ok(merged)
}

/// Objects merge key by key; anything else in `patch` replaces `target`.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match target_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

fn classify(err: serde_json::Error, text: &str) -> RadarError {
    match err.classify() {
        Category::Data => shape_error(err).into(),
        Category::Syntax | Category::Eof | Category::Io => ParseError {
            reason: err.to_string(),
            line: err.line(),
            column: err.column(),
            text: text.to_string(),
        }
        .into(),
    }
}

fn shape_error(err: serde_json::Error) -> ConfigValidationError {
    ConfigValidationError::Shape {
        reason: err.to_string(),
        line: err.line(),
        column: err.column(),
    }
}
