use std::collections::{BTreeMap, BTreeSet};

use super::{ElementId, Label, Marker, RingCircle, Surface, Viewport, Wedge};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Wedge(Wedge),
    Ring(RingCircle),
    Marker(Marker),
    Label(Label),
}

/// Headless surface that keeps every draw call and binding, used by tests
/// and by hosts that paint with their own toolkit.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    viewport: Option<Viewport>,
    ops: Vec<DrawOp>,
    hover: BTreeMap<ElementId, Vec<ElementId>>,
    click: BTreeMap<ElementId, Vec<ElementId>>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Label(label) => Some(label),
            _ => None,
        })
    }

    /// Every element id currently drawn.
    pub fn element_ids(&self) -> BTreeSet<ElementId> {
        self.markers()
            .map(|marker| marker.id)
            .chain(self.labels().filter_map(|label| label.id))
            .collect()
    }

    pub fn binding_count(&self) -> usize {
        self.hover.values().map(Vec::len).sum::<usize>()
            + self.click.values().map(Vec::len).sum::<usize>()
    }

    /// Ids highlighted while the pointer rests on `id`: the element itself
    /// plus its hover targets. Empty when nothing is bound to `id`.
    pub fn hover(&self, id: ElementId) -> BTreeSet<ElementId> {
        highlighted(&self.hover, id)
    }

    pub fn click(&self, id: ElementId) -> BTreeSet<ElementId> {
        highlighted(&self.click, id)
    }
}

fn highlighted(bindings: &BTreeMap<ElementId, Vec<ElementId>>, id: ElementId) -> BTreeSet<ElementId> {
    match bindings.get(&id) {
        Some(targets) => std::iter::once(id).chain(targets.iter().copied()).collect(),
        None => BTreeSet::new(),
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, viewport: &Viewport) {
        self.viewport = Some(viewport.clone());
        self.ops.clear();
        self.hover.clear();
        self.click.clear();
        self.clears += 1;
    }

    fn draw_wedge(&mut self, wedge: &Wedge) {
        self.ops.push(DrawOp::Wedge(wedge.clone()));
    }

    fn draw_ring(&mut self, ring: &RingCircle) {
        self.ops.push(DrawOp::Ring(ring.clone()));
    }

    fn draw_marker(&mut self, marker: &Marker) {
        self.ops.push(DrawOp::Marker(marker.clone()));
    }

    fn draw_label(&mut self, label: &Label) {
        self.ops.push(DrawOp::Label(label.clone()));
    }

    fn bind_hover(&mut self, source: ElementId, targets: &[ElementId]) {
        self.hover.entry(source).or_default().extend_from_slice(targets);
    }

    fn bind_click(&mut self, source: ElementId, targets: &[ElementId]) {
        self.click.entry(source).or_default().extend_from_slice(targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::model::RadarConfig;
    use crate::render::{RenderOptions, render_geometry};

    fn sample() -> RadarConfig {
        let mut config = RadarConfig::sample();
        config.display_options.fast_text_metrics = true;
        config
    }

    #[test]
    fn bindings_go_both_ways() {
        let config = sample();
        let geometry = compute_layout(&config).unwrap();
        let mut surface = RecordingSurface::new();
        render_geometry(&geometry, &mut surface, &RenderOptions::default());

        for blip in &geometry.blips {
            let blip_id = ElementId::Blip(blip.number);
            let legend_id = ElementId::Legend(blip.number);
            let expected: BTreeSet<ElementId> = [blip_id, legend_id].into_iter().collect();
            assert_eq!(surface.hover(blip_id), expected);
            assert_eq!(surface.hover(legend_id), expected);
            assert_eq!(surface.click(blip_id), expected);
            assert_eq!(surface.click(legend_id), expected);
        }
        assert_eq!(surface.binding_count(), geometry.blips.len() * 4);
    }

    #[test]
    fn rerender_replaces_elements_and_bindings() {
        let mut config = sample();
        let geometry = compute_layout(&config).unwrap();
        let mut surface = RecordingSurface::new();
        render_geometry(&geometry, &mut surface, &RenderOptions::default());
        assert!(surface.element_ids().contains(&ElementId::Blip(10)));

        config.entries.truncate(3);
        let geometry = compute_layout(&config).unwrap();
        render_geometry(&geometry, &mut surface, &RenderOptions::default());

        assert_eq!(surface.clear_count(), 2);
        let ids = surface.element_ids();
        assert!(!ids.contains(&ElementId::Blip(4)));
        assert!(!ids.contains(&ElementId::Legend(4)));
        assert!(surface.hover(ElementId::Blip(4)).is_empty());
        assert_eq!(surface.binding_count(), 3 * 4);
    }

    #[test]
    fn markers_without_legend_highlight_themselves() {
        let mut config = sample();
        config.display_options.print_layout = false;
        let geometry = compute_layout(&config).unwrap();
        assert!(geometry.legend_rows().next().is_none());
        let mut surface = RecordingSurface::new();
        render_geometry(&geometry, &mut surface, &RenderOptions::default());

        let first = geometry.blip(1).unwrap();
        let marker = ElementId::Blip(first.number);
        let only_marker: BTreeSet<ElementId> = [marker].into_iter().collect();
        assert_eq!(surface.hover(marker), only_marker);
        assert_eq!(surface.click(marker), only_marker);
        assert_eq!(surface.binding_count(), 0);
    }

    #[test]
    fn unbound_ids_highlight_nothing() {
        let surface = RecordingSurface::new();
        assert!(surface.hover(ElementId::Blip(1)).is_empty());
        assert!(surface.click(ElementId::Legend(1)).is_empty());
    }
}
