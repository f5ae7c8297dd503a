use std::collections::BTreeMap;
use std::f32::consts::PI;

use crate::layout::MarkerKind;

use super::{ElementId, Label, Marker, RingCircle, Surface, Viewport, Wedge};

const HIGHLIGHT_SCRIPT: &str = r#"(function () {
  function ids(el, attr) {
    var value = el.getAttribute(attr);
    return value ? value.split(" ") : [];
  }
  function toggle(list, cls, on) {
    list.forEach(function (id) {
      var target = document.getElementById(id);
      if (target) { target.classList.toggle(cls, on); }
    });
  }
  document.querySelectorAll("[data-hover]").forEach(function (el) {
    var targets = ids(el, "data-hover");
    el.addEventListener("mouseenter", function () { toggle(targets.concat([el.id]), "radar-highlight", true); });
    el.addEventListener("mouseleave", function () { toggle(targets.concat([el.id]), "radar-highlight", false); });
  });
  document.querySelectorAll("[data-click]").forEach(function (el) {
    var targets = ids(el, "data-click");
    el.addEventListener("click", function () { toggle(targets.concat([el.id]), "radar-selected"); });
  });
})();"#;

struct Element {
    id: Option<ElementId>,
    markup: String,
}

/// Builds a standalone SVG document. With `interactive` on, bound elements
/// carry `data-hover`/`data-click` attributes and the document embeds a
/// small script that toggles highlight classes.
pub struct SvgSurface {
    interactive: bool,
    viewport: Option<Viewport>,
    elements: Vec<Element>,
    hover: BTreeMap<ElementId, Vec<ElementId>>,
    click: BTreeMap<ElementId, Vec<ElementId>>,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            interactive: true,
            viewport: None,
            elements: Vec::new(),
            hover: BTreeMap::new(),
            click: BTreeMap::new(),
        }
    }

    /// Static output: no data attributes, style or script.
    pub fn without_interaction(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let Some(viewport) = &self.viewport else {
            return "<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string();
        };
        let view_box = viewport.view_box;
        let out_width = view_box.width.min(viewport.width);
        let out_height = view_box.height.min(viewport.height);

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_width:.2}\" height=\"{out_height:.2}\" viewBox=\"{:.2} {:.2} {:.2} {:.2}\" font-family=\"{}\">",
            view_box.x,
            view_box.y,
            view_box.width,
            view_box.height,
            escape_xml(&viewport.font_family)
        ));

        if self.interactive {
            svg.push_str("<style>");
            svg.push_str(".radar-item{cursor:pointer}");
            svg.push_str(&format!(
                ".radar-highlight text,.radar-selected text{{font-weight:bold;fill:{color}}}.radar-highlight .radar-marker,.radar-selected .radar-marker{{stroke:{color};stroke-width:3}}",
                color = css_value(&viewport.highlight_color)
            ));
            svg.push_str("</style>");
        }

        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            view_box.x,
            view_box.y,
            view_box.width,
            view_box.height,
            escape_xml(&viewport.background)
        ));

        for element in &self.elements {
            match element.id {
                Some(id) => {
                    svg.push_str(&format!("<g id=\"{id}\" class=\"radar-item\""));
                    if self.interactive {
                        push_binding_attr(&mut svg, "data-hover", self.hover.get(&id));
                        push_binding_attr(&mut svg, "data-click", self.click.get(&id));
                    }
                    svg.push('>');
                    svg.push_str(&element.markup);
                    svg.push_str("</g>");
                }
                None => svg.push_str(&element.markup),
            }
        }

        if self.interactive && !(self.hover.is_empty() && self.click.is_empty()) {
            svg.push_str("<script><![CDATA[");
            svg.push_str(HIGHLIGHT_SCRIPT);
            svg.push_str("]]></script>");
        }

        svg.push_str("</svg>");
        svg
    }

    pub fn into_svg(self) -> String {
        self.to_svg()
    }

    fn push(&mut self, id: Option<ElementId>, markup: String) {
        self.elements.push(Element { id, markup });
    }
}

fn push_binding_attr(svg: &mut String, name: &str, targets: Option<&Vec<ElementId>>) {
    let Some(targets) = targets else {
        return;
    };
    let joined = targets
        .iter()
        .map(ElementId::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(" {name}=\"{joined}\""));
}

impl Surface for SvgSurface {
    fn clear(&mut self, viewport: &Viewport) {
        self.viewport = Some(viewport.clone());
        self.elements.clear();
        self.hover.clear();
        self.click.clear();
    }

    fn draw_wedge(&mut self, wedge: &Wedge) {
        let d = wedge_path(wedge);
        self.push(
            None,
            format!(
                "<path d=\"{d}\" fill=\"{}\" fill-opacity=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
                escape_xml(&wedge.fill),
                wedge.fill_opacity,
                escape_xml(&wedge.stroke)
            ),
        );
    }

    fn draw_ring(&mut self, ring: &RingCircle) {
        self.push(
            None,
            format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>",
                ring.center.0,
                ring.center.1,
                ring.radius,
                escape_xml(&ring.stroke)
            ),
        );
    }

    fn draw_marker(&mut self, marker: &Marker) {
        let mut markup = String::new();
        if let Some(link) = &marker.link {
            let target = if link.new_tab { " target=\"_blank\"" } else { "" };
            markup.push_str(&format!(
                "<a href=\"{href}\" xlink:href=\"{href}\"{target}>",
                href = escape_xml(&link.href)
            ));
        }
        markup.push_str(&format!("<title>{}</title>", escape_xml(&marker.tooltip)));
        markup.push_str(&marker_shape(marker));
        markup.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\" pointer-events=\"none\">{}</text>",
            marker.x,
            marker.y + marker.font_size / 3.0,
            marker.font_size,
            escape_xml(&marker.text_color),
            marker.number
        ));
        if marker.link.is_some() {
            markup.push_str("</a>");
        }
        self.push(Some(marker.id), markup);
    }

    fn draw_label(&mut self, label: &Label) {
        let anchor = &label.anchor;
        let weight = if anchor.bold { " font-weight=\"bold\"" } else { "" };
        self.push(
            label.id,
            format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{}\"{weight} fill=\"{}\">{}</text>",
                anchor.x,
                anchor.y,
                anchor.align.as_svg(),
                anchor.font_size,
                escape_xml(&label.color),
                escape_xml(&anchor.text)
            ),
        );
    }

    fn bind_hover(&mut self, source: ElementId, targets: &[ElementId]) {
        self.hover.entry(source).or_default().extend_from_slice(targets);
    }

    fn bind_click(&mut self, source: ElementId, targets: &[ElementId]) {
        self.click.entry(source).or_default().extend_from_slice(targets);
    }
}

fn screen_point(center: (f32, f32), radius: f32, angle: f32) -> (f32, f32) {
    (
        center.0 + radius * angle.cos(),
        center.1 - radius * angle.sin(),
    )
}

fn wedge_path(wedge: &Wedge) -> String {
    let outer_start = screen_point(wedge.center, wedge.outer_radius, wedge.start_angle);
    let outer_end = screen_point(wedge.center, wedge.outer_radius, wedge.end_angle);
    let large_arc = if wedge.end_angle - wedge.start_angle > PI { 1 } else { 0 };
    let mut d = format!(
        "M {:.2} {:.2} A {r:.2} {r:.2} 0 {large_arc} 0 {:.2} {:.2}",
        outer_start.0,
        outer_start.1,
        outer_end.0,
        outer_end.1,
        r = wedge.outer_radius
    );
    if wedge.inner_radius > 0.0 {
        let inner_end = screen_point(wedge.center, wedge.inner_radius, wedge.end_angle);
        let inner_start = screen_point(wedge.center, wedge.inner_radius, wedge.start_angle);
        d.push_str(&format!(
            " L {:.2} {:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {:.2} {:.2}",
            inner_end.0,
            inner_end.1,
            inner_start.0,
            inner_start.1,
            r = wedge.inner_radius
        ));
    } else {
        d.push_str(&format!(" L {:.2} {:.2}", wedge.center.0, wedge.center.1));
    }
    d.push_str(" Z");
    d
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn marker_shape(marker: &Marker) -> String {
    let (x, y, r) = (marker.x, marker.y, marker.radius);
    let fill = escape_xml(&marker.fill);
    match marker.kind {
        MarkerKind::Circle => format!(
            "<circle class=\"radar-marker\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{r:.2}\" fill=\"{fill}\"/>"
        ),
        MarkerKind::TriangleUp => format!(
            "<polygon class=\"radar-marker\" points=\"{}\" fill=\"{fill}\"/>",
            points_attr(&[
                (x, y - r * 1.3),
                (x - r * 1.2, y + r * 0.9),
                (x + r * 1.2, y + r * 0.9)
            ])
        ),
        MarkerKind::TriangleDown => format!(
            "<polygon class=\"radar-marker\" points=\"{}\" fill=\"{fill}\"/>",
            points_attr(&[
                (x, y + r * 1.3),
                (x - r * 1.2, y - r * 0.9),
                (x + r * 1.2, y - r * 0.9)
            ])
        ),
        MarkerKind::Star => {
            let points: Vec<(f32, f32)> = (0..10)
                .map(|idx| {
                    let radius = if idx % 2 == 0 { r * 1.4 } else { r * 0.65 };
                    let angle = PI / 2.0 + idx as f32 * PI / 5.0;
                    screen_point((x, y), radius, angle)
                })
                .collect();
            format!(
                "<polygon class=\"radar-marker\" points=\"{}\" fill=\"{fill}\"/>",
                points_attr(&points)
            )
        }
    }
}

/// Keeps only characters a color value needs inside a `<style>` block.
fn css_value(input: &str) -> String {
    input
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || " #(),.%/+-".contains(*ch))
        .collect()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
