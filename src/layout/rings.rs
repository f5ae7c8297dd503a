use std::f32::consts::FRAC_PI_2;

use crate::model::DisplayOptions;

/// Outer radius of every band, innermost first.
///
/// Explicit `ringRadii` win; otherwise bands share the disc area evenly, so
/// band `k` of `n` ends at `radius * sqrt((k + 1) / n)`.
pub(super) fn band_radii(options: &DisplayOptions, band_count: usize) -> Vec<f32> {
    if let Some(radii) = &options.ring_radii {
        return radii.clone();
    }
    (0..band_count)
        .map(|band| options.radius * ((band + 1) as f32 / band_count as f32).sqrt())
        .collect()
}

/// Angular extent of a sector: 0 top-right, then counter-clockwise.
pub(super) fn sector_angles(sector: usize) -> (f32, f32) {
    let start = sector as f32 * FRAC_PI_2;
    (start, start + FRAC_PI_2)
}

/// Horizontal and vertical screen direction a sector opens towards.
pub(super) fn sector_signs(sector: usize) -> (f32, f32) {
    match sector {
        0 => (1.0, -1.0),
        1 => (-1.0, -1.0),
        2 => (-1.0, 1.0),
        _ => (1.0, 1.0),
    }
}

pub(super) fn polar_to_screen(center: (f32, f32), radius: f32, angle: f32) -> (f32, f32) {
    (
        center.0 + radius * angle.cos(),
        center.1 - radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_have_equal_area() {
        let options = DisplayOptions::default();
        let radii = band_radii(&options, 4);
        assert_eq!(radii.len(), 4);
        assert!((radii[3] - options.radius).abs() < 1e-3);
        let mut inner = 0.0_f32;
        let areas: Vec<f32> = radii
            .iter()
            .map(|outer| {
                let area = outer * outer - inner * inner;
                inner = *outer;
                area
            })
            .collect();
        for area in &areas {
            assert!((area - areas[0]).abs() / areas[0] < 1e-3, "{areas:?}");
        }
    }

    #[test]
    fn explicit_radii_are_used_verbatim() {
        let options = DisplayOptions {
            ring_radii: Some(vec![130.0, 220.0, 310.0, 400.0]),
            ..DisplayOptions::default()
        };
        assert_eq!(band_radii(&options, 4), vec![130.0, 220.0, 310.0, 400.0]);
    }

    #[test]
    fn top_right_sector_points_up_and_right() {
        let (start, end) = sector_angles(0);
        let mid = (start + end) / 2.0;
        let (x, y) = polar_to_screen((100.0, 100.0), 10.0, mid);
        assert!(x > 100.0 && y < 100.0);
        assert_eq!(sector_signs(0), (1.0, -1.0));

        let (start, end) = sector_angles(2);
        let (x, y) = polar_to_screen((100.0, 100.0), 10.0, (start + end) / 2.0);
        assert!(x < 100.0 && y > 100.0);
    }
}
