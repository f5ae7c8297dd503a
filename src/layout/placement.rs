use tracing::trace;

use crate::model::EntryId;
use crate::model::QUADRANT_COUNT;

use super::rings::polar_to_screen;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable per-entry seed (FNV-1a over the id's text form), independent of
/// the standard library's hasher so layouts match across builds.
pub(super) fn seed_for(id: &EntryId) -> u64 {
    let tag: u8 = match id {
        EntryId::Number(_) => b'n',
        EntryId::Text(_) => b's',
    };
    let mut hash = FNV_OFFSET;
    for byte in std::iter::once(tag).chain(id.to_string().bytes()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

pub(super) struct BlipRng {
    state: u64,
}

impl BlipRng {
    pub(super) fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            0xA5A5_A5A5_5A5A_5A5A
        } else {
            seed
        };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)`.
    pub(super) fn next_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// One quadrant/ring intersection.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment {
    pub sector: usize,
    pub band: usize,
    pub inner: f32,
    pub outer: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Segment {
    fn padded_radii(&self, padding: f32) -> (f32, f32) {
        let lo = self.inner + padding;
        let hi = self.outer - padding;
        if lo > hi {
            let mid = (self.inner + self.outer) / 2.0;
            (mid, mid)
        } else {
            (lo, hi)
        }
    }

    /// Draws a polar point uniformly by area, kept `padding` away from the
    /// band edges and from both axes.
    fn sample(&self, rng: &mut BlipRng, padding: f32) -> (f32, f32) {
        let (lo, hi) = self.padded_radii(padding);
        let u = rng.next_unit();
        let v = rng.next_unit();
        let radius = (lo * lo + u * (hi * hi - lo * lo)).sqrt();
        let inset = if radius > 0.0 {
            (padding / radius).min(1.0).asin()
        } else {
            0.0
        };
        let span = self.end_angle - self.start_angle;
        let angle = if inset * 2.0 >= span {
            self.start_angle + span / 2.0
        } else {
            self.start_angle + inset + v * (span - inset * 2.0)
        };
        (radius, angle)
    }

    /// How many blips the segment holds while clearance stays reliable.
    pub(super) fn capacity(&self, padding: f32, clearance: f32) -> usize {
        if clearance <= 0.0 {
            return usize::MAX;
        }
        let (lo, hi) = self.padded_radii(padding);
        let span = self.end_angle - self.start_angle;
        let area = span / 2.0 * (hi * hi - lo * lo);
        (area / (4.0 * clearance * clearance)).floor().max(1.0) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Placement {
    pub x: f32,
    pub y: f32,
    pub attempts: u32,
    pub crowded: bool,
}

/// Places blips one at a time, rejecting candidates that land too close to a
/// blip already placed in the same sector.
pub(super) struct Placer {
    center: (f32, f32),
    padding: f32,
    clearance: f32,
    max_attempts: u32,
    placed: [Vec<(f32, f32)>; QUADRANT_COUNT],
}

impl Placer {
    pub(super) fn new(center: (f32, f32), padding: f32, clearance: f32, max_attempts: u32) -> Self {
        Self {
            center,
            padding,
            clearance,
            max_attempts: max_attempts.max(1),
            placed: Default::default(),
        }
    }

    pub(super) fn place(&mut self, segment: &Segment, seed: u64) -> Placement {
        let mut rng = BlipRng::new(seed);
        let mut attempts = 0;
        let mut point = self.center;
        let mut clear = false;
        while attempts < self.max_attempts {
            attempts += 1;
            let (radius, angle) = segment.sample(&mut rng, self.padding);
            point = polar_to_screen(self.center, radius, angle);
            if self.is_clear(segment.sector, point) {
                clear = true;
                break;
            }
            trace!(sector = segment.sector, attempts, "blip candidate rejected");
        }
        self.placed[segment.sector].push(point);
        Placement {
            x: point.0,
            y: point.1,
            attempts,
            crowded: !clear,
        }
    }

    fn is_clear(&self, sector: usize, point: (f32, f32)) -> bool {
        let min_sq = self.clearance * self.clearance;
        self.placed[sector].iter().all(|other| {
            let dx = other.0 - point.0;
            let dy = other.1 - point.1;
            dx * dx + dy * dy >= min_sq
        })
    }
}
