use rayon::prelude::*;

use crate::config::WorldShape;
use crate::grid::Grid;
use crate::noise::{octave_sum, Octave};
use crate::rng::seed_u32;

const SALT_HEIGHT: u64 = 0x4E16_47AA_0001;

const HEIGHT_OCTAVES: [Octave; 5] = [
    Octave { freq: 2.5, weight: 0.35 },
    Octave { freq: 5.0, weight: 0.30 },
    Octave { freq: 10.0, weight: 0.20 },
    Octave { freq: 20.0, weight: 0.10 },
    Octave { freq: 40.0, weight: 0.05 },
];

/// Falloff `1 - B * d^C` pushes land towards the middle of the map.
const FALLOFF_B: f32 = 1.8;
const FALLOFF_C: f32 = 2.2;

/// Normalized distance of (x, y) from the grid center for the given shape.
/// 1.0 at the corners for freeform, at the nearest side for circle, on the
/// border for rectangle.
fn shape_distance(shape: WorldShape, x: usize, y: usize, w: usize, h: usize) -> f32 {
    let half_w = (w as f32 / 2.0).max(0.5);
    let half_h = (h as f32 / 2.0).max(0.5);
    let dx = x as f32 + 0.5 - w as f32 / 2.0;
    let dy = y as f32 + 0.5 - h as f32 / 2.0;
    match shape {
        WorldShape::Freeform => {
            (dx * dx + dy * dy).sqrt() / (half_w * half_w + half_h * half_h).sqrt()
        }
        WorldShape::Circle => (dx * dx + dy * dy).sqrt() / half_w.min(half_h),
        WorldShape::Rectangle => (dx.abs() / half_w).max(dy.abs() / half_h),
    }
}

/// Island falloff multiplier. `power` 2 is neutral; higher powers shrink
/// `d` inside the shape and grow it outside, giving larger and more regular land.
#[inline]
fn falloff(d: f32, power: f32) -> f32 {
    let d = d.powf(power / 2.0);
    1.0 - FALLOFF_B * d.powf(FALLOFF_C)
}

/// Quantized elevation per cell from five noise octaves and a shape falloff.
pub fn synthesize_heightmap(
    w: usize,
    h: usize,
    seed: u64,
    shape: WorldShape,
    shape_power: f32,
) -> Grid<u8> {
    let noise_seed = seed_u32(seed, SALT_HEIGHT);
    let mut height = Grid::new(w, h);

    height.data.par_chunks_mut(h).enumerate().for_each(|(x, col)| {
        let nx = x as f32 / w as f32 - 0.5;
        for (y, out) in col.iter_mut().enumerate() {
            let ny = y as f32 / h as f32 - 0.5;
            let value = (octave_sum(nx, ny, noise_seed, &HEIGHT_OCTAVES) + 1.0) / 2.0;
            let d = shape_distance(shape, x, y, w, h);
            let v = value * falloff(d, shape_power);
            *out = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    });

    height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_heightmap() {
        let a = synthesize_heightmap(48, 32, 7, WorldShape::Freeform, 2.0);
        let b = synthesize_heightmap(48, 32, 7, WorldShape::Freeform, 2.0);
        assert_eq!(a, b);
        let c = synthesize_heightmap(48, 32, 8, WorldShape::Freeform, 2.0);
        assert_ne!(a, c);
    }

    #[test]
    fn corners_sink_below_center() {
        let g = synthesize_heightmap(64, 64, 3, WorldShape::Freeform, 2.0);
        // d ~ 1 at the corners: 1 - 1.8 < 0, clamped to 0
        assert_eq!(g.get(0, 0), 0);
        assert_eq!(g.get(63, 63), 0);
    }

    #[test]
    fn shape_distances() {
        assert!(shape_distance(WorldShape::Rectangle, 0, 10, 20, 20) > 0.9);
        assert!(shape_distance(WorldShape::Circle, 10, 10, 20, 20) < 0.1);
        let corner = shape_distance(WorldShape::Freeform, 0, 0, 40, 20);
        assert!((corner - 1.0).abs() < 0.05);
    }

    #[test]
    fn higher_power_grows_land() {
        assert!(falloff(0.5, 4.0) > falloff(0.5, 2.0));
        assert!(falloff(0.5, 1.0) < falloff(0.5, 2.0));
    }
}
