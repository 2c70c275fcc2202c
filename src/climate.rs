use rayon::prelude::*;

use crate::config::TemperatureRange;
use crate::grid::Grid;
use crate::noise::{octave_sum, Octave};
use crate::rng::{seed_u32, Rng};
use crate::terrain::TerrainType;

const SALT_MOISTURE: u64 = 0xC11_CAFE_0002;
const SALT_RIVER_RINGS: u64 = 0xC11_CAFE_0003;

const MOISTURE_OCTAVES: [Octave; 1] = [Octave { freq: 3.0, weight: 1.0 }];
/// Noise moisture scale at the waterline.
const BASE_MOISTURE: f32 = 500.0;
/// Humidity a lowland river adds to its outermost ring.
const RIVER_HUMIDITY: f32 = 15.0;
/// Warmth added over the shallowest seas.
const SHALLOW_SEA_WARMTH: f32 = 10.0;

/// Altitude above sea level scaled to [0, 1] (negative below sea level).
#[inline]
fn altitude_ratio(v: u8, sealevel: u8) -> f32 {
    (v as f32 - sealevel as f32) / (255.0 - sealevel as f32).max(1.0)
}

/// 0 at the poles (first and last rows), 1 on the equator row.
#[inline]
fn latitude_ratio(y: usize, h: usize) -> f32 {
    let r = y as f32 / h as f32;
    if r < 0.5 { r / 0.5 } else { (1.0 - r) / 0.5 }
}

/// Temperature from latitude radiation plus an altitude term:
/// - radiation runs linearly from `range.min` at the poles to `range.max` at the equator
/// - seas are up to 10 warmer the shallower they are
/// - land starts 10 warmer at the shoreline and loses `cooling` towards the peak height
pub fn compute_temperature(
    water: &Grid<u8>,
    sealevel: u8,
    range: TemperatureRange,
    cooling: f32,
) -> Grid<f32> {
    let h = water.h;
    let mut temp = Grid::new(water.w, h);

    temp.data.par_chunks_mut(h).enumerate().for_each(|(x, col)| {
        for (y, out) in col.iter_mut().enumerate() {
            let radiation = (range.max - range.min) * latitude_ratio(y, h) + range.min;
            let v = water.get(x, y);
            let altitude = v as i32 - sealevel as i32;
            let local = if altitude < 0 {
                (1.0 - altitude.unsigned_abs() as f32 / sealevel as f32) * SHALLOW_SEA_WARMTH
            } else {
                SHALLOW_SEA_WARMTH - altitude_ratio(v, sealevel) * cooling
            };
            *out = radiation + local;
        }
    });

    temp
}

/// Cells inside the disc of `radius` around (cx, cy), clipped to the map.
fn disc(cx: usize, cy: usize, radius: i32, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    let (cx, cy) = (cx as i64, cy as i64);
    let r = radius as i64;
    let x0 = (cx - r).max(0);
    let x1 = (cx + r).min(w as i64);
    let y0 = (cy - r).max(0);
    let y1 = (cy + r).min(h as i64);
    (x0..x1).flat_map(move |x| {
        (y0..y1).filter_map(move |y| {
            let (dx, dy) = (x - cx, y - cy);
            ((dx * dx + dy * dy) as f64 <= (r * r) as f64).then_some((x as usize, y as usize))
        })
    })
}

/// Moisture: noise damped with altitude, plus humidity rings around every
/// river cell, then zeroed over sea, coast and lakes.
pub fn compute_moisture(
    height: &Grid<u8>,
    terrain: &Grid<TerrainType>,
    sealevel: u8,
    seed: u64,
) -> Grid<f32> {
    let (w, h) = (height.w, height.h);
    let noise_seed = seed_u32(seed, SALT_MOISTURE);
    let mut moisture = Grid::new(w, h);

    moisture.data.par_chunks_mut(h).enumerate().for_each(|(x, col)| {
        let nx = x as f32 / w as f32 - 0.5;
        for (y, out) in col.iter_mut().enumerate() {
            let i = x * h + y;
            if terrain.data[i].is_oceanic() {
                continue;
            }
            let ny = y as f32 / h as f32 - 0.5;
            let noise = (octave_sum(nx, ny, noise_seed, &MOISTURE_OCTAVES) + 1.0) / 2.0;
            let inland = altitude_ratio(height.data[i], sealevel).clamp(0.0, 1.0);
            *out = noise * (1.0 - inland) * BASE_MOISTURE;
        }
    });

    // Rings draw from one sequential stream, so rivers go in index order.
    let mut rng = Rng::new(seed ^ SALT_RIVER_RINGS);
    let mut rivers = 0usize;
    for i in 0..terrain.len() {
        if terrain.data[i] != TerrainType::River {
            continue;
        }
        rivers += 1;
        let (x, y) = terrain.xy(i);
        let inland = altitude_ratio(height.data[i], sealevel).clamp(0.0, 1.0);
        let add = (1.0 - inland) * RIVER_HUMIDITY;
        let rings = [
            (rng.spread(15, 10), add),
            (rng.spread(5, 10), add * 2.0),
            (rng.spread(5, 5), add * 3.0),
        ];
        for (radius, amount) in rings {
            for (rx, ry) in disc(x, y, radius, w, h) {
                moisture.data[rx * h + ry] += amount;
            }
        }
    }
    log::debug!("moisture: {rivers} river cells diffused");

    for (m, t) in moisture.data.iter_mut().zip(&terrain.data) {
        if t.is_water() {
            *m = 0.0;
        }
    }

    moisture
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: TemperatureRange = TemperatureRange { min: -50.0, max: 19.0 };

    #[test]
    fn equator_is_warmer_than_poles() {
        let water = Grid::filled(4, 20, 120u8);
        let t = compute_temperature(&water, 100, RANGE, 30.0);
        assert!(t.get(0, 10) > t.get(0, 0));
        assert!(t.get(0, 10) > t.get(0, 19));
        // pole row: radiation is the floor
        let land = 10.0 - (20.0 / 155.0) * 30.0;
        assert!((t.get(0, 0) - (-50.0 + land)).abs() < 1e-4);
    }

    #[test]
    fn altitude_cools_land_and_shallow_seas_warm() {
        let mut water = Grid::filled(3, 1, 100u8);
        water.set(1, 0, 255);
        water.set(2, 0, 50);
        let t = compute_temperature(&water, 100, RANGE, 30.0);
        // same latitude row, so only the altitude term differs
        assert!((t.get(0, 0) - t.get(1, 0) - 30.0).abs() < 1e-4);
        assert!((t.get(0, 0) - t.get(2, 0) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn water_is_dry_and_rivers_humidify() {
        let (w, h) = (40, 40);
        let height = Grid::filled(w, h, 110u8);
        let mut terrain = Grid::filled(w, h, TerrainType::Land);
        terrain.set(0, 0, TerrainType::Ocean);
        terrain.set(39, 39, TerrainType::Lake);
        let dry = compute_moisture(&height, &terrain, 100, 4);

        terrain.set(20, 20, TerrainType::River);
        let wet = compute_moisture(&height, &terrain, 100, 4);

        assert_eq!(wet.get(0, 0), 0.0);
        assert_eq!(wet.get(39, 39), 0.0);
        assert!(wet.get(21, 20) > dry.get(21, 20));
        assert!(wet.data.iter().all(|&m| m >= 0.0));
    }

    #[test]
    fn disc_is_clipped() {
        let cells: Vec<_> = disc(0, 0, 3, 10, 10).collect();
        assert!(cells.iter().all(|&(x, y)| x < 3 && y < 3));
        assert!(cells.contains(&(0, 0)));
    }
}
