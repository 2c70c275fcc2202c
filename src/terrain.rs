use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, Grid, Topology};
use crate::hydrology::count_upstream;
use crate::stats::quantile;

/// Ocean cells shallower than this below sea level are coastal water.
const SHALLOW_DEPTH: i32 = 10;
/// Altitude quantile above which cells become mountains.
const MOUNTAIN_QUANTILE: f32 = 0.99;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    Ocean = 0,
    #[default]
    Land = 1,
    River = 2,
    Lake = 3,
    Coast = 4,
    Mountain = 5,
}

impl TerrainType {
    /// Open or shallow sea.
    pub fn is_oceanic(self) -> bool {
        matches!(self, TerrainType::Ocean | TerrainType::Coast)
    }

    /// Any standing water: sea, coastal water or lake.
    pub fn is_water(self) -> bool {
        matches!(self, TerrainType::Ocean | TerrainType::Coast | TerrainType::Lake)
    }
}

impl TryFrom<u8> for TerrainType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        Ok(match code {
            0 => TerrainType::Ocean,
            1 => TerrainType::Land,
            2 => TerrainType::River,
            3 => TerrainType::Lake,
            4 => TerrainType::Coast,
            5 => TerrainType::Mountain,
            _ => return Err(code),
        })
    }
}

pub struct Classification {
    pub terrain: Grid<TerrainType>,
    pub upstream: Grid<u32>,
    /// Upstream count a cell must exceed to be a river; `None` when no cell
    /// drains anything.
    pub river_threshold: Option<f32>,
}

/// Flood fill over cells at or below sea level, from every such edge cell.
/// Below-sea cells that cannot be reached this way are inland.
fn ocean_mask(topo: &Topology, height: &Grid<u8>, sealevel: u8) -> Vec<bool> {
    let mut ocean = vec![false; topo.len()];
    let mut queue = VecDeque::new();
    for i in 0..topo.len() {
        if topo.is_edge(i) && height.data[i] <= sealevel {
            ocean[i] = true;
            queue.push_back(i);
        }
    }
    while let Some(cell) = queue.pop_front() {
        for link in topo.neighbors(cell) {
            let n = link.cell as usize;
            if !ocean[n] && height.data[n] <= sealevel {
                ocean[n] = true;
                queue.push_back(n);
            }
        }
    }
    ocean
}

/// Ocean / Coast / Lake / River / Land labelling.
///
/// `river_quantile` picks the river cut among positive upstream counts
/// (0.9 keeps the top tenth).
pub fn classify_terrain(
    topo: &Topology,
    height: &Grid<u8>,
    water: &Grid<u8>,
    flow: &Grid<Direction>,
    sealevel: u8,
    river_quantile: f32,
) -> Classification {
    let n = topo.len();
    let ocean = ocean_mask(topo, height, sealevel);
    let lake: Vec<bool> = (0..n)
        .map(|i| !ocean[i] && water.data[i] > height.data[i])
        .collect();

    // Land cells touching sea or lake are the roots water drains into.
    let coastal: Vec<usize> = (0..n)
        .filter(|&i| {
            !ocean[i]
                && !lake[i]
                && topo
                    .neighbors(i)
                    .iter()
                    .any(|l| ocean[l.cell as usize] || lake[l.cell as usize])
        })
        .collect();

    let upstream = count_upstream(topo, flow, &coastal);

    let mut positive: Vec<f32> = upstream
        .data
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| c as f32)
        .collect();
    let river_threshold = quantile(&mut positive, river_quantile);
    log::info!("river threshold: {river_threshold:?}");

    let mut terrain = Grid::new(topo.w, topo.h);
    let mut ocean_cells = 0usize;
    for i in 0..n {
        terrain.data[i] = if ocean[i] {
            ocean_cells += 1;
            if (sealevel as i32 - water.data[i] as i32) < SHALLOW_DEPTH {
                TerrainType::Coast
            } else {
                TerrainType::Ocean
            }
        } else if lake[i] {
            TerrainType::Lake
        } else if river_threshold.is_some_and(|t| upstream.data[i] as f32 > t) {
            TerrainType::River
        } else {
            TerrainType::Land
        };
    }
    log::info!("ocean fraction: {:.3}", ocean_cells as f32 / n as f32);

    Classification {
        terrain,
        upstream,
        river_threshold,
    }
}

/// Reclassify the top altitude percentile (on the water surface) as Mountain,
/// whatever the cell was before.
pub fn overlay_mountains(terrain: &mut Grid<TerrainType>, water: &Grid<u8>, sealevel: u8) -> usize {
    let mut altitudes: Vec<f32> = water
        .data
        .iter()
        .map(|&v| v as f32 - sealevel as f32)
        .collect();
    let Some(threshold) = quantile(&mut altitudes, MOUNTAIN_QUANTILE) else {
        return 0;
    };

    let mut count = 0;
    for (t, &v) in terrain.data.iter_mut().zip(&water.data) {
        if v as f32 - sealevel as f32 >= threshold {
            *t = TerrainType::Mountain;
            count += 1;
        }
    }
    log::debug!("mountain threshold {threshold}, {count} cells");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::{remove_depressions, route_flow};

    fn classify(height: &Grid<u8>, sealevel: u8) -> (Grid<u8>, Classification) {
        let topo = Topology::new(height.w, height.h);
        let water = remove_depressions(&topo, height, 1.0);
        let flow = route_flow(&topo, &water);
        let c = classify_terrain(&topo, height, &water, &flow, sealevel, 0.9);
        (water, c)
    }

    #[test]
    fn flat_plain_above_sea_is_all_land() {
        let height = Grid::filled(4, 4, 100u8);
        let (water, c) = classify(&height, 50);
        assert_eq!(water, height);
        assert!(c.terrain.data.iter().all(|&t| t == TerrainType::Land));
        assert_eq!(c.river_threshold, None);
    }

    #[test]
    fn inland_basin_below_sea_is_a_lake() {
        // sea on the left edge, a walled pit in the middle of the land
        let mut height = Grid::filled(7, 7, 120u8);
        for y in 0..7 {
            height.set(0, y, 20);
        }
        height.set(4, 3, 30);
        let (_, c) = classify(&height, 50);

        assert_eq!(c.terrain.get(0, 3), TerrainType::Ocean);
        assert_eq!(c.terrain.get(4, 3), TerrainType::Lake);
        assert_eq!(c.terrain.get(6, 6), TerrainType::Land);
    }

    #[test]
    fn shallow_sea_is_coast() {
        let mut height = Grid::filled(6, 3, 120u8);
        for y in 0..3 {
            height.set(0, y, 45);
            height.set(1, y, 10);
        }
        let (_, c) = classify(&height, 50);
        assert_eq!(c.terrain.get(0, 1), TerrainType::Coast);
        assert_eq!(c.terrain.get(1, 1), TerrainType::Ocean);
    }

    #[test]
    fn rivers_are_the_top_decile_of_drainage() {
        // a tilted ramp draining into a sea on the left
        let (w, h) = (30, 20);
        let mut height = Grid::new(w, h);
        for x in 0..w {
            for y in 0..h {
                let ridge = (y as i32 - h as i32 / 2).unsigned_abs() as usize;
                height.set(x, y, (20 + x * 6 + ridge * 2).min(255) as u8);
            }
        }
        let (_, c) = classify(&height, 25);
        let positive = c.upstream.data.iter().filter(|&&v| v > 0).count();
        let rivers = c
            .terrain
            .data
            .iter()
            .filter(|&&t| t == TerrainType::River)
            .count();
        assert!(positive > 0);
        assert!(rivers > 0);
        assert!(rivers as f32 <= positive as f32 * 0.1 + 1.0);
    }

    #[test]
    fn mountains_take_the_highest_percentile() {
        let (w, h) = (10, 10);
        let water = Grid::from_vec(w, h, (0..100).map(|i| (100 + i) as u8).collect());
        let mut terrain = Grid::filled(w, h, TerrainType::Land);
        let n = overlay_mountains(&mut terrain, &water, 50);
        // 99th percentile of 100 samples sits between the top two
        assert_eq!(n, 1);
        assert_eq!(terrain.data[99], TerrainType::Mountain);
        assert_eq!(terrain.data[98], TerrainType::Land);
    }

    #[test]
    fn terrain_codes_round_trip() {
        for code in 0..6u8 {
            assert_eq!(TerrainType::try_from(code).map(|t| t as u8), Ok(code));
        }
        assert!(TerrainType::try_from(6).is_err());
    }
}
