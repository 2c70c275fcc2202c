//! Wire form of a generated world.
//!
//! Every buffer has `width * height` entries laid out column-major,
//! `index = x * height + y`. Enum layers are stored as their `u8` codes
//! (`Direction`, `TerrainType`, `Biome` all decode with `TryFrom<u8>`).
//! Persistence layers must keep this layout byte-for-byte.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::config::Params;
use crate::World;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasinRecord {
    pub color: u32,
    /// Member cells as `[x, y]`.
    pub cells: Vec<[u32; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldStats {
    /// Share of cells that are sea or coastal water.
    pub ocean_fraction: f32,
    pub river_threshold: Option<f32>,
    /// Share of land (non-`None` biome) cells per biome title.
    pub biome_fractions: BTreeMap<String, f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldgenOutput {
    pub options: Params,
    pub sealevel: u8,
    pub width: usize,
    pub height: usize,
    pub heightmap: Vec<u8>,
    pub water_heights: Vec<u8>,
    pub flow_directions: Vec<u8>,
    pub terrain_types: Vec<u8>,
    pub upstream_cells: Vec<u32>,
    pub temperatures: Vec<f32>,
    pub moisture_map: Vec<f32>,
    pub biomes: Vec<u8>,
    pub drainage_basins: BTreeMap<u32, BasinRecord>,
    pub stats: WorldStats,
}

impl WorldStats {
    pub fn from_world(world: &World) -> Self {
        let n = world.terrain.len().max(1) as f32;
        let oceanic = world.terrain.data.iter().filter(|t| t.is_oceanic()).count();

        let mut counts: BTreeMap<Biome, usize> = BTreeMap::new();
        for &b in &world.biome.data {
            if b != Biome::None {
                *counts.entry(b).or_default() += 1;
            }
        }
        let land: usize = counts.values().sum();
        let biome_fractions = counts
            .into_iter()
            .map(|(b, c)| (b.title().to_string(), c as f32 / land as f32))
            .collect();

        Self {
            ocean_fraction: oceanic as f32 / n,
            river_threshold: world.river_threshold,
            biome_fractions,
        }
    }
}

impl WorldgenOutput {
    pub fn from_world(world: &World) -> Self {
        let drainage_basins = world
            .basins
            .iter()
            .map(|(&id, basin)| {
                let record = BasinRecord {
                    color: basin.color(),
                    cells: basin.cells().iter().map(|&(x, y)| [x, y]).collect(),
                };
                (id, record)
            })
            .collect();

        Self {
            options: world.params.clone(),
            sealevel: world.sealevel,
            width: world.w,
            height: world.h,
            heightmap: world.height.data.clone(),
            water_heights: world.water.data.clone(),
            flow_directions: world.flow.map(|d| d as u8).data,
            terrain_types: world.terrain.map(|t| t as u8).data,
            upstream_cells: world.upstream.data.clone(),
            temperatures: world.temperature.data.clone(),
            moisture_map: world.moisture.data.clone(),
            biomes: world.biome.map(|b| b as u8).data,
            drainage_basins,
            stats: WorldStats::from_world(world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::grid::Direction;
    use crate::terrain::TerrainType;

    fn small_world() -> World {
        let params = Params {
            size: Size { width: 32, height: 24 },
            ..Params::default()
        };
        crate::generate(&params).unwrap().0
    }

    #[test]
    fn buffers_keep_the_grid_layout() {
        let world = small_world();
        let out = WorldgenOutput::from_world(&world);
        let n = out.width * out.height;
        assert_eq!(out.heightmap.len(), n);
        assert_eq!(out.water_heights.len(), n);
        assert_eq!(out.flow_directions.len(), n);
        assert_eq!(out.terrain_types.len(), n);
        assert_eq!(out.upstream_cells.len(), n);
        assert_eq!(out.temperatures.len(), n);
        assert_eq!(out.moisture_map.len(), n);
        assert_eq!(out.biomes.len(), n);

        let (x, y) = (5, 7);
        let i = x * out.height + y;
        assert_eq!(out.heightmap[i], world.height.get(x, y));
        assert_eq!(
            TerrainType::try_from(out.terrain_types[i]),
            Ok(world.terrain.get(x, y))
        );
        assert_eq!(Direction::try_from(out.flow_directions[i]), Ok(world.flow.get(x, y)));
        assert_eq!(Biome::try_from(out.biomes[i]), Ok(world.biome.get(x, y)));
    }

    #[test]
    fn basins_and_stats_agree_with_world() {
        let world = small_world();
        let out = WorldgenOutput::from_world(&world);
        assert_eq!(out.drainage_basins.len(), world.basins.len());
        for (id, record) in &out.drainage_basins {
            let basin = &world.basins[id];
            assert_eq!(record.color, basin.color());
            assert_eq!(record.cells.len(), basin.len());
        }

        let sum: f32 = out.stats.biome_fractions.values().sum();
        assert!(out.stats.biome_fractions.is_empty() || (sum - 1.0).abs() < 1e-3);
        assert!((0.0..=1.0).contains(&out.stats.ocean_fraction));
    }

    #[test]
    fn json_uses_camel_case_names() {
        let out = WorldgenOutput::from_world(&small_world());
        let json = serde_json::to_value(&out).unwrap();
        for key in [
            "waterHeights",
            "flowDirections",
            "terrainTypes",
            "upstreamCells",
            "moistureMap",
            "drainageBasins",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["stats"].get("oceanFraction").is_some());

        let back: WorldgenOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }
}
