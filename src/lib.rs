pub mod basins;
pub mod biome;
pub mod climate;
pub mod config;
pub mod error;
pub mod flood;
pub mod grid;
pub mod heightmap;
pub mod hydrology;
pub mod noise;
pub mod output;
pub mod render;
pub mod rng;
pub mod stats;
pub mod terrain;
pub mod worker;

use std::collections::BTreeMap;
use std::time::Instant;

use basins::DrainageBasin;
use biome::Biome;
use config::Params;
use error::WorldgenError;
use grid::{Direction, Grid, Topology};
use terrain::TerrainType;

/// A finished world. All layers share the column-major `Grid` layout and are
/// frozen once `generate` returns.
pub struct World {
    pub params: Params,
    pub sealevel: u8,
    pub w: usize,
    pub h: usize,
    pub height: Grid<u8>,
    pub water: Grid<u8>,
    pub flow: Grid<Direction>,
    pub terrain: Grid<TerrainType>,
    pub upstream: Grid<u32>,
    pub river_threshold: Option<f32>,
    /// Basin id per land cell; `None` on sea, coast and lakes.
    pub basin_id: Grid<Option<u32>>,
    pub basins: BTreeMap<u32, DrainageBasin>,
    pub temperature: Grid<f32>,
    pub moisture: Grid<f32>,
    pub biome: Grid<Biome>,
}

/// Every attribute of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub height: u8,
    pub water: u8,
    pub flow: Direction,
    pub terrain: TerrainType,
    pub upstream: u32,
    pub basin: Option<u32>,
    pub temperature: f32,
    pub moisture: f32,
    pub biome: Biome,
}

impl World {
    /// Cell at (x, y), or `None` off the map, so neighbor probes need no
    /// bounds checks of their own.
    pub fn cell(&self, x: i64, y: i64) -> Option<Cell> {
        Some(Cell {
            height: self.height.try_get(x, y)?,
            water: self.water.try_get(x, y)?,
            flow: self.flow.try_get(x, y)?,
            terrain: self.terrain.try_get(x, y)?,
            upstream: self.upstream.try_get(x, y)?,
            basin: self.basin_id.try_get(x, y)?,
            temperature: self.temperature.try_get(x, y)?,
            moisture: self.moisture.try_get(x, y)?,
            biome: self.biome.try_get(x, y)?,
            x: x as usize,
            y: y as usize,
        })
    }
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

fn timed<T>(timings: &mut Vec<Timing>, name: &'static str, f: impl FnOnce() -> T) -> T {
    let t = Instant::now();
    let out = f();
    let ms = t.elapsed().as_secs_f64() * 1000.0;
    log::debug!("step {name}: {ms:.1} ms");
    timings.push(Timing { name, ms });
    out
}

/// Run the whole pipeline once. Parameters are validated before any stage runs.
pub fn generate(params: &Params) -> Result<(World, Vec<Timing>), WorldgenError> {
    params.validate()?;

    let mut timings = Vec::new();
    let total_start = Instant::now();
    let (w, h) = (params.size.width, params.size.height);
    let seed = params.seed.value();
    let sealevel = params.sea_level();
    log::info!("generating {w}x{h} world, seed={seed}, sealevel={sealevel}");

    // 1. Noise heightmap with island falloff
    let height = timed(&mut timings, "heightmap", || {
        heightmap::synthesize_heightmap(w, h, seed, params.world_shape, params.world_shape_power)
    });

    // 2. Depression removal; the neighbor lists are reused by every later traversal
    let topo = Topology::new(w, h);
    let water = timed(&mut timings, "depressions", || {
        hydrology::remove_depressions(&topo, &height, params.depression_fill_percent)
    });

    // 3. Flow directions along the same flood order
    let flow = timed(&mut timings, "flow", || hydrology::route_flow(&topo, &water));

    // 4. Ocean / coast / lake / river / land
    let classification = timed(&mut timings, "terrain", || {
        terrain::classify_terrain(&topo, &height, &water, &flow, sealevel, params.river_threshold)
    });
    let mut terrain = classification.terrain;

    // 5. Mountains overwrite the top altitude percentile
    timed(&mut timings, "mountains", || {
        terrain::overlay_mountains(&mut terrain, &water, sealevel)
    });

    // 6. Drainage basins
    let (basin_id, basins) = timed(&mut timings, "basins", || {
        let mut labels = basins::label_basins(&topo, &water, &terrain);
        let table = basins::collect_basins(&mut labels, &terrain, seed);
        (labels, table)
    });

    // 7. Climate
    let temperature = timed(&mut timings, "temperature", || {
        climate::compute_temperature(&water, sealevel, params.temperature, params.elevation_cooling_amount)
    });
    let moisture = timed(&mut timings, "moisture", || {
        climate::compute_moisture(&height, &terrain, sealevel, seed)
    });

    // 8. Biomes
    let biome = timed(&mut timings, "biomes", || {
        biome::classify_biomes(&terrain, &moisture, &temperature)
    })?;

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    log::info!("worldgen finished in {total_ms:.1} ms");
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    let world = World {
        params: params.clone(),
        sealevel,
        w,
        h,
        height,
        water,
        flow,
        terrain,
        upstream: classification.upstream,
        river_threshold: classification.river_threshold,
        basin_id,
        basins,
        temperature,
        moisture,
        biome,
    };

    Ok((world, timings))
}
