use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::basins::DrainageBasin;
use crate::biome::Biome;
use crate::grid::Grid;
use crate::terrain::TerrainType;
use crate::World;

const OCEAN_DEEP: u32 = 0x3A52BB;
const OCEAN_COAST: u32 = 0x4E6AE6;
const LAKE: u32 = 0x4A78D0;
const RIVER: u32 = 0x3F6FD8;
const LAND_LOW: [u8; 4] = [70, 130, 62, 255];
const LAND_HIGH: [u8; 4] = [190, 170, 120, 255];
const MOUNTAIN_LOW: [u8; 4] = [140, 120, 100, 255];
const SNOW: [u8; 4] = [245, 248, 250, 255];
const NO_BASIN: [u8; 4] = [20, 20, 20, 255];

#[inline]
fn rgb(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255]
}

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Walk the piecewise-linear ramp `stops` (value, color), clamping at both ends.
fn ramp(stops: &[(f32, [u8; 4])], v: f32) -> [u8; 4] {
    let Some(&(first, first_color)) = stops.first() else {
        return NO_BASIN;
    };
    if v <= first {
        return first_color;
    }
    for pair in stops.windows(2) {
        let (lo, a) = pair[0];
        let (hi, b) = pair[1];
        if v < hi {
            return lerp_color(a, b, (v - lo) / (hi - lo));
        }
    }
    stops[stops.len() - 1].1
}

/// Row-major RGBA image of a `w x h` column-major world, one color per cell.
fn paint(w: usize, h: usize, color: impl Fn(usize, usize) -> [u8; 4] + Sync) -> Vec<u8> {
    let mut rgba = vec![0u8; w * h * 4];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            row[x * 4..x * 4 + 4].copy_from_slice(&color(x, y));
        }
    });
    rgba
}

/// Grayscale raw heights.
pub fn render_heightmap(height: &Grid<u8>) -> Vec<u8> {
    paint(height.w, height.h, |x, y| {
        let v = height.get(x, y);
        [v, v, v, 255]
    })
}

fn land_color(v: u8, sealevel: u8) -> [u8; 4] {
    let t = (v as f32 - sealevel as f32) / (255.0 - sealevel as f32).max(1.0);
    lerp_color(LAND_LOW, LAND_HIGH, t)
}

/// Terrain classes, land shaded by water-surface altitude.
pub fn render_terrain(terrain: &Grid<TerrainType>, water: &Grid<u8>, sealevel: u8) -> Vec<u8> {
    paint(terrain.w, terrain.h, |x, y| {
        let v = water.get(x, y);
        match terrain.get(x, y) {
            TerrainType::Ocean => rgb(OCEAN_DEEP),
            TerrainType::Coast => rgb(OCEAN_COAST),
            TerrainType::Lake => rgb(LAKE),
            TerrainType::River => rgb(RIVER),
            TerrainType::Land => land_color(v, sealevel),
            TerrainType::Mountain => {
                let t = (v as f32 - 200.0) / 55.0;
                lerp_color(MOUNTAIN_LOW, SNOW, t)
            }
        }
    })
}

fn biome_color(b: Biome) -> u32 {
    match b {
        Biome::None => 0x000000,
        Biome::Glacial => 0xFFFFFF,
        Biome::Tundra => 0x75805B,
        Biome::BorealForest => 0x42562F,
        Biome::Shrubland => 0xD7CC9E,
        Biome::Grassland => 0xADB981,
        Biome::Savanna => 0xC9CD7C,
        Biome::Desert => 0xE1CA9E,
        Biome::TemperateForest | Biome::TropicalForest => 0x648C48,
        Biome::TemperateRainforest => 0x425D27,
        Biome::TropicalRainforest => 0x426D18,
    }
}

/// Legend swatch for a biome, brighter than the map palette.
pub fn biome_label_color(b: Biome) -> u32 {
    match b {
        Biome::None => 0x4783A0,
        Biome::Glacial => 0xFFFFFF,
        Biome::Tundra => 0x96D1C3,
        Biome::BorealForest => 0x006259,
        Biome::Shrubland => 0xB26A47,
        Biome::Grassland => 0xF6EB64,
        Biome::Savanna => 0xC7C349,
        Biome::Desert => 0x8B4D32,
        Biome::TemperateForest => 0x92D847,
        Biome::TemperateRainforest => 0x6B842A,
        Biome::TropicalForest => 0x097309,
        Biome::TropicalRainforest => 0x005100,
    }
}

/// Climate map: biomes on land, sea and coast in their water colors, rivers
/// and lakes drawn over the biome they cross.
pub fn render_biomes(biome: &Grid<Biome>, terrain: &Grid<TerrainType>) -> Vec<u8> {
    paint(biome.w, biome.h, |x, y| match terrain.get(x, y) {
        TerrainType::Ocean => rgb(OCEAN_DEEP),
        TerrainType::Coast => rgb(OCEAN_COAST),
        TerrainType::Lake => rgb(LAKE),
        TerrainType::River => lerp_color(rgb(biome_color(biome.get(x, y))), rgb(RIVER), 0.7),
        _ => rgb(biome_color(biome.get(x, y))),
    })
}

/// Each basin in its own color; unlabelled cells dark.
pub fn render_basins(basin_id: &Grid<Option<u32>>, basins: &BTreeMap<u32, DrainageBasin>) -> Vec<u8> {
    paint(basin_id.w, basin_id.h, |x, y| {
        basin_id
            .get(x, y)
            .and_then(|id| basins.get(&id))
            .map(|b| rgb(b.color()))
            .unwrap_or(NO_BASIN)
    })
}

const TEMPERATURE_STOPS: [(f32, [u8; 4]); 5] = [
    (-40.0, [220, 230, 255, 255]),
    (-10.0, [80, 180, 220, 255]),
    (2.0, [60, 160, 80, 255]),
    (15.0, [220, 200, 60, 255]),
    (25.0, [200, 50, 30, 255]),
];

pub fn render_temperature(temp: &Grid<f32>) -> Vec<u8> {
    paint(temp.w, temp.h, |x, y| ramp(&TEMPERATURE_STOPS, temp.get(x, y)))
}

const MOISTURE_STOPS: [(f32, [u8; 4]); 5] = [
    (0.0, [200, 180, 130, 255]),
    (250.0, [210, 200, 80, 255]),
    (500.0, [60, 160, 70, 255]),
    (1000.0, [50, 100, 200, 255]),
    (2000.0, [20, 40, 120, 255]),
];

/// Moisture over land; water cells (zero moisture) in the sea color.
pub fn render_moisture(moisture: &Grid<f32>, terrain: &Grid<TerrainType>) -> Vec<u8> {
    paint(moisture.w, moisture.h, |x, y| {
        if terrain.get(x, y).is_water() {
            rgb(OCEAN_DEEP)
        } else {
            ramp(&MOISTURE_STOPS, moisture.get(x, y))
        }
    })
}

/// Every diagnostic layer of a world, in display order.
pub fn render_layers(world: &World) -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("terrain", render_terrain(&world.terrain, &world.water, world.sealevel)),
        ("biomes", render_biomes(&world.biome, &world.terrain)),
        ("heightmap", render_heightmap(&world.height)),
        ("basins", render_basins(&world.basin_id, &world.basins)),
        ("temperature", render_temperature(&world.temperature)),
        ("moisture", render_moisture(&world.moisture, &world.terrain)),
    ]
}
